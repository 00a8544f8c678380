// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Storage adapter for the Handisup workflow.
//!
//! `Persistence` keeps every entity in a `SQLite` database through Diesel
//! and implements the `handisup::Store` port. The schema is created by
//! embedded migrations when a connection is opened. Reference data (users,
//! request types, campaigns, profiles, charters, event types, HR periods)
//! is seeded from a JSON fixture, checked for referential integrity before
//! it is accepted.
//!
//! Reads live in `queries`, writes in `mutations`. The adapter only
//! dispatches and wraps every write in a transaction; neither module knows
//! about the port.
//!
//! Tests use a private shared-cache in-memory database per adapter.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(clippy::multiple_crate_versions)]

mod diesel_schema;
mod error;
mod fixtures;
mod mutations;
mod queries;
mod sqlite;

#[cfg(test)]
mod tests;

pub use error::PersistenceError;
pub use fixtures::ReferenceData;

use diesel::{Connection, SqliteConnection};
use handisup::{Store, StoreError};
use handisup_domain::{
    Beneficiaire, Campagne, Charte, Demande, Evenement, InterventionForfait,
    ModificationEtatDemande, PeriodeRh, PieceJointeBeneficiaire, ProfilBeneficiaire, TypeDemande,
    TypeEvenement, Utilisateur,
};
use std::cell::{RefCell, RefMut};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::info;

/// Counter naming the in-memory databases so adapters never share one.
static DB_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Persistence adapter for the workflow entities.
///
/// The port reads through `&self`, so the connection sits in a `RefCell`.
/// A read never overlaps another database call on the same adapter.
pub struct Persistence {
    conn: RefCell<SqliteConnection>,
}

impl std::fmt::Debug for Persistence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Persistence").finish_non_exhaustive()
    }
}

impl Persistence {
    /// Creates an adapter over a fresh in-memory database.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be initialized.
    pub fn new_in_memory() -> Result<Self, PersistenceError> {
        let db_id: u64 = DB_COUNTER.fetch_add(1, Ordering::SeqCst);
        let shared_memory_url: String = format!("file:handisup_mem_{db_id}?mode=memory&cache=shared");

        let mut conn: SqliteConnection = sqlite::initialize_database(&shared_memory_url)?;
        sqlite::verify_foreign_key_enforcement(&mut conn)?;

        Ok(Self {
            conn: RefCell::new(conn),
        })
    }

    /// Creates an adapter over a database file, creating it if needed.
    ///
    /// # Arguments
    ///
    /// * `path` - The path to the `SQLite` database file
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or initialized.
    pub fn new_with_file<P: AsRef<Path>>(path: P) -> Result<Self, PersistenceError> {
        let path_str: &str = path.as_ref().to_str().ok_or_else(|| {
            PersistenceError::InitializationError(String::from("Invalid database path"))
        })?;

        let mut conn: SqliteConnection = sqlite::initialize_database(path_str)?;
        sqlite::enable_wal_mode(&mut conn)?;
        sqlite::verify_foreign_key_enforcement(&mut conn)?;

        Ok(Self {
            conn: RefCell::new(conn),
        })
    }

    /// Creates an in-memory adapter seeded with reference data.
    ///
    /// # Arguments
    ///
    /// * `data` - The reference data to load
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be initialized or the
    /// reference data is inconsistent.
    pub fn with_reference_data(data: ReferenceData) -> Result<Self, PersistenceError> {
        let mut persistence: Self = Self::new_in_memory()?;
        persistence.load_reference_data(data)?;
        Ok(persistence)
    }

    /// Creates an in-memory adapter seeded from a JSON fixture file.
    ///
    /// # Arguments
    ///
    /// * `path` - The path to the JSON fixture
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or is inconsistent.
    pub fn new_with_fixtures<P: AsRef<Path>>(path: P) -> Result<Self, PersistenceError> {
        let data: ReferenceData = ReferenceData::from_path(path.as_ref())?;
        info!(path = %path.as_ref().display(), "Loading reference data");
        Self::with_reference_data(data)
    }

    /// Loads reference data on top of the stored data.
    ///
    /// Nothing is written unless the whole data set passes the integrity
    /// checks. Entries replace stored entries with the same key.
    ///
    /// # Errors
    ///
    /// Returns an error if the reference data is inconsistent or cannot be
    /// written.
    pub fn load_reference_data(&mut self, data: ReferenceData) -> Result<(), PersistenceError> {
        let conn: &mut SqliteConnection = self.conn.get_mut();
        let stored_periodes: Vec<PeriodeRh> = queries::list_periodes(conn)?;
        data.validate(&stored_periodes)?;
        let counts: String = data.summary();
        conn.transaction(|conn| mutations::insert_reference_data(conn, data))?;
        info!(loaded = %counts, "Reference data loaded");
        Ok(())
    }

    /// Runs a read on the connection.
    fn read<T>(
        &self,
        query: impl FnOnce(&mut SqliteConnection) -> Result<T, PersistenceError>,
    ) -> Result<T, StoreError> {
        let mut conn: RefMut<'_, SqliteConnection> = self.conn.try_borrow_mut().map_err(|e| {
            StoreError::Backend(format!("connection already in use: {e}"))
        })?;
        query(&mut conn).map_err(Into::into)
    }

    /// Runs a write inside a transaction.
    fn write<T>(
        &mut self,
        mutation: impl FnOnce(&mut SqliteConnection) -> Result<T, PersistenceError>,
    ) -> Result<T, StoreError> {
        self.conn
            .get_mut()
            .transaction(mutation)
            .map_err(Into::into)
    }
}

impl Store for Persistence {
    fn utilisateur(&self, uid: &str) -> Result<Option<Utilisateur>, StoreError> {
        self.read(|conn| queries::find_utilisateur(conn, uid))
    }

    fn utilisateurs(&self) -> Result<Vec<Utilisateur>, StoreError> {
        self.read(queries::list_utilisateurs)
    }

    fn save_utilisateur(&mut self, utilisateur: Utilisateur) -> Result<Utilisateur, StoreError> {
        self.write(|conn| mutations::save_utilisateur(conn, utilisateur))
    }

    fn campagne(&self, id: i64) -> Result<Option<Campagne>, StoreError> {
        self.read(|conn| queries::find_campagne(conn, id))
    }

    fn type_demande(&self, id: i64) -> Result<Option<TypeDemande>, StoreError> {
        self.read(|conn| queries::find_type_demande(conn, id))
    }

    fn profil(&self, id: i64) -> Result<Option<ProfilBeneficiaire>, StoreError> {
        self.read(|conn| queries::find_profil(conn, id))
    }

    fn charte(&self, id: i64) -> Result<Option<Charte>, StoreError> {
        self.read(|conn| queries::find_charte(conn, id))
    }

    fn type_evenement(&self, id: i64) -> Result<Option<TypeEvenement>, StoreError> {
        self.read(|conn| queries::find_type_evenement(conn, id))
    }

    fn demande(&self, id: i64) -> Result<Option<Demande>, StoreError> {
        self.read(|conn| queries::find_demande(conn, id))
    }

    fn demandes(&self) -> Result<Vec<Demande>, StoreError> {
        self.read(queries::list_demandes)
    }

    fn save_demande(&mut self, demande: Demande) -> Result<Demande, StoreError> {
        self.write(|conn| mutations::save_demande(conn, demande))
    }

    fn append_modification(
        &mut self,
        modification: ModificationEtatDemande,
    ) -> Result<(), StoreError> {
        self.write(|conn| mutations::append_modification(conn, &modification))
    }

    fn modifications(&self, demande_id: i64) -> Result<Vec<ModificationEtatDemande>, StoreError> {
        self.read(|conn| queries::list_modifications(conn, demande_id))
    }

    fn beneficiaire(&self, id: i64) -> Result<Option<Beneficiaire>, StoreError> {
        self.read(|conn| queries::find_beneficiaire(conn, id))
    }

    fn beneficiaires(&self) -> Result<Vec<Beneficiaire>, StoreError> {
        self.read(queries::list_beneficiaires)
    }

    fn save_beneficiaire(
        &mut self,
        beneficiaire: Beneficiaire,
    ) -> Result<Beneficiaire, StoreError> {
        self.write(|conn| mutations::save_beneficiaire(conn, beneficiaire))
    }

    fn pieces_jointes(&self, uid: &str) -> Result<Vec<PieceJointeBeneficiaire>, StoreError> {
        self.read(|conn| queries::list_pieces_jointes(conn, uid))
    }

    fn save_piece_jointe(
        &mut self,
        piece: PieceJointeBeneficiaire,
    ) -> Result<PieceJointeBeneficiaire, StoreError> {
        self.write(|conn| mutations::save_piece_jointe(conn, piece))
    }

    fn evenement(&self, id: i64) -> Result<Option<Evenement>, StoreError> {
        self.read(|conn| queries::find_evenement(conn, id))
    }

    fn evenements(&self) -> Result<Vec<Evenement>, StoreError> {
        self.read(queries::list_evenements)
    }

    fn save_evenement(&mut self, evenement: Evenement) -> Result<Evenement, StoreError> {
        self.write(|conn| mutations::save_evenement(conn, evenement))
    }

    fn save_intervention_forfait(
        &mut self,
        intervention: InterventionForfait,
    ) -> Result<InterventionForfait, StoreError> {
        self.write(|conn| mutations::save_intervention_forfait(conn, intervention))
    }

    fn periodes(&self) -> Result<Vec<PeriodeRh>, StoreError> {
        self.read(queries::list_periodes)
    }

    fn save_periode(&mut self, periode: PeriodeRh) -> Result<PeriodeRh, StoreError> {
        self.write(|conn| mutations::save_periode(conn, periode))
    }
}
