// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Read-side access to the database.
//!
//! Entities are stored as JSON documents next to the columns used to
//! look them up. Lists come back in key order.

use diesel::SqliteConnection;
use diesel::prelude::*;
use handisup_domain::{
    Beneficiaire, Campagne, Charte, Demande, Evenement, ModificationEtatDemande, PeriodeRh,
    PieceJointeBeneficiaire, ProfilBeneficiaire, TypeDemande, TypeEvenement, Utilisateur,
};
use serde::de::DeserializeOwned;

use crate::diesel_schema::{
    beneficiaires, campagnes, chartes, demandes, evenements, id_sequence,
    modifications_etat_demande, periodes_rh, pieces_jointes, profils, types_demande,
    types_evenement, utilisateurs,
};
use crate::error::PersistenceError;

/// Name of the single row of `id_sequence`.
pub const SEQUENCE_NAME: &str = "global";

fn decode<T: DeserializeOwned>(json: Option<String>) -> Result<Option<T>, PersistenceError> {
    json.map(|json| serde_json::from_str::<T>(&json))
        .transpose()
        .map_err(PersistenceError::from)
}

fn decode_all<T: DeserializeOwned>(rows: Vec<String>) -> Result<Vec<T>, PersistenceError> {
    rows.iter()
        .map(|json| serde_json::from_str::<T>(json).map_err(PersistenceError::from))
        .collect()
}

/// Returns the last identifier handed out.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn last_id(conn: &mut SqliteConnection) -> Result<i64, PersistenceError> {
    let last: i64 = id_sequence::table
        .find(SEQUENCE_NAME)
        .select(id_sequence::last_id)
        .first(conn)?;
    Ok(last)
}

/// Looks up a user by handle.
///
/// # Errors
///
/// Returns an error if the query fails or the stored document is malformed.
pub fn find_utilisateur(
    conn: &mut SqliteConnection,
    uid: &str,
) -> Result<Option<Utilisateur>, PersistenceError> {
    let json: Option<String> = utilisateurs::table
        .find(uid)
        .select(utilisateurs::utilisateur_json)
        .first(conn)
        .optional()?;
    decode(json)
}

/// Lists every user in handle order.
///
/// # Errors
///
/// Returns an error if the query fails or a stored document is malformed.
pub fn list_utilisateurs(conn: &mut SqliteConnection) -> Result<Vec<Utilisateur>, PersistenceError> {
    let rows: Vec<String> = utilisateurs::table
        .order(utilisateurs::uid.asc())
        .select(utilisateurs::utilisateur_json)
        .load(conn)?;
    decode_all(rows)
}

/// Looks up a request type.
///
/// # Errors
///
/// Returns an error if the query fails or the stored document is malformed.
pub fn find_type_demande(
    conn: &mut SqliteConnection,
    id: i64,
) -> Result<Option<TypeDemande>, PersistenceError> {
    let json: Option<String> = types_demande::table
        .find(id)
        .select(types_demande::type_demande_json)
        .first(conn)
        .optional()?;
    decode(json)
}

/// Looks up a campaign.
///
/// # Errors
///
/// Returns an error if the query fails or the stored document is malformed.
pub fn find_campagne(
    conn: &mut SqliteConnection,
    id: i64,
) -> Result<Option<Campagne>, PersistenceError> {
    let json: Option<String> = campagnes::table
        .find(id)
        .select(campagnes::campagne_json)
        .first(conn)
        .optional()?;
    decode(json)
}

/// Looks up a beneficiary profile.
///
/// # Errors
///
/// Returns an error if the query fails or the stored document is malformed.
pub fn find_profil(
    conn: &mut SqliteConnection,
    id: i64,
) -> Result<Option<ProfilBeneficiaire>, PersistenceError> {
    let json: Option<String> = profils::table
        .find(id)
        .select(profils::profil_json)
        .first(conn)
        .optional()?;
    decode(json)
}

/// Looks up a charter template.
///
/// # Errors
///
/// Returns an error if the query fails or the stored document is malformed.
pub fn find_charte(conn: &mut SqliteConnection, id: i64) -> Result<Option<Charte>, PersistenceError> {
    let json: Option<String> = chartes::table
        .find(id)
        .select(chartes::charte_json)
        .first(conn)
        .optional()?;
    decode(json)
}

/// Looks up an event type.
///
/// # Errors
///
/// Returns an error if the query fails or the stored document is malformed.
pub fn find_type_evenement(
    conn: &mut SqliteConnection,
    id: i64,
) -> Result<Option<TypeEvenement>, PersistenceError> {
    let json: Option<String> = types_evenement::table
        .find(id)
        .select(types_evenement::type_evenement_json)
        .first(conn)
        .optional()?;
    decode(json)
}

/// Looks up a request.
///
/// # Errors
///
/// Returns an error if the query fails or the stored document is malformed.
pub fn find_demande(conn: &mut SqliteConnection, id: i64) -> Result<Option<Demande>, PersistenceError> {
    let json: Option<String> = demandes::table
        .find(id)
        .select(demandes::demande_json)
        .first(conn)
        .optional()?;
    decode(json)
}

/// Lists every request in identifier order.
///
/// # Errors
///
/// Returns an error if the query fails or a stored document is malformed.
pub fn list_demandes(conn: &mut SqliteConnection) -> Result<Vec<Demande>, PersistenceError> {
    let rows: Vec<String> = demandes::table
        .order(demandes::demande_id.asc())
        .select(demandes::demande_json)
        .load(conn)?;
    decode_all(rows)
}

/// Lists the transition log of a request in append order.
///
/// # Errors
///
/// Returns an error if the query fails or a stored document is malformed.
pub fn list_modifications(
    conn: &mut SqliteConnection,
    demande_id: i64,
) -> Result<Vec<ModificationEtatDemande>, PersistenceError> {
    let rows: Vec<String> = modifications_etat_demande::table
        .filter(modifications_etat_demande::demande_id.eq(demande_id))
        .order(modifications_etat_demande::modification_id.asc())
        .select(modifications_etat_demande::modification_json)
        .load(conn)?;
    decode_all(rows)
}

/// Looks up a beneficiary grant.
///
/// # Errors
///
/// Returns an error if the query fails or the stored document is malformed.
pub fn find_beneficiaire(
    conn: &mut SqliteConnection,
    id: i64,
) -> Result<Option<Beneficiaire>, PersistenceError> {
    let json: Option<String> = beneficiaires::table
        .find(id)
        .select(beneficiaires::beneficiaire_json)
        .first(conn)
        .optional()?;
    decode(json)
}

/// Lists every beneficiary grant in identifier order.
///
/// # Errors
///
/// Returns an error if the query fails or a stored document is malformed.
pub fn list_beneficiaires(
    conn: &mut SqliteConnection,
) -> Result<Vec<Beneficiaire>, PersistenceError> {
    let rows: Vec<String> = beneficiaires::table
        .order(beneficiaires::beneficiaire_id.asc())
        .select(beneficiaires::beneficiaire_json)
        .load(conn)?;
    decode_all(rows)
}

/// Lists the permanent attachments of a user.
///
/// # Errors
///
/// Returns an error if the query fails or a stored document is malformed.
pub fn list_pieces_jointes(
    conn: &mut SqliteConnection,
    uid: &str,
) -> Result<Vec<PieceJointeBeneficiaire>, PersistenceError> {
    let rows: Vec<String> = pieces_jointes::table
        .filter(pieces_jointes::utilisateur.eq(uid))
        .order(pieces_jointes::piece_jointe_id.asc())
        .select(pieces_jointes::piece_jointe_json)
        .load(conn)?;
    decode_all(rows)
}

/// Looks up an event.
///
/// # Errors
///
/// Returns an error if the query fails or the stored document is malformed.
pub fn find_evenement(
    conn: &mut SqliteConnection,
    id: i64,
) -> Result<Option<Evenement>, PersistenceError> {
    let json: Option<String> = evenements::table
        .find(id)
        .select(evenements::evenement_json)
        .first(conn)
        .optional()?;
    decode(json)
}

/// Lists every event in identifier order.
///
/// # Errors
///
/// Returns an error if the query fails or a stored document is malformed.
pub fn list_evenements(conn: &mut SqliteConnection) -> Result<Vec<Evenement>, PersistenceError> {
    let rows: Vec<String> = evenements::table
        .order(evenements::evenement_id.asc())
        .select(evenements::evenement_json)
        .load(conn)?;
    decode_all(rows)
}

/// Lists every HR period in identifier order.
///
/// # Errors
///
/// Returns an error if the query fails or a stored document is malformed.
pub fn list_periodes(conn: &mut SqliteConnection) -> Result<Vec<PeriodeRh>, PersistenceError> {
    let rows: Vec<String> = periodes_rh::table
        .order(periodes_rh::periode_id.asc())
        .select(periodes_rh::periode_json)
        .load(conn)?;
    decode_all(rows)
}
