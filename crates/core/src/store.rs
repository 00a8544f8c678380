// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! The storage port the workflow writes through.
//!
//! Writes assign an identifier to entities saved without one and return the
//! stored entity. Lookups return `Ok(None)` for unknown identifiers.

use handisup_domain::{
    Beneficiaire, Campagne, Charte, Demande, Evenement, InterventionForfait,
    ModificationEtatDemande, PeriodeRh, PieceJointeBeneficiaire, ProfilBeneficiaire, TypeDemande,
    TypeEvenement, Utilisateur,
};
use thiserror::Error;

/// Storage failures.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    /// An update targeted an identifier that is not stored.
    #[error("{kind} {id} does not exist")]
    UnknownId {
        /// Kind of entity.
        kind: &'static str,
        /// The identifier.
        id: i64,
    },

    /// The backend rejected the operation.
    #[error("Storage backend failure: {0}")]
    Backend(String),
}

/// Storage operations needed by the workflow.
pub trait Store {
    /// Looks up a user by handle.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn utilisateur(&self, uid: &str) -> Result<Option<Utilisateur>, StoreError>;

    /// Lists every local user.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn utilisateurs(&self) -> Result<Vec<Utilisateur>, StoreError>;

    /// Creates or replaces a user, keyed by handle.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn save_utilisateur(&mut self, utilisateur: Utilisateur) -> Result<Utilisateur, StoreError>;

    /// Looks up a campaign.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn campagne(&self, id: i64) -> Result<Option<Campagne>, StoreError>;

    /// Looks up a request type.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn type_demande(&self, id: i64) -> Result<Option<TypeDemande>, StoreError>;

    /// Looks up a beneficiary profile.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn profil(&self, id: i64) -> Result<Option<ProfilBeneficiaire>, StoreError>;

    /// Looks up a charter template.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn charte(&self, id: i64) -> Result<Option<Charte>, StoreError>;

    /// Looks up an event type.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn type_evenement(&self, id: i64) -> Result<Option<TypeEvenement>, StoreError>;

    /// Looks up a request.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn demande(&self, id: i64) -> Result<Option<Demande>, StoreError>;

    /// Lists every request.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn demandes(&self) -> Result<Vec<Demande>, StoreError>;

    /// Creates or updates a request.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails or the id is unknown.
    fn save_demande(&mut self, demande: Demande) -> Result<Demande, StoreError>;

    /// Appends a transition record.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn append_modification(
        &mut self,
        modification: ModificationEtatDemande,
    ) -> Result<(), StoreError>;

    /// Lists the transition records of a request, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn modifications(&self, demande_id: i64) -> Result<Vec<ModificationEtatDemande>, StoreError>;

    /// Looks up a beneficiary grant.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn beneficiaire(&self, id: i64) -> Result<Option<Beneficiaire>, StoreError>;

    /// Lists every beneficiary grant.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn beneficiaires(&self) -> Result<Vec<Beneficiaire>, StoreError>;

    /// Creates or updates a beneficiary grant.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails or the id is unknown.
    fn save_beneficiaire(&mut self, beneficiaire: Beneficiaire)
    -> Result<Beneficiaire, StoreError>;

    /// Lists the permanent attachments of a user.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn pieces_jointes(&self, uid: &str) -> Result<Vec<PieceJointeBeneficiaire>, StoreError>;

    /// Creates a permanent attachment.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn save_piece_jointe(
        &mut self,
        piece: PieceJointeBeneficiaire,
    ) -> Result<PieceJointeBeneficiaire, StoreError>;

    /// Looks up an event.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn evenement(&self, id: i64) -> Result<Option<Evenement>, StoreError>;

    /// Lists every event.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn evenements(&self) -> Result<Vec<Evenement>, StoreError>;

    /// Creates or updates an event.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails or the id is unknown.
    fn save_evenement(&mut self, evenement: Evenement) -> Result<Evenement, StoreError>;

    /// Creates or updates a lump-sum intervention.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails or the id is unknown.
    fn save_intervention_forfait(
        &mut self,
        intervention: InterventionForfait,
    ) -> Result<InterventionForfait, StoreError>;

    /// Lists every HR period.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn periodes(&self) -> Result<Vec<PeriodeRh>, StoreError>;

    /// Creates or updates an HR period.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails or the id is unknown.
    fn save_periode(&mut self, periode: PeriodeRh) -> Result<PeriodeRh, StoreError>;
}
