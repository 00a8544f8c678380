// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Write-side access to the database.
//!
//! Entities saved without an identifier get the next value of the shared
//! sequence. Entities saved with an identifier must already be stored.
//! Callers run each write inside a transaction.

use diesel::SqliteConnection;
use diesel::prelude::*;
use handisup_domain::{
    Beneficiaire, Demande, Evenement, InterventionForfait, ModificationEtatDemande, PeriodeRh,
    PieceJointeBeneficiaire, Utilisateur,
};
use tracing::debug;

use crate::diesel_schema::{
    beneficiaires, campagnes, chartes, demandes, evenements, id_sequence, interventions_forfait,
    modifications_etat_demande, periodes_rh, pieces_jointes, profils, types_demande,
    types_evenement, utilisateurs,
};
use crate::error::PersistenceError;
use crate::fixtures::ReferenceData;
use crate::queries::{self, SEQUENCE_NAME};

/// Hands out the next identifier of the shared sequence.
fn next_id(conn: &mut SqliteConnection) -> Result<i64, PersistenceError> {
    diesel::update(id_sequence::table.find(SEQUENCE_NAME))
        .set(id_sequence::last_id.eq(id_sequence::last_id + 1_i64))
        .execute(conn)?;
    queries::last_id(conn)
}

/// Moves the sequence forward so it never hands out `at_least` or lower.
fn advance_sequence(conn: &mut SqliteConnection, at_least: i64) -> Result<(), PersistenceError> {
    diesel::update(
        id_sequence::table
            .find(SEQUENCE_NAME)
            .filter(id_sequence::last_id.lt(at_least)),
    )
    .set(id_sequence::last_id.eq(at_least))
    .execute(conn)?;
    Ok(())
}

/// Maps an update that touched no row to `UnknownId`.
const fn ensure_updated(updated: usize, kind: &'static str, id: i64) -> Result<(), PersistenceError> {
    if updated == 0 {
        return Err(PersistenceError::UnknownId { kind, id });
    }
    Ok(())
}

/// Creates or replaces a user, keyed by handle.
///
/// # Errors
///
/// Returns an error if the user cannot be encoded or written.
pub fn save_utilisateur(
    conn: &mut SqliteConnection,
    utilisateur: Utilisateur,
) -> Result<Utilisateur, PersistenceError> {
    debug!(uid = %utilisateur.uid, "Saving utilisateur");
    let json: String = serde_json::to_string(&utilisateur)?;
    diesel::replace_into(utilisateurs::table)
        .values((
            utilisateurs::uid.eq(&utilisateur.uid),
            utilisateurs::utilisateur_json.eq(&json),
        ))
        .execute(conn)?;
    Ok(utilisateur)
}

/// Creates or updates a request.
///
/// # Errors
///
/// Returns `PersistenceError::UnknownId` if the request carries an unknown id.
pub fn save_demande(
    conn: &mut SqliteConnection,
    mut demande: Demande,
) -> Result<Demande, PersistenceError> {
    if let Some(id) = demande.id {
        let json: String = serde_json::to_string(&demande)?;
        let updated: usize = diesel::update(demandes::table.find(id))
            .set((
                demandes::demandeur.eq(&demande.demandeur),
                demandes::etat.eq(demande.etat.as_str()),
                demandes::demande_json.eq(&json),
            ))
            .execute(conn)?;
        ensure_updated(updated, "demande", id)?;
    } else {
        let id: i64 = next_id(conn)?;
        demande.id = Some(id);
        let json: String = serde_json::to_string(&demande)?;
        diesel::insert_into(demandes::table)
            .values((
                demandes::demande_id.eq(id),
                demandes::demandeur.eq(&demande.demandeur),
                demandes::etat.eq(demande.etat.as_str()),
                demandes::demande_json.eq(&json),
            ))
            .execute(conn)?;
    }
    debug!(demande_id = ?demande.id, etat = %demande.etat, "Saving demande");
    Ok(demande)
}

/// Appends a transition record to the log.
///
/// # Errors
///
/// Returns `PersistenceError::UnknownId` if the request is not stored.
pub fn append_modification(
    conn: &mut SqliteConnection,
    modification: &ModificationEtatDemande,
) -> Result<(), PersistenceError> {
    let stored: i64 = demandes::table
        .find(modification.demande_id)
        .count()
        .get_result(conn)?;
    if stored == 0 {
        return Err(PersistenceError::UnknownId {
            kind: "demande",
            id: modification.demande_id,
        });
    }
    let json: String = serde_json::to_string(modification)?;
    diesel::insert_into(modifications_etat_demande::table)
        .values((
            modifications_etat_demande::demande_id.eq(modification.demande_id),
            modifications_etat_demande::modification_json.eq(&json),
        ))
        .execute(conn)?;
    Ok(())
}

/// Creates or updates a beneficiary grant.
///
/// # Errors
///
/// Returns `PersistenceError::UnknownId` if the grant carries an unknown id.
pub fn save_beneficiaire(
    conn: &mut SqliteConnection,
    mut beneficiaire: Beneficiaire,
) -> Result<Beneficiaire, PersistenceError> {
    if let Some(id) = beneficiaire.id {
        let json: String = serde_json::to_string(&beneficiaire)?;
        let updated: usize = diesel::update(beneficiaires::table.find(id))
            .set((
                beneficiaires::utilisateur.eq(&beneficiaire.utilisateur),
                beneficiaires::beneficiaire_json.eq(&json),
            ))
            .execute(conn)?;
        ensure_updated(updated, "beneficiaire", id)?;
    } else {
        let id: i64 = next_id(conn)?;
        beneficiaire.id = Some(id);
        let json: String = serde_json::to_string(&beneficiaire)?;
        diesel::insert_into(beneficiaires::table)
            .values((
                beneficiaires::beneficiaire_id.eq(id),
                beneficiaires::utilisateur.eq(&beneficiaire.utilisateur),
                beneficiaires::beneficiaire_json.eq(&json),
            ))
            .execute(conn)?;
    }
    Ok(beneficiaire)
}

/// Creates or updates a permanent attachment.
///
/// # Errors
///
/// Returns `PersistenceError::UnknownId` if the attachment carries an unknown id.
pub fn save_piece_jointe(
    conn: &mut SqliteConnection,
    mut piece: PieceJointeBeneficiaire,
) -> Result<PieceJointeBeneficiaire, PersistenceError> {
    if let Some(id) = piece.id {
        let json: String = serde_json::to_string(&piece)?;
        let updated: usize = diesel::update(pieces_jointes::table.find(id))
            .set((
                pieces_jointes::utilisateur.eq(&piece.utilisateur),
                pieces_jointes::piece_jointe_json.eq(&json),
            ))
            .execute(conn)?;
        ensure_updated(updated, "piece_jointe", id)?;
    } else {
        let id: i64 = next_id(conn)?;
        piece.id = Some(id);
        let json: String = serde_json::to_string(&piece)?;
        diesel::insert_into(pieces_jointes::table)
            .values((
                pieces_jointes::piece_jointe_id.eq(id),
                pieces_jointes::utilisateur.eq(&piece.utilisateur),
                pieces_jointes::piece_jointe_json.eq(&json),
            ))
            .execute(conn)?;
    }
    Ok(piece)
}

/// Creates or updates an event.
///
/// # Errors
///
/// Returns `PersistenceError::UnknownId` if the event carries an unknown id.
pub fn save_evenement(
    conn: &mut SqliteConnection,
    mut evenement: Evenement,
) -> Result<Evenement, PersistenceError> {
    if let Some(id) = evenement.id {
        let json: String = serde_json::to_string(&evenement)?;
        let updated: usize = diesel::update(evenements::table.find(id))
            .set(evenements::evenement_json.eq(&json))
            .execute(conn)?;
        ensure_updated(updated, "evenement", id)?;
    } else {
        let id: i64 = next_id(conn)?;
        evenement.id = Some(id);
        let json: String = serde_json::to_string(&evenement)?;
        diesel::insert_into(evenements::table)
            .values((
                evenements::evenement_id.eq(id),
                evenements::evenement_json.eq(&json),
            ))
            .execute(conn)?;
    }
    Ok(evenement)
}

/// Creates or updates a lump-sum intervention.
///
/// # Errors
///
/// Returns `PersistenceError::UnknownId` if the intervention carries an unknown id.
pub fn save_intervention_forfait(
    conn: &mut SqliteConnection,
    mut intervention: InterventionForfait,
) -> Result<InterventionForfait, PersistenceError> {
    if let Some(id) = intervention.id {
        let json: String = serde_json::to_string(&intervention)?;
        let updated: usize = diesel::update(interventions_forfait::table.find(id))
            .set(interventions_forfait::intervention_json.eq(&json))
            .execute(conn)?;
        ensure_updated(updated, "intervention_forfait", id)?;
    } else {
        let id: i64 = next_id(conn)?;
        intervention.id = Some(id);
        let json: String = serde_json::to_string(&intervention)?;
        diesel::insert_into(interventions_forfait::table)
            .values((
                interventions_forfait::intervention_id.eq(id),
                interventions_forfait::intervention_json.eq(&json),
            ))
            .execute(conn)?;
    }
    Ok(intervention)
}

/// Creates or updates an HR period.
///
/// # Errors
///
/// Returns `PersistenceError::UnknownId` if the period carries an unknown id.
pub fn save_periode(
    conn: &mut SqliteConnection,
    mut periode: PeriodeRh,
) -> Result<PeriodeRh, PersistenceError> {
    if let Some(id) = periode.id {
        let json: String = serde_json::to_string(&periode)?;
        let updated: usize = diesel::update(periodes_rh::table.find(id))
            .set(periodes_rh::periode_json.eq(&json))
            .execute(conn)?;
        ensure_updated(updated, "periode_rh", id)?;
    } else {
        let id: i64 = next_id(conn)?;
        periode.id = Some(id);
        insert_periode(conn, &periode, id)?;
    }
    Ok(periode)
}

fn insert_periode(
    conn: &mut SqliteConnection,
    periode: &PeriodeRh,
    id: i64,
) -> Result<(), PersistenceError> {
    let json: String = serde_json::to_string(periode)?;
    diesel::replace_into(periodes_rh::table)
        .values((periodes_rh::periode_id.eq(id), periodes_rh::periode_json.eq(&json)))
        .execute(conn)?;
    Ok(())
}

/// Writes already validated reference data.
///
/// Entries replace stored entries with the same key. Periods without an
/// identifier get fresh ones. The sequence is moved past every loaded
/// identifier so later inserts never collide.
///
/// # Errors
///
/// Returns an error if an entry cannot be encoded or written.
pub fn insert_reference_data(
    conn: &mut SqliteConnection,
    data: ReferenceData,
) -> Result<(), PersistenceError> {
    advance_sequence(conn, data.highest_id())?;

    for utilisateur in data.utilisateurs {
        save_utilisateur(conn, utilisateur)?;
    }
    for type_demande in &data.types_demande {
        diesel::replace_into(types_demande::table)
            .values((
                types_demande::type_demande_id.eq(type_demande.id),
                types_demande::type_demande_json.eq(serde_json::to_string(type_demande)?),
            ))
            .execute(conn)?;
    }
    for campagne in &data.campagnes {
        diesel::replace_into(campagnes::table)
            .values((
                campagnes::campagne_id.eq(campagne.id),
                campagnes::campagne_json.eq(serde_json::to_string(campagne)?),
            ))
            .execute(conn)?;
    }
    for profil in &data.profils {
        diesel::replace_into(profils::table)
            .values((
                profils::profil_id.eq(profil.id),
                profils::profil_json.eq(serde_json::to_string(profil)?),
            ))
            .execute(conn)?;
    }
    for charte in &data.chartes {
        diesel::replace_into(chartes::table)
            .values((
                chartes::charte_id.eq(charte.id),
                chartes::charte_json.eq(serde_json::to_string(charte)?),
            ))
            .execute(conn)?;
    }
    for type_evenement in &data.types_evenement {
        diesel::replace_into(types_evenement::table)
            .values((
                types_evenement::type_evenement_id.eq(type_evenement.id),
                types_evenement::type_evenement_json.eq(serde_json::to_string(type_evenement)?),
            ))
            .execute(conn)?;
    }
    for mut periode in data.periodes {
        let id: i64 = match periode.id {
            Some(id) => id,
            None => next_id(conn)?,
        };
        periode.id = Some(id);
        insert_periode(conn, &periode, id)?;
    }
    Ok(())
}
