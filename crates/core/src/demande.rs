// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! The request manager.
//!
//! The manager applies whatever it is asked to apply. Transition legality,
//! completeness and uniqueness are checked beforehand by the validators of
//! the domain crate; nothing here re-checks them.

use crate::config::Context;
use crate::error::CoreError;
use crate::store::Store;
use handisup_audit::{Actor, DomainEvent, ResourceKind, ResourceRef};
use handisup_domain::{
    Campagne, Charte, CharteDemandeur, Demande, DomainError, EtatDemande, ModificationEtatDemande,
    OPTION_ACCOMPAGNEMENT_NON_ID, ProfilBeneficiaire, QUESTION_ACCOMPAGNEMENT_ID, Reponse,
    TableLiee, TypeDemande, count_demandes_by_etat,
};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info};

/// Loads a request.
///
/// # Errors
///
/// Returns `NotFound` if the request does not exist, or a store error.
pub fn charger_demande(store: &dyn Store, demande_id: i64) -> Result<Demande, CoreError> {
    store
        .demande(demande_id)?
        .ok_or_else(|| CoreError::not_found("demande", demande_id))
}

/// Loads the request type of a request, through its campaign.
///
/// # Errors
///
/// Returns `NotFound` if the campaign or type does not exist, or a store
/// error.
pub fn type_demande_de(
    store: &dyn Store,
    demande: &Demande,
) -> Result<(Campagne, TypeDemande), CoreError> {
    let campagne: Campagne = store
        .campagne(demande.campagne_id)?
        .ok_or_else(|| CoreError::not_found("campagne", demande.campagne_id))?;
    let type_demande: TypeDemande = store
        .type_demande(campagne.type_demande_id)?
        .ok_or_else(|| CoreError::not_found("type_demande", campagne.type_demande_id))?;
    Ok((campagne, type_demande))
}

/// Returns the active request of an applicant for a campaign, if any.
///
/// Refused requests are not active.
///
/// # Errors
///
/// Returns an error if the store fails.
pub fn demande_active(
    store: &dyn Store,
    demandeur: &str,
    campagne_id: i64,
) -> Result<Option<Demande>, CoreError> {
    Ok(store.demandes()?.into_iter().find(|d| {
        d.demandeur == demandeur && d.campagne_id == campagne_id && d.etat != EtatDemande::Refusee
    }))
}

/// Creates a draft request for an applicant and campaign.
///
/// This is the `(none) -> EN_COURS` transition. No transition record is
/// written for it.
///
/// # Errors
///
/// Returns `NotFound` if the campaign does not exist, or a store error.
pub fn creer_demande(
    store: &mut dyn Store,
    ctx: &Context<'_>,
    demandeur: &str,
    campagne_id: i64,
) -> Result<Demande, CoreError> {
    if store.campagne(campagne_id)?.is_none() {
        return Err(CoreError::not_found("campagne", campagne_id));
    }

    let demande: Demande = store.save_demande(Demande::new(demandeur, campagne_id))?;
    let demande_id: i64 = demande.id.unwrap_or_default();
    info!(demande_id, demandeur, campagne_id, "Request created");
    ctx.events.publish(DomainEvent::ResourceModified {
        resource: ResourceRef::new(ResourceKind::Demande, demande_id),
    });
    Ok(demande)
}

/// Records an applicant's answer to one question, replacing any previous
/// answer to the same question.
///
/// # Errors
///
/// Returns an error if:
/// - The request or its type does not exist
/// - The question is not part of the request's questionnaire
/// - The request no longer accepts answer changes
/// - The store fails
pub fn enregistrer_reponse(
    store: &mut dyn Store,
    ctx: &Context<'_>,
    demande_id: i64,
    reponse: Reponse,
) -> Result<Demande, CoreError> {
    let mut demande: Demande = charger_demande(store, demande_id)?;
    if !demande.reponses_modifiables() {
        return Err(CoreError::DomainViolation(DomainError::DemandeVerrouillee {
            etat: demande.etat,
        }));
    }

    let (_, type_demande) = type_demande_de(store, &demande)?;
    if type_demande.question(reponse.question_id).is_none() {
        return Err(CoreError::not_found("question", reponse.question_id));
    }

    debug!(demande_id, question_id = reponse.question_id, "Answer recorded");
    demande.upsert_reponse(reponse);
    let demande: Demande = store.save_demande(demande)?;
    ctx.events.publish(DomainEvent::ResourceModified {
        resource: ResourceRef::new(ResourceKind::Demande, demande_id),
    });
    Ok(demande)
}

/// Applies a state change to a request.
///
/// Updates the state, the assigned profile when one is given and the staff
/// comment when one is given. Entering `RECEPTIONNEE` from another state
/// stamps the submission date. When the state actually changes, one
/// transition record is appended and `RequestStateChanged` is published,
/// carrying the given profile or else the request's current one.
///
/// # Arguments
///
/// * `store` - Storage
/// * `ctx` - Bus, configuration and clock
/// * `demande_id` - The request
/// * `etat` - The new state
/// * `commentaire` - Comment attached to the change
/// * `profil_id` - Profile assigned with the change
/// * `actor` - The acting user, `None` for changes driven by the workflow
///
/// # Errors
///
/// Returns `NotFound` if the request does not exist, or a store error.
pub fn modifier_demande(
    store: &mut dyn Store,
    ctx: &Context<'_>,
    demande_id: i64,
    etat: EtatDemande,
    commentaire: Option<String>,
    profil_id: Option<i64>,
    actor: Option<&Actor>,
) -> Result<Demande, CoreError> {
    let mut demande: Demande = charger_demande(store, demande_id)?;
    let etat_precedent: EtatDemande = demande.etat;
    let changed: bool = etat_precedent != etat;

    demande.etat = etat;
    if let Some(profil_id) = profil_id {
        demande.profil_attribue = Some(profil_id);
    }
    if commentaire.is_some() {
        demande.commentaire.clone_from(&commentaire);
    }
    if changed && etat == EtatDemande::Receptionnee {
        demande.date_depot = Some(ctx.now);
    }

    let demande: Demande = store.save_demande(demande)?;

    if !changed {
        ctx.events.publish(DomainEvent::ResourceModified {
            resource: ResourceRef::new(ResourceKind::Demande, demande_id),
        });
        return Ok(demande);
    }

    let modifie_par: Option<String> = actor.and_then(Actor::uid).map(str::to_string);
    store.append_modification(ModificationEtatDemande {
        demande_id,
        etat_precedent,
        etat,
        modifie_par: modifie_par.clone(),
        profil_id,
        commentaire: commentaire.clone(),
        date: ctx.now,
    })?;

    info!(
        demande_id,
        from = %etat_precedent,
        to = %etat,
        actor = modifie_par.as_deref().unwrap_or("system"),
        "Request state changed"
    );
    ctx.events.publish(DomainEvent::RequestStateChanged {
        demande_id,
        old_state: etat_precedent,
        new_state: etat,
        actor: modifie_par,
        comment: commentaire,
        profil_id: profil_id.or(demande.profil_attribue),
    });

    Ok(demande)
}

/// Returns whether the applicant wants a staff accompaniment.
///
/// Always true unless the request type makes accompaniment optional and the
/// applicant answered "no" to the accompaniment question.
#[must_use]
pub fn demande_avec_accompagnement(type_demande: &TypeDemande, demande: &Demande) -> bool {
    if !type_demande.accompagnement_optionnel {
        return true;
    }

    !demande
        .reponse(QUESTION_ACCOMPAGNEMENT_ID)
        .is_some_and(|reponse| reponse.options.contains(&OPTION_ACCOMPAGNEMENT_NON_ID))
}

/// Returns the disability typologies selected in the request's answers.
#[must_use]
pub fn typologies_handicap(type_demande: &TypeDemande, demande: &Demande) -> BTreeSet<i64> {
    type_demande
        .questions()
        .into_iter()
        .filter(|q| q.table_liee == Some(TableLiee::TypologieHandicap))
        .find_map(|q| demande.reponse(q.id))
        .map(|reponse| reponse.typologies.iter().copied().collect())
        .unwrap_or_default()
}

/// Attaches the charters of the request's assigned profile.
///
/// Each charter not yet recorded against the request is copied as a
/// snapshot of its current title and text.
///
/// # Returns
///
/// The request and the number of charters attached.
///
/// # Errors
///
/// Returns `NotFound` if the request, its profile or a charter does not
/// exist, or a store error.
pub fn ajouter_chartes(
    store: &mut dyn Store,
    ctx: &Context<'_>,
    demande_id: i64,
) -> Result<(Demande, usize), CoreError> {
    let mut demande: Demande = charger_demande(store, demande_id)?;
    let Some(profil_id) = demande.profil_attribue else {
        return Ok((demande, 0));
    };
    let profil: ProfilBeneficiaire = store
        .profil(profil_id)?
        .ok_or_else(|| CoreError::not_found("profil", profil_id))?;

    let mut attached: usize = 0;
    for charte_id in profil.chartes {
        if demande.chartes.iter().any(|c| c.charte_id == charte_id) {
            continue;
        }
        let charte: Charte = store
            .charte(charte_id)?
            .ok_or_else(|| CoreError::not_found("charte", charte_id))?;
        demande.chartes.push(CharteDemandeur {
            charte_id,
            libelle: charte.libelle,
            contenu: charte.contenu,
            date_validation: None,
        });
        attached += 1;
    }

    if attached == 0 {
        return Ok((demande, 0));
    }

    debug!(demande_id, attached, "Charters attached");
    let demande: Demande = store.save_demande(demande)?;
    ctx.events.publish(DomainEvent::ResourceModified {
        resource: ResourceRef::new(ResourceKind::Demande, demande_id),
    });
    Ok((demande, attached))
}

/// Records the applicant's acceptance of one charter.
///
/// Accepting an already accepted charter keeps the first acceptance date.
///
/// # Errors
///
/// Returns `NotFound` if the request or the charter snapshot does not exist,
/// or a store error.
pub fn valider_charte(
    store: &mut dyn Store,
    ctx: &Context<'_>,
    demande_id: i64,
    charte_id: i64,
) -> Result<Demande, CoreError> {
    let mut demande: Demande = charger_demande(store, demande_id)?;
    let snapshot: &mut CharteDemandeur = demande
        .chartes
        .iter_mut()
        .find(|c| c.charte_id == charte_id)
        .ok_or_else(|| CoreError::not_found("charte", charte_id))?;

    if snapshot.date_validation.is_some() {
        return Ok(demande);
    }
    snapshot.date_validation = Some(ctx.now);

    let demande: Demande = store.save_demande(demande)?;
    ctx.events.publish(DomainEvent::ResourceModified {
        resource: ResourceRef::new(ResourceKind::Demande, demande_id),
    });
    Ok(demande)
}

/// Returns the transition history of a request, oldest first.
///
/// # Errors
///
/// Returns `NotFound` if the request does not exist, or a store error.
pub fn historique(
    store: &dyn Store,
    demande_id: i64,
) -> Result<Vec<ModificationEtatDemande>, CoreError> {
    charger_demande(store, demande_id)?;
    Ok(store.modifications(demande_id)?)
}

/// Counts in-progress requests per state.
///
/// Staff see every request, applicants only their own.
///
/// # Errors
///
/// Returns an error if the store fails.
pub fn tableau_de_bord_demandes(
    store: &dyn Store,
    uid: &str,
    is_staff: bool,
) -> Result<BTreeMap<EtatDemande, usize>, CoreError> {
    let demandes: Vec<Demande> = store.demandes()?;
    Ok(count_demandes_by_etat(
        demandes.iter().filter(|d| is_staff || d.demandeur == uid),
    ))
}
