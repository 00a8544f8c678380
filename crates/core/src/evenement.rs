// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! The event and intervention manager.
//!
//! Like the request manager, it assumes the overlap, lock and beneficiary
//! validators already ran.

use crate::config::Context;
use crate::error::CoreError;
use crate::store::Store;
use handisup_audit::{Actor, DomainEvent, ResourceKind, ResourceRef};
use handisup_domain::{
    Evenement, InterventionForfait, PeriodeRh, TableauDeBordEvenements, Tracabilite,
    TypeEvenement, reconcile, tableau_de_bord_evenements,
};
use std::collections::BTreeSet;
use time::PrimitiveDateTime;
use tracing::{debug, info, warn};

/// An event as submitted by a planner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvenementSaisie {
    /// Event to update, `None` to create one.
    pub id: Option<i64>,
    /// Event type.
    pub type_id: i64,
    /// Start.
    pub debut: PrimitiveDateTime,
    /// End.
    pub fin: PrimitiveDateTime,
    /// Preparation minutes.
    pub temps_preparation: u32,
    /// Extra minutes.
    pub temps_supplementaire: u32,
    /// Campus.
    pub campus_id: Option<i64>,
    /// Room.
    pub salle: Option<String>,
    /// Staff member delivering the event.
    pub intervenant: Option<String>,
    /// Beneficiaries.
    pub beneficiaires: BTreeSet<String>,
    /// Substitutes.
    pub suppleants: BTreeSet<String>,
    /// Teachers.
    pub enseignants: BTreeSet<String>,
    /// Equipment.
    pub equipements: BTreeSet<i64>,
    /// Whether the event is cancelled.
    pub annule: bool,
    /// Reinforcement validation flag, ignored for other types.
    pub valide: Option<bool>,
}

impl EvenementSaisie {
    /// Returns the event the submission would store, without stamps.
    ///
    /// Used to run validators before [`maj_evenement`].
    #[must_use]
    pub fn candidat(&self, now: PrimitiveDateTime) -> Evenement {
        let mut evenement: Evenement = Evenement::new(self.type_id, self.debut, self.fin);
        evenement.id = self.id;
        evenement.temps_preparation = self.temps_preparation;
        evenement.temps_supplementaire = self.temps_supplementaire;
        evenement.campus_id = self.campus_id;
        evenement.salle.clone_from(&self.salle);
        evenement.intervenant.clone_from(&self.intervenant);
        evenement.beneficiaires.clone_from(&self.beneficiaires);
        evenement.suppleants.clone_from(&self.suppleants);
        evenement.enseignants.clone_from(&self.enseignants);
        evenement.equipements.clone_from(&self.equipements);
        evenement.date_annulation = self.annule.then_some(now);
        evenement
    }
}

/// Returns the id of the HR period containing a day.
#[must_use]
pub fn periode_de(periodes: &[PeriodeRh], debut: PrimitiveDateTime) -> Option<i64> {
    periodes
        .iter()
        .find(|p| p.contains(debut.date()))
        .and_then(|p| p.id)
}

/// Creates or updates an event.
///
/// Collections are reconciled against the submission. The cancellation date
/// follows the `annule` flag. A reinforcement event is validated once when
/// the flag is first set; clearing it afterwards is ignored. The HR period
/// is recomputed from the start. `EventModified` is published with the
/// previous start only when an existing event moved.
///
/// # Errors
///
/// Returns `NotFound` if the event or its type does not exist, or a store
/// error.
pub fn maj_evenement(
    store: &mut dyn Store,
    ctx: &Context<'_>,
    saisie: EvenementSaisie,
    actor: &Actor,
) -> Result<Evenement, CoreError> {
    let type_evenement: TypeEvenement = store
        .type_evenement(saisie.type_id)?
        .ok_or_else(|| CoreError::not_found("type_evenement", saisie.type_id))?;

    let mut evenement: Evenement = match saisie.id {
        Some(id) => store
            .evenement(id)?
            .ok_or_else(|| CoreError::not_found("evenement", id))?,
        None => Evenement::new(saisie.type_id, saisie.debut, saisie.fin),
    };
    let is_creation: bool = evenement.id.is_none();
    let debut_precedent: PrimitiveDateTime = evenement.debut;

    evenement.type_id = saisie.type_id;
    evenement.debut = saisie.debut;
    evenement.fin = saisie.fin;
    evenement.temps_preparation = saisie.temps_preparation;
    evenement.temps_supplementaire = saisie.temps_supplementaire;
    evenement.campus_id = saisie.campus_id;
    evenement.salle = saisie.salle;
    evenement.intervenant = saisie.intervenant;
    reconcile(&mut evenement.beneficiaires, &saisie.beneficiaires);
    reconcile(&mut evenement.suppleants, &saisie.suppleants);
    reconcile(&mut evenement.enseignants, &saisie.enseignants);
    reconcile(&mut evenement.equipements, &saisie.equipements);

    match (saisie.annule, evenement.date_annulation) {
        (true, None) => evenement.date_annulation = Some(ctx.now),
        (false, Some(_)) => evenement.date_annulation = None,
        _ => {}
    }

    if type_evenement.is_renfort() {
        match (saisie.valide, evenement.date_validation) {
            (Some(true), None) => evenement.date_validation = Some(ctx.now),
            (Some(false), Some(date)) => {
                warn!(
                    evenement_id = evenement.id,
                    validated_on = %date,
                    "Reinforcement validation cannot be withdrawn, keeping it"
                );
            }
            _ => {}
        }
    }

    evenement.periode_id = periode_de(&store.periodes()?, evenement.debut);

    evenement.tracabilite = Some(match evenement.tracabilite.take() {
        Some(mut tracabilite) => {
            tracabilite.modifie_par = Some(actor.id.clone());
            tracabilite.modifie_le = Some(ctx.now);
            tracabilite
        }
        None => Tracabilite {
            cree_par: actor.id.clone(),
            cree_le: ctx.now,
            modifie_par: None,
            modifie_le: None,
        },
    });

    let evenement: Evenement = store.save_evenement(evenement)?;
    let evenement_id: i64 = evenement.id.unwrap_or_default();
    let prior_start: Option<PrimitiveDateTime> =
        (!is_creation && debut_precedent != evenement.debut).then_some(debut_precedent);

    info!(evenement_id, is_creation, moved = prior_start.is_some(), "Event saved");
    ctx.events.publish(DomainEvent::EventModified {
        evenement_id,
        prior_start,
        is_creation,
    });
    Ok(evenement)
}

/// Creates or updates a lump-sum intervention.
///
/// # Errors
///
/// Returns `NotFound` if the event type or period does not exist, or a
/// store error.
pub fn maj_intervention_forfait(
    store: &mut dyn Store,
    ctx: &Context<'_>,
    intervention: InterventionForfait,
) -> Result<InterventionForfait, CoreError> {
    if store.type_evenement(intervention.type_id)?.is_none() {
        return Err(CoreError::not_found("type_evenement", intervention.type_id));
    }
    if !store
        .periodes()?
        .iter()
        .any(|p| p.id == Some(intervention.periode_id))
    {
        return Err(CoreError::not_found("periode_rh", intervention.periode_id));
    }

    let intervention: InterventionForfait = store.save_intervention_forfait(intervention)?;
    let intervention_id: i64 = intervention.id.unwrap_or_default();
    debug!(intervention_id, "Lump-sum intervention saved");
    ctx.events.publish(DomainEvent::ResourceModified {
        resource: ResourceRef::new(ResourceKind::InterventionForfait, intervention_id),
    });
    Ok(intervention)
}

/// Computes the event dashboard.
///
/// Staff see every event, intervenants only those they deliver.
///
/// # Errors
///
/// Returns an error if the store fails.
pub fn tableau_de_bord(
    store: &dyn Store,
    ctx: &Context<'_>,
    intervenant: Option<&str>,
) -> Result<TableauDeBordEvenements, CoreError> {
    let evenements: Vec<Evenement> = store
        .evenements()?
        .into_iter()
        .filter(|e| intervenant.is_none() || e.intervenant.as_deref() == intervenant)
        .collect();

    Ok(tableau_de_bord_evenements(
        &evenements,
        &store.beneficiaires()?,
        &store.demandes()?,
        ctx.now.date(),
        ctx.config.fenetres_non_affectes,
    ))
}
