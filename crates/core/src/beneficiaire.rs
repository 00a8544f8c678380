// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Beneficiary derivation and maintenance.

use crate::config::Context;
use crate::demande::{
    charger_demande, demande_avec_accompagnement, type_demande_de, typologies_handicap,
};
use crate::error::CoreError;
use crate::identity::refresh_inscriptions;
use crate::store::Store;
use handisup_audit::{Actor, DomainEvent, ResourceKind, ResourceRef};
use handisup_domain::{
    AnneeUniversitaire, Beneficiaire, ChampCible, Demande, DomainError, PieceJointeBeneficiaire,
    Role, SetDelta, TypeDemande, Utilisateur, reconcile,
};
use std::collections::BTreeSet;
use time::{Date, Month};
use tracing::{debug, info};

/// A beneficiary grant as submitted by staff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BeneficiaireSaisie {
    /// Grant to update, `None` to create one.
    pub id: Option<i64>,
    /// The beneficiary's user identifier.
    pub utilisateur: String,
    /// Assigned profile.
    pub profil_id: i64,
    /// Staff member in charge.
    pub gestionnaire: String,
    /// First day of validity.
    pub debut: Date,
    /// First day after validity.
    pub fin: Option<Date>,
    /// Whether a staff accompaniment is provided.
    pub avec_accompagnement: bool,
    /// Disability typologies.
    pub typologies: BTreeSet<i64>,
}

/// Picks the profile a request leads to.
///
/// An explicit override wins, then the profile already assigned to the
/// request, then the single profile of the request's type.
///
/// # Errors
///
/// Returns `AmbiguousProfile` if the type offers several profiles and none
/// was chosen, `MissingProfile` if it offers none.
pub fn resoudre_profil(
    demande: &Demande,
    type_demande: &TypeDemande,
    profil_override: Option<i64>,
) -> Result<i64, CoreError> {
    if let Some(profil_id) = profil_override.or(demande.profil_attribue) {
        return Ok(profil_id);
    }

    let demande_id: i64 = demande.id.unwrap_or_default();
    match type_demande.profils.as_slice() {
        [profil_id] => Ok(*profil_id),
        [] => Err(CoreError::MissingProfile { demande_id }),
        candidates => Err(CoreError::AmbiguousProfile {
            demande_id,
            candidates: candidates.to_vec(),
        }),
    }
}

/// Creates or updates the beneficiary grant an approved request leads to.
///
/// The grant covers the campaign's target academic year, or the current one
/// when the campaign has no target. An existing grant of the applicant
/// starting on the same day is updated rather than duplicated. Contact
/// answers are copied into the applicant's record and uploaded files become
/// permanent attachments.
///
/// # Arguments
///
/// * `store` - Storage
/// * `ctx` - Bus, configuration and clock
/// * `demande_id` - The approved request
/// * `profil_override` - Profile chosen by staff, if any
/// * `gestionnaire` - The staff member taking charge
///
/// # Errors
///
/// Returns an error if:
/// - The request, its campaign, type, profile or applicant does not exist
/// - No single profile can be resolved
/// - The store fails
pub fn creer_beneficiaire_pour_demande(
    store: &mut dyn Store,
    ctx: &Context<'_>,
    demande_id: i64,
    profil_override: Option<i64>,
    gestionnaire: &Actor,
) -> Result<Beneficiaire, CoreError> {
    let demande: Demande = charger_demande(store, demande_id)?;
    let (campagne, type_demande) = type_demande_de(store, &demande)?;

    let profil_id: i64 = resoudre_profil(&demande, &type_demande, profil_override)?;
    if store.profil(profil_id)?.is_none() {
        return Err(CoreError::not_found("profil", profil_id));
    }
    if store.utilisateur(&demande.demandeur)?.is_none() {
        return Err(CoreError::NotFound {
            kind: "utilisateur",
            id: demande.demandeur.clone(),
        });
    }

    let mois: Month = ctx.config.mois_debut_annee;
    let annee: AnneeUniversitaire = campagne.annee_cible.map_or_else(
        || AnneeUniversitaire::containing(ctx.now.date(), mois),
        |annee| AnneeUniversitaire::new(annee, mois),
    );
    let (debut, fin) = annee.window()?;

    let mut beneficiaire: Beneficiaire = store
        .beneficiaires()?
        .into_iter()
        .find(|b| b.utilisateur == demande.demandeur && b.debut == debut)
        .unwrap_or_else(|| Beneficiaire {
            id: None,
            utilisateur: demande.demandeur.clone(),
            profil_id,
            gestionnaire: gestionnaire.id.clone(),
            debut,
            fin: Some(fin),
            avec_accompagnement: true,
            typologies: BTreeSet::new(),
            tags: BTreeSet::new(),
        });

    beneficiaire.profil_id = profil_id;
    beneficiaire.gestionnaire.clone_from(&gestionnaire.id);
    beneficiaire.fin = Some(fin);
    beneficiaire.avec_accompagnement = demande_avec_accompagnement(&type_demande, &demande);
    reconcile(
        &mut beneficiaire.typologies,
        &typologies_handicap(&type_demande, &demande),
    );

    let is_creation: bool = beneficiaire.id.is_none();
    let beneficiaire: Beneficiaire = store.save_beneficiaire(beneficiaire)?;
    let beneficiaire_id: i64 = beneficiaire.id.unwrap_or_default();
    info!(
        demande_id,
        beneficiaire_id,
        profil_id,
        is_creation,
        "Beneficiary derived from request"
    );

    copier_reponses(store, ctx, &type_demande, &demande, gestionnaire)?;
    accorder_role_beneficiaire(store, ctx, &demande.demandeur)?;

    ctx.events.publish(DomainEvent::ResourceModified {
        resource: ResourceRef::new(ResourceKind::Beneficiaire, beneficiaire_id),
    });
    Ok(beneficiaire)
}

/// Creates or updates a beneficiary grant from a staff submission.
///
/// The window, profile, manager and accompaniment flag are always reset;
/// typologies are reconciled and tags left untouched. The applicant's
/// enrollments are refreshed afterwards, best-effort.
///
/// # Errors
///
/// Returns an error if:
/// - The grant id, user or profile does not exist
/// - The window ends before it starts
/// - The store fails
pub fn maj_beneficiaires(
    store: &mut dyn Store,
    ctx: &Context<'_>,
    saisie: BeneficiaireSaisie,
) -> Result<Beneficiaire, CoreError> {
    if saisie.fin.is_some_and(|fin| fin <= saisie.debut) {
        return Err(CoreError::DomainViolation(DomainError::InvalidPeriode {
            reason: format!("beneficiary window ends before it starts on {}", saisie.debut),
        }));
    }
    if store.utilisateur(&saisie.utilisateur)?.is_none() {
        return Err(CoreError::NotFound {
            kind: "utilisateur",
            id: saisie.utilisateur,
        });
    }
    if store.profil(saisie.profil_id)?.is_none() {
        return Err(CoreError::not_found("profil", saisie.profil_id));
    }

    let mut beneficiaire: Beneficiaire = match saisie.id {
        Some(id) => store
            .beneficiaire(id)?
            .ok_or_else(|| CoreError::not_found("beneficiaire", id))?,
        None => Beneficiaire {
            id: None,
            utilisateur: saisie.utilisateur.clone(),
            profil_id: saisie.profil_id,
            gestionnaire: saisie.gestionnaire.clone(),
            debut: saisie.debut,
            fin: saisie.fin,
            avec_accompagnement: saisie.avec_accompagnement,
            typologies: BTreeSet::new(),
            tags: BTreeSet::new(),
        },
    };

    beneficiaire.profil_id = saisie.profil_id;
    beneficiaire.gestionnaire = saisie.gestionnaire;
    beneficiaire.debut = saisie.debut;
    beneficiaire.fin = saisie.fin;
    beneficiaire.avec_accompagnement = saisie.avec_accompagnement;
    let delta: SetDelta<i64> = reconcile(&mut beneficiaire.typologies, &saisie.typologies);
    debug!(
        added = delta.added.len(),
        removed = delta.removed.len(),
        "Typologies reconciled"
    );

    let beneficiaire: Beneficiaire = store.save_beneficiaire(beneficiaire)?;
    if beneficiaire.is_active_on(ctx.now.date()) {
        accorder_role_beneficiaire(store, ctx, &beneficiaire.utilisateur)?;
    }
    refresh_inscriptions(store, ctx, &beneficiaire.utilisateur, false)?;

    ctx.events.publish(DomainEvent::ResourceModified {
        resource: ResourceRef::new(ResourceKind::Beneficiaire, beneficiaire.id.unwrap_or_default()),
    });
    Ok(beneficiaire)
}

fn accorder_role_beneficiaire(
    store: &mut dyn Store,
    ctx: &Context<'_>,
    uid: &str,
) -> Result<(), CoreError> {
    let mut utilisateur: Utilisateur =
        store
            .utilisateur(uid)?
            .ok_or_else(|| CoreError::NotFound {
                kind: "utilisateur",
                id: uid.to_string(),
            })?;

    if utilisateur.roles.insert(Role::Beneficiaire) {
        store.save_utilisateur(utilisateur)?;
        ctx.events.publish(DomainEvent::RoleSetChanged {
            role: Role::Beneficiaire,
            uid: uid.to_string(),
        });
    }
    Ok(())
}

/// Copies contact answers into the applicant's record and turns uploaded
/// files into permanent attachments.
fn copier_reponses(
    store: &mut dyn Store,
    ctx: &Context<'_>,
    type_demande: &TypeDemande,
    demande: &Demande,
    gestionnaire: &Actor,
) -> Result<(), CoreError> {
    let uid: &str = &demande.demandeur;
    let mut utilisateur: Utilisateur =
        store
            .utilisateur(uid)?
            .ok_or_else(|| CoreError::NotFound {
                kind: "utilisateur",
                id: uid.to_string(),
            })?;

    let mut contact_modifie: bool = false;
    for question in type_demande.questions() {
        let Some(champ) = question.champ_cible else {
            continue;
        };
        let Some(valeur) = demande
            .reponse(question.id)
            .and_then(|r| r.commentaire.as_deref())
            .map(str::trim)
            .filter(|v| !v.is_empty())
        else {
            continue;
        };
        let cible: &mut Option<String> = match champ {
            ChampCible::TelPerso => &mut utilisateur.tel_perso,
            ChampCible::EmailPerso => &mut utilisateur.email_perso,
            ChampCible::ContactUrgence => &mut utilisateur.contact_urgence,
        };
        if cible.as_deref() != Some(valeur) {
            *cible = Some(valeur.to_string());
            contact_modifie = true;
        }
    }
    if contact_modifie {
        store.save_utilisateur(utilisateur)?;
        ctx.events.publish(DomainEvent::ResourceModified {
            resource: ResourceRef::utilisateur(uid),
        });
    }

    let deja_converties: BTreeSet<i64> = store
        .pieces_jointes(uid)?
        .into_iter()
        .map(|p| p.fichier_id)
        .collect();
    for reponse in &demande.reponses {
        let libelle: String = type_demande
            .question(reponse.question_id)
            .map_or_else(String::new, |q| q.libelle.clone());
        for fichier in &reponse.pieces_jointes {
            if deja_converties.contains(&fichier.id) {
                continue;
            }
            store.save_piece_jointe(PieceJointeBeneficiaire {
                id: None,
                utilisateur: uid.to_string(),
                fichier_id: fichier.id,
                libelle: libelle.clone(),
                ajoute_par: gestionnaire.id.clone(),
                date_depot: ctx.now,
            })?;
            debug!(uid, fichier_id = fichier.id, "Upload kept as beneficiary attachment");
        }
    }
    Ok(())
}
