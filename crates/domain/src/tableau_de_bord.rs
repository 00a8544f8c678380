// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Dashboard aggregates.
//!
//! Aggregates are **computed**, not stored. They are pure functions of the
//! rows handed in.

use crate::beneficiaire::Beneficiaire;
use crate::demande::Demande;
use crate::etat_demande::EtatDemande;
use crate::evenement::Evenement;
use crate::types::ProfilBeneficiaire;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use time::{Date, Duration};

/// Counts in-progress requests per state.
///
/// Terminal states are left out.
#[must_use]
pub fn count_demandes_by_etat<'a>(
    demandes: impl IntoIterator<Item = &'a Demande>,
) -> BTreeMap<EtatDemande, usize> {
    let mut counts: BTreeMap<EtatDemande, usize> = BTreeMap::new();
    for demande in demandes {
        if demande.etat.is_in_progress() {
            *counts.entry(demande.etat).or_insert(0) += 1;
        }
    }
    counts
}

/// Event and backlog counters shown to staff.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableauDeBordEvenements {
    /// Events starting today.
    pub aujourdhui: usize,
    /// Events starting this week, Monday to Sunday.
    pub cette_semaine: usize,
    /// This week minus last week.
    pub evolution_semaine: i64,
    /// Events starting this calendar month.
    pub ce_mois: usize,
    /// This month minus last month.
    pub evolution_mois: i64,
    /// Events without intervenant in the short rolling window.
    pub non_affectes_court: usize,
    /// Events without intervenant in the long rolling window.
    pub non_affectes_long: usize,
    /// Active beneficiaries whose profile is still to be determined.
    pub profils_incomplets: usize,
    /// Requests waiting for the committee.
    pub demandes_attente_commission: usize,
    /// Requests received but not yet checked.
    pub demandes_a_verifier: usize,
}

/// Rolling windows, in days from today, for unassigned events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FenetresNonAffectes {
    /// Short window.
    pub court: u16,
    /// Long window.
    pub long: u16,
}

fn week_start(date: Date) -> Date {
    date.saturating_sub(Duration::days(i64::from(
        date.weekday().number_days_from_monday(),
    )))
}

fn month_start(date: Date) -> Date {
    date.saturating_sub(Duration::days(i64::from(date.day()) - 1))
}

fn within(date: Date, start: Date, days: i64) -> bool {
    start <= date && date < start.saturating_add(Duration::days(days))
}

fn delta(current: usize, previous: usize) -> i64 {
    i64::try_from(current).unwrap_or(i64::MAX) - i64::try_from(previous).unwrap_or(i64::MAX)
}

/// Computes the staff dashboard.
///
/// Cancelled events are not counted.
///
/// # Arguments
///
/// * `evenements` - Events in scope
/// * `beneficiaires` - Every beneficiary grant
/// * `demandes` - Every request
/// * `today` - The reference day
/// * `fenetres` - Rolling windows for unassigned events
#[must_use]
pub fn tableau_de_bord_evenements(
    evenements: &[Evenement],
    beneficiaires: &[Beneficiaire],
    demandes: &[Demande],
    today: Date,
    fenetres: FenetresNonAffectes,
) -> TableauDeBordEvenements {
    let this_week: Date = week_start(today);
    let last_week: Date = this_week.saturating_sub(Duration::days(7));
    let this_month: Date = month_start(today);
    let last_month: Date = month_start(this_month.saturating_sub(Duration::days(1)));
    let same_month = |a: Date, b: Date| a.year() == b.year() && a.month() == b.month();

    let actifs: Vec<Date> = evenements
        .iter()
        .filter(|e| !e.is_annule())
        .map(|e| e.debut.date())
        .collect();

    let semaine: usize = actifs.iter().filter(|d| within(**d, this_week, 7)).count();
    let semaine_precedente: usize = actifs.iter().filter(|d| within(**d, last_week, 7)).count();
    let mois: usize = actifs.iter().filter(|d| same_month(**d, this_month)).count();
    let mois_precedent: usize = actifs
        .iter()
        .filter(|d| same_month(**d, last_month))
        .count();

    let non_affectes = |days: u16| -> usize {
        evenements
            .iter()
            .filter(|e| !e.is_annule() && e.intervenant.is_none())
            .filter(|e| within(e.debut.date(), today, i64::from(days)))
            .count()
    };

    TableauDeBordEvenements {
        aujourdhui: actifs.iter().filter(|d| **d == today).count(),
        cette_semaine: semaine,
        evolution_semaine: delta(semaine, semaine_precedente),
        ce_mois: mois,
        evolution_mois: delta(mois, mois_precedent),
        non_affectes_court: non_affectes(fenetres.court),
        non_affectes_long: non_affectes(fenetres.long),
        profils_incomplets: beneficiaires
            .iter()
            .filter(|b| b.profil_id == ProfilBeneficiaire::A_DETERMINER && b.is_active_on(today))
            .count(),
        demandes_attente_commission: demandes
            .iter()
            .filter(|d| d.etat == EtatDemande::AttenteCommission)
            .count(),
        demandes_a_verifier: demandes
            .iter()
            .filter(|d| d.etat == EtatDemande::Receptionnee)
            .count(),
    }
}
