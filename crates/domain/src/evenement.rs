// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Scheduled support events and lump-sum interventions.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use time::{Duration, PrimitiveDateTime};

/// Category of a support event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeEvenement {
    /// Identifier.
    pub id: i64,
    /// Display label.
    pub libelle: String,
    /// Lump-sum billing: no beneficiary required, attached to a period.
    #[serde(default)]
    pub forfait: bool,
}

impl TypeEvenement {
    /// Reference-data id of the reinforcement type.
    pub const RENFORT_ID: i64 = -1;

    /// Returns true for the reinforcement type.
    #[must_use]
    pub const fn is_renfort(&self) -> bool {
        self.id == Self::RENFORT_ID
    }
}

/// Creation and modification stamps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tracabilite {
    /// Creator.
    pub cree_par: String,
    /// Creation time.
    pub cree_le: PrimitiveDateTime,
    /// Last modifier.
    pub modifie_par: Option<String>,
    /// Last modification time.
    pub modifie_le: Option<PrimitiveDateTime>,
}

/// A scheduled support session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Evenement {
    /// Identifier, `None` until persisted.
    pub id: Option<i64>,
    /// Event type.
    pub type_id: i64,
    /// Start.
    pub debut: PrimitiveDateTime,
    /// End.
    pub fin: PrimitiveDateTime,
    /// Preparation minutes booked before the start.
    pub temps_preparation: u32,
    /// Extra minutes booked after the end.
    pub temps_supplementaire: u32,
    /// Campus.
    pub campus_id: Option<i64>,
    /// Room.
    pub salle: Option<String>,
    /// Staff member delivering the event.
    pub intervenant: Option<String>,
    /// Beneficiaries' user identifiers.
    pub beneficiaires: BTreeSet<String>,
    /// Substitute intervenants.
    pub suppleants: BTreeSet<String>,
    /// Teachers involved.
    pub enseignants: BTreeSet<String>,
    /// Equipment ids.
    pub equipements: BTreeSet<i64>,
    /// Cancellation date.
    pub date_annulation: Option<PrimitiveDateTime>,
    /// Validation date, reinforcement events only.
    pub date_validation: Option<PrimitiveDateTime>,
    /// HR period the start falls in.
    pub periode_id: Option<i64>,
    /// Audit stamps, `None` until persisted.
    pub tracabilite: Option<Tracabilite>,
}

impl Evenement {
    /// Creates an event with empty collections.
    #[must_use]
    pub const fn new(type_id: i64, debut: PrimitiveDateTime, fin: PrimitiveDateTime) -> Self {
        Self {
            id: None,
            type_id,
            debut,
            fin,
            temps_preparation: 0,
            temps_supplementaire: 0,
            campus_id: None,
            salle: None,
            intervenant: None,
            beneficiaires: BTreeSet::new(),
            suppleants: BTreeSet::new(),
            enseignants: BTreeSet::new(),
            equipements: BTreeSet::new(),
            date_annulation: None,
            date_validation: None,
            periode_id: None,
            tracabilite: None,
        }
    }

    /// Returns true once cancelled.
    #[must_use]
    pub const fn is_annule(&self) -> bool {
        self.date_annulation.is_some()
    }

    /// Start moved earlier by the preparation time.
    #[must_use]
    pub fn debut_avec_preparation(&self) -> PrimitiveDateTime {
        self.debut
            .saturating_sub(Duration::minutes(i64::from(self.temps_preparation)))
    }

    /// End moved later by the extra time.
    #[must_use]
    pub fn fin_avec_supplement(&self) -> PrimitiveDateTime {
        self.fin
            .saturating_add(Duration::minutes(i64::from(self.temps_supplementaire)))
    }

    /// Returns true if the person delivers or attends the event.
    #[must_use]
    pub fn concerne(&self, uid: &str) -> bool {
        self.intervenant.as_deref() == Some(uid) || self.beneficiaires.contains(uid)
    }
}

/// A lump-sum intervention, billed per period rather than per event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterventionForfait {
    /// Identifier, `None` until persisted.
    pub id: Option<i64>,
    /// Event type, expected to be a lump-sum type.
    pub type_id: i64,
    /// Staff member delivering it.
    pub intervenant: String,
    /// HR period billed.
    pub periode_id: i64,
    /// Hours billed.
    pub heures: u32,
    /// Beneficiaries' user identifiers.
    #[serde(default)]
    pub beneficiaires: BTreeSet<String>,
}
