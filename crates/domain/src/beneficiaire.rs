// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use time::{Date, PrimitiveDateTime};

/// A time-windowed grant of beneficiary status.
///
/// The validity window is half-open: `[debut, fin)`, open-ended when `fin`
/// is `None`. Grants are archived by closing the window, never deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Beneficiaire {
    /// Identifier, `None` until persisted.
    pub id: Option<i64>,
    /// The beneficiary's user identifier.
    pub utilisateur: String,
    /// The assigned profile.
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
    #[serde(default)]
    pub typologies: BTreeSet<i64>,
    /// Free tags.
    #[serde(default)]
    pub tags: BTreeSet<i64>,
}

impl Beneficiaire {
    /// Returns true if the grant covers the date.
    #[must_use]
    pub fn is_active_on(&self, date: Date) -> bool {
        self.debut <= date && self.fin.is_none_or(|fin| date < fin)
    }
}

/// A file permanently attached to a beneficiary.
///
/// Created from files uploaded with request answers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PieceJointeBeneficiaire {
    /// Identifier, `None` until persisted.
    pub id: Option<i64>,
    /// The beneficiary's user identifier.
    pub utilisateur: String,
    /// Stored file.
    pub fichier_id: i64,
    /// Label, taken from the question the file answered.
    pub libelle: String,
    /// Staff member who converted the upload.
    pub ajoute_par: String,
    /// Conversion date.
    pub date_depot: PrimitiveDateTime,
}
