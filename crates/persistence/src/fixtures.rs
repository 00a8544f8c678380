// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Reference data seeded from JSON.
//!
//! A fixture is self-contained: every reference it makes (campaign to
//! request type, request type to profile, profile to charter) must resolve
//! inside the same document.

use crate::error::PersistenceError;
use handisup_domain::{
    Campagne, Charte, PeriodeRh, ProfilBeneficiaire, TypeDemande, TypeEvenement, Utilisateur,
    validate_periode_no_overlap,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;

/// Reference data a deployment starts from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceData {
    /// Known users.
    #[serde(default)]
    pub utilisateurs: Vec<Utilisateur>,
    /// Request types with their questionnaires.
    #[serde(default)]
    pub types_demande: Vec<TypeDemande>,
    /// Campaigns.
    #[serde(default)]
    pub campagnes: Vec<Campagne>,
    /// Beneficiary profiles.
    #[serde(default)]
    pub profils: Vec<ProfilBeneficiaire>,
    /// Charter templates.
    #[serde(default)]
    pub chartes: Vec<Charte>,
    /// Event types.
    #[serde(default)]
    pub types_evenement: Vec<TypeEvenement>,
    /// HR periods.
    #[serde(default)]
    pub periodes: Vec<PeriodeRh>,
}

impl ReferenceData {
    /// Parses reference data from a JSON document.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::SerializationError` if the document is malformed.
    pub fn from_json_str(json: &str) -> Result<Self, PersistenceError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads and parses a JSON fixture file.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::InitializationError` if the file cannot be
    /// read, or `PersistenceError::SerializationError` if it is malformed.
    pub fn from_path(path: &Path) -> Result<Self, PersistenceError> {
        let json: String = std::fs::read_to_string(path).map_err(|err| {
            PersistenceError::InitializationError(format!(
                "cannot read {}: {err}",
                path.display()
            ))
        })?;
        Self::from_json_str(&json)
    }

    /// Checks keys, cross references and HR periods.
    ///
    /// # Arguments
    ///
    /// * `stored_periodes` - Periods already stored, which loaded periods
    ///   must not overlap unless they replace them
    ///
    /// # Errors
    ///
    /// Returns the first inconsistency found.
    pub fn validate(&self, stored_periodes: &[PeriodeRh]) -> Result<(), PersistenceError> {
        unique_keys("utilisateur", self.utilisateurs.iter().map(|u| u.uid.clone()))?;
        let types_demande: BTreeSet<i64> =
            unique_keys("type_demande", self.types_demande.iter().map(|t| t.id))?;
        unique_keys("campagne", self.campagnes.iter().map(|c| c.id))?;
        let profils: BTreeSet<i64> = unique_keys("profil", self.profils.iter().map(|p| p.id))?;
        let chartes: BTreeSet<i64> = unique_keys("charte", self.chartes.iter().map(|c| c.id))?;
        unique_keys("type_evenement", self.types_evenement.iter().map(|t| t.id))?;
        unique_keys("periode_rh", self.periodes.iter().filter_map(|p| p.id))?;

        for campagne in &self.campagnes {
            if !types_demande.contains(&campagne.type_demande_id) {
                return Err(PersistenceError::DanglingReference {
                    from: format!("campagne {}", campagne.id),
                    to: format!("type_demande {}", campagne.type_demande_id),
                });
            }
            if campagne.fin < campagne.debut {
                return Err(PersistenceError::InvalidReferenceData(format!(
                    "campagne {} closes before it opens",
                    campagne.id
                )));
            }
        }

        for type_demande in &self.types_demande {
            if let Some(missing) = type_demande.profils.iter().find(|id| !profils.contains(id)) {
                return Err(PersistenceError::DanglingReference {
                    from: format!("type_demande {}", type_demande.id),
                    to: format!("profil {missing}"),
                });
            }
        }

        for profil in &self.profils {
            if let Some(missing) = profil.chartes.iter().find(|id| !chartes.contains(id)) {
                return Err(PersistenceError::DanglingReference {
                    from: format!("profil {}", profil.id),
                    to: format!("charte {missing}"),
                });
            }
        }

        let loaded_ids: BTreeSet<i64> = self.periodes.iter().filter_map(|p| p.id).collect();
        let kept: Vec<&PeriodeRh> = stored_periodes
            .iter()
            .filter(|stored| stored.id.is_none_or(|id| !loaded_ids.contains(&id)))
            .collect();
        for (index, periode) in self.periodes.iter().enumerate() {
            let others: Vec<PeriodeRh> = self
                .periodes
                .iter()
                .enumerate()
                .filter(|(other, _)| *other != index)
                .map(|(_, other)| other.clone())
                .chain(kept.iter().map(|stored| (*stored).clone()))
                .collect();
            validate_periode_no_overlap(periode, &others)
                .map_err(|err| PersistenceError::InvalidReferenceData(err.to_string()))?;
        }

        Ok(())
    }

    /// Highest numeric identifier declared.
    #[must_use]
    pub fn highest_id(&self) -> i64 {
        self.types_demande
            .iter()
            .map(|t| t.id)
            .chain(self.campagnes.iter().map(|c| c.id))
            .chain(self.profils.iter().map(|p| p.id))
            .chain(self.chartes.iter().map(|c| c.id))
            .chain(self.types_evenement.iter().map(|t| t.id))
            .chain(self.periodes.iter().filter_map(|p| p.id))
            .max()
            .unwrap_or(0)
    }

    /// One-line count of each kind of entry, for logs.
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "{} utilisateurs, {} types_demande, {} campagnes, {} profils, {} chartes, {} types_evenement, {} periodes",
            self.utilisateurs.len(),
            self.types_demande.len(),
            self.campagnes.len(),
            self.profils.len(),
            self.chartes.len(),
            self.types_evenement.len(),
            self.periodes.len()
        )
    }
}

fn unique_keys<K, I>(kind: &'static str, keys: I) -> Result<BTreeSet<K>, PersistenceError>
where
    K: Ord + ToString,
    I: Iterator<Item = K>,
{
    let mut seen: BTreeSet<K> = BTreeSet::new();
    for key in keys {
        let display: String = key.to_string();
        if !seen.insert(key) {
            return Err(PersistenceError::DuplicateKey { kind, key: display });
        }
    }
    Ok(seen)
}
