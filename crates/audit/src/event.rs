// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use handisup_domain::{EtatDemande, Role};
use serde::{Deserialize, Serialize};
use time::PrimitiveDateTime;

/// Kinds of resources whose changes are announced on the bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    /// An accommodation request.
    Demande,
    /// A beneficiary grant.
    Beneficiaire,
    /// A scheduled event.
    Evenement,
    /// A lump-sum intervention.
    InterventionForfait,
    /// An HR period.
    PeriodeRh,
    /// A local user.
    Utilisateur,
}

impl ResourceKind {
    /// Returns the string representation of this kind.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Demande => "demande",
            Self::Beneficiaire => "beneficiaire",
            Self::Evenement => "evenement",
            Self::InterventionForfait => "intervention_forfait",
            Self::PeriodeRh => "periode_rh",
            Self::Utilisateur => "utilisateur",
        }
    }
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single resource: its kind and its identifier.
///
/// Users are identified by their directory handle, everything else by its
/// numeric id rendered as text.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ResourceRef {
    /// The resource kind.
    pub kind: ResourceKind,
    /// The resource identifier.
    pub id: String,
}

impl ResourceRef {
    /// Creates a reference to a numerically identified resource.
    #[must_use]
    pub fn new(kind: ResourceKind, id: i64) -> Self {
        Self {
            kind,
            id: id.to_string(),
        }
    }

    /// Creates a reference to a user.
    #[must_use]
    pub fn utilisateur(uid: &str) -> Self {
        Self {
            kind: ResourceKind::Utilisateur,
            id: uid.to_string(),
        }
    }
}

impl std::fmt::Display for ResourceRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.kind, self.id)
    }
}

/// Events published by the workflow core.
///
/// Events are immutable once created and published synchronously, after
/// the change they describe has been stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DomainEvent {
    /// A request changed state.
    RequestStateChanged {
        /// The request.
        demande_id: i64,
        /// State before the change.
        old_state: EtatDemande,
        /// State after the change.
        new_state: EtatDemande,
        /// Acting user, `None` for system-driven changes.
        actor: Option<String>,
        /// Comment given with the change.
        comment: Option<String>,
        /// The profile given with the change, or the request's current one.
        profil_id: Option<i64>,
    },
    /// A single resource was created or updated.
    ResourceModified {
        /// The resource.
        resource: ResourceRef,
    },
    /// A collection of resources changed as a whole.
    ResourceCollectionModified {
        /// The collection's kind.
        resource: ResourceKind,
    },
    /// An event was created or updated.
    EventModified {
        /// The event.
        evenement_id: i64,
        /// Start before the update, set only when an existing event moved.
        prior_start: Option<PrimitiveDateTime>,
        /// Whether the event was just created.
        is_creation: bool,
    },
    /// The set of users holding a role changed.
    RoleSetChanged {
        /// The role.
        role: Role,
        /// The user who gained or lost it.
        uid: String,
    },
    /// A user was promoted to intervenant.
    IntervenantCreated {
        /// The new intervenant.
        uid: String,
    },
}

impl DomainEvent {
    /// Returns a short name for the event kind, used in logs.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::RequestStateChanged { .. } => "request_state_changed",
            Self::ResourceModified { .. } => "resource_modified",
            Self::ResourceCollectionModified { .. } => "resource_collection_modified",
            Self::EventModified { .. } => "event_modified",
            Self::RoleSetChanged { .. } => "role_set_changed",
            Self::IntervenantCreated { .. } => "intervenant_created",
        }
    }
}
