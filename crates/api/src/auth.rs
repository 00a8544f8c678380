// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! The acting user handed to every handler.
//!
//! Credentials are checked upstream; the boundary only resolves the claimed
//! handle to a local user and its roles.

use handisup::Store;
use handisup_audit::Actor;
use handisup_domain::{Role, Utilisateur};
use std::collections::BTreeSet;

use crate::error::AuthError;

/// An authenticated user with the roles it holds locally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedActor {
    /// Directory handle of the user.
    pub uid: String,
    /// Roles granted locally.
    pub roles: BTreeSet<Role>,
}

impl AuthenticatedActor {
    /// Creates a new authenticated actor.
    ///
    /// # Arguments
    ///
    /// * `uid` - Directory handle of the user
    /// * `roles` - Roles the user holds
    #[must_use]
    pub const fn new(uid: String, roles: BTreeSet<Role>) -> Self {
        Self { uid, roles }
    }

    /// Returns true if the actor holds the role.
    #[must_use]
    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }

    /// Administrators bypass HR period locks.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.has_role(Role::Admin)
    }

    /// Staff see every request and every event.
    #[must_use]
    pub fn is_staff(&self) -> bool {
        self.roles.iter().any(Role::is_staff)
    }

    /// Converts this actor into the audit actor recorded in history.
    #[must_use]
    pub fn to_audit_actor(&self) -> Actor {
        Actor::user(&self.uid)
    }
}

/// Resolves a claimed handle to an authenticated actor.
///
/// # Arguments
///
/// * `store` - Storage holding the local users
/// * `uid` - The claimed handle
///
/// # Errors
///
/// Returns `AuthError::AuthenticationFailed` if the handle is empty or not a
/// known local user, or if the lookup fails.
pub fn authenticate_stub(store: &dyn Store, uid: &str) -> Result<AuthenticatedActor, AuthError> {
    if uid.trim().is_empty() {
        return Err(AuthError::AuthenticationFailed {
            reason: String::from("Actor uid cannot be empty"),
        });
    }

    let utilisateur: Utilisateur = store
        .utilisateur(uid)
        .map_err(|err| AuthError::AuthenticationFailed {
            reason: err.to_string(),
        })?
        .ok_or_else(|| AuthError::AuthenticationFailed {
            reason: format!("Unknown user '{uid}'"),
        })?;

    Ok(AuthenticatedActor::new(utilisateur.uid, utilisateur.roles))
}
