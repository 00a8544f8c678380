// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Identity resolution against the external directory and enrollment
//! backend.
//!
//! Users are bootstrapped locally on first reference. A directory failure is
//! fatal to resolution since unknown users have no local fallback, whereas
//! enrollment refreshes are best-effort and never fail the caller.

use crate::config::Context;
use crate::error::CoreError;
use crate::store::Store;
use handisup_audit::{DomainEvent, ResourceRef};
use handisup_domain::{AnneeUniversitaire, Inscription, Role, Utilisateur};
use thiserror::Error;
use time::Date;
use tracing::{debug, info, warn};

/// Attributes requested from the directory.
pub const DIRECTORY_ATTRIBUTES: [&str; 4] = ["uid", "sn", "givenName", "mail"];

/// A person as returned by the directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryRecord {
    /// Handle.
    pub uid: String,
    /// Family name.
    pub nom: String,
    /// Given name.
    pub prenom: String,
    /// Institutional e-mail.
    pub email: String,
}

/// Directory failures.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DirectoryError {
    /// The directory could not be reached or refused the bind.
    #[error("Directory unavailable: {0}")]
    Unavailable(String),

    /// The filter expression was rejected.
    #[error("Invalid directory filter: {0}")]
    InvalidFilter(String),
}

/// Enrollment backend failures.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EnrollmentError {
    /// The backend could not be reached.
    #[error("Enrollment backend unavailable: {0}")]
    BackendUnavailable(String),
}

/// The external identity directory.
pub trait IdentityProvider: Send + Sync {
    /// Looks up a single person by handle.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory is unreachable.
    fn search_by_handle(
        &self,
        handle: &str,
        attributes: &[&str],
    ) -> Result<Option<DirectoryRecord>, DirectoryError>;

    /// Runs a filter query. Paging is the provider's concern.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory is unreachable or rejects the
    /// filter.
    fn query(
        &self,
        filter: &str,
        attributes: &[&str],
    ) -> Result<Vec<DirectoryRecord>, DirectoryError>;
}

/// The external enrollment backend.
pub trait EnrollmentProvider: Send + Sync {
    /// Returns a user's enrollments between two days.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend is unreachable.
    fn get_enrollments(
        &self,
        uid: &str,
        since: Date,
        until: Option<Date>,
    ) -> Result<Vec<Inscription>, EnrollmentError>;
}

/// Escapes a value for use inside a directory filter.
#[must_use]
pub fn escape_filter_value(value: &str) -> String {
    let mut escaped: String = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '*' => escaped.push_str("\\2a"),
            '(' => escaped.push_str("\\28"),
            ')' => escaped.push_str("\\29"),
            '\\' => escaped.push_str("\\5c"),
            '\0' => escaped.push_str("\\00"),
            other => escaped.push(other),
        }
    }
    escaped
}

/// Returns the local user, creating it from the directory on first sight.
///
/// A newly created user gets a best-effort enrollment refresh.
///
/// # Errors
///
/// Returns an error if:
/// - The directory is unreachable (`ServiceUnavailable`)
/// - The directory does not know the handle (`NotFound`)
/// - The store fails
pub fn resolve_utilisateur(
    store: &mut dyn Store,
    directory: &dyn IdentityProvider,
    ctx: &Context<'_>,
    uid: &str,
) -> Result<Utilisateur, CoreError> {
    if let Some(utilisateur) = store.utilisateur(uid)? {
        return Ok(utilisateur);
    }

    let record: DirectoryRecord = directory
        .search_by_handle(uid, &DIRECTORY_ATTRIBUTES)
        .map_err(|err| CoreError::ServiceUnavailable(err.to_string()))?
        .ok_or_else(|| CoreError::NotFound {
            kind: "utilisateur",
            id: uid.to_string(),
        })?;

    let utilisateur: Utilisateur = store.save_utilisateur(Utilisateur::new(
        &record.uid,
        &record.nom,
        &record.prenom,
        &record.email,
    ))?;
    info!(uid = %utilisateur.uid, "Bootstrapped local user from directory");
    ctx.events.publish(DomainEvent::ResourceModified {
        resource: ResourceRef::utilisateur(&utilisateur.uid),
    });

    refresh_inscriptions(store, ctx, &utilisateur.uid, true)?;
    Ok(store.utilisateur(uid)?.unwrap_or(utilisateur))
}

/// Searches users by handle or family-name prefix.
///
/// Local users come first; directory matches not yet known locally follow
/// and are not persisted. A directory failure only narrows the result to
/// local users.
///
/// # Errors
///
/// Returns an error if the store fails.
pub fn rechercher_utilisateurs(
    store: &dyn Store,
    directory: &dyn IdentityProvider,
    term: &str,
) -> Result<Vec<Utilisateur>, CoreError> {
    let needle: String = term.trim().to_lowercase();
    if needle.is_empty() {
        return Ok(Vec::new());
    }

    let matches = |value: &str| value.to_lowercase().starts_with(&needle);
    let mut found: Vec<Utilisateur> = store
        .utilisateurs()?
        .into_iter()
        .filter(|u| matches(&u.uid) || matches(&u.nom) || matches(&u.prenom))
        .collect();

    let escaped: String = escape_filter_value(term.trim());
    let filter: String = format!("(|(uid={escaped}*)(sn={escaped}*)(givenName={escaped}*))");
    match directory.query(&filter, &DIRECTORY_ATTRIBUTES) {
        Ok(records) => {
            for record in records {
                if !found.iter().any(|u| u.uid == record.uid) {
                    found.push(Utilisateur::new(
                        &record.uid,
                        &record.nom,
                        &record.prenom,
                        &record.email,
                    ));
                }
            }
        }
        Err(err) => warn!(error = %err, "Directory search failed, returning local users only"),
    }

    Ok(found)
}

/// Refreshes a user's cached enrollments.
///
/// Skipped when the last refresh is more recent than the configured
/// interval, unless `force` is set. A backend failure is logged and leaves
/// the cached data untouched.
///
/// # Returns
///
/// `true` if the cached enrollments were replaced.
///
/// # Errors
///
/// Returns an error if the user is unknown or the store fails.
pub fn refresh_inscriptions(
    store: &mut dyn Store,
    ctx: &Context<'_>,
    uid: &str,
    force: bool,
) -> Result<bool, CoreError> {
    let mut utilisateur: Utilisateur =
        store
            .utilisateur(uid)?
            .ok_or_else(|| CoreError::NotFound {
                kind: "utilisateur",
                id: uid.to_string(),
            })?;

    let fresh: bool = utilisateur
        .inscriptions_maj
        .is_some_and(|last| ctx.now - last < ctx.config.inscription_refresh);
    if fresh && !force {
        debug!(uid, "Enrollments are fresh, skipping refresh");
        return Ok(false);
    }

    let annee: AnneeUniversitaire =
        AnneeUniversitaire::containing(ctx.now.date(), ctx.config.mois_debut_annee);
    let since: Date = AnneeUniversitaire::new(annee.annee - 1, annee.mois_debut)
        .window()?
        .0;

    match ctx.enrollments.get_enrollments(uid, since, None) {
        Ok(inscriptions) => {
            debug!(uid, count = inscriptions.len(), "Enrollments refreshed");
            utilisateur.inscriptions = inscriptions;
            utilisateur.inscriptions_maj = Some(ctx.now);
            store.save_utilisateur(utilisateur)?;
            Ok(true)
        }
        Err(err) => {
            warn!(uid, error = %err, "Enrollment refresh failed, keeping cached data");
            Ok(false)
        }
    }
}

/// Grants the intervenant role to a user.
///
/// Granting a role the user already holds changes nothing and publishes
/// nothing.
///
/// # Errors
///
/// Returns an error if the user is unknown or the store fails.
pub fn attribuer_role_intervenant(
    store: &mut dyn Store,
    ctx: &Context<'_>,
    uid: &str,
) -> Result<Utilisateur, CoreError> {
    let mut utilisateur: Utilisateur =
        store
            .utilisateur(uid)?
            .ok_or_else(|| CoreError::NotFound {
                kind: "utilisateur",
                id: uid.to_string(),
            })?;

    if !utilisateur.roles.insert(Role::Intervenant) {
        return Ok(utilisateur);
    }

    let utilisateur: Utilisateur = store.save_utilisateur(utilisateur)?;
    info!(uid, "User promoted to intervenant");
    ctx.events.publish(DomainEvent::IntervenantCreated {
        uid: uid.to_string(),
    });
    ctx.events.publish(DomainEvent::RoleSetChanged {
        role: Role::Intervenant,
        uid: uid.to_string(),
    });
    Ok(utilisateur)
}

/// Stores a user's anonymized number.
///
/// Uniqueness is checked by the caller.
///
/// # Errors
///
/// Returns an error if the user is unknown or the store fails.
pub fn attribuer_numero_anonyme(
    store: &mut dyn Store,
    ctx: &Context<'_>,
    uid: &str,
    numero: i64,
) -> Result<Utilisateur, CoreError> {
    let mut utilisateur: Utilisateur =
        store
            .utilisateur(uid)?
            .ok_or_else(|| CoreError::NotFound {
                kind: "utilisateur",
                id: uid.to_string(),
            })?;

    utilisateur.numero_anonyme = Some(numero);
    let utilisateur: Utilisateur = store.save_utilisateur(utilisateur)?;
    ctx.events.publish(DomainEvent::ResourceModified {
        resource: ResourceRef::utilisateur(uid),
    });
    Ok(utilisateur)
}
