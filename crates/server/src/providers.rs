// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Collaborators used when no directory or enrollment backend is wired in.
//!
//! Both report themselves unavailable. Resolving an unknown user then fails
//! with a 503, searches fall back to local users and enrollment refreshes
//! keep the cached data.

use handisup::{
    DirectoryError, DirectoryRecord, EnrollmentError, EnrollmentProvider, IdentityProvider,
};
use handisup_domain::Inscription;
use time::Date;
use tracing::debug;

/// Identity directory that is never reachable.
#[derive(Debug, Default, Clone, Copy)]
pub struct OfflineDirectory;

impl IdentityProvider for OfflineDirectory {
    fn search_by_handle(
        &self,
        handle: &str,
        _attributes: &[&str],
    ) -> Result<Option<DirectoryRecord>, DirectoryError> {
        debug!(handle, "Directory lookup attempted while offline");
        Err(DirectoryError::Unavailable(String::from(
            "no identity directory configured",
        )))
    }

    fn query(
        &self,
        filter: &str,
        _attributes: &[&str],
    ) -> Result<Vec<DirectoryRecord>, DirectoryError> {
        debug!(filter, "Directory query attempted while offline");
        Err(DirectoryError::Unavailable(String::from(
            "no identity directory configured",
        )))
    }
}

/// Enrollment backend that is never reachable.
#[derive(Debug, Default, Clone, Copy)]
pub struct OfflineEnrollments;

impl EnrollmentProvider for OfflineEnrollments {
    fn get_enrollments(
        &self,
        _uid: &str,
        _since: Date,
        _until: Option<Date>,
    ) -> Result<Vec<Inscription>, EnrollmentError> {
        Err(EnrollmentError::BackendUnavailable(String::from(
            "no enrollment backend configured",
        )))
    }
}
