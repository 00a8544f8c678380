// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use handisup_audit::EventBus;
use handisup_domain::FenetresNonAffectes;
use time::{Duration, Month, PrimitiveDateTime};

use crate::identity::EnrollmentProvider;

/// Tunables of the workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkflowConfig {
    /// Minimum delay between two enrollment refreshes of the same user.
    pub inscription_refresh: Duration,
    /// Month the academic year starts in.
    pub mois_debut_annee: Month,
    /// Rolling windows of the unassigned-events counters.
    pub fenetres_non_affectes: FenetresNonAffectes,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            inscription_refresh: Duration::hours(24),
            mois_debut_annee: Month::September,
            fenetres_non_affectes: FenetresNonAffectes { court: 7, long: 30 },
        }
    }
}

impl WorkflowConfig {
    /// Returns a copy with a different refresh interval.
    #[must_use]
    pub const fn with_inscription_refresh_hours(mut self, hours: i64) -> Self {
        self.inscription_refresh = Duration::hours(hours);
        self
    }
}

/// Everything a workflow operation needs besides storage.
///
/// Passed explicitly to every operation; nothing is read from ambient state.
#[derive(Clone, Copy)]
pub struct Context<'a> {
    /// Outbound bus domain events are published on.
    pub events: &'a dyn EventBus,
    /// Enrollment backend used for best-effort refreshes.
    pub enrollments: &'a dyn EnrollmentProvider,
    /// Workflow tunables.
    pub config: &'a WorkflowConfig,
    /// The instant the operation runs at.
    pub now: PrimitiveDateTime,
}

impl<'a> Context<'a> {
    /// Creates a context.
    #[must_use]
    pub const fn new(
        events: &'a dyn EventBus,
        enrollments: &'a dyn EnrollmentProvider,
        config: &'a WorkflowConfig,
        now: PrimitiveDateTime,
    ) -> Self {
        Self {
            events,
            enrollments,
            config,
            now,
        }
    }
}
