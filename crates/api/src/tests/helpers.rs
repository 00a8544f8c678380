// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Test helper functions and fixtures.

use handisup::{
    Context, DirectoryError, DirectoryRecord, EnrollmentError, EnrollmentProvider,
    IdentityProvider, WorkflowConfig,
};
use handisup_audit::{DomainEvent, RecordingEventBus};
use handisup_domain::{Inscription, Reponse};
use handisup_persistence::{Persistence, ReferenceData};
use time::PrimitiveDateTime;
use time::macros::datetime;

use crate::{AuthenticatedActor, authenticate_stub};

pub const REFERENCE_JSON: &str = include_str!("../../../../fixtures/reference.json");

pub const NOW: PrimitiveDateTime = datetime!(2026-10-19 10:00);

pub const CAMPAGNE_ETUDES: i64 = 1;
pub const CAMPAGNE_SPORT: i64 = 2;
pub const PROFIL_DYS: i64 = 2;
pub const PROFIL_MOTEUR: i64 = 3;
pub const CHARTE_AMENAGEMENTS: i64 = 1;
pub const TYPE_PRISE_DE_NOTES: i64 = 10;
pub const TYPE_FORFAIT: i64 = 11;

pub fn create_test_persistence() -> Persistence {
    let data: ReferenceData = ReferenceData::from_json_str(REFERENCE_JSON).unwrap();
    Persistence::with_reference_data(data).unwrap()
}

/// Resolves an actor from the bundled reference users.
pub fn actor(persistence: &Persistence, uid: &str) -> AuthenticatedActor {
    authenticate_stub(persistence, uid).unwrap()
}

#[derive(Debug, Default)]
pub struct NoEnrollments;

impl EnrollmentProvider for NoEnrollments {
    fn get_enrollments(
        &self,
        _uid: &str,
        _since: time::Date,
        _until: Option<time::Date>,
    ) -> Result<Vec<Inscription>, EnrollmentError> {
        Ok(Vec::new())
    }
}

#[derive(Debug, Default)]
pub struct StubDirectory {
    pub records: Vec<DirectoryRecord>,
    pub unavailable: bool,
}

impl IdentityProvider for StubDirectory {
    fn search_by_handle(
        &self,
        handle: &str,
        _attributes: &[&str],
    ) -> Result<Option<DirectoryRecord>, DirectoryError> {
        if self.unavailable {
            return Err(DirectoryError::Unavailable(String::from("bind failed")));
        }
        Ok(self.records.iter().find(|r| r.uid == handle).cloned())
    }

    fn query(
        &self,
        _filter: &str,
        _attributes: &[&str],
    ) -> Result<Vec<DirectoryRecord>, DirectoryError> {
        if self.unavailable {
            return Err(DirectoryError::Unavailable(String::from("bind failed")));
        }
        Ok(self.records.clone())
    }
}

pub fn directory_record(uid: &str, nom: &str, prenom: &str) -> DirectoryRecord {
    DirectoryRecord {
        uid: uid.to_string(),
        nom: nom.to_string(),
        prenom: prenom.to_string(),
        email: format!("{uid}@univ.example"),
    }
}

/// Bus, collaborators and configuration shared by a test.
#[derive(Debug, Default)]
pub struct TestEnv {
    pub bus: RecordingEventBus,
    pub enrollments: NoEnrollments,
    pub config: WorkflowConfig,
}

impl TestEnv {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ctx(&self) -> Context<'_> {
        Context::new(&self.bus, &self.enrollments, &self.config, NOW)
    }

    pub fn events(&self) -> Vec<DomainEvent> {
        self.bus.events()
    }
}

pub fn choix(question_id: i64, option: i64) -> Reponse {
    let mut reponse: Reponse = Reponse::new(question_id);
    reponse.options = vec![option];
    reponse
}
