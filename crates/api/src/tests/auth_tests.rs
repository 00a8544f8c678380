// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use handisup_audit::Actor;
use handisup_domain::Role;
use handisup_persistence::Persistence;

use crate::{ApiError, AuthError, AuthenticatedActor, authenticate_stub};

use super::helpers::create_test_persistence;

#[test]
fn test_authenticate_stub_loads_local_roles() {
    let persistence: Persistence = create_test_persistence();
    let actor: AuthenticatedActor = authenticate_stub(&persistence, "gest").unwrap();
    assert_eq!(actor.uid, "gest");
    assert!(actor.has_role(Role::Gestionnaire));
    assert!(actor.is_staff());
    assert!(!actor.is_admin());
}

#[test]
fn test_authenticate_stub_fails_with_empty_uid() {
    let persistence: Persistence = create_test_persistence();
    let result: Result<AuthenticatedActor, AuthError> = authenticate_stub(&persistence, "");
    assert!(matches!(
        result.unwrap_err(),
        AuthError::AuthenticationFailed { .. }
    ));
}

#[test]
fn test_authenticate_stub_fails_for_unknown_user() {
    let persistence: Persistence = create_test_persistence();
    let result: Result<AuthenticatedActor, AuthError> =
        authenticate_stub(&persistence, "inconnu");
    assert!(result.is_err());
}

#[test]
fn test_students_are_not_staff() {
    let persistence: Persistence = create_test_persistence();
    let actor: AuthenticatedActor = authenticate_stub(&persistence, "etu1").unwrap();
    assert!(actor.roles.is_empty());
    assert!(!actor.is_staff());
}

#[test]
fn test_to_audit_actor_is_a_user_actor() {
    let persistence: Persistence = create_test_persistence();
    let audit_actor: Actor = authenticate_stub(&persistence, "admin")
        .unwrap()
        .to_audit_actor();
    assert_eq!(audit_actor.uid(), Some("admin"));
}

#[test]
fn test_authentication_error_converts_to_api_error() {
    let auth_err: AuthError = AuthError::AuthenticationFailed {
        reason: String::from("unknown user"),
    };
    assert!(matches!(
        ApiError::from(auth_err),
        ApiError::AuthenticationFailed { .. }
    ));
}
