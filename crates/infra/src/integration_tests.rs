//! End-to-end tests for the auth core over the in-memory directory.
//!
//! Hierarchy used throughout: general admin G → area manager M → HR admin H →
//! worker W, plus a second HR admin H2 under M with no reports.

use std::sync::Arc;

use chrono::NaiveDate;

use cronocodex_auth::{AuthConfig, AuthError, AuthGate, PasswordHasher, Principal, Role, SigningSecret};
use cronocodex_core::PrincipalId;

use crate::{AbsenceStore, AccountRecord, InMemoryAccountDirectory, NewAbsenceRequest, NewAccount};

struct Org {
    gate: AuthGate<Arc<InMemoryAccountDirectory>>,
    directory: Arc<InMemoryAccountDirectory>,
    g: Principal,
    m: Principal,
    h: Principal,
    h2: Principal,
    w: Principal,
}

fn add(
    dir: &InMemoryAccountDirectory,
    hasher: &PasswordHasher,
    email: &str,
    role: Role,
    supervisor: Option<&AccountRecord>,
) -> AccountRecord {
    dir.insert_account(NewAccount {
        full_name: email.to_string(),
        email: email.to_string(),
        role,
        supervisor_id: supervisor.map(|s| s.id),
        credential: hasher.derive(&format!("{email}-pw")),
    })
    .unwrap()
}

fn org() -> Org {
    let directory = Arc::new(InMemoryAccountDirectory::in_memory());
    let hasher = PasswordHasher::new();

    let g = add(&directory, &hasher, "g@corp.test", Role::GeneralAdmin, None);
    let m = add(&directory, &hasher, "m@corp.test", Role::AreaManager, Some(&g));
    let h = add(&directory, &hasher, "h@corp.test", Role::HrAdmin, Some(&m));
    let h2 = add(&directory, &hasher, "h2@corp.test", Role::HrAdmin, Some(&m));
    let w = add(&directory, &hasher, "w@corp.test", Role::Worker, Some(&h));

    let config = AuthConfig::new(SigningSecret::new("integration-secret").unwrap());
    Org {
        gate: AuthGate::new(config, directory.clone()),
        directory,
        g: g.principal(),
        m: m.principal(),
        h: h.principal(),
        h2: h2.principal(),
        w: w.principal(),
    }
}

#[tokio::test]
async fn worker_login_to_decision_end_to_end() {
    let org = org();

    let session = org.gate.login("w@corp.test", "w@corp.test-pw").await.unwrap();
    let actor = org.gate.authenticate(&session.token).await.unwrap();
    assert_eq!(actor, org.w);

    for role in Role::ALL {
        assert_eq!(org.gate.authorize_create(&actor, role), Err(AuthError::Forbidden));
    }

    assert_eq!(org.gate.authorize_decision(&org.h, org.w.id).await, Ok(()));
    assert_eq!(
        org.gate.authorize_decision(&org.h2, org.w.id).await,
        Err(AuthError::Forbidden)
    );
}

#[tokio::test]
async fn approver_visibility_follows_the_chain() {
    let org = org();

    // G: unscoped, M: second level, H: direct.
    for approver in [&org.g, &org.m, &org.h] {
        assert_eq!(
            org.gate.authorize_decision(approver, org.w.id).await,
            Ok(()),
            "{} should reach the worker",
            approver.role
        );
    }
    assert_eq!(org.gate.authorize_decision(&org.h2, org.w.id).await, Err(AuthError::Forbidden));
    assert_eq!(org.gate.authorize_decision(&org.w, org.w.id).await, Err(AuthError::Forbidden));

    // M also directly supervises the HR admins.
    assert_eq!(org.gate.authorize_decision(&org.m, org.h.id).await, Ok(()));
    // H does not reach upward.
    assert_eq!(org.gate.authorize_decision(&org.h, org.m.id).await, Err(AuthError::Forbidden));
    // Unknown owner is denied, not an error.
    assert_eq!(
        org.gate.authorize_decision(&org.g, PrincipalId::new()).await,
        Err(AuthError::Forbidden)
    );
}

#[tokio::test]
async fn pending_listing_matches_decision_scope() {
    let org = org();
    let absences = AbsenceStore::in_memory();
    let day = |s: &str| s.parse::<NaiveDate>().unwrap();

    let request = absences
        .create(NewAbsenceRequest {
            owner_id: org.w.id,
            start_date: day("2026-12-21"),
            end_date: day("2026-12-31"),
            kind: None,
            comment: None,
        })
        .unwrap();

    let visible_to = |approver: &Principal| {
        let scope = org.gate.approval_scope(approver).unwrap();
        absences
            .list_pending(&scope, &*org.directory)
            .unwrap()
            .iter()
            .any(|(r, _)| r.id == request.id)
    };

    assert!(visible_to(&org.g));
    assert!(visible_to(&org.m));
    assert!(visible_to(&org.h));
    assert!(!visible_to(&org.h2));
    assert_eq!(org.gate.approval_scope(&org.w), Err(AuthError::Forbidden));
}

#[tokio::test]
async fn creation_chain_is_enforced_for_authenticated_actors() {
    let org = org();
    assert_eq!(org.gate.authorize_create(&org.g, Role::AreaManager), Ok(()));
    assert_eq!(org.gate.authorize_create(&org.m, Role::HrAdmin), Ok(()));
    assert_eq!(org.gate.authorize_create(&org.h, Role::Worker), Ok(()));
    assert_eq!(org.gate.authorize_create(&org.m, Role::AreaManager), Err(AuthError::Forbidden));
    assert_eq!(org.gate.authorize_create(&org.h, Role::AreaManager), Err(AuthError::Forbidden));
    assert_eq!(org.gate.authorize_create(&org.g, Role::Worker), Err(AuthError::Forbidden));
}

#[tokio::test]
async fn deactivated_principal_fails_authentication() {
    let org = org();
    let session = org.gate.login("h@corp.test", "h@corp.test-pw").await.unwrap();
    assert_eq!(org.gate.authenticate(&session.token).await.unwrap().id, org.h.id);

    org.directory.set_active(org.h.id, false).unwrap();
    assert_eq!(org.gate.authenticate(&session.token).await, Err(AuthError::TokenInvalid));

    org.directory.set_active(org.h.id, true).unwrap();
    assert_eq!(org.gate.authenticate(&session.token).await.unwrap().id, org.h.id);
}
