//! Integration tests for the faceted user resolver.
//!
//! Uses `SpyDirectory` to observe which review-service call each criterion
//! dispatches to, and how partial and total failures surface.

use fortress_console::models::{OrgUnitType, Permission, UserSummary, UserTemplate};
use fortress_console::search::{FacetedUserResolver, SearchCriterion, SearchError, SearchRequest};

mod common;
use common::{Call, Failure, SpyDirectory, admin_session, bind_spy, ids, session_with};

fn template(ou: &str, roles: &[&str], admin_roles: &[&str]) -> UserTemplate {
    UserTemplate {
        user_id: String::new(),
        ou: ou.to_string(),
        roles: roles.iter().map(|r| r.to_string()).collect(),
        admin_roles: admin_roles.iter().map(|r| r.to_string()).collect(),
    }
}

// ============================================================================
// Binding
// ============================================================================

#[tokio::test]
async fn test_bind_registers_session_once() {
    let spy = SpyDirectory::new().with_users(&["alice"]).shared();
    let resolver = bind_spy(&spy).await;

    resolver
        .resolve(&SearchCriterion::RawUserTemplate(UserTemplate::with_user_id("")))
        .await
        .expect("search failed");
    resolver.lookup("alice").await.expect("lookup failed");

    let binds = spy
        .calls()
        .into_iter()
        .filter(|c| matches!(c, Call::Bind(_)))
        .count();
    assert_eq!(binds, 1);
    assert_eq!(resolver.session().user_id, "admin");
}

#[tokio::test]
async fn test_bind_rejected_session_is_unauthorized() {
    let spy = SpyDirectory::new().fail_bind(Failure::Unauthorized).shared();
    let result = FacetedUserResolver::bind(spy.clone(), admin_session()).await;
    assert!(matches!(result, Err(SearchError::Unauthorized(_))));
}

#[tokio::test]
async fn test_bind_transport_failure_is_service_failure() {
    let spy = SpyDirectory::new().fail_bind(Failure::Service).shared();
    let result = FacetedUserResolver::bind(spy.clone(), admin_session()).await;
    assert!(matches!(result, Err(SearchError::ServiceFailure(_))));
}

// ============================================================================
// Dispatch
// ============================================================================

#[tokio::test]
async fn test_unconstrained_makes_no_remote_call() {
    let spy = SpyDirectory::new().with_users(&["alice", "bob"]).shared();
    let resolver = bind_spy(&spy).await;

    let users = resolver
        .resolve(&SearchCriterion::Unconstrained)
        .await
        .expect("resolve failed");

    assert!(users.is_empty());
    assert!(spy.search_calls().is_empty());
}

#[tokio::test]
async fn test_org_unit_beats_role() {
    let spy = SpyDirectory::new().with_users(&["alice"]).shared();
    let resolver = bind_spy(&spy).await;

    let criterion = SearchRequest::for_template(template("finance", &["teller"], &[])).classify();
    resolver.resolve(&criterion).await.expect("resolve failed");

    assert_eq!(
        spy.search_calls(),
        vec![Call::ByOrgUnit("finance".into(), OrgUnitType::User)]
    );
}

#[tokio::test]
async fn test_only_first_role_is_used() {
    let spy = SpyDirectory::new().with_users(&["alice"]).shared();
    let resolver = bind_spy(&spy).await;

    let criterion =
        SearchRequest::for_template(template("", &["teller", "auditor"], &["helpdesk"])).classify();
    resolver.resolve(&criterion).await.expect("resolve failed");

    assert_eq!(spy.search_calls(), vec![Call::ByRole("teller".into())]);
}

#[tokio::test]
async fn test_only_first_admin_role_is_used() {
    let spy = SpyDirectory::new().with_users(&["dave"]).shared();
    let resolver = bind_spy(&spy).await;

    let criterion =
        SearchRequest::for_template(template("", &[], &["helpdesk", "console-admin"])).classify();
    resolver.resolve(&criterion).await.expect("resolve failed");

    assert_eq!(spy.search_calls(), vec![Call::ByAdminRole("helpdesk".into())]);
}

#[tokio::test]
async fn test_raw_template_forwarded_as_is() {
    let spy = SpyDirectory::new().with_users(&["jo"]).shared();
    let resolver = bind_spy(&spy).await;

    let tmpl = UserTemplate::with_user_id("jo");
    resolver
        .resolve(&SearchCriterion::RawUserTemplate(tmpl.clone()))
        .await
        .expect("resolve failed");

    assert_eq!(spy.search_calls(), vec![Call::FindUsers(tmpl)]);
}

#[tokio::test]
async fn test_permission_beats_template() {
    let spy = SpyDirectory::new()
        .with_users(&["u1"])
        .with_permission_users(&["u1"])
        .shared();
    let resolver = bind_spy(&spy).await;

    let perm = Permission::new("account", "debit");
    let request = SearchRequest {
        permission: Some(perm.clone()),
        template: Some(template("finance", &["teller"], &[])),
    };
    resolver.resolve(&request.classify()).await.expect("resolve failed");

    assert_eq!(
        spy.search_calls(),
        vec![Call::PermissionUsers(perm), Call::ReadUser("u1".into())]
    );
}

// ============================================================================
// Ordering
// ============================================================================

#[tokio::test]
async fn test_results_sorted_case_insensitive() {
    let spy = SpyDirectory::new().with_users(&["bob", "Alice", "carol"]).shared();
    let resolver = bind_spy(&spy).await;

    let users = resolver
        .resolve(&SearchCriterion::RoleFilter("teller".into()))
        .await
        .expect("resolve failed");

    assert_eq!(ids(&users), vec!["Alice", "bob", "carol"]);
}

#[tokio::test]
async fn test_permission_results_sorted() {
    let spy = SpyDirectory::new()
        .with_users(&["zed", "Amy", "mike"])
        .with_permission_users(&["zed", "Amy", "mike"])
        .shared();
    let resolver = bind_spy(&spy).await;

    let users = resolver
        .resolve(&SearchCriterion::PermissionFilter(Permission::new("a", "b")))
        .await
        .expect("resolve failed");

    assert_eq!(ids(&users), vec!["Amy", "mike", "zed"]);
}

#[tokio::test]
async fn test_resolve_is_idempotent() {
    let spy = SpyDirectory::new()
        .with_user(UserSummary::new("bob").with_ou("finance"))
        .with_user(UserSummary::new("Alice").with_ou("finance"))
        .shared();
    let resolver = bind_spy(&spy).await;
    let criterion = SearchCriterion::OrgUnitFilter("finance".into());

    let first = resolver.resolve(&criterion).await.expect("first resolve failed");
    let second = resolver.resolve(&criterion).await.expect("second resolve failed");

    assert_eq!(first, second);
}

// ============================================================================
// Failure handling
// ============================================================================

#[tokio::test]
async fn test_permission_lookup_skips_failed_reads() {
    let spy = SpyDirectory::new()
        .with_users(&["u1", "u2", "u3"])
        .with_permission_users(&["u1", "u2", "u3"])
        .fail_read("u2")
        .shared();
    let resolver = bind_spy(&spy).await;

    let users = resolver
        .resolve(&SearchCriterion::PermissionFilter(Permission::new("account", "debit")))
        .await
        .expect("partial failure must not fail the search");

    assert_eq!(ids(&users), vec!["u1", "u3"]);
    let reads: Vec<Call> = spy
        .search_calls()
        .into_iter()
        .filter(|c| matches!(c, Call::ReadUser(_)))
        .collect();
    assert_eq!(reads.len(), 3);
}

#[tokio::test]
async fn test_permission_lookup_skips_denied_and_missing_reads() {
    let spy = SpyDirectory::new()
        .with_users(&["u1", "u3"])
        .with_permission_users(&["u1", "u2", "u3"])
        .deny_read("u3")
        .shared();
    let resolver = bind_spy(&spy).await;

    let users = resolver
        .resolve(&SearchCriterion::PermissionFilter(Permission::new("account", "debit")))
        .await
        .expect("partial failure must not fail the search");

    // u2 does not exist, u3 is denied
    assert_eq!(ids(&users), vec!["u1"]);
}

#[tokio::test]
async fn test_empty_permission_set_is_empty_list() {
    let spy = SpyDirectory::new().shared();
    let resolver = bind_spy(&spy).await;

    let users = resolver
        .resolve(&SearchCriterion::PermissionFilter(Permission::new("account", "debit")))
        .await
        .expect("resolve failed");

    assert!(users.is_empty());
}

#[tokio::test]
async fn test_bulk_unauthorized_surfaces() {
    let spy = SpyDirectory::new()
        .with_users(&["alice"])
        .fail_bulk(Failure::Unauthorized)
        .shared();
    let resolver = bind_spy(&spy).await;

    let result = resolver.resolve(&SearchCriterion::OrgUnitFilter("finance".into())).await;
    assert!(matches!(result, Err(SearchError::Unauthorized(_))));
}

#[tokio::test]
async fn test_bulk_service_failure_surfaces() {
    let spy = SpyDirectory::new()
        .with_users(&["alice"])
        .fail_bulk(Failure::Service)
        .shared();
    let resolver = bind_spy(&spy).await;

    let result = resolver.resolve(&SearchCriterion::RoleFilter("teller".into())).await;
    assert!(matches!(result, Err(SearchError::ServiceFailure(_))));
}

#[tokio::test]
async fn test_permission_set_failure_surfaces() {
    let spy = SpyDirectory::new().fail_bulk(Failure::Service).shared();
    let resolver = bind_spy(&spy).await;

    let result = resolver
        .resolve(&SearchCriterion::PermissionFilter(Permission::new("account", "debit")))
        .await;
    assert!(matches!(result, Err(SearchError::ServiceFailure(_))));
    assert_eq!(spy.search_calls().len(), 1);
}

#[tokio::test]
async fn test_lookup_missing_user_is_not_found() {
    let spy = SpyDirectory::new().shared();
    let resolver = bind_spy(&spy).await;

    let result = resolver.lookup("ghost").await;
    assert!(matches!(result, Err(SearchError::NotFound(_))));
}

#[tokio::test]
async fn test_resolvers_bound_to_different_sessions_are_independent() {
    let spy = SpyDirectory::new().with_users(&["alice"]).shared();
    let admin = bind_spy(&spy).await;
    let other = FacetedUserResolver::bind(spy.clone(), session_with("helpdesk", &[]))
        .await
        .expect("bind failed");

    assert_eq!(admin.session().user_id, "admin");
    assert_eq!(other.session().user_id, "helpdesk");
    assert_eq!(
        spy.calls(),
        vec![Call::Bind("admin".into()), Call::Bind("helpdesk".into())]
    );
}
