use super::*;

use serde_json::json;

use crate::session::UserRecord;

fn signed_in() -> Session {
    Session::authenticated(Some(UserRecord::new(json!({ "id": 1, "name": "A" }))))
}

fn scenario_policy() -> RoutePolicy {
    RoutePolicy::with_public_paths(["/sign-in", "/sign-up", "/"])
}

// =============================================================================
// decide: anonymous
// =============================================================================

#[test]
fn anonymous_on_protected_path_redirects_to_sign_in() {
    let action = decide("/dashboard/team", &Session::anonymous(), &scenario_policy());
    assert_eq!(action, RouteAction::RedirectToSignIn);
}

#[test]
fn anonymous_on_every_unlisted_path_redirects() {
    let policy = RoutePolicy::default();
    for path in ["/dashboard", "/dashboard/tasks", "/startup", "/legal", "/sign-in/", "", "/SIGN-IN"] {
        assert_eq!(
            decide(path, &Session::anonymous(), &policy),
            RouteAction::RedirectToSignIn,
            "expected redirect for {path:?}"
        );
    }
}

#[test]
fn anonymous_on_public_paths_is_allowed() {
    let policy = RoutePolicy::default();
    for path in DEFAULT_PUBLIC_PATHS {
        assert_eq!(decide(path, &Session::anonymous(), &policy), RouteAction::Allow, "path {path:?}");
    }
}

#[test]
fn public_paths_are_exact_not_prefix() {
    let policy = scenario_policy();
    assert_eq!(decide("/sign-in/help", &Session::anonymous(), &policy), RouteAction::RedirectToSignIn);
}

// =============================================================================
// decide: authenticated
// =============================================================================

#[test]
fn authenticated_on_sign_in_redirects_to_app() {
    assert_eq!(decide(SIGN_IN_PATH, &signed_in(), &RoutePolicy::default()), RouteAction::RedirectToApp);
}

#[test]
fn authenticated_on_sign_up_redirects_to_app() {
    assert_eq!(decide(SIGN_UP_PATH, &signed_in(), &RoutePolicy::default()), RouteAction::RedirectToApp);
}

#[test]
fn authenticated_without_user_record_still_redirects_from_sign_in() {
    assert_eq!(decide(SIGN_IN_PATH, &Session::authenticated(None), &RoutePolicy::default()), RouteAction::RedirectToApp);
}

#[test]
fn authenticated_on_protected_and_public_paths_is_allowed() {
    let policy = RoutePolicy::default();
    for path in ["/dashboard", "/dashboard/team", "/", "/options", "/startup"] {
        assert_eq!(decide(path, &signed_in(), &policy), RouteAction::Allow, "path {path:?}");
    }
}

// =============================================================================
// RoutePolicy
// =============================================================================

#[test]
fn redirect_targets() {
    let policy = RoutePolicy::default();
    assert_eq!(policy.redirect_target(RouteAction::Allow), None);
    assert_eq!(policy.redirect_target(RouteAction::RedirectToSignIn), Some("/sign-in"));
    assert_eq!(policy.redirect_target(RouteAction::RedirectToApp), Some("/startup"));
}

#[test]
fn redirect_targets_are_allowed_after_redirect() {
    // Following a redirect must never produce another redirect.
    let policy = RoutePolicy::default();
    let sign_in = policy.redirect_target(RouteAction::RedirectToSignIn).unwrap();
    assert_eq!(decide(sign_in, &Session::anonymous(), &policy), RouteAction::Allow);
    let app = policy.redirect_target(RouteAction::RedirectToApp).unwrap();
    assert_eq!(decide(app, &signed_in(), &policy), RouteAction::Allow);
}

// =============================================================================
// is_active
// =============================================================================

#[test]
fn dashboard_link_matches_exactly() {
    assert!(is_active("/dashboard", "/dashboard"));
    assert!(!is_active("/dashboard/team", "/dashboard"));
}

#[test]
fn other_links_match_by_prefix() {
    assert!(is_active("/dashboard/team/tasks", "/dashboard/team"));
    assert!(is_active("/dashboard/team", "/dashboard/team"));
    assert!(!is_active("/dashboard/tasks", "/dashboard/team"));
}
