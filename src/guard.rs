//! Route guard: decide whether a path may render for a given session.
//!
//! SYSTEM CONTEXT
//! ==============
//! Every page applies the same redirect rules, so the decision lives here as a
//! pure function. The session context runs it after each resolution and each
//! path change; this module performs no navigation itself.
//!
//! Public paths are an exact-match allow-list. Anything not listed is
//! protected.

use std::collections::BTreeSet;

use crate::session::Session;

#[cfg(test)]
#[path = "guard_test.rs"]
mod guard_test;

pub const SIGN_IN_PATH: &str = "/sign-in";
pub const SIGN_UP_PATH: &str = "/sign-up";
pub const APP_PATH: &str = "/startup";
pub const DEFAULT_PUBLIC_PATHS: [&str; 5] = ["/sign-in", "/sign-up", "/", "/options", "/build-startup"];

/// Outcome of a guard check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteAction {
    Allow,
    RedirectToSignIn,
    RedirectToApp,
}

/// Which paths are public and where redirects land.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutePolicy {
    pub public_paths: BTreeSet<String>,
    pub sign_in_path: String,
    pub sign_up_path: String,
    pub app_path: String,
}

impl Default for RoutePolicy {
    fn default() -> Self {
        Self {
            public_paths: DEFAULT_PUBLIC_PATHS.iter().map(|p| (*p).to_owned()).collect(),
            sign_in_path: SIGN_IN_PATH.to_owned(),
            sign_up_path: SIGN_UP_PATH.to_owned(),
            app_path: APP_PATH.to_owned(),
        }
    }
}

impl RoutePolicy {
    /// Default redirect targets with a custom public allow-list.
    #[must_use]
    pub fn with_public_paths<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { public_paths: paths.into_iter().map(Into::into).collect(), ..Self::default() }
    }

    #[must_use]
    pub fn is_public(&self, path: &str) -> bool {
        self.public_paths.contains(path)
    }

    fn is_auth_page(&self, path: &str) -> bool {
        path == self.sign_in_path || path == self.sign_up_path
    }

    /// Path a redirect action lands on; `None` for [`RouteAction::Allow`].
    #[must_use]
    pub fn redirect_target(&self, action: RouteAction) -> Option<&str> {
        match action {
            RouteAction::Allow => None,
            RouteAction::RedirectToSignIn => Some(&self.sign_in_path),
            RouteAction::RedirectToApp => Some(&self.app_path),
        }
    }
}

/// Decide what to do with `current_path` for `session`.
#[must_use]
pub fn decide(current_path: &str, session: &Session, policy: &RoutePolicy) -> RouteAction {
    if !session.is_authenticated && !policy.is_public(current_path) {
        return RouteAction::RedirectToSignIn;
    }
    if session.is_authenticated && policy.is_auth_page(current_path) {
        return RouteAction::RedirectToApp;
    }
    RouteAction::Allow
}

/// Sidebar highlighting: `/dashboard` matches exactly, other links by prefix.
#[must_use]
pub fn is_active(current_path: &str, href: &str) -> bool {
    if href == "/dashboard" {
        return current_path == "/dashboard";
    }
    current_path.starts_with(href)
}
