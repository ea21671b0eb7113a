//! Session context: the explicit object page-level code holds instead of
//! ambient globals.
//!
//! SYSTEM CONTEXT
//! ==============
//! Ties the pieces together: resolves the session at bootstrap, re-runs the
//! route guard after every path change, and routes login/logout through the
//! auth gateway so the in-memory session and the token store agree.
//!
//! DESIGN
//! ======
//! Redirects are gated on `is_loading == false`. Until the first resolution
//! pass completes, `enforce` always allows, so a half-built session never
//! drives a redirect.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::watch;

use crate::gateway::{AuthError, AuthGateway, Credentials, LogoutOutcome, Registration, SignedIn};
use crate::guard::{self, RouteAction, RoutePolicy};
use crate::navigation::NavigationCoordinator;
use crate::notify::Notifier;
use crate::session::{BearerToken, Session, SessionResolver, UserRecord};
use crate::token_store::TokenStore;

#[cfg(test)]
#[path = "context_test.rs"]
mod context_test;

pub const SIGN_IN_PROMPT: &str = "Please sign in to access this page";
pub const SIGN_IN_SUCCESS: &str = "Sign-in successful!";
pub const SIGN_IN_FAILED: &str = "An error occurred while signing in. Please try again.";
pub const MISSING_FIELDS: &str = "Please fill in all fields.";
pub const REGISTER_SUCCESS: &str = "Registration successful!";
pub const REGISTER_FAILED: &str = "An error occurred while submitting the form. Please try again.";

#[derive(Clone)]
pub struct SessionContext {
    shared: Arc<Shared>,
}

struct Shared {
    resolver: SessionResolver,
    gateway: AuthGateway,
    navigation: NavigationCoordinator,
    notifier: Arc<dyn Notifier>,
    policy: RoutePolicy,
    session: Mutex<Session>,
    tx: watch::Sender<Session>,
    subscribed: AtomicBool,
}

impl SessionContext {
    /// Build a context in the pre-bootstrap (loading) state.
    #[must_use]
    pub fn new(
        gateway: AuthGateway,
        navigation: NavigationCoordinator,
        notifier: Arc<dyn Notifier>,
        policy: RoutePolicy,
    ) -> Self {
        let (tx, _rx) = watch::channel(Session::default());
        Self {
            shared: Arc::new(Shared {
                resolver: SessionResolver::new(gateway.token_store().clone()),
                gateway,
                navigation,
                notifier,
                policy,
                session: Mutex::new(Session::default()),
                tx,
                subscribed: AtomicBool::new(false),
            }),
        }
    }

    #[must_use]
    pub fn session(&self) -> Session {
        self.shared.lock().clone()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.shared.tx.subscribe()
    }

    #[must_use]
    pub fn navigation(&self) -> &NavigationCoordinator {
        &self.shared.navigation
    }

    #[must_use]
    pub fn policy(&self) -> &RoutePolicy {
        &self.shared.policy
    }

    #[must_use]
    pub fn token_store(&self) -> &TokenStore {
        self.shared.gateway.token_store()
    }

    /// First resolution pass, path-change subscription, then a guard check on
    /// the current path.
    pub fn bootstrap(&self) -> RouteAction {
        self.check_auth();

        if !self.shared.subscribed.swap(true, Ordering::SeqCst) {
            let weak = Arc::downgrade(&self.shared);
            self.shared.navigation.router().on_path_change(Arc::new(move |_: &str| {
                if let Some(shared) = weak.upgrade() {
                    let context = SessionContext { shared };
                    context.check_auth();
                    // Read the router again: a nested redirect may already have moved on.
                    let current = context.shared.navigation.router().current_path();
                    context.enforce(&current);
                }
            }));
        }

        let current = self.shared.navigation.router().current_path();
        self.enforce(&current)
    }

    /// Re-read the token store. Ends the loading phase for good.
    pub fn check_auth(&self) -> bool {
        let session = self.shared.resolver.resolve();
        let authenticated = session.is_authenticated;
        self.shared.replace(session);
        authenticated
    }

    /// Run the route guard for `path` and perform any redirect.
    pub fn enforce(&self, path: &str) -> RouteAction {
        let session = self.session();
        if session.is_loading {
            return RouteAction::Allow;
        }

        let action = guard::decide(path, &session, &self.shared.policy);
        match action {
            RouteAction::Allow => {}
            RouteAction::RedirectToSignIn => {
                tracing::info!(path, "unauthenticated access; redirecting to sign-in");
                self.shared.notifier.notify_error(SIGN_IN_PROMPT);
                self.navigate(&self.shared.policy.sign_in_path);
            }
            RouteAction::RedirectToApp => {
                tracing::debug!(path, "already signed in; redirecting to app");
                self.navigate(&self.shared.policy.app_path);
            }
        }
        action
    }

    pub fn navigate(&self, path: &str) {
        self.shared.navigation.navigate(path);
    }

    /// Store an already-obtained token and user, then re-read the token
    /// store. Returns whether the session is now signed in.
    pub fn login(&self, token: &BearerToken, user: &UserRecord) -> bool {
        self.shared.gateway.login(token, user);
        self.check_auth()
    }

    /// Exchange credentials, store the session, and move to the app.
    ///
    /// # Errors
    ///
    /// Returns the gateway error after notifying the user.
    pub async fn sign_in(&self, credentials: &Credentials) -> Result<SignedIn, AuthError> {
        match self.shared.gateway.sign_in(credentials).await {
            Ok(signed_in) => {
                self.check_auth();
                self.shared.notifier.notify_success(SIGN_IN_SUCCESS);
                self.navigate(&self.shared.policy.app_path);
                Ok(signed_in)
            }
            Err(e) => {
                tracing::warn!(error = %e, "sign-in failed");
                let message = if matches!(e, AuthError::MissingFields) { MISSING_FIELDS } else { SIGN_IN_FAILED };
                self.shared.notifier.notify_error(message);
                Err(e)
            }
        }
    }

    /// Register an account and send the user to sign in.
    ///
    /// # Errors
    ///
    /// Returns the gateway error after notifying the user.
    pub async fn register(&self, registration: &Registration) -> Result<UserRecord, AuthError> {
        match self.shared.gateway.register(registration).await {
            Ok(user) => {
                self.shared.notifier.notify_success(REGISTER_SUCCESS);
                self.navigate(&self.shared.policy.sign_in_path);
                Ok(user)
            }
            Err(e) => {
                tracing::warn!(error = %e, "registration failed");
                let message = match &e {
                    AuthError::MissingFields => MISSING_FIELDS.to_owned(),
                    AuthError::PasswordMismatch | AuthError::PasswordTooShort { .. } => format!("{}.", capitalize(&e.to_string())),
                    _ => REGISTER_FAILED.to_owned(),
                };
                self.shared.notifier.notify_error(&message);
                Err(e)
            }
        }
    }

    /// Log out remotely if possible, locally always, then go to sign-in.
    pub async fn logout(&self) -> LogoutOutcome {
        // Also runs if this future is dropped mid-request.
        let signed_out = SignOutOnDrop(&self.shared);
        let outcome = self.shared.gateway.logout().await;
        drop(signed_out);
        self.navigate(&self.shared.policy.sign_in_path);
        outcome
    }
}

impl Shared {
    fn lock(&self) -> std::sync::MutexGuard<'_, Session> {
        self.session.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn replace(&self, session: Session) {
        *self.lock() = session.clone();
        self.tx.send_replace(session);
    }
}

struct SignOutOnDrop<'a>(&'a Shared);

impl Drop for SignOutOnDrop<'_> {
    fn drop(&mut self) {
        self.0.gateway.token_store().clear();
        self.0.replace(Session::anonymous());
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
