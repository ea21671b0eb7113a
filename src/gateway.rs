//! Auth gateway: the only writer of the token store.
//!
//! SYSTEM CONTEXT
//! ==============
//! Credential exchange (`/users/login`), registration (`/users/register`) and
//! remote logout (`/users/logout`) against the dashboard API, plus the local
//! token-store writes that go with them.
//!
//! TRADE-OFFS
//! ==========
//! `logout` always clears local state, even when the remote call fails. A user
//! who asked to log out must never remain signed in locally. The cost is that
//! a server-side session may outlive a failed remote call.

use std::sync::Arc;

use serde_json::json;

use crate::http::{HttpClient, HttpError, HttpRequest, HttpResponse};
use crate::session::{BearerToken, UserRecord};
use crate::token_store::TokenStore;

#[cfg(test)]
#[path = "gateway_test.rs"]
mod gateway_test;

pub const LOGIN_PATH: &str = "/users/login";
pub const REGISTER_PATH: &str = "/users/register";
pub const LOGOUT_PATH: &str = "/users/logout";
pub const MIN_PASSWORD_LEN: usize = 6;

// =============================================================================
// ERROR
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("missing required fields")]
    MissingFields,

    #[error("passwords do not match")]
    PasswordMismatch,

    #[error("password must be at least {min} characters long")]
    PasswordTooShort { min: usize },

    /// The API answered with a non-success status.
    #[error("request rejected ({status}): {message}")]
    Rejected { status: u16, message: String },

    /// A successful login response did not carry a token.
    #[error("login response missing token")]
    MissingToken,

    /// The token could not be written to the token store.
    #[error("session could not be stored")]
    NotPersisted,

    #[error(transparent)]
    Http(#[from] HttpError),
}

// =============================================================================
// INPUT / OUTPUT TYPES
// =============================================================================

#[derive(Clone)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    #[must_use]
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self { email: email.into(), password: password.into() }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

#[derive(Clone)]
pub struct Registration {
    pub full_name: String,
    pub email: String,
    pub username: String,
    pub password: String,
    pub confirm_password: String,
}

impl Registration {
    fn validate(&self) -> Result<(), AuthError> {
        let required = [&self.full_name, &self.email, &self.username, &self.password, &self.confirm_password];
        if required.iter().any(|field| field.trim().is_empty()) {
            return Err(AuthError::MissingFields);
        }
        if self.password != self.confirm_password {
            return Err(AuthError::PasswordMismatch);
        }
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AuthError::PasswordTooShort { min: MIN_PASSWORD_LEN });
        }
        Ok(())
    }
}

impl std::fmt::Debug for Registration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registration")
            .field("full_name", &self.full_name)
            .field("email", &self.email)
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

/// Result of a successful credential exchange.
#[derive(Debug, Clone)]
pub struct SignedIn {
    pub token: BearerToken,
    pub user: UserRecord,
}

/// How far a logout got. Local state is cleared in both cases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogoutOutcome {
    /// The server acknowledged the logout.
    Confirmed,
    /// The remote call failed; only the local session was cleared.
    LocalOnly,
}

// =============================================================================
// GATEWAY
// =============================================================================

#[derive(Clone)]
pub struct AuthGateway {
    store: TokenStore,
    http: Arc<dyn HttpClient>,
}

impl AuthGateway {
    #[must_use]
    pub fn new(store: TokenStore, http: Arc<dyn HttpClient>) -> Self {
        Self { store, http }
    }

    #[must_use]
    pub fn token_store(&self) -> &TokenStore {
        &self.store
    }

    /// Store an already-obtained token and user. No network I/O.
    ///
    /// Returns `false` if the token did not reach storage; the store then
    /// reads as signed out.
    pub fn login(&self, token: &BearerToken, user: &UserRecord) -> bool {
        if self.store.set(token, user) {
            tracing::info!(user_id = ?user.id(), "session stored");
            true
        } else {
            tracing::warn!(user_id = ?user.id(), "session not stored; staying signed out");
            false
        }
    }

    /// Exchange credentials for a token and store the resulting session.
    ///
    /// # Errors
    ///
    /// Fails on empty fields, a non-success response, a transport error, a
    /// response without a token, or a token store that refuses the write.
    pub async fn sign_in(&self, credentials: &Credentials) -> Result<SignedIn, AuthError> {
        if credentials.email.trim().is_empty() || credentials.password.is_empty() {
            return Err(AuthError::MissingFields);
        }

        let request = HttpRequest::post(LOGIN_PATH).json(json!({
            "email": credentials.email,
            "password": credentials.password,
        }));
        let response = self.http.request(request).await?;
        if !response.is_success() {
            return Err(rejected(&response));
        }

        let signed_in = split_login_payload(response.envelope()?.data)?;
        if !self.login(&signed_in.token, &signed_in.user) {
            return Err(AuthError::NotPersisted);
        }
        Ok(signed_in)
    }

    /// Register a new account. A pending `startUpId` is attached and cleared
    /// once the server reports `success: true`.
    ///
    /// # Errors
    ///
    /// Fails on validation, a non-success response, or a transport error.
    pub async fn register(&self, registration: &Registration) -> Result<UserRecord, AuthError> {
        registration.validate()?;

        let startup_id = self.store.startup_id();
        let mut body = json!({
            "fullName": registration.full_name,
            "email": registration.email,
            "username": registration.username,
            "password": registration.password,
        });
        if let Some(id) = &startup_id {
            body["startUpId"] = json!(id);
        }

        let response = self.http.request(HttpRequest::post(REGISTER_PATH).json(body)).await?;
        if !response.is_success() {
            return Err(rejected(&response));
        }
        let envelope = response.envelope()?;

        if envelope.success && startup_id.is_some() {
            self.store.clear_startup_id();
        }
        tracing::info!(email = %registration.email, "registration accepted");
        Ok(UserRecord::new(envelope.data))
    }

    /// Invalidate the session remotely, then locally, unconditionally.
    ///
    /// Remote failures are logged and reported through the outcome, never as
    /// an error.
    pub async fn logout(&self) -> LogoutOutcome {
        // Clears on drop, so local cleanup also happens if this future is cancelled.
        let _clear = ClearOnDrop(&self.store);

        let mut request = HttpRequest::post(LOGOUT_PATH);
        if let Some(token) = self.store.get() {
            request = request.with_bearer(&token);
        }

        match self.http.request(request).await {
            Ok(response) if response.is_success() => {
                tracing::info!("logged out");
                LogoutOutcome::Confirmed
            }
            Ok(response) => {
                tracing::warn!(status = response.status, "remote logout rejected; clearing local session anyway");
                LogoutOutcome::LocalOnly
            }
            Err(e) => {
                tracing::warn!(error = %e, "remote logout failed; clearing local session anyway");
                LogoutOutcome::LocalOnly
            }
        }
    }
}

impl std::fmt::Debug for AuthGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthGateway").finish_non_exhaustive()
    }
}

struct ClearOnDrop<'a>(&'a TokenStore);

impl Drop for ClearOnDrop<'_> {
    fn drop(&mut self) {
        self.0.clear();
    }
}

fn rejected(response: &HttpResponse) -> AuthError {
    let message = response
        .error_message()
        .unwrap_or_else(|| format!("HTTP error! status: {}", response.status));
    AuthError::Rejected { status: response.status, message }
}

/// Split `{ ...user, token }` into the token and the remaining user record.
fn split_login_payload(data: serde_json::Value) -> Result<SignedIn, AuthError> {
    let serde_json::Value::Object(mut fields) = data else {
        return Err(AuthError::MissingToken);
    };
    let token = match fields.remove("token") {
        Some(serde_json::Value::String(token)) if !token.is_empty() => BearerToken::new(token),
        _ => return Err(AuthError::MissingToken),
    };
    Ok(SignedIn { token, user: UserRecord::new(serde_json::Value::Object(fields)) })
}
