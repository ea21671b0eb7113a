//! Session values and the resolver that derives them from the token store.
//!
//! SYSTEM CONTEXT
//! ==============
//! The [`Session`] is the client's belief about who is signed in. It is a
//! cache over the token store, refreshed by an explicit resolution pass or by
//! login/logout, never by a timer.

use serde::{Deserialize, Serialize};

use crate::token_store::TokenStore;

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

// =============================================================================
// BEARER TOKEN
// =============================================================================

/// Opaque credential sent as `Authorization: Bearer <token>`.
#[derive(Clone, PartialEq, Eq)]
pub struct BearerToken(String);

impl BearerToken {
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Value for the `Authorization` header.
    #[must_use]
    pub fn header_value(&self) -> String {
        format!("Bearer {}", self.0)
    }
}

impl std::fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("BearerToken(<redacted>)")
    }
}

// =============================================================================
// USER RECORD
// =============================================================================

/// Cached user as returned by the API. Shape is not validated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserRecord(serde_json::Value);

impl UserRecord {
    #[must_use]
    pub fn new(value: serde_json::Value) -> Self {
        Self(value)
    }

    #[must_use]
    pub fn as_value(&self) -> &serde_json::Value {
        &self.0
    }

    #[must_use]
    pub fn into_value(self) -> serde_json::Value {
        self.0
    }

    /// Best-effort identifier: `_id`, then `id`. Numbers are stringified.
    #[must_use]
    pub fn id(&self) -> Option<String> {
        let raw = self.0.get("_id").or_else(|| self.0.get("id"))?;
        match raw {
            serde_json::Value::String(s) if !s.is_empty() => Some(s.clone()),
            serde_json::Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    /// Best-effort string field lookup for display code.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&str> {
        self.0.get(name).and_then(serde_json::Value::as_str)
    }

    pub(crate) fn to_json_string(&self) -> String {
        self.0.to_string()
    }
}

// =============================================================================
// SESSION
// =============================================================================

/// Authentication state as seen by the client.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Session {
    pub is_authenticated: bool,
    pub user: Option<UserRecord>,
    /// True only until the first resolution pass completes.
    pub is_loading: bool,
}

impl Default for Session {
    /// The pre-bootstrap state: nothing resolved yet.
    fn default() -> Self {
        Self { is_authenticated: false, user: None, is_loading: true }
    }
}

impl Session {
    #[must_use]
    pub fn authenticated(user: Option<UserRecord>) -> Self {
        Self { is_authenticated: true, user, is_loading: false }
    }

    #[must_use]
    pub fn anonymous() -> Self {
        Self { is_authenticated: false, user: None, is_loading: false }
    }
}

// =============================================================================
// RESOLVER
// =============================================================================

/// Derives a [`Session`] from the token store. Synchronous and idempotent.
#[derive(Debug, Clone)]
pub struct SessionResolver {
    store: TokenStore,
}

impl SessionResolver {
    #[must_use]
    pub fn new(store: TokenStore) -> Self {
        Self { store }
    }

    /// Read the token store and build a session. Never fails; storage
    /// problems surface as an anonymous session.
    #[must_use]
    pub fn resolve(&self) -> Session {
        if self.store.get().is_some() {
            Session::authenticated(self.store.user())
        } else {
            Session::anonymous()
        }
    }
}
