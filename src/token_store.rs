//! Token store: the bearer token and cached user record on top of [`Storage`].
//!
//! SYSTEM CONTEXT
//! ==============
//! Sole owner of the persisted session keys. The auth gateway is the only
//! writer; the session resolver and the authenticated HTTP client read.
//!
//! DESIGN
//! ======
//! `set` writes the token last and `clear` removes it first. Since the token
//! is what makes a session "authenticated", a reader between two writes never
//! observes a token without its user record.
//!
//! ERROR HANDLING
//! ==============
//! Nothing here returns an error. A failing medium reads as "absent" and
//! failed writes are logged, which lands callers in the unauthenticated state.

use std::sync::Arc;

use crate::session::{BearerToken, UserRecord};
use crate::storage::Storage;

#[cfg(test)]
#[path = "token_store_test.rs"]
mod token_store_test;

pub const AUTH_TOKEN_KEY: &str = "authToken";
pub const USER_KEY: &str = "user";
pub const USER_ID_KEY: &str = "userId";
pub const STARTUP_ID_KEY: &str = "startUpId";
pub const NOTIFICATION_SETTINGS_KEY: &str = "notificationSettings";

/// Keys dropped when the server rejects the stored credentials.
const CREDENTIAL_KEYS: [&str; 3] = [AUTH_TOKEN_KEY, USER_ID_KEY, USER_KEY];

/// Keys dropped on logout. `authToken` must stay first.
const SESSION_KEYS: [&str; 5] = [AUTH_TOKEN_KEY, USER_ID_KEY, USER_KEY, STARTUP_ID_KEY, NOTIFICATION_SETTINGS_KEY];

#[derive(Clone)]
pub struct TokenStore {
    storage: Arc<dyn Storage>,
}

impl TokenStore {
    #[must_use]
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    /// Current bearer token, if any. Empty strings count as absent.
    #[must_use]
    pub fn get(&self) -> Option<BearerToken> {
        self.read(AUTH_TOKEN_KEY)
            .filter(|raw| !raw.is_empty())
            .map(BearerToken::new)
    }

    /// Cached user record. Unparseable JSON reads as `None`.
    #[must_use]
    pub fn user(&self) -> Option<UserRecord> {
        let raw = self.read(USER_KEY)?;
        match serde_json::from_str::<serde_json::Value>(&raw) {
            Ok(value) => Some(UserRecord::new(value)),
            Err(e) => {
                tracing::warn!(error = %e, "cached user record is not valid JSON");
                None
            }
        }
    }

    /// Persist a new session: user record first, token last.
    ///
    /// Returns `false` if the token could not be written, in which case the
    /// store still reads as signed out.
    pub fn set(&self, token: &BearerToken, user: &UserRecord) -> bool {
        self.write(USER_KEY, &user.to_json_string());
        match user.id() {
            Some(id) => {
                self.write(USER_ID_KEY, &id);
            }
            None => self.remove(USER_ID_KEY),
        }
        self.write(AUTH_TOKEN_KEY, token.as_str())
    }

    /// Drop every session key. The token goes first.
    pub fn clear(&self) {
        for key in SESSION_KEYS {
            self.remove(key);
        }
    }

    /// Drop only the credential keys, leaving app preferences in place.
    pub fn clear_credentials(&self) {
        for key in CREDENTIAL_KEYS {
            self.remove(key);
        }
    }

    #[must_use]
    pub fn startup_id(&self) -> Option<String> {
        self.read(STARTUP_ID_KEY).filter(|s| !s.is_empty())
    }

    pub fn set_startup_id(&self, startup_id: &str) {
        self.write(STARTUP_ID_KEY, startup_id);
    }

    pub fn clear_startup_id(&self) {
        self.remove(STARTUP_ID_KEY);
    }

    fn read(&self, key: &str) -> Option<String> {
        match self.storage.get_item(key) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(key, error = %e, "storage read failed; treating as absent");
                None
            }
        }
    }

    fn write(&self, key: &str, value: &str) -> bool {
        match self.storage.set_item(key, value) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(key, error = %e, "storage write failed");
                false
            }
        }
    }

    fn remove(&self, key: &str) {
        if let Err(e) = self.storage.remove_item(key) {
            tracing::warn!(key, error = %e, "storage remove failed");
        }
    }
}

impl std::fmt::Debug for TokenStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenStore").finish_non_exhaustive()
    }
}
