//! Crate-level error aggregating each boundary's error type.

use crate::config::ConfigError;
use crate::gateway::AuthError;
use crate::http::HttpError;
use crate::storage::StorageError;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Http(#[from] HttpError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("invalid user record: {0}")]
    InvalidUser(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
