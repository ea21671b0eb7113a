//! Runtime configuration parsed from environment variables.

use std::path::PathBuf;
use std::time::Duration;

use crate::guard::RoutePolicy;
use crate::http::HttpTimeouts;
use crate::navigation::DEFAULT_NAVIGATION_TIMEOUT;

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

pub const DEFAULT_API_URL: &str = "http://localhost:3001/api";
pub const DEFAULT_STORE_PATH: &str = ".launchpad/session.json";
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_HTTP_CONNECT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{var} must not be empty")]
    Empty { var: &'static str },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchpadConfig {
    pub api_url: String,
    pub store_path: PathBuf,
    pub navigation_timeout: Duration,
    pub http_timeouts: HttpTimeouts,
    pub policy: RoutePolicy,
}

impl Default for LaunchpadConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_owned(),
            store_path: PathBuf::from(DEFAULT_STORE_PATH),
            navigation_timeout: DEFAULT_NAVIGATION_TIMEOUT,
            http_timeouts: HttpTimeouts {
                request_secs: DEFAULT_HTTP_TIMEOUT_SECS,
                connect_secs: DEFAULT_HTTP_CONNECT_TIMEOUT_SECS,
            },
            policy: RoutePolicy::default(),
        }
    }
}

impl LaunchpadConfig {
    /// Build config from environment variables.
    ///
    /// Optional:
    /// - `LAUNCHPAD_API_URL`: API base URL, trailing `/` trimmed
    /// - `LAUNCHPAD_STORE_PATH`: session file for the CLI
    /// - `LAUNCHPAD_NAV_TIMEOUT_MS`: default 3000
    /// - `LAUNCHPAD_HTTP_TIMEOUT_SECS`: default 30
    /// - `LAUNCHPAD_HTTP_CONNECT_TIMEOUT_SECS`: default 10
    /// - `LAUNCHPAD_PUBLIC_PATHS`: comma-separated allow-list
    ///
    /// Unparseable numbers fall back to their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if `LAUNCHPAD_API_URL` is set but blank.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let api_url = match std::env::var("LAUNCHPAD_API_URL") {
            Ok(raw) => parse_api_url(&raw).ok_or(ConfigError::Empty { var: "LAUNCHPAD_API_URL" })?,
            Err(_) => defaults.api_url,
        };
        let store_path = std::env::var("LAUNCHPAD_STORE_PATH")
            .ok()
            .filter(|p| !p.trim().is_empty())
            .map_or(defaults.store_path, PathBuf::from);
        let navigation_timeout = Duration::from_millis(env_parse_u64(
            "LAUNCHPAD_NAV_TIMEOUT_MS",
            u64::try_from(DEFAULT_NAVIGATION_TIMEOUT.as_millis()).unwrap_or(3000),
        ));
        let http_timeouts = HttpTimeouts {
            request_secs: env_parse_u64("LAUNCHPAD_HTTP_TIMEOUT_SECS", DEFAULT_HTTP_TIMEOUT_SECS),
            connect_secs: env_parse_u64("LAUNCHPAD_HTTP_CONNECT_TIMEOUT_SECS", DEFAULT_HTTP_CONNECT_TIMEOUT_SECS),
        };
        let policy = match std::env::var("LAUNCHPAD_PUBLIC_PATHS") {
            Ok(raw) => RoutePolicy::with_public_paths(parse_path_list(&raw)),
            Err(_) => defaults.policy,
        };

        Ok(Self { api_url, store_path, navigation_timeout, http_timeouts, policy })
    }
}

fn env_parse_u64(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<u64>().ok())
        .unwrap_or(default)
}

fn parse_api_url(raw: &str) -> Option<String> {
    let url = raw.trim().trim_end_matches('/');
    if url.is_empty() { None } else { Some(url.to_owned()) }
}

fn parse_path_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_owned)
        .collect()
}
