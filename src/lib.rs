//! # launchpad
//!
//! Session and navigation coordination for the founder dashboard client.
//!
//! The dashboard's pages (team, tasks, fund management, assistant) are thin
//! CRUD views. What they share is this layer: who is signed in, which routes
//! they may see, and a loading overlay that never outlives a navigation.
//!
//! ARCHITECTURE
//! ============
//! Leaves first:
//!
//! - [`storage`]: key-value string storage (memory, JSON file)
//! - [`token_store`]: bearer token + cached user on top of storage
//! - [`session`]: `Session` values and the resolver
//! - [`guard`]: pure route decision
//! - [`router`] / [`navigation`]: routing primitives and the loading flag
//! - [`http`] / [`gateway`]: API transport, login and logout
//! - [`context`]: the object page code holds, wiring it all together

pub mod config;
pub mod context;
pub mod error;
pub mod gateway;
pub mod guard;
pub mod http;
pub mod navigation;
pub mod notify;
pub mod router;
pub mod session;
pub mod storage;
pub mod token_store;

#[cfg(test)]
mod test_support;

pub use config::LaunchpadConfig;
pub use context::SessionContext;
pub use error::{Error, Result};
pub use guard::{RouteAction, RoutePolicy};
pub use session::{BearerToken, Session, UserRecord};
