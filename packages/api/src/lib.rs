//! # API crate: typed client for the wiki REST API
//!
//! Everything the front-end needs to talk to the server, independent of any UI
//! framework.
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | [`ApiConfig`]: base URL, timeout, retry count, cache lifetimes |
//! | [`error`] | [`ApiError`] taxonomy and the response classifier |
//! | [`models`] | Wire types: pages, comments, users, admin data |
//! | [`transport`] | [`Transport`] trait and the `reqwest`-backed [`HttpTransport`] |
//! | [`cache`] | [`QueryCache`]: keyed reads, declared invalidation, optimistic rollback |
//! | [`client`] | [`WikiClient`]: one method per endpoint |
//!
//! The client is generic over its transport so tests can run it against an
//! in-memory fake; the app uses [`WikiClient::connect`].

pub mod cache;
pub mod client;
pub mod config;
pub mod error;
#[cfg(test)]
mod fake;
pub mod models;
pub mod transport;

pub use cache::{Invalidation, QueryCache, QueryFamily, QueryKey};
pub use client::{WikiClient, MAX_UPLOAD_BYTES};
pub use config::ApiConfig;
pub use error::{ApiError, ErrorKind, FieldError};
pub use models::*;
pub use transport::{ApiRequest, HttpTransport, Transport};

pub use store::{Role, SessionUser};

/// The client type used by the application.
pub type Client = WikiClient<HttpTransport>;
