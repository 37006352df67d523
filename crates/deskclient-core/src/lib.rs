//! deskclient-core - client library for the service desk dashboard API.
//!
//! The centerpiece is `ApiClient::fetch`, which looks up the auth token in
//! the scope selected by the remember-me flag and sends it as an
//! `X-Auth-Token` header. Around it:
//!
//! - `storage`: persistent and session key-value scopes
//! - `auth`: token resolution and the login/refresh/logout session flow
//! - `state`: dashboard period and tickets view state
//! - `config`: on-disk configuration

pub mod api;
pub mod auth;
pub mod config;
pub mod models;
pub mod state;
pub mod storage;

pub use api::{ApiClient, ApiError, RequestOptions, API_URL};
pub use auth::{AuthSession, TokenSource};
pub use config::Config;
pub use storage::StorageContext;

// Re-exported so callers can build methods and URLs without a direct dependency
pub use reqwest;
