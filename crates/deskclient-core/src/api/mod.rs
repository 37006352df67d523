//! REST API client module for the service desk backend.
//!
//! This module provides the `ApiClient`, whose `fetch` attaches the stored
//! auth token as an `X-Auth-Token` header before handing the request to
//! reqwest, plus the login / current-user / refresh calls the session flow
//! is built on.

pub mod client;
pub mod error;
pub mod request;
pub mod routes;

pub use client::{ApiClient, AUTH_HEADER};
pub use error::ApiError;
pub use request::RequestOptions;
pub use routes::{api_url, EndpointRoutes, API_URL, ENDPOINT_ROUTES, REFRESH_URL};
