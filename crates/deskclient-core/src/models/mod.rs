//! Data models for the dashboard backend's auth endpoints.
//!
//! - `User`: the signed-in account with its roles and permissions
//! - `Role`, `Permission`: access control entries attached to a user
//! - `LoginResponse`: token plus user returned by login and refresh

pub mod user;

pub use user::{LoginResponse, Permission, Role, User};
