//! Authentication module for resolving and managing the auth token.
//!
//! This module provides:
//! - `TokenSource` / `ResolvedToken`: which storage scope holds the token,
//!   decided by the remember-me flag at read time
//! - `AuthSession`: login, logout, token validation and periodic refresh
//!
//! Tokens are refreshed every 6 hours while a user is signed in.

pub mod credentials;
pub mod session;

pub use credentials::{ResolvedToken, TokenSource};
pub use session::{spawn_refresh_loop, AuthSession, TOKEN_REFRESH_INTERVAL};
