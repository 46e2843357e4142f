//! Typed REST client and session handling for the instadmin backend
//!
//! [`Session`] is the authentication context: it owns the bearer token,
//! persists it through a [`TokenStore`], and broadcasts [`SessionEvent`]s.
//! [`ApiClient`] attaches that token to every request and expires the
//! session when the backend answers 401.

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    rust_2018_idioms
)]

pub mod client;
mod endpoints;
pub mod session;

pub use client::ApiClient;
pub use session::{FileTokenStore, MemoryTokenStore, Session, SessionEvent, StoredToken, TokenStore};
