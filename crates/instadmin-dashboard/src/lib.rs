//! Dashboard state for the instadmin admin tool
//!
//! - [`AuthProvider`] tracks the logged-in admin and the login redirect
//!   raised when the session expires.
//! - [`DashboardContext`] serves headline stats and the account list from a
//!   [`QueryCache`], keeps the selected account valid and refetches both on
//!   an interval.
//! - [`filters`] holds the client-side filtering behind the list pages and
//!   the scheduling calendar.

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    rust_2018_idioms
)]

pub mod auth;
pub mod context;
pub mod filters;
pub mod query;

pub use auth::AuthProvider;
pub use context::{DashboardContext, DashboardFilter};
pub use filters::{DateRange, StatusFilter};
pub use query::{Poller, QueryCache, QueryKey};
