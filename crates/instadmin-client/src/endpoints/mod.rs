//! Typed endpoint methods, grouped by backend router
//!
//! Each submodule adds an `impl ApiClient` block for one route prefix.

mod admin;
mod analytics;
mod auth;
mod dashboard;
mod instagram;
mod media;
mod posts;
mod scheduled;
