//! # friendtracker-server
//!
//! The hosted contact service: a JSON API over the SQLite contact store.
//!
//! - **REST API** (axum) for filtered listing, insert, partial update and
//!   delete of contact rows
//! - **Bearer-token access control** on every `/contacts` route when an
//!   access token is configured

pub mod access;
pub mod api;
pub mod config;
pub mod error;

pub use api::{build_router, open_database, serve, serve_on, AppState};
pub use config::ServerConfig;
pub use error::ServerError;
