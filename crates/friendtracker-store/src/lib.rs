//! # friendtracker-store
//!
//! Relational storage behind the contact service, backed by SQLite.
//!
//! The crate exposes a synchronous `Database` handle that wraps a
//! `rusqlite::Connection`, runs schema migrations on open, and provides typed
//! CRUD helpers for the `contact` table.

pub mod contacts;
pub mod database;
pub mod migrations;

mod error;

pub use database::Database;
pub use error::{Result, StoreError};
pub use friendtracker_shared::{Contact, ContactFilter, ContactPatch, NewContact};
