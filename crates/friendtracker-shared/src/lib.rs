//! # friendtracker-shared
//!
//! Domain types shared by the contact store, the HTTP service and the client:
//! the [`Contact`] record and its insert/patch payloads, the date-only
//! birthday codec, and the birthday-aware sort projection.

pub mod birthday;
pub mod constants;
pub mod error;
pub mod sort;
pub mod types;

pub use error::ContactError;
pub use sort::{SortDirection, SortField, SortOrder};
pub use types::{Contact, ContactFilter, ContactPatch, NewContact};
