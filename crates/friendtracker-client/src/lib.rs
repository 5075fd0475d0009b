//! # friendtracker-client
//!
//! The client side of Friend Tracker: the [`ContactStore`] that owns the
//! session's contact state, the [`ContactService`] it talks to, and the
//! session and feedback contracts views are built on.

pub mod config;
pub mod error;
pub mod feedback;
pub mod service;
pub mod session;
pub mod store;

#[cfg(test)]
mod mock;

use tracing_subscriber::{fmt, EnvFilter};

pub use config::ClientConfig;
pub use error::{SaveError, ServiceError};
pub use service::{ContactService, HttpContactService};
pub use session::{AuthState, ContactSession, RouteDecision, Session};
pub use store::ContactStore;

/// Install the fmt subscriber, honouring `RUST_LOG` when it is set.
pub fn init_tracing(default_directive: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .init();
}
