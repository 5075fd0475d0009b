use friendtracker_shared::ContactError;
use thiserror::Error;

/// Failure talking to the remote contact service.
///
/// This is the only error the contact store surfaces: network failures and
/// remote rejections alike.
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("{message}")]
    Rejected { status: u16, message: String },

    #[error("Not signed in or session expired")]
    Unauthenticated,
}

impl ServiceError {
    /// HTTP status of a remote rejection, if there was one.
    pub fn status(&self) -> Option<u16> {
        match self {
            ServiceError::Transport(e) => e.status().map(|s| s.as_u16()),
            ServiceError::Rejected { status, .. } => Some(*status),
            ServiceError::Unauthenticated => Some(401),
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

/// Why an edit-mode save did not go through.
#[derive(Error, Debug)]
pub enum SaveError {
    #[error(transparent)]
    Invalid(#[from] ContactError),

    #[error(transparent)]
    Service(#[from] ServiceError),
}
