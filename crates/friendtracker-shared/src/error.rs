use thiserror::Error;

/// Validation errors for contact payloads.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ContactError {
    #[error("Name is required")]
    EmptyName,

    #[error("Invalid birthday {value:?}: expected YYYY-MM-DD")]
    InvalidBirthday { value: String },

    #[error("Unknown sort field: {0}")]
    UnknownSortField(String),

    #[error("Unknown sort direction: {0}")]
    UnknownSortDirection(String),
}
