//! Grid error types

use super::FetchError;

/// Errors returned by the grid engine.
#[derive(Debug, thiserror::Error)]
pub enum GridError {
    /// No column with this id is registered.
    #[error("Unknown column: {0}")]
    UnknownColumn(String),

    /// The column exists but does not allow sorting.
    #[error("Column is not sortable: {0}")]
    NotSortable(String),

    /// The configured initial sort cannot be applied.
    #[error("Invalid initial sort on '{column}': {reason}")]
    InvalidSort {
        /// Column named by the initial sort.
        column: String,
        /// Why it was rejected.
        reason: String,
    },

    /// Two columns share the same id.
    #[error("Duplicate column id: {0}")]
    DuplicateColumn(String),

    /// A sort direction string other than `asc` or `desc`.
    #[error("Invalid sort direction: {0}")]
    InvalidDirection(String),

    /// Remote mode was requested without a data source.
    #[error("Remote mode requires a data source")]
    MissingDataSource,

    /// The data source failed; the grid stays usable.
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl GridError {
    /// Wraps a column lookup failure as an invalid initial sort.
    pub(crate) fn invalid_sort(column: impl Into<String>, cause: GridError) -> Self {
        Self::InvalidSort {
            column: column.into(),
            reason: cause.to_string(),
        }
    }

    /// Returns `true` if this error came from the data source.
    pub fn is_fetch(&self) -> bool {
        matches!(self, Self::Fetch(_))
    }
}
