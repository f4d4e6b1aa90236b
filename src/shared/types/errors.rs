use thiserror::Error;

#[derive(Debug, Error)]
pub enum PaginationError {
    #[error("Invalid page {page}: must be greater than or equal to 1")]
    InvalidPage { page: i64 },

    #[error("Invalid page size {page_size}: must be between 1 and {max}")]
    InvalidPageSize { page_size: i64, max: u64 },

    #[error("Page {page} out of range (last page is {last_page})")]
    PageOutOfRange { page: u64, last_page: u64 },

    #[error("Item count already set for this request")]
    ItemCountAlreadySet,

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl PaginationError {
    /// Whether the client caused this error by sending bad input.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            PaginationError::InvalidPage { .. }
                | PaginationError::InvalidPageSize { .. }
                | PaginationError::PageOutOfRange { .. }
        )
    }

    /// Query parameter the error refers to, if any.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            PaginationError::InvalidPage { .. } | PaginationError::PageOutOfRange { .. } => {
                Some("page")
            }
            PaginationError::InvalidPageSize { .. } => Some("page_size"),
            _ => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Not found: {entity} with {field}={value}")]
    NotFound {
        entity: &'static str,
        field: &'static str,
        value: String,
    },

    /// The stored entity no longer matches the version the caller based its
    /// write on.
    #[error("{entity} with {field}={value} was modified concurrently")]
    Modified {
        entity: &'static str,
        field: &'static str,
        value: String,
    },
}

/// Result type for domain operations
pub type DomainResult<T> = Result<T, DomainError>;
