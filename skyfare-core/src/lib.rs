pub mod search;
pub mod filter;
pub mod predicates;
pub mod sort;
pub mod query;
pub mod repository;
pub mod identity;
pub mod booking;

pub use search::{CabinClass, Flight, FlightSearchRequest, SortOption, TripType};
pub use filter::CanonicalFilter;
pub use query::{run_query, FlightSearch};

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    ValidationError(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Access denied: {0}")]
    Forbidden(String),
    #[error("Storage error: {0}")]
    StorageError(String),
    #[error("Internal service error: {0}")]
    InternalError(String),
}

pub type CoreResult<T> = Result<T, CoreError>;
