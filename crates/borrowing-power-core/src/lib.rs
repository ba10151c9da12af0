pub mod amortization;
pub mod error;
pub mod expenses;
pub mod orchestrator;
pub mod scenarios;
pub mod serviceability;
pub mod solver;
pub mod stamp_duty;
pub mod tax;
pub mod types;

pub use error::BorrowingError;
pub use types::*;

/// Standard result type for all borrowing-power operations
pub type BorrowingResult<T> = Result<T, BorrowingError>;
