pub mod amortization;
pub mod breakdown;
pub mod calculator;
pub mod error;
pub mod format;
pub mod input;
pub mod types;
pub mod viewport;

pub use error::EmiError;
pub use types::*;

/// Standard result type for all emi-core operations
pub type EmiResult<T> = Result<T, EmiError>;
