pub mod error;
pub mod mortgage;
pub mod types;

#[cfg(feature = "reserves")]
pub mod reserves;

#[cfg(feature = "cashflow")]
pub mod cashflow;

#[cfg(feature = "appreciation")]
pub mod appreciation;

#[cfg(feature = "scoring")]
pub mod scoring;

#[cfg(feature = "analysis")]
pub mod analysis;

pub use error::RentalAnalyticsError;
pub use types::*;

/// Standard result type for all rental-analytics operations
pub type RentalAnalyticsResult<T> = Result<T, RentalAnalyticsError>;
