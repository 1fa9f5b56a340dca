//! Convenience result alias.

use crate::error::AppError;

/// Result type used throughout captable.
pub type AppResult<T> = Result<T, AppError>;
