//! Result type aliases for Gantry.

use crate::GantryError;

/// A specialized `Result` type for Gantry operations.
pub type GantryResult<T> = Result<T, GantryError>;
