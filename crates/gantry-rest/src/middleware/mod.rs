//! HTTP middleware.

mod logging;
mod metrics;

pub use self::logging::*;
pub use self::metrics::*;
