//! Provider entity.

use crate::ProviderId;
use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

/// A provider: an immutable id, a short name that is unique among live
/// providers, and a free-form display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Provider {
    /// Unique identifier, assigned at creation and never reused.
    pub id: ProviderId,

    /// Unique short name.
    pub short_name: String,

    /// Display name.
    pub long_name: String,

    /// Creation timestamp.
    pub created_at: DateTime<Utc>,

    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Provider {
    /// Creates a new provider with a freshly generated id.
    #[must_use]
    pub fn new(short_name: impl Into<String>, long_name: impl Into<String>) -> Self {
        let now = now();
        Self {
            id: ProviderId::new(),
            short_name: short_name.into(),
            long_name: long_name.into(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Returns a copy with the supplied fields applied.
    ///
    /// An empty `short_name` or `long_name` keeps the current value.
    #[must_use]
    pub fn merged(&self, short_name: &str, long_name: &str) -> Self {
        let mut merged = self.clone();
        if !short_name.is_empty() {
            merged.short_name = short_name.to_string();
        }
        if !long_name.is_empty() {
            merged.long_name = long_name.to_string();
        }
        merged.updated_at = now();
        merged
    }
}

// MySQL DATETIME(6) keeps microseconds, so entities compare equal after a
// round-trip through the store.
fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}
