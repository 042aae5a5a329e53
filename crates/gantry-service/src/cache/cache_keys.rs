//! Cache key generators for provider entries.

use gantry_core::{PageWindow, ProviderId};

/// Prefix shared by every provider key.
const PROVIDER_PREFIX: &str = "provider";

/// Key of the primary entry for a provider.
#[must_use]
pub fn provider_by_id(id: ProviderId) -> String {
    format!("{}:id:{}", PROVIDER_PREFIX, id)
}

/// Key of the short-name indirection entry.
///
/// Short names are case sensitive, so the name is used as is.
#[must_use]
pub fn provider_by_short_name(short_name: &str) -> String {
    format!("{}:short_name:{}", PROVIDER_PREFIX, short_name)
}

/// Key of one paged listing.
#[must_use]
pub fn provider_page(window: PageWindow) -> String {
    format!("{}{}:{}", provider_pages_prefix(), window.offset(), window.limit())
}

/// Prefix covering every paged listing.
#[must_use]
pub fn provider_pages_prefix() -> String {
    format!("{}:paged:", PROVIDER_PREFIX)
}
