//! Cache key definitions.
//!
//! Key formats are shared with any other process reading the same Redis
//! instance, so they must stay byte-for-byte stable:
//!
//! - listings: `articles:<json>` where `<json>` renders every filter field in a
//!   fixed order, unset fields as `null`
//! - details: `article:<id>`

use std::time::Duration;

use serde::Serialize;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::application::repos::ResolvedArticleFilter;

/// Lifetime of every entry written by the article layer.
pub const ENTRY_TTL: Duration = Duration::from_secs(3600);

pub const LISTING_PREFIX: &str = "articles:";
pub const DETAIL_PREFIX: &str = "article:";

pub const LISTING_SWEEP_PATTERN: &str = "articles:*";
pub const DETAIL_SWEEP_PATTERN: &str = "article:*";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ListingKeyFields<'a> {
    search: Option<&'a str>,
    #[serde(with = "time::serde::rfc3339::option")]
    from_date: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339::option")]
    to_date: Option<OffsetDateTime>,
    author_id: Option<Uuid>,
    page: u32,
    limit: u32,
}

/// Derive the listing key for a resolved filter.
///
/// Fails only when a timestamp cannot be rendered as RFC 3339.
pub fn listing_key(filter: &ResolvedArticleFilter) -> Result<String, serde_json::Error> {
    let fields = ListingKeyFields {
        search: filter.search.as_deref(),
        from_date: filter.publish_range.map(|range| range.from),
        to_date: filter.publish_range.map(|range| range.to),
        author_id: filter.author_id,
        page: filter.page,
        limit: filter.limit,
    };
    let json = serde_json::to_string(&fields)?;
    Ok(format!("{LISTING_PREFIX}{json}"))
}

pub fn detail_key(id: Uuid) -> String {
    format!("{DETAIL_PREFIX}{id}")
}
