use reqwest::header::{CACHE_CONTROL, DATE, ETAG, HeaderMap, HeaderName};
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::{Duration, OffsetDateTime, PrimitiveDateTime};

const HTTP_DATE: &[BorrowedFormatItem<'_>] = format_description!(
    "[weekday repr:short], [day] [month repr:short] [year] [hour]:[minute]:[second] GMT"
);

/// Largest delta-seconds honored in `Cache-Control`; bigger values are clamped to it.
pub const MAX_DELTA_SECONDS: u64 = 1 << 31;

/// `Wed, 21 Oct 2015 07:28:00 GMT`
pub fn parse_http_date(value: &str) -> Option<OffsetDateTime> {
    PrimitiveDateTime::parse(value.trim(), HTTP_DATE)
        .ok()
        .map(PrimitiveDateTime::assume_utc)
}

fn header_str(headers: &HeaderMap, name: HeaderName) -> Option<&str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

/// Caching headers of one successful page response.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CacheMeta {
    /// Server `Date`, if present and parseable.
    pub date: Option<OffsetDateTime>,
    pub fetched_at: OffsetDateTime,
    pub etag: Option<String>,
    pub max_age: Option<Duration>,
    pub stale_if_error: Option<Duration>,
}

impl CacheMeta {
    pub fn new(fetched_at: OffsetDateTime) -> Self {
        Self {
            date: None,
            fetched_at,
            etag: None,
            max_age: None,
            stale_if_error: None,
        }
    }

    pub fn from_headers(headers: &HeaderMap, fetched_at: OffsetDateTime) -> Self {
        let mut meta = Self::new(fetched_at);
        meta.date = header_str(headers, DATE).and_then(parse_http_date);
        meta.etag = header_str(headers, ETAG).map(str::to_string);
        for value in headers.get_all(CACHE_CONTROL) {
            let Ok(value) = value.to_str() else {
                continue;
            };
            for directive in value.split(',') {
                let Some((name, secs)) = directive.trim().split_once('=') else {
                    continue;
                };
                let Some(delta) = delta_seconds(secs) else {
                    continue;
                };
                match name.trim().to_ascii_lowercase().as_str() {
                    "max-age" => meta.max_age = Some(delta),
                    "stale-if-error" => meta.stale_if_error = Some(delta),
                    _ => {}
                }
            }
        }
        meta
    }

    fn reference(&self) -> OffsetDateTime {
        self.date.unwrap_or(self.fetched_at)
    }

    /// Whether the copy may be used without refetching.
    pub fn is_fresh(&self, now: OffsetDateTime) -> bool {
        match self.max_age {
            Some(max_age) => before_deadline(now, self.reference(), max_age),
            None => false,
        }
    }

    /// Whether the copy may still stand in for a page whose refetch failed.
    pub fn may_serve_stale(&self, now: OffsetDateTime) -> bool {
        let Some(grace) = self.stale_if_error else {
            return false;
        };
        let max_age = self.max_age.unwrap_or(Duration::ZERO);
        before_deadline(now, self.reference(), max_age.saturating_add(grace))
    }
}

/// Non-negative `Cache-Control` delta-seconds, clamped to [`MAX_DELTA_SECONDS`].
fn delta_seconds(raw: &str) -> Option<Duration> {
    let digits = raw.trim().trim_matches('"');
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    // Digit strings too long for u64 are still valid, just huge.
    let secs = digits.parse::<u64>().unwrap_or(u64::MAX).min(MAX_DELTA_SECONDS);
    Some(Duration::seconds(secs as i64))
}

/// `now < reference + window`; a deadline past the representable range never arrives.
fn before_deadline(now: OffsetDateTime, reference: OffsetDateTime, window: Duration) -> bool {
    match reference.checked_add(window) {
        Some(deadline) => now < deadline,
        None => true,
    }
}

#[cfg(test)]
#[path = "../tests/remote/cache_meta_tests.rs"]
mod tests;
