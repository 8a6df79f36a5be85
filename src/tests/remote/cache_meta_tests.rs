use reqwest::header::HeaderValue;

use super::*;

fn at(s: &str) -> OffsetDateTime {
    parse_http_date(s).unwrap()
}

#[test]
fn parses_imf_fixdate() {
    let dt = at("Wed, 21 Oct 2015 07:28:00 GMT");
    assert_eq!(dt.year(), 2015);
    assert_eq!(dt.hour(), 7);
    assert_eq!(dt.minute(), 28);
    assert_eq!(dt.offset(), time::UtcOffset::UTC);
    assert!(parse_http_date("2015-10-21T07:28:00Z").is_none());
}

#[test]
fn reads_caching_headers() {
    let mut headers = HeaderMap::new();
    headers.insert(DATE, HeaderValue::from_static("Wed, 21 Oct 2015 07:28:00 GMT"));
    headers.insert(ETAG, HeaderValue::from_static("\"v1\""));
    headers.append(CACHE_CONTROL, HeaderValue::from_static("public, max-age=60"));
    headers.append(CACHE_CONTROL, HeaderValue::from_static("stale-if-error=300"));

    let fetched_at = at("Wed, 21 Oct 2015 07:30:00 GMT");
    let meta = CacheMeta::from_headers(&headers, fetched_at);
    assert_eq!(meta.date, Some(at("Wed, 21 Oct 2015 07:28:00 GMT")));
    assert_eq!(meta.etag.as_deref(), Some("\"v1\""));
    assert_eq!(meta.max_age, Some(Duration::seconds(60)));
    assert_eq!(meta.stale_if_error, Some(Duration::seconds(300)));
}

#[test]
fn bad_date_is_ignored() {
    let mut headers = HeaderMap::new();
    headers.insert(DATE, HeaderValue::from_static("yesterday"));
    headers.insert(CACHE_CONTROL, HeaderValue::from_static("max-age=abc, no-cache"));
    let meta = CacheMeta::from_headers(&headers, OffsetDateTime::UNIX_EPOCH);
    assert_eq!(meta, CacheMeta::new(OffsetDateTime::UNIX_EPOCH));
}

#[test]
fn freshness_windows_count_from_server_date() {
    let mut meta = CacheMeta::new(at("Wed, 21 Oct 2015 08:00:00 GMT"));
    meta.date = Some(at("Wed, 21 Oct 2015 07:00:00 GMT"));
    meta.max_age = Some(Duration::seconds(60));
    meta.stale_if_error = Some(Duration::seconds(120));

    assert!(meta.is_fresh(at("Wed, 21 Oct 2015 07:00:59 GMT")));
    assert!(!meta.is_fresh(at("Wed, 21 Oct 2015 07:01:00 GMT")));
    assert!(meta.may_serve_stale(at("Wed, 21 Oct 2015 07:02:59 GMT")));
    assert!(!meta.may_serve_stale(at("Wed, 21 Oct 2015 07:03:00 GMT")));
}

#[test]
fn no_headers_means_never_fresh() {
    let now = OffsetDateTime::UNIX_EPOCH;
    let meta = CacheMeta::new(now);
    assert!(!meta.is_fresh(now));
    assert!(!meta.may_serve_stale(now));
}

#[test]
fn huge_delta_seconds_are_clamped_without_overflow() {
    let mut headers = HeaderMap::new();
    headers.insert(
        CACHE_CONTROL,
        HeaderValue::from_static("max-age=999999999999, stale-if-error=99999999999999999999999"),
    );
    let now = at("Wed, 21 Oct 2015 07:28:00 GMT");
    let meta = CacheMeta::from_headers(&headers, now);
    let clamped = Some(Duration::seconds(MAX_DELTA_SECONDS as i64));
    assert_eq!(meta.max_age, clamped);
    assert_eq!(meta.stale_if_error, clamped);
    assert!(meta.is_fresh(now));
    assert!(meta.may_serve_stale(now));

    // A server date near the end of the calendar pushes the deadline out of range.
    let mut late = meta.clone();
    late.date = Some(at("Fri, 31 Dec 9999 23:59:00 GMT"));
    assert!(late.is_fresh(now));
    assert!(late.may_serve_stale(now));
}

#[test]
fn negative_delta_seconds_are_ignored() {
    let mut headers = HeaderMap::new();
    headers.insert(CACHE_CONTROL, HeaderValue::from_static("max-age=-5"));
    let meta = CacheMeta::from_headers(&headers, OffsetDateTime::UNIX_EPOCH);
    assert_eq!(meta.max_age, None);
}
