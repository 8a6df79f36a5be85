use super::*;
use crate::model::{PlainPageSpec, WidgetSpec};

const PAGE: &[u8] = br#"{"page":{"type":"plain-page","title":"T","widget":{"type":"empty"}}}"#;

#[test]
fn content_type_base_drops_parameters() {
    assert_eq!(content_type_base("Text/Plain; charset=utf-8"), "text/plain");
    assert_eq!(content_type_base(APPLIN_RESPONSE), APPLIN_RESPONSE);
    assert_eq!(content_type_base(""), "");
}

#[test]
fn empty_success_body_means_no_update() {
    let out = classify("/p", StatusCode::OK, None, b"").unwrap();
    assert_eq!(out, None);
}

#[test]
fn success_envelope_decodes_page() {
    let out = classify("/p", StatusCode::OK, Some(APPLIN_RESPONSE), PAGE).unwrap();
    assert_eq!(
        out,
        Some(PageSpec::from(PlainPageSpec::new(
            Some("T".to_string()),
            WidgetSpec::Empty
        )))
    );
}

#[test]
fn malformed_success_envelope_is_server_error() {
    let err = classify("/p", StatusCode::OK, Some(APPLIN_RESPONSE), b"{\"page\":").unwrap_err();
    match err {
        ApplinError::Server { status, message } => {
            assert_eq!(status, None);
            assert!(message.starts_with("error processing server response"));
        }
        other => panic!("unexpected {other:?}"),
    }

    let missing_widget = br#"{"page":{"type":"plain-page","title":"T"}}"#;
    let err = classify("/p", StatusCode::OK, Some(APPLIN_RESPONSE), missing_widget).unwrap_err();
    assert!(matches!(err, ApplinError::Server { .. }));
}

#[test]
fn success_with_foreign_content_type_is_server_error() {
    let err = classify("/p", StatusCode::OK, Some("text/html"), b"<html>").unwrap_err();
    assert!(matches!(err, ApplinError::Server { status: Some(200), .. }));
}

#[test]
fn structured_error_is_user_error() {
    let err = classify(
        "/p",
        StatusCode::UNPROCESSABLE_ENTITY,
        Some("application/vnd.applin_response; charset=utf-8"),
        br#"{"message":"bad input"}"#,
    )
    .unwrap_err();
    assert_eq!(err, ApplinError::User("bad input".to_string()));
}

#[test]
fn plain_text_error_carries_status_and_body() {
    let err = classify(
        "/p",
        StatusCode::INTERNAL_SERVER_ERROR,
        Some("text/plain"),
        b"boom",
    )
    .unwrap_err();
    match err {
        ApplinError::Server { status, message } => {
            assert_eq!(status, Some(500));
            assert!(message.contains("500 Internal Server Error"));
            assert!(message.contains("\"boom\""));
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn other_error_reports_length_and_mime() {
    let err = classify("/p", StatusCode::BAD_GATEWAY, Some("text/html"), b"<h1>").unwrap_err();
    let ApplinError::Server { status, message } = err else {
        panic!("expected server error");
    };
    assert_eq!(status, Some(502));
    assert!(message.ends_with("len=4 text/html"), "{message}");

    // An applin error body without a message is not user-facing.
    let err = classify(
        "/p",
        StatusCode::BAD_REQUEST,
        Some(APPLIN_RESPONSE),
        br#"{"oops":1}"#,
    )
    .unwrap_err();
    assert!(!err.is_user_facing());
}
