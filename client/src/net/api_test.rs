use super::*;

#[test]
fn normalize_base_url_strips_trailing_slashes() {
    assert_eq!(normalize_base_url("http://localhost:3000/"), "http://localhost:3000");
    assert_eq!(normalize_base_url("  https://example.test//  "), "https://example.test");
}

#[test]
fn data_endpoint_appends_path() {
    assert_eq!(data_endpoint("http://localhost:3000"), "http://localhost:3000/data");
}

#[test]
fn with_client_normalizes_base_url() {
    let api = HttpAccountData::with_client(reqwest::Client::new(), "http://localhost:3000/");
    assert_eq!(api.base_url(), "http://localhost:3000");
    assert_eq!(api.data_url(), "http://localhost:3000/data");
}

#[test]
fn error_message_reads_error_field() {
    assert_eq!(error_message(r#"{"error":"Key is required"}"#), "Key is required");
}

#[test]
fn error_message_falls_back_to_body_text() {
    assert_eq!(error_message("  bad gateway \n"), "bad gateway");
    assert_eq!(error_message(r#"{"message":"nope"}"#), r#"{"message":"nope"}"#);
}

#[test]
fn status_error_maps_401_to_unauthorized() {
    let err = status_error(StatusCode::UNAUTHORIZED, r#"{"error":"Invalid token"}"#);
    assert!(matches!(err, AccountError::Unauthorized(ref m) if m == "Invalid token"));
}

#[test]
fn status_error_keeps_other_statuses() {
    let err = status_error(StatusCode::BAD_REQUEST, r#"{"error":"Key is required"}"#);
    match err {
        AccountError::Status { status, message } => {
            assert_eq!(status, 400);
            assert_eq!(message, "Key is required");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn value_response_treats_null_as_absent() {
    let body: ValueResponse = serde_json::from_str(r#"{"value":null}"#).unwrap();
    assert!(body.value.is_none());
    let body: ValueResponse = serde_json::from_str(r#"{"value":"dark"}"#).unwrap();
    assert_eq!(body.value, Some(Value::String("dark".into())));
}
