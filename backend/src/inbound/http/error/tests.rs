//! Tests for HTTP error mapping.

use super::*;
use actix_web::body::to_bytes;
use rstest::{fixture, rstest};
use serde_json::json;

const TRACE_ID: &str = "00000000-0000-0000-0000-000000000000";

#[fixture]
fn internal_error() -> Error {
    Error::internal("connection string postgres://secret")
        .with_trace_id(TRACE_ID)
        .with_details(json!({ "secret": "x" }))
}

async fn decode(error: &Error) -> (StatusCode, Option<String>, Error) {
    let response = ResponseError::error_response(error);
    let status = response.status();
    let header = response
        .headers()
        .get(TRACE_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned);
    let bytes = to_bytes(response.into_body())
        .await
        .expect("reading response body succeeds");
    let body = serde_json::from_slice(&bytes).expect("error JSON deserialises");
    (status, header, body)
}

#[rstest]
#[case(Error::invalid_request("bad"), StatusCode::BAD_REQUEST)]
#[case(Error::not_found("user not found: ada"), StatusCode::NOT_FOUND)]
#[case(Error::invalid_state("book is currently on loan"), StatusCode::CONFLICT)]
#[case(Error::service_unavailable("pool"), StatusCode::SERVICE_UNAVAILABLE)]
#[case(Error::internal("boom"), StatusCode::INTERNAL_SERVER_ERROR)]
fn status_code_matches_error_code(#[case] error: Error, #[case] expected: StatusCode) {
    assert_eq!(ResponseError::status_code(&error), expected);
}

#[rstest]
#[actix_web::test]
async fn internal_errors_are_redacted(internal_error: Error) {
    let (status, header, body) = decode(&internal_error).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(header.as_deref(), Some(TRACE_ID));
    assert_eq!(body.message(), "Internal server error");
    assert_eq!(body.trace_id(), Some(TRACE_ID));
    assert!(body.details().is_none());
}

#[rstest]
#[actix_web::test]
async fn client_errors_keep_message_and_details() {
    let error = Error::invalid_request("book name must not be empty")
        .with_trace_id(TRACE_ID)
        .with_details(json!({ "field": "name", "code": "empty_name" }));

    let (status, header, body) = decode(&error).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(header.as_deref(), Some(TRACE_ID));
    assert_eq!(body, error);
}

#[rstest]
#[actix_web::test]
async fn missing_trace_id_omits_the_header() {
    let (_, header, body) = decode(&Error::not_found("book not found: Dune")).await;

    assert!(header.is_none());
    assert!(body.trace_id().is_none());
}

#[rstest]
fn actix_errors_become_internal_errors() {
    let actix = actix_web::error::ErrorBadGateway("upstream detail");
    let error = Error::from(actix);

    assert_eq!(error.code(), ErrorCode::InternalError);
    assert_eq!(error.message(), "Internal server error");
}
