//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_web::dev::ServiceResponse;
use actix_web::test as actix_test;
use actix_web::web;
use serde_json::Value;

use crate::inbound::http::state::HttpState;
use crate::test_support::InMemoryLibrary;

/// Wire the real services over a shared in-memory store.
pub(crate) fn library_state(library: &Arc<InMemoryLibrary>) -> web::Data<HttpState> {
    web::Data::new(HttpState::from_repositories(
        library.clone(),
        library.clone(),
        library.clone(),
    ))
}

/// Read a JSON body, panicking with context when it is not JSON.
pub(crate) async fn json_body(response: ServiceResponse) -> Value {
    let body = actix_test::read_body(response).await;
    serde_json::from_slice(&body).expect("JSON body")
}

/// `(code, details.field, details.code)` of an error payload.
pub(crate) fn error_parts(value: &Value) -> (Option<&str>, Option<&str>, Option<&str>) {
    let details = value.get("details");
    (
        value.get("code").and_then(Value::as_str),
        details
            .and_then(|details| details.get("field"))
            .and_then(Value::as_str),
        details
            .and_then(|details| details.get("code"))
            .and_then(Value::as_str),
    )
}
