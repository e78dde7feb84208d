//! Tests for book API handlers.

use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::{App, test as actix_test};
use rstest::{fixture, rstest};
use serde_json::{Value, json};

use super::*;
use crate::domain::ports::{MockBookCommand, MockBookQuery, MockUserCommand, MockUserQuery};
use crate::domain::{BookType, Error};
use crate::inbound::http::api_scope;
use crate::inbound::http::test_utils::{error_parts, json_body, library_state};
use crate::test_support::InMemoryLibrary;

#[fixture]
fn library() -> Arc<InMemoryLibrary> {
    Arc::new(InMemoryLibrary::default())
}

fn post_json(uri: &str, body: Value) -> actix_http::Request {
    actix_test::TestRequest::post()
        .uri(uri)
        .set_json(body)
        .to_request()
}

fn put_json(uri: &str, body: Value) -> actix_http::Request {
    actix_test::TestRequest::put()
        .uri(uri)
        .set_json(body)
        .to_request()
}

fn get(uri: &str) -> actix_http::Request {
    actix_test::TestRequest::get().uri(uri).to_request()
}

#[rstest]
#[actix_web::test]
async fn registered_books_show_up_in_statistics(library: Arc<InMemoryLibrary>) {
    let app = actix_test::init_service(
        App::new()
            .app_data(library_state(&library))
            .service(api_scope()),
    )
    .await;

    for (name, book_type) in [("SICP", "COMPUTER"), ("Dune", "SCIENCE"), ("TAOCP", "COMPUTER")] {
        let response = actix_test::call_service(
            &app,
            post_json("/api/v1/book", json!({ "name": name, "type": book_type })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let response = actix_test::call_service(&app, get("/api/v1/book/stat")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        json_body(response).await,
        json!([
            { "type": "COMPUTER", "count": 2 },
            { "type": "SCIENCE", "count": 1 },
        ])
    );
}

#[rstest]
#[case(json!({ "type": "ART" }), "name", "missing_field")]
#[case(json!({ "name": "   ", "type": "ART" }), "name", "empty_name")]
#[case(json!({ "name": "Dune" }), "type", "missing_field")]
#[case(json!({ "name": "Dune", "type": "POETRY" }), "type", "unknown_type")]
#[case(json!({ "name": "Dune", "type": "science" }), "type", "unknown_type")]
#[actix_web::test]
async fn invalid_book_registrations_are_rejected(
    library: Arc<InMemoryLibrary>,
    #[case] body: Value,
    #[case] field: &str,
    #[case] code: &str,
) {
    let app = actix_test::init_service(
        App::new()
            .app_data(library_state(&library))
            .service(api_scope()),
    )
    .await;

    let response = actix_test::call_service(&app, post_json("/api/v1/book", body)).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let value = json_body(response).await;
    assert_eq!(
        error_parts(&value),
        (Some("invalid_request"), Some(field), Some(code))
    );
}

#[rstest]
#[actix_web::test]
async fn malformed_json_is_an_invalid_request(library: Arc<InMemoryLibrary>) {
    let app = actix_test::init_service(
        App::new()
            .app_data(library_state(&library))
            .service(api_scope()),
    )
    .await;
    let request = actix_test::TestRequest::post()
        .uri("/api/v1/book/loan")
        .insert_header(("content-type", "application/json"))
        .set_payload("{\"userName\": ")
        .to_request();

    let response = actix_test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let value = json_body(response).await;
    assert_eq!(
        error_parts(&value),
        (Some("invalid_request"), None, Some("malformed_body"))
    );
}

#[rstest]
#[actix_web::test]
async fn loan_and_return_round_trip(library: Arc<InMemoryLibrary>) {
    let app = actix_test::init_service(
        App::new()
            .app_data(library_state(&library))
            .service(api_scope()),
    )
    .await;
    let loan = json!({ "userName": "ada", "bookName": "Dune" });

    let response =
        actix_test::call_service(&app, post_json("/api/v1/user", json!({ "name": "ada" }))).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let response = actix_test::call_service(
        &app,
        post_json("/api/v1/book", json!({ "name": "Dune", "type": "SCIENCE" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = actix_test::call_service(&app, post_json("/api/v1/book/loan", loan.clone())).await;
    assert_eq!(response.status(), StatusCode::OK);
    let response = actix_test::call_service(&app, get("/api/v1/book/loan")).await;
    assert_eq!(json_body(response).await, json!(1));

    let response = actix_test::call_service(&app, post_json("/api/v1/book/loan", loan.clone())).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let value = json_body(response).await;
    assert_eq!(value.get("code").and_then(Value::as_str), Some("invalid_state"));
    assert_eq!(
        value.get("message").and_then(Value::as_str),
        Some("book is currently on loan")
    );

    let response = actix_test::call_service(&app, put_json("/api/v1/book/return", loan.clone())).await;
    assert_eq!(response.status(), StatusCode::OK);
    let response = actix_test::call_service(&app, get("/api/v1/book/loan")).await;
    assert_eq!(json_body(response).await, json!(0));

    let response = actix_test::call_service(&app, put_json("/api/v1/book/return", loan)).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let value = json_body(response).await;
    assert_eq!(
        value.get("message").and_then(Value::as_str),
        Some("no active loan for this book")
    );
}

#[rstest]
#[case(json!({ "userName": "ada", "bookName": "Missing" }), "book not found: Missing")]
#[case(json!({ "userName": "nobody", "bookName": "Dune" }), "user not found: nobody")]
#[actix_web::test]
async fn loans_of_unknown_entities_are_not_found(
    library: Arc<InMemoryLibrary>,
    #[case] body: Value,
    #[case] message: &str,
) {
    let app = actix_test::init_service(
        App::new()
            .app_data(library_state(&library))
            .service(api_scope()),
    )
    .await;
    actix_test::call_service(&app, post_json("/api/v1/user", json!({ "name": "ada" }))).await;
    actix_test::call_service(
        &app,
        post_json("/api/v1/book", json!({ "name": "Dune", "type": "ETC" })),
    )
    .await;

    let response = actix_test::call_service(&app, post_json("/api/v1/book/loan", body)).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let value = json_body(response).await;
    assert_eq!(value.get("message").and_then(Value::as_str), Some(message));
}

#[rstest]
#[actix_web::test]
async fn unreachable_store_is_service_unavailable(library: Arc<InMemoryLibrary>) {
    let app = actix_test::init_service(
        App::new()
            .app_data(library_state(&library))
            .service(api_scope()),
    )
    .await;
    library.set_offline(true);

    let response = actix_test::call_service(&app, get("/api/v1/book/stat")).await;

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let value = json_body(response).await;
    assert_eq!(
        value.get("code").and_then(Value::as_str),
        Some("service_unavailable")
    );
}

#[rstest]
#[actix_web::test]
async fn internal_errors_are_redacted() {
    let mut query = MockBookQuery::new();
    query
        .expect_count_loaned_books()
        .times(1)
        .return_once(|| Err(Error::internal("relation loan_histories does not exist")));
    let state = HttpState::new(
        Arc::new(MockBookCommand::new()),
        Arc::new(query),
        Arc::new(MockUserCommand::new()),
        Arc::new(MockUserQuery::new()),
    );
    let app = actix_test::init_service(
        App::new()
            .app_data(actix_web::web::Data::new(state))
            .service(api_scope()),
    )
    .await;

    let response = actix_test::call_service(&app, get("/api/v1/book/loan")).await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let value = json_body(response).await;
    assert_eq!(
        value.get("message").and_then(Value::as_str),
        Some("Internal server error")
    );
}

#[rstest]
#[actix_web::test]
async fn create_book_forwards_the_parsed_request() {
    let mut command = MockBookCommand::new();
    command
        .expect_create_book()
        .times(1)
        .withf(|request| {
            request.name.as_ref() == "Dune" && request.book_type == BookType::Science
        })
        .return_once(|request| {
            Ok(crate::domain::Book::new(
                crate::domain::BookId::from_raw(7),
                request.name,
                request.book_type,
            ))
        });
    let state = HttpState::new(
        Arc::new(command),
        Arc::new(MockBookQuery::new()),
        Arc::new(MockUserCommand::new()),
        Arc::new(MockUserQuery::new()),
    );
    let app = actix_test::init_service(
        App::new()
            .app_data(actix_web::web::Data::new(state))
            .service(api_scope()),
    )
    .await;

    let response = actix_test::call_service(
        &app,
        post_json("/api/v1/book", json!({ "name": "Dune", "type": "SCIENCE" })),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);
}
