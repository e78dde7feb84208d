//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every book, user and health endpoint together with
//! the request/response DTOs and the error envelope. The document backs
//! Swagger UI in debug builds and is exported by the `openapi-dump` binary.

use utoipa::OpenApi;

use crate::inbound::http::books::{BookLoanBody, BookStatisticResponse, CreateBookBody};
use crate::inbound::http::schemas::{ErrorCodeSchema, ErrorSchema};
use crate::inbound::http::users::{
    CreateUserBody, LoanedBookResponse, UpdateUserNameBody, UserLoanHistoryResponse, UserResponse,
};

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Library backend API",
        description = "Register users and books, lend and return books, and report loan statistics."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::books::create_book,
        crate::inbound::http::books::loan_book,
        crate::inbound::http::books::return_book,
        crate::inbound::http::books::count_loaned_books,
        crate::inbound::http::books::book_statistics,
        crate::inbound::http::users::create_user,
        crate::inbound::http::users::list_users,
        crate::inbound::http::users::update_user_name,
        crate::inbound::http::users::delete_user,
        crate::inbound::http::users::user_loan_histories,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        ErrorSchema,
        ErrorCodeSchema,
        CreateBookBody,
        BookLoanBody,
        BookStatisticResponse,
        CreateUserBody,
        UpdateUserNameBody,
        UserResponse,
        LoanedBookResponse,
        UserLoanHistoryResponse,
    )),
    tags(
        (name = "books", description = "Book registration, loans and statistics"),
        (name = "users", description = "User registration and loan histories"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
