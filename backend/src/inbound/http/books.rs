//! Book API handlers.
//!
//! ```text
//! POST /api/v1/book {"name":"Dune","type":"SCIENCE"}
//! POST /api/v1/book/loan {"userName":"ada","bookName":"Dune"}
//! PUT /api/v1/book/return {"userName":"ada","bookName":"Dune"}
//! GET /api/v1/book/loan
//! GET /api/v1/book/stat
//! ```

use actix_web::{HttpResponse, get, post, put, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::BookStatistic;
use crate::domain::ports::{CreateBookRequest, LoanBookRequest, ReturnBookRequest};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, parse_book_name, parse_book_type, parse_user_name,
};

const NAME: FieldName = FieldName::new("name");
const TYPE: FieldName = FieldName::new("type");
const USER_NAME: FieldName = FieldName::new("userName");
const BOOK_NAME: FieldName = FieldName::new("bookName");

/// Request body for `POST /api/v1/book`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookBody {
    /// Book name; duplicates are allowed.
    #[schema(example = "Dune")]
    pub name: Option<String>,
    /// One of `COMPUTER`, `SCIENCE`, `SOCIAL`, `LANGUAGE`, `ECONOMY`, `ART`,
    /// `ETC`.
    #[serde(rename = "type")]
    #[schema(example = "SCIENCE")]
    pub book_type: Option<String>,
}

impl TryFrom<CreateBookBody> for CreateBookRequest {
    type Error = crate::domain::Error;

    fn try_from(value: CreateBookBody) -> Result<Self, Self::Error> {
        Ok(Self {
            name: parse_book_name(value.name, NAME)?,
            book_type: parse_book_type(value.book_type, TYPE)?,
        })
    }
}

/// Request body for loaning and returning a book.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookLoanBody {
    /// Borrowing user.
    #[schema(example = "ada")]
    pub user_name: Option<String>,
    /// Book being loaned or returned.
    #[schema(example = "Dune")]
    pub book_name: Option<String>,
}

impl TryFrom<BookLoanBody> for LoanBookRequest {
    type Error = crate::domain::Error;

    fn try_from(value: BookLoanBody) -> Result<Self, Self::Error> {
        Ok(Self {
            user_name: parse_user_name(value.user_name, USER_NAME)?,
            book_name: parse_book_name(value.book_name, BOOK_NAME)?,
        })
    }
}

impl TryFrom<BookLoanBody> for ReturnBookRequest {
    type Error = crate::domain::Error;

    fn try_from(value: BookLoanBody) -> Result<Self, Self::Error> {
        let LoanBookRequest {
            user_name,
            book_name,
        } = LoanBookRequest::try_from(value)?;
        Ok(Self {
            user_name,
            book_name,
        })
    }
}

/// One row of `GET /api/v1/book/stat`.
#[derive(Debug, Deserialize, Serialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BookStatisticResponse {
    /// Book type label.
    #[serde(rename = "type")]
    #[schema(example = "COMPUTER")]
    pub book_type: String,
    /// Registered books of that type.
    #[schema(example = 2)]
    pub count: u64,
}

impl From<BookStatistic> for BookStatisticResponse {
    fn from(value: BookStatistic) -> Self {
        Self {
            book_type: value.book_type.as_str().to_owned(),
            count: value.count,
        }
    }
}

/// Register a book.
#[utoipa::path(
    post,
    path = "/api/v1/book",
    request_body = CreateBookBody,
    responses(
        (status = 201, description = "Book registered"),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 503, description = "Database unavailable", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["books"],
    operation_id = "createBook"
)]
#[post("/book")]
pub async fn create_book(
    state: web::Data<HttpState>,
    payload: web::Json<CreateBookBody>,
) -> ApiResult<HttpResponse> {
    let request = CreateBookRequest::try_from(payload.into_inner())?;
    state.books.create_book(request).await?;
    Ok(HttpResponse::Created().finish())
}

/// Lend a book to a user.
#[utoipa::path(
    post,
    path = "/api/v1/book/loan",
    request_body = BookLoanBody,
    responses(
        (status = 200, description = "Book loaned"),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 404, description = "User or book not found", body = ErrorSchema),
        (status = 409, description = "Book is currently on loan", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["books"],
    operation_id = "loanBook"
)]
#[post("/book/loan")]
pub async fn loan_book(
    state: web::Data<HttpState>,
    payload: web::Json<BookLoanBody>,
) -> ApiResult<HttpResponse> {
    let request = LoanBookRequest::try_from(payload.into_inner())?;
    state.books.loan_book(request).await?;
    Ok(HttpResponse::Ok().finish())
}

/// Return a loaned book.
#[utoipa::path(
    put,
    path = "/api/v1/book/return",
    request_body = BookLoanBody,
    responses(
        (status = 200, description = "Book returned"),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 404, description = "User not found", body = ErrorSchema),
        (status = 409, description = "No active loan for this book", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["books"],
    operation_id = "returnBook"
)]
#[put("/book/return")]
pub async fn return_book(
    state: web::Data<HttpState>,
    payload: web::Json<BookLoanBody>,
) -> ApiResult<HttpResponse> {
    let request = ReturnBookRequest::try_from(payload.into_inner())?;
    state.books.return_book(request).await?;
    Ok(HttpResponse::Ok().finish())
}

/// Count books currently on loan.
#[utoipa::path(
    get,
    path = "/api/v1/book/loan",
    responses(
        (status = 200, description = "Books on loan", body = u64),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["books"],
    operation_id = "countLoanedBooks"
)]
#[get("/book/loan")]
pub async fn count_loaned_books(state: web::Data<HttpState>) -> ApiResult<web::Json<u64>> {
    let count = state.books_query.count_loaned_books().await?;
    Ok(web::Json(count))
}

/// Registered books grouped by type.
#[utoipa::path(
    get,
    path = "/api/v1/book/stat",
    responses(
        (status = 200, description = "Book statistics", body = [BookStatisticResponse]),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["books"],
    operation_id = "bookStatistics"
)]
#[get("/book/stat")]
pub async fn book_statistics(
    state: web::Data<HttpState>,
) -> ApiResult<web::Json<Vec<BookStatisticResponse>>> {
    let stats = state.books_query.book_statistics().await?;
    Ok(web::Json(
        stats.into_iter().map(BookStatisticResponse::from).collect(),
    ))
}

#[cfg(test)]
#[path = "books_tests.rs"]
mod tests;
