//! Domain primitives, aggregates and services.
//!
//! Purpose: Define strongly typed library entities used by the HTTP and
//! persistence layers, the ports those layers plug into, and the services
//! implementing the loan lifecycle.
//!
//! Public surface:
//! - Error (alias to `error::Error`): API error response payload.
//! - ErrorCode (alias to `error::ErrorCode`): stable error identifier.
//! - Book, BookType, BookStatistic: catalogue records and statistics.
//! - User, UserLoans, LoanHistory: users and the loans they own.
//! - BookService, UserService: driving port implementations.

pub mod book;
pub mod book_service;
pub mod error;
pub mod loan;
pub mod ports;
mod trace_id;
pub mod user;
pub mod user_service;

pub use self::book::{
    BOOK_NAME_MAX, Book, BookId, BookName, BookStatistic, BookType, BookValidationError, NewBook,
};
pub use self::book_service::BookService;
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::loan::{
    LoanChange, LoanError, LoanHistory, LoanHistoryId, LoanStatus, UnknownLoanStatus, UserLoans,
};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::user::{
    NewUser, USER_AGE_MAX, USER_NAME_MAX, User, UserAge, UserId, UserName, UserValidationError,
};
pub use self::user_service::UserService;

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use library_backend::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::not_found("book not found: Dune"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
