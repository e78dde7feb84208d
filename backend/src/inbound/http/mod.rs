//! HTTP inbound adapter exposing REST endpoints.

use actix_web::{Scope, web};

pub mod books;
pub mod error;
pub mod health;
pub mod schemas;
pub mod state;
pub mod users;
pub mod validation;

pub use error::ApiResult;

use validation::{json_error_handler, query_error_handler};

/// Versioned API scope with every book and user endpoint registered.
///
/// Malformed JSON bodies and query strings are rendered as `invalid_request`
/// errors rather than the framework's plain-text defaults.
///
/// # Examples
/// ```
/// use actix_web::{App, web};
/// use library_backend::inbound::http::api_scope;
///
/// let _app = App::new().service(api_scope());
/// ```
pub fn api_scope() -> Scope {
    web::scope("/api/v1")
        .app_data(web::JsonConfig::default().error_handler(json_error_handler))
        .app_data(web::QueryConfig::default().error_handler(query_error_handler))
        .service(books::create_book)
        .service(books::loan_book)
        .service(books::return_book)
        .service(books::count_loaned_books)
        .service(books::book_statistics)
        .service(users::create_user)
        .service(users::list_users)
        .service(users::update_user_name)
        .service(users::delete_user)
        .service(users::user_loan_histories)
}

#[cfg(test)]
pub(crate) mod test_utils;
