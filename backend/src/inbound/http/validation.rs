//! Shared validation helpers for inbound HTTP adapters.
//!
//! Request DTOs carry raw, optional fields; these helpers turn them into
//! domain values and report failures as `invalid_request` errors with
//! `details: { field, code }`.

use actix_web::HttpRequest;
use actix_web::error::{JsonPayloadError, QueryPayloadError};
use serde_json::json;

use crate::domain::{
    BookName, BookType, BookValidationError, Error, UserAge, UserId, UserName,
    UserValidationError,
};

/// Validation error codes for HTTP request failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ValidationCode {
    MissingField,
    EmptyName,
    NameTooLong,
    NegativeAge,
    AgeTooLarge,
    InvalidId,
    UnknownType,
    MalformedBody,
    MalformedQuery,
}

impl ValidationCode {
    fn as_str(self) -> &'static str {
        match self {
            Self::MissingField => "missing_field",
            Self::EmptyName => "empty_name",
            Self::NameTooLong => "name_too_long",
            Self::NegativeAge => "negative_age",
            Self::AgeTooLarge => "age_too_large",
            Self::InvalidId => "invalid_id",
            Self::UnknownType => "unknown_type",
            Self::MalformedBody => "malformed_body",
            Self::MalformedQuery => "malformed_query",
        }
    }
}

/// Newtype wrapper for HTTP field names to provide type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    fn as_str(self) -> &'static str {
        self.0
    }
}

fn field_error(field: FieldName, code: ValidationCode, message: impl Into<String>) -> Error {
    Error::invalid_request(message).with_details(json!({
        "field": field.as_str(),
        "code": code.as_str(),
    }))
}

pub(crate) fn missing_field_error(field: FieldName) -> Error {
    let name = field.as_str();
    field_error(
        field,
        ValidationCode::MissingField,
        format!("missing required field: {name}"),
    )
}

pub(crate) fn user_validation_error(field: FieldName, err: &UserValidationError) -> Error {
    let code = match err {
        UserValidationError::EmptyName => ValidationCode::EmptyName,
        UserValidationError::NameTooLong { .. } => ValidationCode::NameTooLong,
        UserValidationError::NegativeAge => ValidationCode::NegativeAge,
        UserValidationError::AgeTooLarge { .. } => ValidationCode::AgeTooLarge,
        UserValidationError::InvalidId => ValidationCode::InvalidId,
    };
    field_error(field, code, err.to_string())
}

pub(crate) fn book_validation_error(field: FieldName, err: &BookValidationError) -> Error {
    let code = match err {
        BookValidationError::EmptyName => ValidationCode::EmptyName,
        BookValidationError::NameTooLong { .. } => ValidationCode::NameTooLong,
        BookValidationError::UnknownType { .. } => ValidationCode::UnknownType,
    };
    field_error(field, code, err.to_string())
}

fn required<T>(value: Option<T>, field: FieldName) -> Result<T, Error> {
    value.ok_or_else(|| missing_field_error(field))
}

pub(crate) fn parse_user_name(value: Option<String>, field: FieldName) -> Result<UserName, Error> {
    UserName::new(required(value, field)?).map_err(|err| user_validation_error(field, &err))
}

pub(crate) fn parse_user_id(value: Option<i64>, field: FieldName) -> Result<UserId, Error> {
    UserId::new(required(value, field)?).map_err(|err| user_validation_error(field, &err))
}

pub(crate) fn parse_user_age(
    value: Option<i64>,
    field: FieldName,
) -> Result<Option<UserAge>, Error> {
    value
        .map(UserAge::try_from_i64)
        .transpose()
        .map_err(|err| user_validation_error(field, &err))
}

pub(crate) fn parse_book_name(value: Option<String>, field: FieldName) -> Result<BookName, Error> {
    BookName::new(required(value, field)?).map_err(|err| book_validation_error(field, &err))
}

pub(crate) fn parse_book_type(value: Option<String>, field: FieldName) -> Result<BookType, Error> {
    required(value, field)?
        .parse::<BookType>()
        .map_err(|err| book_validation_error(field, &err))
}

/// `JsonConfig` error handler rendering malformed bodies as domain errors.
pub fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    Error::invalid_request(format!("malformed request body: {err}"))
        .with_details(json!({ "code": ValidationCode::MalformedBody.as_str() }))
        .into()
}

/// `QueryConfig` error handler rendering malformed query strings as domain
/// errors.
pub fn query_error_handler(err: QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
    Error::invalid_request(format!("malformed query string: {err}"))
        .with_details(json!({ "code": ValidationCode::MalformedQuery.as_str() }))
        .into()
}
