//! User API handlers.
//!
//! ```text
//! POST /api/v1/user {"name":"ada","age":36}
//! GET /api/v1/user
//! PUT /api/v1/user {"id":1,"name":"countess"}
//! DELETE /api/v1/user?name=ada
//! GET /api/v1/user/loan
//! ```

use actix_web::{HttpResponse, delete, get, post, put, web};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::ports::{CreateUserRequest, UpdateUserNameRequest, UserLoanHistory};
use crate::domain::{Error, User};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, parse_user_age, parse_user_id, parse_user_name,
};

const ID: FieldName = FieldName::new("id");
const NAME: FieldName = FieldName::new("name");
const AGE: FieldName = FieldName::new("age");

/// Request body for `POST /api/v1/user`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserBody {
    /// User name.
    #[schema(example = "ada")]
    pub name: Option<String>,
    /// Optional non-negative age. Absent and `null` both mean "unknown".
    #[schema(example = 36)]
    pub age: Option<i64>,
}

impl TryFrom<CreateUserBody> for CreateUserRequest {
    type Error = Error;

    fn try_from(value: CreateUserBody) -> Result<Self, Self::Error> {
        Ok(Self {
            name: parse_user_name(value.name, NAME)?,
            age: parse_user_age(value.age, AGE)?,
        })
    }
}

/// Request body for `PUT /api/v1/user`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserNameBody {
    /// User to rename.
    #[schema(example = 1)]
    pub id: Option<i64>,
    /// Replacement name.
    #[schema(example = "countess")]
    pub name: Option<String>,
}

impl TryFrom<UpdateUserNameBody> for UpdateUserNameRequest {
    type Error = Error;

    fn try_from(value: UpdateUserNameBody) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_user_id(value.id, ID)?,
            name: parse_user_name(value.name, NAME)?,
        })
    }
}

/// Query string for `DELETE /api/v1/user`.
#[derive(Debug, Deserialize, Serialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DeleteUserParams {
    /// Name of the user to delete.
    pub name: Option<String>,
}

/// One entry of `GET /api/v1/user`.
#[derive(Debug, Deserialize, Serialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    /// Surrogate identifier.
    #[schema(example = 1)]
    pub id: i64,
    /// User name.
    #[schema(example = "ada")]
    pub name: String,
    /// Age, `null` when unknown.
    #[schema(example = 36)]
    pub age: Option<u32>,
}

impl From<User> for UserResponse {
    fn from(value: User) -> Self {
        Self {
            id: value.id().get(),
            name: value.name().to_string(),
            age: value.age().map(crate::domain::UserAge::get),
        }
    }
}

/// One book in a loan history entry.
#[derive(Debug, Deserialize, Serialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LoanedBookResponse {
    /// Borrowed book.
    #[schema(example = "Dune")]
    pub book_name: String,
    /// Whether the book has been returned.
    pub is_returned: bool,
}

/// One entry of `GET /api/v1/user/loan`.
#[derive(Debug, Deserialize, Serialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserLoanHistoryResponse {
    /// User name.
    #[schema(example = "ada")]
    pub name: String,
    /// Every loan record of the user; empty when they never borrowed.
    pub books: Vec<LoanedBookResponse>,
}

impl From<UserLoanHistory> for UserLoanHistoryResponse {
    fn from(value: UserLoanHistory) -> Self {
        Self {
            name: value.name.into(),
            books: value
                .books
                .into_iter()
                .map(|book| LoanedBookResponse {
                    book_name: book.book_name.into(),
                    is_returned: book.is_returned,
                })
                .collect(),
        }
    }
}

/// Register a user.
#[utoipa::path(
    post,
    path = "/api/v1/user",
    request_body = CreateUserBody,
    responses(
        (status = 201, description = "User registered"),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "createUser"
)]
#[post("/user")]
pub async fn create_user(
    state: web::Data<HttpState>,
    payload: web::Json<CreateUserBody>,
) -> ApiResult<HttpResponse> {
    let request = CreateUserRequest::try_from(payload.into_inner())?;
    state.users.create_user(request).await?;
    Ok(HttpResponse::Created().finish())
}

/// List users ordered by id.
#[utoipa::path(
    get,
    path = "/api/v1/user",
    responses(
        (status = 200, description = "Users", body = [UserResponse]),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "listUsers"
)]
#[get("/user")]
pub async fn list_users(state: web::Data<HttpState>) -> ApiResult<web::Json<Vec<UserResponse>>> {
    let users = state.users_query.list_users().await?;
    Ok(web::Json(users.into_iter().map(UserResponse::from).collect()))
}

/// Rename a user by id.
#[utoipa::path(
    put,
    path = "/api/v1/user",
    request_body = UpdateUserNameBody,
    responses(
        (status = 200, description = "User renamed"),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 404, description = "User not found", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "updateUserName"
)]
#[put("/user")]
pub async fn update_user_name(
    state: web::Data<HttpState>,
    payload: web::Json<UpdateUserNameBody>,
) -> ApiResult<HttpResponse> {
    let request = UpdateUserNameRequest::try_from(payload.into_inner())?;
    state.users.update_user_name(request).await?;
    Ok(HttpResponse::Ok().finish())
}

/// Delete a user by name.
#[utoipa::path(
    delete,
    path = "/api/v1/user",
    params(DeleteUserParams),
    responses(
        (status = 200, description = "User deleted"),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 404, description = "User not found", body = ErrorSchema),
        (status = 409, description = "User has books on loan", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "deleteUser"
)]
#[delete("/user")]
pub async fn delete_user(
    state: web::Data<HttpState>,
    params: web::Query<DeleteUserParams>,
) -> ApiResult<HttpResponse> {
    let name = parse_user_name(params.into_inner().name, NAME)?;
    state.users.delete_user(name).await?;
    Ok(HttpResponse::Ok().finish())
}

/// Loan history of every user.
#[utoipa::path(
    get,
    path = "/api/v1/user/loan",
    responses(
        (status = 200, description = "Loan histories", body = [UserLoanHistoryResponse]),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "userLoanHistories"
)]
#[get("/user/loan")]
pub async fn user_loan_histories(
    state: web::Data<HttpState>,
) -> ApiResult<web::Json<Vec<UserLoanHistoryResponse>>> {
    let histories = state.users_query.user_loan_histories().await?;
    Ok(web::Json(
        histories
            .into_iter()
            .map(UserLoanHistoryResponse::from)
            .collect(),
    ))
}
