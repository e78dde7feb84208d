//! Driving port for user mutations.

use async_trait::async_trait;

use crate::domain::{Error, User, UserAge, UserId, UserName};

/// Request to register a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateUserRequest {
    /// Display and lookup name.
    pub name: UserName,
    /// Optional age; absent is distinct from zero.
    pub age: Option<UserAge>,
}

/// Request to rename a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateUserNameRequest {
    /// User to rename.
    pub id: UserId,
    /// Replacement name.
    pub name: UserName,
}

/// Domain use-case port for user mutations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserCommand: Send + Sync {
    /// Register a new user.
    async fn create_user(&self, request: CreateUserRequest) -> Result<User, Error>;

    /// Rename exactly the user with the requested id.
    ///
    /// # Errors
    /// `not_found` when no user has that id.
    async fn update_user_name(&self, request: UpdateUserNameRequest) -> Result<(), Error>;

    /// Delete the user with `name` together with their returned loans.
    ///
    /// # Errors
    /// `not_found` when no user has that name and `invalid_state` when they
    /// still hold a book.
    async fn delete_user(&self, name: UserName) -> Result<(), Error>;
}
