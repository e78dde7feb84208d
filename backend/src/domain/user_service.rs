//! User domain service.
//!
//! Registration, renaming, guarded deletion and the loan history report.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use crate::domain::ports::{
    CreateUserRequest, UpdateUserNameRequest, UserCommand, UserLoanHistory,
    UserPersistenceError, UserQuery, UserRepository,
};
use crate::domain::{Error, NewUser, User, UserName};

const USER_HAS_LOANS: &str = "user has books on loan";

/// User service implementing [`UserCommand`] and [`UserQuery`].
#[derive(Clone)]
pub struct UserService<U> {
    users: Arc<U>,
}

impl<U> UserService<U> {
    /// Create a new service over the user repository.
    pub fn new(users: Arc<U>) -> Self {
        Self { users }
    }
}

impl<U> UserService<U>
where
    U: UserRepository,
{
    fn map_user_error(error: UserPersistenceError) -> Error {
        match error {
            UserPersistenceError::Connection { message } => {
                Error::service_unavailable(format!("user repository unavailable: {message}"))
            }
            UserPersistenceError::Query { message } => {
                Error::internal(format!("user repository error: {message}"))
            }
            UserPersistenceError::HasActiveLoans { .. } => Error::invalid_state(USER_HAS_LOANS),
            other @ (UserPersistenceError::ActiveLoanConflict { .. }
            | UserPersistenceError::StaleLoan { .. }) => {
                Error::internal(format!("unexpected loan conflict: {other}"))
            }
        }
    }
}

#[async_trait]
impl<U> UserCommand for UserService<U>
where
    U: UserRepository,
{
    async fn create_user(&self, request: CreateUserRequest) -> Result<User, Error> {
        let user = self
            .users
            .insert(&NewUser {
                name: request.name,
                age: request.age,
            })
            .await
            .map_err(Self::map_user_error)?;
        info!(user_id = user.id().get(), "user registered");
        Ok(user)
    }

    async fn update_user_name(&self, request: UpdateUserNameRequest) -> Result<(), Error> {
        let renamed = self
            .users
            .rename(request.id, &request.name)
            .await
            .map_err(Self::map_user_error)?;
        if !renamed {
            return Err(Error::not_found(format!("user not found: {}", request.id)));
        }
        info!(user_id = request.id.get(), "user renamed");
        Ok(())
    }

    async fn delete_user(&self, name: UserName) -> Result<(), Error> {
        let deleted = self
            .users
            .delete_by_name(&name)
            .await
            .map_err(Self::map_user_error)?;
        if !deleted {
            return Err(Error::not_found(format!("user not found: {name}")));
        }
        info!(user = %name, "user deleted");
        Ok(())
    }
}

#[async_trait]
impl<U> UserQuery for UserService<U>
where
    U: UserRepository,
{
    async fn list_users(&self) -> Result<Vec<User>, Error> {
        self.users.list().await.map_err(Self::map_user_error)
    }

    async fn user_loan_histories(&self) -> Result<Vec<UserLoanHistory>, Error> {
        let users = self
            .users
            .list_with_loans()
            .await
            .map_err(Self::map_user_error)?;
        Ok(users.iter().map(UserLoanHistory::from).collect())
    }
}

#[cfg(test)]
#[path = "user_service_tests.rs"]
mod tests;
