//! Port abstraction for user persistence adapters and their errors.
use async_trait::async_trait;

use crate::domain::{NewUser, User, UserId, UserLoans, UserName};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by user repository adapters.
    pub enum UserPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "user repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "user repository query failed: {message}",
        /// Another user opened a loan of the book first.
        ActiveLoanConflict { book_name: String } => "book is already on loan: {book_name}",
        /// The loan being closed was no longer LOANED when the update ran.
        StaleLoan { book_name: String } => "loan was already returned: {book_name}",
        /// The user still holds LOANED records.
        HasActiveLoans { name: String } => "user has books on loan: {name}",
    }
}

/// Driven port for users and the loans they own.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Persist a new user and return it with its assigned identifier.
    async fn insert(&self, user: &NewUser) -> Result<User, UserPersistenceError>;

    /// Every user ordered by identifier.
    async fn list(&self) -> Result<Vec<User>, UserPersistenceError>;

    /// Rename the user with `id`. Returns `false` when no such user exists.
    async fn rename(&self, id: UserId, name: &UserName) -> Result<bool, UserPersistenceError>;

    /// Load the first user with `name` together with every loan they own.
    async fn find_loans_by_name(
        &self,
        name: &UserName,
    ) -> Result<Option<UserLoans>, UserPersistenceError>;

    /// Apply the aggregate's pending changes in one transaction.
    ///
    /// # Errors
    /// [`UserPersistenceError::ActiveLoanConflict`] when an opened loan
    /// collides with another open loan of the same book, and
    /// [`UserPersistenceError::StaleLoan`] when a closed loan was returned
    /// concurrently. Nothing is written in either case.
    async fn save_loans(&self, loans: &UserLoans) -> Result<(), UserPersistenceError>;

    /// Delete the first user with `name` and their returned loan records.
    ///
    /// Returns `false` when no such user exists.
    ///
    /// # Errors
    /// [`UserPersistenceError::HasActiveLoans`] when the user still holds a
    /// LOANED record at the time of deletion.
    async fn delete_by_name(&self, name: &UserName) -> Result<bool, UserPersistenceError>;

    /// Every user with their loans, ordered by user identifier.
    async fn list_with_loans(&self) -> Result<Vec<UserLoans>, UserPersistenceError>;
}
