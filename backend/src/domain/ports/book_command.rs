//! Driving port for catalogue and loan mutations.
//!
//! HTTP handlers call [`BookCommand`] to register books and move loans
//! through their lifecycle without touching persistence concerns.

use async_trait::async_trait;

use crate::domain::{Book, BookName, BookType, Error, UserName};

/// Request to register a book.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateBookRequest {
    /// Name of the new book. Duplicates are allowed.
    pub name: BookName,
    /// Category used for statistics.
    pub book_type: BookType,
}

/// Request to lend a book to a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoanBookRequest {
    /// Borrowing user, looked up by name.
    pub user_name: UserName,
    /// Book to lend, looked up by name.
    pub book_name: BookName,
}

/// Request to close a user's open loan of a book.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReturnBookRequest {
    /// Returning user, looked up by name.
    pub user_name: UserName,
    /// Book being returned.
    pub book_name: BookName,
}

/// Domain use-case port for book mutations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BookCommand: Send + Sync {
    /// Register a new book.
    async fn create_book(&self, request: CreateBookRequest) -> Result<Book, Error>;

    /// Lend a book.
    ///
    /// # Errors
    /// `not_found` when the book or user is unknown and `invalid_state` when
    /// the book is already on loan.
    async fn loan_book(&self, request: LoanBookRequest) -> Result<(), Error>;

    /// Return a book.
    ///
    /// # Errors
    /// `not_found` when the user is unknown and `invalid_state` when the user
    /// holds no open loan of the book.
    async fn return_book(&self, request: ReturnBookRequest) -> Result<(), Error>;
}
