//! Book domain service.
//!
//! Implements the catalogue and loan use cases on top of the driven ports.
//! Every read happens before the single write of a call, so a failing call
//! never leaves partial state behind.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use crate::domain::ports::{
    BookCommand, BookPersistenceError, BookQuery, BookRepository, CreateBookRequest,
    LoanBookRequest, LoanHistoryPersistenceError, LoanHistoryRepository, ReturnBookRequest,
    UserPersistenceError, UserRepository,
};
use crate::domain::{
    Book, BookName, BookStatistic, Error, LoanError, LoanStatus, NewBook, UserLoans, UserName,
};

pub(crate) const BOOK_ON_LOAN: &str = "book is currently on loan";
pub(crate) const NO_ACTIVE_LOAN: &str = "no active loan for this book";

/// Book service implementing [`BookCommand`] and [`BookQuery`].
#[derive(Clone)]
pub struct BookService<B, U, L> {
    books: Arc<B>,
    users: Arc<U>,
    loans: Arc<L>,
}

impl<B, U, L> BookService<B, U, L> {
    /// Create a new service with the given repositories.
    pub fn new(books: Arc<B>, users: Arc<U>, loans: Arc<L>) -> Self {
        Self {
            books,
            users,
            loans,
        }
    }
}

impl<B, U, L> BookService<B, U, L>
where
    B: BookRepository,
    U: UserRepository,
    L: LoanHistoryRepository,
{
    fn map_book_error(error: BookPersistenceError) -> Error {
        match error {
            BookPersistenceError::Connection { message } => {
                Error::service_unavailable(format!("book repository unavailable: {message}"))
            }
            BookPersistenceError::Query { message } => {
                Error::internal(format!("book repository error: {message}"))
            }
        }
    }

    fn map_loan_history_error(error: LoanHistoryPersistenceError) -> Error {
        match error {
            LoanHistoryPersistenceError::Connection { message } => Error::service_unavailable(
                format!("loan history repository unavailable: {message}"),
            ),
            LoanHistoryPersistenceError::Query { message } => {
                Error::internal(format!("loan history repository error: {message}"))
            }
        }
    }

    fn map_user_error(error: UserPersistenceError) -> Error {
        match error {
            UserPersistenceError::Connection { message } => {
                Error::service_unavailable(format!("user repository unavailable: {message}"))
            }
            UserPersistenceError::Query { message } => {
                Error::internal(format!("user repository error: {message}"))
            }
            UserPersistenceError::ActiveLoanConflict { .. } => Error::invalid_state(BOOK_ON_LOAN),
            UserPersistenceError::StaleLoan { .. } => Error::invalid_state(NO_ACTIVE_LOAN),
            UserPersistenceError::HasActiveLoans { name } => {
                Error::internal(format!("unexpected active-loan guard for {name}"))
            }
        }
    }

    async fn require_book(&self, name: &BookName) -> Result<Book, Error> {
        self.books
            .find_by_name(name)
            .await
            .map_err(Self::map_book_error)?
            .ok_or_else(|| Error::not_found(format!("book not found: {name}")))
    }

    async fn require_user_loans(&self, name: &UserName) -> Result<UserLoans, Error> {
        self.users
            .find_loans_by_name(name)
            .await
            .map_err(Self::map_user_error)?
            .ok_or_else(|| Error::not_found(format!("user not found: {name}")))
    }
}

#[async_trait]
impl<B, U, L> BookCommand for BookService<B, U, L>
where
    B: BookRepository,
    U: UserRepository,
    L: LoanHistoryRepository,
{
    async fn create_book(&self, request: CreateBookRequest) -> Result<Book, Error> {
        let new_book = NewBook {
            name: request.name,
            book_type: request.book_type,
        };
        let book = self
            .books
            .insert(&new_book)
            .await
            .map_err(Self::map_book_error)?;
        info!(book_id = book.id().get(), book_type = %book.book_type(), "book registered");
        Ok(book)
    }

    async fn loan_book(&self, request: LoanBookRequest) -> Result<(), Error> {
        let book = self.require_book(&request.book_name).await?;
        let on_loan = self
            .loans
            .has_active_loan(book.name())
            .await
            .map_err(Self::map_loan_history_error)?;
        if on_loan {
            return Err(Error::invalid_state(BOOK_ON_LOAN));
        }

        let mut user_loans = self.require_user_loans(&request.user_name).await?;
        user_loans.initiate_loan(book.name().clone());
        self.users
            .save_loans(&user_loans)
            .await
            .map_err(Self::map_user_error)?;
        info!(
            user_id = user_loans.user().id().get(),
            book = %book.name(),
            "book loaned"
        );
        Ok(())
    }

    async fn return_book(&self, request: ReturnBookRequest) -> Result<(), Error> {
        let mut user_loans = self.require_user_loans(&request.user_name).await?;
        user_loans
            .close_loan(&request.book_name)
            .map_err(|LoanError::NoActiveLoan { .. }| Error::invalid_state(NO_ACTIVE_LOAN))?;
        self.users
            .save_loans(&user_loans)
            .await
            .map_err(Self::map_user_error)?;
        info!(
            user_id = user_loans.user().id().get(),
            book = %request.book_name,
            "book returned"
        );
        Ok(())
    }
}

#[async_trait]
impl<B, U, L> BookQuery for BookService<B, U, L>
where
    B: BookRepository,
    U: UserRepository,
    L: LoanHistoryRepository,
{
    async fn count_loaned_books(&self) -> Result<u64, Error> {
        self.loans
            .count_by_status(LoanStatus::Loaned)
            .await
            .map_err(Self::map_loan_history_error)
    }

    async fn book_statistics(&self) -> Result<Vec<BookStatistic>, Error> {
        self.books
            .statistics()
            .await
            .map_err(Self::map_book_error)
    }
}

#[cfg(test)]
#[path = "book_service_tests.rs"]
mod tests;
