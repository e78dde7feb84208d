//! Port abstraction for the book catalogue store.
use async_trait::async_trait;

use crate::domain::{Book, BookName, BookStatistic, NewBook};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by book repository adapters.
    pub enum BookPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "book repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "book repository query failed: {message}",
    }
}

/// Driven port for registering and reading books.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BookRepository: Send + Sync {
    /// Persist a new book and return it with its assigned identifier.
    async fn insert(&self, book: &NewBook) -> Result<Book, BookPersistenceError>;

    /// Fetch the first registered book with the given name.
    ///
    /// Names are not unique; the oldest registration wins.
    async fn find_by_name(&self, name: &BookName) -> Result<Option<Book>, BookPersistenceError>;

    /// Count registered books per type. Types without books are omitted.
    async fn statistics(&self) -> Result<Vec<BookStatistic>, BookPersistenceError>;
}
