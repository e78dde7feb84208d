//! Port abstraction for loan history reads that span users.
use async_trait::async_trait;

use crate::domain::{BookName, LoanStatus};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by loan history repository adapters.
    pub enum LoanHistoryPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "loan history repository connection failed: {message}",
        /// Query failed during execution.
        Query { message: String } => "loan history repository query failed: {message}",
    }
}

/// Driven port answering questions about loans across all users.
///
/// Writes go through [`super::UserRepository::save_loans`] so they share the
/// owning user's transaction.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LoanHistoryRepository: Send + Sync {
    /// Whether any user currently holds a LOANED record for the book.
    async fn has_active_loan(&self, book_name: &BookName)
    -> Result<bool, LoanHistoryPersistenceError>;

    /// Number of records in the given status.
    async fn count_by_status(&self, status: LoanStatus) -> Result<u64, LoanHistoryPersistenceError>;
}
