//! Driving port for catalogue reports.

use async_trait::async_trait;

use crate::domain::{BookStatistic, Error};

/// Domain use-case port for loan counts and book statistics.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BookQuery: Send + Sync {
    /// Number of books currently on loan.
    async fn count_loaned_books(&self) -> Result<u64, Error>;

    /// Registered books grouped by type.
    async fn book_statistics(&self) -> Result<Vec<BookStatistic>, Error>;
}
