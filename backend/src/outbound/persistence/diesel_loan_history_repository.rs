//! PostgreSQL-backed `LoanHistoryRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use diesel::dsl::exists;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{LoanHistoryPersistenceError, LoanHistoryRepository};
use crate::domain::{BookName, LoanStatus};

use super::diesel_helpers::DbFailure;
use super::pool::DbPool;
use super::schema::loan_histories;

/// Diesel-backed implementation of the `LoanHistoryRepository` port.
#[derive(Clone)]
pub struct DieselLoanHistoryRepository {
    pool: DbPool,
}

impl DieselLoanHistoryRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_failure(failure: impl Into<DbFailure>) -> LoanHistoryPersistenceError {
    failure.into().into_port_error(
        LoanHistoryPersistenceError::connection,
        LoanHistoryPersistenceError::query,
    )
}

#[async_trait]
impl LoanHistoryRepository for DieselLoanHistoryRepository {
    async fn has_active_loan(
        &self,
        book_name: &BookName,
    ) -> Result<bool, LoanHistoryPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_failure)?;

        diesel::select(exists(
            loan_histories::table
                .filter(loan_histories::book_name.eq(book_name.as_ref()))
                .filter(loan_histories::status.eq(LoanStatus::Loaned.as_str())),
        ))
        .get_result(&mut conn)
        .await
        .map_err(map_failure)
    }

    async fn count_by_status(&self, status: LoanStatus) -> Result<u64, LoanHistoryPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_failure)?;

        let count: i64 = loan_histories::table
            .filter(loan_histories::status.eq(status.as_str()))
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_failure)?;

        u64::try_from(count).map_err(|err| LoanHistoryPersistenceError::query(err.to_string()))
    }
}
