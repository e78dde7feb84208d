//! PostgreSQL-backed `BookRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use diesel::dsl::count_star;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{BookPersistenceError, BookRepository};
use crate::domain::{Book, BookName, BookStatistic, NewBook};

use super::diesel_helpers::{DbFailure, collect_rows, row_to_book, row_to_statistic};
use super::models::{BookRow, NewBookRow};
use super::pool::DbPool;
use super::schema::books;

/// Diesel-backed implementation of the `BookRepository` port.
#[derive(Clone)]
pub struct DieselBookRepository {
    pool: DbPool,
}

impl DieselBookRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_failure(failure: impl Into<DbFailure>) -> BookPersistenceError {
    failure.into().into_port_error(
        BookPersistenceError::connection,
        BookPersistenceError::query,
    )
}

#[async_trait]
impl BookRepository for DieselBookRepository {
    async fn insert(&self, book: &NewBook) -> Result<Book, BookPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_failure)?;

        let row = diesel::insert_into(books::table)
            .values(&NewBookRow {
                name: book.name.as_ref(),
                book_type: book.book_type.as_str(),
            })
            .returning(BookRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_failure)?;

        row_to_book(row).map_err(BookPersistenceError::query)
    }

    async fn find_by_name(&self, name: &BookName) -> Result<Option<Book>, BookPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_failure)?;

        let row: Option<BookRow> = books::table
            .filter(books::name.eq(name.as_ref()))
            .order_by(books::id)
            .select(BookRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_failure)?;

        row.map(row_to_book)
            .transpose()
            .map_err(BookPersistenceError::query)
    }

    async fn statistics(&self) -> Result<Vec<BookStatistic>, BookPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_failure)?;

        let rows: Vec<(String, i64)> = books::table
            .group_by(books::book_type)
            .select((books::book_type, count_star()))
            .order_by(books::book_type)
            .load(&mut conn)
            .await
            .map_err(map_failure)?;

        collect_rows(rows, row_to_statistic).map_err(BookPersistenceError::query)
    }
}
