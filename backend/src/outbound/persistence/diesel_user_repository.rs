//! PostgreSQL-backed `UserRepository` implementation using Diesel ORM.
//!
//! Users own their loan records, so every loan write goes through this
//! adapter. Aggregate saves replay the recorded changes in one transaction;
//! the partial unique index and conditional updates make concurrent loans
//! and returns fail cleanly instead of corrupting state.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};

use crate::domain::ports::{UserPersistenceError, UserRepository};
use crate::domain::{LoanChange, LoanStatus, NewUser, User, UserId, UserLoans, UserName};

use super::diesel_helpers::{
    DbFailure, age_to_column, collect_rows, is_active_loan_violation, row_to_loan, row_to_user,
};
use super::models::{LoanHistoryRow, NewLoanHistoryRow, NewUserRow, UserNameUpdate, UserRow};
use super::pool::DbPool;
use super::schema::{loan_histories, users};

/// Diesel-backed implementation of the `UserRepository` port.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_failure(failure: impl Into<DbFailure>) -> UserPersistenceError {
    failure.into().into_port_error(
        UserPersistenceError::connection,
        UserPersistenceError::query,
    )
}

/// Failure inside a transaction body. Any variant rolls the transaction back.
#[derive(Debug)]
enum TxError {
    Diesel(diesel::result::Error),
    Rejected(UserPersistenceError),
}

impl From<diesel::result::Error> for TxError {
    fn from(error: diesel::result::Error) -> Self {
        Self::Diesel(error)
    }
}

impl From<TxError> for UserPersistenceError {
    fn from(error: TxError) -> Self {
        match error {
            TxError::Diesel(error) => map_failure(error),
            TxError::Rejected(error) => error,
        }
    }
}

fn assemble(user: UserRow, loans: Vec<LoanHistoryRow>) -> Result<UserLoans, UserPersistenceError> {
    let user = row_to_user(user).map_err(UserPersistenceError::query)?;
    let loans = collect_rows(loans, row_to_loan).map_err(UserPersistenceError::query)?;
    Ok(UserLoans::new(user, loans))
}

async fn apply_change(
    conn: &mut AsyncPgConnection,
    user_id: i64,
    change: &LoanChange,
) -> Result<(), TxError> {
    match change {
        LoanChange::Opened { book_name, status } => {
            diesel::insert_into(loan_histories::table)
                .values(&NewLoanHistoryRow {
                    user_id,
                    book_name: book_name.as_ref(),
                    status: status.as_str(),
                })
                .execute(conn)
                .await
                .map_err(|err| {
                    if is_active_loan_violation(&err) {
                        TxError::Rejected(UserPersistenceError::active_loan_conflict(
                            book_name.as_ref(),
                        ))
                    } else {
                        TxError::Diesel(err)
                    }
                })?;
        }
        LoanChange::Closed { id, book_name } => {
            let updated = diesel::update(
                loan_histories::table
                    .filter(loan_histories::id.eq(id.get()))
                    .filter(loan_histories::user_id.eq(user_id))
                    .filter(loan_histories::status.eq(LoanStatus::Loaned.as_str())),
            )
            .set(loan_histories::status.eq(LoanStatus::Returned.as_str()))
            .execute(conn)
            .await?;
            if updated == 0 {
                return Err(TxError::Rejected(UserPersistenceError::stale_loan(
                    book_name.as_ref(),
                )));
            }
        }
    }
    Ok(())
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn insert(&self, user: &NewUser) -> Result<User, UserPersistenceError> {
        let age = age_to_column(user.age).map_err(UserPersistenceError::query)?;
        let mut conn = self.pool.get().await.map_err(map_failure)?;

        let row = diesel::insert_into(users::table)
            .values(&NewUserRow {
                name: user.name.as_ref(),
                age,
            })
            .returning(UserRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_failure)?;

        row_to_user(row).map_err(UserPersistenceError::query)
    }

    async fn list(&self) -> Result<Vec<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_failure)?;

        let rows: Vec<UserRow> = users::table
            .order_by(users::id)
            .select(UserRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_failure)?;

        collect_rows(rows, row_to_user).map_err(UserPersistenceError::query)
    }

    async fn rename(&self, id: UserId, name: &UserName) -> Result<bool, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_failure)?;

        let updated = diesel::update(users::table.find(id.get()))
            .set(&UserNameUpdate {
                name: name.as_ref(),
            })
            .execute(&mut conn)
            .await
            .map_err(map_failure)?;

        Ok(updated > 0)
    }

    async fn find_loans_by_name(
        &self,
        name: &UserName,
    ) -> Result<Option<UserLoans>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_failure)?;
        let name = name.as_ref();

        // One transaction so the user and their loans come from one snapshot.
        let found = conn
            .transaction(|conn| {
                async move {
                    let Some(user) = users::table
                        .filter(users::name.eq(name))
                        .order_by(users::id)
                        .select(UserRow::as_select())
                        .first(conn)
                        .await
                        .optional()?
                    else {
                        return Ok(None);
                    };
                    let loans: Vec<LoanHistoryRow> = LoanHistoryRow::belonging_to(&user)
                        .order_by(loan_histories::id)
                        .select(LoanHistoryRow::as_select())
                        .load(conn)
                        .await?;
                    Ok::<_, diesel::result::Error>(Some((user, loans)))
                }
                .scope_boxed()
            })
            .await
            .map_err(map_failure)?;

        found
            .map(|(user, loans)| assemble(user, loans))
            .transpose()
    }

    async fn save_loans(&self, loans: &UserLoans) -> Result<(), UserPersistenceError> {
        if loans.changes().is_empty() {
            return Ok(());
        }
        let mut conn = self.pool.get().await.map_err(map_failure)?;
        let user_id = loans.user().id().get();
        let changes = loans.changes();

        conn.transaction(|conn| {
            async move {
                for change in changes {
                    apply_change(conn, user_id, change).await?;
                }
                Ok::<_, TxError>(())
            }
            .scope_boxed()
        })
        .await
        .map_err(UserPersistenceError::from)
    }

    async fn delete_by_name(&self, name: &UserName) -> Result<bool, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_failure)?;
        let name = name.as_ref();

        conn.transaction(|conn| {
            async move {
                // Row lock conflicts with the key-share lock a concurrent loan
                // insert takes, so the re-check below cannot go stale.
                let Some(user_id) = users::table
                    .filter(users::name.eq(name))
                    .order_by(users::id)
                    .select(users::id)
                    .for_update()
                    .first::<i64>(conn)
                    .await
                    .optional()?
                else {
                    return Ok(false);
                };

                let active: i64 = loan_histories::table
                    .filter(loan_histories::user_id.eq(user_id))
                    .filter(loan_histories::status.eq(LoanStatus::Loaned.as_str()))
                    .count()
                    .get_result(conn)
                    .await?;
                if active > 0 {
                    return Err(TxError::Rejected(UserPersistenceError::has_active_loans(
                        name,
                    )));
                }

                diesel::delete(users::table.find(user_id))
                    .execute(conn)
                    .await?;
                Ok::<_, TxError>(true)
            }
            .scope_boxed()
        })
        .await
        .map_err(UserPersistenceError::from)
    }

    async fn list_with_loans(&self) -> Result<Vec<UserLoans>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_failure)?;

        let (user_rows, loan_rows) = conn
            .transaction(|conn| {
                async move {
                    let user_rows: Vec<UserRow> = users::table
                        .order_by(users::id)
                        .select(UserRow::as_select())
                        .load(conn)
                        .await?;
                    let loan_rows: Vec<LoanHistoryRow> = LoanHistoryRow::belonging_to(&user_rows)
                        .order_by(loan_histories::id)
                        .select(LoanHistoryRow::as_select())
                        .load(conn)
                        .await?;
                    Ok::<_, diesel::result::Error>((user_rows, loan_rows))
                }
                .scope_boxed()
            })
            .await
            .map_err(map_failure)?;

        let grouped = loan_rows.grouped_by(&user_rows);
        user_rows
            .into_iter()
            .zip(grouped)
            .map(|(user, loans)| assemble(user, loans))
            .collect()
    }
}
