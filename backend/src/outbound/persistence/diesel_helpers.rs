//! Shared helpers for the Diesel repository implementations.
//!
//! - Classification of Diesel and pool failures into connection and query
//!   failures, with debug context for operators.
//! - Detection of the active-loan index violation raised by loan inserts.
//! - Conversion of stored rows into domain values. Rows that violate domain
//!   rules are reported as query failures rather than silently repaired.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::{debug, warn};

use crate::domain::{
    Book, BookId, BookName, BookStatistic, BookType, LoanHistory, LoanHistoryId, LoanStatus, User,
    UserAge, UserId, UserName,
};

use super::models::{BookRow, LoanHistoryRow, UserRow};
use super::pool::PoolError;

/// Partial unique index allowing a single LOANED row per book name.
pub(crate) const ACTIVE_LOAN_INDEX: &str = "loan_histories_active_book_name_idx";

/// Coarse classification of a failed database call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum DbFailure {
    /// The pool or connection was unavailable.
    Connection(String),
    /// The statement failed.
    Query(String),
}

impl DbFailure {
    /// Fold into a repository error using its `connection` and `query`
    /// constructors.
    pub(crate) fn into_port_error<E>(
        self,
        connection: impl FnOnce(String) -> E,
        query: impl FnOnce(String) -> E,
    ) -> E {
        match self {
            Self::Connection(message) => connection(message),
            Self::Query(message) => query(message),
        }
    }
}

impl From<PoolError> for DbFailure {
    fn from(error: PoolError) -> Self {
        match error {
            PoolError::Checkout { message } | PoolError::Build { message } => {
                Self::Connection(message)
            }
        }
    }
}

impl From<DieselError> for DbFailure {
    fn from(error: DieselError) -> Self {
        match &error {
            DieselError::DatabaseError(kind, info) => {
                debug!(
                    ?kind,
                    message = info.message(),
                    constraint = info.constraint_name(),
                    "diesel operation failed"
                );
            }
            _ => debug!(
                error_type = %std::any::type_name_of_val(&error),
                "diesel operation failed"
            ),
        }

        match error {
            DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
                Self::Connection("database connection error".to_owned())
            }
            DieselError::NotFound => Self::Query("record not found".to_owned()),
            DieselError::QueryBuilderError(_) => Self::Query("database query error".to_owned()),
            _ => Self::Query("database error".to_owned()),
        }
    }
}

/// Whether a Diesel error is a violation of [`ACTIVE_LOAN_INDEX`].
pub(crate) fn is_active_loan_violation(error: &DieselError) -> bool {
    matches!(
        error,
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info)
            if info.constraint_name() == Some(ACTIVE_LOAN_INDEX)
    )
}

/// Convert a stored user row into a domain user.
pub(crate) fn row_to_user(row: UserRow) -> Result<User, String> {
    let id = UserId::new(row.id).map_err(|err| format!("user {}: {err}", row.id))?;
    let name = UserName::new(row.name).map_err(|err| format!("user {id}: {err}"))?;
    let age = row
        .age
        .map(|age| UserAge::try_from_i64(i64::from(age)))
        .transpose()
        .map_err(|err| format!("user {id}: {err}"))?;
    Ok(User::new(id, name, age))
}

/// Convert a domain age into the `INTEGER` column value.
pub(crate) fn age_to_column(age: Option<UserAge>) -> Result<Option<i32>, String> {
    age.map(|age| i32::try_from(age.get()).map_err(|err| format!("age out of range: {err}")))
        .transpose()
}

/// Convert a stored book row into a domain book.
pub(crate) fn row_to_book(row: BookRow) -> Result<Book, String> {
    let name = BookName::new(row.name).map_err(|err| format!("book {}: {err}", row.id))?;
    let book_type = parse_book_type(&row.book_type)?;
    Ok(Book::new(BookId::from_raw(row.id), name, book_type))
}

/// Convert a stored loan row into a domain loan record.
pub(crate) fn row_to_loan(row: LoanHistoryRow) -> Result<LoanHistory, String> {
    let book_name =
        BookName::new(row.book_name).map_err(|err| format!("loan {}: {err}", row.id))?;
    let status = row.status.parse::<LoanStatus>().map_err(|err| {
        warn!(loan_id = row.id, value = %err.value, "unrecognised loan status");
        format!("loan {}: {err}", row.id)
    })?;
    Ok(LoanHistory::new(
        LoanHistoryId::from_raw(row.id),
        book_name,
        status,
    ))
}

/// Convert a `(type, count)` aggregate row into a statistic.
pub(crate) fn row_to_statistic((label, count): (String, i64)) -> Result<BookStatistic, String> {
    let book_type = parse_book_type(&label)?;
    let count = u64::try_from(count).map_err(|err| format!("{label} count: {err}"))?;
    Ok(BookStatistic { book_type, count })
}

fn parse_book_type(label: &str) -> Result<BookType, String> {
    label.parse::<BookType>().map_err(|err| {
        warn!(value = label, "unrecognised book type");
        err.to_string()
    })
}

/// Collect converted rows, failing on the first invalid one.
pub(crate) fn collect_rows<T, R>(
    rows: impl IntoIterator<Item = R>,
    convert: impl Fn(R) -> Result<T, String>,
) -> Result<Vec<T>, String> {
    rows.into_iter().map(convert).collect()
}

#[cfg(test)]
mod tests {
    //! Regression coverage for row conversion and failure classification.
    use super::*;
    use diesel::result::DatabaseErrorInformation;
    use rstest::rstest;

    #[rstest]
    fn user_rows_keep_absent_and_zero_age_apart() {
        let absent = row_to_user(UserRow {
            id: 1,
            name: "ada".to_owned(),
            age: None,
        })
        .expect("valid row");
        let zero = row_to_user(UserRow {
            id: 2,
            name: "baby".to_owned(),
            age: Some(0),
        })
        .expect("valid row");

        assert_eq!(absent.age(), None);
        assert_eq!(zero.age(), Some(UserAge::new(0)));
    }

    #[rstest]
    #[case(UserRow { id: 0, name: "ada".to_owned(), age: None })]
    #[case(UserRow { id: 1, name: " ".to_owned(), age: None })]
    #[case(UserRow { id: 1, name: "ada".to_owned(), age: Some(-3) })]
    fn invalid_user_rows_are_rejected(#[case] row: UserRow) {
        assert!(row_to_user(row).is_err());
    }

    #[rstest]
    fn unknown_book_type_is_rejected() {
        let row = BookRow {
            id: 4,
            name: "Dune".to_owned(),
            book_type: "POETRY".to_owned(),
        };
        assert_eq!(
            row_to_book(row).expect_err("unknown type"),
            "unknown book type: POETRY"
        );
    }

    #[rstest]
    #[case("LOANED", false)]
    #[case("RETURNED", true)]
    fn loan_rows_map_status(#[case] status: &str, #[case] returned: bool) {
        let loan = row_to_loan(LoanHistoryRow {
            id: 9,
            user_id: 1,
            book_name: "Dune".to_owned(),
            status: status.to_owned(),
        })
        .expect("valid row");
        assert_eq!(loan.is_returned(), returned);
        assert_eq!(loan.id(), Some(LoanHistoryId::from_raw(9)));
    }

    #[rstest]
    fn statistic_rows_reject_negative_counts() {
        assert!(row_to_statistic(("ART".to_owned(), -1)).is_err());
        assert_eq!(
            row_to_statistic(("ART".to_owned(), 3)),
            Ok(BookStatistic {
                book_type: BookType::Art,
                count: 3,
            })
        );
    }

    #[rstest]
    fn pool_failures_are_connection_failures() {
        let failure = DbFailure::from(PoolError::checkout("timed out"));
        assert_eq!(failure, DbFailure::Connection("timed out".to_owned()));
    }

    #[rstest]
    fn missing_rows_are_query_failures() {
        assert_eq!(
            DbFailure::from(DieselError::NotFound),
            DbFailure::Query("record not found".to_owned())
        );
        assert!(!is_active_loan_violation(&DieselError::NotFound));
    }

    #[derive(Debug)]
    struct Violation(Option<&'static str>);

    impl DatabaseErrorInformation for Violation {
        fn message(&self) -> &str {
            "duplicate key value violates unique constraint"
        }
        fn details(&self) -> Option<&str> {
            None
        }
        fn hint(&self) -> Option<&str> {
            None
        }
        fn table_name(&self) -> Option<&str> {
            Some("loan_histories")
        }
        fn column_name(&self) -> Option<&str> {
            None
        }
        fn constraint_name(&self) -> Option<&str> {
            self.0
        }
        fn statement_position(&self) -> Option<i32> {
            None
        }
    }

    fn unique_violation(constraint: Option<&'static str>) -> DieselError {
        DieselError::DatabaseError(
            DatabaseErrorKind::UniqueViolation,
            Box::new(Violation(constraint)),
        )
    }

    #[rstest]
    #[case(Some(ACTIVE_LOAN_INDEX), true)]
    #[case(Some("users_pkey"), false)]
    #[case(None, false)]
    fn only_the_active_loan_index_signals_a_conflict(
        #[case] constraint: Option<&'static str>,
        #[case] expected: bool,
    ) {
        assert_eq!(is_active_loan_violation(&unique_violation(constraint)), expected);
    }

    #[rstest]
    fn unique_violations_classify_as_query_failures() {
        assert_eq!(
            DbFailure::from(unique_violation(Some(ACTIVE_LOAN_INDEX))),
            DbFailure::Query("database error".to_owned())
        );
    }
}
