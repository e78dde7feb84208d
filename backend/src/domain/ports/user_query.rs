//! Driving port for user reports.

use async_trait::async_trait;

use crate::domain::{BookName, Error, User, UserLoans, UserName};

/// One book in a user's loan history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoanedBook {
    /// Borrowed book.
    pub book_name: BookName,
    /// Whether the loan has been closed.
    pub is_returned: bool,
}

/// A user's complete borrowing record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserLoanHistory {
    /// User name.
    pub name: UserName,
    /// One entry per loan record; empty for users who never borrowed.
    pub books: Vec<LoanedBook>,
}

impl From<&UserLoans> for UserLoanHistory {
    fn from(value: &UserLoans) -> Self {
        Self {
            name: value.user().name().clone(),
            books: value
                .loans()
                .iter()
                .map(|loan| LoanedBook {
                    book_name: loan.book_name().clone(),
                    is_returned: loan.is_returned(),
                })
                .collect(),
        }
    }
}

/// Domain use-case port for reading users.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserQuery: Send + Sync {
    /// Every user ordered by identifier.
    async fn list_users(&self) -> Result<Vec<User>, Error>;

    /// Loan history of every user, including users without loans.
    async fn user_loan_histories(&self) -> Result<Vec<UserLoanHistory>, Error>;
}
