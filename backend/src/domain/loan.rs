//! Loan records and the user loan aggregate.
//!
//! A [`UserLoans`] value is the unit of consistency for borrowing: it is
//! loaded with every loan the user owns, mutated in memory, and handed back
//! to the repository which replays the recorded [`LoanChange`]s inside one
//! transaction.

use std::fmt;
use std::str::FromStr;

use crate::domain::{BookName, User};

/// Lifecycle state of a loan record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoanStatus {
    /// The book is currently with the user.
    Loaned,
    /// The book came back; terminal.
    Returned,
}

impl LoanStatus {
    /// Upper-case storage label.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Loaned => "LOANED",
            Self::Returned => "RETURNED",
        }
    }

    /// Whether the loan has been closed.
    pub const fn is_returned(self) -> bool {
        matches!(self, Self::Returned)
    }
}

impl fmt::Display for LoanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raised when a stored status label is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown loan status: {value}")]
pub struct UnknownLoanStatus {
    /// Rejected label.
    pub value: String,
}

impl FromStr for LoanStatus {
    type Err = UnknownLoanStatus;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "LOANED" => Ok(Self::Loaned),
            "RETURNED" => Ok(Self::Returned),
            other => Err(UnknownLoanStatus {
                value: other.to_owned(),
            }),
        }
    }
}

/// Surrogate identifier of a persisted loan record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LoanHistoryId(i64);

impl LoanHistoryId {
    /// Wrap a raw identifier read from the store.
    pub fn from_raw(id: i64) -> Self {
        Self(id)
    }

    /// Raw database identifier.
    pub fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for LoanHistoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One borrowing of one book, by name.
///
/// `id` is `None` until the record has been persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoanHistory {
    id: Option<LoanHistoryId>,
    book_name: BookName,
    status: LoanStatus,
}

impl LoanHistory {
    /// Rebuild a persisted record.
    pub fn new(id: LoanHistoryId, book_name: BookName, status: LoanStatus) -> Self {
        Self {
            id: Some(id),
            book_name,
            status,
        }
    }

    fn pending(book_name: BookName) -> Self {
        Self {
            id: None,
            book_name,
            status: LoanStatus::Loaned,
        }
    }

    /// Store identifier, if persisted.
    pub fn id(&self) -> Option<LoanHistoryId> {
        self.id
    }

    /// Name of the borrowed book.
    pub fn book_name(&self) -> &BookName {
        &self.book_name
    }

    /// Current status.
    pub fn status(&self) -> LoanStatus {
        self.status
    }

    /// Convenience for `status().is_returned()`.
    pub fn is_returned(&self) -> bool {
        self.status.is_returned()
    }

    /// Whether this record is an open loan of `book_name`.
    fn is_active_for(&self, book_name: &BookName) -> bool {
        self.status == LoanStatus::Loaned && &self.book_name == book_name
    }
}

/// Pending mutation recorded by [`UserLoans`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoanChange {
    /// Insert a new record for the aggregate's user.
    ///
    /// `status` is `Returned` only when a loan was opened and closed before
    /// the aggregate was saved.
    Opened {
        /// Borrowed book.
        book_name: BookName,
        /// Status to insert with.
        status: LoanStatus,
    },
    /// Flip a persisted record from LOANED to RETURNED.
    Closed {
        /// Record to update.
        id: LoanHistoryId,
        /// Book the record refers to.
        book_name: BookName,
    },
}

/// Errors raised by aggregate operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoanError {
    /// The user holds no LOANED record for the book.
    #[error("no active loan for this book")]
    NoActiveLoan {
        /// Book the caller tried to return.
        book_name: BookName,
    },
}

/// A user together with every loan record they own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserLoans {
    user: User,
    loans: Vec<LoanHistory>,
    changes: Vec<LoanChange>,
}

impl UserLoans {
    /// Rebuild the aggregate from stored state. No changes are pending.
    pub fn new(user: User, loans: Vec<LoanHistory>) -> Self {
        Self {
            user,
            loans,
            changes: Vec::new(),
        }
    }

    /// Owning user.
    pub fn user(&self) -> &User {
        &self.user
    }

    /// Every loan record, persisted ones first in store order.
    pub fn loans(&self) -> &[LoanHistory] {
        &self.loans
    }

    /// Mutations made since the aggregate was loaded, in order.
    pub fn changes(&self) -> &[LoanChange] {
        &self.changes
    }

    /// Whether any owned record is still LOANED.
    pub fn has_active_loans(&self) -> bool {
        self.loans
            .iter()
            .any(|loan| loan.status == LoanStatus::Loaned)
    }

    /// Open a loan of `book_name` for this user.
    ///
    /// Availability of the book is checked by the caller and enforced again
    /// by the store when the aggregate is saved.
    pub fn initiate_loan(&mut self, book_name: BookName) {
        self.loans.push(LoanHistory::pending(book_name.clone()));
        self.changes.push(LoanChange::Opened {
            book_name,
            status: LoanStatus::Loaned,
        });
    }

    /// Close the user's open loan of `book_name`.
    ///
    /// # Errors
    /// Returns [`LoanError::NoActiveLoan`] when no owned record for the book
    /// is LOANED.
    pub fn close_loan(&mut self, book_name: &BookName) -> Result<(), LoanError> {
        let Some(loan) = self
            .loans
            .iter_mut()
            .find(|loan| loan.is_active_for(book_name))
        else {
            return Err(LoanError::NoActiveLoan {
                book_name: book_name.clone(),
            });
        };
        loan.status = LoanStatus::Returned;

        match loan.id {
            Some(id) => self.changes.push(LoanChange::Closed {
                id,
                book_name: book_name.clone(),
            }),
            None => {
                if let Some(LoanChange::Opened { status, .. }) =
                    self.changes.iter_mut().rev().find(|change| {
                        matches!(
                            change,
                            LoanChange::Opened { book_name: name, status: LoanStatus::Loaned }
                                if name == book_name
                        )
                    })
                {
                    *status = LoanStatus::Returned;
                }
            }
        }
        Ok(())
    }
}
