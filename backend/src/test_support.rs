//! Test utilities for the backend crate.
//!
//! Shared by unit tests (in `src/`) and integration tests (in `tests/`).
//! Compiled for tests and when the `test-support` feature is enabled.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use crate::domain::ports::{
    BookPersistenceError, BookRepository, LoanHistoryPersistenceError, LoanHistoryRepository,
    UserPersistenceError, UserRepository,
};
use crate::domain::{
    Book, BookId, BookName, BookStatistic, LoanChange, LoanHistory, LoanHistoryId, LoanStatus,
    NewBook, NewUser, User, UserAge, UserId, UserLoans, UserName,
};

#[derive(Debug, Clone)]
struct StoredUser {
    name: UserName,
    age: Option<UserAge>,
}

#[derive(Debug, Clone)]
struct StoredLoan {
    id: i64,
    user_id: i64,
    book_name: BookName,
    status: LoanStatus,
}

#[derive(Debug, Default)]
struct State {
    last_user_id: i64,
    last_book_id: i64,
    last_loan_id: i64,
    users: BTreeMap<i64, StoredUser>,
    books: Vec<Book>,
    loans: Vec<StoredLoan>,
    offline: bool,
}

impl State {
    fn user(&self, id: i64) -> Option<User> {
        let stored = self.users.get(&id)?;
        let user_id = UserId::new(id).ok()?;
        Some(User::new(user_id, stored.name.clone(), stored.age))
    }

    fn first_user_named(&self, name: &UserName) -> Option<i64> {
        self.users
            .iter()
            .find(|(_, stored)| &stored.name == name)
            .map(|(id, _)| *id)
    }

    fn user_loans(&self, id: i64) -> Option<UserLoans> {
        let user = self.user(id)?;
        let loans = self
            .loans
            .iter()
            .filter(|loan| loan.user_id == id)
            .map(|loan| {
                LoanHistory::new(
                    LoanHistoryId::from_raw(loan.id),
                    loan.book_name.clone(),
                    loan.status,
                )
            })
            .collect();
        Some(UserLoans::new(user, loans))
    }

    fn is_on_loan(&self, book_name: &BookName) -> bool {
        self.loans
            .iter()
            .any(|loan| loan.status == LoanStatus::Loaned && &loan.book_name == book_name)
    }
}

/// In-memory store implementing every driven port.
///
/// Enforces the same rules as the PostgreSQL schema: at most one LOANED
/// record per book name, conditional returns, cascading deletes guarded by
/// active loans, and all-or-nothing application of aggregate changes.
///
/// # Examples
/// ```
/// use std::sync::Arc;
/// use library_backend::domain::BookService;
/// use library_backend::test_support::InMemoryLibrary;
///
/// let library = Arc::new(InMemoryLibrary::default());
/// let _service = BookService::new(library.clone(), library.clone(), library);
/// ```
#[derive(Debug, Default)]
pub struct InMemoryLibrary {
    state: Mutex<State>,
}

impl InMemoryLibrary {
    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Make every subsequent call fail as if the database were unreachable.
    pub fn set_offline(&self, offline: bool) {
        self.lock().offline = offline;
    }

    /// Number of stored loan records in `status`, across all users.
    pub fn loan_records(&self, status: LoanStatus) -> usize {
        self.lock()
            .loans
            .iter()
            .filter(|loan| loan.status == status)
            .count()
    }

    /// Open a loan directly, bypassing the services. Used to stage races.
    ///
    /// Returns `false` when the user is unknown or the book is already on
    /// loan.
    pub fn force_loan(&self, user: UserId, book_name: &BookName) -> bool {
        let mut state = self.lock();
        if !state.users.contains_key(&user.get()) || state.is_on_loan(book_name) {
            return false;
        }
        state.last_loan_id += 1;
        let id = state.last_loan_id;
        state.loans.push(StoredLoan {
            id,
            user_id: user.get(),
            book_name: book_name.clone(),
            status: LoanStatus::Loaned,
        });
        true
    }

    /// Close `user`'s open loan of `book_name`, bypassing the services.
    ///
    /// Returns `false` when that user holds no open loan of the book.
    pub fn force_return(&self, user: UserId, book_name: &BookName) -> bool {
        let mut state = self.lock();
        let open = state.loans.iter_mut().find(|loan| {
            loan.user_id == user.get()
                && &loan.book_name == book_name
                && loan.status == LoanStatus::Loaned
        });
        let Some(loan) = open else {
            return false;
        };
        loan.status = LoanStatus::Returned;
        true
    }

    fn online(&self) -> Result<MutexGuard<'_, State>, String> {
        let state = self.lock();
        if state.offline {
            return Err("in-memory store is offline".to_owned());
        }
        Ok(state)
    }
}

#[async_trait]
impl BookRepository for InMemoryLibrary {
    async fn insert(&self, book: &NewBook) -> Result<Book, BookPersistenceError> {
        let mut state = self.online().map_err(BookPersistenceError::connection)?;
        state.last_book_id += 1;
        let stored = Book::new(
            BookId::from_raw(state.last_book_id),
            book.name.clone(),
            book.book_type,
        );
        state.books.push(stored.clone());
        Ok(stored)
    }

    async fn find_by_name(&self, name: &BookName) -> Result<Option<Book>, BookPersistenceError> {
        let state = self.online().map_err(BookPersistenceError::connection)?;
        Ok(state.books.iter().find(|book| book.name() == name).cloned())
    }

    async fn statistics(&self) -> Result<Vec<BookStatistic>, BookPersistenceError> {
        let state = self.online().map_err(BookPersistenceError::connection)?;
        let mut counts = BTreeMap::new();
        for book in &state.books {
            let entry = counts
                .entry(book.book_type().as_str())
                .or_insert((book.book_type(), 0_u64));
            entry.1 += 1;
        }
        Ok(counts
            .into_values()
            .map(|(book_type, count)| BookStatistic { book_type, count })
            .collect())
    }
}

#[async_trait]
impl LoanHistoryRepository for InMemoryLibrary {
    async fn has_active_loan(
        &self,
        book_name: &BookName,
    ) -> Result<bool, LoanHistoryPersistenceError> {
        let state = self
            .online()
            .map_err(LoanHistoryPersistenceError::connection)?;
        Ok(state.is_on_loan(book_name))
    }

    async fn count_by_status(&self, status: LoanStatus) -> Result<u64, LoanHistoryPersistenceError> {
        let state = self
            .online()
            .map_err(LoanHistoryPersistenceError::connection)?;
        let count = state
            .loans
            .iter()
            .filter(|loan| loan.status == status)
            .count();
        u64::try_from(count).map_err(|err| LoanHistoryPersistenceError::query(err.to_string()))
    }
}

#[async_trait]
impl UserRepository for InMemoryLibrary {
    async fn insert(&self, user: &NewUser) -> Result<User, UserPersistenceError> {
        let mut state = self.online().map_err(UserPersistenceError::connection)?;
        state.last_user_id += 1;
        let id = state.last_user_id;
        state.users.insert(
            id,
            StoredUser {
                name: user.name.clone(),
                age: user.age,
            },
        );
        state
            .user(id)
            .ok_or_else(|| UserPersistenceError::query("inserted user vanished"))
    }

    async fn list(&self) -> Result<Vec<User>, UserPersistenceError> {
        let state = self.online().map_err(UserPersistenceError::connection)?;
        Ok(state.users.keys().filter_map(|id| state.user(*id)).collect())
    }

    async fn rename(&self, id: UserId, name: &UserName) -> Result<bool, UserPersistenceError> {
        let mut state = self.online().map_err(UserPersistenceError::connection)?;
        let Some(stored) = state.users.get_mut(&id.get()) else {
            return Ok(false);
        };
        stored.name = name.clone();
        Ok(true)
    }

    async fn find_loans_by_name(
        &self,
        name: &UserName,
    ) -> Result<Option<UserLoans>, UserPersistenceError> {
        let state = self.online().map_err(UserPersistenceError::connection)?;
        Ok(state
            .first_user_named(name)
            .and_then(|id| state.user_loans(id)))
    }

    async fn save_loans(&self, loans: &UserLoans) -> Result<(), UserPersistenceError> {
        let mut state = self.online().map_err(UserPersistenceError::connection)?;
        let user_id = loans.user().id().get();
        if !state.users.contains_key(&user_id) {
            return Err(UserPersistenceError::query(format!(
                "user {user_id} no longer exists"
            )));
        }

        let mut staged = state.loans.clone();
        let mut last_loan_id = state.last_loan_id;
        for change in loans.changes() {
            match change {
                LoanChange::Opened { book_name, status } => {
                    let clashes = *status == LoanStatus::Loaned
                        && staged.iter().any(|loan| {
                            loan.status == LoanStatus::Loaned && &loan.book_name == book_name
                        });
                    if clashes {
                        return Err(UserPersistenceError::active_loan_conflict(
                            book_name.as_ref(),
                        ));
                    }
                    last_loan_id += 1;
                    staged.push(StoredLoan {
                        id: last_loan_id,
                        user_id,
                        book_name: book_name.clone(),
                        status: *status,
                    });
                }
                LoanChange::Closed { id, book_name } => {
                    let open = staged.iter_mut().find(|loan| {
                        loan.id == id.get() && loan.status == LoanStatus::Loaned
                    });
                    let Some(loan) = open else {
                        return Err(UserPersistenceError::stale_loan(book_name.as_ref()));
                    };
                    loan.status = LoanStatus::Returned;
                }
            }
        }

        state.loans = staged;
        state.last_loan_id = last_loan_id;
        Ok(())
    }

    async fn delete_by_name(&self, name: &UserName) -> Result<bool, UserPersistenceError> {
        let mut state = self.online().map_err(UserPersistenceError::connection)?;
        let Some(id) = state.first_user_named(name) else {
            return Ok(false);
        };
        let holds_books = state
            .loans
            .iter()
            .any(|loan| loan.user_id == id && loan.status == LoanStatus::Loaned);
        if holds_books {
            return Err(UserPersistenceError::has_active_loans(name.as_ref()));
        }
        state.users.remove(&id);
        state.loans.retain(|loan| loan.user_id != id);
        Ok(true)
    }

    async fn list_with_loans(&self) -> Result<Vec<UserLoans>, UserPersistenceError> {
        let state = self.online().map_err(UserPersistenceError::connection)?;
        Ok(state
            .users
            .keys()
            .filter_map(|id| state.user_loans(*id))
            .collect())
    }
}
