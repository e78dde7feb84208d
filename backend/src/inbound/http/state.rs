//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{BookCommand, BookQuery, UserCommand, UserQuery};
use crate::domain::ports::{BookRepository, LoanHistoryRepository, UserRepository};
use crate::domain::{BookService, UserService};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    /// Book registration, loans and returns.
    pub books: Arc<dyn BookCommand>,
    /// Loan count and book statistics.
    pub books_query: Arc<dyn BookQuery>,
    /// User registration, renaming and deletion.
    pub users: Arc<dyn UserCommand>,
    /// User listing and loan histories.
    pub users_query: Arc<dyn UserQuery>,
}

impl HttpState {
    /// Bundle explicit port implementations.
    pub fn new(
        books: Arc<dyn BookCommand>,
        books_query: Arc<dyn BookQuery>,
        users: Arc<dyn UserCommand>,
        users_query: Arc<dyn UserQuery>,
    ) -> Self {
        Self {
            books,
            books_query,
            users,
            users_query,
        }
    }

    /// Build the domain services over the given repositories.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    /// use library_backend::inbound::http::state::HttpState;
    /// use library_backend::test_support::InMemoryLibrary;
    ///
    /// let library = Arc::new(InMemoryLibrary::default());
    /// let _state = HttpState::from_repositories(library.clone(), library.clone(), library);
    /// ```
    pub fn from_repositories<B, U, L>(books: Arc<B>, users: Arc<U>, loans: Arc<L>) -> Self
    where
        B: BookRepository + 'static,
        U: UserRepository + 'static,
        L: LoanHistoryRepository + 'static,
    {
        let book_service = Arc::new(BookService::new(books, users.clone(), loans));
        let user_service = Arc::new(UserService::new(users));
        Self {
            books: book_service.clone(),
            books_query: book_service,
            users: user_service.clone(),
            users_query: user_service,
        }
    }
}
