//! Domain ports defining the edges of the hexagon.
//!
//! Driven ports (`*Repository`) describe how the domain expects to reach the
//! database. Each exposes a typed error generated by `define_port_error!` so
//! adapters map their failures into predictable variants. Driving ports
//! (`*Command`, `*Query`) are the use cases inbound adapters call.

mod macros;
pub(crate) use macros::define_port_error;

mod book_command;
mod book_query;
mod book_repository;
mod loan_history_repository;
mod user_command;
mod user_query;
mod user_repository;

#[cfg(test)]
pub use book_command::MockBookCommand;
pub use book_command::{BookCommand, CreateBookRequest, LoanBookRequest, ReturnBookRequest};
#[cfg(test)]
pub use book_query::MockBookQuery;
pub use book_query::BookQuery;
#[cfg(test)]
pub use book_repository::MockBookRepository;
pub use book_repository::{BookPersistenceError, BookRepository};
#[cfg(test)]
pub use loan_history_repository::MockLoanHistoryRepository;
pub use loan_history_repository::{LoanHistoryPersistenceError, LoanHistoryRepository};
#[cfg(test)]
pub use user_command::MockUserCommand;
pub use user_command::{CreateUserRequest, UpdateUserNameRequest, UserCommand};
#[cfg(test)]
pub use user_query::MockUserQuery;
pub use user_query::{LoanedBook, UserLoanHistory, UserQuery};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{UserPersistenceError, UserRepository};
