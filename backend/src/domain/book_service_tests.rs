//! Tests for the book service.

use std::sync::Arc;

use super::*;
use crate::domain::ports::{MockBookRepository, MockLoanHistoryRepository, MockUserRepository};
use crate::domain::{BookId, BookType, ErrorCode, NewUser, User, UserId};
use crate::test_support::InMemoryLibrary;
use rstest::{fixture, rstest};

type LibraryService = BookService<InMemoryLibrary, InMemoryLibrary, InMemoryLibrary>;

fn book_name(name: &str) -> BookName {
    BookName::new(name).expect("valid book name")
}

fn user_name(name: &str) -> UserName {
    UserName::new(name).expect("valid user name")
}

fn loan(user: &str, book: &str) -> LoanBookRequest {
    LoanBookRequest {
        user_name: user_name(user),
        book_name: book_name(book),
    }
}

fn give_back(user: &str, book: &str) -> ReturnBookRequest {
    ReturnBookRequest {
        user_name: user_name(user),
        book_name: book_name(book),
    }
}

#[fixture]
fn library() -> Arc<InMemoryLibrary> {
    Arc::new(InMemoryLibrary::default())
}

async fn seed(library: &Arc<InMemoryLibrary>, users: &[&str], books: &[(&str, BookType)]) {
    for name in users {
        UserRepository::insert(
            library.as_ref(),
            &NewUser {
                name: user_name(name),
                age: None,
            },
        )
        .await
        .expect("seed user");
    }
    for (name, book_type) in books {
        BookRepository::insert(
            library.as_ref(),
            &NewBook {
                name: book_name(name),
                book_type: *book_type,
            },
        )
        .await
        .expect("seed book");
    }
}

fn service(library: &Arc<InMemoryLibrary>) -> LibraryService {
    BookService::new(library.clone(), library.clone(), library.clone())
}

#[rstest]
#[tokio::test]
async fn statistics_partition_books_by_type(library: Arc<InMemoryLibrary>) {
    let service = service(&library);
    for (name, book_type) in [
        ("A", BookType::Computer),
        ("B", BookType::Computer),
        ("C", BookType::Science),
    ] {
        service
            .create_book(CreateBookRequest {
                name: book_name(name),
                book_type,
            })
            .await
            .expect("book registered");
    }

    let mut stats = service.book_statistics().await.expect("statistics");
    stats.sort_by_key(|stat| stat.book_type);

    assert_eq!(
        stats,
        vec![
            BookStatistic {
                book_type: BookType::Computer,
                count: 2,
            },
            BookStatistic {
                book_type: BookType::Science,
                count: 1,
            },
        ]
    );
}

#[rstest]
#[tokio::test]
async fn duplicate_book_names_are_allowed(library: Arc<InMemoryLibrary>) {
    let service = service(&library);
    let request = CreateBookRequest {
        name: book_name("Dune"),
        book_type: BookType::Etc,
    };

    let first = service.create_book(request.clone()).await.expect("first");
    let second = service.create_book(request).await.expect("second");

    assert_ne!(first.id(), second.id());
}

#[rstest]
#[tokio::test]
async fn second_loan_of_same_book_is_rejected(library: Arc<InMemoryLibrary>) {
    seed(&library, &["ada", "grace"], &[("Dune", BookType::Science)]).await;
    let service = service(&library);

    service.loan_book(loan("ada", "Dune")).await.expect("first loan");
    let error = service
        .loan_book(loan("grace", "Dune"))
        .await
        .expect_err("book already on loan");

    assert_eq!(error.code(), ErrorCode::InvalidState);
    assert_eq!(error.message(), BOOK_ON_LOAN);
    assert_eq!(library.loan_records(LoanStatus::Loaned), 1);
}

#[rstest]
#[tokio::test]
async fn returning_a_book_decrements_the_loaned_count(library: Arc<InMemoryLibrary>) {
    seed(&library, &["ada"], &[("Dune", BookType::Science)]).await;
    let service = service(&library);
    service.loan_book(loan("ada", "Dune")).await.expect("loan");
    assert_eq!(service.count_loaned_books().await.expect("count"), 1);

    service.return_book(give_back("ada", "Dune")).await.expect("return");

    assert_eq!(service.count_loaned_books().await.expect("count"), 0);
    assert_eq!(library.loan_records(LoanStatus::Returned), 1);
}

#[rstest]
#[tokio::test]
async fn two_loans_and_one_return_leave_one_on_loan(library: Arc<InMemoryLibrary>) {
    seed(
        &library,
        &["ada", "grace"],
        &[("Dune", BookType::Science), ("Emma", BookType::Language)],
    )
    .await;
    let service = service(&library);

    service.loan_book(loan("ada", "Dune")).await.expect("loan Dune");
    service.loan_book(loan("grace", "Emma")).await.expect("loan Emma");
    service.return_book(give_back("ada", "Dune")).await.expect("return Dune");

    assert_eq!(service.count_loaned_books().await.expect("count"), 1);
}

#[rstest]
#[tokio::test]
async fn returned_book_can_be_loaned_again(library: Arc<InMemoryLibrary>) {
    seed(&library, &["ada", "grace"], &[("Dune", BookType::Science)]).await;
    let service = service(&library);

    service.loan_book(loan("ada", "Dune")).await.expect("loan");
    service.return_book(give_back("ada", "Dune")).await.expect("return");
    service.loan_book(loan("grace", "Dune")).await.expect("loan again");

    assert_eq!(library.loan_records(LoanStatus::Loaned), 1);
    assert_eq!(library.loan_records(LoanStatus::Returned), 1);
}

#[rstest]
#[case("ada", "Ulysses", ErrorCode::NotFound)]
#[case("nobody", "Dune", ErrorCode::NotFound)]
#[tokio::test]
async fn loan_of_unknown_party_is_not_found(
    library: Arc<InMemoryLibrary>,
    #[case] user: &str,
    #[case] book: &str,
    #[case] expected: ErrorCode,
) {
    seed(&library, &["ada"], &[("Dune", BookType::Science)]).await;

    let error = service(&library)
        .loan_book(loan(user, book))
        .await
        .expect_err("unknown party");

    assert_eq!(error.code(), expected);
    assert_eq!(library.loan_records(LoanStatus::Loaned), 0);
}

#[rstest]
#[tokio::test]
async fn return_without_open_loan_is_invalid_state(library: Arc<InMemoryLibrary>) {
    seed(&library, &["ada"], &[("Dune", BookType::Science)]).await;

    let error = service(&library)
        .return_book(give_back("ada", "Dune"))
        .await
        .expect_err("nothing to return");

    assert_eq!(error.code(), ErrorCode::InvalidState);
    assert_eq!(error.message(), NO_ACTIVE_LOAN);
}

#[rstest]
#[tokio::test]
async fn return_by_another_user_is_invalid_state(library: Arc<InMemoryLibrary>) {
    seed(&library, &["ada", "grace"], &[("Dune", BookType::Science)]).await;
    let service = service(&library);
    service.loan_book(loan("ada", "Dune")).await.expect("loan");

    let error = service
        .return_book(give_back("grace", "Dune"))
        .await
        .expect_err("grace holds nothing");

    assert_eq!(error.code(), ErrorCode::InvalidState);
    assert_eq!(library.loan_records(LoanStatus::Loaned), 1);
}

#[rstest]
#[tokio::test]
async fn return_of_unknown_user_is_not_found(library: Arc<InMemoryLibrary>) {
    let error = service(&library)
        .return_book(give_back("nobody", "Dune"))
        .await
        .expect_err("unknown user");

    assert_eq!(error.code(), ErrorCode::NotFound);
}

#[rstest]
#[tokio::test]
async fn store_outage_is_service_unavailable(library: Arc<InMemoryLibrary>) {
    library.set_offline(true);

    let error = service(&library)
        .count_loaned_books()
        .await
        .expect_err("store offline");

    assert_eq!(error.code(), ErrorCode::ServiceUnavailable);
}

fn stored_user() -> User {
    User::new(
        UserId::new(1).expect("positive id"),
        user_name("ada"),
        None,
    )
}

fn stored_book() -> Book {
    Book::new(BookId::from_raw(1), book_name("Dune"), BookType::Science)
}

#[rstest]
#[tokio::test]
async fn losing_the_loan_race_maps_to_book_on_loan() {
    let mut books = MockBookRepository::new();
    books
        .expect_find_by_name()
        .times(1)
        .return_once(|_| Ok(Some(stored_book())));
    let mut loans = MockLoanHistoryRepository::new();
    loans
        .expect_has_active_loan()
        .times(1)
        .return_once(|_| Ok(false));
    let mut users = MockUserRepository::new();
    users
        .expect_find_loans_by_name()
        .times(1)
        .return_once(|_| Ok(Some(UserLoans::new(stored_user(), Vec::new()))));
    users
        .expect_save_loans()
        .times(1)
        .return_once(|_| Err(UserPersistenceError::active_loan_conflict("Dune")));
    let service = BookService::new(Arc::new(books), Arc::new(users), Arc::new(loans));

    let error = service
        .loan_book(loan("ada", "Dune"))
        .await
        .expect_err("concurrent loan won");

    assert_eq!(error.code(), ErrorCode::InvalidState);
    assert_eq!(error.message(), BOOK_ON_LOAN);
}

#[rstest]
#[tokio::test]
async fn losing_the_return_race_maps_to_no_active_loan() {
    let mut users = MockUserRepository::new();
    users.expect_find_loans_by_name().times(1).return_once(|_| {
        Ok(Some(UserLoans::new(
            stored_user(),
            vec![crate::domain::LoanHistory::new(
                crate::domain::LoanHistoryId::from_raw(7),
                book_name("Dune"),
                LoanStatus::Loaned,
            )],
        )))
    });
    users
        .expect_save_loans()
        .times(1)
        .return_once(|_| Err(UserPersistenceError::stale_loan("Dune")));
    let service = BookService::new(
        Arc::new(MockBookRepository::new()),
        Arc::new(users),
        Arc::new(MockLoanHistoryRepository::new()),
    );

    let error = service
        .return_book(give_back("ada", "Dune"))
        .await
        .expect_err("concurrent return won");

    assert_eq!(error.code(), ErrorCode::InvalidState);
    assert_eq!(error.message(), NO_ACTIVE_LOAN);
}

#[rstest]
#[tokio::test]
async fn loan_is_rejected_before_touching_users_when_book_is_out() {
    let mut books = MockBookRepository::new();
    books
        .expect_find_by_name()
        .times(1)
        .return_once(|_| Ok(Some(stored_book())));
    let mut loans = MockLoanHistoryRepository::new();
    loans
        .expect_has_active_loan()
        .times(1)
        .return_once(|_| Ok(true));
    let mut users = MockUserRepository::new();
    users.expect_find_loans_by_name().never();
    users.expect_save_loans().never();
    let service = BookService::new(Arc::new(books), Arc::new(users), Arc::new(loans));

    let error = service
        .loan_book(loan("ada", "Dune"))
        .await
        .expect_err("book out");

    assert_eq!(error.code(), ErrorCode::InvalidState);
}

#[rstest]
#[tokio::test]
async fn query_failures_are_internal_errors() {
    let mut books = MockBookRepository::new();
    books
        .expect_statistics()
        .times(1)
        .return_once(|| Err(BookPersistenceError::query("relation missing")));
    let service = BookService::new(
        Arc::new(books),
        Arc::new(MockUserRepository::new()),
        Arc::new(MockLoanHistoryRepository::new()),
    );

    let error = service.book_statistics().await.expect_err("query failed");

    assert_eq!(error.code(), ErrorCode::InternalError);
}
