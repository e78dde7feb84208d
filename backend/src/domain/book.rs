//! Book catalogue data model.
//!
//! Books are registered once and never mutated. The name is the business key
//! used by loans; it is deliberately not unique.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Maximum allowed length for a book name, matching the column width.
pub const BOOK_NAME_MAX: usize = 255;

/// Validation errors returned by the book value constructors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookValidationError {
    /// The name was empty or whitespace.
    EmptyName,
    /// The name exceeded [`BOOK_NAME_MAX`] characters.
    NameTooLong {
        /// Maximum accepted length.
        max: usize,
    },
    /// The category label is not one of [`BookType::ALL`].
    UnknownType {
        /// Rejected label.
        value: String,
    },
}

impl fmt::Display for BookValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => write!(f, "book name must not be empty"),
            Self::NameTooLong { max } => {
                write!(f, "book name must be at most {max} characters")
            }
            Self::UnknownType { value } => write!(f, "unknown book type: {value}"),
        }
    }
}

impl std::error::Error for BookValidationError {}

/// Surrogate identifier assigned by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BookId(i64);

impl BookId {
    /// Wrap a raw identifier read from the store.
    pub fn from_raw(id: i64) -> Self {
        Self(id)
    }

    /// Raw database identifier.
    pub fn get(self) -> i64 {
        self.0
    }
}

/// Non-empty book name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BookName(String);

impl BookName {
    /// Validate and construct a [`BookName`].
    ///
    /// # Errors
    /// Returns [`BookValidationError::EmptyName`] for blank input and
    /// [`BookValidationError::NameTooLong`] above [`BOOK_NAME_MAX`] characters.
    pub fn new(name: impl Into<String>) -> Result<Self, BookValidationError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(BookValidationError::EmptyName);
        }
        if name.chars().count() > BOOK_NAME_MAX {
            return Err(BookValidationError::NameTooLong {
                max: BOOK_NAME_MAX,
            });
        }
        Ok(Self(name))
    }
}

impl AsRef<str> for BookName {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for BookName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<BookName> for String {
    fn from(value: BookName) -> Self {
        value.0
    }
}

/// Fixed category used for statistics.
///
/// Serialised and stored as the upper-case label (`"COMPUTER"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookType {
    /// Computing and software.
    Computer,
    /// Natural sciences.
    Science,
    /// Society and politics.
    Social,
    /// Languages and linguistics.
    Language,
    /// Economics and business.
    Economy,
    /// Art and design.
    Art,
    /// Anything else.
    Etc,
}

impl BookType {
    /// Every category in declaration order.
    pub const ALL: [Self; 7] = [
        Self::Computer,
        Self::Science,
        Self::Social,
        Self::Language,
        Self::Economy,
        Self::Art,
        Self::Etc,
    ];

    /// Upper-case storage label.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Computer => "COMPUTER",
            Self::Science => "SCIENCE",
            Self::Social => "SOCIAL",
            Self::Language => "LANGUAGE",
            Self::Economy => "ECONOMY",
            Self::Art => "ART",
            Self::Etc => "ETC",
        }
    }
}

impl fmt::Display for BookType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BookType {
    type Err = BookValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|book_type| book_type.as_str() == value)
            .ok_or_else(|| BookValidationError::UnknownType {
                value: value.to_owned(),
            })
    }
}

/// Registered book.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Book {
    id: BookId,
    name: BookName,
    book_type: BookType,
}

impl Book {
    /// Build a [`Book`] from validated components.
    pub fn new(id: BookId, name: BookName, book_type: BookType) -> Self {
        Self {
            id,
            name,
            book_type,
        }
    }

    /// Stable surrogate identifier.
    pub fn id(&self) -> BookId {
        self.id
    }

    /// Business key used by loans.
    pub fn name(&self) -> &BookName {
        &self.name
    }

    /// Category used for statistics.
    pub fn book_type(&self) -> BookType {
        self.book_type
    }
}

/// A book that has not been persisted yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBook {
    /// Name to register.
    pub name: BookName,
    /// Category.
    pub book_type: BookType,
}

/// Number of registered books in one category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BookStatistic {
    /// Category.
    pub book_type: BookType,
    /// Books of that category; never zero.
    pub count: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("")]
    #[case(" \t")]
    fn book_name_rejects_blank_input(#[case] raw: &str) {
        assert_eq!(BookName::new(raw), Err(BookValidationError::EmptyName));
    }

    #[rstest]
    fn book_name_rejects_overlong_input() {
        assert_eq!(
            BookName::new("x".repeat(BOOK_NAME_MAX + 1)),
            Err(BookValidationError::NameTooLong { max: BOOK_NAME_MAX })
        );
    }

    #[rstest]
    fn book_type_labels_parse_back() {
        for book_type in BookType::ALL {
            assert_eq!(book_type.as_str().parse::<BookType>(), Ok(book_type));
        }
    }

    #[rstest]
    #[case("computer")]
    #[case("POETRY")]
    #[case("")]
    fn book_type_rejects_unknown_labels(#[case] raw: &str) {
        assert_eq!(
            raw.parse::<BookType>(),
            Err(BookValidationError::UnknownType {
                value: raw.to_owned()
            })
        );
    }

    #[rstest]
    fn book_type_serialises_as_storage_label() {
        let value = serde_json::to_value(BookType::Language).expect("serialises");
        assert_eq!(value, serde_json::json!("LANGUAGE"));
    }
}
