//! Library user data model.

use std::fmt;

/// Maximum allowed length for a user name, matching the column width.
pub const USER_NAME_MAX: usize = 255;

/// Largest age the `INTEGER` column can hold.
pub const USER_AGE_MAX: i64 = 2_147_483_647;

/// Validation errors returned by the user value constructors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserValidationError {
    /// The name was empty or whitespace.
    EmptyName,
    /// The name exceeded [`USER_NAME_MAX`] characters.
    NameTooLong {
        /// Maximum accepted length.
        max: usize,
    },
    /// The age was negative.
    NegativeAge,
    /// The age exceeded [`USER_AGE_MAX`].
    AgeTooLarge {
        /// Maximum accepted age.
        max: i64,
    },
    /// The identifier was zero or negative.
    InvalidId,
}

impl fmt::Display for UserValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => write!(f, "user name must not be empty"),
            Self::NameTooLong { max } => {
                write!(f, "user name must be at most {max} characters")
            }
            Self::NegativeAge => write!(f, "age must not be negative"),
            Self::AgeTooLarge { max } => write!(f, "age must be at most {max}"),
            Self::InvalidId => write!(f, "user id must be a positive integer"),
        }
    }
}

impl std::error::Error for UserValidationError {}

/// Surrogate identifier assigned by the store when a user registers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UserId(i64);

impl UserId {
    /// Validate and wrap a raw identifier.
    ///
    /// # Errors
    /// Returns [`UserValidationError::InvalidId`] for zero or negative input.
    pub fn new(id: i64) -> Result<Self, UserValidationError> {
        if id <= 0 {
            return Err(UserValidationError::InvalidId);
        }
        Ok(Self(id))
    }

    /// Raw database identifier.
    pub fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Non-empty user name, used as the lookup key for loans and deletion.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UserName(String);

impl UserName {
    /// Validate and construct a [`UserName`].
    ///
    /// # Errors
    /// Returns [`UserValidationError::EmptyName`] for blank input and
    /// [`UserValidationError::NameTooLong`] above [`USER_NAME_MAX`] characters.
    pub fn new(name: impl Into<String>) -> Result<Self, UserValidationError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(UserValidationError::EmptyName);
        }
        if name.chars().count() > USER_NAME_MAX {
            return Err(UserValidationError::NameTooLong {
                max: USER_NAME_MAX,
            });
        }
        Ok(Self(name))
    }
}

impl AsRef<str> for UserName {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for UserName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<UserName> for String {
    fn from(value: UserName) -> Self {
        value.0
    }
}

/// Optional user age. Absence is modelled with `Option<UserAge>`, so zero is
/// a real value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UserAge(u32);

impl UserAge {
    /// Wrap a non-negative age.
    pub fn new(age: u32) -> Self {
        Self(age)
    }

    /// Convert a signed value, as received from JSON or the database.
    ///
    /// # Errors
    /// Returns [`UserValidationError::NegativeAge`] for negative input and
    /// [`UserValidationError::AgeTooLarge`] above [`USER_AGE_MAX`].
    pub fn try_from_i64(age: i64) -> Result<Self, UserValidationError> {
        if age > USER_AGE_MAX {
            return Err(UserValidationError::AgeTooLarge { max: USER_AGE_MAX });
        }
        u32::try_from(age)
            .map(Self)
            .map_err(|_| UserValidationError::NegativeAge)
    }

    /// Raw age in years.
    pub fn get(self) -> u32 {
        self.0
    }
}

/// Registered library user.
///
/// ## Invariants
/// - `name` is non-empty once trimmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    id: UserId,
    name: UserName,
    age: Option<UserAge>,
}

impl User {
    /// Build a [`User`] from validated components.
    pub fn new(id: UserId, name: UserName, age: Option<UserAge>) -> Self {
        Self { id, name, age }
    }

    /// Stable surrogate identifier.
    pub fn id(&self) -> UserId {
        self.id
    }

    /// Current name.
    pub fn name(&self) -> &UserName {
        &self.name
    }

    /// Age, when the user supplied one.
    pub fn age(&self) -> Option<UserAge> {
        self.age
    }
}

/// A user that has not been persisted yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    /// Name to register.
    pub name: UserName,
    /// Optional age.
    pub age: Option<UserAge>,
}
