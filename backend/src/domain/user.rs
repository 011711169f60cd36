//! User record and the validation rules shared by every write path.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use crate::domain::error::Error;

/// Validation errors for user representations.
///
/// Variants are ordered the way [`validate_identity_fields`] checks them;
/// the first failing rule wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserValidationError {
    /// `login` is missing or empty.
    MissingLogin,
    /// `login` contains a character outside `[A-Za-z0-9]`.
    LoginInvalidCharacters,
    /// `firstName` is missing or empty.
    MissingFirstName,
    /// `lastName` is missing or empty.
    MissingLastName,
}

impl UserValidationError {
    /// Wire name of the field the rule applies to.
    #[must_use]
    pub const fn field(self) -> &'static str {
        match self {
            Self::MissingLogin | Self::LoginInvalidCharacters => "login",
            Self::MissingFirstName => "firstName",
            Self::MissingLastName => "lastName",
        }
    }

    /// Stable machine code for the violated rule.
    #[must_use]
    pub const fn rule(self) -> &'static str {
        match self {
            Self::MissingLogin | Self::MissingFirstName | Self::MissingLastName => "missing_field",
            Self::LoginInvalidCharacters => "invalid_characters",
        }
    }
}

impl fmt::Display for UserValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingLogin => write!(f, "login must not be empty"),
            Self::LoginInvalidCharacters => {
                write!(f, "login must contain only letters and digits")
            }
            Self::MissingFirstName => write!(f, "firstName must not be empty"),
            Self::MissingLastName => write!(f, "lastName must not be empty"),
        }
    }
}

impl std::error::Error for UserValidationError {}

impl From<UserValidationError> for Error {
    fn from(err: UserValidationError) -> Self {
        Self::validation_failed(err.to_string()).with_details(json!({
            "field": err.field(),
            "code": err.rule(),
        }))
    }
}

static LOGIN_RE: OnceLock<Regex> = OnceLock::new();

fn login_regex() -> &'static Regex {
    LOGIN_RE.get_or_init(|| {
        let pattern = "^[A-Za-z0-9]+$";
        Regex::new(pattern)
            .unwrap_or_else(|error| panic!("login regex failed to compile: {error}"))
    })
}

/// Stored user record, owned by the repository.
///
/// The display name is never part of the record; read representations
/// recompute it via [`UserRecord::full_name`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    /// Unique identifier, immutable once created.
    pub id: Uuid,
    /// Login matching `^[A-Za-z0-9]+$`.
    pub login: String,
    /// Given name; non-empty on create and full replace.
    pub first_name: String,
    /// Family name; non-empty on create and full replace.
    pub last_name: String,
    /// Number of games played; defaults to 0 on creation.
    pub games_played: u32,
    /// Identifier of an in-progress game, if any.
    pub current_game_id: Option<Uuid>,
}

impl UserRecord {
    /// Derived display name, `"{lastName} {firstName}"`, recomputed at
    /// read time.
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.last_name, self.first_name)
    }
}

/// Validated new-user payload, before the store assigns an identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserDraft {
    /// Login matching `^[A-Za-z0-9]+$`.
    pub login: String,
    /// Given name, non-empty.
    pub first_name: String,
    /// Family name, non-empty.
    pub last_name: String,
}

impl UserDraft {
    /// Turn the draft into a fresh record under `id`, with gameplay
    /// fields at their creation defaults.
    #[must_use]
    pub fn into_record(self, id: Uuid) -> UserRecord {
        UserRecord {
            id,
            login: self.login,
            first_name: self.first_name,
            last_name: self.last_name,
            games_played: 0,
            current_game_id: None,
        }
    }
}

/// Canonical required-field and charset validation, shared by create,
/// full replace, and post-patch re-validation.
///
/// Short-circuits on the first failing rule, in this order: login
/// presence, login charset, firstName presence, lastName presence. The
/// charset rule only fires for a non-empty login.
///
/// # Errors
/// Returns the first violated [`UserValidationError`].
pub fn validate_identity_fields(
    login: Option<&str>,
    first_name: Option<&str>,
    last_name: Option<&str>,
) -> Result<(), UserValidationError> {
    let login = login.unwrap_or_default();
    if login.is_empty() {
        return Err(UserValidationError::MissingLogin);
    }
    if !login_regex().is_match(login) {
        return Err(UserValidationError::LoginInvalidCharacters);
    }
    if first_name.unwrap_or_default().is_empty() {
        return Err(UserValidationError::MissingFirstName);
    }
    if last_name.unwrap_or_default().is_empty() {
        return Err(UserValidationError::MissingLastName);
    }
    Ok(())
}
