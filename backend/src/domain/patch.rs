//! Patch documents: ordered field-level edits applied to a transient
//! user shape before re-validation.
//!
//! A patch document is a JSON-Patch-style list of operations. An explicit
//! interpreter applies each operation to a plain [`UserPatchShape`]; there
//! is no reflection and no generic "apply to arbitrary object" machinery.
//! Malformed operations (unknown path, unsupported op, wrong value type)
//! surface as [`PatchError`] and map to a validation failure, never a
//! crash.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::error::Error;
use crate::domain::user::{UserRecord, UserValidationError, validate_identity_fields};

/// A single field-level edit inside a patch document.
///
/// Example JSON: `{"op":"replace","path":"/login","value":"abc123"}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PatchOperation {
    /// Operation kind: `add`, `replace`, or `remove`.
    #[schema(example = "replace")]
    pub op: String,
    /// Field path, with or without the leading slash.
    #[schema(example = "/login")]
    pub path: String,
    /// New value for `add`/`replace`; ignored by `remove`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub value: Option<Value>,
}

/// Ordered list of patch operations, applied in document order.
pub type PatchDocument = Vec<PatchOperation>;

/// Failures raised while interpreting a patch document.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PatchError {
    /// The operation kind is not one of `add`, `replace`, `remove`.
    #[error("unsupported patch operation: {op}")]
    UnsupportedOperation {
        /// The offending operation kind.
        op: String,
    },
    /// The path does not address a patchable field.
    #[error("unknown patch path: {path}")]
    UnknownPath {
        /// The offending path.
        path: String,
    },
    /// An `add`/`replace` operation arrived without a value.
    #[error("patch operation on {field} requires a value")]
    MissingValue {
        /// Field addressed by the operation.
        field: &'static str,
    },
    /// The value has the wrong JSON type for a string field.
    #[error("{field} expects a string value")]
    ExpectedString {
        /// Field addressed by the operation.
        field: &'static str,
    },
    /// `gamesPlayed` received something other than a non-negative integer.
    #[error("gamesPlayed must be a non-negative integer")]
    InvalidGamesPlayed,
    /// `currentGameId` received something other than a UUID or null.
    #[error("currentGameId must be a UUID or null")]
    InvalidGameId,
}

impl From<PatchError> for Error {
    fn from(err: PatchError) -> Self {
        let details = match &err {
            PatchError::UnsupportedOperation { op } => json!({
                "op": op,
                "code": "unsupported_operation",
            }),
            PatchError::UnknownPath { path } => json!({
                "field": path,
                "code": "unknown_path",
            }),
            PatchError::MissingValue { field } => json!({
                "field": field,
                "code": "missing_value",
            }),
            PatchError::ExpectedString { field } => json!({
                "field": field,
                "code": "invalid_type",
            }),
            PatchError::InvalidGamesPlayed => json!({
                "field": "gamesPlayed",
                "code": "invalid_type",
            }),
            PatchError::InvalidGameId => json!({
                "field": "currentGameId",
                "code": "invalid_type",
            }),
        };
        Self::validation_failed(err.to_string()).with_details(details)
    }
}

/// Transient shape a record is materialised into for patching.
///
/// All fields of the update representation are addressable, including the
/// gameplay passthrough fields. Identity fields cleared by `remove` are
/// caught by the re-validation step, not by the interpreter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserPatchShape {
    /// Login, cleared by `remove /login`.
    pub login: Option<String>,
    /// Given name, cleared by `remove /firstName`.
    pub first_name: Option<String>,
    /// Family name, cleared by `remove /lastName`.
    pub last_name: Option<String>,
    /// Games played; `remove` resets it to 0.
    pub games_played: u32,
    /// In-progress game identifier; `remove` clears it.
    pub current_game_id: Option<Uuid>,
}

impl From<&UserRecord> for UserPatchShape {
    fn from(record: &UserRecord) -> Self {
        Self {
            login: Some(record.login.clone()),
            first_name: Some(record.first_name.clone()),
            last_name: Some(record.last_name.clone()),
            games_played: record.games_played,
            current_game_id: record.current_game_id,
        }
    }
}

impl UserPatchShape {
    /// Apply one operation in place.
    ///
    /// # Errors
    /// Returns a [`PatchError`] for unsupported operations, unknown paths,
    /// and values of the wrong type.
    pub fn apply(&mut self, operation: &PatchOperation) -> Result<(), PatchError> {
        let field = operation
            .path
            .strip_prefix('/')
            .unwrap_or(operation.path.as_str());
        match operation.op.as_str() {
            "add" | "replace" => self.set(field, operation.value.as_ref()),
            "remove" => self.clear(field),
            other => Err(PatchError::UnsupportedOperation {
                op: other.to_owned(),
            }),
        }
    }

    /// Re-validate the shape with the same rules as a full replace.
    ///
    /// # Errors
    /// Returns the first violated [`UserValidationError`].
    pub fn validate(&self) -> Result<(), UserValidationError> {
        validate_identity_fields(
            self.login.as_deref(),
            self.first_name.as_deref(),
            self.last_name.as_deref(),
        )
    }

    /// Merge the validated shape back into a stored record.
    ///
    /// Callers must run [`UserPatchShape::validate`] first; cleared
    /// identity fields would otherwise merge as empty strings.
    pub fn merge_into(&self, record: &mut UserRecord) {
        record.login = self.login.clone().unwrap_or_default();
        record.first_name = self.first_name.clone().unwrap_or_default();
        record.last_name = self.last_name.clone().unwrap_or_default();
        record.games_played = self.games_played;
        record.current_game_id = self.current_game_id;
    }

    fn set(&mut self, field: &str, value: Option<&Value>) -> Result<(), PatchError> {
        match field {
            "login" => self.login = string_value("login", value)?,
            "firstName" => self.first_name = string_value("firstName", value)?,
            "lastName" => self.last_name = string_value("lastName", value)?,
            "gamesPlayed" => self.games_played = games_played_value(value)?,
            "currentGameId" => self.current_game_id = game_id_value(value)?,
            other => {
                return Err(PatchError::UnknownPath {
                    path: other.to_owned(),
                });
            }
        }
        Ok(())
    }

    fn clear(&mut self, field: &str) -> Result<(), PatchError> {
        match field {
            "login" => self.login = None,
            "firstName" => self.first_name = None,
            "lastName" => self.last_name = None,
            // Value-typed field: remove resets to the type default.
            "gamesPlayed" => self.games_played = 0,
            "currentGameId" => self.current_game_id = None,
            other => {
                return Err(PatchError::UnknownPath {
                    path: other.to_owned(),
                });
            }
        }
        Ok(())
    }
}

fn string_value(
    field: &'static str,
    value: Option<&Value>,
) -> Result<Option<String>, PatchError> {
    match value {
        None => Err(PatchError::MissingValue { field }),
        Some(Value::Null) => Ok(None),
        Some(Value::String(text)) => Ok(Some(text.clone())),
        Some(_) => Err(PatchError::ExpectedString { field }),
    }
}

fn games_played_value(value: Option<&Value>) -> Result<u32, PatchError> {
    match value {
        None => Err(PatchError::MissingValue {
            field: "gamesPlayed",
        }),
        Some(Value::Null) => Ok(0),
        Some(Value::Number(number)) => number
            .as_u64()
            .and_then(|n| u32::try_from(n).ok())
            .ok_or(PatchError::InvalidGamesPlayed),
        Some(_) => Err(PatchError::InvalidGamesPlayed),
    }
}

fn game_id_value(value: Option<&Value>) -> Result<Option<Uuid>, PatchError> {
    match value {
        None => Err(PatchError::MissingValue {
            field: "currentGameId",
        }),
        Some(Value::Null) => Ok(None),
        Some(Value::String(text)) => Uuid::parse_str(text)
            .map(Some)
            .map_err(|_| PatchError::InvalidGameId),
        Some(_) => Err(PatchError::InvalidGameId),
    }
}
