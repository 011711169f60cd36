//! Domain primitives and use-cases for the users resource.
//!
//! Purpose: define the strongly typed user record, the validation rules
//! shared by create/replace/patch, the patch-document interpreter, and the
//! service that composes them with the store port. Inbound adapters map
//! these types to wire representations; nothing in here knows about HTTP.

pub mod error;
pub mod patch;
pub mod ports;
pub mod user;
pub mod users_service;

pub use self::error::{Error, ErrorCode};
pub use self::patch::{PatchDocument, PatchError, PatchOperation, UserPatchShape};
pub use self::user::{UserDraft, UserRecord, UserValidationError, validate_identity_fields};
pub use self::users_service::{ReplaceOutcome, UserInput, UsersPage, UsersService};
