//! Port for user record persistence.
//!
//! The [`UserRepository`] trait is the only contract the domain holds
//! against storage. Each method is individually atomic; there is no
//! cross-operation transaction, so the service's read-modify-write paths
//! can lose an update against a concurrent writer to the same identifier.
//! That race is an accepted limitation of this deployment shape.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::user::{UserDraft, UserRecord};

/// Errors raised by user repository adapters.
///
/// Anything other than absence is unrecoverable from the caller's point
/// of view and surfaces as an internal error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UserRepositoryError {
    /// The store could not be reached, or its lock was poisoned.
    #[error("user store unavailable: {message}")]
    Unavailable {
        /// Adapter-specific diagnostic.
        message: String,
    },
    /// A query or mutation failed during execution.
    #[error("user store query failed: {message}")]
    Query {
        /// Adapter-specific diagnostic.
        message: String,
    },
}

impl UserRepositoryError {
    /// Construct an [`UserRepositoryError::Unavailable`] error.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    /// Construct a [`UserRepositoryError::Query`] error.
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }
}

/// Result of [`UserRepository::update_or_insert`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    /// No record existed at the identifier; a new one was stored.
    Inserted,
    /// An existing record was overwritten.
    Updated,
}

/// Port for user record storage and retrieval.
///
/// Pages are 1-indexed and returned in stable insertion order so the
/// counting scan in the service terminates deterministically.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Fetch a record by identifier; `None` when absent.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<UserRecord>, UserRepositoryError>;

    /// Insert a new record; the store assigns the identifier.
    async fn insert(&self, draft: UserDraft) -> Result<UserRecord, UserRepositoryError>;

    /// Store the record under its identifier, inserting when absent.
    async fn update_or_insert(
        &self,
        record: UserRecord,
    ) -> Result<UpsertOutcome, UserRepositoryError>;

    /// Remove the record at the identifier. Callers are expected to
    /// check existence first; deleting an absent id is a no-op.
    async fn delete(&self, id: Uuid) -> Result<(), UserRepositoryError>;

    /// Fetch one page of records. `page_number` is 1-indexed; a page
    /// past the end is empty, not an error.
    async fn get_page(
        &self,
        page_number: u32,
        page_size: u32,
    ) -> Result<Vec<UserRecord>, UserRepositoryError>;
}

/// Fixture implementation behaving like a permanently empty store.
///
/// Lookups return `None`, pages are empty, and writes are discarded. Use
/// it in tests where repository behaviour is not under test.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureUserRepository;

#[async_trait]
impl UserRepository for FixtureUserRepository {
    async fn find_by_id(&self, _id: Uuid) -> Result<Option<UserRecord>, UserRepositoryError> {
        Ok(None)
    }

    async fn insert(&self, draft: UserDraft) -> Result<UserRecord, UserRepositoryError> {
        Ok(draft.into_record(Uuid::new_v4()))
    }

    async fn update_or_insert(
        &self,
        _record: UserRecord,
    ) -> Result<UpsertOutcome, UserRepositoryError> {
        Ok(UpsertOutcome::Inserted)
    }

    async fn delete(&self, _id: Uuid) -> Result<(), UserRepositoryError> {
        Ok(())
    }

    async fn get_page(
        &self,
        _page_number: u32,
        _page_size: u32,
    ) -> Result<Vec<UserRecord>, UserRepositoryError> {
        Ok(Vec::new())
    }
}
