//! Use-case service composing validation, mapping, and the user store.
//!
//! Every resource operation goes through [`UsersService`]. Validation
//! always runs before any store mutation, so a failing request never
//! leaves a partial write behind.

use std::sync::Arc;

use pagination::{MAX_PAGE_SIZE, PageRequest};
use tracing::{debug, info};
use uuid::Uuid;

use crate::domain::error::Error;
use crate::domain::patch::{PatchDocument, UserPatchShape};
use crate::domain::ports::{UserRepository, UserRepositoryError};
use crate::domain::user::{UserDraft, UserRecord, validate_identity_fields};

/// Unvalidated write payload for create and full replace.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserInput {
    /// Login, required and `[A-Za-z0-9]+`.
    pub login: Option<String>,
    /// Given name, required.
    pub first_name: Option<String>,
    /// Family name, required.
    pub last_name: Option<String>,
}

/// Outcome of a full replace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplaceOutcome {
    /// No record existed; one was created under the caller-supplied id.
    Created(Uuid),
    /// The existing record's identity fields were overwritten.
    Replaced,
}

/// One page of users together with the collection total.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsersPage {
    /// Records of the requested page, in insertion order.
    pub records: Vec<UserRecord>,
    /// Total number of records in the store.
    pub total_count: u64,
}

/// Resource semantics for the users collection.
pub struct UsersService {
    repository: Arc<dyn UserRepository>,
}

impl UsersService {
    /// Build a service over the given store port.
    #[must_use]
    pub fn new(repository: Arc<dyn UserRepository>) -> Self {
        Self { repository }
    }

    /// Fetch one record.
    ///
    /// # Errors
    /// `NotFound` when no record exists at `id`.
    pub async fn get(&self, id: Uuid) -> Result<UserRecord, Error> {
        self.repository
            .find_by_id(id)
            .await
            .map_err(map_store_error)?
            .ok_or_else(|| user_not_found(id))
    }

    /// Create a new record; the store assigns the identifier.
    ///
    /// # Errors
    /// `ValidationFailed` when a required field is missing or the login
    /// charset rule is violated.
    pub async fn create(&self, input: UserInput) -> Result<UserRecord, Error> {
        let draft = validated_draft(input)?;
        let record = self.repository.insert(draft).await.map_err(map_store_error)?;
        info!(user_id = %record.id, "user created");
        Ok(record)
    }

    /// Full replace with upsert semantics.
    ///
    /// When no record exists at `id`, a new one is created under exactly
    /// that identifier with gameplay fields at their defaults. When one
    /// exists, only the identity fields are overwritten — `games_played`
    /// and `current_game_id` survive a replace.
    ///
    /// # Errors
    /// `ValidationFailed` on any violated field rule, checked before any
    /// store write.
    pub async fn replace(&self, id: Uuid, input: UserInput) -> Result<ReplaceOutcome, Error> {
        let draft = validated_draft(input)?;
        let existing = self
            .repository
            .find_by_id(id)
            .await
            .map_err(map_store_error)?;

        match existing {
            None => {
                self.repository
                    .update_or_insert(draft.into_record(id))
                    .await
                    .map_err(map_store_error)?;
                info!(user_id = %id, "user created via replace");
                Ok(ReplaceOutcome::Created(id))
            }
            Some(mut record) => {
                record.login = draft.login;
                record.first_name = draft.first_name;
                record.last_name = draft.last_name;
                self.repository
                    .update_or_insert(record)
                    .await
                    .map_err(map_store_error)?;
                info!(user_id = %id, "user replaced");
                Ok(ReplaceOutcome::Replaced)
            }
        }
    }

    /// Apply a patch document to an existing record.
    ///
    /// The record is materialised into the update shape, the operations
    /// are applied in document order, and the result is re-validated with
    /// the same rules as a full replace before anything is persisted.
    ///
    /// # Errors
    /// `NotFound` when the record is absent — a patch never creates.
    /// `ValidationFailed` for malformed operations or violated field
    /// rules.
    pub async fn patch(&self, id: Uuid, document: &PatchDocument) -> Result<(), Error> {
        let mut record = self
            .repository
            .find_by_id(id)
            .await
            .map_err(map_store_error)?
            .ok_or_else(|| user_not_found(id))?;

        let mut shape = UserPatchShape::from(&record);
        for operation in document {
            shape.apply(operation).map_err(Error::from)?;
        }
        shape.validate().map_err(Error::from)?;

        shape.merge_into(&mut record);
        self.repository
            .update_or_insert(record)
            .await
            .map_err(map_store_error)?;
        info!(user_id = %id, operations = document.len(), "user patched");
        Ok(())
    }

    /// Delete one record.
    ///
    /// # Errors
    /// `NotFound` when no record exists at `id`; a second delete of the
    /// same identifier fails the same way.
    pub async fn delete(&self, id: Uuid) -> Result<(), Error> {
        self.repository
            .find_by_id(id)
            .await
            .map_err(map_store_error)?
            .ok_or_else(|| user_not_found(id))?;
        self.repository.delete(id).await.map_err(map_store_error)?;
        info!(user_id = %id, "user deleted");
        Ok(())
    }

    /// Fetch one page of users plus the collection total.
    ///
    /// # Errors
    /// Store failures surface as internal errors.
    pub async fn list(&self, request: PageRequest) -> Result<UsersPage, Error> {
        let records = self
            .repository
            .get_page(request.number(), request.size())
            .await
            .map_err(map_store_error)?;
        let total_count = self.count().await?;
        debug!(
            page = request.number(),
            size = request.size(),
            total_count,
            "users page served"
        );
        Ok(UsersPage {
            records,
            total_count,
        })
    }

    /// Collaborator-driven total count.
    ///
    /// The port exposes no direct count, so this scans max-size pages
    /// until a short or empty one, accumulating the exact total. Costs
    /// O(totalRecords / `MAX_PAGE_SIZE`) store calls — a documented
    /// inefficiency of count-free stores, not a correctness bug.
    async fn count(&self) -> Result<u64, Error> {
        let mut total: u64 = 0;
        let mut page_number: u32 = 1;
        loop {
            let page = self
                .repository
                .get_page(page_number, MAX_PAGE_SIZE)
                .await
                .map_err(map_store_error)?;
            let fetched = u64::try_from(page.len()).unwrap_or(u64::MAX);
            total = total.saturating_add(fetched);
            if fetched < u64::from(MAX_PAGE_SIZE) {
                return Ok(total);
            }
            page_number = page_number.saturating_add(1);
        }
    }
}

fn validated_draft(input: UserInput) -> Result<UserDraft, Error> {
    validate_identity_fields(
        input.login.as_deref(),
        input.first_name.as_deref(),
        input.last_name.as_deref(),
    )?;
    Ok(UserDraft {
        login: input.login.unwrap_or_default(),
        first_name: input.first_name.unwrap_or_default(),
        last_name: input.last_name.unwrap_or_default(),
    })
}

fn user_not_found(id: Uuid) -> Error {
    Error::not_found(format!("no user with id {id}"))
}

fn map_store_error(err: UserRepositoryError) -> Error {
    // Store failures are unrecoverable here; adapters log the redacted
    // internal message.
    Error::internal(err.to_string())
}
