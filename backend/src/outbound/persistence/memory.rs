//! In-memory user repository adapter.
//!
//! Records live in a `Vec` behind an `RwLock`, kept in insertion order so
//! page retrieval is stable across calls. Each port operation takes the
//! lock exactly once, which gives the per-operation atomicity the port
//! promises; there is no cross-operation transaction.

use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::ports::{UpsertOutcome, UserRepository, UserRepositoryError};
use crate::domain::user::{UserDraft, UserRecord};

/// Process-local user store.
#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    records: RwLock<Vec<UserRecord>>,
}

impl InMemoryUserRepository {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Vec<UserRecord>>, UserRepositoryError> {
        self.records
            .read()
            .map_err(|_| UserRepositoryError::unavailable("user store lock poisoned"))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Vec<UserRecord>>, UserRepositoryError> {
        self.records
            .write()
            .map_err(|_| UserRepositoryError::unavailable("user store lock poisoned"))
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<UserRecord>, UserRepositoryError> {
        Ok(self.read()?.iter().find(|record| record.id == id).cloned())
    }

    async fn insert(&self, draft: UserDraft) -> Result<UserRecord, UserRepositoryError> {
        let record = draft.into_record(Uuid::new_v4());
        self.write()?.push(record.clone());
        Ok(record)
    }

    async fn update_or_insert(
        &self,
        record: UserRecord,
    ) -> Result<UpsertOutcome, UserRepositoryError> {
        let mut records = self.write()?;
        match records.iter_mut().find(|stored| stored.id == record.id) {
            Some(stored) => {
                *stored = record;
                Ok(UpsertOutcome::Updated)
            }
            None => {
                records.push(record);
                Ok(UpsertOutcome::Inserted)
            }
        }
    }

    async fn delete(&self, id: Uuid) -> Result<(), UserRepositoryError> {
        self.write()?.retain(|record| record.id != id);
        Ok(())
    }

    async fn get_page(
        &self,
        page_number: u32,
        page_size: u32,
    ) -> Result<Vec<UserRecord>, UserRepositoryError> {
        let offset = u64::from(page_number.saturating_sub(1)) * u64::from(page_size);
        let offset = usize::try_from(offset).unwrap_or(usize::MAX);
        let take = usize::try_from(page_size).unwrap_or(usize::MAX);
        Ok(self
            .read()?
            .iter()
            .skip(offset)
            .take(take)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(login: &str) -> UserDraft {
        UserDraft {
            login: login.to_owned(),
            first_name: "Ada".to_owned(),
            last_name: "Lovelace".to_owned(),
        }
    }

    #[tokio::test]
    async fn insert_assigns_a_fresh_id_and_is_findable() {
        let repo = InMemoryUserRepository::new();
        let record = repo.insert(draft("abc123")).await.expect("insert");
        let found = repo
            .find_by_id(record.id)
            .await
            .expect("find")
            .expect("record present");
        assert_eq!(found, record);
    }

    #[tokio::test]
    async fn update_or_insert_reports_whether_it_inserted() {
        let repo = InMemoryUserRepository::new();
        let record = draft("abc123").into_record(Uuid::new_v4());

        let first = repo
            .update_or_insert(record.clone())
            .await
            .expect("upsert");
        assert_eq!(first, UpsertOutcome::Inserted);

        let second = repo.update_or_insert(record).await.expect("upsert");
        assert_eq!(second, UpsertOutcome::Updated);
    }

    #[tokio::test]
    async fn pages_follow_insertion_order() {
        let repo = InMemoryUserRepository::new();
        for n in 0..25 {
            repo.insert(draft(&format!("user{n}"))).await.expect("insert");
        }

        let page = repo.get_page(2, 10).await.expect("page");
        assert_eq!(page.len(), 10);
        assert_eq!(page.first().map(|r| r.login.clone()), Some("user10".to_owned()));
        assert_eq!(page.last().map(|r| r.login.clone()), Some("user19".to_owned()));

        let past_end = repo.get_page(4, 10).await.expect("page");
        assert!(past_end.is_empty());
    }

    #[tokio::test]
    async fn delete_removes_only_the_addressed_record() {
        let repo = InMemoryUserRepository::new();
        let kept = repo.insert(draft("abc")).await.expect("insert");
        let removed = repo.insert(draft("xyz")).await.expect("insert");

        repo.delete(removed.id).await.expect("delete");
        assert!(repo
            .find_by_id(removed.id)
            .await
            .expect("find")
            .is_none());
        assert!(repo.find_by_id(kept.id).await.expect("find").is_some());
    }
}
