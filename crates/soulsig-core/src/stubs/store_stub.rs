//! In-memory profile store.
//!
//! Development/testing backend; data is lost when the process exits.

use async_trait::async_trait;
use dashmap::DashMap;

use crate::error::CoreResult;
use crate::traits::ProfileStore;
use crate::types::{SubjectId, SubjectProfile};

/// Profile store backed by a concurrent in-process map.
///
/// `save` replaces the stored profile atomically per subject; `load`
/// returns an owned snapshot.
#[derive(Debug, Default)]
pub struct InMemoryProfileStore {
    profiles: DashMap<SubjectId, SubjectProfile>,
}

impl InMemoryProfileStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored profiles.
    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    /// True when no profile has been saved.
    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

#[async_trait]
impl ProfileStore for InMemoryProfileStore {
    async fn load(&self, subject_id: SubjectId) -> CoreResult<Option<SubjectProfile>> {
        Ok(self.profiles.get(&subject_id).map(|entry| entry.clone()))
    }

    async fn save(&self, subject_id: SubjectId, profile: &SubjectProfile) -> CoreResult<()> {
        self.profiles.insert(subject_id, profile.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    #[tokio::test]
    async fn load_missing_returns_none() {
        let store = InMemoryProfileStore::new();
        assert!(store.load(Uuid::new_v4()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn save_then_load_round_trips() {
        let store = InMemoryProfileStore::new();
        let id = Uuid::new_v4();
        let mut profile = SubjectProfile::new(id, Utc::now());
        profile.message_count = 7;

        store.save(id, &profile).await.unwrap();
        let loaded = store.load(id).await.unwrap().expect("profile saved");
        assert_eq!(loaded.message_count, 7);
        assert_eq!(loaded.subject_id, id);
    }

    #[tokio::test]
    async fn save_replaces_previous_version() {
        let store = InMemoryProfileStore::new();
        let id = Uuid::new_v4();
        let mut profile = SubjectProfile::new(id, Utc::now());

        store.save(id, &profile).await.unwrap();
        profile.message_count = 3;
        store.save(id, &profile).await.unwrap();

        let loaded = store.load(id).await.unwrap().unwrap();
        assert_eq!(loaded.message_count, 3);
        assert_eq!(store.len(), 1);
    }
}
