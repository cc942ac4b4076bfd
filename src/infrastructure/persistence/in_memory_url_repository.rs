//! Process-local implementation of the URL repository.

use async_trait::async_trait;
use chrono::Utc;
use serde_json::json;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::domain::entities::{FIRST_IDENTIFIER, NewUrlRecord, UrlRecord};
use crate::domain::repositories::url_repository::CodeForSeed;
use crate::domain::repositories::UrlRepository;
use crate::error::AppError;

#[derive(Debug)]
struct Store {
    by_code: HashMap<String, UrlRecord>,
    /// full URL -> shortcut code
    by_full_url: HashMap<String, String>,
    current_identifier: u64,
}

/// In-memory repository for single-instance deployments and tests.
///
/// All state sits behind one lock, so every operation is atomic with respect
/// to the others. Nothing survives a restart.
#[derive(Debug)]
pub struct InMemoryUrlRepository {
    store: RwLock<Store>,
}

impl InMemoryUrlRepository {
    pub fn new() -> Self {
        Self {
            store: RwLock::new(Store {
                by_code: HashMap::new(),
                by_full_url: HashMap::new(),
                current_identifier: FIRST_IDENTIFIER,
            }),
        }
    }
}

impl Default for InMemoryUrlRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UrlRepository for InMemoryUrlRepository {
    async fn find_by_full_url(
        &self,
        partition_key: &str,
        full_url: &str,
    ) -> Result<Option<UrlRecord>, AppError> {
        let store = self.store.read().await;

        Ok(store
            .by_full_url
            .get(full_url)
            .and_then(|code| store.by_code.get(code))
            .filter(|record| record.partition_key == partition_key)
            .cloned())
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<UrlRecord>, AppError> {
        Ok(self.store.read().await.by_code.get(code).cloned())
    }

    async fn create(&self, new_record: NewUrlRecord) -> Result<UrlRecord, AppError> {
        let mut store = self.store.write().await;

        if store.by_code.contains_key(&new_record.shortcut_code) {
            return Err(AppError::conflict(
                "Unique constraint violation",
                json!({ "constraint": "urls_pkey" }),
            ));
        }
        if store.by_full_url.contains_key(&new_record.full_url) {
            return Err(AppError::conflict(
                "Unique constraint violation",
                json!({ "constraint": "urls_full_url_key" }),
            ));
        }

        let record = new_record.into_record(Utc::now());
        store
            .by_full_url
            .insert(record.full_url.clone(), record.shortcut_code.clone());
        store
            .by_code
            .insert(record.shortcut_code.clone(), record.clone());

        Ok(record)
    }

    async fn increment_redirect_count(&self, code: &str) -> Result<bool, AppError> {
        let mut store = self.store.write().await;

        match store.by_code.get_mut(code) {
            Some(record) => {
                record.redirect_count += 1;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn remove_and_release(&self, code: &str) -> Result<bool, AppError> {
        let mut store = self.store.write().await;

        let Some(record) = store.by_code.remove(code) else {
            return Ok(false);
        };

        store.by_full_url.remove(&record.full_url);
        store.current_identifier = store
            .current_identifier
            .saturating_sub(1)
            .max(FIRST_IDENTIFIER);

        Ok(true)
    }

    async fn create_with_next_identifier<'a>(
        &self,
        partition_key: &str,
        full_url: &str,
        code_for_seed: &'a CodeForSeed<'a>,
    ) -> Result<UrlRecord, AppError> {
        let mut store = self.store.write().await;

        if store.by_full_url.contains_key(full_url) {
            return Err(AppError::conflict(
                "Unique constraint violation",
                json!({ "constraint": "urls_full_url_key" }),
            ));
        }

        let issued = store.current_identifier;
        let shortcut_code = code_for_seed(issued)?;
        let next = issued.checked_add(1).ok_or_else(|| {
            AppError::internal("Sequence counter out of range", json!({ "value": issued }))
        })?;

        if store.by_code.contains_key(&shortcut_code) {
            // Skip the identifier whose code is held by a live record.
            store.current_identifier = next;
            return Err(AppError::conflict(
                "Unique constraint violation",
                json!({ "constraint": "urls_pkey", "seed": issued }),
            ));
        }

        let record = NewUrlRecord {
            shortcut_code,
            partition_key: partition_key.to_string(),
            full_url: full_url.to_string(),
        }
        .into_record(Utc::now());

        store
            .by_full_url
            .insert(record.full_url.clone(), record.shortcut_code.clone());
        store
            .by_code
            .insert(record.shortcut_code.clone(), record.clone());
        store.current_identifier = next;

        Ok(record)
    }

    async fn current_identifier(&self) -> Result<u64, AppError> {
        Ok(self.store.read().await.current_identifier)
    }

    async fn count(&self) -> Result<i64, AppError> {
        Ok(self.store.read().await.by_code.len() as i64)
    }

    async fn total_redirects(&self) -> Result<i64, AppError> {
        Ok(self
            .store
            .read()
            .await
            .by_code
            .values()
            .map(|record| record.redirect_count)
            .sum())
    }

    async fn health_check(&self) -> bool {
        true
    }
}
