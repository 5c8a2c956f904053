//! Shared, swappable knowledge base.
//!
//! Holds the current index snapshot behind a lock. Readers clone an `Arc` and
//! never block a reload for longer than the pointer swap; a reload builds the
//! new index off-lock.

use crate::index::KnowledgeIndex;
use crate::types::{HealthStatus, KnowledgeEntry, KnowledgeStats};
use autofill_core::{AppError, AppResult};
use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock};

struct Loaded {
    index: Arc<KnowledgeIndex>,
    fingerprint: String,
    loaded_at: DateTime<Utc>,
}

/// The loaded knowledge index plus load metadata.
#[derive(Default)]
pub struct KnowledgeBase {
    current: RwLock<Option<Loaded>>,
}

impl KnowledgeBase {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an index from `entries` and make it current.
    ///
    /// Requests already holding a snapshot keep using the previous index.
    pub fn install(
        &self,
        entries: Vec<KnowledgeEntry>,
        abbreviations: BTreeMap<String, String>,
    ) -> Arc<KnowledgeIndex> {
        let fingerprint = fingerprint(&entries);
        let index = Arc::new(KnowledgeIndex::build(entries, abbreviations));

        let loaded = Loaded {
            index: Arc::clone(&index),
            fingerprint,
            loaded_at: Utc::now(),
        };

        tracing::info!(
            "Knowledge base loaded: {} entries, fingerprint {}",
            index.len(),
            &loaded.fingerprint[..12]
        );

        *self.current.write().unwrap_or_else(PoisonError::into_inner) = Some(loaded);
        index
    }

    /// Current index snapshot.
    ///
    /// # Errors
    /// `AppError::IndexUnavailable` if no knowledge base was ever loaded.
    pub fn snapshot(&self) -> AppResult<Arc<KnowledgeIndex>> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|loaded| Arc::clone(&loaded.index))
            .ok_or_else(|| {
                AppError::IndexUnavailable("knowledge base has not been loaded".to_string())
            })
    }

    pub fn status(&self) -> HealthStatus {
        let guard = self.current.read().unwrap_or_else(PoisonError::into_inner);
        match guard.as_ref() {
            None => HealthStatus {
                status: "unavailable".to_string(),
                knowledge_base_entries: 0,
            },
            Some(loaded) if loaded.index.is_empty() => HealthStatus {
                status: "empty".to_string(),
                knowledge_base_entries: 0,
            },
            Some(loaded) => HealthStatus {
                status: "healthy".to_string(),
                knowledge_base_entries: loaded.index.len(),
            },
        }
    }

    pub fn stats(&self) -> AppResult<KnowledgeStats> {
        let guard = self.current.read().unwrap_or_else(PoisonError::into_inner);
        let loaded = guard.as_ref().ok_or_else(|| {
            AppError::IndexUnavailable("knowledge base has not been loaded".to_string())
        })?;

        Ok(KnowledgeStats {
            total_entries: loaded.index.len(),
            documents: loaded.index.document_counts(),
            sections_count: loaded.index.sections_count(),
            vocabulary_size: loaded.index.vocabulary_size(),
            fingerprint: loaded.fingerprint.clone(),
            loaded_at: loaded.loaded_at,
        })
    }
}

/// SHA-256 over entry content, in load order.
fn fingerprint(entries: &[KnowledgeEntry]) -> String {
    let mut hasher = Sha256::new();
    for entry in entries {
        for field in [
            entry.source_document.as_str(),
            entry.section.as_str(),
            entry.question_text.as_str(),
            entry.answer_text.as_str(),
        ] {
            hasher.update(field.as_bytes());
            hasher.update([0u8]);
        }
        hasher.update(entry.row_index.to_le_bytes());
    }
    format!("{:x}", hasher.finalize())
}
