use crate::error::StoreError;
use crate::models::Activity;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, error};

mod rest;
mod sqlite;
pub use rest::*;
pub use sqlite::*;

/// A named collection of activities keyed by `id`.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// All records, ascending by `time`.
    async fn list(&self) -> Result<Vec<Activity>, StoreError>;
    /// Insert or fully replace the record with this `id`.
    async fn upsert(&self, activity: &Activity) -> Result<(), StoreError>;
    /// Remove the record with this `id`. Missing ids are not an error.
    async fn delete(&self, id: &str) -> Result<(), StoreError>;
}

/// Result of the initial fetch, keeping "empty" and "failed" apart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    Populated(Vec<Activity>),
    Empty,
    Failed,
}

/// Fail-soft front for a [`RecordStore`]: errors are logged and turned into
/// `Failed`/`false` so callers only branch on success.
#[derive(Clone)]
pub struct StoreClient {
    store: Arc<dyn RecordStore>,
}

impl StoreClient {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    pub async fn fetch_activities(&self) -> FetchOutcome {
        match self.store.list().await {
            Ok(records) if records.is_empty() => FetchOutcome::Empty,
            Ok(records) => {
                debug!("Fetched {} activities", records.len());
                FetchOutcome::Populated(records)
            }
            Err(e) => {
                error!("Error fetching activities: {}", e);
                FetchOutcome::Failed
            }
        }
    }

    pub async fn upsert_activity(&self, activity: &Activity) -> bool {
        match self.store.upsert(activity).await {
            Ok(()) => true,
            Err(e) => {
                error!("Error upserting activity {}: {}", activity.id, e);
                false
            }
        }
    }

    pub async fn delete_activity(&self, id: &str) -> bool {
        match self.store.delete(id).await {
            Ok(()) => true,
            Err(e) => {
                error!("Error deleting activity {}: {}", id, e);
                false
            }
        }
    }
}
