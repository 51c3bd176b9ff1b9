use crate::models::Activity;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, warn};

/// Name of the single slot the mirror occupies in the data directory.
pub const MIRROR_SLOT: &str = "chronicle_activities";

/// Device-local backup of the authoritative list. Best-effort on both ends.
#[async_trait]
pub trait LocalMirror: Send + Sync {
    /// Last persisted list, or empty if nothing usable is stored.
    async fn read(&self) -> Vec<Activity>;
    /// Overwrite the stored list. Failures are logged, never returned.
    async fn write(&self, activities: &[Activity]);
}

pub struct FileMirror {
    path: PathBuf,
}

impl FileMirror {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            path: data_dir.join(format!("{}.json", MIRROR_SLOT)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn try_write(&self, activities: &[Activity]) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await?;
        }
        let json = serde_json::to_string(activities)?;
        // Write beside the slot and rename so a crash never leaves half a file.
        let staging = self.path.with_extension("json.tmp");
        fs::write(&staging, json).await?;
        fs::rename(&staging, &self.path).await
    }
}

#[async_trait]
impl LocalMirror for FileMirror {
    async fn read(&self) -> Vec<Activity> {
        let text = match fs::read_to_string(&self.path).await {
            Ok(text) => text,
            Err(_) => return Vec::new(),
        };

        match serde_json::from_str::<Vec<Activity>>(&text) {
            Ok(activities) => {
                debug!("Read {} activities from local mirror", activities.len());
                activities
            }
            Err(e) => {
                warn!("Ignoring unreadable local mirror {:?}: {}", self.path, e);
                Vec::new()
            }
        }
    }

    async fn write(&self, activities: &[Activity]) {
        if let Err(e) = self.try_write(activities).await {
            warn!("Failed to update local mirror {:?}: {}", self.path, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn activity(id: &str, time: &str) -> Activity {
        Activity {
            id: id.to_string(),
            name: id.to_uppercase(),
            time: time.to_string(),
            description: Some(format!("{id} notes")),
            timestamp: 1000,
        }
    }

    #[tokio::test]
    async fn read_of_missing_slot_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let mirror = FileMirror::new(dir.path());
        assert!(mirror.read().await.is_empty());
    }

    #[tokio::test]
    async fn write_then_read_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let mirror = FileMirror::new(&dir.path().join("nested"));
        let list = vec![activity("a1", "07:30"), activity("b2", "12:00")];

        mirror.write(&list).await;
        assert_eq!(mirror.read().await, list);

        mirror.write(&list[..1]).await;
        assert_eq!(mirror.read().await, list[..1].to_vec());
    }

    #[tokio::test]
    async fn corrupt_slot_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let mirror = FileMirror::new(dir.path());
        std::fs::write(mirror.path(), "{not json").unwrap();
        assert!(mirror.read().await.is_empty());
    }

    #[tokio::test]
    async fn unwritable_slot_is_logged_not_raised() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("occupied");
        std::fs::write(&blocker, "file, not a directory").unwrap();

        let mirror = FileMirror::new(&blocker);
        mirror.write(&[activity("a1", "07:30")]).await;
        assert!(mirror.read().await.is_empty());
    }
}
