use crate::db::RecordStore;
use crate::error::StoreError;
use crate::models::Activity;
use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Row, Sqlite};
use std::path::Path;
use std::str::FromStr;
use tracing::info;

/// Self-hosted record store backed by a SQLite table.
#[derive(Clone)]
pub struct SqliteStore {
    pool: Pool<Sqlite>,
    table: String,
}

impl SqliteStore {
    /// Connect using a `sqlite:` URL. The database file is created if missing.
    pub async fn connect(connection_string: &str, table: &str) -> Result<Self, StoreError> {
        if connection_string.contains(":memory:") {
            let options = SqliteConnectOptions::from_str(connection_string)?;
            return Self::connect_with(options, true, table).await;
        }
        let path = connection_string
            .trim_start_matches("sqlite:")
            .trim_start_matches("//")
            .split('?')
            .next()
            .unwrap_or_default();
        Self::open(Path::new(path), table).await
    }

    /// Open (or create) the database file at `path`.
    pub async fn open(path: &Path, table: &str) -> Result<Self, StoreError> {
        ensure_parent_dir(path)?;
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);
        Self::connect_with(options, false, table).await
    }

    async fn connect_with(
        options: SqliteConnectOptions,
        in_memory: bool,
        table: &str,
    ) -> Result<Self, StoreError> {
        // An in-memory database lives per connection, so pin the pool to one.
        let pool = SqlitePoolOptions::new()
            .max_connections(if in_memory { 1 } else { 5 })
            .connect_with(options)
            .await?;

        info!("Connected to SQLite store (table {})", table);
        Self::with_pool(pool, table).await
    }

    async fn with_pool(pool: Pool<Sqlite>, table: &str) -> Result<Self, StoreError> {
        let store = Self {
            pool,
            table: sanitize_table(table),
        };
        store.ensure_schema().await?;
        Ok(store)
    }

    async fn ensure_schema(&self) -> Result<(), StoreError> {
        sqlx::query(&format!(
            r#"
            CREATE TABLE IF NOT EXISTS {table} (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                time TEXT NOT NULL,
                description TEXT,
                timestamp INTEGER NOT NULL
            )
            "#,
            table = self.table
        ))
        .execute(&self.pool)
        .await?;

        sqlx::query(&format!(
            "CREATE INDEX IF NOT EXISTS idx_{table}_time ON {table} (time)",
            table = self.table
        ))
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

fn ensure_parent_dir(path: &Path) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            info!("Creating parent directory: {:?}", parent);
            std::fs::create_dir_all(parent).map_err(sqlx::Error::Io)?;
        }
    }
    Ok(())
}

// Table names cannot be bound as parameters; keep them to identifier characters.
fn sanitize_table(table: &str) -> String {
    let cleaned: String = table
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect();
    if cleaned.is_empty() {
        "activities".to_string()
    } else {
        cleaned
    }
}

#[async_trait]
impl RecordStore for SqliteStore {
    async fn list(&self) -> Result<Vec<Activity>, StoreError> {
        let rows = sqlx::query(&format!(
            "SELECT id, name, time, description, timestamp FROM {} ORDER BY time ASC",
            self.table
        ))
        .fetch_all(&self.pool)
        .await?;

        let mut activities = Vec::with_capacity(rows.len());
        for row in rows {
            activities.push(Activity {
                id: row.try_get("id")?,
                name: row.try_get("name")?,
                time: row.try_get("time")?,
                description: row.try_get("description")?,
                timestamp: row.try_get("timestamp")?,
            });
        }

        Ok(activities)
    }

    async fn upsert(&self, activity: &Activity) -> Result<(), StoreError> {
        sqlx::query(&format!(
            r#"
            INSERT INTO {} (id, name, time, description, timestamp)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                time = excluded.time,
                description = excluded.description,
                timestamp = excluded.timestamp
            "#,
            self.table
        ))
        .bind(&activity.id)
        .bind(&activity.name)
        .bind(&activity.time)
        .bind(&activity.description)
        .bind(activity.timestamp)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        sqlx::query(&format!("DELETE FROM {} WHERE id = ?", self.table))
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
