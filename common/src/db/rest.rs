use crate::db::RecordStore;
use crate::error::StoreError;
use crate::models::Activity;
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use std::time::Duration;
use tracing::debug;

/// Hosted table store reached through its PostgREST endpoint
/// (`{base_url}/rest/v1/{table}`).
pub struct RestStore {
    client: Client,
    base_url: Option<String>,
    api_key: Option<String>,
    table: String,
}

impl RestStore {
    /// Never fails: a store without URL or key answers every call with
    /// [`StoreError::NotConfigured`].
    pub fn new(base_url: Option<String>, api_key: Option<String>, table: &str) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            base_url: base_url.map(|url| url.trim_end_matches('/').to_string()),
            api_key,
            table: table.to_string(),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.base_url.is_some() && self.api_key.is_some()
    }

    fn endpoint(&self) -> Result<(String, &str), StoreError> {
        let base_url = self
            .base_url
            .as_deref()
            .ok_or(StoreError::NotConfigured("SUPABASE_URL is unset"))?;
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(StoreError::NotConfigured("SUPABASE_ANON_KEY is unset"))?;
        Ok((format!("{}/rest/v1/{}", base_url, self.table), api_key))
    }

    fn authorize(request: RequestBuilder, api_key: &str) -> RequestBuilder {
        request.header("apikey", api_key).bearer_auth(api_key)
    }

    async fn check(response: Response) -> Result<Response, StoreError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(StoreError::Rejected {
            status: status.as_u16(),
            body,
        })
    }
}

#[async_trait]
impl RecordStore for RestStore {
    async fn list(&self) -> Result<Vec<Activity>, StoreError> {
        let (url, api_key) = self.endpoint()?;
        debug!("GET {}", url);

        let response = Self::authorize(self.client.get(&url), api_key)
            .query(&[("select", "*"), ("order", "time.asc")])
            .send()
            .await?;

        let activities = Self::check(response).await?.json::<Vec<Activity>>().await?;
        Ok(activities)
    }

    async fn upsert(&self, activity: &Activity) -> Result<(), StoreError> {
        let (url, api_key) = self.endpoint()?;
        debug!("POST {} (upsert {})", url, activity.id);

        let response = Self::authorize(self.client.post(&url), api_key)
            .header("Prefer", "resolution=merge-duplicates,return=minimal")
            .json(&[activity])
            .send()
            .await?;

        Self::check(response).await?;
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        let (url, api_key) = self.endpoint()?;
        debug!("DELETE {} (id {})", url, id);

        let response = Self::authorize(self.client.delete(&url), api_key)
            .query(&[("id", format!("eq.{}", id))])
            .send()
            .await?;

        Self::check(response).await?;
        Ok(())
    }
}
