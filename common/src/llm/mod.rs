use crate::error::InsightError;
use crate::models::{Activity, Insight};
use async_trait::async_trait;

mod canned;
mod ollama;
pub use canned::CannedInsights;
pub use ollama::OllamaInsights;

/// Produces a day synthesis for the current timeline.
#[async_trait]
pub trait InsightGenerator: Send + Sync {
    /// `Ok(None)` when there is nothing to synthesize.
    async fn analyze(&self, activities: &[Activity]) -> Result<Option<Insight>, InsightError>;
}
