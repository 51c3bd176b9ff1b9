use crate::error::InsightError;
use crate::llm::InsightGenerator;
use crate::models::{Activity, Insight};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::info;

const MAX_SUGGESTIONS: usize = 3;

/// Content-aware synthesis from a local Ollama model.
pub struct OllamaInsights {
    client: Client,
    model: String,
    base_url: String,
}

#[derive(Serialize, Debug)]
struct GenerateRequest {
    model: String,
    prompt: String,
    stream: bool,
    format: &'static str,
    options: GenerateOptions,
}

#[derive(Serialize, Debug)]
struct GenerateOptions {
    temperature: f32,
    top_p: f32,
    num_predict: i32,
}

#[derive(Deserialize, Debug)]
struct GenerateResponse {
    response: String,
}

#[derive(Deserialize, Debug)]
struct RawInsight {
    summary: String,
    #[serde(default)]
    suggestions: Vec<String>,
}

impl OllamaInsights {
    pub fn new(base_url: &str, model: &str) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(180))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            model: model.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn build_prompt(activities: &[Activity]) -> String {
        let timeline = activities
            .iter()
            .map(|a| match &a.description {
                Some(description) => format!("{} {}: {}", a.time, a.name, description),
                None => format!("{} {}", a.time, a.name),
            })
            .collect::<Vec<_>>()
            .join("\n");

        format!(
            r#"You are reviewing the journal of someone's day. Each line is one logged event, earliest first.

{}

Respond with a JSON object of the form {{"summary": "...", "suggestions": ["...", "...", "..."]}}.
The summary is one or two sentences describing the rhythm of the day.
Give exactly three short, actionable suggestions for the rest of the day."#,
            timeline
        )
    }

    async fn generate(&self, prompt: String) -> Result<String, InsightError> {
        let url = format!("{}/api/generate", self.base_url);

        let request = GenerateRequest {
            model: self.model.clone(),
            prompt,
            stream: false,
            format: "json",
            options: GenerateOptions {
                temperature: 0.7,
                top_p: 0.9,
                num_predict: 512,
            },
        };

        let response = self.client.post(&url).json(&request).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(InsightError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        let generated: GenerateResponse = response.json().await?;
        Ok(generated.response)
    }
}

#[async_trait]
impl InsightGenerator for OllamaInsights {
    async fn analyze(&self, activities: &[Activity]) -> Result<Option<Insight>, InsightError> {
        if activities.is_empty() {
            return Ok(None);
        }

        info!(
            "Generating insight for {} activities with Ollama model {}",
            activities.len(),
            self.model
        );

        let text = self.generate(Self::build_prompt(activities)).await?;
        let raw: RawInsight = serde_json::from_str(text.trim())?;

        let suggestions = raw
            .suggestions
            .into_iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .take(MAX_SUGGESTIONS)
            .collect();

        Ok(Some(Insight {
            summary: raw.summary.trim().to_string(),
            suggestions,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_lists_entries_in_order_with_descriptions() {
        let activities = vec![
            Activity::new("Coffee", "07:30", Some("espresso".into())),
            Activity::new("Run", "08:00", None),
        ];
        let prompt = OllamaInsights::build_prompt(&activities);
        let coffee = prompt.find("07:30 Coffee: espresso").unwrap();
        let run = prompt.find("08:00 Run\n").unwrap();
        assert!(coffee < run);
    }
}
