use crate::error::ConfigError;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_TABLE: &str = "activities";
pub const DEFAULT_SQLITE_URL: &str = "sqlite:./data/chronicle.db";
pub const DEFAULT_DATA_DIR: &str = "./data";
pub const DEFAULT_OLLAMA_HOST: &str = "http://localhost:11434";
pub const DEFAULT_OLLAMA_MODEL: &str = "llama3.2:3b";
pub const DEFAULT_INSIGHT_LATENCY_MS: u64 = 1800;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreBackend {
    Rest {
        url: Option<String>,
        api_key: Option<String>,
    },
    Sqlite {
        url: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsightBackend {
    Canned { latency: Duration },
    Ollama { host: String, model: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChronicleConfig {
    pub store: StoreBackend,
    pub table: String,
    pub data_dir: PathBuf,
    pub insights: InsightBackend,
}

impl ChronicleConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Blank values count as unset.
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let store = match get("CHRONICLE_STORE").as_deref().unwrap_or("rest") {
            "rest" => StoreBackend::Rest {
                url: get("SUPABASE_URL"),
                api_key: get("SUPABASE_ANON_KEY"),
            },
            "sqlite" => StoreBackend::Sqlite {
                url: get("CHRONICLE_SQLITE_URL").unwrap_or_else(|| DEFAULT_SQLITE_URL.to_string()),
            },
            other => return Err(ConfigError::UnknownStore(other.to_string())),
        };

        let insights = match get("INSIGHT_BACKEND").as_deref().unwrap_or("canned") {
            "canned" => {
                let latency_ms = match get("INSIGHT_LATENCY_MS") {
                    Some(value) => value.trim().parse::<u64>().map_err(|_| ConfigError::NotANumber {
                        name: "INSIGHT_LATENCY_MS",
                        value,
                    })?,
                    None => DEFAULT_INSIGHT_LATENCY_MS,
                };
                InsightBackend::Canned {
                    latency: Duration::from_millis(latency_ms),
                }
            }
            "ollama" => InsightBackend::Ollama {
                host: get("OLLAMA_HOST").unwrap_or_else(|| DEFAULT_OLLAMA_HOST.to_string()),
                model: get("OLLAMA_MODEL").unwrap_or_else(|| DEFAULT_OLLAMA_MODEL.to_string()),
            },
            other => return Err(ConfigError::UnknownInsightBackend(other.to_string())),
        };

        Ok(Self {
            store,
            table: get("CHRONICLE_TABLE").unwrap_or_else(|| DEFAULT_TABLE.to_string()),
            data_dir: PathBuf::from(get("CHRONICLE_DATA_DIR").unwrap_or_else(|| DEFAULT_DATA_DIR.to_string())),
            insights,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(pairs: &[(&str, &str)]) -> Result<ChronicleConfig, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ChronicleConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn defaults_to_unconfigured_rest_store_and_canned_insights() {
        let cfg = config(&[]).unwrap();
        assert_eq!(cfg.store, StoreBackend::Rest { url: None, api_key: None });
        assert_eq!(cfg.table, "activities");
        assert_eq!(cfg.data_dir, PathBuf::from("./data"));
        assert_eq!(
            cfg.insights,
            InsightBackend::Canned { latency: Duration::from_millis(1800) }
        );
    }

    #[test]
    fn reads_sqlite_and_ollama_settings() {
        let cfg = config(&[
            ("CHRONICLE_STORE", "sqlite"),
            ("CHRONICLE_SQLITE_URL", "sqlite::memory:"),
            ("INSIGHT_BACKEND", "ollama"),
            ("OLLAMA_MODEL", "mistral"),
        ])
        .unwrap();
        assert_eq!(cfg.store, StoreBackend::Sqlite { url: "sqlite::memory:".into() });
        assert_eq!(
            cfg.insights,
            InsightBackend::Ollama {
                host: DEFAULT_OLLAMA_HOST.into(),
                model: "mistral".into()
            }
        );
    }

    #[test]
    fn blank_credentials_count_as_unset() {
        let cfg = config(&[("SUPABASE_URL", "https://x.supabase.co"), ("SUPABASE_ANON_KEY", " ")]).unwrap();
        assert_eq!(
            cfg.store,
            StoreBackend::Rest { url: Some("https://x.supabase.co".into()), api_key: None }
        );
    }

    #[test]
    fn rejects_unknown_backends_and_bad_numbers() {
        assert_eq!(
            config(&[("CHRONICLE_STORE", "mongo")]).unwrap_err(),
            ConfigError::UnknownStore("mongo".into())
        );
        assert!(matches!(
            config(&[("INSIGHT_LATENCY_MS", "soon")]).unwrap_err(),
            ConfigError::NotANumber { name: "INSIGHT_LATENCY_MS", .. }
        ));
    }
}
