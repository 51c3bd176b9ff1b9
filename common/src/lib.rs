// common/src/lib.rs
pub mod config;
pub mod db;
pub mod error;
pub mod llm;
pub mod mirror;
pub mod models;

// Re-export commonly used items
pub use config::*;
pub use db::*;
pub use error::*;
pub use llm::*;
pub use mirror::*;
pub use models::*;
