use thiserror::Error;

use crate::models::MealSlot;

#[derive(Debug, Error)]
pub enum NutriError {
    #[error("Suggestion source unavailable: {0}")]
    SourceUnavailable(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Persistence read failed: {0}")]
    PersistenceRead(String),

    #[error("Persistence write failed: {0}")]
    PersistenceWrite(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Prompt error: {0}")]
    Prompt(#[from] dialoguer::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Regeneration already in progress for {slot} #{index}")]
    RegenerationInFlight { slot: MealSlot, index: usize },

    #[error("No {slot} entry can be placed at index {index}")]
    SlotIndexOutOfRange { slot: MealSlot, index: usize },
}

pub type Result<T> = std::result::Result<T, NutriError>;
