pub mod cli;
pub mod config;
pub mod error;
pub mod interface;
pub mod logging;
pub mod models;
pub mod planner;
pub mod source;
pub mod state;

pub use error::{NutriError, Result};
pub use models::{CandidateMeal, MealSlot, SuggestionSet};
pub use state::SuggestionEngine;
