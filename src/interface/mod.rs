pub mod prompts;
pub mod render;

pub use prompts::{fuzzy_matches, prompt_logged_meal, prompt_profile, prompt_yes_no};
pub use render::{display_plan, display_targets, fallback_notice};
