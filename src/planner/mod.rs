pub mod calculations;
pub mod constants;
pub mod fallback;
pub mod selection;
pub mod status;

pub use calculations::{
    calculate_bmr, calculate_maintenance, calculate_targets, calorie_band, plan_slot_budgets,
    CalorieBand, SlotBudgets,
};
pub use constants::*;
pub use fallback::{fallback_for, fallback_meals};
pub use selection::{
    build_suggestion_set, filter_candidates, select_combo, suggest_for_slot, SlotSelection,
};
pub use status::{annotate, daily_totals, is_eaten, meals_on, DailyTotals, SuggestionStatus};
