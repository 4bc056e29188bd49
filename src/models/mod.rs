mod blocked;
mod meal;
mod plan;
mod profile;

pub use blocked::{BlockedMeal, BlockedMealRegistry};
pub use meal::{CandidateMeal, LoggedMeal, MealSlot, RawCandidateMeal, RawMacros};
pub use plan::{DayPlan, SuggestionSet};
pub use profile::{Gender, Goal, NutritionTargets, UserProfile};
