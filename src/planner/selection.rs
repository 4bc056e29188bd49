use chrono::NaiveDate;
use rand::seq::SliceRandom;
use rand::Rng;
use tracing::debug;

use crate::models::{BlockedMealRegistry, CandidateMeal, MealSlot, SuggestionSet};
use crate::planner::calculations::{CalorieBand, SlotBudgets};
use crate::planner::constants::{category_allowed, COMBO_FILL_RATIO, MAX_MEALS_PER_SLOT};
use crate::planner::fallback::fallback_for;

/// Result of running the filter/select/fallback chain for one slot.
#[derive(Debug, Clone, PartialEq)]
pub struct SlotSelection {
    pub meals: Vec<CandidateMeal>,
    pub used_fallback: bool,
}

/// Narrow a source sample to candidates that fit a slot.
///
/// A candidate passes iff its category is allowed for the slot, its name is
/// not blocked, and its calories lie in `band.candidate_range()`.
pub fn filter_candidates<'a>(
    candidates: &'a [CandidateMeal],
    slot: MealSlot,
    band: CalorieBand,
    blocked: &BlockedMealRegistry,
) -> Vec<&'a CandidateMeal> {
    let (lo, hi) = band.candidate_range();
    candidates
        .iter()
        .filter(|c| category_allowed(slot, &c.category))
        .filter(|c| !blocked.contains(&c.name))
        .filter(|c| c.calories >= lo && c.calories <= hi)
        .collect()
}

/// Pick up to two candidates whose summed calories stay within `band.max`.
///
/// Candidates are shuffled, then accumulated greedily. Accumulation stops at
/// `MAX_MEALS_PER_SLOT` items or once the total reaches
/// `COMBO_FILL_RATIO * band.max`.
pub fn select_combo<R: Rng + ?Sized>(
    mut filtered: Vec<&CandidateMeal>,
    band: CalorieBand,
    rng: &mut R,
) -> Vec<CandidateMeal> {
    filtered.shuffle(rng);

    let max = band.max as f64;
    let fill_target = max * COMBO_FILL_RATIO;
    let mut total = 0.0;
    let mut selected = Vec::with_capacity(MAX_MEALS_PER_SLOT);

    for candidate in filtered {
        if total + candidate.calories > max {
            continue;
        }
        total += candidate.calories;
        selected.push(candidate.clone());

        if selected.len() >= MAX_MEALS_PER_SLOT || total >= fill_target {
            break;
        }
    }

    selected
}

/// Run filter, combo selection and fallback for a single slot.
pub fn suggest_for_slot<R: Rng + ?Sized>(
    candidates: &[CandidateMeal],
    slot: MealSlot,
    band: CalorieBand,
    blocked: &BlockedMealRegistry,
    rng: &mut R,
) -> SlotSelection {
    let filtered = filter_candidates(candidates, slot, band, blocked);
    let passed = filtered.len();
    let meals = select_combo(filtered, band, rng);

    if !meals.is_empty() {
        debug!(
            slot = %slot,
            sampled = candidates.len(),
            passed,
            selected = meals.len(),
            "Selected candidates"
        );
        for meal in &meals {
            debug!(slot = %slot, meal = %meal.debug_string(), "Selected candidate");
        }
        return SlotSelection {
            meals,
            used_fallback: false,
        };
    }

    debug!(slot = %slot, sampled = candidates.len(), passed, "No candidates fit, using fallback");
    SlotSelection {
        meals: fallback_for(slot, blocked),
        used_fallback: true,
    }
}

/// Build a full day's suggestions from one source sample.
///
/// Returns the set and whether any slot had to use the fallback table.
pub fn build_suggestion_set<R: Rng + ?Sized>(
    date: NaiveDate,
    candidates: &[CandidateMeal],
    budgets: &SlotBudgets,
    blocked: &BlockedMealRegistry,
    rng: &mut R,
) -> (SuggestionSet, bool) {
    let mut set = SuggestionSet::empty(date);
    let mut fallback_used = false;

    for (slot, band) in budgets.iter() {
        let selection = suggest_for_slot(candidates, slot, band, blocked, rng);
        fallback_used |= selection.used_fallback;
        *set.slot_mut(slot) = selection.meals;
    }

    (set, fallback_used)
}
