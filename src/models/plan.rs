use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::{CandidateMeal, MealSlot};

/// The day's suggested meals, one list per slot.
///
/// Serialized shape matches the persisted document:
/// `{date, breakfast[], lunch[], dinner[], snacks[]}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuggestionSet {
    pub date: NaiveDate,
    #[serde(default)]
    pub breakfast: Vec<CandidateMeal>,
    #[serde(default)]
    pub lunch: Vec<CandidateMeal>,
    #[serde(default)]
    pub dinner: Vec<CandidateMeal>,
    #[serde(default)]
    pub snacks: Vec<CandidateMeal>,
}

impl SuggestionSet {
    pub fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            breakfast: Vec::new(),
            lunch: Vec::new(),
            dinner: Vec::new(),
            snacks: Vec::new(),
        }
    }

    pub fn slot(&self, slot: MealSlot) -> &[CandidateMeal] {
        match slot {
            MealSlot::Breakfast => &self.breakfast,
            MealSlot::Lunch => &self.lunch,
            MealSlot::Dinner => &self.dinner,
            MealSlot::Snacks => &self.snacks,
        }
    }

    pub fn slot_mut(&mut self, slot: MealSlot) -> &mut Vec<CandidateMeal> {
        match slot {
            MealSlot::Breakfast => &mut self.breakfast,
            MealSlot::Lunch => &mut self.lunch,
            MealSlot::Dinner => &mut self.dinner,
            MealSlot::Snacks => &mut self.snacks,
        }
    }

    /// Iterate `(slot, meals)` in display order.
    pub fn iter_slots(&self) -> impl Iterator<Item = (MealSlot, &[CandidateMeal])> {
        MealSlot::ALL.into_iter().map(move |s| (s, self.slot(s)))
    }

    /// Total suggested calories across all slots.
    pub fn total_calories(&self) -> f64 {
        self.iter_slots()
            .flat_map(|(_, meals)| meals.iter())
            .map(|m| m.calories)
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.iter_slots().all(|(_, meals)| meals.is_empty())
    }
}

/// A resolved day plan plus how it was obtained.
#[derive(Debug, Clone, PartialEq)]
pub struct DayPlan {
    pub suggestions: SuggestionSet,
    /// At least one slot was filled from the static fallback table.
    pub fallback_used: bool,
    /// The recipe source failed or returned nothing for this generation.
    pub source_unavailable: bool,
    /// Served from the durable or local store rather than freshly generated.
    pub from_cache: bool,
}
