use chrono::NaiveDate;

use crate::models::{CandidateMeal, LoggedMeal, MealSlot, SuggestionSet};

/// A suggested meal annotated with whether it was already eaten.
#[derive(Debug, Clone, PartialEq)]
pub struct SuggestionStatus<'a> {
    pub slot: MealSlot,
    pub index: usize,
    pub meal: &'a CandidateMeal,
    pub eaten: bool,
}

/// Summed intake from logged meals.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DailyTotals {
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fats: f64,
}

/// Whether a suggested meal appears among the day's logged meals (case-insensitive name match).
pub fn is_eaten(candidate: &CandidateMeal, logged_today: &[LoggedMeal]) -> bool {
    let key = candidate.key();
    logged_today.iter().any(|m| m.name.to_lowercase() == key)
}

pub fn annotate<'a>(set: &'a SuggestionSet, logged_today: &[LoggedMeal]) -> Vec<SuggestionStatus<'a>> {
    set.iter_slots()
        .flat_map(|(slot, meals)| {
            meals.iter().enumerate().map(move |(index, meal)| (slot, index, meal))
        })
        .map(|(slot, index, meal)| SuggestionStatus {
            slot,
            index,
            meal,
            eaten: is_eaten(meal, logged_today),
        })
        .collect()
}

/// Keep only meals logged on `date`.
pub fn meals_on(logged: &[LoggedMeal], date: NaiveDate) -> Vec<LoggedMeal> {
    logged
        .iter()
        .filter(|m| m.timestamp.date() == date)
        .cloned()
        .collect()
}

pub fn daily_totals(logged_today: &[LoggedMeal]) -> DailyTotals {
    logged_today
        .iter()
        .fold(DailyTotals::default(), |acc, m| DailyTotals {
            calories: acc.calories + m.calories,
            protein: acc.protein + m.protein,
            carbs: acc.carbs + m.carbs,
            fats: acc.fats + m.fats,
        })
}
