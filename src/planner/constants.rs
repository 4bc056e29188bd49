use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

use crate::models::MealSlot;

// ─────────────────────────────────────────────────────────────────────────────
// Revised Harris-Benedict coefficients
// ─────────────────────────────────────────────────────────────────────────────

pub const MALE_BMR_BASE: f64 = 88.362;
pub const MALE_BMR_WEIGHT: f64 = 13.397;
pub const MALE_BMR_HEIGHT: f64 = 4.799;
pub const MALE_BMR_AGE: f64 = 5.677;

pub const FEMALE_BMR_BASE: f64 = 447.593;
pub const FEMALE_BMR_WEIGHT: f64 = 9.247;
pub const FEMALE_BMR_HEIGHT: f64 = 3.098;
pub const FEMALE_BMR_AGE: f64 = 4.330;

// ─────────────────────────────────────────────────────────────────────────────
// Profile defaults (used when a field is missing)
// ─────────────────────────────────────────────────────────────────────────────

pub const DEFAULT_AGE: u32 = 25;
pub const DEFAULT_ACTIVITY_LEVEL: f64 = 1.55;
pub const DEFAULT_WEIGHT_KG: f64 = 70.0;
pub const DEFAULT_HEIGHT_CM: f64 = 170.0;

// ─────────────────────────────────────────────────────────────────────────────
// Target derivation
// ─────────────────────────────────────────────────────────────────────────────

/// Daily calorie shift applied for lose/gain goals.
pub const GOAL_CALORIE_DELTA: f64 = 500.0;

/// Protein grams per kilogram of body weight.
pub const PROTEIN_G_PER_KG: f64 = 2.0;

/// Share of target calories allocated to fat.
pub const FAT_CALORIE_SHARE: f64 = 0.25;

pub const KCAL_PER_G_PROTEIN: f64 = 4.0;
pub const KCAL_PER_G_CARBS: f64 = 4.0;
pub const KCAL_PER_G_FAT: f64 = 9.0;

// ─────────────────────────────────────────────────────────────────────────────
// Candidate filtering and combo selection
// ─────────────────────────────────────────────────────────────────────────────

/// Lower calorie bound for a single candidate, as a fraction of band.min.
pub const FILTER_MIN_RATIO: f64 = 0.4;

/// Upper calorie bound for a single candidate, as a fraction of band.max.
/// Undershoots the band so two items can be combined.
pub const FILTER_MAX_RATIO: f64 = 0.7;

/// Combo accumulation stops once this fraction of band.max is reached.
pub const COMBO_FILL_RATIO: f64 = 0.8;

/// Maximum meals suggested per slot.
pub const MAX_MEALS_PER_SLOT: usize = 2;

/// Default number of candidates requested from the source per fetch.
pub const DEFAULT_SAMPLE_SIZE: usize = 50;

/// Share of daily calories per slot as (min%, max%).
pub static SLOT_PERCENTAGES: LazyLock<HashMap<MealSlot, (u32, u32)>> = LazyLock::new(|| {
    let mut m = HashMap::new();
    m.insert(MealSlot::Breakfast, (25, 35));
    m.insert(MealSlot::Lunch, (30, 40));
    m.insert(MealSlot::Dinner, (30, 40));
    m.insert(MealSlot::Snacks, (5, 10));
    m
});

/// Source categories accepted for each slot (lowercase).
pub static SLOT_CATEGORIES: LazyLock<HashMap<MealSlot, HashSet<&'static str>>> =
    LazyLock::new(|| {
        let main_course: HashSet<&'static str> =
            ["main dishes", "soups", "salads", "vegetarian"].into_iter().collect();

        let mut m = HashMap::new();
        m.insert(
            MealSlot::Breakfast,
            ["pastries", "light dishes", "appetizers"].into_iter().collect(),
        );
        m.insert(MealSlot::Lunch, main_course.clone());
        m.insert(MealSlot::Dinner, main_course);
        m.insert(
            MealSlot::Snacks,
            ["desserts", "sweets", "snacks"].into_iter().collect(),
        );
        m
    });

/// Get the (min%, max%) share for a slot.
pub fn slot_percentages(slot: MealSlot) -> (u32, u32) {
    *SLOT_PERCENTAGES.get(&slot).unwrap_or(&(0, 0))
}

/// Whether a source category is allowed for a slot (case-insensitive).
pub fn category_allowed(slot: MealSlot, category: &str) -> bool {
    SLOT_CATEGORIES
        .get(&slot)
        .map(|set| set.contains(category.trim().to_lowercase().as_str()))
        .unwrap_or(false)
}
