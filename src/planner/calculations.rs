use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::{Gender, Goal, MealSlot, NutritionTargets, UserProfile};
use crate::planner::constants::*;

/// Calorie range allotted to one meal slot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalorieBand {
    pub min: u32,
    pub max: u32,
}

impl CalorieBand {
    /// Inclusive calorie range a single candidate must fall into to pass filtering.
    pub fn candidate_range(&self) -> (f64, f64) {
        (
            self.min as f64 * FILTER_MIN_RATIO,
            self.max as f64 * FILTER_MAX_RATIO,
        )
    }
}

/// Calorie bands for every slot of a day.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SlotBudgets {
    bands: HashMap<MealSlot, CalorieBand>,
}

impl SlotBudgets {
    pub fn band(&self, slot: MealSlot) -> CalorieBand {
        self.bands.get(&slot).copied().unwrap_or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = (MealSlot, CalorieBand)> + '_ {
        MealSlot::ALL.into_iter().map(|s| (s, self.band(s)))
    }
}

/// Basal metabolic rate (revised Harris-Benedict).
pub fn calculate_bmr(weight_kg: f64, height_cm: f64, age: u32, gender: Gender) -> f64 {
    let age = age as f64;
    match gender {
        Gender::Male => {
            MALE_BMR_BASE + MALE_BMR_WEIGHT * weight_kg + MALE_BMR_HEIGHT * height_cm
                - MALE_BMR_AGE * age
        }
        Gender::Female => {
            FEMALE_BMR_BASE + FEMALE_BMR_WEIGHT * weight_kg + FEMALE_BMR_HEIGHT * height_cm
                - FEMALE_BMR_AGE * age
        }
    }
}

/// Calories needed to hold weight at the given activity multiplier.
pub fn calculate_maintenance(bmr: f64, activity_level: f64) -> f64 {
    bmr * activity_level
}

fn positive_or(value: Option<f64>, default: f64) -> f64 {
    value.filter(|v| v.is_finite() && *v > 0.0).unwrap_or(default)
}

/// Derive daily targets from a profile.
///
/// Never fails: missing biometrics fall back to the `DEFAULT_*` constants and
/// a missing gender uses the female equation. Each output is rounded before
/// it feeds the next one, so carbs are computed from the rounded calorie,
/// protein and fat targets. Carbs are not clamped.
pub fn calculate_targets(profile: &UserProfile, today: NaiveDate) -> NutritionTargets {
    let weight = positive_or(profile.weight, DEFAULT_WEIGHT_KG);
    let height = positive_or(profile.height, DEFAULT_HEIGHT_CM);
    let age = profile.age_on(today).unwrap_or(DEFAULT_AGE);
    let gender = profile.gender.unwrap_or(Gender::Female);
    let activity = positive_or(profile.activity_level, DEFAULT_ACTIVITY_LEVEL);

    let bmr = calculate_bmr(weight, height, age, gender);
    let maintenance = calculate_maintenance(bmr, activity);

    let calories = match profile.goal.unwrap_or_default() {
        Goal::Lose => maintenance - GOAL_CALORIE_DELTA,
        Goal::Gain => maintenance + GOAL_CALORIE_DELTA,
        Goal::Maintain => maintenance,
    };
    let target_calories = calories.round().max(0.0);
    let target_protein = (weight * PROTEIN_G_PER_KG).round();
    let target_fats = (target_calories * FAT_CALORIE_SHARE / KCAL_PER_G_FAT).round();
    let target_carbs = ((target_calories
        - target_protein * KCAL_PER_G_PROTEIN
        - target_fats * KCAL_PER_G_FAT)
        / KCAL_PER_G_CARBS)
        .round();

    NutritionTargets {
        target_calories: target_calories as i32,
        target_protein: target_protein as i32,
        target_carbs: target_carbs as i32,
        target_fats: target_fats as i32,
    }
}

/// Calorie band for one slot. Negative targets are treated as zero.
pub fn calorie_band(target_calories: i32, slot: MealSlot) -> CalorieBand {
    let total = target_calories.max(0) as f64;
    let (min_pct, max_pct) = slot_percentages(slot);
    CalorieBand {
        min: (total * min_pct as f64 / 100.0).round() as u32,
        max: (total * max_pct as f64 / 100.0).round() as u32,
    }
}

/// Partition a daily calorie target across all slots.
pub fn plan_slot_budgets(target_calories: i32) -> SlotBudgets {
    SlotBudgets {
        bands: MealSlot::ALL
            .into_iter()
            .map(|slot| (slot, calorie_band(target_calories, slot)))
            .collect(),
    }
}
