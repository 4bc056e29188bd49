use chrono::{NaiveDate, NaiveDateTime};
use dialoguer::{Confirm, Input, Select};
use strsim::jaro_winkler;

use crate::error::{NutriError, Result};
use crate::models::{CandidateMeal, Gender, Goal, LoggedMeal, MealSlot, UserProfile};

const MATCH_THRESHOLD: f64 = 0.7;

/// Prompt for an optional number, keeping `current` when the input is left empty.
fn prompt_optional_f64(prompt: &str, current: Option<f64>) -> Result<Option<f64>> {
    let input: String = Input::new()
        .with_prompt(prompt)
        .default(current.map(|v| v.to_string()).unwrap_or_default())
        .allow_empty(true)
        .interact_text()?;

    let input = input.trim();
    if input.is_empty() {
        return Ok(None);
    }
    let value: f64 = input
        .parse()
        .map_err(|_| NutriError::InvalidInput("Invalid number".to_string()))?;
    if value <= 0.0 {
        return Err(NutriError::InvalidInput(format!("{} must be positive", prompt)));
    }
    Ok(Some(value))
}

fn prompt_f64(prompt: &str, default: f64) -> Result<f64> {
    let input: String = Input::new()
        .with_prompt(prompt)
        .default(default.to_string())
        .interact_text()?;

    input
        .trim()
        .parse()
        .map_err(|_| NutriError::InvalidInput("Invalid number".to_string()))
}

fn prompt_birth_date(current: Option<NaiveDate>) -> Result<Option<NaiveDate>> {
    let input: String = Input::new()
        .with_prompt("Birth date (YYYY-MM-DD)")
        .default(current.map(|d| d.to_string()).unwrap_or_default())
        .allow_empty(true)
        .interact_text()?;

    let input = input.trim();
    if input.is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .map(Some)
        .map_err(|_| NutriError::InvalidInput(format!("Invalid date: {}", input)))
}

fn prompt_gender(current: Option<Gender>) -> Result<Option<Gender>> {
    let options = ["Male", "Female", "Prefer not to say"];
    let default = match current {
        Some(Gender::Male) => 0,
        Some(Gender::Female) => 1,
        None => 2,
    };

    let selection = Select::new()
        .with_prompt("Gender")
        .items(&options)
        .default(default)
        .interact()?;

    Ok(match selection {
        0 => Some(Gender::Male),
        1 => Some(Gender::Female),
        _ => None,
    })
}

fn prompt_goal(current: Option<Goal>) -> Result<Goal> {
    let options = ["Lose weight", "Maintain weight", "Gain weight"];
    let default = match current.unwrap_or_default() {
        Goal::Lose => 0,
        Goal::Maintain => 1,
        Goal::Gain => 2,
    };

    let selection = Select::new()
        .with_prompt("Goal")
        .items(&options)
        .default(default)
        .interact()?;

    Ok(match selection {
        0 => Goal::Lose,
        2 => Goal::Gain,
        _ => Goal::Maintain,
    })
}

fn prompt_activity(current: Option<f64>) -> Result<f64> {
    let levels = [
        (1.2, "Sedentary"),
        (1.375, "Lightly active"),
        (1.55, "Moderately active"),
        (1.725, "Very active"),
        (1.9, "Extra active"),
    ];
    let options: Vec<String> = levels
        .iter()
        .map(|(factor, label)| format!("{} ({})", label, factor))
        .collect();
    let current = current.unwrap_or(1.55);
    let default = levels
        .iter()
        .position(|(factor, _)| (factor - current).abs() < 1e-9)
        .unwrap_or(2);

    let selection = Select::new()
        .with_prompt("Activity level")
        .items(&options)
        .default(default)
        .interact()?;

    Ok(levels[selection].0)
}

/// Walk through every profile field, starting from the stored values.
pub fn prompt_profile(current: &UserProfile) -> Result<UserProfile> {
    Ok(UserProfile {
        weight: prompt_optional_f64("Weight (kg)", current.weight)?,
        height: prompt_optional_f64("Height (cm)", current.height)?,
        birth_date: prompt_birth_date(current.birth_date)?,
        gender: prompt_gender(current.gender)?,
        activity_level: Some(prompt_activity(current.activity_level)?),
        goal: Some(prompt_goal(current.goal)?),
        goal_weight: prompt_optional_f64("Goal weight (kg)", current.goal_weight)?,
    })
}

/// Suggestions whose name is close to `input`, best first.
pub fn fuzzy_matches<'a>(input: &str, suggestions: &[&'a CandidateMeal]) -> Vec<(&'a CandidateMeal, f64)> {
    let input = input.trim().to_lowercase();
    let mut candidates: Vec<(&CandidateMeal, f64)> = suggestions
        .iter()
        .map(|m| (*m, jaro_winkler(&m.key(), &input)))
        .filter(|(_, score)| *score > MATCH_THRESHOLD)
        .collect();

    candidates.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    candidates
}

fn prompt_slot() -> Result<MealSlot> {
    let options: Vec<&str> = MealSlot::ALL.iter().map(|s| s.as_str()).collect();
    let selection = Select::new()
        .with_prompt("Which meal was it?")
        .items(&options)
        .default(0)
        .interact()?;
    Ok(MealSlot::ALL[selection])
}

/// Resolve typed input to one of today's suggestions, asking the user when unsure.
fn pick_suggestion<'a>(input: &str, suggestions: &[&'a CandidateMeal]) -> Result<Option<&'a CandidateMeal>> {
    if let Some(exact) = suggestions.iter().find(|m| m.key() == input.to_lowercase()) {
        return Ok(Some(*exact));
    }

    let candidates = fuzzy_matches(input, suggestions);
    match candidates.as_slice() {
        [] => Ok(None),
        [(meal, _)] => {
            let confirm = Confirm::new()
                .with_prompt(format!("Did you mean '{}'?", meal.name))
                .default(true)
                .interact()?;
            Ok(confirm.then_some(*meal))
        }
        _ => {
            let options: Vec<String> = candidates.iter().take(5).map(|(m, _)| m.name.clone()).collect();
            let mut selection_options = options.clone();
            selection_options.push("None of these".to_string());

            let selection = Select::new()
                .with_prompt("Which did you mean?")
                .items(&selection_options)
                .default(0)
                .interact()?;

            Ok(candidates.get(selection).filter(|_| selection < options.len()).map(|(m, _)| *m))
        }
    }
}

/// Ask what was eaten. Names close to a suggestion reuse its nutrition values.
pub fn prompt_logged_meal(
    suggestions: &[&CandidateMeal],
    slot: Option<MealSlot>,
    now: NaiveDateTime,
) -> Result<LoggedMeal> {
    let input: String = Input::new().with_prompt("What did you eat?").interact_text()?;
    let input = input.trim();
    if input.is_empty() {
        return Err(NutriError::InvalidInput("Meal name must not be empty".to_string()));
    }

    let slot = match slot {
        Some(slot) => slot,
        None => prompt_slot()?,
    };

    if let Some(meal) = pick_suggestion(input, suggestions)? {
        return Ok(LoggedMeal {
            name: meal.name.clone(),
            calories: meal.calories,
            protein: meal.protein,
            carbs: meal.carbs,
            fats: meal.fats,
            timestamp: now,
            slot: Some(slot),
        });
    }

    Ok(LoggedMeal {
        name: input.to_string(),
        calories: prompt_f64("Calories (kcal)", 0.0)?,
        protein: prompt_f64("Protein (g)", 0.0)?,
        carbs: prompt_f64("Carbs (g)", 0.0)?,
        fats: prompt_f64("Fats (g)", 0.0)?,
        timestamp: now,
        slot: Some(slot),
    })
}

/// Prompt for yes/no confirmation.
pub fn prompt_yes_no(prompt: &str, default: bool) -> Result<bool> {
    Ok(Confirm::new()
        .with_prompt(prompt)
        .default(default)
        .interact()?)
}
