use assert_float_eq::*;
use chrono::NaiveDate;

use nutri_planner_rs::models::{Gender, Goal, MealSlot, UserProfile};
use nutri_planner_rs::planner::{
    calculate_bmr, calculate_maintenance, calculate_targets, calorie_band, plan_slot_budgets,
};

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 16).unwrap()
}

fn profile(weight: f64, height: f64, birth_year: i32, gender: Gender, activity: f64, goal: Goal) -> UserProfile {
    UserProfile {
        weight: Some(weight),
        height: Some(height),
        birth_date: NaiveDate::from_ymd_opt(birth_year, 1, 1),
        gender: Some(gender),
        activity_level: Some(activity),
        goal: Some(goal),
        goal_weight: None,
    }
}

#[test]
fn test_scenario_a_moderately_active_male() {
    let bmr = calculate_bmr(70.0, 175.0, 30, Gender::Male);
    assert_float_absolute_eq!(bmr, 1695.667, 1e-6);
    assert_float_absolute_eq!(calculate_maintenance(bmr, 1.55), 2628.28385, 1e-6);

    let targets = calculate_targets(&profile(70.0, 175.0, 1996, Gender::Male, 1.55, Goal::Maintain), today());
    assert_eq!(targets.target_calories, 2628);
    assert_eq!(targets.target_protein, 140);
    assert_eq!(targets.target_fats, 73);
    assert_eq!(targets.target_carbs, 353);
}

#[test]
fn test_goal_shifts_calories_by_500() {
    let maintain = calculate_targets(&profile(70.0, 175.0, 1996, Gender::Male, 1.55, Goal::Maintain), today());
    let lose = calculate_targets(&profile(70.0, 175.0, 1996, Gender::Male, 1.55, Goal::Lose), today());
    let gain = calculate_targets(&profile(70.0, 175.0, 1996, Gender::Male, 1.55, Goal::Gain), today());

    assert_eq!(maintain.target_calories - lose.target_calories, 500);
    assert_eq!(gain.target_calories - maintain.target_calories, 500);
    assert_eq!(lose.target_protein, maintain.target_protein);
}

#[test]
fn test_valid_profiles_give_positive_targets() {
    for gender in [Gender::Male, Gender::Female] {
        for goal in [Goal::Lose, Goal::Maintain, Goal::Gain] {
            for (weight, height, year) in [(50.0, 155.0, 2000), (85.0, 190.0, 1970), (120.0, 180.0, 1985)] {
                let t = calculate_targets(&profile(weight, height, year, gender, 1.375, goal), today());
                assert!(t.target_calories > 0, "{gender:?} {goal:?} {weight}");
                assert!(t.target_protein >= 0);
                assert!(t.target_fats >= 0);
            }
        }
    }
}

#[test]
fn test_carbs_can_go_negative() {
    // Very heavy, sedentary, losing weight: protein and fat budgets exceed calories.
    let targets = calculate_targets(&profile(300.0, 140.0, 1936, Gender::Female, 1.0, Goal::Lose), today());
    assert_eq!(targets.target_calories, 2766);
    assert_eq!(targets.target_protein, 600);
    assert_eq!(targets.target_fats, 77);
    assert_eq!(targets.target_carbs, -82);
}

#[test]
fn test_empty_profile_uses_defaults() {
    let targets = calculate_targets(&UserProfile::default(), today());
    // Female equation, 70 kg, 170 cm, 25 years, activity 1.55.
    assert_eq!(targets.target_calories, 2346);
    assert_eq!(targets.target_protein, 140);
}

#[test]
fn test_bands_are_ordered_for_all_targets() {
    for calories in [0, 1, 7, 999, 1200, 2000, 2628, 3500, 10_000] {
        for (slot, band) in plan_slot_budgets(calories).iter() {
            assert!(band.min <= band.max, "{slot} at {calories}");
        }
    }
}

#[test]
fn test_negative_target_gives_zero_band() {
    let band = calorie_band(-100, MealSlot::Lunch);
    assert_eq!((band.min, band.max), (0, 0));
}

#[test]
fn test_scenario_a_bands() {
    let budgets = plan_slot_budgets(2628);
    assert_eq!(budgets.band(MealSlot::Breakfast).min, 657);
    assert_eq!(budgets.band(MealSlot::Breakfast).max, 920);
    assert_eq!(budgets.band(MealSlot::Lunch).min, 788);
    assert_eq!(budgets.band(MealSlot::Lunch).max, 1051);
    assert_eq!(budgets.band(MealSlot::Snacks).min, 131);
    assert_eq!(budgets.band(MealSlot::Snacks).max, 263);
}
