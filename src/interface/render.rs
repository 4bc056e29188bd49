use crate::models::{DayPlan, LoggedMeal, NutritionTargets};
use crate::planner::{annotate, daily_totals, SlotBudgets};

/// Display daily targets and the per-slot calorie bands.
pub fn display_targets(targets: &NutritionTargets, budgets: &SlotBudgets) {
    println!();
    println!("=== Daily Targets ===");
    println!();
    println!("Calories: {:>5} kcal", targets.target_calories);
    println!("Protein:  {:>5} g", targets.target_protein);
    println!("Carbs:    {:>5} g", targets.target_carbs);
    println!("Fats:     {:>5} g", targets.target_fats);

    println!();
    println!("--- Slot budgets ---");
    for (slot, band) in budgets.iter() {
        println!("{:<10} {:>4} - {:>4} kcal", slot.as_str(), band.min, band.max);
    }
    println!();
}

/// Non-blocking notice for plans that used the standard suggestions.
pub fn fallback_notice(plan: &DayPlan) -> Option<&'static str> {
    if plan.source_unavailable {
        Some("Recipe service unavailable, showing standard suggestions.")
    } else if plan.fallback_used {
        Some("No recipes fit some meals, showing standard suggestions for them.")
    } else {
        None
    }
}

/// Display a day's suggestions, marking meals already logged today.
pub fn display_plan(plan: &DayPlan, logged_today: &[LoggedMeal]) {
    let set = &plan.suggestions;

    if let Some(notice) = fallback_notice(plan) {
        println!("{}", notice);
    }

    println!();
    println!("=== Meal Plan for {} ===", set.date);

    if set.is_empty() {
        println!("No suggestions for this day.");
        println!();
        return;
    }

    let rows = annotate(set, logged_today);
    let max_name_len = rows.iter().map(|r| r.meal.name.chars().count()).max().unwrap_or(10);

    let mut current_slot = None;
    for row in &rows {
        if current_slot != Some(row.slot) {
            println!();
            println!("[{}]", row.slot);
            current_slot = Some(row.slot);
        }

        let eaten = if row.eaten { "  (eaten)" } else { "" };
        println!(
            "{:>3}. {:<width$} - {:>4.0} kcal | P {:.0} C {:.0} F {:.0}{}",
            row.index,
            row.meal.name,
            row.meal.calories,
            row.meal.protein,
            row.meal.carbs,
            row.meal.fats,
            eaten,
            width = max_name_len
        );
    }

    let totals = daily_totals(logged_today);
    println!();
    println!("--- Summary ---");
    println!("Suggested calories: {:.0}", set.total_calories());
    println!("Logged today: {:.0} kcal ({} meals)", totals.calories, logged_today.len());
    if plan.from_cache {
        println!("(saved plan)");
    }
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SuggestionSet;
    use chrono::NaiveDate;

    fn plan(fallback_used: bool, source_unavailable: bool) -> DayPlan {
        DayPlan {
            suggestions: SuggestionSet::empty(NaiveDate::from_ymd_opt(2026, 10, 16).unwrap()),
            fallback_used,
            source_unavailable,
            from_cache: false,
        }
    }

    #[test]
    fn test_fallback_notice_distinguishes_outage() {
        assert_eq!(fallback_notice(&plan(false, false)), None);
        assert!(fallback_notice(&plan(true, true)).unwrap().contains("unavailable"));

        let notice = fallback_notice(&plan(true, false)).unwrap();
        assert!(!notice.contains("unavailable"));
    }
}
