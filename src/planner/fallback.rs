use std::collections::HashMap;
use std::sync::LazyLock;

use crate::models::{BlockedMealRegistry, CandidateMeal, MealSlot};

fn meal(name: &str, calories: f64, protein: f64, carbs: f64, fats: f64, category: &str) -> CandidateMeal {
    CandidateMeal {
        name: name.to_string(),
        calories,
        protein,
        carbs,
        fats,
        category: category.to_string(),
        image: None,
        instructions: None,
        ingredients: Vec::new(),
    }
}

/// Curated meals served when the source yields nothing usable for a slot.
pub static FALLBACK_MEALS: LazyLock<HashMap<MealSlot, Vec<CandidateMeal>>> = LazyLock::new(|| {
    let mut m = HashMap::new();
    m.insert(
        MealSlot::Breakfast,
        vec![
            meal("Oatmeal with berries", 320.0, 10.0, 55.0, 6.0, "light dishes"),
            meal("Greek yogurt with granola", 280.0, 15.0, 35.0, 8.0, "light dishes"),
        ],
    );
    m.insert(
        MealSlot::Lunch,
        vec![
            meal("Chicken and rice bowl", 520.0, 38.0, 60.0, 12.0, "main dishes"),
            meal("Lentil soup", 380.0, 20.0, 52.0, 8.0, "soups"),
        ],
    );
    m.insert(
        MealSlot::Dinner,
        vec![
            meal("Baked salmon with vegetables", 480.0, 34.0, 20.0, 26.0, "main dishes"),
            meal("Turkey stir-fry", 450.0, 35.0, 40.0, 14.0, "main dishes"),
        ],
    );
    m.insert(
        MealSlot::Snacks,
        vec![
            meal("Apple with peanut butter", 190.0, 4.0, 25.0, 8.0, "snacks"),
            meal("Cottage cheese with honey", 160.0, 14.0, 15.0, 4.0, "snacks"),
        ],
    );
    m
});

/// The static fallback entries for a slot, in table order.
pub fn fallback_meals(slot: MealSlot) -> Vec<CandidateMeal> {
    FALLBACK_MEALS.get(&slot).cloned().unwrap_or_default()
}

/// Fallback entries for a slot minus anything the user blocked.
pub fn fallback_for(slot: MealSlot, blocked: &BlockedMealRegistry) -> Vec<CandidateMeal> {
    fallback_meals(slot)
        .into_iter()
        .filter(|m| !blocked.contains(&m.name))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_two_entries_per_slot() {
        for slot in MealSlot::ALL {
            assert_eq!(fallback_meals(slot).len(), 2, "{slot}");
        }
    }

    #[test]
    fn test_blocked_fallback_is_removed() {
        let blocked = BlockedMealRegistry::new(["lentil soup"]);
        let lunch = fallback_for(MealSlot::Lunch, &blocked);
        assert_eq!(lunch.len(), 1);
        assert_eq!(lunch[0].name, "Chicken and rice bowl");
    }
}
