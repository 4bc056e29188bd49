use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One of the four daily eating occasions.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
    clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum MealSlot {
    Breakfast,
    Lunch,
    Dinner,
    #[value(alias = "snack")]
    Snacks,
}

impl MealSlot {
    /// All slots in display order.
    pub const ALL: [MealSlot; 4] = [
        MealSlot::Breakfast,
        MealSlot::Lunch,
        MealSlot::Dinner,
        MealSlot::Snacks,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MealSlot::Breakfast => "breakfast",
            MealSlot::Lunch => "lunch",
            MealSlot::Dinner => "dinner",
            MealSlot::Snacks => "snacks",
        }
    }
}

impl fmt::Display for MealSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MealSlot {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "breakfast" => Ok(MealSlot::Breakfast),
            "lunch" => Ok(MealSlot::Lunch),
            "dinner" => Ok(MealSlot::Dinner),
            "snacks" | "snack" => Ok(MealSlot::Snacks),
            other => Err(format!("unknown meal slot: {}", other)),
        }
    }
}

/// A recipe-like record considered for suggestion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateMeal {
    pub name: String,
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fats: f64,
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ingredients: Vec<String>,
}

impl CandidateMeal {
    /// Canonical key for name comparisons (lowercase name).
    pub fn key(&self) -> String {
        self.name.to_lowercase()
    }

    /// Debug string for logging.
    pub fn debug_string(&self) -> String {
        format!(
            "{} [{}]: {} kcal, P:{} C:{} F:{}",
            self.name, self.category, self.calories, self.protein, self.carbs, self.fats
        )
    }
}

/// Candidate meal exactly as the recipe source delivers it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawCandidateMeal {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub calories: Option<Value>,
    #[serde(default)]
    pub kcal: Option<Value>,
    #[serde(default)]
    pub macros: Option<RawMacros>,
    #[serde(default)]
    pub protein: Option<Value>,
    #[serde(default)]
    pub carbs: Option<Value>,
    #[serde(default)]
    pub fats: Option<Value>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub instructions: Option<Value>,
    #[serde(default)]
    pub ingredients: Option<Value>,
}

/// Macro block nested under `macros` in source payloads.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawMacros {
    #[serde(default)]
    pub protein: Option<Value>,
    #[serde(default)]
    pub carbs: Option<Value>,
    #[serde(default)]
    pub fat: Option<Value>,
}

impl RawCandidateMeal {
    /// Normalize a source payload into a `CandidateMeal`.
    ///
    /// This is the only place where field aliasing and numeric coercion happen.
    /// Returns `None` when the payload carries no usable name.
    pub fn normalize(self) -> Option<CandidateMeal> {
        let name = self.name.map(|n| n.trim().to_string()).filter(|n| !n.is_empty())?;
        let macros = self.macros.unwrap_or_default();

        Some(CandidateMeal {
            name,
            calories: first_nonzero(&[self.calories.as_ref(), self.kcal.as_ref()]),
            protein: first_nonzero(&[macros.protein.as_ref(), self.protein.as_ref()]),
            carbs: first_nonzero(&[macros.carbs.as_ref(), self.carbs.as_ref()]),
            fats: first_nonzero(&[macros.fat.as_ref(), self.fats.as_ref()]),
            category: self
                .category
                .map(|c| c.trim().to_string())
                .unwrap_or_default(),
            image: self
                .image
                .filter(|s| !s.is_empty())
                .or(self.thumbnail.filter(|s| !s.is_empty())),
            instructions: self.instructions.as_ref().and_then(text_value),
            ingredients: self
                .ingredients
                .as_ref()
                .map(ingredient_list)
                .unwrap_or_default(),
        })
    }
}

/// Coerce a JSON number or numeric string into a non-negative finite `f64`.
fn coerce_number(value: &Value) -> f64 {
    let parsed = match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => s.trim().parse::<f64>().unwrap_or(0.0),
        _ => 0.0,
    };
    if parsed.is_finite() && parsed > 0.0 {
        parsed
    } else {
        0.0
    }
}

/// First alias that coerces to a non-zero number, else 0.
fn first_nonzero(aliases: &[Option<&Value>]) -> f64 {
    aliases
        .iter()
        .flatten()
        .map(|v| coerce_number(v))
        .find(|&n| n > 0.0)
        .unwrap_or(0.0)
}

fn text_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Array(items) => {
            let steps: Vec<String> = items.iter().filter_map(text_value).collect();
            if steps.is_empty() {
                None
            } else {
                Some(steps.join("\n"))
            }
        }
        _ => None,
    }
}

fn ingredient_list(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items
            .iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s.trim().to_string()),
                Value::Object(obj) => obj
                    .get("name")
                    .and_then(Value::as_str)
                    .map(|s| s.trim().to_string()),
                _ => None,
            })
            .filter(|s| !s.is_empty())
            .collect(),
        Value::String(s) => s
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}

/// A meal the user has logged as eaten.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggedMeal {
    pub name: String,
    #[serde(default)]
    pub calories: f64,
    #[serde(default)]
    pub protein: f64,
    #[serde(default)]
    pub carbs: f64,
    #[serde(default)]
    pub fats: f64,
    pub timestamp: NaiveDateTime,
    #[serde(default)]
    pub slot: Option<MealSlot>,
}
