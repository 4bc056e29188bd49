use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// Entry of the user's blocked-meal collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockedMeal {
    pub name: String,
}

/// Names the user has rejected. Matching is case-insensitive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlockedMealRegistry {
    names: HashSet<String>,
}

impl BlockedMealRegistry {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            names: names
                .into_iter()
                .map(|n| n.as_ref().trim().to_lowercase())
                .filter(|n| !n.is_empty())
                .collect(),
        }
    }

    pub fn from_entries(entries: &[BlockedMeal]) -> Self {
        Self::new(entries.iter().map(|e| e.name.as_str()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(&name.trim().to_lowercase())
    }

    /// Copy of this registry with one more name blocked.
    pub fn with_extra(&self, name: &str) -> Self {
        let mut names = self.names.clone();
        let key = name.trim().to_lowercase();
        if !key.is_empty() {
            names.insert(key);
        }
        Self { names }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_case_insensitive() {
        let registry = BlockedMealRegistry::new(["Омлет", "Pancakes "]);
        assert!(registry.contains("омлет"));
        assert!(registry.contains("ОМЛЕТ"));
        assert!(registry.contains("pancakes"));
        assert!(!registry.contains("Waffles"));
    }

    #[test]
    fn test_with_extra_leaves_original_untouched() {
        let registry = BlockedMealRegistry::new(["Soup"]);
        let extended = registry.with_extra("Salad");
        assert!(extended.contains("salad"));
        assert!(!registry.contains("salad"));
        assert_eq!(extended.len(), 2);
    }
}
