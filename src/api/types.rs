//! Request and response bodies of the meal-planning API.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Display order of a weekly plan.
pub const WEEKDAYS: [&str; 7] = ["Monday", "Tuesday", "Wednesday", "Thursday", "Friday", "Saturday", "Sunday"];

// =============================================================================
// RECIPES & GROCERIES
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipe {
    pub title: String,
    #[serde(rename = "fullrecipe")]
    pub full_recipe: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroceryListResponse {
    /// Items as `"<quantity> <item>"`.
    #[serde(rename = "groceryList")]
    pub grocery_list: Vec<String>,
}

// =============================================================================
// MEAL PLANS
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayMeals {
    #[serde(default)]
    pub breakfast: String,
    #[serde(default)]
    pub lunch: String,
    #[serde(default)]
    pub dinner: String,
}

impl DayMeals {
    fn mentions(&self, needle: &str) -> bool {
        [&self.breakfast, &self.lunch, &self.dinner]
            .into_iter()
            .any(|meal| meal.to_lowercase().contains(needle))
    }
}

/// Weekday name to that day's meals, as the generator returns it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MealPlan(BTreeMap<String, DayMeals>);

impl MealPlan {
    #[must_use]
    pub fn day(&self, name: &str) -> Option<&DayMeals> {
        self.0.get(name)
    }

    pub fn insert(&mut self, day: impl Into<String>, meals: DayMeals) {
        self.0.insert(day.into(), meals);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Days Monday through Sunday, then any other keys alphabetically.
    #[must_use]
    pub fn days(&self) -> Vec<(&str, &DayMeals)> {
        let mut ordered: Vec<(&str, &DayMeals)> = WEEKDAYS
            .iter()
            .filter_map(|day| self.0.get_key_value(*day).map(|(k, v)| (k.as_str(), v)))
            .collect();
        ordered.extend(
            self.0
                .iter()
                .filter(|(k, _)| !WEEKDAYS.contains(&k.as_str()))
                .map(|(k, v)| (k.as_str(), v)),
        );
        ordered
    }

    fn mentions(&self, needle: &str) -> bool {
        self.0
            .iter()
            .any(|(day, meals)| day.to_lowercase().contains(needle) || meals.mentions(needle))
    }
}

/// A generated plan as stored server-side. The list endpoint returns these
/// newest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedPlan {
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub week_id: String,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub plan: MealPlan,
}

impl SavedPlan {
    /// Case-insensitive match against day names and meals. A blank query
    /// matches everything.
    #[must_use]
    pub fn matches(&self, query: &str) -> bool {
        let needle = query.trim().to_lowercase();
        needle.is_empty() || self.plan.mentions(&needle)
    }
}

/// Plans matching `query`, paired with their 1-based position in the list.
/// The position label (`"plan #2"`) matches too.
#[must_use]
pub fn filter_saved_plans<'a>(plans: &'a [SavedPlan], query: &str) -> Vec<(usize, &'a SavedPlan)> {
    let needle = query.trim().to_lowercase();
    plans
        .iter()
        .enumerate()
        .map(|(i, plan)| (i + 1, plan))
        .filter(|(n, plan)| format!("plan #{n}").contains(&needle) || plan.matches(&needle))
        .collect()
}

// =============================================================================
// PREFERENCES
// =============================================================================

/// Free-text dietary preferences fed to the meal-plan generator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preferences {
    #[serde(default)]
    pub cuisine: String,
    #[serde(default)]
    pub allergies: String,
    #[serde(default)]
    pub dislikes: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavePreferencesResponse {
    pub message: String,
    #[serde(default)]
    pub data: Option<Preferences>,
}

#[cfg(test)]
#[path = "types_test.rs"]
mod tests;
