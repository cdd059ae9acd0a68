use serde_json::json;

use super::*;

fn plan_from(value: serde_json::Value) -> MealPlan {
    serde_json::from_value(value).unwrap()
}

fn meals(breakfast: &str, lunch: &str, dinner: &str) -> DayMeals {
    DayMeals { breakfast: breakfast.into(), lunch: lunch.into(), dinner: dinner.into() }
}

#[test]
fn recipe_uses_wire_field_name() {
    let recipe: Recipe = serde_json::from_value(json!({ "title": "Dal", "fullrecipe": "Simmer lentils." })).unwrap();
    assert_eq!(recipe.full_recipe, "Simmer lentils.");
}

#[test]
fn grocery_list_requires_the_list() {
    assert!(serde_json::from_value::<GroceryListResponse>(json!({ "error": "nope" })).is_err());
    let ok: GroceryListResponse = serde_json::from_value(json!({ "groceryList": ["2 tomatoes"] })).unwrap();
    assert_eq!(ok.grocery_list, vec!["2 tomatoes"]);
}

#[test]
fn meal_plan_days_follow_the_week() {
    let plan = plan_from(json!({
        "Sunday": { "breakfast": "pancakes", "lunch": "salad", "dinner": "roast" },
        "Monday": { "breakfast": "oats", "lunch": "soup", "dinner": "curry" },
        "Wednesday": { "breakfast": "eggs", "lunch": "wrap", "dinner": "pasta" },
    }));
    let order: Vec<&str> = plan.days().into_iter().map(|(day, _)| day).collect();
    assert_eq!(order, ["Monday", "Wednesday", "Sunday"]);
}

#[test]
fn meal_plan_keeps_unexpected_keys_last() {
    let mut plan = MealPlan::default();
    plan.insert("Extra", meals("a", "b", "c"));
    plan.insert("Friday", meals("d", "e", "f"));
    let order: Vec<&str> = plan.days().into_iter().map(|(day, _)| day).collect();
    assert_eq!(order, ["Friday", "Extra"]);
    assert_eq!(plan.len(), 2);
}

#[test]
fn missing_meals_default_to_empty() {
    let plan = plan_from(json!({ "Monday": { "dinner": "tacos" } }));
    assert_eq!(plan.day("Monday"), Some(&meals("", "", "tacos")));
}

#[test]
fn saved_plan_matches_meals_case_insensitively() {
    let saved: SavedPlan = serde_json::from_value(json!({
        "userId": "u1",
        "weekId": "2025-01-06T10:00:00",
        "createdAt": "2025-01-06T10:00:00",
        "plan": { "Monday": { "breakfast": "Greek Yogurt", "lunch": "falafel", "dinner": "Moussaka" } },
    }))
    .unwrap();
    assert!(saved.matches("yogurt"));
    assert!(saved.matches("  MOUSSAKA "));
    assert!(saved.matches("monday"));
    assert!(saved.matches(""));
    assert!(!saved.matches("sushi"));
}

#[test]
fn filter_saved_plans_matches_position_label() {
    let mut first = MealPlan::default();
    first.insert("Monday", meals("oats", "soup", "curry"));
    let mut second = MealPlan::default();
    second.insert("Monday", meals("toast", "salad", "ramen"));
    let plans = vec![
        SavedPlan { user_id: "u".into(), week_id: "w1".into(), created_at: "c1".into(), plan: first },
        SavedPlan { user_id: "u".into(), week_id: "w2".into(), created_at: "c2".into(), plan: second },
    ];

    let by_meal: Vec<usize> = filter_saved_plans(&plans, "Ramen").into_iter().map(|(n, _)| n).collect();
    assert_eq!(by_meal, [2]);

    let by_label: Vec<usize> = filter_saved_plans(&plans, "Plan #1").into_iter().map(|(n, _)| n).collect();
    assert_eq!(by_label, [1]);

    assert_eq!(filter_saved_plans(&plans, "").len(), 2);
}

#[test]
fn preferences_ignore_server_fields() {
    let prefs: Preferences =
        serde_json::from_value(json!({ "userId": "u1", "cuisine": "Thai", "allergies": "peanuts" })).unwrap();
    assert_eq!(
        prefs,
        Preferences { cuisine: "Thai".into(), allergies: "peanuts".into(), dislikes: String::new() }
    );
}
