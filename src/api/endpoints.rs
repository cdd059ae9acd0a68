//! Typed helpers for each remote endpoint.
//!
//! The server multiplexes by body: `POST /mealplan` with any non-empty body
//! generates a plan and with `{}` lists saved plans; `POST /preferences`
//! with `{}` fetches and with fields saves.

use serde_json::{Value, json};

use super::client::{ApiClient, ApiError};
use super::types::{GroceryListResponse, MealPlan, Preferences, Recipe, SavePreferencesResponse, SavedPlan};

impl ApiClient {
    /// `GET /search?query=...`
    ///
    /// # Errors
    ///
    /// [`ApiError::InvalidRequest`] for a blank query, otherwise as [`ApiClient::get`].
    pub async fn search_recipes(&self, query: &str) -> Result<Vec<Recipe>, ApiError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(ApiError::InvalidRequest("Enter something to search for."));
        }
        self.get(&format!("/search?query={}", urlencoding::encode(query))).await
    }

    /// `POST /grocery {recipe}`; items come back as `"<quantity> <item>"`.
    ///
    /// # Errors
    ///
    /// [`ApiError::InvalidRequest`] for a blank recipe name, otherwise as [`ApiClient::post`].
    pub async fn generate_grocery_list(&self, recipe: &str) -> Result<Vec<String>, ApiError> {
        let recipe = recipe.trim();
        if recipe.is_empty() {
            return Err(ApiError::InvalidRequest("Please enter a recipe name."));
        }
        let response: GroceryListResponse = self.post("/grocery", &json!({ "recipe": recipe })).await?;
        Ok(response.grocery_list)
    }

    /// Generate and store a new weekly plan from the saved preferences.
    ///
    /// # Errors
    ///
    /// As [`ApiClient::post`].
    pub async fn generate_meal_plan(&self) -> Result<MealPlan, ApiError> {
        self.post("/mealplan", &json!({ "dummy": true })).await
    }

    /// Saved plans, newest first.
    ///
    /// # Errors
    ///
    /// As [`ApiClient::post`].
    pub async fn list_meal_plans(&self) -> Result<Vec<SavedPlan>, ApiError> {
        let body: Value = self.post("/mealplan", &json!({})).await?;
        saved_plans_from(body)
    }

    /// `None` when the user has never saved preferences.
    ///
    /// # Errors
    ///
    /// As [`ApiClient::post`], except that 404 is not an error.
    pub async fn get_preferences(&self) -> Result<Option<Preferences>, ApiError> {
        match self.post("/preferences", &json!({})).await {
            Ok(prefs) => Ok(Some(prefs)),
            Err(ApiError::Status { status: 404, .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// # Errors
    ///
    /// As [`ApiClient::post`].
    pub async fn save_preferences(&self, prefs: &Preferences) -> Result<SavePreferencesResponse, ApiError> {
        let response: SavePreferencesResponse = self.post("/preferences", prefs).await?;
        tracing::info!(message = %response.message, "preferences saved");
        Ok(response)
    }
}

/// Normally an array. A lone stored item (an object with `plan`) becomes a
/// one-element list; any other shape is empty.
fn saved_plans_from(body: Value) -> Result<Vec<SavedPlan>, ApiError> {
    let decode = |e: serde_json::Error| ApiError::Decode(e.to_string());
    if body.is_array() {
        return serde_json::from_value(body).map_err(decode);
    }
    if body.as_object().is_some_and(|map| map.contains_key("plan")) {
        return Ok(vec![serde_json::from_value(body).map_err(decode)?]);
    }
    Ok(Vec::new())
}

#[cfg(test)]
#[path = "endpoints_test.rs"]
mod tests;
