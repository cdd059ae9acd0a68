//! Remote meal-planning API.
//!
//! [`ApiClient`] carries the transport rules (bearer token from the session
//! gate, JSON in and out, non-2xx as [`ApiError::Status`]). The typed
//! endpoint helpers in `endpoints` sit on top of it.

mod client;
mod endpoints;
mod types;

pub use client::{ApiClient, ApiError};
pub use types::{
    DayMeals, GroceryListResponse, MealPlan, Preferences, Recipe, SavePreferencesResponse, SavedPlan, WEEKDAYS,
    filter_saved_plans,
};
