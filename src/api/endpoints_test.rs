use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Value, json};

use super::*;
use crate::api::{DayMeals, WEEKDAYS};
use crate::auth::{MemoryStore, SessionGate};
use crate::test_helpers::{MockProvider, fresh_session, spawn_server};

// =============================================================================
// Stub meal-planning API
// =============================================================================

#[derive(Clone, Default)]
struct Backend {
    preferences: Arc<Mutex<Option<Value>>>,
}

fn signed_in(headers: &HeaderMap) -> bool {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("Bearer "))
}

fn unauthorized() -> Response {
    (StatusCode::UNAUTHORIZED, "Unauthorized").into_response()
}

async fn search(headers: HeaderMap, Query(params): Query<HashMap<String, String>>) -> Response {
    if !signed_in(&headers) {
        return unauthorized();
    }
    let query = params.get("query").cloned().unwrap_or_default();
    Json(json!([{ "title": query, "fullrecipe": "Cook it." }])).into_response()
}

async fn grocery(headers: HeaderMap, Json(body): Json<Value>) -> Response {
    if !signed_in(&headers) {
        return unauthorized();
    }
    let recipe = body["recipe"].as_str().unwrap_or_default();
    Json(json!({ "groceryList": [format!("1 {recipe}"), "2 tomatoes"] })).into_response()
}

fn week() -> Value {
    let mut plan = serde_json::Map::new();
    for day in WEEKDAYS.iter().rev() {
        plan.insert((*day).to_owned(), json!({ "breakfast": "oats", "lunch": "soup", "dinner": format!("{day} curry") }));
    }
    Value::Object(plan)
}

async fn mealplan(headers: HeaderMap, Json(body): Json<Value>) -> Response {
    if !signed_in(&headers) {
        return unauthorized();
    }
    if body.as_object().is_some_and(|b| !b.is_empty()) {
        return Json(week()).into_response();
    }
    Json(json!([
        { "userId": "u1", "weekId": "w2", "createdAt": "2025-02-01T00:00:00", "plan": week() },
        { "userId": "u1", "weekId": "w1", "createdAt": "2025-01-01T00:00:00", "plan": {} },
    ]))
    .into_response()
}

async fn preferences(State(backend): State<Backend>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    if !signed_in(&headers) {
        return unauthorized();
    }
    let mut stored = backend.preferences.lock().unwrap();
    if body.as_object().is_some_and(serde_json::Map::is_empty) {
        return match stored.as_ref() {
            Some(item) => Json(item.clone()).into_response(),
            None => (StatusCode::NOT_FOUND, Json(json!({ "message": "No preferences found" }))).into_response(),
        };
    }
    let mut item = body.clone();
    item["userId"] = json!("u1");
    *stored = Some(item);
    Json(json!({ "message": "Preferences saved", "data": body })).into_response()
}

async fn client(signed_in: bool) -> ApiClient {
    let router = Router::new()
        .route("/search", get(search))
        .route("/grocery", post(grocery))
        .route("/mealplan", post(mealplan))
        .route("/preferences", post(preferences))
        .with_state(Backend::default());
    let base = spawn_server(router).await;

    let gate = SessionGate::new(Arc::new(MockProvider::default()), Arc::new(MemoryStore::new()));
    if signed_in {
        gate.set_user(Some(fresh_session("cook@example.com")));
    } else {
        gate.set_user(None);
    }
    ApiClient::with_http(reqwest::Client::new(), &base, gate)
}

// =============================================================================
// search / grocery
// =============================================================================

#[tokio::test]
async fn search_encodes_the_query() {
    let client = client(true).await;
    let recipes = client.search_recipes("  mac & cheese?  ").await.unwrap();
    assert_eq!(recipes.len(), 1);
    assert_eq!(recipes[0].title, "mac & cheese?");
    assert_eq!(recipes[0].full_recipe, "Cook it.");
}

#[tokio::test]
async fn blank_search_is_rejected_locally() {
    let client = ApiClient::with_http(
        reqwest::Client::new(),
        "http://127.0.0.1:1",
        SessionGate::new(Arc::new(MockProvider::default()), Arc::new(MemoryStore::new())),
    );
    assert!(matches!(client.search_recipes("   ").await, Err(ApiError::InvalidRequest(_))));
    assert!(matches!(client.generate_grocery_list("").await, Err(ApiError::InvalidRequest(_))));
}

#[tokio::test]
async fn grocery_list_for_recipe() {
    let client = client(true).await;
    let items = client.generate_grocery_list("lasagna").await.unwrap();
    assert_eq!(items, ["1 lasagna", "2 tomatoes"]);
}

#[tokio::test]
async fn signed_out_calls_surface_server_rejection() {
    let client = client(false).await;
    let err = client.generate_grocery_list("lasagna").await.unwrap_err();
    assert_eq!(err.status(), Some(401));
    assert!(err.to_string().contains("Unauthorized"));
}

// =============================================================================
// meal plans
// =============================================================================

#[tokio::test]
async fn generated_plan_reads_monday_first() {
    let client = client(true).await;
    let plan = client.generate_meal_plan().await.unwrap();
    let days: Vec<&str> = plan.days().into_iter().map(|(day, _)| day).collect();
    assert_eq!(days, WEEKDAYS);
    assert_eq!(
        plan.day("Friday"),
        Some(&DayMeals { breakfast: "oats".into(), lunch: "soup".into(), dinner: "Friday curry".into() })
    );
}

#[tokio::test]
async fn saved_plans_are_listed() {
    let client = client(true).await;
    let plans = client.list_meal_plans().await.unwrap();
    assert_eq!(plans.len(), 2);
    assert_eq!(plans[0].week_id, "w2");
    assert!(plans[0].matches("friday curry"));
    assert!(plans[1].plan.is_empty());
}

#[test]
fn saved_plans_accept_single_item_or_nothing() {
    let single = saved_plans_from(json!({ "weekId": "w1", "plan": { "Monday": { "dinner": "stew" } } })).unwrap();
    assert_eq!(single.len(), 1);
    assert_eq!(single[0].week_id, "w1");

    assert!(saved_plans_from(json!({ "message": "nothing here" })).unwrap().is_empty());
    assert!(saved_plans_from(Value::Null).unwrap().is_empty());
}

// =============================================================================
// preferences
// =============================================================================

#[tokio::test]
async fn preferences_not_found_then_saved() {
    let client = client(true).await;
    assert_eq!(client.get_preferences().await.unwrap(), None);

    let prefs = Preferences { cuisine: "Italian".into(), allergies: "shellfish".into(), dislikes: "olives".into() };
    let saved = client.save_preferences(&prefs).await.unwrap();
    assert_eq!(saved.message, "Preferences saved");
    assert_eq!(saved.data.as_ref(), Some(&prefs));

    assert_eq!(client.get_preferences().await.unwrap(), Some(prefs));
}

#[tokio::test]
async fn preferences_other_failures_propagate() {
    let client = client(false).await;
    assert_eq!(client.get_preferences().await.unwrap_err().status(), Some(401));
}
