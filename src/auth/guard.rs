//! Route table and the unauthenticated-redirect guard.
//!
//! SYSTEM CONTEXT
//! ==============
//! Every guarded view applies the same rule: show a neutral pending state
//! while auth is loading, then render for a signed-in user or redirect to
//! the sign-in entry point. The decision is a pure function of the auth
//! state and the current route, so re-evaluating it is always safe.

use super::gate::AuthState;

/// Application routes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Route {
    SignIn,
    SignUp,
    Dashboard,
    Preferences,
    Search,
    MealPlan,
    Grocery,
    SavedPlans,
}

/// Where unauthenticated users land.
pub const ENTRY_POINT: Route = Route::SignIn;

/// Where a successful sign-in lands.
pub const HOME: Route = Route::Dashboard;

impl Route {
    pub const ALL: [Route; 8] = [
        Route::SignIn,
        Route::SignUp,
        Route::Dashboard,
        Route::Preferences,
        Route::Search,
        Route::MealPlan,
        Route::Grocery,
        Route::SavedPlans,
    ];

    #[must_use]
    pub fn path(self) -> &'static str {
        match self {
            Route::SignIn => "/",
            Route::SignUp => "/signup",
            Route::Dashboard => "/dashboard",
            Route::Preferences => "/preferences",
            Route::Search => "/search",
            Route::MealPlan => "/mealplan",
            Route::Grocery => "/grocery",
            Route::SavedPlans => "/saved",
        }
    }

    /// Match a request path, ignoring a trailing slash and query string.
    #[must_use]
    pub fn from_path(path: &str) -> Option<Route> {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let trimmed = path.trim_end_matches('/');
        let normalized = if trimmed.is_empty() { "/" } else { trimmed };
        Self::ALL.into_iter().find(|route| route.path() == normalized)
    }

    #[must_use]
    pub fn is_guarded(self) -> bool {
        !matches!(self, Route::SignIn | Route::SignUp)
    }
}

/// What a view should do for the current auth state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GuardDecision {
    /// Auth still loading: render a neutral placeholder.
    Pending,
    Render,
    Redirect(Route),
}

/// `true` once auth has loaded and no user is present.
#[must_use]
pub fn should_redirect_unauth(state: &AuthState) -> bool {
    !state.loading && state.user.is_none()
}

/// Decide how `current` should render. Unguarded routes, including the
/// entry point itself, always render, so redirects cannot loop.
#[must_use]
pub fn guard(state: &AuthState, current: Route) -> GuardDecision {
    if !current.is_guarded() {
        return GuardDecision::Render;
    }
    if state.loading {
        return GuardDecision::Pending;
    }
    if should_redirect_unauth(state) {
        return GuardDecision::Redirect(ENTRY_POINT);
    }
    GuardDecision::Render
}

#[cfg(test)]
#[path = "guard_test.rs"]
mod tests;
