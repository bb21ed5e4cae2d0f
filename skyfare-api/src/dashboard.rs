use axum::{middleware, routing::get, Extension, Json, Router};
use serde::Serialize;
use skyfare_core::identity::AuthenticatedUser;

use crate::middleware::require_admin;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub message: String,
    pub user: AuthenticatedUser,
}

/// Placeholder figures until reporting queries exist.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_users: u64,
    pub total_bookings: u64,
    pub revenue_this_month: u64,
    pub active_flights: u64,
}

pub fn routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(dashboard))
        .route("/dashboard/stats", get(stats))
        .route_layer(middleware::from_fn_with_state(state, require_admin))
}

async fn dashboard(Extension(caller): Extension<AuthenticatedUser>) -> Json<DashboardResponse> {
    Json(DashboardResponse {
        message: "Welcome to the admin dashboard".to_string(),
        user: caller,
    })
}

async fn stats() -> Json<DashboardStats> {
    Json(DashboardStats {
        total_users: 120,
        total_bookings: 450,
        revenue_this_month: 25000,
        active_flights: 35,
    })
}
