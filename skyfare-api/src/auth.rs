use axum::{
    extract::{rejection::JsonRejection, State},
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use skyfare_core::identity::{AuthenticatedUser, CreateUser, Role, User};

use crate::{error::AppError, middleware::auth::issue_token, state::AppState};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DevTokenRequest {
    email: String,
    #[serde(default)]
    first_name: Option<String>,
    #[serde(default)]
    last_name: Option<String>,
}

#[derive(Debug, Serialize)]
struct AuthResponse {
    token: String,
    user: User,
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/auth/token", post(issue_dev_token))
}

/// Development login: provisions the profile and signs a token for it.
/// New profiles are always plain users; admins are promoted by an admin.
async fn issue_dev_token(
    State(state): State<AppState>,
    body: Result<Json<DevTokenRequest>, JsonRejection>,
) -> Result<Json<AuthResponse>, AppError> {
    if !state.auth.allow_dev_tokens {
        return Err(AppError::NotFoundError("Not found".to_string()));
    }
    let Json(req) = body?;

    let local_part = req.email.split('@').next().unwrap_or_default().to_string();
    let user = state
        .users
        .ensure(CreateUser {
            email: req.email.clone(),
            first_name: req.first_name.unwrap_or(local_part),
            last_name: req.last_name.unwrap_or_else(|| "Dev".to_string()),
            role: Some(Role::User),
        })
        .await?;

    let identity = AuthenticatedUser { id: user.id.clone(), email: user.email.clone(), role: user.role };
    let token = issue_token(&state.auth, &identity)?;
    tracing::warn!(user_id = %user.id, "Issued development token");

    Ok(Json(AuthResponse { token, user }))
}
