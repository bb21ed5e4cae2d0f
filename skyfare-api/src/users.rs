use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    middleware,
    routing::get,
    Extension, Json, Router,
};
use skyfare_core::identity::{AuthenticatedUser, CreateUser, UpdateUser, User};

use crate::error::AppError;
use crate::middleware::require_auth;
use crate::state::AppState;

pub fn routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/users/me", get(current_user))
        .route("/users", get(list_users).post(create_user))
        .route("/users/{id}", get(get_user).put(update_user).delete(delete_user))
        .route_layer(middleware::from_fn_with_state(state, require_auth))
}

async fn current_user(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthenticatedUser>,
) -> Result<Json<User>, AppError> {
    Ok(Json(state.users.current_user(&caller).await?))
}

async fn list_users(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthenticatedUser>,
) -> Result<Json<Vec<User>>, AppError> {
    Ok(Json(state.users.list(&caller).await?))
}

async fn get_user(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
) -> Result<Json<User>, AppError> {
    Ok(Json(state.users.get(&caller, &id).await?))
}

async fn create_user(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthenticatedUser>,
    body: Result<Json<CreateUser>, JsonRejection>,
) -> Result<(StatusCode, Json<User>), AppError> {
    let Json(new_user) = body?;
    let user = state.users.create(&caller, new_user).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

async fn update_user(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
    body: Result<Json<UpdateUser>, JsonRejection>,
) -> Result<Json<User>, AppError> {
    let Json(changes) = body?;
    Ok(Json(state.users.update(&caller, &id, changes).await?))
}

async fn delete_user(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    state.users.delete(&caller, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}
