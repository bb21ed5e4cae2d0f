use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use axum_extra::headers::{authorization::Bearer, Authorization, Cookie, HeaderMapExt};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use skyfare_core::identity::{AuthenticatedUser, Role};

use crate::error::AppError;
use crate::state::{AppState, AuthConfig};

/// Cookie carrying the token for browser clients.
pub const ACCESS_TOKEN_COOKIE: &str = "access_token";

// ============================================================================
// JWT Claims
// ============================================================================

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String,
    pub email: String,
    #[serde(default)]
    pub role: Role,
    pub exp: usize,
}

impl From<Claims> for AuthenticatedUser {
    fn from(claims: Claims) -> Self {
        AuthenticatedUser { id: claims.sub, email: claims.email, role: claims.role }
    }
}

pub fn issue_token(auth: &AuthConfig, user: &AuthenticatedUser) -> Result<String, AppError> {
    let claims = Claims {
        sub: user.id.clone(),
        email: user.email.clone(),
        role: user.role,
        exp: (chrono::Utc::now() + chrono::Duration::seconds(auth.expiration as i64)).timestamp() as usize,
    };

    encode(&Header::default(), &claims, &EncodingKey::from_secret(auth.secret.as_bytes()))
        .map_err(|e| AppError::InternalServerError(format!("Token encoding failed: {}", e)))
}

pub fn verify_token(auth: &AuthConfig, token: &str) -> Result<AuthenticatedUser, AppError> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(auth.secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| AppError::AuthenticationError(format!("Invalid authentication token: {}", e)))?;

    Ok(token_data.claims.into())
}

/// Bearer header first, then the access token cookie.
fn extract_token(headers: &HeaderMap) -> Option<String> {
    if let Some(Authorization(bearer)) = headers.typed_get::<Authorization<Bearer>>() {
        return Some(bearer.token().to_string());
    }
    headers
        .typed_get::<Cookie>()
        .and_then(|cookie| cookie.get(ACCESS_TOKEN_COOKIE).map(str::to_string))
}

// ============================================================================
// Authentication Middleware
// ============================================================================

pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = extract_token(req.headers())
        .ok_or_else(|| AppError::AuthenticationError("No authentication token found".to_string()))?;

    let user = verify_token(&state.auth, &token)?;
    req.extensions_mut().insert(user);

    Ok(next.run(req).await)
}

/// Attaches the caller when a valid token is present; anonymous otherwise.
pub async fn optional_auth(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    let caller = extract_token(req.headers()).and_then(|token| match verify_token(&state.auth, &token) {
        Ok(user) => Some(user),
        Err(e) => {
            tracing::debug!("Ignoring token on public route: {:?}", e);
            None
        }
    });
    req.extensions_mut().insert(caller);

    next.run(req).await
}

// ============================================================================
// Admin Middleware
// ============================================================================

pub async fn require_admin(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = extract_token(req.headers())
        .ok_or_else(|| AppError::AuthenticationError("No authentication token found".to_string()))?;

    let user = verify_token(&state.auth, &token)?;
    if !user.is_admin() {
        return Err(AppError::AuthorizationError(
            "Access denied. Admin privileges required.".to_string(),
        ));
    }
    req.extensions_mut().insert(user);

    Ok(next.run(req).await)
}
