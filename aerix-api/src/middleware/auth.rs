use aerix_core::principal::{CurrentUser, Role};
use aerix_store::ProfileRepository;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String,
    pub role: String,
    pub exp: usize,
}

/// Guard for passenger routes: resolves the bearer token to an active
/// passenger and injects the principal as a request extension.
pub async fn passenger_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let user = authenticate(&state, req.headers()).await?;
    if user.role != Role::Passenger {
        return Err(AppError::Authorization("Passenger account required".to_string()));
    }

    req.extensions_mut().insert(user);
    Ok(next.run(req).await)
}

/// Guard for staff routes.
pub async fn staff_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let user = authenticate(&state, req.headers()).await?;
    if !user.is_staff() {
        return Err(AppError::Authorization("Staff account required".to_string()));
    }

    req.extensions_mut().insert(user);
    Ok(next.run(req).await)
}

async fn authenticate(
    state: &AppState,
    headers: &axum::http::HeaderMap,
) -> Result<CurrentUser, AppError> {
    let auth_header = headers
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| AppError::Authentication("Missing authorization header".to_string()))?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::Authentication("Malformed authorization header".to_string()))?;

    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(state.auth.secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|err| AppError::Authentication(err.to_string()))?;

    let user_id: i64 = token_data
        .claims
        .sub
        .parse()
        .map_err(|_| AppError::Authentication("Invalid token subject".to_string()))?;

    // The stored account is the source of truth for role and liveness; the
    // token only names the subject.
    let mut conn = state
        .db
        .pool
        .acquire()
        .await
        .map_err(|err| AppError::Internal(err.into()))?;
    let user = ProfileRepository::user_by_id(&mut conn, user_id)
        .await?
        .ok_or_else(|| AppError::Authentication("Unknown user".to_string()))?;

    if !user.is_active {
        return Err(AppError::Authentication("Account is disabled".to_string()));
    }

    Ok(CurrentUser {
        id: user.id,
        role: user.role,
    })
}
