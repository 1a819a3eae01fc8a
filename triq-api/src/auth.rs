use axum::{extract::State, routing::post, Json, Router};
use chrono::{Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;
use crate::middleware::auth::Claims;
use crate::state::AppState;
use triq_core::identity::{self, Profile, Role, User};

#[derive(Debug, Deserialize)]
struct SignupRequest {
    email: String,
    password: String,
    display_name: String,
    role: String,
    phone: Option<String>,
}

#[derive(Debug, Serialize)]
struct SignupResponse {
    user_id: Uuid,
}

#[derive(Debug, Deserialize)]
struct LoginRequest {
    email: String,
    password: String,
}

#[derive(Debug, Serialize)]
struct AuthResponse {
    token: String,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/auth/signup", post(signup))
        .route("/v1/auth/login", post(login))
}

async fn signup(
    State(state): State<AppState>,
    Json(req): Json<SignupRequest>,
) -> Result<Json<SignupResponse>, AppError> {
    let role = Role::parse(&req.role)
        .ok_or_else(|| AppError::ValidationError(format!("Unknown role: {}", req.role)))?;

    if req.password.len() < 8 {
        return Err(AppError::ValidationError(
            "Password must be at least 8 characters".to_string(),
        ));
    }
    if !req.email.contains('@') {
        return Err(AppError::ValidationError("Invalid email address".to_string()));
    }

    let existing = state
        .user_repo
        .find_by_email(&req.email)
        .await
        .map_err(AppError::internal)?;
    if existing.is_some() {
        return Err(AppError::ConflictError(
            "An account with this email already exists".to_string(),
        ));
    }

    let now = Utc::now();
    let salt = Uuid::new_v4().simple().to_string();
    let user = User {
        id: Uuid::new_v4(),
        email: req.email.trim().to_lowercase(),
        password_digest: identity::password_digest(&req.password, &salt),
        display_name: req.display_name,
        role,
        created_at: now,
        updated_at: now,
    };

    let mut profile = Profile::new(user.id);
    profile.phone = req.phone;
    profile.is_verified = true;

    let user_id = state
        .user_repo
        .create_user(&user, &profile)
        .await
        .map_err(AppError::internal)?;

    tracing::info!("New {} account: {}", role.as_str(), user_id);
    Ok(Json(SignupResponse { user_id }))
}

async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let user = state
        .user_repo
        .find_by_email(&req.email)
        .await
        .map_err(AppError::internal)?
        .ok_or_else(|| AppError::AuthenticationError("Invalid credentials".to_string()))?;

    if !identity::verify_password(&req.password, &user.password_digest) {
        return Err(AppError::AuthenticationError(
            "Invalid credentials".to_string(),
        ));
    }

    let claims = Claims {
        sub: user.id.to_string(),
        role: user.role.as_str().to_string(),
        exp: (Utc::now() + Duration::seconds(state.auth.expiration as i64)).timestamp() as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(state.auth.secret.as_bytes()),
    )
    .map_err(|e| AppError::InternalServerError(format!("Token encoding failed: {}", e)))?;

    Ok(Json(AuthResponse { token }))
}
