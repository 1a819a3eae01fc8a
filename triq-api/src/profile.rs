use axum::{extract::State, Extension, Json};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;
use crate::middleware::auth::Claims;
use crate::state::AppState;
use triq_shared::pii::Masked;

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub user_id: Uuid,
    pub email: Masked<String>,
    pub display_name: String,
    pub role: String,
    pub phone: Option<Masked<String>>,
    pub bio: Option<String>,
    pub rating: f64,
    pub number_of_ratings: i32,
    pub is_verified: bool,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub phone: Option<String>,
    pub bio: Option<String>,
}

/// GET /v1/profile
pub async fn get_profile(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<ProfileResponse>, AppError> {
    let user_id = claims.user_id()?;

    let user = state
        .user_repo
        .get_user(user_id)
        .await
        .map_err(AppError::internal)?
        .ok_or_else(|| AppError::NotFoundError("User not found".to_string()))?;
    let profile = state
        .user_repo
        .get_profile(user_id)
        .await
        .map_err(AppError::internal)?
        .ok_or_else(|| AppError::NotFoundError("Profile not found".to_string()))?;

    Ok(Json(ProfileResponse {
        user_id,
        email: Masked(user.email),
        display_name: user.display_name,
        role: user.role.as_str().to_string(),
        phone: profile.phone.map(Masked),
        bio: profile.bio,
        rating: profile.rating,
        number_of_ratings: profile.number_of_ratings,
        is_verified: profile.is_verified,
    }))
}

/// PUT /v1/profile
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<Json<ProfileResponse>, AppError> {
    let user_id = claims.user_id()?;

    let mut profile = state
        .user_repo
        .get_profile(user_id)
        .await
        .map_err(AppError::internal)?
        .ok_or_else(|| AppError::NotFoundError("Profile not found".to_string()))?;

    profile.phone = req.phone;
    profile.bio = req.bio;

    state
        .user_repo
        .update_profile(&profile)
        .await
        .map_err(AppError::internal)?;

    get_profile(State(state), Extension(claims)).await
}
