use axum::{
    extract::{Path, State},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;
use crate::middleware::auth::Claims;
use crate::rides::fetch_ride;
use crate::state::AppState;
use triq_booking::rating::{aggregate, Rating, RatingCriterion};
use triq_booking::BookingStatus;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct CreateRatingRequest {
    pub criterion: String,
    pub score: i32,
    pub comment: Option<String>,
    #[serde(default)]
    pub is_anonymous: bool,
}

#[derive(Debug, Serialize)]
pub struct RatingCreatedResponse {
    pub rating_id: Uuid,
    pub ratee_average: f64,
    pub ratee_rating_count: i32,
}

#[derive(Debug, Serialize)]
pub struct RatingResponse {
    /// None when the rater chose to stay anonymous.
    pub from_user_id: Option<Uuid>,
    pub criterion: String,
    pub score: i32,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /v1/bookings/:id/ratings
/// A participant of a completed booking rates the counterparty.
pub async fn create_rating(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(booking_id): Path<Uuid>,
    Json(req): Json<CreateRatingRequest>,
) -> Result<Json<RatingCreatedResponse>, AppError> {
    let user_id = claims.user_id()?;

    let booking = state
        .booking_repo
        .get_booking(booking_id)
        .await
        .map_err(AppError::internal)?
        .ok_or_else(|| AppError::NotFoundError("Booking not found".to_string()))?;
    let ride = fetch_ride(&state, booking.ride_id).await?;

    if user_id != booking.passenger_id && user_id != ride.driver_id {
        return Err(AppError::AuthorizationError(
            "You did not take part in this ride".to_string(),
        ));
    }
    if booking.status != BookingStatus::Completed {
        return Err(AppError::ConflictError(
            "Only completed rides can be rated".to_string(),
        ));
    }

    // The counterparty is whoever the rater is not.
    let ratee_id = if user_id == booking.passenger_id {
        ride.driver_id
    } else {
        booking.passenger_id
    };

    let criterion = RatingCriterion::parse(&req.criterion)
        .ok_or_else(|| AppError::ValidationError(format!("Unknown criterion: {}", req.criterion)))?;

    let rating = Rating::new(
        user_id,
        ratee_id,
        ride.id,
        criterion,
        req.score,
        req.comment,
        req.is_anonymous,
    )
    .map_err(|e| AppError::ValidationError(e.to_string()))?;

    let inserted = state
        .rating_repo
        .insert_rating(&rating)
        .await
        .map_err(AppError::internal)?;
    if !inserted {
        return Err(AppError::ConflictError(
            "You already rated this criterion for this ride".to_string(),
        ));
    }

    // Recompute the ratee's profile aggregate over everything they received.
    let scores = state
        .rating_repo
        .scores_for(ratee_id)
        .await
        .map_err(AppError::internal)?;
    let agg = aggregate(&scores);
    state
        .user_repo
        .update_rating_aggregate(ratee_id, agg.average, agg.count)
        .await
        .map_err(AppError::internal)?;

    Ok(Json(RatingCreatedResponse {
        rating_id: rating.id,
        ratee_average: agg.average,
        ratee_rating_count: agg.count,
    }))
}

/// GET /v1/users/:id/ratings
/// Ratings a user has received; anonymous raters stay hidden.
pub async fn list_ratings(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<Vec<RatingResponse>>, AppError> {
    let ratings = state
        .rating_repo
        .list_received(user_id)
        .await
        .map_err(AppError::internal)?;

    Ok(Json(ratings.into_iter().map(mask_rating).collect()))
}

// ============================================================================
// Helpers
// ============================================================================

pub(crate) fn mask_rating(rating: Rating) -> RatingResponse {
    RatingResponse {
        from_user_id: if rating.is_anonymous {
            None
        } else {
            Some(rating.from_user_id)
        },
        criterion: rating.criterion.as_str().to_string(),
        score: rating.score,
        comment: rating.comment,
        created_at: rating.created_at,
    }
}
