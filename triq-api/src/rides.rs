use axum::{
    extract::{Path, Query, State},
    response::sse::{Event, KeepAlive, Sse},
    Extension, Json,
};
use chrono::{NaiveDate, NaiveTime, Utc};
use futures_util::{Stream, StreamExt};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use tokio_stream::wrappers::BroadcastStream;
use uuid::Uuid;

use crate::error::AppError;
use crate::middleware::auth::Claims;
use crate::state::AppState;
use triq_booking::Booking;
use triq_core::search::{RideFilter, RidePage};
use triq_rides::{cities, Ride, RideStatus};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct CreateRideRequest {
    pub vehicle_id: Option<Uuid>,
    pub departure_city: String,
    pub arrival_city: String,
    pub departure_date: NaiveDate,
    pub departure_time: NaiveTime,
    pub total_seats: i32,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PublishRideRequest {
    pub action: String,
}

#[derive(Debug, Serialize)]
pub struct RideDetailResponse {
    pub ride: Ride,
    pub user_booking: Option<Booking>,
}

#[derive(Debug, Deserialize)]
pub struct QuoteParams {
    pub departure: String,
    pub arrival: String,
}

#[derive(Debug, Serialize)]
pub struct QuoteResponse {
    pub distance_km: i32,
    pub price_cents: i32,
    pub driver_share_cents: i32,
    pub platform_fee_cents: i32,
    pub currency: &'static str,
}

#[derive(Debug, Deserialize)]
pub struct CityParams {
    #[serde(default)]
    pub q: String,
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /v1/rides
/// Public search over confirmed, not-yet-departed rides.
pub async fn list_rides(
    State(state): State<AppState>,
    Query(filter): Query<RideFilter>,
) -> Result<Json<RidePage>, AppError> {
    let today = Utc::now().date_naive();
    let page = state
        .ride_repo
        .search_rides(&filter, today)
        .await
        .map_err(AppError::internal)?;

    Ok(Json(page))
}

/// GET /v1/cities?q=
/// Autocomplete over the served city list.
pub async fn list_cities(Query(params): Query<CityParams>) -> Json<Vec<&'static str>> {
    Json(cities::matching_cities(&params.q))
}

/// GET /v1/rides/quote?departure=&arrival=
/// Price estimate for a city pair.
pub async fn quote_ride(
    State(state): State<AppState>,
    Query(params): Query<QuoteParams>,
) -> Result<Json<QuoteResponse>, AppError> {
    let engine = state.pricing().map_err(AppError::internal)?;
    let quote = engine
        .quote_route(&params.departure, &params.arrival)
        .map_err(|e| AppError::ValidationError(e.to_string()))?;

    Ok(Json(QuoteResponse {
        distance_km: quote.distance_km,
        price_cents: quote.price_cents,
        driver_share_cents: quote.driver_share_cents,
        platform_fee_cents: quote.platform_share_cents,
        currency: "MAD",
    }))
}

/// POST /v1/rides
/// Drivers publish a new ride; it is stored as a draft until validated.
pub async fn create_ride(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CreateRideRequest>,
) -> Result<Json<Ride>, AppError> {
    claims.require_driver()?;
    let driver_id = claims.user_id()?;

    if req.total_seats < 1 {
        return Err(AppError::ValidationError(
            "A ride needs at least one seat".to_string(),
        ));
    }

    // The offered seats cannot exceed what the declared vehicle holds.
    if let Some(vehicle_id) = req.vehicle_id {
        let vehicle = state
            .vehicle_repo
            .get_vehicle(vehicle_id)
            .await
            .map_err(AppError::internal)?
            .ok_or_else(|| AppError::NotFoundError("Vehicle not found".to_string()))?;

        if vehicle.driver_id != driver_id {
            return Err(AppError::AuthorizationError(
                "Vehicle belongs to another driver".to_string(),
            ));
        }
        if req.total_seats > vehicle.number_of_seats {
            return Err(AppError::ValidationError(format!(
                "Vehicle only has {} seats",
                vehicle.number_of_seats
            )));
        }
    }

    let engine = state.pricing().map_err(AppError::internal)?;
    let quote = engine
        .quote_route(&req.departure_city, &req.arrival_city)
        .map_err(|e| AppError::ValidationError(e.to_string()))?;

    let ride = Ride::new(
        driver_id,
        req.vehicle_id,
        req.departure_city.trim().to_string(),
        req.arrival_city.trim().to_string(),
        req.departure_date,
        req.departure_time,
        quote,
        req.total_seats,
        req.description,
    );

    state
        .ride_repo
        .create_ride(&ride)
        .await
        .map_err(AppError::internal)?;

    tracing::info!("Ride created: {} ({} -> {})", ride.id, ride.departure_city, ride.arrival_city);
    Ok(Json(ride))
}

/// GET /v1/rides/:id
/// Ride detail, with the caller's own booking if one exists.
pub async fn get_ride(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(ride_id): Path<Uuid>,
) -> Result<Json<RideDetailResponse>, AppError> {
    let ride = fetch_ride(&state, ride_id).await?;
    let user_id = claims.user_id()?;

    let user_booking = if user_id != ride.driver_id {
        state
            .booking_repo
            .find_for_ride_and_passenger(ride_id, user_id)
            .await
            .map_err(AppError::internal)?
    } else {
        None
    };

    Ok(Json(RideDetailResponse { ride, user_booking }))
}

/// GET /v1/rides/mine
/// The driver's own rides, newest first.
pub async fn list_my_rides(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Vec<Ride>>, AppError> {
    claims.require_driver()?;
    let rides = state
        .ride_repo
        .list_by_driver(claims.user_id()?)
        .await
        .map_err(AppError::internal)?;
    Ok(Json(rides))
}

/// POST /v1/rides/:id/publish
/// Driver validates a draft (action "confirm") or scraps it ("cancel").
pub async fn publish_ride(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(ride_id): Path<Uuid>,
    Json(req): Json<PublishRideRequest>,
) -> Result<Json<Ride>, AppError> {
    let mut ride = fetch_owned_ride(&state, ride_id, &claims).await?;

    match req.action.as_str() {
        "confirm" => {
            ride.publish()
                .map_err(|e| AppError::ConflictError(e.to_string()))?;
            state
                .ride_repo
                .update_status(ride.id, RideStatus::Confirmed)
                .await
                .map_err(AppError::internal)?;

            // Seed the availability cache so the SSE/worker path has a baseline.
            let _ = state
                .redis
                .set_ride_availability(&ride.id.to_string(), ride.available_seats)
                .await;
        }
        "cancel" => {
            ride.cancel()
                .map_err(|e| AppError::ConflictError(e.to_string()))?;
            state
                .ride_repo
                .update_status(ride.id, RideStatus::Cancelled)
                .await
                .map_err(AppError::internal)?;
            let _ = state
                .redis
                .delete_ride_availability(&ride.id.to_string())
                .await;
        }
        other => {
            return Err(AppError::ValidationError(format!(
                "Unknown action: {}",
                other
            )));
        }
    }

    Ok(Json(ride))
}

/// POST /v1/rides/:id/start
pub async fn start_ride(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(ride_id): Path<Uuid>,
) -> Result<Json<Ride>, AppError> {
    let mut ride = fetch_owned_ride(&state, ride_id, &claims).await?;

    ride.start()
        .map_err(|e| AppError::ConflictError(e.to_string()))?;
    state
        .ride_repo
        .update_status(ride.id, RideStatus::InProgress)
        .await
        .map_err(AppError::internal)?;

    Ok(Json(ride))
}

/// POST /v1/rides/:id/complete
/// Completes the ride and flips its remaining confirmed bookings.
pub async fn complete_ride(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(ride_id): Path<Uuid>,
) -> Result<Json<Ride>, AppError> {
    let mut ride = fetch_owned_ride(&state, ride_id, &claims).await?;

    ride.complete()
        .map_err(|e| AppError::ConflictError(e.to_string()))?;
    state
        .ride_repo
        .update_status(ride.id, RideStatus::Completed)
        .await
        .map_err(AppError::internal)?;

    let completed = state
        .booking_repo
        .complete_for_ride(ride.id)
        .await
        .map_err(AppError::internal)?;
    if completed > 0 {
        tracing::info!("Completed {} bookings with ride {}", completed, ride.id);
    }

    let _ = state
        .redis
        .delete_ride_availability(&ride.id.to_string())
        .await;

    Ok(Json(ride))
}

/// DELETE /v1/rides/:id
pub async fn delete_ride(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(ride_id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    let ride = fetch_owned_ride(&state, ride_id, &claims).await?;

    state
        .ride_repo
        .delete_ride(ride.id)
        .await
        .map_err(AppError::internal)?;
    let _ = state
        .redis
        .delete_ride_availability(&ride.id.to_string())
        .await;

    Ok(Json(serde_json::json!({ "deleted": ride.id })))
}

/// GET /v1/rides/:id/seats/stream
/// SSE feed of seat availability changes for one ride.
pub async fn seat_stream(
    State(state): State<AppState>,
    Path(ride_id): Path<Uuid>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = state.seat_tx.subscribe();

    let stream = BroadcastStream::new(rx).filter_map(move |result| async move {
        match result {
            Ok(event) if event.ride_id == ride_id => {
                serde_json::to_string(&event).ok().map(|data| {
                    Ok::<_, Infallible>(Event::default().event("seat_availability").data(data))
                })
            }
            _ => None,
        }
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}

// ============================================================================
// Helpers
// ============================================================================

pub(crate) async fn fetch_ride(state: &AppState, ride_id: Uuid) -> Result<Ride, AppError> {
    state
        .ride_repo
        .get_ride(ride_id)
        .await
        .map_err(AppError::internal)?
        .ok_or_else(|| AppError::NotFoundError("Ride not found".to_string()))
}

async fn fetch_owned_ride(
    state: &AppState,
    ride_id: Uuid,
    claims: &Claims,
) -> Result<Ride, AppError> {
    let ride = fetch_ride(state, ride_id).await?;
    if ride.driver_id != claims.user_id()? {
        return Err(AppError::AuthorizationError(
            "You are not the driver of this ride".to_string(),
        ));
    }
    Ok(ride)
}
