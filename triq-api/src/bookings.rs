use axum::{
    extract::{Path, State},
    Extension, Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;
use crate::middleware::auth::Claims;
use crate::rides::fetch_ride;
use crate::state::AppState;
use triq_booking::{Booking, BookingStatus};
use triq_rides::Ride;
use triq_shared::models::events::{
    BookingCancelledEvent, BookingConfirmedEvent, SeatAvailabilityEvent,
};
use triq_store::events::{TOPIC_BOOKING_CANCELLED, TOPIC_BOOKING_CONFIRMED};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct CreateBookingRequest {
    pub seats: i32,
    pub message: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct BookingResponse {
    pub booking_id: Uuid,
    pub status: String,
}

#[derive(Debug, Serialize)]
pub struct BookingOverviewResponse {
    pub as_passenger: Vec<Booking>,
    pub pending_requests: Vec<Booking>,
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /v1/rides/:id/bookings
/// A passenger asks for seats on a confirmed ride.
pub async fn create_booking(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(ride_id): Path<Uuid>,
    Json(req): Json<CreateBookingRequest>,
) -> Result<Json<BookingResponse>, AppError> {
    let passenger_id = claims.user_id()?;
    let ride = fetch_ride(&state, ride_id).await?;

    if passenger_id == ride.driver_id {
        return Err(AppError::ValidationError(
            "You cannot book your own ride".to_string(),
        ));
    }
    if !ride.is_open_for_booking() {
        return Err(AppError::ConflictError(
            "This ride is not open for booking".to_string(),
        ));
    }
    if req.seats < 1 {
        return Err(AppError::ValidationError(
            "At least one seat must be requested".to_string(),
        ));
    }
    if req.seats > ride.available_seats {
        return Err(AppError::ConflictError(format!(
            "Only {} seats left on this ride",
            ride.available_seats
        )));
    }

    let existing = state
        .booking_repo
        .find_for_ride_and_passenger(ride_id, passenger_id)
        .await
        .map_err(AppError::internal)?;
    if existing.is_some() {
        return Err(AppError::ConflictError(
            "You already have a booking for this ride".to_string(),
        ));
    }

    let booking = Booking::new(ride_id, passenger_id, req.seats, req.message);
    state
        .booking_repo
        .create_booking(&booking)
        .await
        .map_err(AppError::internal)?;

    tracing::info!("Booking requested: {} on ride {}", booking.id, ride_id);
    Ok(Json(BookingResponse {
        booking_id: booking.id,
        status: booking.status.as_str().to_string(),
    }))
}

/// POST /v1/bookings/:id/confirm
/// The driver accepts a pending request. Seats are re-checked and taken
/// inside the repository transaction.
pub async fn confirm_booking(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(booking_id): Path<Uuid>,
) -> Result<Json<BookingResponse>, AppError> {
    let (booking, ride) = fetch_booking_for_driver(&state, booking_id, &claims).await?;

    if booking.status != BookingStatus::Pending {
        return Err(AppError::ConflictError(
            "This booking has already been handled".to_string(),
        ));
    }

    let remaining = state
        .booking_repo
        .confirm_booking(booking_id)
        .await
        .map_err(AppError::internal)?
        .ok_or_else(|| {
            AppError::ConflictError("Not enough seats left on this ride".to_string())
        })?;

    // Passenger notification is fail-silent.
    if let Ok(Some(passenger)) = state.user_repo.get_user(booking.passenger_id).await {
        let _ = state
            .mailer
            .send(
                &passenger.email,
                "Booking confirmed",
                &confirmation_email_body(&ride),
            )
            .await;
    }

    let event = BookingConfirmedEvent {
        booking_id,
        ride_id: ride.id,
        seats: booking.seats,
        confirmed_at: Utc::now().timestamp(),
    };
    let _ = state
        .kafka
        .publish_event(TOPIC_BOOKING_CONFIRMED, &ride.id.to_string(), &event)
        .await;

    let _ = state.seat_tx.send(SeatAvailabilityEvent {
        ride_id: ride.id,
        available_seats: remaining,
        timestamp: Utc::now().timestamp(),
    });

    tracing::info!(
        "Booking confirmed: {} ({} seats, {} left)",
        booking_id,
        booking.seats,
        remaining
    );
    Ok(Json(BookingResponse {
        booking_id,
        status: BookingStatus::Confirmed.as_str().to_string(),
    }))
}

/// POST /v1/bookings/:id/reject
pub async fn reject_booking(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(booking_id): Path<Uuid>,
) -> Result<Json<BookingResponse>, AppError> {
    let (booking, ride) = fetch_booking_for_driver(&state, booking_id, &claims).await?;

    if booking.status != BookingStatus::Pending {
        return Err(AppError::ConflictError(
            "This booking has already been handled".to_string(),
        ));
    }

    state
        .booking_repo
        .update_status(booking_id, BookingStatus::Rejected)
        .await
        .map_err(AppError::internal)?;

    if let Ok(Some(passenger)) = state.user_repo.get_user(booking.passenger_id).await {
        let _ = state
            .mailer
            .send(
                &passenger.email,
                "Booking declined",
                &rejection_email_body(&ride),
            )
            .await;
    }

    Ok(Json(BookingResponse {
        booking_id,
        status: BookingStatus::Rejected.as_str().to_string(),
    }))
}

/// POST /v1/bookings/:id/cancel
/// The passenger backs out; a confirmed booking returns its seats.
pub async fn cancel_booking(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(booking_id): Path<Uuid>,
) -> Result<Json<BookingResponse>, AppError> {
    let booking = state
        .booking_repo
        .get_booking(booking_id)
        .await
        .map_err(AppError::internal)?
        .ok_or_else(|| AppError::NotFoundError("Booking not found".to_string()))?;

    if booking.passenger_id != claims.user_id()? {
        return Err(AppError::AuthorizationError(
            "This booking is not yours".to_string(),
        ));
    }
    if booking.status.is_terminal() {
        return Err(AppError::ConflictError(
            "This booking can no longer be cancelled".to_string(),
        ));
    }

    let restored = state
        .booking_repo
        .cancel_booking(booking_id, BookingStatus::CancelledByPassenger)
        .await
        .map_err(AppError::internal)?;

    if let Some(available) = restored {
        let event = BookingCancelledEvent {
            booking_id,
            ride_id: booking.ride_id,
            seats_released: booking.seats,
            timestamp: Utc::now().timestamp(),
        };
        let _ = state
            .kafka
            .publish_event(
                TOPIC_BOOKING_CANCELLED,
                &booking.ride_id.to_string(),
                &event,
            )
            .await;

        let _ = state.seat_tx.send(SeatAvailabilityEvent {
            ride_id: booking.ride_id,
            available_seats: available,
            timestamp: Utc::now().timestamp(),
        });
    }

    Ok(Json(BookingResponse {
        booking_id,
        status: BookingStatus::CancelledByPassenger.as_str().to_string(),
    }))
}

/// GET /v1/bookings
/// The caller's bookings, plus pending requests on their rides for drivers.
pub async fn list_bookings(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<BookingOverviewResponse>, AppError> {
    let user_id = claims.user_id()?;

    let as_passenger = state
        .booking_repo
        .list_by_passenger(user_id)
        .await
        .map_err(AppError::internal)?;

    let pending_requests = if claims.is_driver() {
        state
            .booking_repo
            .list_pending_for_driver(user_id)
            .await
            .map_err(AppError::internal)?
    } else {
        Vec::new()
    };

    Ok(Json(BookingOverviewResponse {
        as_passenger,
        pending_requests,
    }))
}

// ============================================================================
// Helpers
// ============================================================================

pub(crate) async fn fetch_booking_for_driver(
    state: &AppState,
    booking_id: Uuid,
    claims: &Claims,
) -> Result<(Booking, Ride), AppError> {
    let booking = state
        .booking_repo
        .get_booking(booking_id)
        .await
        .map_err(AppError::internal)?
        .ok_or_else(|| AppError::NotFoundError("Booking not found".to_string()))?;

    let ride = fetch_ride(state, booking.ride_id).await?;
    if ride.driver_id != claims.user_id()? {
        return Err(AppError::AuthorizationError(
            "You are not the driver of this ride".to_string(),
        ));
    }

    Ok((booking, ride))
}

pub(crate) fn confirmation_email_body(ride: &Ride) -> String {
    format!(
        "Your booking for the ride {} -> {} on {} has been confirmed.",
        ride.departure_city, ride.arrival_city, ride.departure_date
    )
}

pub(crate) fn rejection_email_body(ride: &Ride) -> String {
    format!(
        "Your booking for the ride {} -> {} on {} has been declined.",
        ride.departure_city, ride.arrival_city, ride.departure_date
    )
}
