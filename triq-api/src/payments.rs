use axum::{
    extract::{Path, State},
    Extension, Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::bookings::fetch_booking_for_driver;
use crate::error::AppError;
use crate::middleware::auth::Claims;
use crate::rides::fetch_ride;
use crate::state::AppState;
use triq_booking::{
    BookingStatus, DriverPayout, PaymentError, PaymentStatus, PaymentTransaction, PlatformFee,
};
use triq_rides::Ride;
use triq_shared::models::events::PaymentValidatedEvent;
use triq_store::events::TOPIC_PAYMENT_VALIDATED;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct PaymentResponse {
    pub payment_id: Uuid,
    pub booking_id: Uuid,
    pub amount_cents: i32,
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub struct ValidatePaymentRequest {
    pub validation_code: String,
}

#[derive(Debug, Serialize)]
pub struct ValidatePaymentResponse {
    pub payment_id: Uuid,
    pub status: String,
    pub driver_payout_cents: i32,
    pub platform_fee_cents: i32,
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /v1/bookings/:id/payment
/// Passenger initiates the handshake: a transaction is created (or a pending
/// one reused), a fresh code is generated, and the code goes out by email.
/// The code never appears in the response.
pub async fn initiate_payment(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(booking_id): Path<Uuid>,
) -> Result<Json<PaymentResponse>, AppError> {
    let passenger_id = claims.user_id()?;

    let booking = state
        .booking_repo
        .get_booking(booking_id)
        .await
        .map_err(AppError::internal)?
        .ok_or_else(|| AppError::NotFoundError("Booking not found".to_string()))?;

    if booking.passenger_id != passenger_id {
        return Err(AppError::AuthorizationError(
            "This booking is not yours".to_string(),
        ));
    }
    if booking.status != BookingStatus::Confirmed {
        return Err(AppError::ConflictError(
            "Only confirmed bookings can be paid".to_string(),
        ));
    }

    let ride = fetch_ride(&state, booking.ride_id).await?;
    let amount = payment_amount_cents(ride.price_cents, booking.seats)?;

    let mut payment = match state
        .payment_repo
        .get_by_booking(booking_id)
        .await
        .map_err(AppError::internal)?
    {
        Some(existing) => existing,
        None => {
            let payment = PaymentTransaction::new(booking_id, amount)
                .map_err(|e| AppError::ValidationError(e.to_string()))?;
            state
                .payment_repo
                .create_payment(&payment)
                .await
                .map_err(AppError::internal)?;
            payment
        }
    };

    if matches!(payment.status, PaymentStatus::Pending | PaymentStatus::Paid) {
        // ThreadRng must not live across an await point.
        let code = {
            let mut rng = rand::thread_rng();
            payment
                .issue_code(&mut rng)
                .map_err(|e| AppError::ConflictError(e.to_string()))?
        };
        state
            .payment_repo
            .update_payment(&payment)
            .await
            .map_err(AppError::internal)?;

        if let Ok(Some(passenger)) = state.user_repo.get_user(passenger_id).await {
            let _ = state
                .mailer
                .send(
                    &passenger.email,
                    "Your ride validation code",
                    &code_email_body(&ride, payment.amount_cents, &code),
                )
                .await;
        }
    }

    Ok(Json(PaymentResponse {
        payment_id: payment.id,
        booking_id,
        amount_cents: payment.amount_cents,
        status: payment.status.as_str().to_string(),
    }))
}

/// POST /v1/bookings/:id/payment/validate
/// Driver-side half of the handshake. A matching code validates the payment,
/// completes the booking and writes the settlement rows; a wrong code changes
/// nothing and returns 422.
pub async fn validate_payment(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(booking_id): Path<Uuid>,
    Json(req): Json<ValidatePaymentRequest>,
) -> Result<Json<ValidatePaymentResponse>, AppError> {
    let (booking, ride) = fetch_booking_for_driver(&state, booking_id, &claims).await?;

    let mut payment = state
        .payment_repo
        .get_by_booking(booking_id)
        .await
        .map_err(AppError::internal)?
        .ok_or_else(|| {
            AppError::NotFoundError("No payment has been initiated for this booking".to_string())
        })?;

    let split = payment
        .validate(
            &req.validation_code,
            state.business_rules.driver_share_percent,
        )
        .map_err(|e| match e {
            PaymentError::CodeMismatch | PaymentError::NoCodeIssued => {
                AppError::UnprocessableError("Validation code is incorrect".to_string())
            }
            other => AppError::ConflictError(other.to_string()),
        })?;

    let payout = DriverPayout::new(payment.id, ride.driver_id, split.driver_payout_cents);
    let fee = PlatformFee::new(payment.id, split.platform_fee_cents);

    state
        .payment_repo
        .settle(&payment, &payout, &fee)
        .await
        .map_err(AppError::internal)?;

    // Payout notice to the driver, fail-silent.
    if let Ok(Some(driver)) = state.user_repo.get_user(ride.driver_id).await {
        let _ = state
            .mailer
            .send(
                &driver.email,
                "Payment validated",
                &payout_email_body(&ride, split.driver_payout_cents),
            )
            .await;
    }

    let event = PaymentValidatedEvent {
        booking_id,
        ride_id: ride.id,
        amount_cents: payment.amount_cents,
        driver_payout_cents: split.driver_payout_cents,
        platform_fee_cents: split.platform_fee_cents,
        timestamp: Utc::now().timestamp(),
    };
    let _ = state
        .kafka
        .publish_event(TOPIC_PAYMENT_VALIDATED, &booking_id.to_string(), &event)
        .await;

    tracing::info!(
        "Payment validated for booking {} ({} seats, {} cents)",
        booking_id,
        booking.seats,
        payment.amount_cents
    );
    Ok(Json(ValidatePaymentResponse {
        payment_id: payment.id,
        status: payment.status.as_str().to_string(),
        driver_payout_cents: split.driver_payout_cents,
        platform_fee_cents: split.platform_fee_cents,
    }))
}

// ============================================================================
// Helpers
// ============================================================================

/// Total owed for a booking: ride price times seats.
pub(crate) fn payment_amount_cents(price_cents: i32, seats: i32) -> Result<i32, AppError> {
    let amount = (price_cents as i64) * (seats as i64);
    i32::try_from(amount)
        .map_err(|_| AppError::ValidationError("Payment amount out of range".to_string()))
}

pub(crate) fn code_email_body(ride: &Ride, amount_cents: i32, code: &str) -> String {
    format!(
        "Your validation code for the ride {} -> {} is: {}\n\
         Amount due: {:.2} MAD\n\
         Share this code with the driver only after the ride.",
        ride.departure_city,
        ride.arrival_city,
        code,
        amount_cents as f64 / 100.0
    )
}

pub(crate) fn payout_email_body(ride: &Ride, payout_cents: i32) -> String {
    format!(
        "The payment for the ride {} -> {} has been validated.\n\
         Your payout: {:.2} MAD.",
        ride.departure_city,
        ride.arrival_city,
        payout_cents as f64 / 100.0
    )
}
