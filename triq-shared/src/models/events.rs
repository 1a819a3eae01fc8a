use uuid::Uuid;

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone)]
pub struct BookingConfirmedEvent {
    pub booking_id: Uuid,
    pub ride_id: Uuid,
    pub seats: i32,
    pub confirmed_at: i64,
}

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone)]
pub struct BookingCancelledEvent {
    pub booking_id: Uuid,
    pub ride_id: Uuid,
    pub seats_released: i32,
    pub timestamp: i64,
}

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone)]
pub struct PaymentValidatedEvent {
    pub booking_id: Uuid,
    pub ride_id: Uuid,
    pub amount_cents: i32,
    pub driver_payout_cents: i32,
    pub platform_fee_cents: i32,
    pub timestamp: i64,
}

/// Fan-out payload for the per-ride SSE seat stream.
#[derive(Debug, serde::Serialize, serde::Deserialize, Clone)]
pub struct SeatAvailabilityEvent {
    pub ride_id: Uuid,
    pub available_seats: i32,
    pub timestamp: i64,
}
