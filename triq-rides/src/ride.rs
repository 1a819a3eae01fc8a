use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::pricing::Quote;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RideStatus {
    Draft,
    Pending,
    Confirmed,
    InProgress,
    Completed,
    Cancelled,
}

impl RideStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RideStatus::Draft => "DRAFT",
            RideStatus::Pending => "PENDING",
            RideStatus::Confirmed => "CONFIRMED",
            RideStatus::InProgress => "IN_PROGRESS",
            RideStatus::Completed => "COMPLETED",
            RideStatus::Cancelled => "CANCELLED",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "DRAFT" => Some(RideStatus::Draft),
            "PENDING" => Some(RideStatus::Pending),
            "CONFIRMED" => Some(RideStatus::Confirmed),
            "IN_PROGRESS" => Some(RideStatus::InProgress),
            "COMPLETED" => Some(RideStatus::Completed),
            "CANCELLED" => Some(RideStatus::Cancelled),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, RideStatus::Completed | RideStatus::Cancelled)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vehicle {
    pub id: Uuid,
    pub driver_id: Uuid,
    pub brand: String,
    pub model: String,
    pub color: String,
    pub license_plate: String,
    pub number_of_seats: i32,
    pub comfort_features: Option<String>,
}

/// A published route with a schedule, a price and a seat count.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ride {
    pub id: Uuid,
    pub driver_id: Uuid,
    pub vehicle_id: Option<Uuid>,
    pub departure_city: String,
    pub arrival_city: String,
    pub departure_date: NaiveDate,
    pub departure_time: NaiveTime,
    pub distance_km: i32,
    pub price_cents: i32,
    pub driver_share_cents: i32,
    pub platform_share_cents: i32,
    pub total_seats: i32,
    pub available_seats: i32,
    pub description: Option<String>,
    pub status: RideStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Ride {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        driver_id: Uuid,
        vehicle_id: Option<Uuid>,
        departure_city: String,
        arrival_city: String,
        departure_date: NaiveDate,
        departure_time: NaiveTime,
        quote: Quote,
        total_seats: i32,
        description: Option<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            driver_id,
            vehicle_id,
            departure_city,
            arrival_city,
            departure_date,
            departure_time,
            distance_km: quote.distance_km,
            price_cents: quote.price_cents,
            driver_share_cents: quote.driver_share_cents,
            platform_share_cents: quote.platform_share_cents,
            total_seats,
            available_seats: total_seats,
            description,
            status: RideStatus::Draft,
            created_at: now,
            updated_at: now,
        }
    }

    /// Transition: Draft/Pending -> Confirmed. Only confirmed rides are
    /// visible to passengers.
    pub fn publish(&mut self) -> Result<(), RideError> {
        match self.status {
            RideStatus::Draft | RideStatus::Pending => {
                self.set_status(RideStatus::Confirmed);
                Ok(())
            }
            other => Err(RideError::invalid_transition(other, RideStatus::Confirmed)),
        }
    }

    /// Transition: Confirmed -> InProgress.
    pub fn start(&mut self) -> Result<(), RideError> {
        match self.status {
            RideStatus::Confirmed => {
                self.set_status(RideStatus::InProgress);
                Ok(())
            }
            other => Err(RideError::invalid_transition(other, RideStatus::InProgress)),
        }
    }

    /// Transition: Confirmed/InProgress -> Completed. The departure-date
    /// sweep completes confirmed rides that were never explicitly started.
    pub fn complete(&mut self) -> Result<(), RideError> {
        match self.status {
            RideStatus::Confirmed | RideStatus::InProgress => {
                self.set_status(RideStatus::Completed);
                Ok(())
            }
            other => Err(RideError::invalid_transition(other, RideStatus::Completed)),
        }
    }

    /// Cancel from any non-terminal state.
    pub fn cancel(&mut self) -> Result<(), RideError> {
        if self.status.is_terminal() {
            return Err(RideError::invalid_transition(
                self.status,
                RideStatus::Cancelled,
            ));
        }
        self.set_status(RideStatus::Cancelled);
        Ok(())
    }

    pub fn is_open_for_booking(&self) -> bool {
        self.status == RideStatus::Confirmed && self.available_seats > 0
    }

    fn set_status(&mut self, status: RideStatus) {
        self.status = status;
        self.updated_at = Utc::now();
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RideError {
    #[error("Ride not found: {0}")]
    NotFound(String),

    #[error("Invalid state transition from {from} to {to}")]
    InvalidTransition { from: String, to: String },
}

impl RideError {
    fn invalid_transition(from: RideStatus, to: RideStatus) -> Self {
        RideError::InvalidTransition {
            from: from.as_str().to_string(),
            to: to.as_str().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::{PricingEngine, PricingSettings};

    fn sample_ride() -> Ride {
        let engine = PricingEngine::new(PricingSettings::default()).unwrap();
        let quote = engine.quote_route("Casablanca", "Rabat").unwrap();
        Ride::new(
            Uuid::new_v4(),
            None,
            "Casablanca".to_string(),
            "Rabat".to_string(),
            NaiveDate::from_ymd_opt(2025, 6, 14).unwrap(),
            NaiveTime::from_hms_opt(8, 30, 0).unwrap(),
            quote,
            3,
            None,
        )
    }

    #[test]
    fn test_ride_lifecycle() {
        let mut ride = sample_ride();
        assert_eq!(ride.status, RideStatus::Draft);
        assert!(!ride.is_open_for_booking());

        ride.publish().unwrap();
        assert_eq!(ride.status, RideStatus::Confirmed);
        assert!(ride.is_open_for_booking());

        ride.start().unwrap();
        ride.complete().unwrap();
        assert_eq!(ride.status, RideStatus::Completed);
    }

    #[test]
    fn test_sweep_completes_unstarted_ride() {
        let mut ride = sample_ride();
        ride.publish().unwrap();
        ride.complete().unwrap();
        assert_eq!(ride.status, RideStatus::Completed);
    }

    #[test]
    fn test_terminal_states_are_final() {
        let mut ride = sample_ride();
        ride.cancel().unwrap();

        assert!(ride.publish().is_err());
        assert!(ride.start().is_err());
        assert!(ride.cancel().is_err());
    }

    #[test]
    fn test_draft_cannot_start() {
        let mut ride = sample_ride();
        let err = ride.start().unwrap_err();
        assert!(matches!(err, RideError::InvalidTransition { .. }));
    }
}
