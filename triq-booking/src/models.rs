use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Booking status in the lifecycle.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Rejected,
    CancelledByPassenger,
    CancelledByDriver,
    Completed,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "PENDING",
            BookingStatus::Confirmed => "CONFIRMED",
            BookingStatus::Rejected => "REJECTED",
            BookingStatus::CancelledByPassenger => "CANCELLED_BY_PASSENGER",
            BookingStatus::CancelledByDriver => "CANCELLED_BY_DRIVER",
            BookingStatus::Completed => "COMPLETED",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "PENDING" => Some(BookingStatus::Pending),
            "CONFIRMED" => Some(BookingStatus::Confirmed),
            "REJECTED" => Some(BookingStatus::Rejected),
            "CANCELLED_BY_PASSENGER" => Some(BookingStatus::CancelledByPassenger),
            "CANCELLED_BY_DRIVER" => Some(BookingStatus::CancelledByDriver),
            "COMPLETED" => Some(BookingStatus::Completed),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, BookingStatus::Pending | BookingStatus::Confirmed)
    }
}

/// A passenger's claim on a ride's seats. One per (passenger, ride).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub id: Uuid,
    pub ride_id: Uuid,
    pub passenger_id: Uuid,
    pub seats: i32,
    pub message: Option<String>,
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Booking {
    pub fn new(ride_id: Uuid, passenger_id: Uuid, seats: i32, message: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            ride_id,
            passenger_id,
            seats,
            message,
            status: BookingStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn update_status(&mut self, new_status: BookingStatus) {
        self.status = new_status;
        self.updated_at = Utc::now();
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReportType {
    InappropriateBehavior,
    SafetyConcern,
    NoShow,
    WrongVehicle,
    DangerousDriving,
    Other,
}

impl ReportType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportType::InappropriateBehavior => "INAPPROPRIATE_BEHAVIOR",
            ReportType::SafetyConcern => "SAFETY_CONCERN",
            ReportType::NoShow => "NO_SHOW",
            ReportType::WrongVehicle => "WRONG_VEHICLE",
            ReportType::DangerousDriving => "DANGEROUS_DRIVING",
            ReportType::Other => "OTHER",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "INAPPROPRIATE_BEHAVIOR" => Some(ReportType::InappropriateBehavior),
            "SAFETY_CONCERN" => Some(ReportType::SafetyConcern),
            "NO_SHOW" => Some(ReportType::NoShow),
            "WRONG_VEHICLE" => Some(ReportType::WrongVehicle),
            "DANGEROUS_DRIVING" => Some(ReportType::DangerousDriving),
            "OTHER" => Some(ReportType::Other),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReportStatus {
    Pending,
    Investigating,
    Resolved,
    Closed,
}

impl ReportStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportStatus::Pending => "PENDING",
            ReportStatus::Investigating => "INVESTIGATING",
            ReportStatus::Resolved => "RESOLVED",
            ReportStatus::Closed => "CLOSED",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "PENDING" => Some(ReportStatus::Pending),
            "INVESTIGATING" => Some(ReportStatus::Investigating),
            "RESOLVED" => Some(ReportStatus::Resolved),
            "CLOSED" => Some(ReportStatus::Closed),
            _ => None,
        }
    }
}

/// An incident filed by a ride participant against the counterparty.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RideReport {
    pub id: Uuid,
    pub ride_id: Uuid,
    pub reporter_id: Uuid,
    pub reported_user_id: Uuid,
    pub report_type: ReportType,
    pub description: String,
    pub status: ReportStatus,
    pub is_anonymous: bool,
    pub requires_immediate_action: bool,
    pub admin_notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl RideReport {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        ride_id: Uuid,
        reporter_id: Uuid,
        reported_user_id: Uuid,
        report_type: ReportType,
        description: String,
        is_anonymous: bool,
        requires_immediate_action: bool,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            ride_id,
            reporter_id,
            reported_user_id,
            report_type,
            description,
            status: ReportStatus::Pending,
            is_anonymous,
            requires_immediate_action,
            admin_notes: None,
            created_at: now,
            updated_at: now,
        }
    }
}
