use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;
use crate::middleware::auth::Claims;
use crate::rides::fetch_ride;
use crate::state::AppState;
use triq_booking::{ReportType, RideReport};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct CreateReportRequest {
    pub report_type: String,
    pub description: String,
    /// Required when the driver files the report; defaults to the driver when
    /// a passenger files it.
    pub reported_user_id: Option<Uuid>,
    #[serde(default)]
    pub is_anonymous: bool,
    #[serde(default)]
    pub requires_immediate_action: bool,
}

#[derive(Debug, Serialize)]
pub struct ReportCreatedResponse {
    pub report_id: Uuid,
    pub status: String,
}

#[derive(Debug, Serialize)]
pub struct ReportOverviewResponse {
    pub made: Vec<RideReport>,
    pub received: Vec<RideReport>,
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /v1/rides/:id/reports
/// A ride participant files an incident against the counterparty. Urgent
/// reports notify the platform admins right away.
pub async fn create_report(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(ride_id): Path<Uuid>,
    Json(req): Json<CreateReportRequest>,
) -> Result<Json<ReportCreatedResponse>, AppError> {
    let reporter_id = claims.user_id()?;
    let ride = fetch_ride(&state, ride_id).await?;

    let report_type = ReportType::parse(&req.report_type).ok_or_else(|| {
        AppError::ValidationError(format!("Unknown report type: {}", req.report_type))
    })?;
    if req.description.trim().is_empty() {
        return Err(AppError::ValidationError(
            "A description is required".to_string(),
        ));
    }

    let reported_user_id = if reporter_id == ride.driver_id {
        // Drivers must name the passenger, and that passenger must actually
        // have a booking on the ride.
        let reported = req.reported_user_id.ok_or_else(|| {
            AppError::ValidationError("reported_user_id is required".to_string())
        })?;
        let booking = state
            .booking_repo
            .find_for_ride_and_passenger(ride_id, reported)
            .await
            .map_err(AppError::internal)?;
        if booking.is_none() {
            return Err(AppError::ValidationError(
                "The reported user has no booking on this ride".to_string(),
            ));
        }
        reported
    } else {
        // Passengers must hold a booking themselves; the report targets the driver.
        let booking = state
            .booking_repo
            .find_for_ride_and_passenger(ride_id, reporter_id)
            .await
            .map_err(AppError::internal)?;
        if booking.is_none() {
            return Err(AppError::AuthorizationError(
                "You did not take part in this ride".to_string(),
            ));
        }
        ride.driver_id
    };

    let report = RideReport::new(
        ride_id,
        reporter_id,
        reported_user_id,
        report_type,
        req.description,
        req.is_anonymous,
        req.requires_immediate_action,
    );

    state
        .report_repo
        .insert_report(&report)
        .await
        .map_err(AppError::internal)?;

    if report.requires_immediate_action {
        let body = urgent_report_email_body(&report, &ride.departure_city, &ride.arrival_city);
        for admin in &state.admin_emails {
            let _ = state
                .mailer
                .send(admin, "[URGENT] New ride report requires action", &body)
                .await;
        }
        tracing::warn!("Urgent report filed: {} on ride {}", report.id, ride_id);
    }

    Ok(Json(ReportCreatedResponse {
        report_id: report.id,
        status: report.status.as_str().to_string(),
    }))
}

/// GET /v1/reports
/// Reports the caller filed and reports filed against them.
pub async fn list_reports(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<ReportOverviewResponse>, AppError> {
    let user_id = claims.user_id()?;

    let made = state
        .report_repo
        .list_made_by(user_id)
        .await
        .map_err(AppError::internal)?;
    let received = state
        .report_repo
        .list_received_by(user_id)
        .await
        .map_err(AppError::internal)?;

    Ok(Json(ReportOverviewResponse { made, received }))
}

// ============================================================================
// Helpers
// ============================================================================

pub(crate) fn urgent_report_email_body(
    report: &RideReport,
    departure: &str,
    arrival: &str,
) -> String {
    format!(
        "A new urgent report has been filed.\n\n\
         Type: {}\n\
         Ride: {} -> {}\n\
         Description: {}\n\n\
         Please handle this report with priority.",
        report.report_type.as_str(),
        departure,
        arrival,
        report.description
    )
}
