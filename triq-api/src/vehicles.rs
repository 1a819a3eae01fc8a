use axum::{
    extract::{Path, State},
    Extension, Json,
};
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppError;
use crate::middleware::auth::Claims;
use crate::state::AppState;
use triq_rides::Vehicle;

#[derive(Debug, Deserialize)]
pub struct VehicleRequest {
    pub brand: String,
    pub model: String,
    pub color: String,
    pub license_plate: String,
    pub number_of_seats: i32,
    pub comfort_features: Option<String>,
}

/// GET /v1/vehicles
pub async fn list_vehicles(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Vec<Vehicle>>, AppError> {
    claims.require_driver()?;
    let vehicles = state
        .vehicle_repo
        .list_vehicles(claims.user_id()?)
        .await
        .map_err(AppError::internal)?;
    Ok(Json(vehicles))
}

/// POST /v1/vehicles
pub async fn create_vehicle(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<VehicleRequest>,
) -> Result<Json<Vehicle>, AppError> {
    claims.require_driver()?;
    if req.number_of_seats < 1 {
        return Err(AppError::ValidationError(
            "A vehicle needs at least one seat".to_string(),
        ));
    }

    let vehicle = Vehicle {
        id: Uuid::new_v4(),
        driver_id: claims.user_id()?,
        brand: req.brand,
        model: req.model,
        color: req.color,
        license_plate: req.license_plate,
        number_of_seats: req.number_of_seats,
        comfort_features: req.comfort_features,
    };

    state
        .vehicle_repo
        .create_vehicle(&vehicle)
        .await
        .map_err(AppError::internal)?;

    Ok(Json(vehicle))
}

/// PUT /v1/vehicles/:id
pub async fn update_vehicle(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(vehicle_id): Path<Uuid>,
    Json(req): Json<VehicleRequest>,
) -> Result<Json<Vehicle>, AppError> {
    let existing = fetch_owned_vehicle(&state, vehicle_id, &claims).await?;

    if req.number_of_seats < 1 {
        return Err(AppError::ValidationError(
            "A vehicle needs at least one seat".to_string(),
        ));
    }

    let vehicle = Vehicle {
        id: existing.id,
        driver_id: existing.driver_id,
        brand: req.brand,
        model: req.model,
        color: req.color,
        license_plate: req.license_plate,
        number_of_seats: req.number_of_seats,
        comfort_features: req.comfort_features,
    };

    state
        .vehicle_repo
        .update_vehicle(&vehicle)
        .await
        .map_err(AppError::internal)?;

    Ok(Json(vehicle))
}

/// DELETE /v1/vehicles/:id
/// Refused while a future ride still references the vehicle.
pub async fn delete_vehicle(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(vehicle_id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    let vehicle = fetch_owned_vehicle(&state, vehicle_id, &claims).await?;

    let future_rides = state
        .ride_repo
        .count_future_rides_for_vehicle(vehicle.id, Utc::now().date_naive())
        .await
        .map_err(AppError::internal)?;
    if future_rides > 0 {
        return Err(AppError::ConflictError(
            "This vehicle is attached to upcoming rides".to_string(),
        ));
    }

    state
        .vehicle_repo
        .delete_vehicle(vehicle.id)
        .await
        .map_err(AppError::internal)?;

    Ok(Json(serde_json::json!({ "deleted": vehicle.id })))
}

async fn fetch_owned_vehicle(
    state: &AppState,
    vehicle_id: Uuid,
    claims: &Claims,
) -> Result<Vehicle, AppError> {
    claims.require_driver()?;
    let vehicle = state
        .vehicle_repo
        .get_vehicle(vehicle_id)
        .await
        .map_err(AppError::internal)?
        .ok_or_else(|| AppError::NotFoundError("Vehicle not found".to_string()))?;

    if vehicle.driver_id != claims.user_id()? {
        return Err(AppError::AuthorizationError(
            "This vehicle is not yours".to_string(),
        ));
    }
    Ok(vehicle)
}
