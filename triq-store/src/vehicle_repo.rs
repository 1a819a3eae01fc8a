use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use triq_core::repository::VehicleRepository;
use triq_rides::Vehicle;

pub struct StoreVehicleRepository {
    pool: PgPool,
}

impl StoreVehicleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct VehicleRow {
    id: Uuid,
    driver_id: Uuid,
    brand: String,
    model: String,
    color: String,
    license_plate: String,
    number_of_seats: i32,
    comfort_features: Option<String>,
}

impl From<VehicleRow> for Vehicle {
    fn from(row: VehicleRow) -> Self {
        Vehicle {
            id: row.id,
            driver_id: row.driver_id,
            brand: row.brand,
            model: row.model,
            color: row.color,
            license_plate: row.license_plate,
            number_of_seats: row.number_of_seats,
            comfort_features: row.comfort_features,
        }
    }
}

const VEHICLE_COLUMNS: &str =
    "id, driver_id, brand, model, color, license_plate, number_of_seats, comfort_features";

#[async_trait]
impl VehicleRepository for StoreVehicleRepository {
    async fn create_vehicle(
        &self,
        vehicle: &Vehicle,
    ) -> Result<Uuid, Box<dyn std::error::Error + Send + Sync>> {
        sqlx::query(
            r#"
            INSERT INTO vehicles (id, driver_id, brand, model, color, license_plate, number_of_seats, comfort_features)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(vehicle.id)
        .bind(vehicle.driver_id)
        .bind(&vehicle.brand)
        .bind(&vehicle.model)
        .bind(&vehicle.color)
        .bind(&vehicle.license_plate)
        .bind(vehicle.number_of_seats)
        .bind(&vehicle.comfort_features)
        .execute(&self.pool)
        .await?;

        Ok(vehicle.id)
    }

    async fn get_vehicle(
        &self,
        id: Uuid,
    ) -> Result<Option<Vehicle>, Box<dyn std::error::Error + Send + Sync>> {
        let row: Option<VehicleRow> = sqlx::query_as(&format!(
            "SELECT {} FROM vehicles WHERE id = $1",
            VEHICLE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Vehicle::from))
    }

    async fn list_vehicles(
        &self,
        driver_id: Uuid,
    ) -> Result<Vec<Vehicle>, Box<dyn std::error::Error + Send + Sync>> {
        let rows: Vec<VehicleRow> = sqlx::query_as(&format!(
            "SELECT {} FROM vehicles WHERE driver_id = $1 ORDER BY brand, model",
            VEHICLE_COLUMNS
        ))
        .bind(driver_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Vehicle::from).collect())
    }

    async fn update_vehicle(
        &self,
        vehicle: &Vehicle,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        sqlx::query(
            r#"
            UPDATE vehicles
            SET brand = $1, model = $2, color = $3, license_plate = $4,
                number_of_seats = $5, comfort_features = $6
            WHERE id = $7
            "#,
        )
        .bind(&vehicle.brand)
        .bind(&vehicle.model)
        .bind(&vehicle.color)
        .bind(&vehicle.license_plate)
        .bind(vehicle.number_of_seats)
        .bind(&vehicle.comfort_features)
        .bind(vehicle.id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete_vehicle(
        &self,
        id: Uuid,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        sqlx::query("DELETE FROM vehicles WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
