use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use triq_core::repository::RideRepository;
use triq_core::search::{RideFilter, RidePage, DEFAULT_PAGE_SIZE};
use triq_rides::{Ride, RideStatus};

pub struct StoreRideRepository {
    pool: PgPool,
}

impl StoreRideRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// Internal struct for type-safe querying
#[derive(sqlx::FromRow)]
struct RideRow {
    id: Uuid,
    driver_id: Uuid,
    vehicle_id: Option<Uuid>,
    departure_city: String,
    arrival_city: String,
    departure_date: NaiveDate,
    departure_time: NaiveTime,
    distance_km: i32,
    price_cents: i32,
    driver_share_cents: i32,
    platform_share_cents: i32,
    total_seats: i32,
    available_seats: i32,
    description: Option<String>,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl RideRow {
    fn into_ride(self) -> Result<Ride, Box<dyn std::error::Error + Send + Sync>> {
        let status = RideStatus::parse(&self.status)
            .ok_or_else(|| format!("unknown ride status: {}", self.status))?;
        Ok(Ride {
            id: self.id,
            driver_id: self.driver_id,
            vehicle_id: self.vehicle_id,
            departure_city: self.departure_city,
            arrival_city: self.arrival_city,
            departure_date: self.departure_date,
            departure_time: self.departure_time,
            distance_km: self.distance_km,
            price_cents: self.price_cents,
            driver_share_cents: self.driver_share_cents,
            platform_share_cents: self.platform_share_cents,
            total_seats: self.total_seats,
            available_seats: self.available_seats,
            description: self.description,
            status,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

const RIDE_COLUMNS: &str = "id, driver_id, vehicle_id, departure_city, arrival_city, \
     departure_date, departure_time, distance_km, price_cents, driver_share_cents, \
     platform_share_cents, total_seats, available_seats, description, status, \
     created_at, updated_at";

#[async_trait]
impl RideRepository for StoreRideRepository {
    async fn create_ride(
        &self,
        ride: &Ride,
    ) -> Result<Uuid, Box<dyn std::error::Error + Send + Sync>> {
        sqlx::query(
            r#"
            INSERT INTO rides (id, driver_id, vehicle_id, departure_city, arrival_city,
                departure_date, departure_time, distance_km, price_cents, driver_share_cents,
                platform_share_cents, total_seats, available_seats, description, status,
                created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
            "#,
        )
        .bind(ride.id)
        .bind(ride.driver_id)
        .bind(ride.vehicle_id)
        .bind(&ride.departure_city)
        .bind(&ride.arrival_city)
        .bind(ride.departure_date)
        .bind(ride.departure_time)
        .bind(ride.distance_km)
        .bind(ride.price_cents)
        .bind(ride.driver_share_cents)
        .bind(ride.platform_share_cents)
        .bind(ride.total_seats)
        .bind(ride.available_seats)
        .bind(&ride.description)
        .bind(ride.status.as_str())
        .bind(ride.created_at)
        .bind(ride.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(ride.id)
    }

    async fn get_ride(
        &self,
        id: Uuid,
    ) -> Result<Option<Ride>, Box<dyn std::error::Error + Send + Sync>> {
        let row: Option<RideRow> =
            sqlx::query_as(&format!("SELECT {} FROM rides WHERE id = $1", RIDE_COLUMNS))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        row.map(RideRow::into_ride).transpose()
    }

    async fn search_rides(
        &self,
        filter: &RideFilter,
        today: NaiveDate,
    ) -> Result<RidePage, Box<dyn std::error::Error + Send + Sync>> {
        // Optional filters collapse to TRUE when unset; city matching is a
        // case-insensitive substring, like the original search form.
        let where_clause = "
            status = 'CONFIRMED'
            AND departure_date >= $1
            AND ($2::text IS NULL OR departure_city ILIKE '%' || $2 || '%')
            AND ($3::text IS NULL OR arrival_city ILIKE '%' || $3 || '%')
            AND ($4::date IS NULL OR departure_date = $4)";

        let total: (i64,) = sqlx::query_as(&format!(
            "SELECT COUNT(*) FROM rides WHERE {}",
            where_clause
        ))
        .bind(today)
        .bind(&filter.departure)
        .bind(&filter.arrival)
        .bind(filter.date)
        .fetch_one(&self.pool)
        .await?;

        let rows: Vec<RideRow> = sqlx::query_as(&format!(
            "SELECT {} FROM rides WHERE {} ORDER BY departure_date, departure_time LIMIT $5 OFFSET $6",
            RIDE_COLUMNS, where_clause
        ))
        .bind(today)
        .bind(&filter.departure)
        .bind(&filter.arrival)
        .bind(filter.date)
        .bind(DEFAULT_PAGE_SIZE as i64)
        .bind(filter.offset())
        .fetch_all(&self.pool)
        .await?;

        let rides = rows
            .into_iter()
            .map(RideRow::into_ride)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(RidePage {
            rides,
            page: filter.page(),
            per_page: DEFAULT_PAGE_SIZE,
            total: total.0,
        })
    }

    async fn list_by_driver(
        &self,
        driver_id: Uuid,
    ) -> Result<Vec<Ride>, Box<dyn std::error::Error + Send + Sync>> {
        let rows: Vec<RideRow> = sqlx::query_as(&format!(
            "SELECT {} FROM rides WHERE driver_id = $1 ORDER BY departure_date DESC, departure_time DESC",
            RIDE_COLUMNS
        ))
        .bind(driver_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(RideRow::into_ride).collect()
    }

    async fn update_status(
        &self,
        id: Uuid,
        status: RideStatus,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        sqlx::query("UPDATE rides SET status = $1, updated_at = NOW() WHERE id = $2")
            .bind(status.as_str())
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn delete_ride(&self, id: Uuid) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        sqlx::query("DELETE FROM rides WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn count_future_rides_for_vehicle(
        &self,
        vehicle_id: Uuid,
        today: NaiveDate,
    ) -> Result<i64, Box<dyn std::error::Error + Send + Sync>> {
        let count: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM rides WHERE vehicle_id = $1 AND departure_date >= $2 AND status NOT IN ('CANCELLED', 'COMPLETED')",
        )
        .bind(vehicle_id)
        .bind(today)
        .fetch_one(&self.pool)
        .await?;

        Ok(count.0)
    }

    async fn complete_departed(
        &self,
        today: NaiveDate,
    ) -> Result<Vec<Uuid>, Box<dyn std::error::Error + Send + Sync>> {
        let rows: Vec<(Uuid,)> = sqlx::query_as(
            r#"
            UPDATE rides
            SET status = 'COMPLETED', updated_at = NOW()
            WHERE departure_date < $1 AND status IN ('CONFIRMED', 'IN_PROGRESS')
            RETURNING id
            "#,
        )
        .bind(today)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|(id,)| id).collect())
    }
}
