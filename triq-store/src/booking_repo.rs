use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use triq_booking::{Booking, BookingStatus};
use triq_core::repository::BookingRepository;

pub struct StoreBookingRepository {
    pool: PgPool,
}

impl StoreBookingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct BookingRow {
    id: Uuid,
    ride_id: Uuid,
    passenger_id: Uuid,
    seats: i32,
    message: Option<String>,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl BookingRow {
    fn into_booking(self) -> Result<Booking, Box<dyn std::error::Error + Send + Sync>> {
        let status = BookingStatus::parse(&self.status)
            .ok_or_else(|| format!("unknown booking status: {}", self.status))?;
        Ok(Booking {
            id: self.id,
            ride_id: self.ride_id,
            passenger_id: self.passenger_id,
            seats: self.seats,
            message: self.message,
            status,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

const BOOKING_COLUMNS: &str =
    "id, ride_id, passenger_id, seats, message, status, created_at, updated_at";

#[async_trait]
impl BookingRepository for StoreBookingRepository {
    async fn create_booking(
        &self,
        booking: &Booking,
    ) -> Result<Uuid, Box<dyn std::error::Error + Send + Sync>> {
        sqlx::query(
            r#"
            INSERT INTO bookings (id, ride_id, passenger_id, seats, message, status, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(booking.id)
        .bind(booking.ride_id)
        .bind(booking.passenger_id)
        .bind(booking.seats)
        .bind(&booking.message)
        .bind(booking.status.as_str())
        .bind(booking.created_at)
        .bind(booking.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(booking.id)
    }

    async fn get_booking(
        &self,
        id: Uuid,
    ) -> Result<Option<Booking>, Box<dyn std::error::Error + Send + Sync>> {
        let row: Option<BookingRow> = sqlx::query_as(&format!(
            "SELECT {} FROM bookings WHERE id = $1",
            BOOKING_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(BookingRow::into_booking).transpose()
    }

    async fn find_for_ride_and_passenger(
        &self,
        ride_id: Uuid,
        passenger_id: Uuid,
    ) -> Result<Option<Booking>, Box<dyn std::error::Error + Send + Sync>> {
        let row: Option<BookingRow> = sqlx::query_as(&format!(
            "SELECT {} FROM bookings WHERE ride_id = $1 AND passenger_id = $2",
            BOOKING_COLUMNS
        ))
        .bind(ride_id)
        .bind(passenger_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(BookingRow::into_booking).transpose()
    }

    async fn list_by_passenger(
        &self,
        passenger_id: Uuid,
    ) -> Result<Vec<Booking>, Box<dyn std::error::Error + Send + Sync>> {
        let rows: Vec<BookingRow> = sqlx::query_as(&format!(
            "SELECT {} FROM bookings WHERE passenger_id = $1 ORDER BY created_at DESC",
            BOOKING_COLUMNS
        ))
        .bind(passenger_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(BookingRow::into_booking).collect()
    }

    async fn list_pending_for_driver(
        &self,
        driver_id: Uuid,
    ) -> Result<Vec<Booking>, Box<dyn std::error::Error + Send + Sync>> {
        let rows: Vec<BookingRow> = sqlx::query_as(
            r#"
            SELECT b.id, b.ride_id, b.passenger_id, b.seats, b.message, b.status,
                   b.created_at, b.updated_at
            FROM bookings b
            JOIN rides r ON r.id = b.ride_id
            WHERE r.driver_id = $1 AND b.status = 'PENDING'
            ORDER BY r.departure_date, r.departure_time
            "#,
        )
        .bind(driver_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(BookingRow::into_booking).collect()
    }

    async fn confirm_booking(
        &self,
        id: Uuid,
    ) -> Result<Option<i32>, Box<dyn std::error::Error + Send + Sync>> {
        let mut tx = self.pool.begin().await?;

        let booking: Option<(Uuid, i32, String)> = sqlx::query_as(
            "SELECT ride_id, seats, status FROM bookings WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

        let (ride_id, seats, status) = booking.ok_or_else(|| format!("booking {} not found", id))?;
        if status != "PENDING" {
            return Err(format!("booking {} is not pending (status {})", id, status).into());
        }

        // Row-level guard: the decrement only lands when enough seats remain
        // on a confirmed ride.
        let remaining: Option<(i32,)> = sqlx::query_as(
            r#"
            UPDATE rides
            SET available_seats = available_seats - $1, updated_at = NOW()
            WHERE id = $2 AND status = 'CONFIRMED' AND available_seats >= $1
            RETURNING available_seats
            "#,
        )
        .bind(seats)
        .bind(ride_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some((remaining,)) = remaining else {
            tx.rollback().await?;
            return Ok(None);
        };

        sqlx::query("UPDATE bookings SET status = 'CONFIRMED', updated_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some(remaining))
    }

    async fn cancel_booking(
        &self,
        id: Uuid,
        to: BookingStatus,
    ) -> Result<Option<i32>, Box<dyn std::error::Error + Send + Sync>> {
        if !matches!(
            to,
            BookingStatus::CancelledByPassenger | BookingStatus::CancelledByDriver
        ) {
            return Err(format!("{} is not a cancellation status", to.as_str()).into());
        }

        let mut tx = self.pool.begin().await?;

        let booking: Option<(Uuid, i32, String)> = sqlx::query_as(
            "SELECT ride_id, seats, status FROM bookings WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

        let (ride_id, seats, status) = booking.ok_or_else(|| format!("booking {} not found", id))?;

        let restored = match status.as_str() {
            "PENDING" => None,
            "CONFIRMED" => {
                // Restore seats, capped at capacity.
                let row: (i32,) = sqlx::query_as(
                    r#"
                    UPDATE rides
                    SET available_seats = LEAST(available_seats + $1, total_seats), updated_at = NOW()
                    WHERE id = $2
                    RETURNING available_seats
                    "#,
                )
                .bind(seats)
                .bind(ride_id)
                .fetch_one(&mut *tx)
                .await?;
                Some(row.0)
            }
            other => {
                return Err(format!("booking {} cannot be cancelled from {}", id, other).into());
            }
        };

        sqlx::query("UPDATE bookings SET status = $1, updated_at = NOW() WHERE id = $2")
            .bind(to.as_str())
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(restored)
    }

    async fn update_status(
        &self,
        id: Uuid,
        status: BookingStatus,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        sqlx::query("UPDATE bookings SET status = $1, updated_at = NOW() WHERE id = $2")
            .bind(status.as_str())
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn complete_for_ride(
        &self,
        ride_id: Uuid,
    ) -> Result<u64, Box<dyn std::error::Error + Send + Sync>> {
        let result = sqlx::query(
            "UPDATE bookings SET status = 'COMPLETED', updated_at = NOW() WHERE ride_id = $1 AND status = 'CONFIRMED'",
        )
        .bind(ride_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}
