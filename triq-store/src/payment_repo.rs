use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use triq_booking::{DriverPayout, PaymentStatus, PaymentTransaction, PlatformFee};
use triq_core::repository::PaymentRepository;

pub struct StorePaymentRepository {
    pool: PgPool,
}

impl StorePaymentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct PaymentRow {
    id: Uuid,
    booking_id: Uuid,
    amount_cents: i32,
    status: String,
    validation_code: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl PaymentRow {
    fn into_payment(self) -> Result<PaymentTransaction, Box<dyn std::error::Error + Send + Sync>> {
        let status = PaymentStatus::parse(&self.status)
            .ok_or_else(|| format!("unknown payment status: {}", self.status))?;
        Ok(PaymentTransaction {
            id: self.id,
            booking_id: self.booking_id,
            amount_cents: self.amount_cents,
            status,
            validation_code: self.validation_code,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[async_trait]
impl PaymentRepository for StorePaymentRepository {
    async fn create_payment(
        &self,
        payment: &PaymentTransaction,
    ) -> Result<Uuid, Box<dyn std::error::Error + Send + Sync>> {
        sqlx::query(
            r#"
            INSERT INTO payment_transactions (id, booking_id, amount_cents, status, validation_code, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(payment.id)
        .bind(payment.booking_id)
        .bind(payment.amount_cents)
        .bind(payment.status.as_str())
        .bind(&payment.validation_code)
        .bind(payment.created_at)
        .bind(payment.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(payment.id)
    }

    async fn get_by_booking(
        &self,
        booking_id: Uuid,
    ) -> Result<Option<PaymentTransaction>, Box<dyn std::error::Error + Send + Sync>> {
        let row: Option<PaymentRow> = sqlx::query_as(
            "SELECT id, booking_id, amount_cents, status, validation_code, created_at, updated_at \
             FROM payment_transactions WHERE booking_id = $1",
        )
        .bind(booking_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(PaymentRow::into_payment).transpose()
    }

    async fn update_payment(
        &self,
        payment: &PaymentTransaction,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        sqlx::query(
            "UPDATE payment_transactions SET status = $1, validation_code = $2, updated_at = NOW() WHERE id = $3",
        )
        .bind(payment.status.as_str())
        .bind(&payment.validation_code)
        .bind(payment.id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn settle(
        &self,
        payment: &PaymentTransaction,
        payout: &DriverPayout,
        fee: &PlatformFee,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "UPDATE payment_transactions SET status = $1, updated_at = NOW() WHERE id = $2",
        )
        .bind(payment.status.as_str())
        .bind(payment.id)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO driver_payouts (id, payment_id, driver_id, amount_cents, is_paid, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(payout.id)
        .bind(payout.payment_id)
        .bind(payout.driver_id)
        .bind(payout.amount_cents)
        .bind(payout.is_paid)
        .bind(payout.created_at)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO platform_fees (id, payment_id, amount_cents, created_at)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(fee.id)
        .bind(fee.payment_id)
        .bind(fee.amount_cents)
        .bind(fee.created_at)
        .execute(&mut *tx)
        .await?;

        sqlx::query("UPDATE bookings SET status = 'COMPLETED', updated_at = NOW() WHERE id = $1")
            .bind(payment.booking_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }
}
