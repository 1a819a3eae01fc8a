use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use triq_booking::{ReportStatus, ReportType, RideReport};
use triq_core::repository::ReportRepository;

pub struct StoreReportRepository {
    pool: PgPool,
}

impl StoreReportRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct ReportRow {
    id: Uuid,
    ride_id: Uuid,
    reporter_id: Uuid,
    reported_user_id: Uuid,
    report_type: String,
    description: String,
    status: String,
    is_anonymous: bool,
    requires_immediate_action: bool,
    admin_notes: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ReportRow {
    fn into_report(self) -> Result<RideReport, Box<dyn std::error::Error + Send + Sync>> {
        let report_type = ReportType::parse(&self.report_type)
            .ok_or_else(|| format!("unknown report type: {}", self.report_type))?;
        let status = ReportStatus::parse(&self.status)
            .ok_or_else(|| format!("unknown report status: {}", self.status))?;
        Ok(RideReport {
            id: self.id,
            ride_id: self.ride_id,
            reporter_id: self.reporter_id,
            reported_user_id: self.reported_user_id,
            report_type,
            description: self.description,
            status,
            is_anonymous: self.is_anonymous,
            requires_immediate_action: self.requires_immediate_action,
            admin_notes: self.admin_notes,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

const REPORT_COLUMNS: &str = "id, ride_id, reporter_id, reported_user_id, report_type, \
     description, status, is_anonymous, requires_immediate_action, admin_notes, \
     created_at, updated_at";

#[async_trait]
impl ReportRepository for StoreReportRepository {
    async fn insert_report(
        &self,
        report: &RideReport,
    ) -> Result<Uuid, Box<dyn std::error::Error + Send + Sync>> {
        sqlx::query(
            r#"
            INSERT INTO ride_reports (id, ride_id, reporter_id, reported_user_id, report_type,
                description, status, is_anonymous, requires_immediate_action, admin_notes,
                created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(report.id)
        .bind(report.ride_id)
        .bind(report.reporter_id)
        .bind(report.reported_user_id)
        .bind(report.report_type.as_str())
        .bind(&report.description)
        .bind(report.status.as_str())
        .bind(report.is_anonymous)
        .bind(report.requires_immediate_action)
        .bind(&report.admin_notes)
        .bind(report.created_at)
        .bind(report.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(report.id)
    }

    async fn list_made_by(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<RideReport>, Box<dyn std::error::Error + Send + Sync>> {
        let rows: Vec<ReportRow> = sqlx::query_as(&format!(
            "SELECT {} FROM ride_reports WHERE reporter_id = $1 ORDER BY created_at DESC",
            REPORT_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(ReportRow::into_report).collect()
    }

    async fn list_received_by(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<RideReport>, Box<dyn std::error::Error + Send + Sync>> {
        let rows: Vec<ReportRow> = sqlx::query_as(&format!(
            "SELECT {} FROM ride_reports WHERE reported_user_id = $1 ORDER BY created_at DESC",
            REPORT_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(ReportRow::into_report).collect()
    }
}
