use sqlx::postgres::PgPoolOptions;
use sqlx::{Pool, Postgres};
use std::time::Duration;
use tracing::info;

use crate::app_config::BusinessRules;

#[derive(Clone)]
pub struct DbClient {
    pub pool: Pool<Postgres>,
}

#[derive(sqlx::FromRow)]
struct RuleRow {
    rule_key: String,
    rule_value: serde_json::Value,
}

impl DbClient {
    pub async fn new(connection_string: &str) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(connection_string)
            .await?;

        Ok(Self { pool })
    }

    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        info!("Running database migrations...");
        sqlx::migrate!("../migrations").run(&self.pool).await?;
        info!("Migrations completed successfully.");
        Ok(())
    }

    /// Overlay operator-set values from the business_rules table onto the
    /// config-file defaults. Rows look like: {"value": <number>}.
    pub async fn fetch_business_rules(
        &self,
        defaults: BusinessRules,
    ) -> Result<BusinessRules, sqlx::Error> {
        let rows: Vec<RuleRow> =
            sqlx::query_as("SELECT rule_key, rule_value FROM business_rules")
                .fetch_all(&self.pool)
                .await?;

        let mut rules = defaults;

        for row in rows {
            let Some(v) = row.rule_value.get("value") else {
                continue;
            };
            match row.rule_key.as_str() {
                "price_per_km_cents" => {
                    if let Some(n) = v.as_i64() {
                        rules.price_per_km_cents = n as i32;
                    }
                }
                "min_price_cents" => {
                    if let Some(n) = v.as_i64() {
                        rules.min_price_cents = n as i32;
                    }
                }
                "driver_share_percent" => {
                    if let Some(n) = v.as_i64() {
                        rules.driver_share_percent = n as i32;
                    }
                }
                "platform_share_percent" => {
                    if let Some(n) = v.as_i64() {
                        rules.platform_share_percent = n as i32;
                    }
                }
                "rate_limit_per_minute" => {
                    if let Some(n) = v.as_i64() {
                        rules.rate_limit_per_minute = n;
                    }
                }
                _ => {}
            }
        }

        Ok(rules)
    }
}
