use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use triq_booking::{Rating, RatingCriterion};
use triq_core::repository::RatingRepository;

pub struct StoreRatingRepository {
    pool: PgPool,
}

impl StoreRatingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct RatingRow {
    id: Uuid,
    from_user_id: Uuid,
    to_user_id: Uuid,
    ride_id: Uuid,
    criterion: String,
    score: i32,
    comment: Option<String>,
    is_anonymous: bool,
    created_at: DateTime<Utc>,
}

impl RatingRow {
    fn into_rating(self) -> Result<Rating, Box<dyn std::error::Error + Send + Sync>> {
        let criterion = RatingCriterion::parse(&self.criterion)
            .ok_or_else(|| format!("unknown rating criterion: {}", self.criterion))?;
        Ok(Rating {
            id: self.id,
            from_user_id: self.from_user_id,
            to_user_id: self.to_user_id,
            ride_id: self.ride_id,
            criterion,
            score: self.score,
            comment: self.comment,
            is_anonymous: self.is_anonymous,
            created_at: self.created_at,
        })
    }
}

#[async_trait]
impl RatingRepository for StoreRatingRepository {
    async fn insert_rating(
        &self,
        rating: &Rating,
    ) -> Result<bool, Box<dyn std::error::Error + Send + Sync>> {
        // The composite unique index enforces one score per
        // (rater, ratee, ride, criterion); ON CONFLICT keeps the first one.
        let result = sqlx::query(
            r#"
            INSERT INTO ratings (id, from_user_id, to_user_id, ride_id, criterion, score,
                comment, is_anonymous, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (from_user_id, to_user_id, ride_id, criterion) DO NOTHING
            "#,
        )
        .bind(rating.id)
        .bind(rating.from_user_id)
        .bind(rating.to_user_id)
        .bind(rating.ride_id)
        .bind(rating.criterion.as_str())
        .bind(rating.score)
        .bind(&rating.comment)
        .bind(rating.is_anonymous)
        .bind(rating.created_at)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn list_received(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<Rating>, Box<dyn std::error::Error + Send + Sync>> {
        let rows: Vec<RatingRow> = sqlx::query_as(
            "SELECT id, from_user_id, to_user_id, ride_id, criterion, score, comment, \
             is_anonymous, created_at FROM ratings WHERE to_user_id = $1 ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(RatingRow::into_rating).collect()
    }

    async fn scores_for(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<i32>, Box<dyn std::error::Error + Send + Sync>> {
        let rows: Vec<(i32,)> = sqlx::query_as("SELECT score FROM ratings WHERE to_user_id = $1")
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(|(s,)| s).collect())
    }
}
