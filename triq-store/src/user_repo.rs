use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use triq_core::identity::{Profile, Role, User};
use triq_core::repository::UserRepository;

pub struct StoreUserRepository {
    pool: PgPool,
}

impl StoreUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    email: String,
    password_digest: String,
    display_name: String,
    role: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl UserRow {
    fn into_user(self) -> Result<User, Box<dyn std::error::Error + Send + Sync>> {
        let role =
            Role::parse(&self.role).ok_or_else(|| format!("unknown role: {}", self.role))?;
        Ok(User {
            id: self.id,
            email: self.email,
            password_digest: self.password_digest,
            display_name: self.display_name,
            role,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct ProfileRow {
    user_id: Uuid,
    phone: Option<String>,
    bio: Option<String>,
    rating: f64,
    number_of_ratings: i32,
    is_verified: bool,
}

const USER_COLUMNS: &str =
    "id, email, password_digest, display_name, role, created_at, updated_at";

#[async_trait]
impl UserRepository for StoreUserRepository {
    async fn create_user(
        &self,
        user: &User,
        profile: &Profile,
    ) -> Result<Uuid, Box<dyn std::error::Error + Send + Sync>> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO users (id, email, password_digest, display_name, role, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(user.id)
        .bind(&user.email)
        .bind(&user.password_digest)
        .bind(&user.display_name)
        .bind(user.role.as_str())
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO profiles (user_id, phone, bio, rating, number_of_ratings, is_verified)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(profile.user_id)
        .bind(&profile.phone)
        .bind(&profile.bio)
        .bind(profile.rating)
        .bind(profile.number_of_ratings)
        .bind(profile.is_verified)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(user.id)
    }

    async fn get_user(
        &self,
        id: Uuid,
    ) -> Result<Option<User>, Box<dyn std::error::Error + Send + Sync>> {
        let row: Option<UserRow> =
            sqlx::query_as(&format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        row.map(UserRow::into_user).transpose()
    }

    async fn find_by_email(
        &self,
        email: &str,
    ) -> Result<Option<User>, Box<dyn std::error::Error + Send + Sync>> {
        let row: Option<UserRow> = sqlx::query_as(&format!(
            "SELECT {} FROM users WHERE LOWER(email) = LOWER($1)",
            USER_COLUMNS
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        row.map(UserRow::into_user).transpose()
    }

    async fn get_profile(
        &self,
        user_id: Uuid,
    ) -> Result<Option<Profile>, Box<dyn std::error::Error + Send + Sync>> {
        let row: Option<ProfileRow> = sqlx::query_as(
            "SELECT user_id, phone, bio, rating, number_of_ratings, is_verified \
             FROM profiles WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| Profile {
            user_id: r.user_id,
            phone: r.phone,
            bio: r.bio,
            rating: r.rating,
            number_of_ratings: r.number_of_ratings,
            is_verified: r.is_verified,
        }))
    }

    async fn update_profile(
        &self,
        profile: &Profile,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        sqlx::query(
            "UPDATE profiles SET phone = $1, bio = $2, is_verified = $3 WHERE user_id = $4",
        )
        .bind(&profile.phone)
        .bind(&profile.bio)
        .bind(profile.is_verified)
        .bind(profile.user_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn update_rating_aggregate(
        &self,
        user_id: Uuid,
        average: f64,
        count: i32,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        sqlx::query("UPDATE profiles SET rating = $1, number_of_ratings = $2 WHERE user_id = $3")
            .bind(average)
            .bind(count)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
