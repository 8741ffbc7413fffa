use crate::core::distance::round_to_hundredths;
use crate::models::Review;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Row};
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur when interacting with the review database
#[derive(Debug, Error)]
pub enum ReviewStoreError {
    #[error("SQLx error: {0}")]
    SqlxError(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    MigrateError(#[from] sqlx::migrate::MigrateError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// PostgreSQL store for pantry reviews
///
/// Ratings are aggregated here and joined into pantry records before
/// filtering, so `minRating` sees the same numbers the listing shows.
pub struct ReviewStore {
    pool: PgPool,
}

impl ReviewStore {
    /// Connect and run migrations
    pub async fn new(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
        acquire_timeout: Duration,
        idle_timeout: Duration,
    ) -> Result<Self, ReviewStoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(acquire_timeout)
            .idle_timeout(idle_timeout)
            .test_before_acquire(true)
            .connect(database_url)
            .await?;

        // Run migrations on startup
        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(Self { pool })
    }

    /// Create a review store from optional settings values
    pub async fn from_settings(
        url: &str,
        max_connections: Option<u32>,
        min_connections: Option<u32>,
        acquire_timeout_secs: Option<u64>,
        idle_timeout_secs: Option<u64>,
    ) -> Result<Self, ReviewStoreError> {
        tracing::info!("Connecting to review database");

        Self::new(
            url,
            max_connections.unwrap_or(10),
            min_connections.unwrap_or(1),
            Duration::from_secs(acquire_timeout_secs.unwrap_or(5)),
            Duration::from_secs(idle_timeout_secs.unwrap_or(600)),
        )
        .await
    }

    /// Store a review and return its id
    pub async fn record_review(
        &self,
        pantry_id: &str,
        rating: i16,
        comment: Option<&str>,
    ) -> Result<uuid::Uuid, ReviewStoreError> {
        if !(1..=5).contains(&rating) {
            return Err(ReviewStoreError::InvalidInput(format!(
                "rating must be between 1 and 5, got {}",
                rating
            )));
        }

        let id = uuid::Uuid::new_v4();
        let query = r#"
            INSERT INTO pantry_reviews (id, pantry_id, rating, comment, created_at)
            VALUES ($1, $2, $3, $4, NOW())
        "#;

        sqlx::query(query)
            .bind(id)
            .bind(pantry_id)
            .bind(rating)
            .bind(comment)
            .execute(&self.pool)
            .await?;

        tracing::debug!("Recorded review {} for pantry {} ({} stars)", id, pantry_id, rating);

        Ok(id)
    }

    /// Average rating per pantry, rounded to 2 decimals
    pub async fn average_ratings(&self) -> Result<HashMap<String, f64>, ReviewStoreError> {
        let query = r#"
            SELECT pantry_id, AVG(rating)::float8 AS avg_rating
            FROM pantry_reviews
            GROUP BY pantry_id
        "#;

        let rows = sqlx::query(query).fetch_all(&self.pool).await?;

        let ratings: HashMap<String, f64> = rows
            .iter()
            .map(|row| {
                let avg: f64 = row.get("avg_rating");
                (row.get("pantry_id"), round_to_hundredths(avg))
            })
            .collect();

        tracing::debug!("Loaded ratings for {} pantries", ratings.len());

        Ok(ratings)
    }

    /// Average rating for one pantry, if it has any reviews
    pub async fn rating_for(&self, pantry_id: &str) -> Result<Option<f64>, ReviewStoreError> {
        let query = r#"
            SELECT AVG(rating)::float8 AS avg_rating
            FROM pantry_reviews
            WHERE pantry_id = $1
        "#;

        let row = sqlx::query(query).bind(pantry_id).fetch_one(&self.pool).await?;
        let avg: Option<f64> = row.get("avg_rating");

        Ok(avg.map(round_to_hundredths))
    }

    /// Reviews for a pantry, newest first
    pub async fn list_reviews(
        &self,
        pantry_id: &str,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<Review>, ReviewStoreError> {
        let query = r#"
            SELECT id, pantry_id, rating, comment, created_at
            FROM pantry_reviews
            WHERE pantry_id = $1
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
        "#;

        let rows = sqlx::query(query)
            .bind(pantry_id)
            .bind(limit as i64)
            .bind(offset as i64)
            .fetch_all(&self.pool)
            .await?;

        let reviews = rows
            .iter()
            .map(|row| Review {
                id: row.get("id"),
                pantry_id: row.get("pantry_id"),
                rating: row.get("rating"),
                comment: row.get("comment"),
                created_at: row.get("created_at"),
            })
            .collect();

        Ok(reviews)
    }

    /// Health check for the database connection
    pub async fn health_check(&self) -> Result<bool, ReviewStoreError> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|_| true)
            .map_err(Into::into)
    }
}
