//! Rate repository
//!
//! CRUD plus the two aggregations over ratings: the per-restaurant mean and
//! the newest-first feed.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{QueryBuilder, Row, Sqlite, SqlitePool};
use std::sync::Arc;

use super::object_id_column;
use crate::db::query::RateFilter;
use crate::models::{ObjectId, Rate};

#[async_trait]
pub trait RateRepository: Send + Sync {
    async fn create(&self, rate: &Rate) -> Result<Rate>;

    async fn get_by_id(&self, id: ObjectId) -> Result<Option<Rate>>;

    /// Rates matching `filter`, newest first
    async fn list(&self, filter: &RateFilter) -> Result<Vec<Rate>>;

    /// The `limit` newest rates across all restaurants
    async fn recent(&self, limit: i64) -> Result<Vec<Rate>>;

    /// Mean rating over the matching rates, `0.0` when there are none
    async fn average(&self, filter: &RateFilter) -> Result<f64>;

    async fn update(&self, rate: &Rate) -> Result<bool>;

    async fn delete(&self, id: ObjectId) -> Result<bool>;
}

pub struct SqlxRateRepository {
    pool: SqlitePool,
}

impl SqlxRateRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn boxed(pool: SqlitePool) -> Arc<dyn RateRepository> {
        Arc::new(Self::new(pool))
    }
}

const RATE_COLUMNS: &str = "id, user_id, restaurant_id, rating, comment, date";

#[async_trait]
impl RateRepository for SqlxRateRepository {
    async fn create(&self, rate: &Rate) -> Result<Rate> {
        sqlx::query(
            r#"
            INSERT INTO rates (id, user_id, restaurant_id, rating, comment, date)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(rate.id.to_hex())
        .bind(rate.user_id.to_hex())
        .bind(rate.restaurant_id.to_hex())
        .bind(i64::from(rate.rating))
        .bind(&rate.comment)
        .bind(rate.date)
        .execute(&self.pool)
        .await
        .context("Failed to create rate")?;

        Ok(rate.clone())
    }

    async fn get_by_id(&self, id: ObjectId) -> Result<Option<Rate>> {
        let row = sqlx::query(&format!("SELECT {} FROM rates WHERE id = ?", RATE_COLUMNS))
            .bind(id.to_hex())
            .fetch_optional(&self.pool)
            .await
            .context("Failed to get rate by ID")?;

        row.as_ref().map(row_to_rate).transpose()
    }

    async fn list(&self, filter: &RateFilter) -> Result<Vec<Rate>> {
        let mut qb = QueryBuilder::<Sqlite>::new(format!("SELECT {} FROM rates", RATE_COLUMNS));
        filter.push_where(&mut qb);
        qb.push(" ORDER BY date DESC, rowid DESC");

        let rows = qb
            .build()
            .fetch_all(&self.pool)
            .await
            .context("Failed to list rates")?;

        rows.iter().map(row_to_rate).collect()
    }

    async fn recent(&self, limit: i64) -> Result<Vec<Rate>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM rates ORDER BY date DESC, rowid DESC LIMIT ?",
            RATE_COLUMNS
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .context("Failed to get recent rates")?;

        rows.iter().map(row_to_rate).collect()
    }

    async fn average(&self, filter: &RateFilter) -> Result<f64> {
        let mut qb = QueryBuilder::<Sqlite>::new("SELECT AVG(rating) AS average FROM rates");
        filter.push_where(&mut qb);

        let row = qb
            .build()
            .fetch_one(&self.pool)
            .await
            .context("Failed to compute average rating")?;

        let average: Option<f64> = row.try_get("average")?;
        Ok(average.unwrap_or(0.0))
    }

    async fn update(&self, rate: &Rate) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE rates
            SET user_id = ?, restaurant_id = ?, rating = ?, comment = ?
            WHERE id = ?
            "#,
        )
        .bind(rate.user_id.to_hex())
        .bind(rate.restaurant_id.to_hex())
        .bind(i64::from(rate.rating))
        .bind(&rate.comment)
        .bind(rate.id.to_hex())
        .execute(&self.pool)
        .await
        .context("Failed to update rate")?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: ObjectId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM rates WHERE id = ?")
            .bind(id.to_hex())
            .execute(&self.pool)
            .await
            .context("Failed to delete rate")?;

        Ok(result.rows_affected() > 0)
    }
}

fn row_to_rate(row: &sqlx::sqlite::SqliteRow) -> Result<Rate> {
    let rating: i64 = row.try_get("rating")?;
    let rating = u8::try_from(rating)
        .with_context(|| format!("Invalid rating in database: {}", rating))?;
    let date: DateTime<Utc> = row.try_get("date").context("Invalid rate date")?;

    Ok(Rate {
        id: object_id_column(row, "id")?,
        user_id: object_id_column(row, "user_id")?,
        restaurant_id: object_id_column(row, "restaurant_id")?,
        rating,
        comment: row.try_get("comment")?,
        date,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_test_pool, migrations};
    use chrono::Duration;

    async fn setup_test_repo() -> SqlxRateRepository {
        let pool = create_test_pool().await.unwrap();
        migrations::run_migrations(&pool).await.unwrap();
        SqlxRateRepository::new(pool)
    }

    fn rate_at(restaurant: ObjectId, rating: u8, minutes_ago: i64) -> Rate {
        Rate::new(
            ObjectId::new(),
            restaurant,
            rating,
            format!("rated {}", rating),
            Utc::now() - Duration::minutes(minutes_ago),
        )
    }

    #[tokio::test]
    async fn test_create_and_get_rate() {
        let repo = setup_test_repo().await;
        let rate = rate_at(ObjectId::new(), 4, 0);

        repo.create(&rate).await.unwrap();
        let found = repo.get_by_id(rate.id).await.unwrap().unwrap();
        assert_eq!(found, rate);
    }

    #[tokio::test]
    async fn test_average_rating() {
        let repo = setup_test_repo().await;
        let restaurant = ObjectId::new();
        let filter = RateFilter::for_restaurant(restaurant);

        assert_eq!(repo.average(&filter).await.unwrap(), 0.0);

        repo.create(&rate_at(restaurant, 3, 5)).await.unwrap();
        repo.create(&rate_at(restaurant, 5, 4)).await.unwrap();
        repo.create(&rate_at(ObjectId::new(), 1, 3)).await.unwrap();

        assert_eq!(repo.average(&filter).await.unwrap(), 4.0);
    }

    #[tokio::test]
    async fn test_recent_newest_first_and_limited() {
        let repo = setup_test_repo().await;
        for minutes_ago in 0..12 {
            repo.create(&rate_at(ObjectId::new(), 3, minutes_ago))
                .await
                .unwrap();
        }

        let recent = repo.recent(10).await.unwrap();
        assert_eq!(recent.len(), 10);
        assert!(recent.windows(2).all(|w| w[0].date >= w[1].date));

        let two = repo.recent(2).await.unwrap();
        assert_eq!(two.len(), 2);
        assert_eq!(two[0].id, recent[0].id);
    }

    #[tokio::test]
    async fn test_list_by_restaurant_and_user() {
        let repo = setup_test_repo().await;
        let restaurant = ObjectId::new();
        let older = rate_at(restaurant, 2, 10);
        let newer = rate_at(restaurant, 5, 1);
        repo.create(&older).await.unwrap();
        repo.create(&newer).await.unwrap();
        repo.create(&rate_at(ObjectId::new(), 1, 0)).await.unwrap();

        let found = repo.list(&RateFilter::for_restaurant(restaurant)).await.unwrap();
        assert_eq!(found, vec![newer.clone(), older]);

        let found = repo.list(&RateFilter::for_user(newer.user_id)).await.unwrap();
        assert_eq!(found, vec![newer]);
    }

    #[tokio::test]
    async fn test_update_keeps_date() {
        let repo = setup_test_repo().await;
        let mut rate = rate_at(ObjectId::new(), 2, 30);
        repo.create(&rate).await.unwrap();

        let original_date = rate.date;
        rate.rating = 5;
        rate.date = Utc::now();
        assert!(repo.update(&rate).await.unwrap());

        let found = repo.get_by_id(rate.id).await.unwrap().unwrap();
        assert_eq!(found.rating, 5);
        assert_eq!(found.date, original_date);
    }

    #[tokio::test]
    async fn test_delete_rate() {
        let repo = setup_test_repo().await;
        let rate = rate_at(ObjectId::new(), 2, 0);
        repo.create(&rate).await.unwrap();

        assert!(repo.delete(rate.id).await.unwrap());
        assert!(repo.get_by_id(rate.id).await.unwrap().is_none());
    }
}
