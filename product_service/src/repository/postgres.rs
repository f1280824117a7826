// product_service/src/repository/postgres.rs

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::{error, info, instrument};

use super::{ProductFilter, ProductRepository};
use crate::errors::{AppError, Result};
use crate::models::{DataValidationError, Product};

const SELECT_PRODUCTS: &str = "SELECT id, name, description, price, available, category FROM products";

/// `products` table access through a shared connection pool.
#[derive(Debug, Clone)]
pub struct PgProductRepository {
  pool: PgPool,
}

impl PgProductRepository {
  pub fn new(pool: PgPool) -> Self {
    Self { pool }
  }

  pub async fn connect(database_url: &str) -> Result<Self> {
    let pool = PgPool::connect(database_url).await.map_err(|e| {
      error!(error = %e, "Failed to connect to the database.");
      AppError::Sqlx(e)
    })?;
    info!("Successfully connected to the database.");
    Ok(Self::new(pool))
  }

  /// Applies the embedded schema migrations (category enum type and `products` table).
  pub async fn run_migrations(&self) -> Result<()> {
    sqlx::migrate!("./migrations").run(&self.pool).await?;
    info!("Database migrations applied.");
    Ok(())
  }

  /// Removes every product. Used to reset state between test runs.
  pub async fn delete_all(&self) -> Result<u64> {
    let result = sqlx::query("DELETE FROM products").execute(&self.pool).await?;
    Ok(result.rows_affected())
  }
}

#[async_trait]
impl ProductRepository for PgProductRepository {
  #[instrument(name = "pg::insert_product", skip(self, product), fields(name = %product.name))]
  async fn insert(&self, product: &Product) -> Result<i32> {
    let id: i32 = sqlx::query_scalar(
      "INSERT INTO products (name, description, price, available, category) VALUES ($1, $2, $3, $4, $5) RETURNING id",
    )
    .bind(&product.name)
    .bind(&product.description)
    .bind(product.price)
    .bind(product.available)
    .bind(product.category)
    .fetch_one(&self.pool)
    .await
    .map_err(|e| {
      error!("Failed to insert product {}: {}", product.name, e);
      AppError::Sqlx(e)
    })?;
    Ok(id)
  }

  #[instrument(name = "pg::update_product", skip(self, product), fields(product_id = ?product.id))]
  async fn update(&self, product: &Product) -> Result<bool> {
    let id = product
      .id
      .ok_or_else(|| DataValidationError::new("Update called with empty ID field"))?;
    let result = sqlx::query(
      "UPDATE products SET name = $1, description = $2, price = $3, available = $4, category = $5 WHERE id = $6",
    )
    .bind(&product.name)
    .bind(&product.description)
    .bind(product.price)
    .bind(product.available)
    .bind(product.category)
    .bind(id)
    .execute(&self.pool)
    .await
    .map_err(|e| {
      error!("Database error while updating product {}: {}", id, e);
      AppError::Sqlx(e)
    })?;
    Ok(result.rows_affected() > 0)
  }

  #[instrument(name = "pg::delete_product", skip(self))]
  async fn delete(&self, id: i32) -> Result<bool> {
    let result = sqlx::query("DELETE FROM products WHERE id = $1")
      .bind(id)
      .execute(&self.pool)
      .await?;
    Ok(result.rows_affected() > 0)
  }

  #[instrument(name = "pg::find_product", skip(self))]
  async fn find(&self, id: i32) -> Result<Option<Product>> {
    let mut query = QueryBuilder::<Postgres>::new(SELECT_PRODUCTS);
    query.push(" WHERE id = ").push_bind(id);
    let product = query
      .build_query_as::<Product>()
      .fetch_optional(&self.pool)
      .await
      .map_err(|e| {
        error!("Database error while fetching product {}: {}", id, e);
        AppError::Sqlx(e)
      })?;
    Ok(product)
  }

  #[instrument(name = "pg::list_products", skip(self))]
  async fn list(&self, filter: &ProductFilter) -> Result<Vec<Product>> {
    let mut query = QueryBuilder::<Postgres>::new(SELECT_PRODUCTS);
    match filter {
      ProductFilter::All => {}
      ProductFilter::Name(name) => {
        query.push(" WHERE name = ").push_bind(name.as_str());
      }
      ProductFilter::Category(category) => {
        query.push(" WHERE category = ").push_bind(*category);
      }
      ProductFilter::Available(available) => {
        query.push(" WHERE available = ").push_bind(*available);
      }
      ProductFilter::Price(price) => {
        query.push(" WHERE price = ").push_bind(*price);
      }
    }
    query.push(" ORDER BY id");

    let products = query
      .build_query_as::<Product>()
      .fetch_all(&self.pool)
      .await
      .map_err(|e| {
        error!("Failed to fetch products from database: {}", e);
        AppError::Sqlx(e)
      })?;
    Ok(products)
  }
}
