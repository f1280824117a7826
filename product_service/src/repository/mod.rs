// product_service/src/repository/mod.rs

//! Storage behind the product model.
//!
//! Handlers and record operations only ever see `dyn ProductRepository`;
//! `main` decides which implementation backs the running service.

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::errors::Result;
use crate::models::{Category, Product};

pub mod memory;
pub mod postgres;

pub use memory::InMemoryProductRepository;
pub use postgres::PgProductRepository;

/// Exact-match predicate for listing products.
#[derive(Debug, Clone, PartialEq)]
pub enum ProductFilter {
  All,
  Name(String),
  Category(Category),
  Available(bool),
  Price(Decimal),
}

impl ProductFilter {
  pub fn matches(&self, product: &Product) -> bool {
    match self {
      ProductFilter::All => true,
      ProductFilter::Name(name) => product.name == *name,
      ProductFilter::Category(category) => product.category == *category,
      ProductFilter::Available(available) => product.available == *available,
      ProductFilter::Price(price) => product.price == *price,
    }
  }
}

#[async_trait]
pub trait ProductRepository: Send + Sync {
  /// Persists a new row and returns the id assigned by storage.
  async fn insert(&self, product: &Product) -> Result<i32>;

  /// Overwrites every mutable column of the row with `product.id`.
  /// Returns `false` when no such row exists.
  async fn update(&self, product: &Product) -> Result<bool>;

  /// Returns `false` when there was nothing to delete.
  async fn delete(&self, id: i32) -> Result<bool>;

  async fn find(&self, id: i32) -> Result<Option<Product>>;

  /// Matching products ordered by id.
  async fn list(&self, filter: &ProductFilter) -> Result<Vec<Product>>;
}
