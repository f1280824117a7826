// product_service/src/repository/memory.rs

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use tracing::debug;

use super::{ProductFilter, ProductRepository};
use crate::errors::Result;
use crate::models::{DataValidationError, Product};

#[derive(Debug, Default)]
struct Store {
  last_id: i32,
  rows: BTreeMap<i32, Product>,
}

/// Process-local product storage. Ids start at 1 and are never reused.
#[derive(Debug, Default)]
pub struct InMemoryProductRepository {
  store: Mutex<Store>,
}

impl InMemoryProductRepository {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn len(&self) -> usize {
    self.store.lock().rows.len()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }
}

#[async_trait]
impl ProductRepository for InMemoryProductRepository {
  async fn insert(&self, product: &Product) -> Result<i32> {
    let mut store = self.store.lock();
    store.last_id += 1;
    let id = store.last_id;
    let mut row = product.clone();
    row.id = Some(id);
    store.rows.insert(id, row);
    debug!(product_id = id, "Inserted product into memory store.");
    Ok(id)
  }

  async fn update(&self, product: &Product) -> Result<bool> {
    let id = product
      .id
      .ok_or_else(|| DataValidationError::new("Update called with empty ID field"))?;
    let mut store = self.store.lock();
    match store.rows.get_mut(&id) {
      Some(row) => {
        *row = product.clone();
        Ok(true)
      }
      None => Ok(false),
    }
  }

  async fn delete(&self, id: i32) -> Result<bool> {
    Ok(self.store.lock().rows.remove(&id).is_some())
  }

  async fn find(&self, id: i32) -> Result<Option<Product>> {
    Ok(self.store.lock().rows.get(&id).cloned())
  }

  async fn list(&self, filter: &ProductFilter) -> Result<Vec<Product>> {
    let store = self.store.lock();
    Ok(store.rows.values().filter(|p| filter.matches(p)).cloned().collect())
  }
}
