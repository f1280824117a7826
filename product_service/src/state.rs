// product_service/src/state.rs
use crate::config::AppConfig;
use crate::repository::ProductRepository;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
  pub repository: Arc<dyn ProductRepository>,
  pub config: Arc<AppConfig>, // Share loaded config
}

impl AppState {
  pub fn new(repository: Arc<dyn ProductRepository>, config: Arc<AppConfig>) -> Self {
    Self { repository, config }
  }

  pub fn repo(&self) -> &dyn ProductRepository {
    self.repository.as_ref()
  }
}
