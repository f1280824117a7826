// tests/common/mod.rs
#![allow(dead_code)] // Not every test binary uses every helper

use once_cell::sync::Lazy;
use product_service::config::AppConfig;
use product_service::{AppState, Category, InMemoryProductRepository, Product, ProductRepository};
use rust_decimal::Decimal;
use std::sync::{
  atomic::{AtomicUsize, Ordering},
  Arc,
};
use tracing::Level;

// --- Helper for Tracing Setup (call once per test run if needed) ---
static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer() // Important for tests to capture output
    .try_init()
    .ok(); // Allow multiple initializations in tests (ok if fails)
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}

// --- Product factory ---
const NAMES: [&str; 8] = ["Hat", "Pants", "Shirt", "Apple", "Banana", "Pots", "Towels", "Hammer"];
static FACTORY_SEQ: AtomicUsize = AtomicUsize::new(0);

/// A valid, unsaved product. Successive calls cycle names, categories,
/// availability and prices so batches contain both repeats and distinct values.
pub fn product_factory() -> Product {
  let n = FACTORY_SEQ.fetch_add(1, Ordering::SeqCst);
  Product::new(
    NAMES[n % NAMES.len()],
    Some(format!("Test product number {}", n)),
    Decimal::new(((n * 733) % 5000) as i64 + 99, 2),
    n % 3 != 0,
    Category::ALL[n % Category::ALL.len()],
  )
}

pub fn product_batch(count: usize) -> Vec<Product> {
  (0..count).map(|_| product_factory()).collect()
}

// --- Application state ---
pub fn memory_config() -> Arc<AppConfig> {
  let config = AppConfig::from_lookup(|name| match name {
    "STORAGE_BACKEND" => Some("memory".to_string()),
    _ => None,
  })
  .expect("memory config is always valid");
  Arc::new(config)
}

pub fn memory_state() -> (Arc<InMemoryProductRepository>, AppState) {
  let repo = Arc::new(InMemoryProductRepository::new());
  let state = AppState::new(repo.clone() as Arc<dyn ProductRepository>, memory_config());
  (repo, state)
}

macro_rules! init_app {
  ($state:expr) => {
    actix_web::test::init_service(
      actix_web::App::new()
        .app_data(actix_web::web::Data::new($state))
        .configure(product_service::web::configure_app_routes),
    )
    .await
  };
}

/// POSTs `count` factory products and returns them with their assigned ids.
macro_rules! create_products {
  ($app:expr, $count:expr) => {{
    let mut created = Vec::new();
    for _ in 0..$count {
      let mut product = common::product_factory();
      let req = actix_web::test::TestRequest::post()
        .uri("/products")
        .set_json(product.serialize())
        .to_request();
      let resp = actix_web::test::call_service(&$app, req).await;
      assert_eq!(
        resp.status(),
        actix_web::http::StatusCode::CREATED,
        "Could not create test product"
      );
      let body: serde_json::Value = actix_web::test::read_body_json(resp).await;
      product.id = body["id"].as_i64().map(|id| id as i32);
      created.push(product);
    }
    created
  }};
}
