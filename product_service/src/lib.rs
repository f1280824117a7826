// product_service/src/lib.rs

//! Product catalog REST service: a validated `Product` record model, a
//! swappable `ProductRepository` for persistence, and the actix-web
//! handlers exposing them under `/products`.

pub mod config;
pub mod errors;
pub mod models;
pub mod repository;
pub mod state;
pub mod web;

pub use crate::errors::{AppError, Result};
pub use crate::models::{Category, DataValidationError, Product};
pub use crate::repository::{InMemoryProductRepository, PgProductRepository, ProductFilter, ProductRepository};
pub use crate::state::AppState;
