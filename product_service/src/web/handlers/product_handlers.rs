// product_service/src/web/handlers/product_handlers.rs

use actix_web::http::header;
use actix_web::{web, HttpRequest, HttpResponse};
use serde::Deserialize;
use serde_json::Value;
use tracing::{info, instrument, warn};

use crate::errors::{AppError, Result};
use crate::models::{Category, Product};
use crate::state::AppState;

/// Route name used to build `Location` headers for created products.
pub const PRODUCT_RESOURCE: &str = "product";

#[derive(Deserialize, Debug, Default)]
pub struct ListProductsQuery {
  pub name: Option<String>,
  pub category: Option<String>,
  pub available: Option<String>,
}

fn not_found(product_id: i32) -> AppError {
  AppError::NotFound(format!("Product with id '{}' was not found.", product_id))
}

// "true", "yes" and "1" (any case) mean available; anything else means not.
fn parse_available_param(raw: &str) -> bool {
  matches!(raw.trim().to_ascii_lowercase().as_str(), "true" | "yes" | "1")
}

#[instrument(name = "handler::list_products", skip(app_state))]
pub async fn list_products_handler(
  app_state: web::Data<AppState>,
  query_params: web::Query<ListProductsQuery>,
) -> Result<HttpResponse> {
  let repo = app_state.repo();
  let query = query_params.into_inner();

  let products = if let Some(name) = query.name {
    info!("Find by name: {}", name);
    Product::find_by_name(repo, &name).await?
  } else if let Some(category) = query.category {
    info!("Find by category: {}", category);
    let category = category.trim().to_ascii_uppercase().parse::<Category>()?;
    Product::find_by_category(repo, category).await?
  } else if let Some(available) = query.available {
    info!("Find by availability: {}", available);
    Product::find_by_availability(repo, parse_available_param(&available)).await?
  } else {
    info!("Find all");
    Product::all(repo).await?
  };

  info!("Returning {} products.", products.len());
  let body: Vec<Value> = products.iter().map(Product::serialize).collect();
  Ok(HttpResponse::Ok().json(body))
}

#[instrument(name = "handler::create_product", skip(req, app_state, payload))]
pub async fn create_product_handler(
  req: HttpRequest,
  app_state: web::Data<AppState>,
  payload: web::Json<Value>,
) -> Result<HttpResponse> {
  info!("Request to Create a Product...");
  let mut product = Product::from_json(&payload)?;
  product.create(app_state.repo()).await?;

  let product_id = product
    .id
    .ok_or_else(|| AppError::Internal("Created product has no id.".to_string()))?;
  let location = req
    .url_for(PRODUCT_RESOURCE, [product_id.to_string()])
    .map_err(|e| AppError::Internal(format!("Failed to build product location: {}", e)))?;

  info!("Product with id [{}] saved!", product_id);
  Ok(
    HttpResponse::Created()
      .insert_header((header::LOCATION, location.to_string()))
      .json(product.serialize()),
  )
}

#[instrument(name = "handler::get_product", skip(app_state, path), fields(product_id = %path.as_ref()))]
pub async fn get_product_handler(app_state: web::Data<AppState>, path: web::Path<i32>) -> Result<HttpResponse> {
  let product_id = path.into_inner();
  match Product::find(app_state.repo(), product_id).await? {
    Some(product) => {
      info!("Product {} fetched successfully.", product_id);
      Ok(HttpResponse::Ok().json(product.serialize()))
    }
    None => {
      warn!("Product with ID {} not found.", product_id);
      Err(not_found(product_id))
    }
  }
}

#[instrument(name = "handler::update_product", skip(app_state, path, payload), fields(product_id = %path.as_ref()))]
pub async fn update_product_handler(
  app_state: web::Data<AppState>,
  path: web::Path<i32>,
  payload: web::Json<Value>,
) -> Result<HttpResponse> {
  let product_id = path.into_inner();
  let repo = app_state.repo();

  let mut product = Product::find(repo, product_id)
    .await?
    .ok_or_else(|| not_found(product_id))?;
  product.deserialize(&payload)?;
  product.id = Some(product_id);
  product.update(repo).await?;

  info!("Product {} updated.", product_id);
  Ok(HttpResponse::Ok().json(product.serialize()))
}

/// Deleting an id with no record still answers 204.
#[instrument(name = "handler::delete_product", skip(app_state, path), fields(product_id = %path.as_ref()))]
pub async fn delete_product_handler(app_state: web::Data<AppState>, path: web::Path<i32>) -> Result<HttpResponse> {
  let product_id = path.into_inner();
  let repo = app_state.repo();

  if let Some(product) = Product::find(repo, product_id).await? {
    product.delete(repo).await?;
    info!("Product {} deleted.", product_id);
  }
  Ok(HttpResponse::NoContent().finish())
}

pub async fn method_not_allowed_handler(req: HttpRequest) -> Result<HttpResponse> {
  Err(AppError::MethodNotAllowed(format!(
    "Method {} is not allowed on {}",
    req.method(),
    req.path()
  )))
}
