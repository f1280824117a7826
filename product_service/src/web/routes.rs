// product_service/src/web/routes.rs

use actix_web::error::{JsonPayloadError, PathError};
use actix_web::{web, HttpRequest, HttpResponse};

use crate::errors::AppError;
use crate::models::DataValidationError;
use crate::web::handlers::product_handlers;

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
  <head>
    <meta charset="utf-8">
    <title>Product Catalog Administration</title>
  </head>
  <body>
    <h1>Product Catalog Administration</h1>
    <p>Manage products through the <a href="/products">/products</a> REST API.</p>
  </body>
</html>
"#;

async fn index_handler() -> HttpResponse {
  HttpResponse::Ok().content_type("text/html; charset=utf-8").body(INDEX_HTML)
}

async fn health_check_handler() -> HttpResponse {
  HttpResponse::Ok().json(serde_json::json!({ "message": "OK" }))
}

// Missing or non-JSON Content-Type is 415; anything else wrong with the body is 400.
fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
  let app_error = match err {
    JsonPayloadError::ContentType => {
      AppError::UnsupportedMediaType("Content-Type must be application/json".to_string())
    }
    other => AppError::Validation(DataValidationError::new(format!(
      "Invalid product: body of request contained bad or no data ({})",
      other
    ))),
  };
  app_error.into()
}

// Ids that are not integers can never name a product.
fn path_error_handler(err: PathError, req: &HttpRequest) -> actix_web::Error {
  AppError::NotFound(format!("No resource at {} ({})", req.path(), err)).into()
}

pub fn configure_app_routes(cfg: &mut web::ServiceConfig) {
  cfg
    .app_data(web::JsonConfig::default().error_handler(json_error_handler))
    .app_data(web::PathConfig::default().error_handler(path_error_handler))
    .route("/", web::get().to(index_handler))
    .route("/health", web::get().to(health_check_handler))
    .service(
      web::resource("/products")
        .route(web::get().to(product_handlers::list_products_handler))
        .route(web::post().to(product_handlers::create_product_handler))
        .default_service(web::to(product_handlers::method_not_allowed_handler)),
    )
    .service(
      web::resource("/products/{product_id}")
        .name(product_handlers::PRODUCT_RESOURCE)
        .route(web::get().to(product_handlers::get_product_handler))
        .route(web::put().to(product_handlers::update_product_handler))
        .route(web::delete().to(product_handlers::delete_product_handler))
        .default_service(web::to(product_handlers::method_not_allowed_handler)),
    );
}
