// product_service/src/models/product.rs

use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::{json, Map, Value};
use sqlx::{FromRow, Type as SqlxType};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use tracing::{debug, info, instrument};

use crate::errors::{AppError, Result};
use crate::repository::{ProductFilter, ProductRepository};

/// Raised for any caller-input problem with a product: malformed payloads,
/// unknown categories, non-boolean availability, missing keys or a missing id.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct DataValidationError(pub String);

impl DataValidationError {
  pub fn new(message: impl Into<String>) -> Self {
    Self(message.into())
  }
}

// Stored as the PostgreSQL enum `category`, whose labels are the variant names.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, SqlxType)]
#[sqlx(type_name = "category", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum Category {
  #[default]
  Unknown,
  Cloths,
  Food,
  Housewares,
  Automotive,
  Tools,
}

impl Category {
  pub const ALL: [Category; 6] = [
    Category::Unknown,
    Category::Cloths,
    Category::Food,
    Category::Housewares,
    Category::Automotive,
    Category::Tools,
  ];

  pub fn as_str(&self) -> &'static str {
    match self {
      Category::Unknown => "UNKNOWN",
      Category::Cloths => "CLOTHS",
      Category::Food => "FOOD",
      Category::Housewares => "HOUSEWARES",
      Category::Automotive => "AUTOMOTIVE",
      Category::Tools => "TOOLS",
    }
  }
}

impl fmt::Display for Category {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Case-sensitive: only the exact variant name is accepted.
impl FromStr for Category {
  type Err = DataValidationError;

  fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
    Category::ALL
      .into_iter()
      .find(|category| category.as_str() == s)
      .ok_or_else(|| DataValidationError::new(format!("Invalid attribute: unknown category '{}'", s)))
  }
}

#[derive(Debug, Clone, Default, PartialEq, FromRow)]
pub struct Product {
  pub id: Option<i32>, // None until the record has been persisted
  pub name: String,
  pub description: Option<String>,
  pub price: Decimal,
  pub available: bool,
  pub category: Category,
}

impl fmt::Display for Product {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self.id {
      Some(id) => write!(f, "<Product {} id=[{}]>", self.name, id),
      None => write!(f, "<Product {} id=[None]>", self.name),
    }
  }
}

/// Anything `find_by_price` accepts: an exact decimal or its textual form.
pub trait PriceLike {
  fn to_price(&self) -> std::result::Result<Decimal, DataValidationError>;
}

impl PriceLike for Decimal {
  fn to_price(&self) -> std::result::Result<Decimal, DataValidationError> {
    Ok(*self)
  }
}

impl PriceLike for &str {
  fn to_price(&self) -> std::result::Result<Decimal, DataValidationError> {
    parse_price(self)
  }
}

impl PriceLike for String {
  fn to_price(&self) -> std::result::Result<Decimal, DataValidationError> {
    parse_price(self)
  }
}

// Column limits of the `products` table.
pub const NAME_MAX_CHARS: usize = 100;
pub const DESCRIPTION_MAX_CHARS: usize = 250;
pub const PRICE_SCALE: u32 = 2;
// NUMERIC(14, 2) holds at most 12 integer digits.
const PRICE_INTEGER_DIGITS: u32 = 12;

fn parse_price(raw: &str) -> std::result::Result<Decimal, DataValidationError> {
  let raw = raw.trim();
  let price = Decimal::from_str(raw)
    .or_else(|_| Decimal::from_scientific(raw))
    .map_err(|e| DataValidationError::new(format!("Invalid price '{}': {}", raw, e)))?;
  check_price(price)
}

/// Rejects prices the `products.price` column cannot store exactly and
/// returns the accepted value at scale 2.
fn check_price(price: Decimal) -> std::result::Result<Decimal, DataValidationError> {
  if price.normalize().scale() > PRICE_SCALE {
    return Err(DataValidationError::new(format!(
      "Invalid price '{}': at most {} decimal places are allowed",
      price, PRICE_SCALE
    )));
  }
  if price.abs() >= Decimal::from(10i64.pow(PRICE_INTEGER_DIGITS)) {
    return Err(DataValidationError::new(format!(
      "Invalid price '{}': at most {} integer digits are allowed",
      price, PRICE_INTEGER_DIGITS
    )));
  }
  let mut price = price;
  price.rescale(PRICE_SCALE);
  Ok(price)
}

fn check_name(name: &str) -> std::result::Result<(), DataValidationError> {
  if name.trim().is_empty() {
    return Err(DataValidationError::new("Invalid product: name must not be empty"));
  }
  if name.chars().count() > NAME_MAX_CHARS {
    return Err(DataValidationError::new(format!(
      "Invalid product: name is longer than {} characters",
      NAME_MAX_CHARS
    )));
  }
  Ok(())
}

fn check_description(description: Option<&str>) -> std::result::Result<(), DataValidationError> {
  match description {
    Some(text) if text.chars().count() > DESCRIPTION_MAX_CHARS => Err(DataValidationError::new(format!(
      "Invalid product: description is longer than {} characters",
      DESCRIPTION_MAX_CHARS
    ))),
    _ => Ok(()),
  }
}

fn required<'a>(data: &'a Map<String, Value>, key: &str) -> std::result::Result<&'a Value, DataValidationError> {
  data
    .get(key)
    .ok_or_else(|| DataValidationError::new(format!("Invalid product: missing {}", key)))
}

impl Product {
  pub fn new(
    name: impl Into<String>,
    description: Option<String>,
    price: Decimal,
    available: bool,
    category: Category,
  ) -> Self {
    Self {
      id: None,
      name: name.into(),
      description,
      price,
      available,
      category,
    }
  }

  /// Builds an unsaved product from a JSON payload.
  pub fn from_json(data: &Value) -> std::result::Result<Self, DataValidationError> {
    let mut product = Product::default();
    product.deserialize(data)?;
    Ok(product)
  }

  /// Field checks shared by `deserialize` and the persistence calls, so a
  /// product built in code is held to the same limits as a payload.
  pub fn validate(&self) -> std::result::Result<(), DataValidationError> {
    check_name(&self.name)?;
    check_description(self.description.as_deref())?;
    check_price(self.price)?;
    Ok(())
  }

  pub fn serialize(&self) -> Value {
    let mut price = self.price;
    price.rescale(PRICE_SCALE);
    json!({
      "id": self.id,
      "name": self.name,
      "description": self.description,
      "price": price.to_string(),
      "available": self.available,
      "category": self.category.as_str(),
    })
  }

  /// Overwrites every mutable field from `data`. The id is left untouched.
  /// Nothing is written unless the whole payload validates.
  pub fn deserialize(&mut self, data: &Value) -> std::result::Result<&mut Self, DataValidationError> {
    let data = match data {
      Value::Object(map) if !map.is_empty() => map,
      Value::Object(_) => {
        return Err(DataValidationError::new(
          "Invalid product: body of request contained no data",
        ))
      }
      other => {
        return Err(DataValidationError::new(format!(
          "Invalid product: body of request contained bad or no data ({})",
          json_type_name(other)
        )))
      }
    };

    let name = match required(data, "name")? {
      Value::String(name) => {
        check_name(name)?;
        name.clone()
      }
      other => {
        return Err(DataValidationError::new(format!(
          "Invalid type for string [name]: {}",
          json_type_name(other)
        )))
      }
    };

    let description = match data.get("description") {
      None | Some(Value::Null) => None,
      Some(Value::String(description)) => {
        check_description(Some(description))?;
        Some(description.clone())
      }
      Some(other) => {
        return Err(DataValidationError::new(format!(
          "Invalid type for string [description]: {}",
          json_type_name(other)
        )))
      }
    };

    let price = match required(data, "price")? {
      Value::String(raw) => parse_price(raw)?,
      Value::Number(number) => parse_price(&number.to_string())?,
      other => {
        return Err(DataValidationError::new(format!(
          "Invalid type for decimal [price]: {}",
          json_type_name(other)
        )))
      }
    };

    let available = match required(data, "available")? {
      Value::Bool(available) => *available,
      other => {
        return Err(DataValidationError::new(format!(
          "Invalid type for boolean [available]: {}",
          json_type_name(other)
        )))
      }
    };

    let category = match required(data, "category")? {
      Value::String(name) => name.parse::<Category>()?,
      other => {
        return Err(DataValidationError::new(format!(
          "Invalid type for category [category]: {}",
          json_type_name(other)
        )))
      }
    };

    self.name = name;
    self.description = description;
    self.price = price;
    self.available = available;
    self.category = category;
    Ok(self)
  }
}

fn json_type_name(value: &Value) -> &'static str {
  match value {
    Value::Null => "null",
    Value::Bool(_) => "bool",
    Value::Number(_) => "number",
    Value::String(_) => "string",
    Value::Array(_) => "array",
    Value::Object(_) => "object",
  }
}

// --- Persistence ---

impl Product {
  /// Inserts a new record and stores the assigned id on `self`.
  #[instrument(name = "product::create", skip(self, repo), fields(product = %self))]
  pub async fn create(&mut self, repo: &dyn ProductRepository) -> Result<()> {
    if let Some(id) = self.id {
      return Err(DataValidationError::new(format!("Create called on a product that already has id {}", id)).into());
    }
    self.validate()?;
    self.price.rescale(PRICE_SCALE);
    let id = repo.insert(self).await?;
    self.id = Some(id);
    info!(product_id = id, "Product created.");
    Ok(())
  }

  #[instrument(name = "product::update", skip(self, repo), fields(product = %self))]
  pub async fn update(&self, repo: &dyn ProductRepository) -> Result<()> {
    let id = self
      .id
      .ok_or_else(|| DataValidationError::new("Update called with empty ID field"))?;
    self.validate()?;
    if !repo.update(self).await? {
      return Err(AppError::NotFound(format!("Product with id '{}' was not found.", id)));
    }
    info!(product_id = id, "Product updated.");
    Ok(())
  }

  #[instrument(name = "product::delete", skip(self, repo), fields(product = %self))]
  pub async fn delete(&self, repo: &dyn ProductRepository) -> Result<()> {
    let id = self
      .id
      .ok_or_else(|| DataValidationError::new("Delete called with empty ID field"))?;
    let removed = repo.delete(id).await?;
    debug!(product_id = id, removed, "Product delete finished.");
    Ok(())
  }

  pub async fn all(repo: &dyn ProductRepository) -> Result<Vec<Product>> {
    repo.list(&ProductFilter::All).await
  }

  pub async fn find(repo: &dyn ProductRepository, id: i32) -> Result<Option<Product>> {
    repo.find(id).await
  }

  pub async fn find_by_name(repo: &dyn ProductRepository, name: &str) -> Result<Vec<Product>> {
    repo.list(&ProductFilter::Name(name.to_string())).await
  }

  pub async fn find_by_availability(repo: &dyn ProductRepository, available: bool) -> Result<Vec<Product>> {
    repo.list(&ProductFilter::Available(available)).await
  }

  pub async fn find_by_category(repo: &dyn ProductRepository, category: Category) -> Result<Vec<Product>> {
    repo.list(&ProductFilter::Category(category)).await
  }

  pub async fn find_by_price(repo: &dyn ProductRepository, price: impl PriceLike) -> Result<Vec<Product>> {
    let price = price.to_price()?;
    repo.list(&ProductFilter::Price(price)).await
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn fedora() -> Product {
    Product::new(
      "Fedora",
      Some("A red hat".to_string()),
      Decimal::new(1250, 2),
      true,
      Category::Cloths,
    )
  }

  #[test]
  fn new_product_has_no_id() {
    let product = fedora();
    assert_eq!(product.to_string(), "<Product Fedora id=[None]>");
    assert_eq!(product.id, None);
    assert_eq!(product.price, Decimal::from_str("12.50").unwrap());
    assert_eq!(product.category, Category::Cloths);
  }

  #[test]
  fn serialize_uses_wire_representations() {
    let mut product = fedora();
    product.id = Some(7);
    let data = product.serialize();
    assert_eq!(data["id"], json!(7));
    assert_eq!(data["price"], json!("12.50"));
    assert_eq!(data["available"], json!(true));
    assert_eq!(data["category"], json!("CLOTHS"));
    assert_eq!(data["description"], json!("A red hat"));
  }

  #[test]
  fn deserialize_reconstructs_serialized_product() {
    let original = fedora();
    let restored = Product::from_json(&original.serialize()).unwrap();
    assert_eq!(restored, original);
  }

  #[test]
  fn deserialize_keeps_existing_id() {
    let mut product = fedora();
    product.id = Some(3);
    let mut data = product.serialize();
    data["id"] = json!(99);
    data["name"] = json!("Beret");
    product.deserialize(&data).unwrap();
    assert_eq!(product.id, Some(3));
    assert_eq!(product.name, "Beret");
  }

  #[test]
  fn deserialize_accepts_numeric_price() {
    let mut data = fedora().serialize();
    data["price"] = json!(12.5);
    let product = Product::from_json(&data).unwrap();
    assert_eq!(product.price, Decimal::new(125, 1));
  }

  #[test]
  fn deserialize_rejects_string_availability() {
    let mut data = fedora().serialize();
    data["available"] = json!("True");
    let err = Product::from_json(&data).unwrap_err();
    assert!(err.0.contains("available"), "{}", err);
  }

  #[test]
  fn deserialize_rejects_numeric_availability() {
    let mut data = fedora().serialize();
    data["available"] = json!(1);
    assert!(Product::from_json(&data).is_err());
  }

  #[test]
  fn deserialize_rejects_unknown_category() {
    let mut data = fedora().serialize();
    data["category"] = json!("test-category");
    let err = Product::from_json(&data).unwrap_err();
    assert!(err.0.contains("test-category"));
  }

  #[test]
  fn category_names_are_case_sensitive() {
    let mut data = fedora().serialize();
    data["category"] = json!("cloths");
    assert!(Product::from_json(&data).is_err());
    assert_eq!("CLOTHS".parse::<Category>(), Ok(Category::Cloths));
  }

  #[test]
  fn deserialize_rejects_null_and_non_objects() {
    assert!(Product::from_json(&Value::Null).is_err());
    assert!(Product::from_json(&json!([1, 2, 3])).is_err());
    assert!(Product::from_json(&json!("product")).is_err());
    assert!(Product::from_json(&json!({})).is_err());
  }

  #[test]
  fn deserialize_reports_missing_key() {
    for key in ["name", "price", "available", "category"] {
      let mut data = fedora().serialize();
      data.as_object_mut().unwrap().remove(key);
      let err = Product::from_json(&data).unwrap_err();
      assert_eq!(err.0, format!("Invalid product: missing {}", key));
    }
  }

  #[test]
  fn description_is_optional() {
    let mut data = fedora().serialize();
    data.as_object_mut().unwrap().remove("description");
    let product = Product::from_json(&data).unwrap();
    assert_eq!(product.description, None);
  }

  #[test]
  fn failed_deserialize_leaves_product_untouched() {
    let mut product = fedora();
    let mut data = product.serialize();
    data["name"] = json!("Beret");
    data["category"] = json!("HATS");
    assert!(product.deserialize(&data).is_err());
    assert_eq!(product, fedora());
  }

  #[test]
  fn price_like_inputs_normalize_to_same_decimal() {
    let price = Decimal::new(1999, 2);
    assert_eq!(price.to_price().unwrap(), price);
    assert_eq!("19.99".to_price().unwrap(), price);
    assert_eq!(String::from(" 19.99 ").to_price().unwrap(), price);
    assert!("nineteen".to_price().is_err());
  }

  #[test]
  fn deserialize_enforces_column_lengths() {
    let mut data = fedora().serialize();
    data["name"] = json!("n".repeat(NAME_MAX_CHARS));
    assert!(Product::from_json(&data).is_ok());
    data["name"] = json!("n".repeat(NAME_MAX_CHARS + 1));
    let err = Product::from_json(&data).unwrap_err();
    assert!(err.0.contains("name"), "{}", err);

    let mut data = fedora().serialize();
    data["description"] = json!("d".repeat(DESCRIPTION_MAX_CHARS));
    assert!(Product::from_json(&data).is_ok());
    data["description"] = json!("d".repeat(DESCRIPTION_MAX_CHARS + 1));
    let err = Product::from_json(&data).unwrap_err();
    assert!(err.0.contains("description"), "{}", err);
  }

  #[test]
  fn name_length_counts_characters_not_bytes() {
    let mut data = fedora().serialize();
    data["name"] = json!("é".repeat(NAME_MAX_CHARS));
    assert!(Product::from_json(&data).is_ok());
  }

  #[test]
  fn deserialize_rejects_price_outside_column_range() {
    let mut data = fedora().serialize();
    data["price"] = json!("999999999999.99");
    assert!(Product::from_json(&data).is_ok());
    for price in [json!("1000000000000"), json!("-1000000000000"), json!(1e13)] {
      data["price"] = price;
      let err = Product::from_json(&data).unwrap_err();
      assert!(err.0.contains("integer digits"), "{}", err);
    }
  }

  #[test]
  fn price_is_normalized_to_two_decimal_places() {
    let mut data = fedora().serialize();
    data["price"] = json!("12.345");
    let err = Product::from_json(&data).unwrap_err();
    assert!(err.0.contains("decimal places"), "{}", err);

    data["price"] = json!("12.500");
    let product = Product::from_json(&data).unwrap();
    assert_eq!(product.price.scale(), PRICE_SCALE);
    assert_eq!(product.serialize()["price"], json!("12.50"));

    data["price"] = json!(12.5);
    assert_eq!(Product::from_json(&data).unwrap().serialize()["price"], json!("12.50"));
    assert!("12.345".to_price().is_err());
  }

  #[test]
  fn validate_applies_payload_limits_to_built_products() {
    assert!(fedora().validate().is_ok());

    let mut product = fedora();
    product.name = "n".repeat(NAME_MAX_CHARS + 1);
    assert!(product.validate().is_err());

    let mut product = fedora();
    product.description = Some("d".repeat(DESCRIPTION_MAX_CHARS + 1));
    assert!(product.validate().is_err());

    let mut product = fedora();
    product.price = Decimal::new(12345, 3);
    assert!(product.validate().is_err());

    let mut product = fedora();
    product.price = Decimal::from(10i64.pow(12));
    assert!(product.validate().is_err());
  }

  #[test]
  fn every_category_round_trips_by_name() {
    for category in Category::ALL {
      assert_eq!(category.as_str().parse::<Category>(), Ok(category));
      assert_eq!(serde_json::to_value(category).unwrap(), json!(category.as_str()));
    }
  }
}
