// core/src/services/catalog.rs

//! Product browsing and superuser-only catalog mutation.
//!
//! Authorization is checked by the caller (the HTTP gate); this service only
//! enforces catalog rules.

use crate::error::{ShopError, ShopResult};
use crate::models::{NewProduct, Product, ProductChanges, ProductPage, ProductQuery};
use crate::policy::{
  check_max_len, page_offset, StockVisibility, MAX_CATEGORY_LEN, MAX_IMAGE_URL_LEN, MAX_PAGE_SIZE,
  MAX_PRODUCT_NAME_LEN,
};
use crate::store::ProductStore;
use std::sync::Arc;
use tracing::{info, instrument, warn};

pub struct CatalogService {
  products: Arc<dyn ProductStore>,
  visibility: StockVisibility,
}

fn validate_new_product(product: &NewProduct) -> ShopResult<()> {
  if product.name.trim().is_empty() {
    return Err(ShopError::Validation("Product name is required.".to_string()));
  }
  validate_text_fields(Some(&product.name), product.image_url.as_deref(), product.category.as_deref())?;
  validate_amounts(Some(product.price), Some(product.stock))
}

fn validate_text_fields(name: Option<&str>, image_url: Option<&str>, category: Option<&str>) -> ShopResult<()> {
  if let Some(name) = name {
    check_max_len("Product name", name, MAX_PRODUCT_NAME_LEN)?;
  }
  if let Some(image_url) = image_url {
    check_max_len("Image URL", image_url, MAX_IMAGE_URL_LEN)?;
  }
  if let Some(category) = category {
    check_max_len("Category", category, MAX_CATEGORY_LEN)?;
  }
  Ok(())
}

fn validate_amounts(price: Option<i64>, stock: Option<i32>) -> ShopResult<()> {
  if price.is_some_and(|p| p < 0) {
    return Err(ShopError::Validation("Price cannot be negative.".to_string()));
  }
  if stock.is_some_and(|s| s < 0) {
    return Err(ShopError::Validation("Stock cannot be negative.".to_string()));
  }
  Ok(())
}

impl CatalogService {
  pub fn new(products: Arc<dyn ProductStore>, visibility: StockVisibility) -> Self {
    Self { products, visibility }
  }

  /// One page of the catalog, ordered by id. `page` is 1-based.
  #[instrument(name = "catalog_service::list", skip(self))]
  pub async fn list(&self, page: i64, page_size: i64, search: Option<&str>) -> ShopResult<ProductPage> {
    if page < 1 {
      return Err(ShopError::Validation("page must be at least 1".to_string()));
    }
    if !(1..=MAX_PAGE_SIZE).contains(&page_size) {
      return Err(ShopError::Validation(format!(
        "page_size must be between 1 and {}",
        MAX_PAGE_SIZE
      )));
    }

    let offset = page_offset(page, page_size)
      .ok_or_else(|| ShopError::Validation("page is out of range".to_string()))?;
    let query = ProductQuery {
      offset,
      limit: page_size,
      search: search.map(str::trim).filter(|s| !s.is_empty()).map(str::to_string),
      in_stock_only: self.visibility == StockVisibility::HideOutOfStock,
    };
    let (items, total) = self.products.list(&query).await?;
    info!(returned = items.len(), total, "Products listed.");

    Ok(ProductPage {
      items,
      total,
      page,
      page_size,
    })
  }

  /// Every stored product, whatever the listing visibility says.
  pub async fn count_all(&self) -> ShopResult<i64> {
    let query = ProductQuery {
      offset: 0,
      limit: 1,
      search: None,
      in_stock_only: false,
    };
    let (_, total) = self.products.list(&query).await?;
    Ok(total)
  }

  pub async fn get(&self, id: i64) -> ShopResult<Product> {
    self.products.get(id).await?.ok_or_else(|| {
      warn!(product_id = id, "Product not found.");
      ShopError::product_not_found(id)
    })
  }

  #[instrument(name = "catalog_service::create", skip(self, new_product), fields(name = %new_product.name))]
  pub async fn create(&self, new_product: NewProduct) -> ShopResult<Product> {
    validate_new_product(&new_product)?;
    let product = self.products.create(new_product).await?;
    info!(product_id = product.id, "Product created.");
    Ok(product)
  }

  #[instrument(name = "catalog_service::update", skip(self, changes))]
  pub async fn update(&self, id: i64, changes: ProductChanges) -> ShopResult<Product> {
    if changes.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
      return Err(ShopError::Validation("Product name cannot be blank.".to_string()));
    }
    validate_text_fields(
      changes.name.as_deref(),
      changes.image_url.as_deref(),
      changes.category.as_deref(),
    )?;
    validate_amounts(changes.price, changes.stock)?;
    let product = self
      .products
      .update(id, changes)
      .await?
      .ok_or_else(|| ShopError::product_not_found(id))?;
    info!("Product updated.");
    Ok(product)
  }

  #[instrument(name = "catalog_service::delete", skip(self))]
  pub async fn delete(&self, id: i64) -> ShopResult<()> {
    if !self.products.delete(id).await? {
      return Err(ShopError::product_not_found(id));
    }
    info!("Product deleted.");
    Ok(())
  }
}
