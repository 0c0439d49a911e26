// core/src/policy.rs

//! Product-policy switches and input limits. Each behaviour the storefront
//! could reasonably go either way on is a named value here, chosen once at
//! startup.

use crate::error::{ShopError, ShopResult};

/// Largest page the catalog will serve.
pub const MAX_PAGE_SIZE: i64 = 100;
pub const DEFAULT_PAGE_SIZE: i64 = 20;

// Column widths from migrations/schema.sql, in characters.
pub const MAX_USERNAME_LEN: usize = 100;
pub const MAX_EMAIL_LEN: usize = 255;
pub const MAX_FULL_NAME_LEN: usize = 255;
pub const MAX_PRODUCT_NAME_LEN: usize = 255;
pub const MAX_IMAGE_URL_LEN: usize = 512;
pub const MAX_CATEGORY_LEN: usize = 100;

/// Whether order placement checks and reserves stock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StockPolicy {
  /// Orders succeed regardless of stock and never decrement it.
  #[default]
  Unchecked,
  /// Orders exceeding stock are rejected; stock is decremented with a
  /// compare-and-set inside the order's atomic unit.
  Enforce,
}

impl StockPolicy {
  pub fn from_flag(enforce: bool) -> Self {
    if enforce {
      StockPolicy::Enforce
    } else {
      StockPolicy::Unchecked
    }
  }

  pub fn enforces(self) -> bool {
    self == StockPolicy::Enforce
  }
}

/// Whether catalog listings show products with zero stock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StockVisibility {
  #[default]
  IncludeOutOfStock,
  HideOutOfStock,
}

impl StockVisibility {
  pub fn from_flag(hide_out_of_stock: bool) -> Self {
    if hide_out_of_stock {
      StockVisibility::HideOutOfStock
    } else {
      StockVisibility::IncludeOutOfStock
    }
  }
}

/// Rows skipped before the requested page. Pages are 1-based.
///
/// `None` when the offset does not fit in an `i64`.
pub fn page_offset(page: i64, page_size: i64) -> Option<i64> {
  page.checked_sub(1)?.checked_mul(page_size)
}

/// Rejects `value` when it is longer than the column that stores it.
pub(crate) fn check_max_len(field: &str, value: &str, max: usize) -> ShopResult<()> {
  if value.chars().count() > max {
    return Err(ShopError::Validation(format!(
      "{} must be at most {} characters long.",
      field, max
    )));
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn first_page_starts_at_zero() {
    assert_eq!(page_offset(1, 20), Some(0));
    assert_eq!(page_offset(2, 20), Some(20));
    assert_eq!(page_offset(3, 7), Some(14));
  }

  #[test]
  fn huge_pages_do_not_overflow() {
    assert_eq!(page_offset(i64::MAX / 50, 100), None);
    assert_eq!(page_offset(i64::MIN, 1), None);
  }

  #[test]
  fn length_limit_counts_characters() {
    assert!(check_max_len("Category", &"é".repeat(MAX_CATEGORY_LEN), MAX_CATEGORY_LEN).is_ok());
    match check_max_len("Category", &"x".repeat(MAX_CATEGORY_LEN + 1), MAX_CATEGORY_LEN) {
      Err(ShopError::Validation(message)) => assert_eq!(message, "Category must be at most 100 characters long."),
      other => panic!("Expected Validation, got {:?}", other),
    }
  }

  #[test]
  fn flags_map_to_named_policies() {
    assert_eq!(StockPolicy::from_flag(false), StockPolicy::Unchecked);
    assert!(StockPolicy::from_flag(true).enforces());
    assert_eq!(StockVisibility::from_flag(true), StockVisibility::HideOutOfStock);
    assert_eq!(StockVisibility::default(), StockVisibility::IncludeOutOfStock);
  }
}
