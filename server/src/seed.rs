// server/src/seed.rs

//! Startup data: a demo catalog and an optional bootstrap superuser.

use shopmock::models::NewProduct;
use shopmock::services::Registration;
use shopmock::{AuthService, CatalogService, ShopError, ShopResult};
use tracing::{info, instrument};

use crate::config::AdminBootstrap;

// (name, category, price in cents, stock)
const DEMO_PRODUCTS: &[(&str, &str, i64, i32)] = &[
  ("Classic White T-Shirt", "apparel", 1999, 120),
  ("Slim Fit Jeans", "apparel", 5999, 45),
  ("Canvas Sneakers", "footwear", 4950, 30),
  ("Leather Wallet", "accessories", 3500, 60),
  ("Stainless Water Bottle", "outdoors", 2450, 80),
  ("Wireless Earbuds", "electronics", 8999, 25),
  ("Desk Lamp", "home", 3299, 15),
  ("Ceramic Coffee Mug", "home", 1200, 200),
];

/// Inserts the demo catalog when no products exist yet. Returns how many were created.
///
/// Out-of-stock products count as existing even when listings hide them.
#[instrument(name = "seed::catalog", skip(catalog))]
pub async fn seed_catalog(catalog: &CatalogService) -> ShopResult<usize> {
  let existing = catalog.count_all().await?;
  if existing > 0 {
    info!(existing, "Catalog already populated; skipping seed.");
    return Ok(0);
  }

  for (name, category, price, stock) in DEMO_PRODUCTS {
    catalog
      .create(NewProduct {
        name: (*name).to_string(),
        description: Some(format!("Demo {} item.", category)),
        price: *price,
        stock: *stock,
        image_url: None,
        category: Some((*category).to_string()),
      })
      .await?;
  }
  info!(count = DEMO_PRODUCTS.len(), "Demo catalog seeded.");
  Ok(DEMO_PRODUCTS.len())
}

/// Creates the configured superuser. An existing user with that username or email is left alone.
#[instrument(name = "seed::admin", skip_all, fields(username = %admin.username))]
pub async fn bootstrap_admin(auth: &AuthService, admin: &AdminBootstrap) -> ShopResult<bool> {
  let registration = Registration {
    email: admin.email.clone(),
    username: admin.username.clone(),
    full_name: "Administrator".to_string(),
    password: admin.password.clone(),
  };
  match auth.create_superuser(registration).await {
    Ok(user) => {
      info!(user_id = user.id, "Bootstrap superuser created.");
      Ok(true)
    }
    Err(ShopError::Conflict(reason)) => {
      info!(%reason, "Bootstrap superuser already present.");
      Ok(false)
    }
    Err(err) => Err(err),
  }
}
