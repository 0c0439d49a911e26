// core/src/models/user.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct User {
  pub id: i64,
  pub email: String,
  pub username: String,
  pub full_name: String,
  #[serde(skip_serializing)] // Never send password hash to client
  pub hashed_password: String,
  pub is_active: bool,
  pub is_superuser: bool,
}

/// A user row before it has an id. The password is already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
  pub email: String,
  pub username: String,
  pub full_name: String,
  pub hashed_password: String,
  pub is_active: bool,
  pub is_superuser: bool,
}

/// Partial profile update; `None` leaves the field untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileChanges {
  pub email: Option<String>,
  pub username: Option<String>,
  pub full_name: Option<String>,
  pub password: Option<String>,
}
