// core/src/services/auth.rs

//! Registration, login, the authorization gate and profile mutation.

use crate::error::{ShopError, ShopResult};
use crate::models::{NewUser, ProfileChanges, User};
use crate::policy::{check_max_len, MAX_EMAIL_LEN, MAX_FULL_NAME_LEN, MAX_USERNAME_LEN};
use crate::security::{self, TokenIssuer};
use crate::store::UserStore;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

pub const MIN_PASSWORD_LEN: usize = 8;

#[derive(Debug, Clone, Deserialize)]
pub struct Registration {
  pub email: String,
  pub username: String,
  #[serde(default)]
  pub full_name: String,
  pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AccessToken {
  pub access_token: String,
  pub token_type: String,
}

/// Emails are compared case-insensitively: they are stored trimmed and lower-cased.
pub fn normalize_email(email: &str) -> String {
  email.trim().to_lowercase()
}

fn validate_email(email: &str) -> ShopResult<()> {
  if email.is_empty() || !email.contains('@') {
    return Err(ShopError::Validation("Valid email is required.".to_string()));
  }
  check_max_len("Email", email, MAX_EMAIL_LEN)
}

fn validate_username(username: &str) -> ShopResult<()> {
  if username.is_empty() {
    return Err(ShopError::Validation("Username is required.".to_string()));
  }
  check_max_len("Username", username, MAX_USERNAME_LEN)
}

fn validate_new_password(password: &str) -> ShopResult<()> {
  if password.chars().count() < MIN_PASSWORD_LEN {
    return Err(ShopError::Validation(format!(
      "Password must be at least {} characters long.",
      MIN_PASSWORD_LEN
    )));
  }
  Ok(())
}

/// Normalizes a sign-up request and checks every field rule.
///
/// The email is normalized, the username and full name are trimmed.
/// Uniqueness is not checked here because it needs the store.
pub fn prepare_registration(registration: Registration) -> ShopResult<Registration> {
  let prepared = Registration {
    email: normalize_email(&registration.email),
    username: registration.username.trim().to_string(),
    full_name: registration.full_name.trim().to_string(),
    password: registration.password,
  };
  validate_email(&prepared.email)?;
  validate_username(&prepared.username)?;
  check_max_len("Full name", &prepared.full_name, MAX_FULL_NAME_LEN)?;
  validate_new_password(&prepared.password)?;
  Ok(prepared)
}

pub struct AuthService {
  users: Arc<dyn UserStore>,
  tokens: TokenIssuer,
}

impl AuthService {
  pub fn new(users: Arc<dyn UserStore>, tokens: TokenIssuer) -> Self {
    Self { users, tokens }
  }

  pub fn tokens(&self) -> &TokenIssuer {
    &self.tokens
  }

  /// Creates a regular, active user.
  pub async fn register(&self, registration: Registration) -> ShopResult<User> {
    self.create_user(registration, false).await
  }

  /// Creates an active superuser. Used for operator bootstrap, never exposed over HTTP.
  pub async fn create_superuser(&self, registration: Registration) -> ShopResult<User> {
    self.create_user(registration, true).await
  }

  #[instrument(
    name = "auth_service::create_user",
    skip(self, registration),
    fields(username = %registration.username)
  )]
  async fn create_user(&self, registration: Registration, is_superuser: bool) -> ShopResult<User> {
    let Registration {
      email,
      username,
      full_name,
      password,
    } = prepare_registration(registration)?;

    if self.users.find_by_email(&email).await?.is_some() {
      warn!("Attempt to register with existing email.");
      return Err(ShopError::Conflict("Email already registered".to_string()));
    }
    if self.users.find_by_username(&username).await?.is_some() {
      warn!("Attempt to register with existing username.");
      return Err(ShopError::Conflict("Username already taken".to_string()));
    }

    let hashed_password = security::hash_password(&password)?;
    // The store re-checks uniqueness, so a concurrent duplicate still ends as Conflict.
    let user = self
      .users
      .insert(NewUser {
        email,
        username,
        full_name,
        hashed_password,
        is_active: true,
        is_superuser,
      })
      .await?;
    info!(user_id = user.id, "User registered.");
    Ok(user)
  }

  /// Checks credentials and signs an access token for the user.
  pub async fn login(&self, username: &str, password: &str) -> ShopResult<AccessToken> {
    let user = self.verify_credentials(username, password).await?;
    self.issue_token(&user)
  }

  /// Unknown username and wrong password both give 401. The active flag is
  /// checked last (403).
  #[instrument(name = "auth_service::verify_credentials", skip(self, password))]
  pub async fn verify_credentials(&self, username: &str, password: &str) -> ShopResult<User> {
    let bad_credentials = || ShopError::Unauthorized("Incorrect username or password".to_string());

    let user = self.users.find_by_username(username).await?.ok_or_else(|| {
      debug!("Login for unknown username.");
      bad_credentials()
    })?;
    if !security::verify_password(&user.hashed_password, password)? {
      warn!(user_id = user.id, "Login with wrong password.");
      return Err(bad_credentials());
    }
    if !user.is_active {
      warn!(user_id = user.id, "Login for inactive account.");
      return Err(ShopError::Forbidden("Inactive user".to_string()));
    }
    Ok(user)
  }

  /// A bearer token whose subject is the user's current username.
  pub fn issue_token(&self, user: &User) -> ShopResult<AccessToken> {
    let access_token = self.tokens.issue(&user.username, None)?;
    info!(user_id = user.id, "Access token issued.");
    Ok(AccessToken {
      access_token,
      token_type: "bearer".to_string(),
    })
  }

  /// Resolves a bearer token to an active user.
  pub async fn authenticate(&self, token: &str) -> ShopResult<User> {
    let username = self
      .tokens
      .decode_subject(token)
      .ok_or_else(|| ShopError::Unauthorized("Could not validate credentials".to_string()))?;
    let user = self
      .users
      .find_by_username(&username)
      .await?
      .ok_or_else(|| ShopError::Unauthorized("User not found".to_string()))?;
    if !user.is_active {
      return Err(ShopError::Forbidden("Inactive user".to_string()));
    }
    Ok(user)
  }

  /// The stricter gate used by catalog mutation.
  pub fn require_superuser(&self, user: &User) -> ShopResult<()> {
    if !user.is_superuser {
      warn!(user_id = user.id, "Superuser privilege required.");
      return Err(ShopError::Forbidden("The user doesn't have enough privileges".to_string()));
    }
    Ok(())
  }

  #[instrument(name = "auth_service::change_password", skip_all, fields(user_id = user.id))]
  pub async fn change_password(&self, user: &User, current_password: &str, new_password: &str) -> ShopResult<()> {
    if !security::verify_password(&user.hashed_password, current_password)? {
      return Err(ShopError::Validation("Incorrect current password".to_string()));
    }
    validate_new_password(new_password)?;

    let mut updated = user.clone();
    updated.hashed_password = security::hash_password(new_password)?;
    self.users.save(&updated).await?;
    info!("Password changed.");
    Ok(())
  }

  /// Applies only the supplied fields; changed email/username are re-checked for uniqueness.
  #[instrument(name = "auth_service::update_profile", skip_all, fields(user_id = user.id))]
  pub async fn update_profile(&self, user: &User, changes: ProfileChanges) -> ShopResult<User> {
    let mut updated = user.clone();

    if let Some(email) = changes.email.as_deref().map(normalize_email) {
      if !email.is_empty() && email != user.email {
        validate_email(&email)?;
        if self.users.find_by_email(&email).await?.is_some() {
          return Err(ShopError::Conflict("Email already registered".to_string()));
        }
        updated.email = email;
      }
    }

    if let Some(username) = changes.username.as_deref().map(str::trim) {
      if !username.is_empty() && username != user.username {
        validate_username(username)?;
        if self.users.find_by_username(username).await?.is_some() {
          return Err(ShopError::Conflict("Username already taken".to_string()));
        }
        updated.username = username.to_string();
      }
    }

    if let Some(full_name) = changes.full_name {
      let full_name = full_name.trim();
      check_max_len("Full name", full_name, MAX_FULL_NAME_LEN)?;
      updated.full_name = full_name.to_string();
    }

    if let Some(password) = changes.password.filter(|p| !p.is_empty()) {
      validate_new_password(&password)?;
      updated.hashed_password = security::hash_password(&password)?;
    }

    let saved = self.users.save(&updated).await?;
    info!("Profile updated.");
    Ok(saved)
  }
}
