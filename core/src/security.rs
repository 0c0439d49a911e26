// core/src/security.rs

//! Password hashing and signed bearer tokens.

use crate::error::ShopError;
use argon2::{
  password_hash::{
    rand_core::OsRng, // For generating random salts
    PasswordHash,
    PasswordHasher,
    PasswordVerifier,
    SaltString,
  },
  Argon2,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, instrument};

/// Longest password prefix, in bytes, that takes part in hashing.
pub const MAX_PASSWORD_BYTES: usize = 72;

/// Token lifetime used when the caller does not pass one.
pub const DEFAULT_TOKEN_LIFETIME_MINUTES: i64 = 30;
/// One year.
pub const MAX_TOKEN_LIFETIME_MINUTES: i64 = 525_600;

/// Cuts `password` to at most `MAX_PASSWORD_BYTES` bytes without splitting a
/// UTF-8 sequence. Both the hash and the verify path go through this.
pub fn truncate_password(password: &str) -> &str {
  if password.len() <= MAX_PASSWORD_BYTES {
    return password;
  }
  let mut end = MAX_PASSWORD_BYTES;
  while !password.is_char_boundary(end) {
    end -= 1;
  }
  &password[..end]
}

/// Hashes a plain-text password using Argon2 with a fresh random salt.
#[instrument(name = "security::hash_password", skip(password), err(Display))]
pub fn hash_password(password: &str) -> Result<String, ShopError> {
  if password.is_empty() {
    return Err(ShopError::Validation("Password cannot be empty.".to_string()));
  }

  let salt = SaltString::generate(&mut OsRng);
  let argon2_hasher = Argon2::default();

  match argon2_hasher.hash_password(truncate_password(password).as_bytes(), &salt) {
    Ok(password_hash_obj) => {
      debug!("Password hashed successfully.");
      Ok(password_hash_obj.to_string())
    }
    Err(argon_err) => {
      error!(error = %argon_err, "Argon2 password hashing failed.");
      Err(ShopError::Internal(format!("Password hashing process failed: {}", argon_err)))
    }
  }
}

/// Verifies a plain-text password against a stored Argon2 hash.
///
/// `Ok(false)` means the password does not match. An unparsable stored hash
/// is an internal error, not an authentication failure.
#[instrument(name = "security::verify_password", skip(hashed_password, provided_password), err(Display))]
pub fn verify_password(hashed_password: &str, provided_password: &str) -> Result<bool, ShopError> {
  if provided_password.is_empty() {
    return Ok(false);
  }

  let parsed_hash = PasswordHash::new(hashed_password).map_err(|parse_err| {
    error!(error = %parse_err, "Failed to parse stored password hash string.");
    ShopError::Internal(format!("Invalid stored password hash format: {}", parse_err))
  })?;

  match Argon2::default().verify_password(truncate_password(provided_password).as_bytes(), &parsed_hash) {
    Ok(()) => Ok(true),
    Err(argon2::password_hash::Error::Password) => {
      debug!("Password verification failed: Passwords do not match.");
      Ok(false)
    }
    Err(other_argon_err) => {
      error!(error = %other_argon_err, "Argon2 password verification process encountered an error.");
      Err(ShopError::Internal(format!(
        "Password verification process failed: {}",
        other_argon_err
      )))
    }
  }
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
  sub: String,
  exp: i64,
}

/// Issues and decodes HS256 access tokens whose subject is a username.
#[derive(Clone)]
pub struct TokenIssuer {
  encoding_key: EncodingKey,
  decoding_key: DecodingKey,
  default_lifetime: Duration,
}

impl std::fmt::Debug for TokenIssuer {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("TokenIssuer")
      .field("default_lifetime", &self.default_lifetime)
      .finish_non_exhaustive()
  }
}

impl TokenIssuer {
  pub fn new(secret: &[u8], default_lifetime: Duration) -> Self {
    Self {
      encoding_key: EncodingKey::from_secret(secret),
      decoding_key: DecodingKey::from_secret(secret),
      default_lifetime,
    }
  }

  /// Signs a token for `subject` valid for `lifetime`, or the issuer's
  /// default lifetime when `None`.
  pub fn issue(&self, subject: &str, lifetime: Option<Duration>) -> Result<String, ShopError> {
    let expires_at = Utc::now()
      .checked_add_signed(lifetime.unwrap_or(self.default_lifetime))
      .ok_or_else(|| ShopError::Internal("Token lifetime is out of range".to_string()))?;
    let claims = Claims {
      sub: subject.to_string(),
      exp: expires_at.timestamp(),
    };
    encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
      .map_err(|e| ShopError::Internal(format!("Token signing failed: {}", e)))
  }

  /// Returns the token's subject, or `None` on any signature, format or
  /// expiry problem. Never fails louder than that.
  pub fn decode_subject(&self, token: &str) -> Option<String> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;
    match decode::<Claims>(token, &self.decoding_key, &validation) {
      Ok(data) if !data.claims.sub.is_empty() => Some(data.claims.sub),
      Ok(_) => None,
      Err(e) => {
        debug!(error = %e, "Rejected bearer token.");
        None
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn truncation_respects_char_boundaries() {
    let ascii = "a".repeat(100);
    assert_eq!(truncate_password(&ascii).len(), 72);

    // 71 ASCII bytes followed by a 2-byte char straddling the limit.
    let straddling = format!("{}é", "b".repeat(71));
    assert_eq!(truncate_password(&straddling), "b".repeat(71));

    assert_eq!(truncate_password("short"), "short");
  }

  #[test]
  fn long_passwords_verify_after_hashing() {
    let long = "p".repeat(80);
    let hash = hash_password(&long).unwrap();
    assert!(verify_password(&hash, &long).unwrap());
    // Only the first 72 bytes count.
    assert!(verify_password(&hash, &"p".repeat(72)).unwrap());
    assert!(!verify_password(&hash, &"p".repeat(71)).unwrap());
  }

  #[test]
  fn wrong_password_is_a_mismatch_not_an_error() {
    let hash = hash_password("correct horse").unwrap();
    assert!(!verify_password(&hash, "battery staple").unwrap());
  }

  #[test]
  fn token_round_trip_and_fail_closed() {
    let issuer = TokenIssuer::new(b"test-secret", Duration::minutes(30));
    let token = issuer.issue("alice", None).unwrap();
    assert_eq!(issuer.decode_subject(&token).as_deref(), Some("alice"));

    let other = TokenIssuer::new(b"other-secret", Duration::minutes(30));
    assert_eq!(other.decode_subject(&token), None);

    let expired = issuer.issue("alice", Some(Duration::minutes(-5))).unwrap();
    assert_eq!(issuer.decode_subject(&expired), None);

    assert_eq!(issuer.decode_subject("not-a-token"), None);
  }

  #[test]
  fn unrepresentable_expiry_is_an_error() {
    let issuer = TokenIssuer::new(b"test-secret", Duration::minutes(30));
    match issuer.issue("alice", Some(Duration::MAX)) {
      Err(ShopError::Internal(message)) => assert_eq!(message, "Token lifetime is out of range"),
      other => panic!("Expected Internal, got {:?}", other),
    }
    assert!(issuer.issue("alice", Some(Duration::minutes(MAX_TOKEN_LIFETIME_MINUTES))).is_ok());
  }
}
