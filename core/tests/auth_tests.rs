// tests/auth_tests.rs
mod common;

use common::*;
use shopmock::models::ProfileChanges;
use shopmock::ShopError;

#[tokio::test]
async fn test_register_creates_active_regular_user() {
  let shop = shop();
  let user = shop.auth.register(registration("alice", "Alice@Example.com")).await.unwrap();
  assert_eq!(user.username, "alice");
  assert_eq!(user.email, "alice@example.com");
  assert!(user.is_active);
  assert!(!user.is_superuser);
  assert_ne!(user.hashed_password, TEST_PASSWORD);
}

#[tokio::test]
async fn test_duplicate_email_or_username_conflicts() {
  let shop = shop();
  shop.auth.register(registration("alice", "alice@x.com")).await.unwrap();

  match shop.auth.register(registration("alice2", "alice@x.com")).await {
    Err(ShopError::Conflict(message)) => assert_eq!(message, "Email already registered"),
    other => panic!("Expected Conflict, got {:?}", other),
  }
  match shop.auth.register(registration("alice", "other@x.com")).await {
    Err(ShopError::Conflict(message)) => assert_eq!(message, "Username already taken"),
    other => panic!("Expected Conflict, got {:?}", other),
  }
}

#[tokio::test]
async fn test_email_uniqueness_ignores_case_but_username_does_not() {
  let shop = shop();
  shop.auth.register(registration("bob", "user@x.com")).await.unwrap();

  let err = shop.auth.register(registration("bob2", "User@x.com")).await.unwrap_err();
  assert!(matches!(err, ShopError::Conflict(_)));

  // Usernames are case-sensitive.
  shop.auth.register(registration("Bob", "bob-upper@x.com")).await.unwrap();
}

#[tokio::test]
async fn test_registration_input_is_validated() {
  let shop = shop();
  let mut short_password = registration("carol", "carol@x.com");
  short_password.password = "short".to_string();
  assert!(matches!(
    shop.auth.register(short_password).await,
    Err(ShopError::Validation(_))
  ));
  assert!(matches!(
    shop.auth.register(registration("carol", "not-an-email")).await,
    Err(ShopError::Validation(_))
  ));
  assert!(matches!(
    shop.auth.register(registration("   ", "carol@x.com")).await,
    Err(ShopError::Validation(_))
  ));
}

#[tokio::test]
async fn test_registration_fields_must_fit_their_columns() {
  let shop = shop();
  let long_username = "u".repeat(101);
  let long_email = format!("{}@x.com", "e".repeat(250));

  match shop.auth.register(registration(&long_username, "ok@x.com")).await {
    Err(ShopError::Validation(message)) => assert_eq!(message, "Username must be at most 100 characters long."),
    other => panic!("Expected Validation, got {:?}", other),
  }
  match shop.auth.register(registration("kim", &long_email)).await {
    Err(ShopError::Validation(message)) => assert_eq!(message, "Email must be at most 255 characters long."),
    other => panic!("Expected Validation, got {:?}", other),
  }
  let mut long_full_name = registration("kim", "kim@x.com");
  long_full_name.full_name = "f".repeat(256);
  assert!(matches!(
    shop.auth.register(long_full_name).await,
    Err(ShopError::Validation(_))
  ));

  // Exactly at the limit registers.
  let user = shop
    .auth
    .register(registration(&"u".repeat(100), "kim@x.com"))
    .await
    .unwrap();

  let rename = ProfileChanges {
    username: Some(long_username),
    ..Default::default()
  };
  assert!(matches!(
    shop.auth.update_profile(&user, rename).await,
    Err(ShopError::Validation(_))
  ));
}

#[tokio::test]
async fn test_login_issues_token_that_authenticates() {
  let shop = shop();
  let user = shop.auth.register(registration("dave", "dave@x.com")).await.unwrap();

  let token = shop.auth.login("dave", TEST_PASSWORD).await.unwrap();
  assert_eq!(token.token_type, "bearer");

  let resolved = shop.auth.authenticate(&token.access_token).await.unwrap();
  assert_eq!(resolved.id, user.id);
}

#[tokio::test]
async fn test_login_with_wrong_password_or_unknown_user_is_unauthorized() {
  let shop = shop();
  shop.auth.register(registration("erin", "erin@x.com")).await.unwrap();

  assert!(matches!(
    shop.auth.login("erin", "wrong-password").await,
    Err(ShopError::Unauthorized(_))
  ));
  assert!(matches!(
    shop.auth.login("nobody", TEST_PASSWORD).await,
    Err(ShopError::Unauthorized(_))
  ));
}

#[tokio::test]
async fn test_inactive_user_is_forbidden_even_with_correct_password() {
  let shop = shop();
  let user = shop.auth.register(registration("frank", "frank@x.com")).await.unwrap();
  let token = shop.auth.login("frank", TEST_PASSWORD).await.unwrap();

  assert!(shop.store.set_user_active(user.id, false));

  assert!(matches!(
    shop.auth.login("frank", TEST_PASSWORD).await,
    Err(ShopError::Forbidden(_))
  ));
  assert!(matches!(
    shop.auth.authenticate(&token.access_token).await,
    Err(ShopError::Forbidden(_))
  ));
}

#[tokio::test]
async fn test_authenticate_fails_closed_on_bad_tokens() {
  let shop = shop();
  assert!(matches!(
    shop.auth.authenticate("garbage").await,
    Err(ShopError::Unauthorized(_))
  ));

  // Valid signature, but the subject does not exist.
  let orphan = shop.auth.tokens().issue("ghost", None).unwrap();
  assert!(matches!(
    shop.auth.authenticate(&orphan).await,
    Err(ShopError::Unauthorized(_))
  ));
}

#[tokio::test]
async fn test_password_longer_than_72_bytes_round_trips_through_login() {
  let shop = shop();
  let long_password = "å".repeat(50); // 100 bytes
  let mut reg = registration("gina", "gina@x.com");
  reg.password = long_password.clone();
  shop.auth.register(reg).await.unwrap();

  shop.auth.login("gina", &long_password).await.unwrap();
}

#[tokio::test]
async fn test_change_password_requires_current_password() {
  let shop = shop();
  let user = shop.auth.register(registration("hank", "hank@x.com")).await.unwrap();

  let err = shop
    .auth
    .change_password(&user, "not-the-password", "brand-new-secret")
    .await
    .unwrap_err();
  match err {
    ShopError::Validation(message) => assert_eq!(message, "Incorrect current password"),
    other => panic!("Expected Validation, got {:?}", other),
  }

  shop
    .auth
    .change_password(&user, TEST_PASSWORD, "brand-new-secret")
    .await
    .unwrap();
  assert!(shop.auth.login("hank", TEST_PASSWORD).await.is_err());
  shop.auth.login("hank", "brand-new-secret").await.unwrap();
}

#[tokio::test]
async fn test_update_profile_applies_only_supplied_fields() {
  let shop = shop();
  let user = shop.auth.register(registration("ivy", "ivy@x.com")).await.unwrap();

  let updated = shop
    .auth
    .update_profile(
      &user,
      ProfileChanges {
        full_name: Some("Ivy Renamed".to_string()),
        ..Default::default()
      },
    )
    .await
    .unwrap();
  assert_eq!(updated.full_name, "Ivy Renamed");
  assert_eq!(updated.email, "ivy@x.com");
  assert_eq!(updated.username, "ivy");
  assert_eq!(updated.hashed_password, user.hashed_password);
}

#[tokio::test]
async fn test_update_profile_rechecks_uniqueness() {
  let shop = shop();
  shop.auth.register(registration("jack", "jack@x.com")).await.unwrap();
  let jill = shop.auth.register(registration("jill", "jill@x.com")).await.unwrap();

  let email_taken = ProfileChanges {
    email: Some("JACK@x.com".to_string()),
    ..Default::default()
  };
  assert!(matches!(
    shop.auth.update_profile(&jill, email_taken).await,
    Err(ShopError::Conflict(_))
  ));

  let username_taken = ProfileChanges {
    username: Some("jack".to_string()),
    ..Default::default()
  };
  assert!(matches!(
    shop.auth.update_profile(&jill, username_taken).await,
    Err(ShopError::Conflict(_))
  ));

  // Re-submitting your own values is not a conflict.
  let unchanged = ProfileChanges {
    email: Some("jill@x.com".to_string()),
    username: Some("jill".to_string()),
    ..Default::default()
  };
  shop.auth.update_profile(&jill, unchanged).await.unwrap();
}

#[tokio::test]
async fn test_superuser_gate() {
  let shop = shop();
  let regular = shop.auth.register(registration("kim", "kim@x.com")).await.unwrap();
  let admin = shop.auth.create_superuser(registration("root", "root@x.com")).await.unwrap();

  assert!(matches!(shop.auth.require_superuser(&regular), Err(ShopError::Forbidden(_))));
  shop.auth.require_superuser(&admin).unwrap();
}
