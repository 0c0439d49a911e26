// tests/pipeline_tests.rs
//! Runs the registered pipelines straight through `AppState::orka_instance`,
//! without the HTTP layer in front.
mod common;

use common::*;
use orka::{ContextData, PipelineResult};
use shopmock::models::OrderLine;
use shopmock::ShopError;
use shopmock_server::pipelines::contexts::{OrderCtxData, SigninCtxData, SignupCtxData};
use shopmock_server::AppError;

#[actix_web::test]
async fn test_all_pipelines_are_registered_at_startup() {
  let ctx = context();
  assert!(ctx.state.orka_instance.is_registered::<SignupCtxData>());
  assert!(ctx.state.orka_instance.is_registered::<SigninCtxData>());
  assert!(ctx.state.orka_instance.is_registered::<OrderCtxData>());
}

#[actix_web::test]
async fn test_order_pipeline_fills_the_context() {
  let ctx = context();
  let (user, _) = user_with_token(&ctx.state, "pipeline_buyer").await;
  let kettle = seed_product(&ctx.state, "Kettle", 2500, 4).await;

  let ctx_data = ContextData::new(OrderCtxData::new(
    ctx.state.clone(),
    user.id.to_string(),
    vec![OrderLine {
      product_id: kettle.id,
      quantity: 2,
    }],
  ));
  let result = ctx.state.orka_instance.run(ctx_data.clone()).await.unwrap();
  assert_eq!(result, PipelineResult::Completed);

  let guard = ctx_data.read();
  let receipt = guard.receipt.as_ref().expect("authorize stores the receipt");
  assert!(receipt.transaction_id.starts_with("dummy-"));
  // persist consumes the priced order.
  assert!(guard.priced.is_none());
  let order = guard.order.as_ref().expect("persist stores the order");
  assert_eq!(order.user_id, user.id.to_string());
  assert_eq!(order.total_amount, 5000);
  assert_eq!(order.items.len(), 1);
  assert_eq!(order.items[0].unit_price, 2500);
}

#[actix_web::test]
async fn test_order_pipeline_stops_at_the_first_failing_step() {
  let ctx = context();
  let (user, _) = user_with_token(&ctx.state, "pipeline_empty").await;

  let ctx_data = ContextData::new(OrderCtxData::new(ctx.state.clone(), user.id.to_string(), Vec::new()));
  match ctx.state.orka_instance.run(ctx_data.clone()).await {
    Err(AppError::Shop(ShopError::Validation(message))) => {
      assert_eq!(message, "Order must contain at least one item")
    }
    other => panic!("Expected Validation error, got {:?}", other),
  }

  let guard = ctx_data.read();
  assert!(guard.priced.is_none());
  assert!(guard.receipt.is_none());
  assert!(guard.order.is_none());
  drop(guard);
  assert!(ctx.state.orders.history(&user.id.to_string()).await.unwrap().is_empty());
}

#[actix_web::test]
async fn test_signup_then_signin_pipelines() {
  let ctx = context();

  let mut padded = registration("piper");
  padded.username = "  piper  ".to_string();
  let signup = ContextData::new(SignupCtxData::new(ctx.state.clone(), padded));
  let result = ctx.state.orka_instance.run(signup.clone()).await.unwrap();
  assert_eq!(result, PipelineResult::Completed);
  let created = signup.read().created_user.clone().expect("create_user stores the user");
  assert_eq!(created.username, "piper");

  let signin = ContextData::new(SigninCtxData::new(
    ctx.state.clone(),
    "piper".to_string(),
    TEST_PASSWORD.to_string(),
  ));
  let result = ctx.state.orka_instance.run(signin.clone()).await.unwrap();
  assert_eq!(result, PipelineResult::Completed);

  let guard = signin.read();
  assert!(guard.password.is_empty(), "the password is cleared once verified");
  assert_eq!(guard.user.as_ref().map(|u| u.id), Some(created.id));
  let token = guard.access_token.clone().expect("issue_token stores the token");
  drop(guard);
  let me = ctx.state.auth.authenticate(&token.access_token).await.unwrap();
  assert_eq!(me.id, created.id);
}

#[actix_web::test]
async fn test_signin_pipeline_rejects_a_wrong_password() {
  let ctx = context();
  user_with_token(&ctx.state, "pipeline_guard").await;

  let signin = ContextData::new(SigninCtxData::new(
    ctx.state.clone(),
    "pipeline_guard".to_string(),
    "not-the-password".to_string(),
  ));
  match ctx.state.orka_instance.run(signin.clone()).await {
    Err(AppError::Shop(ShopError::Unauthorized(_))) => {}
    other => panic!("Expected Unauthorized, got {:?}", other),
  }
  assert!(signin.read().access_token.is_none());
}
