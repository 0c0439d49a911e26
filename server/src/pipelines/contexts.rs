// server/src/pipelines/contexts.rs

//! Data carried through each pipeline run. Handlers receive these wrapped in
//! `orka::ContextData` and write their results back into the `Option` fields.

use crate::errors::AppError;
use crate::state::AppState;
use shopmock::models::{Order, OrderLine, User};
use shopmock::services::{AccessToken, PaymentReceipt, PricedOrder, Registration};
use shopmock::ShopError;

#[derive(Clone)]
pub struct SignupCtxData {
  pub app_state: AppState,
  pub registration: Registration,
  pub created_user: Option<User>,
}

impl SignupCtxData {
  pub fn new(app_state: AppState, registration: Registration) -> Self {
    Self {
      app_state,
      registration,
      created_user: None,
    }
  }
}

#[derive(Clone)]
pub struct SigninCtxData {
  pub app_state: AppState,
  pub username: String,
  pub password: String,
  pub user: Option<User>,
  pub access_token: Option<AccessToken>,
}

impl SigninCtxData {
  pub fn new(app_state: AppState, username: String, password: String) -> Self {
    Self {
      app_state,
      username,
      password,
      user: None,
      access_token: None,
    }
  }
}

#[derive(Clone)]
pub struct OrderCtxData {
  pub app_state: AppState,
  /// The authenticated caller's id, rendered as a string.
  pub owner: String,
  pub lines: Vec<OrderLine>,
  pub priced: Option<PricedOrder>,
  pub receipt: Option<PaymentReceipt>,
  pub order: Option<Order>,
}

impl OrderCtxData {
  pub fn new(app_state: AppState, owner: String, lines: Vec<OrderLine>) -> Self {
    Self {
      app_state,
      owner,
      lines,
      priced: None,
      receipt: None,
      order: None,
    }
  }
}

/// A value an earlier step should have written is absent.
pub fn missing(field: &str) -> AppError {
  AppError::from(ShopError::Internal(format!("pipeline context is missing '{}'", field)))
}

/// A handler returned `Stop`. None of these pipelines stop on purpose.
pub fn stopped(pipeline: &str) -> AppError {
  AppError::from(ShopError::Internal(format!("{} pipeline stopped before completion", pipeline)))
}
