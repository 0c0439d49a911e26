// server/src/web/handlers/auth_handlers.rs

use actix_web::{web, HttpResponse};
use orka::{ContextData, PipelineResult};
use serde::{Deserialize, Serialize};
use serde_json::json;
use shopmock::models::{ProfileChanges, User};
use shopmock::services::{AccessToken, Registration};
use tracing::{info, instrument};

use crate::errors::AppError;
use crate::pipelines::contexts::{missing, stopped, SigninCtxData, SignupCtxData};
use crate::state::AppState;
use crate::web::extractors::AuthenticatedUser;

// --- Request DTOs ---
#[derive(Deserialize)]
pub struct LoginRequestPayload {
  pub username: String,
  pub password: String,
}

#[derive(Deserialize)]
pub struct PasswordChangePayload {
  pub current_password: String,
  pub new_password: String,
}

// --- Response DTOs ---
/// The updated user plus a token for its current username. Tokens issued
/// before a username change stop resolving, so the client swaps in this one.
#[derive(Serialize)]
pub struct ProfileUpdateResponse {
  #[serde(flatten)]
  pub user: User,
  #[serde(flatten)]
  pub token: AccessToken,
}

// --- Handler Implementations ---

#[instrument(
    name = "handler::register",
    skip(app_state, req_payload),
    fields(req_username = %req_payload.username)
)]
pub async fn register_handler(
  app_state: web::Data<AppState>,
  req_payload: web::Json<Registration>,
) -> Result<HttpResponse, AppError> {
  let ctx_data = ContextData::new(SignupCtxData::new(app_state.get_ref().clone(), req_payload.into_inner()));

  match app_state.orka_instance.run(ctx_data.clone()).await? {
    PipelineResult::Completed => {
      let user = ctx_data.write().created_user.take().ok_or_else(|| missing("created_user"))?;
      info!(user_id = user.id, "Registration successful.");
      Ok(HttpResponse::Created().json(user))
    }
    PipelineResult::Stopped => Err(stopped("Sign-up")),
  }
}

#[instrument(
    name = "handler::login",
    skip(app_state, req_payload),
    fields(req_username = %req_payload.username)
)]
pub async fn login_handler(
  app_state: web::Data<AppState>,
  req_payload: web::Json<LoginRequestPayload>,
) -> Result<HttpResponse, AppError> {
  let LoginRequestPayload { username, password } = req_payload.into_inner();
  let ctx_data = ContextData::new(SigninCtxData::new(app_state.get_ref().clone(), username, password));

  match app_state.orka_instance.run(ctx_data.clone()).await? {
    PipelineResult::Completed => {
      let token = ctx_data.write().access_token.take().ok_or_else(|| missing("access_token"))?;
      Ok(HttpResponse::Ok().json(token))
    }
    PipelineResult::Stopped => Err(stopped("Sign-in")),
  }
}

/// Tokens are stateless; the client discards its copy.
#[instrument(name = "handler::logout", skip(auth_user), fields(user_id = auth_user.0.id))]
pub async fn logout_handler(auth_user: AuthenticatedUser) -> Result<HttpResponse, AppError> {
  info!("Logout requested.");
  Ok(HttpResponse::Ok().json(json!({ "message": "Successfully logged out" })))
}

pub async fn me_handler(auth_user: AuthenticatedUser) -> Result<HttpResponse, AppError> {
  Ok(HttpResponse::Ok().json(auth_user.0))
}

#[instrument(name = "handler::change_password", skip_all, fields(user_id = auth_user.0.id))]
pub async fn change_password_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
  req_payload: web::Json<PasswordChangePayload>,
) -> Result<HttpResponse, AppError> {
  app_state
    .auth
    .change_password(&auth_user.0, &req_payload.current_password, &req_payload.new_password)
    .await?;
  Ok(HttpResponse::Ok().json(json!({ "message": "Password changed successfully" })))
}

#[instrument(name = "handler::update_profile", skip_all, fields(user_id = auth_user.0.id))]
pub async fn update_profile_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
  req_payload: web::Json<ProfileChanges>,
) -> Result<HttpResponse, AppError> {
  let user = app_state
    .auth
    .update_profile(&auth_user.0, req_payload.into_inner())
    .await?;
  let token = app_state.auth.issue_token(&user)?;
  Ok(HttpResponse::Ok().json(ProfileUpdateResponse { user, token }))
}
