// server/src/web/extractors.rs

//! Request guards that resolve the bearer token to a user.

use actix_web::dev::Payload;
use actix_web::http::header;
use actix_web::{web, FromRequest, HttpRequest};
use futures_util::future::LocalBoxFuture;
use shopmock::models::User;
use shopmock::ShopError;
use tracing::debug;

use crate::errors::AppError;
use crate::state::AppState;

/// Any active user holding a valid token. Missing or bad token -> 401, inactive -> 403.
#[derive(Debug)]
pub struct AuthenticatedUser(pub User);

/// An active superuser. Checked after authentication, so a bad token is still a 401.
#[derive(Debug)]
pub struct SuperUser(pub User);

fn bearer_token(req: &HttpRequest) -> Option<String> {
  let value = req.headers().get(header::AUTHORIZATION)?.to_str().ok()?;
  let (scheme, token) = value.split_once(' ')?;
  let token = token.trim();
  if !scheme.eq_ignore_ascii_case("bearer") || token.is_empty() {
    return None;
  }
  Some(token.to_string())
}

fn app_state(req: &HttpRequest) -> Result<web::Data<AppState>, AppError> {
  req
    .app_data::<web::Data<AppState>>()
    .cloned()
    .ok_or_else(|| ShopError::Internal("Application state is not registered".to_string()).into())
}

impl FromRequest for AuthenticatedUser {
  type Error = AppError;
  type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

  fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
    let state = app_state(req);
    let token = bearer_token(req);

    Box::pin(async move {
      let state = state?;
      let token = token.ok_or_else(|| {
        debug!("Request without a bearer token.");
        ShopError::Unauthorized("Not authenticated".to_string())
      })?;
      let user = state.auth.authenticate(&token).await?;
      Ok(AuthenticatedUser(user))
    })
  }
}

impl FromRequest for SuperUser {
  type Error = AppError;
  type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

  fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
    let state = app_state(req);
    let authenticated = AuthenticatedUser::from_request(req, payload);

    Box::pin(async move {
      let AuthenticatedUser(user) = authenticated.await?;
      state?.auth.require_superuser(&user)?;
      Ok(SuperUser(user))
    })
  }
}
