// server/src/pipelines/signup_pipeline.rs

use crate::errors::AppError;
use crate::pipelines::contexts::SignupCtxData;
use orka::{ContextData, Orka, Pipeline, PipelineControl};
use shopmock::services::prepare_registration;
use std::sync::Arc;
use tracing::{event, Level};

pub fn register_signup_pipeline(orka_instance: &Arc<Orka<AppError>>) {
  let mut p = Pipeline::<SignupCtxData, AppError>::new(&[
    ("validate_signup_input", false, None),
    ("create_user", false, None),
  ]);

  // Field rules only; uniqueness is decided by `create_user`.
  p.on_root("validate_signup_input", |ctx_data: ContextData<SignupCtxData>| {
    Box::pin(async move {
      let mut guard = ctx_data.write();
      let prepared = prepare_registration(guard.registration.clone())?;
      event!(Level::DEBUG, username = %prepared.username, "Sign-up input accepted.");
      guard.registration = prepared;
      Ok::<_, AppError>(PipelineControl::Continue)
    })
  });

  p.on_root("create_user", |ctx_data: ContextData<SignupCtxData>| {
    Box::pin(async move {
      let (auth, registration) = {
        let guard = ctx_data.read();
        (guard.app_state.auth.clone(), guard.registration.clone())
      };
      let user = auth.register(registration).await?;
      ctx_data.write().created_user = Some(user);
      Ok::<_, AppError>(PipelineControl::Continue)
    })
  });

  orka_instance.register_pipeline(p);
}
