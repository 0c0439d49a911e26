// server/src/pipelines/signin_pipeline.rs

use crate::errors::AppError;
use crate::pipelines::contexts::{missing, SigninCtxData};
use orka::{ContextData, Orka, Pipeline, PipelineControl};
use std::sync::Arc;

pub fn register_signin_pipeline(orka_instance: &Arc<Orka<AppError>>) {
  let mut p = Pipeline::<SigninCtxData, AppError>::new(&[
    ("verify_credentials", false, None),
    ("issue_token", false, None),
  ]);

  p.on_root("verify_credentials", |ctx_data: ContextData<SigninCtxData>| {
    Box::pin(async move {
      let (auth, username, password) = {
        let guard = ctx_data.read();
        (guard.app_state.auth.clone(), guard.username.clone(), guard.password.clone())
      };
      let user = auth.verify_credentials(&username, &password).await?;
      {
        let mut guard = ctx_data.write();
        guard.user = Some(user);
        guard.password.clear();
      }
      Ok::<_, AppError>(PipelineControl::Continue)
    })
  });

  p.on_root("issue_token", |ctx_data: ContextData<SigninCtxData>| {
    Box::pin(async move {
      let mut guard = ctx_data.write();
      let user = guard.user.as_ref().ok_or_else(|| missing("user"))?;
      let token = guard.app_state.auth.issue_token(user)?;
      guard.access_token = Some(token);
      Ok::<_, AppError>(PipelineControl::Continue)
    })
  });

  orka_instance.register_pipeline(p);
}
