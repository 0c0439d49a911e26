// server/src/pipelines/mod.rs

//! Orka pipelines behind the multi-step endpoints: sign-up, sign-in and
//! order placement.

use crate::errors::AppError;
use orka::Orka;
use std::sync::Arc;

pub mod contexts;
pub mod order_pipeline;
pub mod signin_pipeline;
pub mod signup_pipeline;

/// Registers every pipeline with `orka_instance`. Called once while the
/// application state is built.
pub fn register_all_pipelines(orka_instance: &Arc<Orka<AppError>>) {
  signup_pipeline::register_signup_pipeline(orka_instance);
  signin_pipeline::register_signin_pipeline(orka_instance);
  order_pipeline::register_order_pipeline(orka_instance);
  tracing::debug!("All application pipelines registered with Orka.");
}
