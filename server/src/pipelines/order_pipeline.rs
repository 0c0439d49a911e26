// server/src/pipelines/order_pipeline.rs

use crate::errors::AppError;
use crate::pipelines::contexts::{missing, OrderCtxData};
use orka::{ContextData, Orka, Pipeline, PipelineControl};
use std::sync::Arc;
use tracing::info;

pub const ORDER_STEPS: [&str; 4] = ["validate", "price", "authorize", "persist"];

/// Order placement. Nothing is written before `persist`, and the first
/// failing step ends the run with its error.
pub fn register_order_pipeline(orka_instance: &Arc<Orka<AppError>>) {
  let mut p = Pipeline::<OrderCtxData, AppError>::new(&[
    (ORDER_STEPS[0], false, None),
    (ORDER_STEPS[1], false, None),
    (ORDER_STEPS[2], false, None),
    (ORDER_STEPS[3], false, None),
  ]);

  p.on_root("validate", |ctx_data: ContextData<OrderCtxData>| {
    Box::pin(async move {
      let (workflow, lines) = {
        let guard = ctx_data.read();
        (guard.app_state.orders.clone(), guard.lines.clone())
      };
      workflow.validate(&lines).await?;
      Ok::<_, AppError>(PipelineControl::Continue)
    })
  });

  // Prices are re-read here and snapshotted into the items.
  p.on_root("price", |ctx_data: ContextData<OrderCtxData>| {
    Box::pin(async move {
      let (workflow, lines) = {
        let guard = ctx_data.read();
        (guard.app_state.orders.clone(), guard.lines.clone())
      };
      let priced = workflow.price(&lines).await?;
      ctx_data.write().priced = Some(priced);
      Ok::<_, AppError>(PipelineControl::Continue)
    })
  });

  p.on_root("authorize", |ctx_data: ContextData<OrderCtxData>| {
    Box::pin(async move {
      let (workflow, total_amount) = {
        let guard = ctx_data.read();
        let priced = guard.priced.as_ref().ok_or_else(|| missing("priced"))?;
        (guard.app_state.orders.clone(), priced.total_amount)
      };
      let receipt = workflow.authorize(total_amount)?;
      ctx_data.write().receipt = Some(receipt);
      Ok::<_, AppError>(PipelineControl::Continue)
    })
  });

  p.on_root("persist", |ctx_data: ContextData<OrderCtxData>| {
    Box::pin(async move {
      let (workflow, owner, priced, receipt) = {
        let mut guard = ctx_data.write();
        let priced = guard.priced.take().ok_or_else(|| missing("priced"))?;
        let receipt = guard.receipt.clone().ok_or_else(|| missing("receipt"))?;
        (guard.app_state.orders.clone(), guard.owner.clone(), priced, receipt)
      };
      let order = workflow.persist(&owner, priced, &receipt).await?;
      info!(
        order_id = order.id,
        total_amount = order.total_amount,
        transaction_id = %receipt.transaction_id,
        "Order placed."
      );
      ctx_data.write().order = Some(order);
      Ok::<_, AppError>(PipelineControl::Continue)
    })
  });

  orka_instance.register_pipeline(p);
}
