// orka/src/pipeline/execution.rs

//! `Pipeline::run`: walks the steps and their handler phases in order.

use crate::core::context::Handler;
use crate::core::context_data::ContextData;
use crate::core::control::{PipelineControl, PipelineResult};
use crate::error::OrkaError;
use crate::pipeline::definition::Pipeline;
use tracing::{event, info_span, instrument, Instrument, Level};

impl<TData, Err> Pipeline<TData, Err>
where
  TData: 'static + Send + Sync,
  Err: std::error::Error + From<OrkaError> + Send + Sync + 'static,
{
  /// Runs every step against `ctx_data`.
  ///
  /// Per step: `skip_if`, then `before`, `on` and `after` handlers. A required
  /// step without handlers fails with `OrkaError::HandlerMissing`.
  #[instrument(
    name = "Pipeline::run",
    skip_all,
    fields(
      pipeline_context_data_type = %std::any::type_name::<TData>(),
      num_steps = self.steps.len(),
    ),
    err(Display)
  )]
  pub async fn run(&self, ctx_data: ContextData<TData>) -> Result<PipelineResult, Err> {
    event!(Level::DEBUG, "Pipeline execution starting.");

    for (step_idx, step_def) in self.steps.iter().enumerate() {
      let step_name = step_def.name.as_str();
      let step_span = info_span!("pipeline_step_execution", step_name, step_index = step_idx);

      if let Some(skip_cond_fn) = &step_def.skip_if {
        if skip_cond_fn(ctx_data.clone()) {
          event!(parent: &step_span, Level::INFO, "Step skipped due to 'skip_if' condition.");
          continue;
        }
      }

      let phases = [
        ("before", self.before.get(step_name)),
        ("on", self.on.get(step_name)),
        ("after", self.after.get(step_name)),
      ];
      if phases.iter().all(|(_, handlers)| handlers.map_or(true, |h| h.is_empty())) {
        if step_def.optional {
          event!(parent: &step_span, Level::DEBUG, "Optional step has no handlers, skipping.");
          continue;
        }
        event!(parent: &step_span, Level::ERROR, "Non-optional step has no handlers.");
        return Err(Err::from(OrkaError::HandlerMissing {
          step_name: step_def.name.clone(),
        }));
      }

      for (phase, handlers) in phases {
        let Some(handlers) = handlers else { continue };
        let control = Self::run_phase(phase, handlers, &ctx_data)
          .instrument(step_span.clone())
          .await?;
        if control == PipelineControl::Stop {
          event!(parent: &step_span, Level::INFO, phase, "Pipeline stopped by a handler.");
          return Ok(PipelineResult::Stopped);
        }
      }
    }

    event!(Level::DEBUG, "Pipeline execution completed successfully.");
    Ok(PipelineResult::Completed)
  }

  async fn run_phase(
    phase: &str,
    handlers: &[Handler<TData, Err>],
    ctx_data: &ContextData<TData>,
  ) -> Result<PipelineControl, Err> {
    for handler_fn in handlers {
      match handler_fn(ctx_data.clone()).await {
        Ok(PipelineControl::Continue) => {}
        Ok(PipelineControl::Stop) => return Ok(PipelineControl::Stop),
        Err(e) => {
          event!(Level::ERROR, error = %e, phase, "Handler failed.");
          return Err(e);
        }
      }
    }
    Ok(PipelineControl::Continue)
  }
}
