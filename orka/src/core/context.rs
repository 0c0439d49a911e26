// orka/src/core/context.rs

//! The boxed handler type stored by a pipeline.

use crate::core::context_data::ContextData;
use crate::core::control::PipelineControl;
use std::future::Future;
use std::pin::Pin;

/// A pipeline step handler.
///
/// It receives a clone of the shared `ContextData<TData>` and resolves to
/// `Continue` or `Stop`. Handlers must drop every lock guard before they
/// reach an `.await`.
pub type Handler<TData, Err> = Box<
  dyn Fn(ContextData<TData>) -> Pin<Box<dyn Future<Output = Result<PipelineControl, Err>> + Send>>
    + Send
    + Sync,
>;
