// src/lib.rs

//! Orka: an async, type-safe step pipeline engine.
//!
//! A `Pipeline<TData, Err>` is an ordered list of named steps. Each step can
//! carry `before`, `on` and `after` handlers that share one `ContextData<TData>`.
//! A handler either lets the run continue or stops it; the first error ends
//! the run and is returned as-is.
//!
//! The `Orka<E>` registry keeps one pipeline per context type, so callers
//! only need the context to start the matching workflow:
//!
//! 1. Define a context struct `MyCtx`.
//! 2. Build a `Pipeline<MyCtx, MyError>` and attach handlers with `on_root` and friends.
//! 3. Register it once with `Orka::register_pipeline`.
//! 4. Run it with `orka.run(ContextData::new(my_ctx)).await` and read results back from the context.

pub mod core;
pub mod error;
pub mod pipeline;
pub mod registry;

pub use crate::core::context::Handler;
pub use crate::core::context_data::ContextData;
pub use crate::core::control::{PipelineControl, PipelineResult};
pub use crate::core::step::{SkipCondition, StepDef};

pub use crate::pipeline::definition::Pipeline;

pub use crate::error::{OrkaError, OrkaResult};

pub use crate::registry::Orka;
