// orka/src/core/control.rs

//! Flow signals returned by handlers and the outcome of a run.

/// Returned by a handler to steer the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineControl {
  /// Go on with the next handler or step.
  Continue,
  /// Halt the run now. Nothing after this handler executes.
  Stop,
}

/// How a run ended when no handler failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineResult {
  /// Every step ran.
  Completed,
  /// A handler returned `PipelineControl::Stop`.
  Stopped,
}
