// tests/common/mod.rs
#![allow(dead_code)] // Not every test file uses every helper

use once_cell::sync::Lazy;
use orka::{ContextData, OrkaError, PipelineControl};
use tracing::Level;

/// Records which handlers ran, in order.
#[derive(Clone, Debug, Default)]
pub struct RunLog {
  pub entries: Vec<String>,
  pub stop_at: Option<String>,
  pub skip_audit: bool,
}

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum TestError {
  #[error("Orka framework error: {0}")]
  Orka(String),

  #[error("Test handler failed: {0}")]
  Handler(String),
}

impl From<OrkaError> for TestError {
  fn from(oe: OrkaError) -> Self {
    TestError::Orka(format!("{:?}", oe))
  }
}

/// Appends `label` to the log and stops if the context asks for it.
pub fn record(label: &'static str) -> impl Fn(ContextData<RunLog>) -> std::future::Ready<Result<PipelineControl, TestError>> {
  move |ctx: ContextData<RunLog>| {
    let mut guard = ctx.write();
    guard.entries.push(label.to_string());
    let control = if guard.stop_at.as_deref() == Some(label) {
      PipelineControl::Stop
    } else {
      PipelineControl::Continue
    };
    std::future::ready(Ok(control))
  }
}

static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer()
    .try_init()
    .ok();
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}
