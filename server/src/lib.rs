// server/src/lib.rs

//! HTTP surface of the mock shop: configuration, error mapping, auth guards,
//! the Orka pipelines, routes and startup seeding. The domain logic lives in
//! `shopmock`.

pub mod config;
pub mod errors;
pub mod pipelines;
pub mod seed;
pub mod state;
pub mod web;

pub use config::AppConfig;
pub use errors::{AppError, Result};
pub use state::AppState;
