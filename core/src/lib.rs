// src/lib.rs

//! shopmock: the domain core of a small mock e-commerce backend.
//!
//! It provides:
//!  - Identity: registration, login with signed bearer tokens, profile and password changes.
//!  - Catalog: paginated, searchable product listing and superuser-only mutation.
//!  - A payment stub that always authorizes.
//!  - The order placement workflow (validate -> price -> authorize -> persist), where
//!    order and items are committed as one unit and unit prices are snapshotted.
//!  - Storage seams with a PostgreSQL backend and an in-memory backend.
//!
//! HTTP wiring lives in the `shopmock_server` crate.

pub mod error;
pub mod models;
pub mod policy;
pub mod security;
pub mod services;
pub mod store;

// --- Re-exports for the Public API ---

pub use crate::error::{ShopError, ShopResult};
pub use crate::policy::{StockPolicy, StockVisibility};
pub use crate::security::TokenIssuer;
pub use crate::services::{AuthService, CatalogService, OrderWorkflow, PaymentGateway, StubPaymentGateway};
pub use crate::store::{MemoryStore, PgStore, Repositories};
