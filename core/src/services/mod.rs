// core/src/services/mod.rs

pub mod auth;
pub mod catalog;
pub mod orders;
pub mod payment;

pub use auth::{prepare_registration, AccessToken, AuthService, Registration};
pub use catalog::CatalogService;
pub use orders::{OrderWorkflow, PricedOrder};
pub use payment::{PaymentGateway, PaymentReceipt, PaymentStatus, StubPaymentGateway};
