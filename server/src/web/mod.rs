// server/src/web/mod.rs

pub mod extractors;
pub mod handlers;
pub mod routes;

pub use extractors::{AuthenticatedUser, SuperUser};
pub use routes::{configure_app_routes, not_found_handler};
