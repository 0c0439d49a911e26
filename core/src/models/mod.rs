// core/src/models/mod.rs

//! Data structures representing the shop's tables and the write-side inputs for them.

pub mod order;
pub mod product;
pub mod user;

pub use order::{NewOrderItem, Order, OrderDraft, OrderItem, OrderLine, ORDER_STATUS_PAID};
pub use product::{NewProduct, Product, ProductChanges, ProductPage, ProductQuery};
pub use user::{NewUser, ProfileChanges, User};
