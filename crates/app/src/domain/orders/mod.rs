//! Orders

pub mod models;
pub mod service;

pub use models::{NewOrder, Order, OrderStatus};
pub use service::*;
