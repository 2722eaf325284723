//! Cart

pub mod events;
pub mod service;

pub use events::CartEvent;
pub use service::CartManager;
