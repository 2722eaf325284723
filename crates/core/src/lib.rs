//! Trolley
//!
//! Trolley is the storefront's cart domain: bounded-quantity line items,
//! an ordered unique-by-product cart with derived totals, a single-slot
//! undo buffer, and the session merge applied when an anonymous cart
//! meets an identity's server-side cart at login.

pub mod cart;
pub mod fixtures;
pub mod items;
pub mod merge;
pub mod undo;
