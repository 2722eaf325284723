//! Checkout

pub mod errors;
pub mod payments;
pub mod service;

pub use errors::CheckoutError;
pub use payments::{
    PaymentConfirmation, PaymentError, PaymentGateway, PurchaseLine, PurchaseRequest,
    SandboxPaymentGateway,
};
pub use service::{CheckoutRequest, CheckoutService, CheckoutState};
