//! Checkout service errors.

use thiserror::Error;

use crate::domain::{checkout::payments::PaymentError, orders::OrderServiceError};

#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("cart is empty")]
    EmptyCart,

    #[error("a submission is already in progress")]
    SubmissionInFlight,

    #[error("payment failed: {0}")]
    Payment(#[from] PaymentError),

    #[error("order could not be recorded: {0}")]
    Orders(#[from] OrderServiceError),
}
