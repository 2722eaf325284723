//! Order Models

use std::fmt::{Display, Formatter, Result as FmtResult};

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use trolley::items::LineItem;

use crate::domain::checkout::payments::PaymentConfirmation;

/// Lifecycle of an order.
///
/// Owned by the order-service collaborator; this crate only displays it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
    Refunded,
}

impl Display for OrderStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let status = match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Processing => "processing",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
            OrderStatus::Refunded => "refunded",
        };

        f.write_str(status)
    }
}

/// Order-creation request: the cart snapshot plus the captured payment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewOrder {
    /// Snapshot of the cart lines at submit time.
    pub items: Vec<LineItem>,
    /// Confirmation the payment collaborator issued.
    pub payment_confirmation: PaymentConfirmation,
    /// Grand total in minor units, subtotal plus shipping plus tax.
    pub total: u64,
}

/// Order Model
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub uuid: Uuid,
    pub items: Vec<LineItem>,
    pub payment_confirmation: PaymentConfirmation,
    pub total: u64,
    pub status: OrderStatus,
    pub placed_at: Timestamp,
}
