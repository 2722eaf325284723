//! Payment collaborator.
//!
//! The gateway receives a fully-formed purchase request and answers with
//! an opaque capture confirmation. Token exchange and the wire protocol
//! are entirely its concern; this crate never sees them.

use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    time::Duration,
};

use async_trait::async_trait;
use mockall::automock;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::time::sleep;
use tracing::debug;
use uuid::Uuid;

use trolley::items::{LineItem, Quantity, UnitPrice};

/// One purchasable line as the gateway sees it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PurchaseLine {
    /// Display name forwarded to the gateway.
    pub name: String,
    /// Units purchased.
    pub quantity: Quantity,
    /// Price per unit.
    pub unit_price: UnitPrice,
}

impl From<&LineItem> for PurchaseLine {
    fn from(line: &LineItem) -> Self {
        Self {
            name: line.name.clone(),
            quantity: line.quantity,
            unit_price: line.unit_price,
        }
    }
}

/// Fully-formed purchase hand-off to the payment collaborator.
///
/// All amounts are minor units; `total` is what the gateway captures.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PurchaseRequest {
    pub lines: Vec<PurchaseLine>,
    pub subtotal: u64,
    pub shipping: u64,
    pub tax: u64,
    pub total: u64,
    /// Where the gateway sends the shopper after approval.
    pub return_url: String,
    /// Where the gateway sends the shopper after cancelling.
    pub cancel_url: String,
}

/// Opaque capture confirmation issued by the gateway.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PaymentConfirmation(String);

impl PaymentConfirmation {
    /// Wraps a confirmation token.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Returns the token as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for PaymentConfirmation {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        Display::fmt(&self.0, f)
    }
}

/// Errors from the payment collaborator.
#[derive(Debug, Error)]
pub enum PaymentError {
    #[error("payment declined: {0}")]
    Declined(String),

    #[error("payment service unavailable")]
    Unavailable,
}

/// External payment service.
#[automock]
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Captures payment for `request`, returning the confirmation.
    async fn capture(&self, request: &PurchaseRequest) -> Result<PaymentConfirmation, PaymentError>;
}

/// Simulated gateway with a little network latency.
///
/// Approves every capture by default; [`SandboxPaymentGateway::declining`]
/// builds one that refuses everything, for exercising the retry path.
#[derive(Clone, Debug)]
pub struct SandboxPaymentGateway {
    latency: Duration,
    decline: bool,
}

impl SandboxPaymentGateway {
    /// A gateway that approves every capture.
    #[must_use]
    pub fn new() -> Self {
        Self {
            latency: Duration::from_millis(80),
            decline: false,
        }
    }

    /// A gateway that declines every capture.
    #[must_use]
    pub fn declining() -> Self {
        Self {
            decline: true,
            ..Self::new()
        }
    }
}

impl Default for SandboxPaymentGateway {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PaymentGateway for SandboxPaymentGateway {
    async fn capture(
        &self,
        request: &PurchaseRequest,
    ) -> Result<PaymentConfirmation, PaymentError> {
        sleep(self.latency).await;

        if self.decline {
            return Err(PaymentError::Declined(
                "sandbox gateway is set to decline".to_owned(),
            ));
        }

        let confirmation = PaymentConfirmation::new(format!("cap-{}", Uuid::now_v7().simple()));
        debug!(total = request.total, confirmation = %confirmation, "sandbox capture approved");

        Ok(confirmation)
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    fn request() -> PurchaseRequest {
        PurchaseRequest {
            lines: Vec::new(),
            subtotal: 14_00,
            shipping: 5_00,
            tax: 1_00,
            total: 20_00,
            return_url: "https://shop.example/checkout/success".to_owned(),
            cancel_url: "https://shop.example/checkout/cancelled".to_owned(),
        }
    }

    #[tokio::test]
    async fn sandbox_gateway_issues_distinct_confirmations() -> TestResult {
        let gateway = SandboxPaymentGateway::new();

        let first = gateway.capture(&request()).await?;
        let second = gateway.capture(&request()).await?;

        assert_ne!(first, second);
        assert!(first.as_str().starts_with("cap-"), "got {first}");

        Ok(())
    }

    #[tokio::test]
    async fn declining_gateway_refuses_every_capture() {
        let gateway = SandboxPaymentGateway::declining();

        let result = gateway.capture(&request()).await;

        assert!(
            matches!(result, Err(PaymentError::Declined(_))),
            "expected Declined, got {result:?}"
        );
    }
}
