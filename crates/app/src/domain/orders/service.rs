//! Orders service.
//!
//! The order service is an external collaborator: it assigns order
//! identifiers, owns order status, and serves lookups for the
//! confirmation view. Unlike cart storage, its failures are surfaced:
//! an order that cannot be recorded is an error, never a shrug.

use std::{fs, io, path::PathBuf};

use async_trait::async_trait;
use jiff::Timestamp;
use mockall::automock;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::domain::orders::models::{NewOrder, Order, OrderStatus};

/// Errors from the order-service collaborator.
#[derive(Debug, Error)]
pub enum OrderServiceError {
    #[error("order ledger is not accessible: {0}")]
    Storage(#[from] io::Error),

    #[error("order ledger is malformed: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// External order service.
#[automock]
#[async_trait]
pub trait OrderService: Send + Sync {
    /// Creates an order, assigning its identifier and initial status.
    async fn create_order(&self, order: NewOrder) -> Result<Order, OrderServiceError>;

    /// Resolves an order by id.
    ///
    /// `Ok(None)` means the id is unknown; for the confirmation view
    /// that is a terminal not-found display state, not a retryable
    /// failure.
    async fn order_by_id(&self, uuid: Uuid) -> Result<Option<Order>, OrderServiceError>;
}

/// Sandbox order service backed by a JSON ledger file.
#[derive(Clone, Debug)]
pub struct JsonFileOrderService {
    path: PathBuf,
}

impl JsonFileOrderService {
    /// Creates a service over `path`; the ledger appears on first order.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn read_ledger(&self) -> Result<Vec<Order>, OrderServiceError> {
        match fs::read_to_string(&self.path) {
            Ok(raw) => Ok(serde_json::from_str(&raw)?),
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(error) => Err(OrderServiceError::Storage(error)),
        }
    }

    fn write_ledger(&self, orders: &[Order]) -> Result<(), OrderServiceError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let payload = serde_json::to_string(orders)?;
        fs::write(&self.path, payload)?;

        Ok(())
    }
}

#[async_trait]
impl OrderService for JsonFileOrderService {
    async fn create_order(&self, order: NewOrder) -> Result<Order, OrderServiceError> {
        let mut ledger = self.read_ledger()?;

        let order = Order {
            uuid: Uuid::now_v7(),
            items: order.items,
            payment_confirmation: order.payment_confirmation,
            total: order.total,
            status: OrderStatus::Pending,
            placed_at: Timestamp::now(),
        };

        ledger.push(order.clone());
        self.write_ledger(&ledger)?;

        info!(order_uuid = %order.uuid, total = order.total, "recorded order");

        Ok(order)
    }

    async fn order_by_id(&self, uuid: Uuid) -> Result<Option<Order>, OrderServiceError> {
        let ledger = self.read_ledger()?;

        Ok(ledger.into_iter().find(|order| order.uuid == uuid))
    }
}
