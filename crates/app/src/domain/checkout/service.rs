//! Checkout service.
//!
//! Orchestrates the hand-off from "cart ready" to "order placed": builds
//! the purchase request, awaits the payment collaborator, and records the
//! order. A state guard rejects concurrent resubmission while a
//! submission is in flight; an abandoned submission releases the guard
//! when its future drops, so the flow can never wedge in `Submitting`.

use std::{
    fmt::{Debug, Formatter, Result as FmtResult},
    sync::Arc,
};

use parking_lot::Mutex;
use tracing::info;
use uuid::Uuid;

use trolley::items::LineItem;

use crate::domain::{
    checkout::{
        errors::CheckoutError,
        payments::{PaymentGateway, PurchaseLine, PurchaseRequest},
    },
    orders::{NewOrder, Order, OrderService},
};

/// Lifecycle of a checkout submission.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CheckoutState {
    /// No submission attempted, or the last one was abandoned.
    #[default]
    Idle,
    /// A submission holds the flow; duplicates are rejected.
    Submitting,
    /// The last submission produced an order.
    Succeeded,
    /// The last submission failed; a retry re-enters `Submitting`.
    Failed,
}

/// Checkout totals and redirect targets for one submission.
///
/// Amounts are minor units. The grand total is derived from the cart
/// subtotal at submit time, never supplied by the caller.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CheckoutRequest {
    pub shipping: u64,
    pub tax: u64,
    pub return_url: String,
    pub cancel_url: String,
}

/// Orchestrates cart, payment and order placement.
pub struct CheckoutService {
    payments: Arc<dyn PaymentGateway>,
    orders: Arc<dyn OrderService>,
    state: Mutex<CheckoutState>,
}

impl CheckoutService {
    #[must_use]
    pub fn new(payments: Arc<dyn PaymentGateway>, orders: Arc<dyn OrderService>) -> Self {
        Self {
            payments,
            orders,
            state: Mutex::new(CheckoutState::Idle),
        }
    }

    /// Returns the flow's current state.
    #[must_use]
    pub fn state(&self) -> CheckoutState {
        *self.state.lock()
    }

    /// Submits a cart snapshot for payment capture and order creation.
    ///
    /// The snapshot must be non-empty and no other submission may be in
    /// flight; both guards fire before the payment collaborator is
    /// involved. On failure the caller's cart is untouched and a retry
    /// re-enters the flow. Dropping the returned future mid-flight
    /// releases the guard and the payment outcome, if any, is ignored.
    ///
    /// # Errors
    ///
    /// Returns a `CheckoutError` for an empty snapshot, a duplicate
    /// submission, a payment failure, or an order that could not be
    /// recorded after capture.
    pub async fn submit(
        &self,
        lines: &[LineItem],
        request: &CheckoutRequest,
    ) -> Result<Order, CheckoutError> {
        if lines.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        let guard = SubmitGuard::acquire(&self.state)?;

        let purchase = build_purchase(lines, request);

        let confirmation = match self.payments.capture(&purchase).await {
            Ok(confirmation) => confirmation,
            Err(error) => {
                guard.finish(CheckoutState::Failed);
                return Err(CheckoutError::Payment(error));
            }
        };

        let new_order = NewOrder {
            items: lines.to_vec(),
            payment_confirmation: confirmation,
            total: purchase.total,
        };

        let order = match self.orders.create_order(new_order).await {
            Ok(order) => order,
            Err(error) => {
                guard.finish(CheckoutState::Failed);
                return Err(CheckoutError::Orders(error));
            }
        };

        info!(order_uuid = %order.uuid, total = order.total, "order placed");
        guard.finish(CheckoutState::Succeeded);

        Ok(order)
    }

    /// Resolves an order by id for the confirmation view's fallback path.
    ///
    /// `Ok(None)` is the terminal not-found display state.
    ///
    /// # Errors
    ///
    /// Returns a `CheckoutError` when the order collaborator fails.
    pub async fn order_by_id(&self, uuid: Uuid) -> Result<Option<Order>, CheckoutError> {
        Ok(self.orders.order_by_id(uuid).await?)
    }
}

impl Debug for CheckoutService {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("CheckoutService")
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

fn build_purchase(lines: &[LineItem], request: &CheckoutRequest) -> PurchaseRequest {
    let subtotal = lines
        .iter()
        .fold(0_u64, |total, line| total.saturating_add(line.line_total_minor()));
    let total = subtotal
        .saturating_add(request.shipping)
        .saturating_add(request.tax);

    PurchaseRequest {
        lines: lines.iter().map(PurchaseLine::from).collect(),
        subtotal,
        shipping: request.shipping,
        tax: request.tax,
        total,
        return_url: request.return_url.clone(),
        cancel_url: request.cancel_url.clone(),
    }
}

/// Holds the flow in `Submitting` for the lifetime of one submission.
///
/// Dropping without an explicit outcome reverts to `Idle`; an abandoned
/// submission must not leave the flow wedged.
struct SubmitGuard<'a> {
    state: &'a Mutex<CheckoutState>,
    finished: bool,
}

impl<'a> SubmitGuard<'a> {
    fn acquire(state: &'a Mutex<CheckoutState>) -> Result<Self, CheckoutError> {
        let mut current = state.lock();

        if *current == CheckoutState::Submitting {
            return Err(CheckoutError::SubmissionInFlight);
        }

        *current = CheckoutState::Submitting;
        drop(current);

        Ok(Self {
            state,
            finished: false,
        })
    }

    fn finish(mut self, outcome: CheckoutState) {
        *self.state.lock() = outcome;
        self.finished = true;
    }
}

impl Drop for SubmitGuard<'_> {
    fn drop(&mut self) {
        if !self.finished {
            *self.state.lock() = CheckoutState::Idle;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use jiff::Timestamp;
    use testresult::TestResult;
    use tokio::sync::Notify;

    use trolley::fixtures;

    use crate::domain::{
        checkout::payments::{MockPaymentGateway, PaymentConfirmation, PaymentError},
        orders::{MockOrderService, OrderServiceError, OrderStatus},
    };

    use super::*;

    fn checkout_request() -> CheckoutRequest {
        CheckoutRequest {
            shipping: 5_00,
            tax: 1_00,
            return_url: "https://shop.example/checkout/success".to_owned(),
            cancel_url: "https://shop.example/checkout/cancelled".to_owned(),
        }
    }

    fn snapshot() -> Vec<LineItem> {
        vec![
            LineItem::try_from(fixtures::socks(2)).expect("fixture should validate"),
            LineItem::try_from(fixtures::lamp(1)).expect("fixture should validate"),
        ]
    }

    fn order_from(new: NewOrder) -> Order {
        Order {
            uuid: Uuid::now_v7(),
            items: new.items,
            payment_confirmation: new.payment_confirmation,
            total: new.total,
            status: OrderStatus::Pending,
            placed_at: Timestamp::now(),
        }
    }

    /// Gateway whose capture blocks until released, counting calls.
    #[derive(Default)]
    struct GatedGateway {
        calls: AtomicUsize,
        release: Notify,
    }

    #[async_trait]
    impl PaymentGateway for GatedGateway {
        async fn capture(
            &self,
            _request: &PurchaseRequest,
        ) -> Result<PaymentConfirmation, PaymentError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.release.notified().await;

            Ok(PaymentConfirmation::new("cap-gated"))
        }
    }

    async fn wait_for_submitting(service: &CheckoutService) {
        for _ in 0..1_000 {
            if service.state() == CheckoutState::Submitting {
                return;
            }
            tokio::task::yield_now().await;
        }

        panic!("submission never reached Submitting");
    }

    #[tokio::test]
    async fn submit_captures_payment_and_records_the_order() -> TestResult {
        let mut gateway = MockPaymentGateway::new();
        gateway
            .expect_capture()
            .withf(|request: &PurchaseRequest| {
                request.subtotal == 59_00
                    && request.shipping == 5_00
                    && request.tax == 1_00
                    && request.total == 65_00
                    && request.lines.len() == 2
            })
            .times(1)
            .returning(|_| Ok(PaymentConfirmation::new("cap-ok")));

        let mut orders = MockOrderService::new();
        orders
            .expect_create_order()
            .withf(|new: &NewOrder| {
                new.total == 65_00
                    && new.items.len() == 2
                    && new.payment_confirmation.as_str() == "cap-ok"
            })
            .times(1)
            .returning(|new| Ok(order_from(new)));

        let service = CheckoutService::new(Arc::new(gateway), Arc::new(orders));

        let order = service.submit(&snapshot(), &checkout_request()).await?;

        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.total, 65_00);
        assert_eq!(service.state(), CheckoutState::Succeeded);

        Ok(())
    }

    #[tokio::test]
    async fn an_empty_snapshot_never_reaches_the_gateway() {
        let mut gateway = MockPaymentGateway::new();
        gateway.expect_capture().never();
        let mut orders = MockOrderService::new();
        orders.expect_create_order().never();

        let service = CheckoutService::new(Arc::new(gateway), Arc::new(orders));

        let result = service.submit(&[], &checkout_request()).await;

        assert!(
            matches!(result, Err(CheckoutError::EmptyCart)),
            "expected EmptyCart, got {result:?}"
        );
        assert_eq!(service.state(), CheckoutState::Idle);
    }

    #[tokio::test]
    async fn a_payment_failure_allows_a_retry() -> TestResult {
        let mut gateway = MockPaymentGateway::new();
        gateway
            .expect_capture()
            .times(1)
            .returning(|_| Err(PaymentError::Declined("card declined".to_owned())));
        gateway
            .expect_capture()
            .times(1)
            .returning(|_| Ok(PaymentConfirmation::new("cap-retry")));

        let mut orders = MockOrderService::new();
        orders
            .expect_create_order()
            .times(1)
            .returning(|new| Ok(order_from(new)));

        let service = CheckoutService::new(Arc::new(gateway), Arc::new(orders));

        let first = service.submit(&snapshot(), &checkout_request()).await;

        assert!(
            matches!(first, Err(CheckoutError::Payment(PaymentError::Declined(_)))),
            "expected Payment, got {first:?}"
        );
        assert_eq!(service.state(), CheckoutState::Failed);

        let retry = service.submit(&snapshot(), &checkout_request()).await?;

        assert_eq!(retry.payment_confirmation.as_str(), "cap-retry");
        assert_eq!(service.state(), CheckoutState::Succeeded);

        Ok(())
    }

    #[tokio::test]
    async fn an_unrecordable_order_fails_after_capture() {
        let mut gateway = MockPaymentGateway::new();
        gateway
            .expect_capture()
            .times(1)
            .returning(|_| Ok(PaymentConfirmation::new("cap-ok")));

        let mut orders = MockOrderService::new();
        orders
            .expect_create_order()
            .times(1)
            .returning(|_| Err(OrderServiceError::Storage(std::io::Error::other("ledger gone"))));

        let service = CheckoutService::new(Arc::new(gateway), Arc::new(orders));

        let result = service.submit(&snapshot(), &checkout_request()).await;

        assert!(
            matches!(result, Err(CheckoutError::Orders(_))),
            "expected Orders, got {result:?}"
        );
        assert_eq!(service.state(), CheckoutState::Failed);
    }

    #[tokio::test]
    async fn a_duplicate_submission_is_rejected_while_in_flight() -> TestResult {
        let gateway = Arc::new(GatedGateway::default());
        let mut orders = MockOrderService::new();
        orders
            .expect_create_order()
            .times(1)
            .returning(|new| Ok(order_from(new)));

        let service = Arc::new(CheckoutService::new(
            Arc::clone(&gateway) as Arc<dyn PaymentGateway>,
            Arc::new(orders),
        ));

        let first = tokio::spawn({
            let service = Arc::clone(&service);
            async move { service.submit(&snapshot(), &checkout_request()).await }
        });

        wait_for_submitting(&service).await;

        let second = service.submit(&snapshot(), &checkout_request()).await;

        assert!(
            matches!(second, Err(CheckoutError::SubmissionInFlight)),
            "expected SubmissionInFlight, got {second:?}"
        );

        gateway.release.notify_one();
        let order = first.await??;

        assert_eq!(order.total, 65_00);
        assert_eq!(
            gateway.calls.load(Ordering::SeqCst),
            1,
            "exactly one capture for the rapid double submit"
        );
        assert_eq!(service.state(), CheckoutState::Succeeded);

        Ok(())
    }

    #[tokio::test]
    async fn an_abandoned_submission_releases_the_guard() -> TestResult {
        let gateway = Arc::new(GatedGateway::default());
        let mut orders = MockOrderService::new();
        orders
            .expect_create_order()
            .returning(|new| Ok(order_from(new)));

        let service = Arc::new(CheckoutService::new(
            Arc::clone(&gateway) as Arc<dyn PaymentGateway>,
            Arc::new(orders),
        ));

        let abandoned = tokio::spawn({
            let service = Arc::clone(&service);
            async move { service.submit(&snapshot(), &checkout_request()).await }
        });

        wait_for_submitting(&service).await;

        abandoned.abort();
        let join = abandoned.await;
        assert!(join.is_err(), "the submission task should be cancelled");

        assert_eq!(
            service.state(),
            CheckoutState::Idle,
            "dropping the in-flight future must release the guard"
        );

        gateway.release.notify_one();
        let order = service.submit(&snapshot(), &checkout_request()).await?;

        assert_eq!(order.total, 65_00);

        Ok(())
    }

    #[tokio::test]
    async fn order_lookup_passes_through_the_collaborator() -> TestResult {
        let uuid = Uuid::now_v7();
        let mut orders = MockOrderService::new();
        orders
            .expect_order_by_id()
            .times(1)
            .returning(|_| Ok(None));

        let service = CheckoutService::new(
            Arc::new(MockPaymentGateway::new()),
            Arc::new(orders),
        );

        let found = service.order_by_id(uuid).await?;

        assert_eq!(found, None, "unknown ids are a not-found display state");

        Ok(())
    }
}
