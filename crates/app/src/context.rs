//! App Context

use std::sync::Arc;

use crate::{
    domain::{
        cart::CartManager,
        checkout::{CheckoutError, CheckoutRequest, CheckoutService, PaymentGateway},
        orders::{Order, OrderService},
        session::{Credentials, IdentityProvider, SessionError, SessionService, SignIn},
    },
    storage::{CartStore, CartStoreError},
};

/// Application services wired over their collaborators.
///
/// The context owns all mutable state; collaborators are injected, so any
/// of them can be swapped for a double in tests.
#[derive(Debug)]
pub struct AppContext {
    pub cart: CartManager,
    pub session: SessionService,
    pub checkout: CheckoutService,
}

impl AppContext {
    /// Build the application context from its four collaborators.
    ///
    /// Loads the persisted cart from `store` as part of wiring.
    #[must_use]
    pub fn init(
        store: Arc<dyn CartStore>,
        identity: Arc<dyn IdentityProvider>,
        payments: Arc<dyn PaymentGateway>,
        orders: Arc<dyn OrderService>,
    ) -> Self {
        Self {
            cart: CartManager::init(Arc::clone(&store)),
            session: SessionService::new(identity, store),
            checkout: CheckoutService::new(payments, orders),
        }
    }

    /// Signs the shopper in and installs the merged session cart.
    ///
    /// # Errors
    ///
    /// Returns a `SessionError` when authentication fails; the cart is
    /// untouched in that case.
    pub async fn sign_in(&mut self, credentials: &Credentials) -> Result<SignIn, SessionError> {
        let Self { cart, session, .. } = self;

        session.sign_in(cart, credentials).await
    }

    /// Submits the current cart and resets it once the order is placed.
    ///
    /// # Errors
    ///
    /// Returns a `CheckoutError` when the submission is rejected or
    /// fails; the cart is preserved for a retry.
    pub async fn place_order(&mut self, request: &CheckoutRequest) -> Result<Order, CheckoutError> {
        let lines = self.cart.cart().lines().to_vec();

        let order = self.checkout.submit(&lines, request).await?;

        self.cart.reset();

        Ok(order)
    }

    /// Flushes the cart slot before the process exits.
    ///
    /// # Errors
    ///
    /// Returns a `CartStoreError` when the final write fails.
    pub fn shutdown(self) -> Result<(), CartStoreError> {
        self.cart.flush()
    }
}
