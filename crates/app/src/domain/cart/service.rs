//! Cart manager service.

use std::{
    fmt::{Debug, Formatter, Result as FmtResult},
    sync::Arc,
};

use rusty_money::{Money, iso};
use tracing::{debug, warn};

use trolley::{
    cart::Cart,
    items::{LineItem, LineItemError, NewLineItem, ProductId, Quantity},
    undo::{UndoBuffer, UndoSnapshot},
};

use crate::{
    domain::cart::events::CartEvent,
    storage::{CartStore, CartStoreError},
};

/// Sole mutator of in-memory cart state.
///
/// Every successful mutation is mirrored to the persistent store as a
/// full overwrite, so the most recent in-memory state always wins.
/// Storage failures are logged and swallowed; the cart keeps working
/// from memory.
pub struct CartManager {
    cart: Cart,
    undo: UndoBuffer,
    store: Arc<dyn CartStore>,
}

impl CartManager {
    /// Loads the persisted cart from `store` and takes ownership of it.
    #[must_use]
    pub fn init(store: Arc<dyn CartStore>) -> Self {
        let cart = Cart::from_lines(store.load());

        Self {
            cart,
            undo: UndoBuffer::new(),
            store,
        }
    }

    /// Adds an item, merging it into an existing line of the same product.
    ///
    /// # Errors
    ///
    /// Returns a `LineItemError` if the quantity is zero or the price is
    /// not positive. Nothing changes on error; callers that prefer the
    /// quiet treatment are free to drop the error.
    pub fn add_item(&mut self, item: NewLineItem) -> Result<CartEvent, LineItemError> {
        let line = LineItem::try_from(item)?;
        let name = line.name.clone();
        let quantity_added = line.quantity;

        let placement = self.cart.add(line);
        debug!(product = %name, ?placement, "cart add");
        self.persist();

        Ok(CartEvent::ItemAdded {
            name,
            quantity_added,
        })
    }

    /// Removes the line for `id`, arming the undo buffer with it.
    ///
    /// Returns `None` when no such line exists; absent products are a
    /// quiet no-op, not an error.
    pub fn remove_item(&mut self, id: &ProductId) -> Option<CartEvent> {
        let line = self.cart.remove(id)?;
        let name = line.name.clone();

        self.undo.record(UndoSnapshot::RemovedLine(line));
        self.persist();

        Some(CartEvent::ItemRemoved { name })
    }

    /// Sets the quantity of the line for `id` exactly.
    ///
    /// Returns `Ok(None)` when no such line exists.
    ///
    /// # Errors
    ///
    /// Returns a `LineItemError` if the quantity is outside `1..=99`;
    /// updates never clamp.
    pub fn update_quantity(
        &mut self,
        id: &ProductId,
        quantity: u32,
    ) -> Result<Option<CartEvent>, LineItemError> {
        let quantity = Quantity::new(quantity)?;

        let Some(line) = self.cart.set_quantity(id, quantity) else {
            return Ok(None);
        };
        let name = line.name.clone();

        self.persist();

        Ok(Some(CartEvent::QuantityUpdated { name, quantity }))
    }

    /// Empties the cart, arming the undo buffer with the full line list.
    ///
    /// Clearing an already-empty cart is a no-op and leaves any pending
    /// undo snapshot in place.
    pub fn clear(&mut self) -> Option<CartEvent> {
        if self.cart.is_empty() {
            return None;
        }

        let lines = self.cart.clear();
        let lines_cleared = lines.len();

        self.undo.record(UndoSnapshot::ClearedCart(lines));
        self.persist();

        Some(CartEvent::CartCleared { lines_cleared })
    }

    /// Applies and consumes the pending undo snapshot.
    ///
    /// A removed line re-inserts, merging quantities when the product was
    /// re-added in the meantime. An undone clear replaces the cart
    /// outright, discarding lines added after the clear. Returns `None`
    /// when nothing is pending.
    pub fn undo(&mut self) -> Option<CartEvent> {
        let event = match self.undo.consume()? {
            UndoSnapshot::RemovedLine(line) => {
                let name = line.name.clone();
                self.cart.restore_line(line);

                CartEvent::ItemRestored { name }
            }
            UndoSnapshot::ClearedCart(lines) => {
                let lines_restored = lines.len();
                self.cart.replace_lines(lines);

                CartEvent::CartRestored { lines_restored }
            }
        };

        self.persist();

        Some(event)
    }

    /// Drops the pending undo snapshot; the affordance expired unacted.
    pub fn discard_undo(&mut self) {
        self.undo.discard();
    }

    /// Whether an undo is currently pending.
    #[must_use]
    pub fn undo_available(&self) -> bool {
        self.undo.pending().is_some()
    }

    /// Empties the cart without arming undo; used after order placement.
    pub fn reset(&mut self) {
        self.cart.clear();
        self.undo.discard();
        self.persist();
    }

    /// Installs `lines` as the new authoritative cart.
    ///
    /// This is the session-merge hand-off: a full overwrite. Any pending
    /// undo snapshot predates the login boundary and is discarded.
    pub fn replace_lines(&mut self, lines: Vec<LineItem>) {
        self.cart.replace_lines(lines);
        self.undo.discard();
        self.persist();
    }

    /// Read access to the current cart.
    #[must_use]
    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    /// Sums the units across all lines, recomputed per call.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.cart.item_count()
    }

    /// Returns the subtotal as displayable money, recomputed per call.
    #[must_use]
    pub fn subtotal(&self) -> Money<'static, iso::Currency> {
        self.cart.subtotal()
    }

    /// Flushes the current lines to the store, surfacing the failure the
    /// write-through path would only log. Called on shutdown.
    ///
    /// # Errors
    ///
    /// Returns a `CartStoreError` when the slot cannot be written.
    pub fn flush(&self) -> Result<(), CartStoreError> {
        self.store.save(self.cart.lines())
    }

    fn persist(&self) {
        if let Err(error) = self.store.save(self.cart.lines()) {
            warn!("cart not persisted, continuing in memory: {error}");
        }
    }
}

impl Debug for CartManager {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("CartManager")
            .field("cart", &self.cart)
            .field("undo", &self.undo)
            .finish_non_exhaustive()
    }
}
