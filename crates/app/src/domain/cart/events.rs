//! Cart events.
//!
//! Typed confirmations returned by the cart manager. The presentation
//! layer phrases these as toasts; where [`CartEvent::offers_undo`] is
//! true it may show the undo affordance, and it owns that affordance's
//! lifetime entirely.

use trolley::items::Quantity;

/// Confirmation of a successful cart mutation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CartEvent {
    /// A line was added, or merged into an existing line.
    ItemAdded {
        /// Display name of the product.
        name: String,
        /// The validated quantity the shopper asked for. A merge near the
        /// per-line bound may retain fewer units; the difference is
        /// dropped without comment.
        quantity_added: Quantity,
    },

    /// A line's quantity was set to a new value.
    QuantityUpdated {
        /// Display name of the product.
        name: String,
        /// The quantity now on the line.
        quantity: Quantity,
    },

    /// A line was removed; undo can re-insert it.
    ItemRemoved {
        /// Display name of the product.
        name: String,
    },

    /// The cart was emptied; undo can restore it.
    CartCleared {
        /// How many lines were cleared.
        lines_cleared: usize,
    },

    /// An undone removal re-inserted its line.
    ItemRestored {
        /// Display name of the product.
        name: String,
    },

    /// An undone clear restored the previous lines outright.
    CartRestored {
        /// How many lines came back.
        lines_restored: usize,
    },
}

impl CartEvent {
    /// Whether the action behind this event left an undo pending.
    #[must_use]
    pub fn offers_undo(&self) -> bool {
        matches!(
            self,
            CartEvent::ItemRemoved { .. } | CartEvent::CartCleared { .. }
        )
    }
}
