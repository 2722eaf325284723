//! Cart

use rusty_money::{Money, iso};

use crate::{
    items::{LineItem, ProductId, Quantity, money_from_minor},
    merge::dedup_last_wins,
};

/// What happened to an added line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CartPlacement {
    /// No line with the same id existed; the line was appended at the end.
    Appended,
    /// An existing line absorbed the addition; quantities were summed,
    /// saturating at [`Quantity::MAX`].
    Merged(Quantity),
}

/// Ordered cart of lines unique by product id.
///
/// Totals are derived on every read and never cached. Insertion order is
/// display order: merging into an existing line keeps its position, and
/// new products append at the end.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Cart {
    lines: Vec<LineItem>,
}

impl Cart {
    /// Creates an empty cart.
    pub fn new() -> Self {
        Cart { lines: Vec::new() }
    }

    /// Builds a cart from stored lines.
    ///
    /// Duplicate ids are collapsed with the last-occurrence-wins rule, so
    /// the uniqueness invariant holds no matter what the stored slot held.
    pub fn from_lines(lines: Vec<LineItem>) -> Self {
        Cart {
            lines: dedup_last_wins(lines),
        }
    }

    /// Adds a line, merging it into an existing line with the same id.
    ///
    /// A merge sums quantities, saturating at [`Quantity::MAX`], and keeps
    /// the existing line's captured name, price, image and variant.
    pub fn add(&mut self, item: LineItem) -> CartPlacement {
        if let Some(existing) = self.lines.iter_mut().find(|line| line.id == item.id) {
            existing.quantity = existing.quantity.saturating_add(item.quantity);

            CartPlacement::Merged(existing.quantity)
        } else {
            self.lines.push(item);

            CartPlacement::Appended
        }
    }

    /// Removes the line matching `id`, returning it when present.
    pub fn remove(&mut self, id: &ProductId) -> Option<LineItem> {
        let position = self.lines.iter().position(|line| &line.id == id)?;

        Some(self.lines.remove(position))
    }

    /// Sets the quantity of the line matching `id` exactly, with no
    /// clamping against the previous value.
    ///
    /// Returns the updated line, or `None` when no such line exists.
    pub fn set_quantity(&mut self, id: &ProductId, quantity: Quantity) -> Option<&LineItem> {
        let line = self.lines.iter_mut().find(|line| &line.id == id)?;
        line.quantity = quantity;

        Some(line)
    }

    /// Empties the cart, returning the removed lines in display order.
    pub fn clear(&mut self) -> Vec<LineItem> {
        std::mem::take(&mut self.lines)
    }

    /// Re-inserts a previously removed line.
    ///
    /// When the product was re-added in the meantime the quantities merge,
    /// saturating as usual; otherwise the line is appended.
    pub fn restore_line(&mut self, line: LineItem) {
        self.add(line);
    }

    /// Replaces the whole cart with `lines`.
    ///
    /// This is a full overwrite, not a merge: whatever the cart held is
    /// discarded. Duplicate ids in `lines` collapse last-occurrence-wins.
    pub fn replace_lines(&mut self, lines: Vec<LineItem>) {
        self.lines = dedup_last_wins(lines);
    }

    /// Returns the lines in display order.
    pub fn lines(&self) -> &[LineItem] {
        &self.lines
    }

    /// Returns the line for `id`, when present.
    pub fn get(&self, id: &ProductId) -> Option<&LineItem> {
        self.lines.iter().find(|line| &line.id == id)
    }

    /// Returns the number of distinct lines.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Checks whether the cart holds no lines.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Sums the units across all lines.
    pub fn item_count(&self) -> u32 {
        self.lines
            .iter()
            .map(|line| u32::from(line.quantity.units()))
            .sum()
    }

    /// Sums the line totals, in minor units.
    pub fn subtotal_minor(&self) -> u64 {
        self.lines
            .iter()
            .fold(0, |total, line| total.saturating_add(line.line_total_minor()))
    }

    /// Returns the subtotal as displayable money.
    pub fn subtotal(&self) -> Money<'static, iso::Currency> {
        money_from_minor(self.subtotal_minor())
    }
}
