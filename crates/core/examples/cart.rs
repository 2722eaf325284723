//! Cart Example
//!
//! Walks one shopping session through the cart: additions with the
//! duplicate-product merge, a quantity update, a remove reversed through
//! the undo buffer, and the login-time session merge.

use anyhow::Result;

use trolley::{
    cart::Cart,
    fixtures,
    items::{LineItem, Quantity},
    merge::merge_session_carts,
    undo::{UndoBuffer, UndoSnapshot},
};

/// Shopping Session Example
#[expect(clippy::print_stdout, reason = "Example program output to user")]
pub fn main() -> Result<()> {
    let mut cart = Cart::new();
    let mut undo = UndoBuffer::new();

    cart.add(LineItem::try_from(fixtures::socks(2))?);
    cart.add(LineItem::try_from(fixtures::lamp(1))?);
    cart.add(LineItem::try_from(fixtures::socks(1))?);

    println!("After adding (socks merge into one line):");
    print_cart(&cart);

    cart.set_quantity(&"sku-lamp".into(), Quantity::new(2)?);

    println!("\nAfter bumping the lamp to 2:");
    print_cart(&cart);

    if let Some(removed) = cart.remove(&"sku-socks".into()) {
        undo.record(UndoSnapshot::RemovedLine(removed));
    }

    println!("\nAfter removing the socks:");
    print_cart(&cart);

    if let Some(UndoSnapshot::RemovedLine(socks)) = undo.consume() {
        cart.restore_line(socks);
    }

    println!("\nAfter undo:");
    print_cart(&cart);

    let server = vec![
        LineItem::try_from(fixtures::socks(9))?,
        LineItem::try_from(fixtures::mug(1))?,
    ];
    let merged = merge_session_carts(server, cart.lines().to_vec());
    cart.replace_lines(merged);

    println!("\nAfter the login merge (local socks win wholesale):");
    print_cart(&cart);

    Ok(())
}

#[expect(clippy::print_stdout, reason = "Example program output to user")]
fn print_cart(cart: &Cart) {
    for line in cart.lines() {
        println!(
            "  {:>2} x {:<14} @ {:>8} = {}",
            line.quantity,
            line.name,
            line.unit_price.to_string(),
            line.line_total()
        );
    }

    println!("  {} units, subtotal {}", cart.item_count(), cart.subtotal());
}
