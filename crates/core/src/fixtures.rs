//! Line Fixtures
//!
//! Sample catalog requests shared by tests and examples. Each helper
//! returns the unvalidated request shape so callers exercise the same
//! conversion path real additions take.

use crate::items::{NewLineItem, ProductId};

/// Wool socks at $7.00.
pub fn socks(quantity: u32) -> NewLineItem {
    NewLineItem {
        id: ProductId::new("sku-socks"),
        name: "Wool Socks".to_owned(),
        unit_price: 7_00,
        quantity,
        image_url: None,
        variant: Some("Grey".to_owned()),
    }
}

/// Desk lamp at $45.00.
pub fn lamp(quantity: u32) -> NewLineItem {
    NewLineItem {
        id: ProductId::new("sku-lamp"),
        name: "Desk Lamp".to_owned(),
        unit_price: 45_00,
        quantity,
        image_url: Some("https://img.example/lamp.png".to_owned()),
        variant: None,
    }
}

/// Stoneware mug at $12.50.
pub fn mug(quantity: u32) -> NewLineItem {
    NewLineItem {
        id: ProductId::new("sku-mug"),
        name: "Stoneware Mug".to_owned(),
        unit_price: 12_50,
        quantity,
        image_url: None,
        variant: None,
    }
}

/// Graphic tee at $19.99.
pub fn tee(quantity: u32) -> NewLineItem {
    NewLineItem {
        id: ProductId::new("sku-tee"),
        name: "Graphic Tee".to_owned(),
        unit_price: 19_99,
        quantity,
        image_url: None,
        variant: Some("Medium".to_owned()),
    }
}

/// A product the named fixtures don't cover.
pub fn custom(id: &str, unit_price: u64, quantity: u32) -> NewLineItem {
    NewLineItem {
        id: ProductId::new(id),
        name: format!("Product {id}"),
        unit_price,
        quantity,
        image_url: None,
        variant: None,
    }
}
