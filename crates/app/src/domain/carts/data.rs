//! Cart Data

use crate::domain::{
    carts::records::{CartItemUuid, CartUuid},
    products::records::ProductUuid,
};

/// New Cart Data
#[derive(Debug, Clone, PartialEq)]
pub struct NewCart {
    pub uuid: CartUuid,
    /// ISO currency code the cart is priced in.
    pub currency: String,
}

/// New Cart Item Data
#[derive(Debug, Clone, PartialEq)]
pub struct NewCartItem {
    pub uuid: CartItemUuid,
    pub product_uuid: ProductUuid,
    pub quantity: u32,
}

/// Recomputed cart totals, ready to persist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CartTotals {
    pub total_items: u64,
    pub total_products: u64,
    pub total_amount: u64,
    pub total_discount: u64,
}
