//! Cart Records

use jiff::Timestamp;
use rust_decimal::Decimal;

use crate::{domain::products::records::ProductUuid, uuids::TypedUuid};

/// Cart UUID
pub type CartUuid = TypedUuid<CartRecord>;

/// Cart Item UUID
pub type CartItemUuid = TypedUuid<CartItemRecord>;

/// Cart Record
///
/// Totals are denormalised: every cart mutation recomputes them wholesale
/// through the pricing engine before commit, so a persisted cart never
/// carries stale totals.
#[derive(Debug, Clone)]
pub struct CartRecord {
    pub uuid: CartUuid,
    /// ISO currency code every line of the cart is priced in.
    pub currency: String,
    pub total_items: u64,
    pub total_products: u64,
    /// Gross amount in minor units, before line discounts.
    pub total_amount: u64,
    /// Discount delta in minor units.
    pub total_discount: u64,
    pub items: Vec<CartItemRecord>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub deleted_at: Option<Timestamp>,
}

/// Cart Item Record
#[derive(Debug, Clone)]
pub struct CartItemRecord {
    pub uuid: CartItemUuid,
    pub product_uuid: ProductUuid,
    pub quantity: u32,
    /// Unit price in minor units, copied from the product at add time.
    pub unit_price: u64,
    /// Discounted unit price in minor units, when the product was on sale.
    pub discounted_unit_price: Option<u64>,
    /// Unit weight in grams, copied from the product at add time.
    pub unit_weight: Decimal,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub deleted_at: Option<Timestamp>,
}
