//! Discount Records

use jiff::Timestamp;
use pazar::discounts::{Discount, DiscountType};

use crate::uuids::TypedUuid;

/// Discount UUID
pub type DiscountUuid = TypedUuid<DiscountRecord>;

/// Discount Record
#[derive(Debug, Clone)]
pub struct DiscountRecord {
    pub uuid: DiscountUuid,
    /// The shared fields and the type-keyed payload.
    pub discount: Discount,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub deleted_at: Option<Timestamp>,
}

impl DiscountRecord {
    /// The discount's current type.
    #[must_use]
    pub fn discount_type(&self) -> DiscountType {
        self.discount.discount_type()
    }
}
