//! Product Data

use pazar::variants::{VariantGroup, VariantOption};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::domain::products::records::ProductUuid;

/// New Product Data
#[derive(Debug, Clone, PartialEq)]
pub struct NewProduct {
    pub uuid: ProductUuid,
    pub name: String,
    /// List price in minor units.
    pub price: u64,
    /// Sale price in minor units, when discounted.
    pub sale_price: Option<u64>,
    /// Unit weight in grams.
    pub weight: Decimal,
}

/// New Variant Group Data
#[derive(Debug, Clone, PartialEq)]
pub struct NewVariantGroup {
    pub uuid: Uuid,
    pub name: String,
    pub options: Vec<VariantOption>,
}

impl NewVariantGroup {
    /// The engine-facing shape of this group.
    #[must_use]
    pub fn to_variant_group(&self) -> VariantGroup {
        VariantGroup {
            uuid: self.uuid,
            options: self.options.clone(),
        }
    }
}
