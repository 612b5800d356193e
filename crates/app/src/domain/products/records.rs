//! Product Records

use jiff::Timestamp;
use pazar::variants::{VariantGroup, VariantOption};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::uuids::TypedUuid;

/// Product UUID
pub type ProductUuid = TypedUuid<ProductRecord>;

/// Product Record
#[derive(Debug, Clone)]
pub struct ProductRecord {
    pub uuid: ProductUuid,
    pub name: String,
    /// List price in minor units.
    pub price: u64,
    /// Sale price in minor units, when the product is discounted.
    pub sale_price: Option<u64>,
    /// Unit weight in grams.
    pub weight: Decimal,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub deleted_at: Option<Timestamp>,
}

/// Variant Group Record
///
/// The persisted form of a variation axis: the engine-facing group plus its
/// display name and storage position.
#[derive(Debug, Clone)]
pub struct VariantGroupRecord {
    pub uuid: Uuid,
    pub name: String,
    pub options: Vec<VariantOption>,
}

impl VariantGroupRecord {
    /// The engine-facing shape of this group.
    #[must_use]
    pub fn to_variant_group(&self) -> VariantGroup {
        VariantGroup {
            uuid: self.uuid,
            options: self.options.clone(),
        }
    }
}
