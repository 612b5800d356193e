//! Discount Data

use pazar::discounts::{DiscountDraft, DiscountType};

use crate::domain::discounts::records::DiscountUuid;

/// New Discount Data
///
/// A partial draft plus the chosen type; absent draft fields take their
/// explicit defaults when the record is built.
#[derive(Debug, Clone, PartialEq)]
pub struct NewDiscount {
    pub uuid: DiscountUuid,
    pub draft: DiscountDraft,
    pub discount_type: DiscountType,
}
