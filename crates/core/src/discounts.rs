//! Discounts
//!
//! A discount is a shared field set plus a payload keyed by discount type.
//! Switching type preserves the shared fields and starts the new type's
//! payload from its defaults; the prior payload is always discarded.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Currency codes a discount applies to when none are given.
const DEFAULT_CURRENCIES: [&str; 1] = ["TRY"];

/// The eight discount types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DiscountType {
    /// Flat percentage off.
    Percentage,
    /// Percentage that grows with purchased quantity.
    PercentageGrowQuantity,
    /// Percentage that grows with order amount.
    PercentageGrowPrice,
    /// Flat amount off.
    FixedAmount,
    /// Amount off that grows with purchased quantity.
    FixedAmountGrowQuantity,
    /// Amount off that grows with order amount.
    FixedAmountGrowPrice,
    /// Shipping at no cost.
    FreeShipping,
    /// Buy some quantity, get some quantity free.
    BuyXGetY,
}

impl DiscountType {
    /// The persisted name of the type.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Percentage => "PERCENTAGE",
            Self::PercentageGrowQuantity => "PERCENTAGE_GROW_QUANTITY",
            Self::PercentageGrowPrice => "PERCENTAGE_GROW_PRICE",
            Self::FixedAmount => "FIXED_AMOUNT",
            Self::FixedAmountGrowQuantity => "FIXED_AMOUNT_GROW_QUANTITY",
            Self::FixedAmountGrowPrice => "FIXED_AMOUNT_GROW_PRICE",
            Self::FreeShipping => "FREE_SHIPPING",
            Self::BuyXGetY => "BUY_X_GET_Y",
        }
    }
}

/// One step of a growing discount: reaching `threshold` grants `value`.
///
/// The threshold is a quantity for the `*GrowQuantity` types and a
/// minor-unit amount for the `*GrowPrice` types; the value is a percentage
/// or a minor-unit amount depending on the payload family.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscountTier {
    /// Quantity or minor-unit amount that activates the tier.
    pub threshold: u64,
    /// Percentage or minor-unit amount granted by the tier.
    pub value: u64,
}

/// The type-specific payload of a discount.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DiscountPayload {
    /// Flat percentage off.
    Percentage {
        /// Percent taken off, 0–100.
        discount_value: u16,
    },

    /// Percentage growing with quantity.
    PercentageGrowQuantity {
        /// Quantity thresholds and the percentage each grants.
        tiers: Vec<DiscountTier>,
    },

    /// Percentage growing with order amount.
    PercentageGrowPrice {
        /// Amount thresholds and the percentage each grants.
        tiers: Vec<DiscountTier>,
    },

    /// Flat amount off, in minor units.
    FixedAmount {
        /// Minor-unit amount taken off.
        discount_amount: u64,
    },

    /// Amount off growing with quantity.
    FixedAmountGrowQuantity {
        /// Quantity thresholds and the minor-unit amount each grants.
        tiers: Vec<DiscountTier>,
    },

    /// Amount off growing with order amount.
    FixedAmountGrowPrice {
        /// Amount thresholds and the minor-unit amount each grants.
        tiers: Vec<DiscountTier>,
    },

    /// Shipping at no cost; carries no payload.
    FreeShipping,

    /// Buy X get Y; quantities live on the promotion rules, not here.
    BuyXGetY,
}

impl DiscountPayload {
    /// The defaulted payload for a discount type: scalars zeroed, tier
    /// lists empty, unit types bare.
    #[must_use]
    pub fn fresh(discount_type: DiscountType) -> Self {
        match discount_type {
            DiscountType::Percentage => Self::Percentage { discount_value: 0 },
            DiscountType::PercentageGrowQuantity => {
                Self::PercentageGrowQuantity { tiers: Vec::new() }
            }
            DiscountType::PercentageGrowPrice => Self::PercentageGrowPrice { tiers: Vec::new() },
            DiscountType::FixedAmount => Self::FixedAmount { discount_amount: 0 },
            DiscountType::FixedAmountGrowQuantity => {
                Self::FixedAmountGrowQuantity { tiers: Vec::new() }
            }
            DiscountType::FixedAmountGrowPrice => Self::FixedAmountGrowPrice { tiers: Vec::new() },
            DiscountType::FreeShipping => Self::FreeShipping,
            DiscountType::BuyXGetY => Self::BuyXGetY,
        }
    }

    /// The discount type this payload belongs to.
    pub fn discount_type(&self) -> DiscountType {
        match self {
            Self::Percentage { .. } => DiscountType::Percentage,
            Self::PercentageGrowQuantity { .. } => DiscountType::PercentageGrowQuantity,
            Self::PercentageGrowPrice { .. } => DiscountType::PercentageGrowPrice,
            Self::FixedAmount { .. } => DiscountType::FixedAmount,
            Self::FixedAmountGrowQuantity { .. } => DiscountType::FixedAmountGrowQuantity,
            Self::FixedAmountGrowPrice { .. } => DiscountType::FixedAmountGrowPrice,
            Self::FreeShipping => DiscountType::FreeShipping,
            Self::BuyXGetY => DiscountType::BuyXGetY,
        }
    }
}

/// The fields every discount shares regardless of type.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DiscountCommon {
    /// Display title.
    pub title: String,
    /// Longer description, when given.
    pub description: Option<String>,
    /// Coupon code, when the discount is code-gated.
    pub code: Option<String>,
    /// Start of the validity window.
    pub starts_at: Option<Timestamp>,
    /// End of the validity window.
    pub ends_at: Option<Timestamp>,
    /// Whether the discount is live.
    pub is_active: bool,
    /// Total redemption cap.
    pub usage_limit: Option<u64>,
    /// Per-customer redemption cap.
    pub per_customer_limit: Option<u64>,
    /// Whether the discount covers the whole catalogue.
    pub is_all_products: bool,
    /// Products in scope when not catalogue-wide.
    pub product_uuids: Vec<Uuid>,
    /// Products excluded from scope.
    pub excluded_product_uuids: Vec<Uuid>,
    /// Whether the discount applies to every customer.
    pub is_all_customers: bool,
    /// Customers in scope when not universal.
    pub customer_uuids: Vec<Uuid>,
    /// Currencies the discount is valid in.
    pub currencies: Vec<String>,
    /// Minimum order amount, in minor units.
    pub min_order_amount: Option<u64>,
    /// Cap on the granted amount, in minor units.
    pub max_discount_amount: Option<u64>,
    /// Whether the discount stacks with others.
    pub combines_with_others: bool,
    /// Evaluation priority among applicable discounts.
    pub priority: i32,
}

impl Default for DiscountCommon {
    fn default() -> Self {
        Self {
            title: String::new(),
            description: None,
            code: None,
            starts_at: None,
            ends_at: None,
            is_active: true,
            usage_limit: None,
            per_customer_limit: None,
            is_all_products: true,
            product_uuids: Vec::new(),
            excluded_product_uuids: Vec::new(),
            is_all_customers: true,
            customer_uuids: Vec::new(),
            currencies: DEFAULT_CURRENCIES.map(str::to_string).to_vec(),
            min_order_amount: None,
            max_discount_amount: None,
            combines_with_others: false,
            priority: 0,
        }
    }
}

impl DiscountCommon {
    /// Builds the shared field set from a partial draft, applying the
    /// explicit default for every absent field.
    #[must_use]
    pub fn from_draft(draft: DiscountDraft) -> Self {
        let defaults = Self::default();

        Self {
            title: draft.title.unwrap_or(defaults.title),
            description: draft.description,
            code: draft.code,
            starts_at: draft.starts_at,
            ends_at: draft.ends_at,
            is_active: draft.is_active.unwrap_or(defaults.is_active),
            usage_limit: draft.usage_limit,
            per_customer_limit: draft.per_customer_limit,
            is_all_products: draft.is_all_products.unwrap_or(defaults.is_all_products),
            product_uuids: draft.product_uuids.unwrap_or(defaults.product_uuids),
            excluded_product_uuids: draft
                .excluded_product_uuids
                .unwrap_or(defaults.excluded_product_uuids),
            is_all_customers: draft.is_all_customers.unwrap_or(defaults.is_all_customers),
            customer_uuids: draft.customer_uuids.unwrap_or(defaults.customer_uuids),
            currencies: draft.currencies.unwrap_or(defaults.currencies),
            min_order_amount: draft.min_order_amount,
            max_discount_amount: draft.max_discount_amount,
            combines_with_others: draft
                .combines_with_others
                .unwrap_or(defaults.combines_with_others),
            priority: draft.priority.unwrap_or(defaults.priority),
        }
    }
}

/// The partial shape a discount arrives in from an editing surface: every
/// shared field optional, defaults applied by
/// [`DiscountCommon::from_draft`].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DiscountDraft {
    /// Display title.
    pub title: Option<String>,
    /// Longer description.
    pub description: Option<String>,
    /// Coupon code.
    pub code: Option<String>,
    /// Start of the validity window.
    pub starts_at: Option<Timestamp>,
    /// End of the validity window.
    pub ends_at: Option<Timestamp>,
    /// Whether the discount is live.
    pub is_active: Option<bool>,
    /// Total redemption cap.
    pub usage_limit: Option<u64>,
    /// Per-customer redemption cap.
    pub per_customer_limit: Option<u64>,
    /// Whether the discount covers the whole catalogue.
    pub is_all_products: Option<bool>,
    /// Products in scope.
    pub product_uuids: Option<Vec<Uuid>>,
    /// Products excluded from scope.
    pub excluded_product_uuids: Option<Vec<Uuid>>,
    /// Whether the discount applies to every customer.
    pub is_all_customers: Option<bool>,
    /// Customers in scope.
    pub customer_uuids: Option<Vec<Uuid>>,
    /// Currencies the discount is valid in.
    pub currencies: Option<Vec<String>>,
    /// Minimum order amount, in minor units.
    pub min_order_amount: Option<u64>,
    /// Cap on the granted amount, in minor units.
    pub max_discount_amount: Option<u64>,
    /// Whether the discount stacks with others.
    pub combines_with_others: Option<bool>,
    /// Evaluation priority.
    pub priority: Option<i32>,
}

/// Discount
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Discount {
    /// The shared field set.
    pub common: DiscountCommon,
    /// The type-specific payload.
    pub payload: DiscountPayload,
}

impl Discount {
    /// Creates a discount of the given type with defaulted payload.
    #[must_use]
    pub fn new(common: DiscountCommon, discount_type: DiscountType) -> Self {
        Self {
            common,
            payload: DiscountPayload::fresh(discount_type),
        }
    }

    /// Returns the discount's type.
    pub fn discount_type(&self) -> DiscountType {
        self.payload.discount_type()
    }

    /// Reshapes the discount to a new type.
    ///
    /// The shared fields are copied unchanged; the payload is replaced by
    /// the new type's defaults. The prior payload is discarded even when
    /// the two types share a field name: switching away from
    /// [`DiscountType::Percentage`] and back does not restore the old
    /// percentage.
    #[must_use]
    pub fn retype(&self, new_type: DiscountType) -> Self {
        Self {
            common: self.common.clone(),
            payload: DiscountPayload::fresh(new_type),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summer_sale() -> Discount {
        Discount {
            common: DiscountCommon {
                title: "Yaz indirimi".to_string(),
                code: Some("YAZ2024".to_string()),
                usage_limit: Some(1000),
                ..DiscountCommon::default()
            },
            payload: DiscountPayload::Percentage { discount_value: 25 },
        }
    }

    #[test]
    fn retype_preserves_common_fields() {
        let discount = summer_sale();

        let retyped = discount.retype(DiscountType::FixedAmount);

        assert_eq!(retyped.common.title, "Yaz indirimi");
        assert_eq!(retyped.common.code.as_deref(), Some("YAZ2024"));
        assert_eq!(retyped.common.usage_limit, Some(1000));
    }

    #[test]
    fn retype_to_fixed_amount_zeroes_the_new_scalar() {
        let discount = summer_sale();

        let retyped = discount.retype(DiscountType::FixedAmount);

        assert_eq!(
            retyped.payload,
            DiscountPayload::FixedAmount { discount_amount: 0 }
        );
    }

    #[test]
    fn retype_discards_prior_payload_even_on_round_trip() {
        let discount = summer_sale();

        let away = discount.retype(DiscountType::FreeShipping);
        let back = away.retype(DiscountType::Percentage);

        assert_eq!(
            back.payload,
            DiscountPayload::Percentage { discount_value: 0 }
        );
    }

    #[test]
    fn retype_to_tiered_types_starts_with_empty_tiers() {
        let discount = summer_sale();

        for tiered in [
            DiscountType::PercentageGrowQuantity,
            DiscountType::PercentageGrowPrice,
            DiscountType::FixedAmountGrowQuantity,
            DiscountType::FixedAmountGrowPrice,
        ] {
            let retyped = discount.retype(tiered);

            assert_eq!(retyped.discount_type(), tiered);

            let tiers = match &retyped.payload {
                DiscountPayload::PercentageGrowQuantity { tiers }
                | DiscountPayload::PercentageGrowPrice { tiers }
                | DiscountPayload::FixedAmountGrowQuantity { tiers }
                | DiscountPayload::FixedAmountGrowPrice { tiers } => tiers,
                other => panic!("expected a tiered payload, got {other:?}"),
            };

            assert!(tiers.is_empty());
        }
    }

    #[test]
    fn retype_to_unit_types_carries_no_payload_fields() {
        let discount = summer_sale();

        assert_eq!(
            discount.retype(DiscountType::FreeShipping).payload,
            DiscountPayload::FreeShipping
        );
        assert_eq!(
            discount.retype(DiscountType::BuyXGetY).payload,
            DiscountPayload::BuyXGetY
        );
    }

    #[test]
    fn fresh_payload_round_trips_through_discount_type() {
        for discount_type in [
            DiscountType::Percentage,
            DiscountType::PercentageGrowQuantity,
            DiscountType::PercentageGrowPrice,
            DiscountType::FixedAmount,
            DiscountType::FixedAmountGrowQuantity,
            DiscountType::FixedAmountGrowPrice,
            DiscountType::FreeShipping,
            DiscountType::BuyXGetY,
        ] {
            assert_eq!(
                DiscountPayload::fresh(discount_type).discount_type(),
                discount_type
            );
        }
    }

    #[test]
    fn draft_defaults_apply_for_absent_fields() {
        let common = DiscountCommon::from_draft(DiscountDraft {
            title: Some("Kargo bedava".to_string()),
            ..DiscountDraft::default()
        });

        assert!(common.is_all_products);
        assert!(common.is_all_customers);
        assert!(common.is_active);
        assert_eq!(common.currencies, vec!["TRY".to_string()]);
        assert_eq!(common.usage_limit, None);
        assert_eq!(common.min_order_amount, None);
        assert_eq!(common.priority, 0);
    }

    #[test]
    fn draft_values_override_defaults() {
        let common = DiscountCommon::from_draft(DiscountDraft {
            is_all_products: Some(false),
            product_uuids: Some(vec![Uuid::now_v7()]),
            currencies: Some(vec!["USD".to_string()]),
            priority: Some(5),
            ..DiscountDraft::default()
        });

        assert!(!common.is_all_products);
        assert_eq!(common.product_uuids.len(), 1);
        assert_eq!(common.currencies, vec!["USD".to_string()]);
        assert_eq!(common.priority, 5);
    }

    #[test]
    fn payload_serialises_with_type_tag() {
        let payload = DiscountPayload::FixedAmount {
            discount_amount: 500,
        };

        let json = serde_json::to_value(&payload).expect("payload should serialise");

        assert_eq!(json["type"], "FIXED_AMOUNT");
        assert_eq!(json["discount_amount"], 500);
    }
}
