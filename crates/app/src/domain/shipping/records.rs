//! Shipping Records

use jiff::Timestamp;
use pazar::shipping::{CargoRule, CargoZone, Location, LocationScope, RuleCondition};
use rust_decimal::Decimal;
use rusty_money::{Money, iso};
use uuid::Uuid;

use crate::{domain::shipping::errors::ShippingServiceError, uuids::TypedUuid};

/// Cargo Zone UUID
pub type CargoZoneUuid = TypedUuid<CargoZoneRecord>;

/// Zone Location UUID
pub type ZoneLocationUuid = TypedUuid<ZoneLocationRecord>;

/// Cargo Rule UUID
pub type CargoRuleUuid = TypedUuid<CargoRuleRecord>;

/// Cargo Zone Record
#[derive(Debug, Clone)]
pub struct CargoZoneRecord {
    pub uuid: CargoZoneUuid,
    pub name: String,
    pub locations: Vec<ZoneLocationRecord>,
    /// Rules in stored order; resolution is first-match over this order.
    pub rules: Vec<CargoRuleRecord>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub deleted_at: Option<Timestamp>,
}

impl CargoZoneRecord {
    /// The engine-facing shape of this zone.
    ///
    /// # Errors
    ///
    /// Returns [`ShippingServiceError::InvalidCurrency`] or
    /// [`ShippingServiceError::InvalidAmount`] when a rule row cannot be
    /// represented as engine money.
    pub fn to_zone(&self) -> Result<CargoZone<'static>, ShippingServiceError> {
        let rules = self
            .rules
            .iter()
            .map(CargoRuleRecord::to_rule)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(CargoZone::new(
            self.uuid.into_uuid(),
            self.name.clone(),
            self.locations
                .iter()
                .map(ZoneLocationRecord::to_location)
                .collect(),
            rules,
        ))
    }
}

/// Which granularity a persisted zone location targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationKind {
    Country,
    State,
    City,
}

impl LocationKind {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Country => "country",
            Self::State => "state",
            Self::City => "city",
        }
    }

    #[must_use]
    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "country" => Some(Self::Country),
            "state" => Some(Self::State),
            "city" => Some(Self::City),
            _ => None,
        }
    }
}

/// Zone Location Record
#[derive(Debug, Clone)]
pub struct ZoneLocationRecord {
    pub uuid: ZoneLocationUuid,
    pub country_uuid: Uuid,
    pub kind: LocationKind,
    pub state_uuids: Vec<Uuid>,
    pub city_uuids: Vec<Uuid>,
}

impl ZoneLocationRecord {
    /// The engine-facing shape of this location. Only the id set matching
    /// the kind is carried over; the others are empty by the write-time
    /// invariant.
    #[must_use]
    pub fn to_location(&self) -> Location {
        let scope = match self.kind {
            LocationKind::Country => LocationScope::Country,
            LocationKind::State => {
                LocationScope::States(self.state_uuids.iter().copied().collect())
            }
            LocationKind::City => LocationScope::Cities(self.city_uuids.iter().copied().collect()),
        };

        Location::new(self.country_uuid, scope)
    }
}

/// Cargo Rule Record
#[derive(Debug, Clone)]
pub struct CargoRuleRecord {
    pub uuid: CargoRuleUuid,
    pub name: String,
    /// ISO currency code of the price.
    pub currency: String,
    /// Shipping price in minor units.
    pub price: u64,
    pub condition: RuleCondition,
    pub min_value: Option<Decimal>,
    pub max_value: Option<Decimal>,
}

impl CargoRuleRecord {
    /// The engine-facing shape of this rule.
    ///
    /// # Errors
    ///
    /// Returns [`ShippingServiceError::InvalidCurrency`] for an unknown
    /// currency code and [`ShippingServiceError::InvalidAmount`] when the
    /// price does not fit minor units.
    pub fn to_rule(&self) -> Result<CargoRule<'static>, ShippingServiceError> {
        let currency = iso::find(&self.currency)
            .ok_or_else(|| ShippingServiceError::InvalidCurrency(self.currency.clone()))?;

        let price = Money::from_minor(i64::try_from(self.price)?, currency);

        Ok(CargoRule::new(
            self.uuid.into_uuid(),
            self.name.clone(),
            price,
            self.condition,
            self.min_value,
            self.max_value,
        ))
    }
}

pub(crate) fn condition_as_str(condition: RuleCondition) -> &'static str {
    match condition {
        RuleCondition::ProductWeight => "product_weight",
        RuleCondition::SalesPrice => "sales_price",
    }
}

pub(crate) fn condition_from_str(value: &str) -> Option<RuleCondition> {
    match value {
        "product_weight" => Some(RuleCondition::ProductWeight),
        "sales_price" => Some(RuleCondition::SalesPrice),
        _ => None,
    }
}
