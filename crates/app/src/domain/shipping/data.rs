//! Shipping Data

use pazar::shipping::RuleCondition;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::domain::shipping::records::{
    CargoRuleUuid, CargoZoneUuid, LocationKind, ZoneLocationUuid,
};

/// New Cargo Zone Data
///
/// The full replacement payload for a zone: persisting it deletes every
/// existing location and rule of the zone and inserts this set instead.
#[derive(Debug, Clone)]
pub struct NewCargoZone {
    pub uuid: CargoZoneUuid,
    pub name: String,
    pub locations: Vec<NewZoneLocation>,
    /// Rules in evaluation order.
    pub rules: Vec<NewCargoRule>,
}

/// New Zone Location Data
#[derive(Debug, Clone)]
pub struct NewZoneLocation {
    pub uuid: ZoneLocationUuid,
    pub country_uuid: Uuid,
    pub kind: LocationKind,
    pub state_uuids: Vec<Uuid>,
    pub city_uuids: Vec<Uuid>,
}

impl NewZoneLocation {
    /// Whether the id sets agree with the kind: a country location carries
    /// no ids, a state location only state ids, a city location only city
    /// ids.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        match self.kind {
            LocationKind::Country => self.state_uuids.is_empty() && self.city_uuids.is_empty(),
            LocationKind::State => !self.state_uuids.is_empty() && self.city_uuids.is_empty(),
            LocationKind::City => self.state_uuids.is_empty() && !self.city_uuids.is_empty(),
        }
    }
}

/// New Cargo Rule Data
#[derive(Debug, Clone)]
pub struct NewCargoRule {
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

impl NewCargoRule {
    /// The bounds as persisted: zero is normalised to NULL so "no bound"
    /// has a single representation in storage.
    #[must_use]
    pub fn normalized_bounds(&self) -> (Option<Decimal>, Option<Decimal>) {
        (
            self.min_value.filter(|v| !v.is_zero()),
            self.max_value.filter(|v| !v.is_zero()),
        )
    }
}

/// A resolved shipping quote for a cart/destination pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShippingQuote {
    /// The zone that matched the destination.
    pub zone_uuid: CargoZoneUuid,
    /// Shipping price in minor units.
    pub price: u64,
    /// ISO currency code of the price.
    pub currency: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(min: Option<Decimal>, max: Option<Decimal>) -> NewCargoRule {
        NewCargoRule {
            uuid: CargoRuleUuid::new(),
            name: "Standard".to_string(),
            currency: "TRY".to_string(),
            price: 1000,
            condition: RuleCondition::SalesPrice,
            min_value: min,
            max_value: max,
        }
    }

    #[test]
    fn zero_bounds_normalise_to_none() {
        let rule = rule(Some(Decimal::ZERO), Some(Decimal::ZERO));

        assert_eq!(rule.normalized_bounds(), (None, None));
    }

    #[test]
    fn nonzero_bounds_survive_normalisation() {
        let rule = rule(Some(Decimal::from(100)), Some(Decimal::from(500)));

        assert_eq!(
            rule.normalized_bounds(),
            (Some(Decimal::from(100)), Some(Decimal::from(500)))
        );
    }

    #[test]
    fn location_consistency_follows_kind() {
        let state = Uuid::now_v7();

        let country = NewZoneLocation {
            uuid: ZoneLocationUuid::new(),
            country_uuid: Uuid::now_v7(),
            kind: LocationKind::Country,
            state_uuids: Vec::new(),
            city_uuids: Vec::new(),
        };

        let state_with_cities = NewZoneLocation {
            uuid: ZoneLocationUuid::new(),
            country_uuid: Uuid::now_v7(),
            kind: LocationKind::State,
            state_uuids: vec![state],
            city_uuids: vec![Uuid::now_v7()],
        };

        assert!(country.is_consistent());
        assert!(!state_with_cities.is_consistent());
    }
}
