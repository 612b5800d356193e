//! Shipping
//!
//! Cargo zones aggregate the locations they cover and the rules that price
//! them. Resolution is two lookups: pick the zone covering the destination,
//! then pick the first rule whose interval contains the cart's metric.

use rust_decimal::Decimal;
use rustc_hash::FxHashSet;
use rusty_money::{Money, iso::Currency};
use thiserror::Error;
use uuid::Uuid;

/// Errors related to shipping resolution.
#[derive(Debug, Error, PartialEq)]
pub enum ShippingError {
    /// No cargo zone covers the destination.
    #[error("no cargo zone covers the destination")]
    NoZoneMatched,

    /// A zone covered the destination but none of its rules matched the
    /// cart. Checkout must treat this as blocking; there is no default
    /// shipping price.
    #[error("no cargo rule matched the cart for zone {0}")]
    NoRuleMatched(Uuid),
}

/// A shipping destination, down to an optional state and city.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Destination {
    /// Country of delivery.
    pub country: Uuid,
    /// State within the country, when known.
    pub state: Option<Uuid>,
    /// City within the country, when known.
    pub city: Option<Uuid>,
}

/// Which part of a country a location covers.
///
/// The scope owns the id set it needs, so a state-scoped location with city
/// ids (or the reverse) cannot be constructed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LocationScope {
    /// The whole country.
    Country,
    /// Specific states of the country.
    States(FxHashSet<Uuid>),
    /// Specific cities of the country.
    Cities(FxHashSet<Uuid>),
}

/// A location a cargo zone applies to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Location {
    country: Uuid,
    scope: LocationScope,
}

impl Location {
    /// Creates a location covering a country or a part of it.
    #[must_use]
    pub fn new(country: Uuid, scope: LocationScope) -> Self {
        Self { country, scope }
    }

    /// Returns the country this location belongs to.
    pub fn country(&self) -> Uuid {
        self.country
    }

    /// Returns the scope of the location.
    pub fn scope(&self) -> &LocationScope {
        &self.scope
    }

    /// Whether the destination falls inside this location.
    pub fn matches(&self, destination: &Destination) -> bool {
        if destination.country != self.country {
            return false;
        }

        match &self.scope {
            LocationScope::Country => true,
            LocationScope::States(states) => destination
                .state
                .is_some_and(|state| states.contains(&state)),
            LocationScope::Cities(cities) => {
                destination.city.is_some_and(|city| cities.contains(&city))
            }
        }
    }

    /// Specificity rank used by [`ZoneStrategy::MostSpecific`]: a city
    /// match outranks a state match outranks a whole-country match.
    fn specificity(&self) -> u8 {
        match self.scope {
            LocationScope::Country => 0,
            LocationScope::States(_) => 1,
            LocationScope::Cities(_) => 2,
        }
    }
}

/// Which cart metric a cargo rule conditions on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RuleCondition {
    /// Aggregate product weight of the cart.
    ProductWeight,
    /// Aggregate sales price of the cart.
    SalesPrice,
}

/// A single pricing rule within a cargo zone.
#[derive(Clone, Debug)]
pub struct CargoRule<'a> {
    uuid: Uuid,
    name: String,
    price: Money<'a, Currency>,
    condition: RuleCondition,
    min_value: Option<Decimal>,
    max_value: Option<Decimal>,
}

impl<'a> CargoRule<'a> {
    /// Creates a rule matching metrics within `[min_value, max_value]`.
    ///
    /// A `None` bound is unbounded on that side. A bound of zero is
    /// normalised to `None`: zero always means "no bound", never "the bound
    /// is zero".
    #[must_use]
    pub fn new(
        uuid: Uuid,
        name: impl Into<String>,
        price: Money<'a, Currency>,
        condition: RuleCondition,
        min_value: Option<Decimal>,
        max_value: Option<Decimal>,
    ) -> Self {
        Self {
            uuid,
            name: name.into(),
            price,
            condition,
            min_value: min_value.filter(|v| !v.is_zero()),
            max_value: max_value.filter(|v| !v.is_zero()),
        }
    }

    /// Returns the rule identifier.
    pub fn uuid(&self) -> Uuid {
        self.uuid
    }

    /// Returns the rule name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the shipping price this rule resolves to.
    pub fn price(&self) -> &Money<'a, Currency> {
        &self.price
    }

    /// Returns the metric this rule conditions on.
    pub fn condition(&self) -> RuleCondition {
        self.condition
    }

    /// Returns the lower bound, when one is set.
    pub fn min_value(&self) -> Option<Decimal> {
        self.min_value
    }

    /// Returns the upper bound, when one is set.
    pub fn max_value(&self) -> Option<Decimal> {
        self.max_value
    }

    /// Whether the metric falls inside the rule's interval.
    pub fn matches(&self, metric: Decimal) -> bool {
        let above_min = self.min_value.is_none_or(|min| metric >= min);
        let below_max = self.max_value.is_none_or(|max| metric <= max);

        above_min && below_max
    }
}

/// The cart metrics cargo rules condition on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CartMetrics {
    total_weight: Decimal,
    sales_total: Decimal,
}

impl CartMetrics {
    /// Creates metrics from the cart's aggregate weight and sales total.
    #[must_use]
    pub fn new(total_weight: Decimal, sales_total: Decimal) -> Self {
        Self {
            total_weight,
            sales_total,
        }
    }

    /// Returns the metric a rule with the given condition reads.
    pub fn for_condition(&self, condition: RuleCondition) -> Decimal {
        match condition {
            RuleCondition::ProductWeight => self.total_weight,
            RuleCondition::SalesPrice => self.sales_total,
        }
    }
}

/// Cargo Zone
#[derive(Clone, Debug)]
pub struct CargoZone<'a> {
    uuid: Uuid,
    name: String,
    locations: Vec<Location>,
    rules: Vec<CargoRule<'a>>,
}

impl<'a> CargoZone<'a> {
    /// Creates a zone from its locations and rules.
    ///
    /// Rule order is meaningful: resolution picks the first matching rule
    /// in list order, as stored.
    #[must_use]
    pub fn new(
        uuid: Uuid,
        name: impl Into<String>,
        locations: Vec<Location>,
        rules: Vec<CargoRule<'a>>,
    ) -> Self {
        Self {
            uuid,
            name: name.into(),
            locations,
            rules,
        }
    }

    /// Returns the zone identifier.
    pub fn uuid(&self) -> Uuid {
        self.uuid
    }

    /// Returns the zone name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the locations this zone covers.
    pub fn locations(&self) -> &[Location] {
        &self.locations
    }

    /// Returns the rules of this zone, in stored order.
    pub fn rules(&self) -> &[CargoRule<'a>] {
        &self.rules
    }

    /// Whether the zone covers the destination at all.
    pub fn covers(&self, destination: &Destination) -> bool {
        self.locations
            .iter()
            .any(|location| location.matches(destination))
    }

    /// The specificity of the zone's best matching location, when any.
    fn match_specificity(&self, destination: &Destination) -> Option<u8> {
        self.locations
            .iter()
            .filter(|location| location.matches(destination))
            .map(Location::specificity)
            .max()
    }
}

/// How overlapping zones are resolved when several cover a destination.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ZoneStrategy {
    /// First zone in list order wins. This is how zones have historically
    /// been resolved; with overlapping zones the outcome depends on
    /// storage order.
    #[default]
    FirstMatch,

    /// The zone whose matching location is most specific wins (city beats
    /// state beats country). Ties still fall back to list order.
    MostSpecific,
}

/// Selects the cargo zone applying to a destination.
pub fn select_zone<'z, 'a>(
    zones: &'z [CargoZone<'a>],
    destination: &Destination,
    strategy: ZoneStrategy,
) -> Option<&'z CargoZone<'a>> {
    match strategy {
        ZoneStrategy::FirstMatch => zones.iter().find(|zone| zone.covers(destination)),
        ZoneStrategy::MostSpecific => zones
            .iter()
            .filter_map(|zone| {
                zone.match_specificity(destination)
                    .map(|specificity| (zone, specificity))
            })
            // max_by_key returns the last maximum; rev() makes earlier
            // zones win ties, matching FirstMatch ordering.
            .rev()
            .max_by_key(|(_, specificity)| *specificity)
            .map(|(zone, _)| zone),
    }
}

/// Resolves the shipping price of a zone for the given cart metrics.
///
/// Rules are evaluated in stored list order and the first rule whose
/// interval contains the cart's metric wins; no tightest-fit sorting is
/// attempted.
///
/// # Errors
///
/// Returns [`ShippingError::NoRuleMatched`] when no rule matches. Callers
/// must treat this as shipping being unavailable for the zone, not as a
/// zero price.
pub fn resolve_shipping_cost<'a>(
    zone: &CargoZone<'a>,
    metrics: &CartMetrics,
) -> Result<Money<'a, Currency>, ShippingError> {
    zone.rules
        .iter()
        .find(|rule| rule.matches(metrics.for_condition(rule.condition)))
        .map(|rule| *rule.price())
        .ok_or(ShippingError::NoRuleMatched(zone.uuid))
}

/// Resolves a shipping price end to end: zone selection, then rule
/// matching within the selected zone.
///
/// # Errors
///
/// - [`ShippingError::NoZoneMatched`]: no zone covers the destination.
/// - [`ShippingError::NoRuleMatched`]: the selected zone has no rule
///   matching the cart metrics.
pub fn quote<'a>(
    zones: &[CargoZone<'a>],
    destination: &Destination,
    metrics: &CartMetrics,
    strategy: ZoneStrategy,
) -> Result<Money<'a, Currency>, ShippingError> {
    let zone = select_zone(zones, destination, strategy).ok_or(ShippingError::NoZoneMatched)?;

    resolve_shipping_cost(zone, metrics)
}

#[cfg(test)]
mod tests {
    use rusty_money::iso;
    use testresult::TestResult;

    use super::*;

    fn country_zone<'a>(country: Uuid, rules: Vec<CargoRule<'a>>) -> CargoZone<'a> {
        CargoZone::new(
            Uuid::now_v7(),
            "Domestic",
            vec![Location::new(country, LocationScope::Country)],
            rules,
        )
    }

    fn price_rule<'a>(
        price_minor: i64,
        min: Option<i64>,
        max: Option<i64>,
    ) -> CargoRule<'a> {
        CargoRule::new(
            Uuid::now_v7(),
            "Standard",
            Money::from_minor(price_minor, iso::TRY),
            RuleCondition::SalesPrice,
            min.map(Decimal::from),
            max.map(Decimal::from),
        )
    }

    fn metrics(weight: i64, sales: i64) -> CartMetrics {
        CartMetrics::new(Decimal::from(weight), Decimal::from(sales))
    }

    #[test]
    fn unbounded_rule_matches_every_metric() {
        let rule = price_rule(100, None, None);

        assert!(rule.matches(Decimal::ZERO));
        assert!(rule.matches(Decimal::from(1)));
        assert!(rule.matches(Decimal::from(1_000_000)));
    }

    #[test]
    fn half_open_rule_matches_above_min_only() {
        let rule = price_rule(100, Some(100), None);

        assert!(rule.matches(Decimal::from(150)));
        assert!(rule.matches(Decimal::from(100)));
        assert!(!rule.matches(Decimal::from(50)));
    }

    #[test]
    fn zero_bounds_are_normalised_to_unbounded() {
        let rule = price_rule(100, Some(0), Some(0));

        assert_eq!(rule.min_value(), None);
        assert_eq!(rule.max_value(), None);
        assert!(rule.matches(Decimal::from(999)));
    }

    #[test]
    fn free_shipping_under_threshold_scenario() -> TestResult {
        let country = Uuid::now_v7();
        let zone = country_zone(country, vec![price_rule(0, None, Some(500))]);

        let destination = Destination {
            country,
            state: None,
            city: None,
        };

        let price = quote(
            std::slice::from_ref(&zone),
            &destination,
            &metrics(0, 300),
            ZoneStrategy::FirstMatch,
        )?;

        assert_eq!(price, Money::from_minor(0, iso::TRY));

        Ok(())
    }

    #[test]
    fn first_matching_rule_wins_in_list_order() -> TestResult {
        let country = Uuid::now_v7();

        // Both rules match a sales total of 200; the first stored rule must
        // win even though the second is tighter.
        let zone = country_zone(
            country,
            vec![price_rule(150, None, None), price_rule(75, Some(100), Some(300))],
        );

        let price = resolve_shipping_cost(&zone, &metrics(0, 200))?;

        assert_eq!(price, Money::from_minor(150, iso::TRY));

        Ok(())
    }

    #[test]
    fn no_matching_rule_is_a_blocking_error() {
        let country = Uuid::now_v7();
        let zone = country_zone(country, vec![price_rule(100, Some(500), None)]);

        let result = resolve_shipping_cost(&zone, &metrics(0, 200));

        assert_eq!(result, Err(ShippingError::NoRuleMatched(zone.uuid())));
    }

    #[test]
    fn weight_rules_read_the_weight_metric() -> TestResult {
        let country = Uuid::now_v7();

        let heavy = CargoRule::new(
            Uuid::now_v7(),
            "Heavy",
            Money::from_minor(500, iso::TRY),
            RuleCondition::ProductWeight,
            Some(Decimal::from(1000)),
            None,
        );

        let light = CargoRule::new(
            Uuid::now_v7(),
            "Light",
            Money::from_minor(100, iso::TRY),
            RuleCondition::ProductWeight,
            None,
            Some(Decimal::from(999)),
        );

        let zone = country_zone(country, vec![heavy, light]);

        let price = resolve_shipping_cost(&zone, &metrics(1500, 0))?;
        assert_eq!(price, Money::from_minor(500, iso::TRY));

        let price = resolve_shipping_cost(&zone, &metrics(200, 0))?;
        assert_eq!(price, Money::from_minor(100, iso::TRY));

        Ok(())
    }

    #[test]
    fn location_matching_respects_scope() {
        let country = Uuid::now_v7();
        let state = Uuid::now_v7();
        let city = Uuid::now_v7();

        let whole_country = Location::new(country, LocationScope::Country);
        let one_state = Location::new(
            country,
            LocationScope::States(FxHashSet::from_iter([state])),
        );
        let one_city = Location::new(country, LocationScope::Cities(FxHashSet::from_iter([city])));

        let in_state = Destination {
            country,
            state: Some(state),
            city: None,
        };

        let in_city = Destination {
            country,
            state: None,
            city: Some(city),
        };

        let elsewhere = Destination {
            country: Uuid::now_v7(),
            state: Some(state),
            city: Some(city),
        };

        assert!(whole_country.matches(&in_state));
        assert!(one_state.matches(&in_state));
        assert!(!one_state.matches(&in_city));
        assert!(one_city.matches(&in_city));
        assert!(!whole_country.matches(&elsewhere));
    }

    #[test]
    fn select_zone_returns_none_when_nothing_covers() {
        let zone = country_zone(Uuid::now_v7(), vec![price_rule(100, None, None)]);

        let destination = Destination {
            country: Uuid::now_v7(),
            state: None,
            city: None,
        };

        let selected = select_zone(
            std::slice::from_ref(&zone),
            &destination,
            ZoneStrategy::FirstMatch,
        );

        assert!(selected.is_none());
    }

    /// Two zones both covering a destination is ambiguous input: nothing in
    /// the data model forbids it, and which zone wins is purely a strategy
    /// decision. These two tests pin the behaviour of each strategy over
    /// the same overlap.
    #[test]
    fn overlapping_zones_first_match_takes_list_order() {
        let country = Uuid::now_v7();
        let state = Uuid::now_v7();

        let broad = country_zone(country, vec![price_rule(200, None, None)]);

        let narrow = CargoZone::new(
            Uuid::now_v7(),
            "State special",
            vec![Location::new(
                country,
                LocationScope::States(FxHashSet::from_iter([state])),
            )],
            vec![price_rule(50, None, None)],
        );

        let destination = Destination {
            country,
            state: Some(state),
            city: None,
        };

        let zones = vec![broad, narrow];
        let selected = select_zone(&zones, &destination, ZoneStrategy::FirstMatch);

        assert_eq!(selected.map(CargoZone::name), Some("Domestic"));
    }

    #[test]
    fn overlapping_zones_most_specific_prefers_narrow_zone() {
        let country = Uuid::now_v7();
        let state = Uuid::now_v7();

        let broad = country_zone(country, vec![price_rule(200, None, None)]);

        let narrow = CargoZone::new(
            Uuid::now_v7(),
            "State special",
            vec![Location::new(
                country,
                LocationScope::States(FxHashSet::from_iter([state])),
            )],
            vec![price_rule(50, None, None)],
        );

        let destination = Destination {
            country,
            state: Some(state),
            city: None,
        };

        let zones = vec![broad, narrow];
        let selected = select_zone(&zones, &destination, ZoneStrategy::MostSpecific);

        assert_eq!(selected.map(CargoZone::name), Some("State special"));
    }

    #[test]
    fn most_specific_ties_fall_back_to_list_order() {
        let country = Uuid::now_v7();

        let first = country_zone(country, vec![price_rule(100, None, None)]);
        let second = CargoZone::new(
            Uuid::now_v7(),
            "Also domestic",
            vec![Location::new(country, LocationScope::Country)],
            vec![price_rule(999, None, None)],
        );

        let destination = Destination {
            country,
            state: None,
            city: None,
        };

        let zones = vec![first, second];
        let selected = select_zone(&zones, &destination, ZoneStrategy::MostSpecific);

        assert_eq!(selected.map(CargoZone::name), Some("Domestic"));
    }

    #[test]
    fn quote_with_no_zone_errors() {
        let destination = Destination {
            country: Uuid::now_v7(),
            state: None,
            city: None,
        };

        let result = quote(
            &[],
            &destination,
            &metrics(0, 100),
            ZoneStrategy::FirstMatch,
        );

        assert_eq!(result, Err(ShippingError::NoZoneMatched));
    }
}
