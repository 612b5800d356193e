//! End-to-end pricing pipeline scenarios
//!
//! Each test walks a realistic checkout slice: recalculate a cart, derive
//! its metrics, resolve shipping against cargo zones, and reshape
//! discounts along the way.

use rust_decimal::Decimal;
use rustc_hash::FxHashSet;
use rusty_money::{Money, iso};
use testresult::TestResult;
use uuid::Uuid;

use pazar::{
    carts::{Cart, CartLine},
    discounts::{Discount, DiscountCommon, DiscountPayload, DiscountType},
    shipping::{
        CargoRule, CargoZone, CartMetrics, Destination, Location, LocationScope, RuleCondition,
        ShippingError, ZoneStrategy, quote,
    },
    variants::{VariantGroup, VariantOption, generate_combinations},
};

#[test]
fn discounted_cart_ships_free_under_threshold() -> TestResult {
    let cart = Cart::new(Uuid::now_v7(), iso::TRY);

    // Two units at 2.00 with a 1.60 sale price, one unit at 1.00.
    let cart = cart.recalculate(vec![
        CartLine::discounted(
            Uuid::now_v7(),
            2,
            Money::from_minor(200, iso::TRY),
            Money::from_minor(160, iso::TRY),
        ),
        CartLine::new(Uuid::now_v7(), 1, Money::from_minor(100, iso::TRY)),
    ])?;

    assert_eq!(cart.total_items(), 3);
    assert_eq!(cart.total_amount(), &Money::from_minor(500, iso::TRY));
    assert_eq!(cart.total_discount(), &Money::from_minor(80, iso::TRY));

    let country = Uuid::now_v7();

    let zone = CargoZone::new(
        Uuid::now_v7(),
        "Yurtiçi",
        vec![Location::new(country, LocationScope::Country)],
        vec![
            CargoRule::new(
                Uuid::now_v7(),
                "Free under 10.00",
                Money::from_minor(0, iso::TRY),
                RuleCondition::SalesPrice,
                None,
                Some(Decimal::from(1000)),
            ),
            CargoRule::new(
                Uuid::now_v7(),
                "Flat above",
                Money::from_minor(4500, iso::TRY),
                RuleCondition::SalesPrice,
                Some(Decimal::from(1000)),
                None,
            ),
        ],
    );

    let destination = Destination {
        country,
        state: None,
        city: None,
    };

    let metrics = CartMetrics::new(
        Decimal::ZERO,
        Decimal::from(cart.total_amount().to_minor_units()),
    );

    let price = quote(
        std::slice::from_ref(&zone),
        &destination,
        &metrics,
        ZoneStrategy::FirstMatch,
    )?;

    assert_eq!(price, Money::from_minor(0, iso::TRY));

    Ok(())
}

#[test]
fn heavy_cart_with_no_applicable_rule_blocks_checkout() {
    let country = Uuid::now_v7();

    // The only rule stops at 30kg; heavier carts have no shipping price
    // and checkout must block rather than default to zero.
    let zone = CargoZone::new(
        Uuid::now_v7(),
        "Standart",
        vec![Location::new(country, LocationScope::Country)],
        vec![CargoRule::new(
            Uuid::now_v7(),
            "Up to 30kg",
            Money::from_minor(2500, iso::TRY),
            RuleCondition::ProductWeight,
            None,
            Some(Decimal::from(30_000)),
        )],
    );

    let destination = Destination {
        country,
        state: None,
        city: None,
    };

    let metrics = CartMetrics::new(Decimal::from(45_000), Decimal::from(100_000));

    let result = quote(
        std::slice::from_ref(&zone),
        &destination,
        &metrics,
        ZoneStrategy::FirstMatch,
    );

    assert_eq!(result, Err(ShippingError::NoRuleMatched(zone.uuid())));
}

#[test]
fn city_zone_beats_country_zone_only_under_most_specific() {
    let country = Uuid::now_v7();
    let city = Uuid::now_v7();

    let nationwide = CargoZone::new(
        Uuid::now_v7(),
        "Nationwide",
        vec![Location::new(country, LocationScope::Country)],
        vec![CargoRule::new(
            Uuid::now_v7(),
            "Flat",
            Money::from_minor(3000, iso::TRY),
            RuleCondition::SalesPrice,
            None,
            None,
        )],
    );

    let metro = CargoZone::new(
        Uuid::now_v7(),
        "Metro",
        vec![Location::new(
            country,
            LocationScope::Cities(FxHashSet::from_iter([city])),
        )],
        vec![CargoRule::new(
            Uuid::now_v7(),
            "Courier",
            Money::from_minor(1000, iso::TRY),
            RuleCondition::SalesPrice,
            None,
            None,
        )],
    );

    let destination = Destination {
        country,
        state: None,
        city: Some(city),
    };

    let metrics = CartMetrics::new(Decimal::ZERO, Decimal::from(500));
    let zones = vec![nationwide, metro];

    // Storage order wins under the historical strategy: the nationwide
    // zone shadows the metro zone entirely.
    let first_match = quote(&zones, &destination, &metrics, ZoneStrategy::FirstMatch);
    assert_eq!(first_match, Ok(Money::from_minor(3000, iso::TRY)));

    let most_specific = quote(&zones, &destination, &metrics, ZoneStrategy::MostSpecific);
    assert_eq!(most_specific, Ok(Money::from_minor(1000, iso::TRY)));
}

#[test]
fn regenerated_variants_keep_stock_across_an_option_addition() {
    let product = Uuid::now_v7();

    let red = Uuid::now_v7();
    let blue = Uuid::now_v7();
    let small = Uuid::now_v7();

    let mut groups = vec![
        VariantGroup {
            uuid: Uuid::now_v7(),
            options: vec![
                VariantOption {
                    uuid: red,
                    name: "Kırmızı".to_string(),
                },
                VariantOption {
                    uuid: blue,
                    name: "Mavi".to_string(),
                },
            ],
        },
        VariantGroup {
            uuid: Uuid::now_v7(),
            options: vec![VariantOption {
                uuid: small,
                name: "S".to_string(),
            }],
        },
    ];

    let mut combinations = generate_combinations(&groups, &[], product);
    assert_eq!(combinations.len(), 2);

    for combination in &mut combinations {
        combination.stock = 12;
    }

    // Merchandiser adds a size; the stocked colour/size pairs survive and
    // two fresh defaulted combinations appear.
    groups[1].options.push(VariantOption {
        uuid: Uuid::now_v7(),
        name: "M".to_string(),
    });

    let regenerated = generate_combinations(&groups, &combinations, product);

    assert_eq!(regenerated.len(), 4);
    assert_eq!(regenerated.iter().filter(|c| c.stock == 12).count(), 2);
    assert_eq!(regenerated.iter().filter(|c| c.stock == 0).count(), 2);
}

#[test]
fn campaign_retype_keeps_scoping_but_not_value() {
    let product = Uuid::now_v7();

    let campaign = Discount {
        common: DiscountCommon {
            title: "Sepette %20".to_string(),
            is_all_products: false,
            product_uuids: vec![product],
            min_order_amount: Some(15_000),
            ..DiscountCommon::default()
        },
        payload: DiscountPayload::Percentage { discount_value: 20 },
    };

    let retyped = campaign.retype(DiscountType::FixedAmountGrowPrice);

    assert_eq!(retyped.common.title, "Sepette %20");
    assert_eq!(retyped.common.product_uuids, vec![product]);
    assert_eq!(retyped.common.min_order_amount, Some(15_000));
    assert_eq!(
        retyped.payload,
        DiscountPayload::FixedAmountGrowPrice { tiers: Vec::new() }
    );
}
