//! Checkout Walkthrough Example
//!
//! Builds a small cart, recalculates its totals, and resolves a shipping
//! price against a pair of cargo zones.

use anyhow::Result;
use rust_decimal::Decimal;
use rusty_money::{Money, iso};
use uuid::Uuid;

use pazar::{
    carts::{Cart, CartLine},
    shipping::{
        CargoRule, CargoZone, CartMetrics, Destination, Location, LocationScope, RuleCondition,
        ZoneStrategy, quote,
    },
};

/// Checkout Walkthrough Example
#[expect(clippy::print_stdout, reason = "Example program output to user")]
pub fn main() -> Result<()> {
    let cart = Cart::new(Uuid::now_v7(), iso::TRY);

    let cart = cart.recalculate(vec![
        CartLine::discounted(
            Uuid::now_v7(),
            2,
            Money::from_minor(12_500, iso::TRY),
            Money::from_minor(9_900, iso::TRY),
        ),
        CartLine::new(Uuid::now_v7(), 1, Money::from_minor(4_750, iso::TRY)),
    ])?;

    println!("items:    {}", cart.total_items());
    println!("amount:   {}", cart.total_amount());
    println!("discount: {}", cart.total_discount());

    let country = Uuid::now_v7();

    let zone = CargoZone::new(
        Uuid::now_v7(),
        "Yurtiçi",
        vec![Location::new(country, LocationScope::Country)],
        vec![
            CargoRule::new(
                Uuid::now_v7(),
                "Free over 250.00",
                Money::from_minor(0, iso::TRY),
                RuleCondition::SalesPrice,
                Some(Decimal::from(25_000)),
                None,
            ),
            CargoRule::new(
                Uuid::now_v7(),
                "Standard",
                Money::from_minor(4_990, iso::TRY),
                RuleCondition::SalesPrice,
                None,
                Some(Decimal::from(25_000)),
            ),
        ],
    );

    let destination = Destination {
        country,
        state: None,
        city: None,
    };

    let metrics = CartMetrics::new(
        Decimal::from(1_200),
        Decimal::from(cart.total_amount().to_minor_units()),
    );

    let shipping = quote(
        std::slice::from_ref(&zone),
        &destination,
        &metrics,
        ZoneStrategy::MostSpecific,
    )?;

    println!("shipping: {shipping}");

    Ok(())
}
