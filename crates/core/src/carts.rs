//! Carts
//!
//! A cart aggregates priced lines and carries denormalised totals. Totals
//! are recomputed wholesale on every mutation; callers never patch them
//! incrementally.

use rusty_money::{Money, iso::Currency};
use thiserror::Error;
use uuid::Uuid;

/// Errors related to cart total recalculation.
#[derive(Debug, Error)]
pub enum CartError {
    /// A line's currency differs from the cart currency (index, line currency, cart currency).
    #[error("Line {0} has currency {1}, but cart has currency {2}")]
    CurrencyMismatch(usize, &'static str, &'static str),
}

/// A single cart line: one product at one price, some quantity of times.
#[derive(Clone, Debug, PartialEq)]
pub struct CartLine<'a> {
    item: Uuid,
    quantity: u32,
    unit_price: Money<'a, Currency>,
    discounted_unit_price: Option<Money<'a, Currency>>,
}

impl<'a> CartLine<'a> {
    /// Creates a full-price line.
    #[must_use]
    pub fn new(item: Uuid, quantity: u32, unit_price: Money<'a, Currency>) -> Self {
        Self {
            item,
            quantity,
            unit_price,
            discounted_unit_price: None,
        }
    }

    /// Creates a line with a discounted unit price.
    ///
    /// A discounted price at or above the unit price is carried but
    /// contributes nothing to the cart's discount total.
    #[must_use]
    pub fn discounted(
        item: Uuid,
        quantity: u32,
        unit_price: Money<'a, Currency>,
        discounted_unit_price: Money<'a, Currency>,
    ) -> Self {
        Self {
            item,
            quantity,
            unit_price,
            discounted_unit_price: Some(discounted_unit_price),
        }
    }

    /// Returns the item this line refers to.
    pub fn item(&self) -> Uuid {
        self.item
    }

    /// Returns the quantity of the line.
    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Returns the full unit price of the line.
    pub fn unit_price(&self) -> &Money<'a, Currency> {
        &self.unit_price
    }

    /// Returns the discounted unit price, when one applies.
    pub fn discounted_unit_price(&self) -> Option<&Money<'a, Currency>> {
        self.discounted_unit_price.as_ref()
    }
}

/// Cart
#[derive(Clone, Debug)]
pub struct Cart<'a> {
    uuid: Uuid,
    currency: &'static Currency,
    lines: Vec<CartLine<'a>>,
    total_items: u64,
    total_products: u64,
    total_amount: Money<'a, Currency>,
    total_discount: Money<'a, Currency>,
}

impl<'a> Cart<'a> {
    /// Creates an empty cart in the given currency.
    #[must_use]
    pub fn new(uuid: Uuid, currency: &'static Currency) -> Self {
        Self {
            uuid,
            currency,
            lines: Vec::new(),
            total_items: 0,
            total_products: 0,
            total_amount: Money::from_minor(0, currency),
            total_discount: Money::from_minor(0, currency),
        }
    }

    /// Recalculates the cart against a replacement set of lines.
    ///
    /// The input lines replace the cart's lines wholesale and every total is
    /// derived again in a single pass:
    ///
    /// - `total_items` is the sum of line quantities;
    /// - `total_products` is the number of distinct lines;
    /// - `total_amount` is the sum of `unit_price × quantity`;
    /// - `total_discount` counts `(unit_price − discounted_unit_price) ×
    ///   quantity` only for lines whose discounted price is strictly below
    ///   the unit price.
    ///
    /// Returns a new cart; the receiver is left untouched so callers can
    /// discard the result to roll back an optimistic update.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::CurrencyMismatch`] if any line is priced in a
    /// currency other than the cart's.
    pub fn recalculate(&self, lines: Vec<CartLine<'a>>) -> Result<Cart<'a>, CartError> {
        let mut total_items: u64 = 0;
        let mut amount_minor: i64 = 0;
        let mut discount_minor: i64 = 0;

        for (i, line) in lines.iter().enumerate() {
            let line_currency = line.unit_price.currency();
            if line_currency != self.currency {
                return Err(CartError::CurrencyMismatch(
                    i,
                    line_currency.iso_alpha_code,
                    self.currency.iso_alpha_code,
                ));
            }

            let quantity = i64::from(line.quantity);
            let unit_minor = line.unit_price.to_minor_units();

            total_items += u64::from(line.quantity);
            amount_minor += unit_minor * quantity;

            if let Some(discounted) = &line.discounted_unit_price {
                let discounted_currency = discounted.currency();
                if discounted_currency != self.currency {
                    return Err(CartError::CurrencyMismatch(
                        i,
                        discounted_currency.iso_alpha_code,
                        self.currency.iso_alpha_code,
                    ));
                }

                let discounted_minor = discounted.to_minor_units();
                if discounted_minor < unit_minor {
                    discount_minor += (unit_minor - discounted_minor) * quantity;
                }
            }
        }

        let total_products = u64::try_from(lines.len()).unwrap_or(u64::MAX);

        Ok(Cart {
            uuid: self.uuid,
            currency: self.currency,
            lines,
            total_items,
            total_products,
            total_amount: Money::from_minor(amount_minor, self.currency),
            total_discount: Money::from_minor(discount_minor, self.currency),
        })
    }

    /// Returns the cart identifier.
    pub fn uuid(&self) -> Uuid {
        self.uuid
    }

    /// Returns the cart currency.
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }

    /// Returns the cart lines.
    pub fn lines(&self) -> &[CartLine<'a>] {
        &self.lines
    }

    /// Returns the total number of units across all lines.
    pub fn total_items(&self) -> u64 {
        self.total_items
    }

    /// Returns the number of distinct lines.
    pub fn total_products(&self) -> u64 {
        self.total_products
    }

    /// Returns the gross amount before any discount.
    pub fn total_amount(&self) -> &Money<'a, Currency> {
        &self.total_amount
    }

    /// Returns the discount delta against the gross amount.
    pub fn total_discount(&self) -> &Money<'a, Currency> {
        &self.total_discount
    }

    /// Check if the cart has no lines.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::iso;
    use testresult::TestResult;

    use super::*;

    fn empty_cart() -> Cart<'static> {
        Cart::new(Uuid::now_v7(), iso::TRY)
    }

    #[test]
    fn recalculate_concrete_scenario() -> TestResult {
        let cart = empty_cart();

        let lines = vec![CartLine::discounted(
            Uuid::now_v7(),
            2,
            Money::from_minor(100, iso::TRY),
            Money::from_minor(80, iso::TRY),
        )];

        let cart = cart.recalculate(lines)?;

        assert_eq!(cart.total_items(), 2);
        assert_eq!(cart.total_amount(), &Money::from_minor(200, iso::TRY));
        assert_eq!(cart.total_discount(), &Money::from_minor(40, iso::TRY));
        assert_eq!(cart.total_products(), 1);

        Ok(())
    }

    #[test]
    fn total_items_sums_quantities_and_products_counts_lines() -> TestResult {
        let cart = empty_cart();

        let lines = vec![
            CartLine::new(Uuid::now_v7(), 3, Money::from_minor(100, iso::TRY)),
            CartLine::new(Uuid::now_v7(), 5, Money::from_minor(250, iso::TRY)),
        ];

        let cart = cart.recalculate(lines)?;

        assert_eq!(cart.total_items(), 8);
        assert_eq!(cart.total_products(), 2);
        assert_eq!(cart.total_amount(), &Money::from_minor(1550, iso::TRY));

        Ok(())
    }

    #[test]
    fn discount_at_or_above_unit_price_contributes_nothing() -> TestResult {
        let cart = empty_cart();

        let lines = vec![
            CartLine::discounted(
                Uuid::now_v7(),
                1,
                Money::from_minor(100, iso::TRY),
                Money::from_minor(100, iso::TRY),
            ),
            CartLine::discounted(
                Uuid::now_v7(),
                1,
                Money::from_minor(100, iso::TRY),
                Money::from_minor(120, iso::TRY),
            ),
            CartLine::new(Uuid::now_v7(), 1, Money::from_minor(100, iso::TRY)),
        ];

        let cart = cart.recalculate(lines)?;

        assert_eq!(cart.total_discount(), &Money::from_minor(0, iso::TRY));
        assert_eq!(cart.total_amount(), &Money::from_minor(300, iso::TRY));

        Ok(())
    }

    #[test]
    fn recalculate_returns_new_cart_and_leaves_receiver_untouched() -> TestResult {
        let original = empty_cart();

        let recalculated = original.recalculate(vec![CartLine::new(
            Uuid::now_v7(),
            4,
            Money::from_minor(50, iso::TRY),
        )])?;

        assert_eq!(original.total_items(), 0);
        assert!(original.is_empty());
        assert_eq!(recalculated.total_items(), 4);
        assert_eq!(recalculated.uuid(), original.uuid());

        Ok(())
    }

    #[test]
    fn recalculate_with_no_lines_zeroes_totals() -> TestResult {
        let cart = empty_cart();

        let populated = cart.recalculate(vec![CartLine::new(
            Uuid::now_v7(),
            1,
            Money::from_minor(100, iso::TRY),
        )])?;

        let emptied = populated.recalculate(Vec::new())?;

        assert_eq!(emptied.total_items(), 0);
        assert_eq!(emptied.total_products(), 0);
        assert_eq!(emptied.total_amount(), &Money::from_minor(0, iso::TRY));
        assert_eq!(emptied.total_discount(), &Money::from_minor(0, iso::TRY));

        Ok(())
    }

    #[test]
    fn recalculate_currency_mismatch_errors() {
        let cart = empty_cart();

        let lines = vec![
            CartLine::new(Uuid::now_v7(), 1, Money::from_minor(100, iso::TRY)),
            CartLine::new(Uuid::now_v7(), 1, Money::from_minor(100, iso::USD)),
        ];

        let result = cart.recalculate(lines);

        match result {
            Err(CartError::CurrencyMismatch(idx, line_currency, cart_currency)) => {
                assert_eq!(idx, 1);
                assert_eq!(line_currency, iso::USD.iso_alpha_code);
                assert_eq!(cart_currency, iso::TRY.iso_alpha_code);
            }
            other => panic!("expected CurrencyMismatch error, got {other:?}"),
        }
    }

    #[test]
    fn recalculate_discounted_price_currency_mismatch_errors() {
        let cart = empty_cart();

        let lines = vec![CartLine::discounted(
            Uuid::now_v7(),
            1,
            Money::from_minor(100, iso::TRY),
            Money::from_minor(80, iso::EUR),
        )];

        let result = cart.recalculate(lines);

        assert!(
            matches!(result, Err(CartError::CurrencyMismatch(0, _, _))),
            "expected CurrencyMismatch, got {result:?}"
        );
    }

    #[test]
    fn line_accessors_return_constructor_values() {
        let item = Uuid::now_v7();

        let line = CartLine::discounted(
            item,
            2,
            Money::from_minor(100, iso::TRY),
            Money::from_minor(80, iso::TRY),
        );

        assert_eq!(line.item(), item);
        assert_eq!(line.quantity(), 2);
        assert_eq!(line.unit_price(), &Money::from_minor(100, iso::TRY));
        assert_eq!(
            line.discounted_unit_price(),
            Some(&Money::from_minor(80, iso::TRY))
        );
    }
}
