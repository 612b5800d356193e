//! Carts service.

use async_trait::async_trait;
use mockall::automock;
use pazar::carts::{Cart, CartLine};
use rusty_money::{Money, iso};
use tracing::info;

use crate::{
    database::Db,
    domain::{
        carts::{
            data::{CartTotals, NewCart, NewCartItem},
            errors::CartsServiceError,
            records::{CartItemRecord, CartItemUuid, CartRecord, CartUuid},
            repositories::{PgCartItemsRepository, PgCartsRepository},
        },
        tenants::records::TenantUuid,
    },
};

#[derive(Debug, Clone)]
pub struct PgCartsService {
    db: Db,
    carts_repository: PgCartsRepository,
    items_repository: PgCartItemsRepository,
}

impl PgCartsService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            carts_repository: PgCartsRepository::new(),
            items_repository: PgCartItemsRepository::new(),
        }
    }
}

#[async_trait]
impl CartsService for PgCartsService {
    async fn get_cart(
        &self,
        tenant: TenantUuid,
        uuid: CartUuid,
    ) -> Result<CartRecord, CartsServiceError> {
        let mut tx = self.db.begin_tenant_transaction(tenant).await?;

        let mut cart = self.carts_repository.get_cart(&mut tx, uuid).await?;
        let items = self.items_repository.get_cart_items(&mut tx, uuid).await?;

        tx.commit().await?;

        cart.items.extend(items);

        Ok(cart)
    }

    async fn create_cart(
        &self,
        tenant: TenantUuid,
        cart: NewCart,
    ) -> Result<CartRecord, CartsServiceError> {
        let mut tx = self.db.begin_tenant_transaction(tenant).await?;

        // An unknown currency code would otherwise only surface on the
        // first recalculation.
        if iso::find(&cart.currency).is_none() {
            return Err(CartsServiceError::InvalidCurrency(cart.currency));
        }

        let created = self.carts_repository.create_cart(&mut tx, cart).await?;

        tx.commit().await?;

        Ok(created)
    }

    async fn delete_cart(
        &self,
        tenant: TenantUuid,
        uuid: CartUuid,
    ) -> Result<(), CartsServiceError> {
        let mut tx = self.db.begin_tenant_transaction(tenant).await?;

        let rows_affected = self.carts_repository.delete_cart(&mut tx, uuid).await?;

        if rows_affected == 0 {
            return Err(CartsServiceError::NotFound);
        }

        tx.commit().await?;

        Ok(())
    }

    #[tracing::instrument(
        name = "carts.service.add_item",
        skip(self, item),
        fields(tenant_uuid = %tenant, cart_uuid = %cart),
        err
    )]
    async fn add_item(
        &self,
        tenant: TenantUuid,
        cart: CartUuid,
        item: NewCartItem,
    ) -> Result<CartItemRecord, CartsServiceError> {
        let mut tx = self.db.begin_tenant_transaction(tenant).await?;

        let item = self
            .items_repository
            .create_cart_item(&mut tx, cart, item)
            .await?;

        let record = self.carts_repository.get_cart(&mut tx, cart).await?;
        let items = self.items_repository.get_cart_items(&mut tx, cart).await?;

        let totals = recalculated_totals(&record, &items)?;

        self.carts_repository
            .update_cart_totals(&mut tx, cart, totals)
            .await?;

        tx.commit().await?;

        info!(cart_uuid = %cart, total_items = totals.total_items, "added cart item");

        Ok(item)
    }

    #[tracing::instrument(
        name = "carts.service.remove_item",
        skip(self),
        fields(tenant_uuid = %tenant, cart_uuid = %cart, item_uuid = %item),
        err
    )]
    async fn remove_item(
        &self,
        tenant: TenantUuid,
        cart: CartUuid,
        item: CartItemUuid,
    ) -> Result<(), CartsServiceError> {
        let mut tx = self.db.begin_tenant_transaction(tenant).await?;

        let rows_affected = self
            .items_repository
            .delete_cart_item(&mut tx, cart, item)
            .await?;

        if rows_affected == 0 {
            return Err(CartsServiceError::NotFound);
        }

        let record = self.carts_repository.get_cart(&mut tx, cart).await?;
        let items = self.items_repository.get_cart_items(&mut tx, cart).await?;

        let totals = recalculated_totals(&record, &items)?;

        self.carts_repository
            .update_cart_totals(&mut tx, cart, totals)
            .await?;

        tx.commit().await?;

        info!(cart_uuid = %cart, total_items = totals.total_items, "removed cart item");

        Ok(())
    }
}

/// Run the pricing engine over the cart's current items and return the
/// totals to persist.
fn recalculated_totals(
    cart: &CartRecord,
    items: &[CartItemRecord],
) -> Result<CartTotals, CartsServiceError> {
    let currency = iso::find(&cart.currency)
        .ok_or_else(|| CartsServiceError::InvalidCurrency(cart.currency.clone()))?;

    let lines = items
        .iter()
        .map(|item| {
            let unit_price = Money::from_minor(i64::try_from(item.unit_price)?, currency);

            let line = match item.discounted_unit_price {
                Some(discounted) => CartLine::discounted(
                    item.uuid.into_uuid(),
                    item.quantity,
                    unit_price,
                    Money::from_minor(i64::try_from(discounted)?, currency),
                ),
                None => CartLine::new(item.uuid.into_uuid(), item.quantity, unit_price),
            };

            Ok(line)
        })
        .collect::<Result<Vec<_>, CartsServiceError>>()?;

    let recalculated = Cart::new(cart.uuid.into_uuid(), currency).recalculate(lines)?;

    Ok(CartTotals {
        total_items: recalculated.total_items(),
        total_products: recalculated.total_products(),
        total_amount: u64::try_from(recalculated.total_amount().to_minor_units())?,
        total_discount: u64::try_from(recalculated.total_discount().to_minor_units())?,
    })
}

#[automock]
#[async_trait]
pub trait CartsService: Send + Sync {
    /// Retrieve a single cart with its items.
    async fn get_cart(
        &self,
        tenant: TenantUuid,
        uuid: CartUuid,
    ) -> Result<CartRecord, CartsServiceError>;

    /// Creates a new, empty cart.
    async fn create_cart(
        &self,
        tenant: TenantUuid,
        cart: NewCart,
    ) -> Result<CartRecord, CartsServiceError>;

    /// Deletes a cart with the given UUID.
    async fn delete_cart(
        &self,
        tenant: TenantUuid,
        uuid: CartUuid,
    ) -> Result<(), CartsServiceError>;

    /// Add an item to the given cart, recomputing totals.
    async fn add_item(
        &self,
        tenant: TenantUuid,
        cart: CartUuid,
        item: NewCartItem,
    ) -> Result<CartItemRecord, CartsServiceError>;

    /// Remove an item from the given cart, recomputing totals.
    async fn remove_item(
        &self,
        tenant: TenantUuid,
        cart: CartUuid,
        item: CartItemUuid,
    ) -> Result<(), CartsServiceError>;
}

#[cfg(test)]
mod tests {
    use jiff::Timestamp;
    use rust_decimal::Decimal;
    use testresult::TestResult;

    use crate::domain::products::records::ProductUuid;

    use super::*;

    fn cart_record(currency: &str) -> CartRecord {
        CartRecord {
            uuid: CartUuid::new(),
            currency: currency.to_string(),
            total_items: 99,
            total_products: 99,
            total_amount: 99,
            total_discount: 99,
            items: Vec::new(),
            created_at: Timestamp::now(),
            updated_at: Timestamp::now(),
            deleted_at: None,
        }
    }

    fn item(quantity: u32, unit_price: u64, discounted: Option<u64>) -> CartItemRecord {
        CartItemRecord {
            uuid: CartItemUuid::new(),
            product_uuid: ProductUuid::new(),
            quantity,
            unit_price,
            discounted_unit_price: discounted,
            unit_weight: Decimal::from(100),
            created_at: Timestamp::now(),
            updated_at: Timestamp::now(),
            deleted_at: None,
        }
    }

    #[test]
    fn recalculated_totals_concrete_scenario() -> TestResult {
        let cart = cart_record("TRY");
        let items = [item(2, 100, Some(80))];

        let totals = recalculated_totals(&cart, &items)?;

        assert_eq!(
            totals,
            CartTotals {
                total_items: 2,
                total_products: 1,
                total_amount: 200,
                total_discount: 40,
            }
        );

        Ok(())
    }

    #[test]
    fn recalculated_totals_replace_stale_values() -> TestResult {
        let cart = cart_record("TRY");

        let totals = recalculated_totals(&cart, &[])?;

        // The cart record carried nonsense totals; recalculation ignores
        // them entirely.
        assert_eq!(
            totals,
            CartTotals {
                total_items: 0,
                total_products: 0,
                total_amount: 0,
                total_discount: 0,
            }
        );

        Ok(())
    }

    #[test]
    fn recalculated_totals_ignore_non_discounting_sale_prices() -> TestResult {
        let cart = cart_record("TRY");
        let items = [item(1, 100, Some(100)), item(1, 100, None)];

        let totals = recalculated_totals(&cart, &items)?;

        assert_eq!(totals.total_discount, 0);
        assert_eq!(totals.total_amount, 200);

        Ok(())
    }

    #[test]
    fn recalculated_totals_unknown_currency_errors() {
        let cart = cart_record("XXINVALID");

        let result = recalculated_totals(&cart, &[]);

        assert!(
            matches!(result, Err(CartsServiceError::InvalidCurrency(_))),
            "expected InvalidCurrency, got {result:?}"
        );
    }
}
