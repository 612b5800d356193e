//! Shipping service.

use async_trait::async_trait;
use mockall::automock;
use pazar::shipping::{
    CargoZone, CartMetrics, Destination, ShippingError, ZoneStrategy, resolve_shipping_cost,
    select_zone,
};
use rust_decimal::Decimal;
use tracing::info;

use crate::{
    database::Db,
    domain::{
        carts::{
            PgCartItemsRepository, PgCartsRepository,
            records::{CartItemRecord, CartUuid},
        },
        shipping::{
            data::{NewCargoZone, NewZoneLocation, ShippingQuote},
            errors::ShippingServiceError,
            records::{CargoZoneRecord, CargoZoneUuid},
            repository::PgCargoZonesRepository,
        },
        tenants::records::TenantUuid,
    },
};

#[derive(Debug, Clone)]
pub struct PgShippingService {
    db: Db,
    zones_repository: PgCargoZonesRepository,
    carts_repository: PgCartsRepository,
    items_repository: PgCartItemsRepository,
}

impl PgShippingService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            zones_repository: PgCargoZonesRepository::new(),
            carts_repository: PgCartsRepository::new(),
            items_repository: PgCartItemsRepository::new(),
        }
    }
}

#[async_trait]
impl ShippingService for PgShippingService {
    async fn get_zones(
        &self,
        tenant: TenantUuid,
    ) -> Result<Vec<CargoZoneRecord>, ShippingServiceError> {
        let mut tx = self.db.begin_tenant_transaction(tenant).await?;

        let zones = self.zones_repository.get_zones(&mut tx).await?;

        tx.commit().await?;

        Ok(zones)
    }

    #[tracing::instrument(
        name = "shipping.service.replace_zone",
        skip(self, zone),
        fields(
            tenant_uuid = %tenant,
            zone_uuid = %zone.uuid,
            location_count = zone.locations.len(),
            rule_count = zone.rules.len()
        ),
        err
    )]
    async fn replace_zone(
        &self,
        tenant: TenantUuid,
        zone: NewCargoZone,
    ) -> Result<CargoZoneRecord, ShippingServiceError> {
        if !zone.locations.iter().all(NewZoneLocation::is_consistent) {
            return Err(ShippingServiceError::InvalidData);
        }

        // Delete-then-insert runs inside one transaction: a failed insert
        // rolls the delete back, and concurrent readers never observe a
        // zone stripped of its locations or rules.
        let mut tx = self.db.begin_tenant_transaction(tenant).await?;

        self.zones_repository.replace_zone(&mut tx, &zone).await?;

        let record = self.zones_repository.get_zone(&mut tx, zone.uuid).await?;

        tx.commit().await?;

        info!(
            zone_uuid = %record.uuid,
            locations = record.locations.len(),
            rules = record.rules.len(),
            "replaced cargo zone"
        );

        Ok(record)
    }

    #[tracing::instrument(
        name = "shipping.service.quote_for_cart",
        skip(self, destination),
        fields(tenant_uuid = %tenant, cart_uuid = %cart),
        err
    )]
    async fn quote_for_cart(
        &self,
        tenant: TenantUuid,
        cart: CartUuid,
        destination: Destination,
        strategy: ZoneStrategy,
    ) -> Result<ShippingQuote, ShippingServiceError> {
        let mut tx = self.db.begin_tenant_transaction(tenant).await?;

        let zone_records = self.zones_repository.get_zones(&mut tx).await?;

        self.carts_repository.get_cart(&mut tx, cart).await?;
        let items = self.items_repository.get_cart_items(&mut tx, cart).await?;

        tx.commit().await?;

        let metrics = cart_metrics(&items);

        let zones = zone_records
            .iter()
            .map(CargoZoneRecord::to_zone)
            .collect::<Result<Vec<CargoZone<'static>>, _>>()?;

        let zone =
            select_zone(&zones, &destination, strategy).ok_or(ShippingError::NoZoneMatched)?;

        let price = resolve_shipping_cost(zone, &metrics)?;

        Ok(ShippingQuote {
            zone_uuid: CargoZoneUuid::from_uuid(zone.uuid()),
            price: u64::try_from(price.to_minor_units())?,
            currency: price.currency().iso_alpha_code.to_string(),
        })
    }
}

/// The rule metrics of a cart: aggregate weight, and the sales total the
/// customer actually pays for the goods (discounted prices where they
/// undercut the unit price).
fn cart_metrics(items: &[CartItemRecord]) -> CartMetrics {
    let mut total_weight = Decimal::ZERO;
    let mut sales_total = Decimal::ZERO;

    for item in items {
        let quantity = Decimal::from(item.quantity);

        let effective_price = match item.discounted_unit_price {
            Some(discounted) if discounted < item.unit_price => discounted,
            _ => item.unit_price,
        };

        total_weight += item.unit_weight * quantity;
        sales_total += Decimal::from(effective_price) * quantity;
    }

    CartMetrics::new(total_weight, sales_total)
}

#[automock]
#[async_trait]
pub trait ShippingService: Send + Sync {
    /// Retrieves every cargo zone of the tenant, with locations and rules.
    async fn get_zones(
        &self,
        tenant: TenantUuid,
    ) -> Result<Vec<CargoZoneRecord>, ShippingServiceError>;

    /// Replaces a zone's locations and rules wholesale, atomically.
    async fn replace_zone(
        &self,
        tenant: TenantUuid,
        zone: NewCargoZone,
    ) -> Result<CargoZoneRecord, ShippingServiceError>;

    /// Resolves a shipping quote for a cart and destination.
    async fn quote_for_cart(
        &self,
        tenant: TenantUuid,
        cart: CartUuid,
        destination: Destination,
        strategy: ZoneStrategy,
    ) -> Result<ShippingQuote, ShippingServiceError>;
}

#[cfg(test)]
mod tests {
    use jiff::Timestamp;
    use pazar::shipping::RuleCondition;

    use crate::domain::{carts::records::CartItemUuid, products::records::ProductUuid};

    use super::*;

    fn item(quantity: u32, unit_price: u64, discounted: Option<u64>, weight: i64) -> CartItemRecord {
        CartItemRecord {
            uuid: CartItemUuid::new(),
            product_uuid: ProductUuid::new(),
            quantity,
            unit_price,
            discounted_unit_price: discounted,
            unit_weight: Decimal::from(weight),
            created_at: Timestamp::now(),
            updated_at: Timestamp::now(),
            deleted_at: None,
        }
    }

    #[test]
    fn cart_metrics_sum_weight_and_effective_prices() {
        let items = [item(2, 200, Some(160), 500), item(1, 100, None, 250)];

        let metrics = cart_metrics(&items);

        assert_eq!(
            metrics.for_condition(RuleCondition::ProductWeight),
            Decimal::from(1250)
        );
        assert_eq!(
            metrics.for_condition(RuleCondition::SalesPrice),
            Decimal::from(420)
        );
    }

    #[test]
    fn cart_metrics_ignore_non_discounting_sale_price() {
        let items = [item(1, 100, Some(150), 100)];

        let metrics = cart_metrics(&items);

        assert_eq!(
            metrics.for_condition(RuleCondition::SalesPrice),
            Decimal::from(100)
        );
    }

    #[test]
    fn cart_metrics_of_empty_cart_are_zero() {
        let metrics = cart_metrics(&[]);

        assert_eq!(
            metrics.for_condition(RuleCondition::ProductWeight),
            Decimal::ZERO
        );
        assert_eq!(
            metrics.for_condition(RuleCondition::SalesPrice),
            Decimal::ZERO
        );
    }
}
