//! Discounts service.

use async_trait::async_trait;
use mockall::automock;
use pazar::discounts::{Discount, DiscountCommon, DiscountType};
use tracing::info;

use crate::{
    database::Db,
    domain::{
        discounts::{
            data::NewDiscount,
            errors::DiscountsServiceError,
            records::{DiscountRecord, DiscountUuid},
            repository::PgDiscountsRepository,
        },
        tenants::records::TenantUuid,
    },
};

#[derive(Debug, Clone)]
pub struct PgDiscountsService {
    db: Db,
    repository: PgDiscountsRepository,
}

impl PgDiscountsService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            repository: PgDiscountsRepository::new(),
        }
    }
}

#[async_trait]
impl DiscountsService for PgDiscountsService {
    #[tracing::instrument(
        name = "discounts.service.create_discount",
        skip(self, discount),
        fields(
            tenant_uuid = %tenant,
            discount_uuid = %discount.uuid,
            discount_type = discount.discount_type.as_str()
        ),
        err
    )]
    async fn create_discount(
        &self,
        tenant: TenantUuid,
        discount: NewDiscount,
    ) -> Result<DiscountRecord, DiscountsServiceError> {
        let record = Discount::new(
            DiscountCommon::from_draft(discount.draft),
            discount.discount_type,
        );

        let mut tx = self.db.begin_tenant_transaction(tenant).await?;

        let created = self
            .repository
            .create_discount(&mut tx, discount.uuid, &record)
            .await?;

        tx.commit().await?;

        info!(discount_uuid = %created.uuid, "created discount");

        Ok(created)
    }

    async fn get_discount(
        &self,
        tenant: TenantUuid,
        uuid: DiscountUuid,
    ) -> Result<DiscountRecord, DiscountsServiceError> {
        let mut tx = self.db.begin_tenant_transaction(tenant).await?;

        let record = self.repository.get_discount(&mut tx, uuid).await?;

        tx.commit().await?;

        Ok(record)
    }

    #[tracing::instrument(
        name = "discounts.service.retype_discount",
        skip(self),
        fields(
            tenant_uuid = %tenant,
            discount_uuid = %uuid,
            new_type = new_type.as_str(),
            old_type = tracing::field::Empty
        ),
        err
    )]
    async fn retype_discount(
        &self,
        tenant: TenantUuid,
        uuid: DiscountUuid,
        new_type: DiscountType,
    ) -> Result<DiscountRecord, DiscountsServiceError> {
        let mut tx = self.db.begin_tenant_transaction(tenant).await?;

        let record = self.repository.get_discount(&mut tx, uuid).await?;

        tracing::Span::current().record(
            "old_type",
            tracing::field::display(record.discount_type().as_str()),
        );

        let reshaped = record.discount.retype(new_type);

        let rows_affected = self
            .repository
            .update_discount(&mut tx, uuid, &reshaped)
            .await?;

        if rows_affected == 0 {
            return Err(DiscountsServiceError::NotFound);
        }

        let updated = self.repository.get_discount(&mut tx, uuid).await?;

        tx.commit().await?;

        info!(discount_uuid = %uuid, new_type = new_type.as_str(), "retyped discount");

        Ok(updated)
    }
}

#[automock]
#[async_trait]
pub trait DiscountsService: Send + Sync {
    /// Creates a discount from a draft, applying defaults for absent
    /// fields.
    async fn create_discount(
        &self,
        tenant: TenantUuid,
        discount: NewDiscount,
    ) -> Result<DiscountRecord, DiscountsServiceError>;

    /// Retrieves a single discount.
    async fn get_discount(
        &self,
        tenant: TenantUuid,
        uuid: DiscountUuid,
    ) -> Result<DiscountRecord, DiscountsServiceError>;

    /// Switches a discount to a new type, preserving shared fields and
    /// resetting the payload.
    async fn retype_discount(
        &self,
        tenant: TenantUuid,
        uuid: DiscountUuid,
        new_type: DiscountType,
    ) -> Result<DiscountRecord, DiscountsServiceError>;
}
