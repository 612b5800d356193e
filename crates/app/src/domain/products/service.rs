//! Products service.

use async_trait::async_trait;
use mockall::automock;
use pazar::variants::{VariantCombination, VariantGroup, generate_combinations};
use tracing::{Span, info};

use crate::{
    database::Db,
    domain::{
        products::{
            data::{NewProduct, NewVariantGroup},
            errors::ProductsServiceError,
            records::{ProductRecord, ProductUuid, VariantGroupRecord},
            repository::PgProductsRepository,
        },
        tenants::records::TenantUuid,
    },
};

#[derive(Debug, Clone)]
pub struct PgProductsService {
    db: Db,
    repository: PgProductsRepository,
}

impl PgProductsService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            repository: PgProductsRepository::new(),
        }
    }
}

#[async_trait]
impl ProductsService for PgProductsService {
    async fn create_product(
        &self,
        tenant: TenantUuid,
        product: NewProduct,
    ) -> Result<ProductRecord, ProductsServiceError> {
        let mut tx = self.db.begin_tenant_transaction(tenant).await?;

        let created = self.repository.create_product(&mut tx, product).await?;

        tx.commit().await?;

        Ok(created)
    }

    async fn get_product(
        &self,
        tenant: TenantUuid,
        product: ProductUuid,
    ) -> Result<ProductRecord, ProductsServiceError> {
        let mut tx = self.db.begin_tenant_transaction(tenant).await?;

        let product = self.repository.get_product(&mut tx, product).await?;

        tx.commit().await?;

        Ok(product)
    }

    async fn get_variant_groups(
        &self,
        tenant: TenantUuid,
        product: ProductUuid,
    ) -> Result<Vec<VariantGroupRecord>, ProductsServiceError> {
        let mut tx = self.db.begin_tenant_transaction(tenant).await?;

        let groups = self.repository.get_variant_groups(&mut tx, product).await?;

        tx.commit().await?;

        Ok(groups)
    }

    async fn get_combinations(
        &self,
        tenant: TenantUuid,
        product: ProductUuid,
    ) -> Result<Vec<VariantCombination>, ProductsServiceError> {
        let mut tx = self.db.begin_tenant_transaction(tenant).await?;

        let combinations = self.repository.get_combinations(&mut tx, product).await?;

        tx.commit().await?;

        Ok(combinations)
    }

    #[tracing::instrument(
        name = "products.service.set_variant_groups",
        skip(self, groups),
        fields(
            tenant_uuid = %tenant,
            product_uuid = %product,
            group_count = groups.len(),
            combination_count = tracing::field::Empty
        ),
        err
    )]
    async fn set_variant_groups(
        &self,
        tenant: TenantUuid,
        product: ProductUuid,
        groups: Vec<NewVariantGroup>,
    ) -> Result<Vec<VariantCombination>, ProductsServiceError> {
        let mut tx = self.db.begin_tenant_transaction(tenant).await?;

        // Confirm the product exists inside the same transaction, so a
        // concurrent delete cannot leave orphaned variant rows behind.
        self.repository.get_product(&mut tx, product).await?;

        self.repository
            .replace_variant_groups(&mut tx, product, &groups)
            .await?;

        let existing = self.repository.get_combinations(&mut tx, product).await?;

        let engine_groups: Vec<VariantGroup> = groups
            .iter()
            .map(NewVariantGroup::to_variant_group)
            .collect();

        let combinations =
            generate_combinations(&engine_groups, &existing, product.into_uuid());

        self.repository
            .replace_combinations(&mut tx, product, &combinations)
            .await?;

        tx.commit().await?;

        Span::current().record(
            "combination_count",
            tracing::field::display(combinations.len()),
        );

        info!(product_uuid = %product, combinations = combinations.len(), "regenerated variant combinations");

        Ok(combinations)
    }
}

#[automock]
#[async_trait]
pub trait ProductsService: Send + Sync {
    /// Creates a new product.
    async fn create_product(
        &self,
        tenant: TenantUuid,
        product: NewProduct,
    ) -> Result<ProductRecord, ProductsServiceError>;

    /// Retrieves a single product.
    async fn get_product(
        &self,
        tenant: TenantUuid,
        product: ProductUuid,
    ) -> Result<ProductRecord, ProductsServiceError>;

    /// Retrieves a product's variant groups and options.
    async fn get_variant_groups(
        &self,
        tenant: TenantUuid,
        product: ProductUuid,
    ) -> Result<Vec<VariantGroupRecord>, ProductsServiceError>;

    /// Retrieves a product's persisted variant combinations.
    async fn get_combinations(
        &self,
        tenant: TenantUuid,
        product: ProductUuid,
    ) -> Result<Vec<VariantCombination>, ProductsServiceError>;

    /// Replaces the product's variant groups and regenerates its
    /// combinations, preserving key-matched survivors.
    async fn set_variant_groups(
        &self,
        tenant: TenantUuid,
        product: ProductUuid,
        groups: Vec<NewVariantGroup>,
    ) -> Result<Vec<VariantCombination>, ProductsServiceError>;
}
