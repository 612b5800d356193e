//! Products Repository

use jiff_sqlx::Timestamp as SqlxTimestamp;
use pazar::variants::{VariantCombination, VariantOption, VariantPrice, VariantSelection, VariantTranslation};
use rust_decimal::Decimal;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as, types::Json};
use uuid::Uuid;

use crate::domain::{
    products::{
        data::{NewProduct, NewVariantGroup},
        records::{ProductRecord, ProductUuid, VariantGroupRecord},
    },
    rows::{to_db_amount, try_get_amount, try_get_count, try_get_optional_amount},
};

const CREATE_PRODUCT_SQL: &str = include_str!("sql/create_product.sql");
const GET_PRODUCT_SQL: &str = include_str!("sql/get_product.sql");
const DELETE_VARIANT_OPTIONS_SQL: &str = include_str!("sql/delete_variant_options.sql");
const DELETE_VARIANT_GROUPS_SQL: &str = include_str!("sql/delete_variant_groups.sql");
const CREATE_VARIANT_GROUP_SQL: &str = include_str!("sql/create_variant_group.sql");
const CREATE_VARIANT_OPTION_SQL: &str = include_str!("sql/create_variant_option.sql");
const GET_VARIANT_GROUPS_SQL: &str = include_str!("sql/get_variant_groups.sql");
const GET_VARIANT_OPTIONS_SQL: &str = include_str!("sql/get_variant_options.sql");
const GET_COMBINATIONS_SQL: &str = include_str!("sql/get_combinations.sql");
const DELETE_COMBINATIONS_SQL: &str = include_str!("sql/delete_combinations.sql");
const CREATE_COMBINATION_SQL: &str = include_str!("sql/create_combination.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgProductsRepository;

impl PgProductsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn create_product(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        product: NewProduct,
    ) -> Result<ProductRecord, sqlx::Error> {
        let price = to_db_amount(product.price, "price")?;
        let sale_price = product
            .sale_price
            .map(|amount| to_db_amount(amount, "sale_price"))
            .transpose()?;

        query_as::<Postgres, ProductRecord>(CREATE_PRODUCT_SQL)
            .bind(product.uuid.into_uuid())
            .bind(&product.name)
            .bind(price)
            .bind(sale_price)
            .bind(product.weight)
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn get_product(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        product: ProductUuid,
    ) -> Result<ProductRecord, sqlx::Error> {
        query_as::<Postgres, ProductRecord>(GET_PRODUCT_SQL)
            .bind(product.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    /// Replace the product's variant groups and options with the given set.
    pub(crate) async fn replace_variant_groups(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        product: ProductUuid,
        groups: &[NewVariantGroup],
    ) -> Result<(), sqlx::Error> {
        query(DELETE_VARIANT_OPTIONS_SQL)
            .bind(product.into_uuid())
            .execute(&mut **tx)
            .await?;

        query(DELETE_VARIANT_GROUPS_SQL)
            .bind(product.into_uuid())
            .execute(&mut **tx)
            .await?;

        let mut group_position: i64 = 0;

        for group in groups {
            query(CREATE_VARIANT_GROUP_SQL)
                .bind(group.uuid)
                .bind(product.into_uuid())
                .bind(&group.name)
                .bind(group_position)
                .execute(&mut **tx)
                .await?;

            group_position += 1;

            let mut option_position: i64 = 0;

            for option in &group.options {
                query(CREATE_VARIANT_OPTION_SQL)
                    .bind(option.uuid)
                    .bind(group.uuid)
                    .bind(&option.name)
                    .bind(option_position)
                    .execute(&mut **tx)
                    .await?;

                option_position += 1;
            }
        }

        Ok(())
    }

    pub(crate) async fn get_variant_groups(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        product: ProductUuid,
    ) -> Result<Vec<VariantGroupRecord>, sqlx::Error> {
        let group_rows: Vec<(Uuid, String)> = query_as(GET_VARIANT_GROUPS_SQL)
            .bind(product.into_uuid())
            .fetch_all(&mut **tx)
            .await?;

        let option_rows: Vec<(Uuid, Uuid, String)> = query_as(GET_VARIANT_OPTIONS_SQL)
            .bind(product.into_uuid())
            .fetch_all(&mut **tx)
            .await?;

        let mut options_by_group: FxHashMap<Uuid, Vec<VariantOption>> = FxHashMap::default();

        for (group_uuid, option_uuid, name) in option_rows {
            options_by_group
                .entry(group_uuid)
                .or_default()
                .push(VariantOption {
                    uuid: option_uuid,
                    name,
                });
        }

        Ok(group_rows
            .into_iter()
            .map(|(uuid, name)| VariantGroupRecord {
                uuid,
                name,
                options: options_by_group.remove(&uuid).unwrap_or_default(),
            })
            .collect())
    }

    pub(crate) async fn get_combinations(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        product: ProductUuid,
    ) -> Result<Vec<VariantCombination>, sqlx::Error> {
        let rows: Vec<CombinationRow> = query_as(GET_COMBINATIONS_SQL)
            .bind(product.into_uuid())
            .fetch_all(&mut **tx)
            .await?;

        Ok(rows.into_iter().map(|row| row.0).collect())
    }

    /// Replace the product's combination set with the regenerated one.
    pub(crate) async fn replace_combinations(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        product: ProductUuid,
        combinations: &[VariantCombination],
    ) -> Result<(), sqlx::Error> {
        query(DELETE_COMBINATIONS_SQL)
            .bind(product.into_uuid())
            .execute(&mut **tx)
            .await?;

        let mut position: i64 = 0;

        for combination in combinations {
            query(CREATE_COMBINATION_SQL)
                .bind(Uuid::now_v7())
                .bind(product.into_uuid())
                .bind(&combination.sku)
                .bind(combination.barcode.as_deref())
                .bind(i64::from(combination.stock))
                .bind(combination.active)
                .bind(Json(&combination.selections))
                .bind(Json(&combination.prices))
                .bind(Json(&combination.translations))
                .bind(position)
                .execute(&mut **tx)
                .await?;

            position += 1;
        }

        Ok(())
    }
}

impl<'r> FromRow<'r, PgRow> for ProductRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: ProductUuid::from_uuid(row.try_get("uuid")?),
            name: row.try_get("name")?,
            price: try_get_amount(row, "price")?,
            sale_price: try_get_optional_amount(row, "sale_price")?,
            weight: row.try_get::<Decimal, _>("weight")?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
            deleted_at: row
                .try_get::<Option<SqlxTimestamp>, _>("deleted_at")?
                .map(SqlxTimestamp::to_jiff),
        })
    }
}

struct CombinationRow(VariantCombination);

impl<'r> FromRow<'r, PgRow> for CombinationRow {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let selections: Json<SmallVec<[VariantSelection; 4]>> = row.try_get("selections")?;
        let prices: Json<Vec<VariantPrice>> = row.try_get("prices")?;
        let translations: Json<Vec<VariantTranslation>> = row.try_get("translations")?;

        Ok(Self(VariantCombination {
            selections: selections.0,
            sku: row.try_get("sku")?,
            barcode: row.try_get("barcode")?,
            prices: prices.0,
            stock: try_get_count(row, "stock")?,
            active: row.try_get("active")?,
            translations: translations.0,
        }))
    }
}
