//! Discounts Repository

use jiff_sqlx::Timestamp as SqlxTimestamp;
use pazar::discounts::{Discount, DiscountCommon, DiscountPayload};
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as, types::Json};

use crate::domain::discounts::records::{DiscountRecord, DiscountUuid};

const CREATE_DISCOUNT_SQL: &str = include_str!("sql/create_discount.sql");
const GET_DISCOUNT_SQL: &str = include_str!("sql/get_discount.sql");
const UPDATE_DISCOUNT_SQL: &str = include_str!("sql/update_discount.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgDiscountsRepository;

impl PgDiscountsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn create_discount(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        uuid: DiscountUuid,
        discount: &Discount,
    ) -> Result<DiscountRecord, sqlx::Error> {
        query_as::<Postgres, DiscountRecord>(CREATE_DISCOUNT_SQL)
            .bind(uuid.into_uuid())
            .bind(&discount.common.title)
            .bind(discount.discount_type().as_str())
            .bind(Json(&discount.common))
            .bind(Json(&discount.payload))
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn get_discount(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        uuid: DiscountUuid,
    ) -> Result<DiscountRecord, sqlx::Error> {
        query_as::<Postgres, DiscountRecord>(GET_DISCOUNT_SQL)
            .bind(uuid.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    /// Persist a reshaped discount over the existing row.
    pub(crate) async fn update_discount(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        uuid: DiscountUuid,
        discount: &Discount,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(UPDATE_DISCOUNT_SQL)
            .bind(uuid.into_uuid())
            .bind(&discount.common.title)
            .bind(discount.discount_type().as_str())
            .bind(Json(&discount.common))
            .bind(Json(&discount.payload))
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }
}

impl<'r> FromRow<'r, PgRow> for DiscountRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let common: Json<DiscountCommon> = row.try_get("common")?;
        let payload: Json<DiscountPayload> = row.try_get("payload")?;

        Ok(Self {
            uuid: DiscountUuid::from_uuid(row.try_get("uuid")?),
            discount: Discount {
                common: common.0,
                payload: payload.0,
            },
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
            deleted_at: row
                .try_get::<Option<SqlxTimestamp>, _>("deleted_at")?
                .map(SqlxTimestamp::to_jiff),
        })
    }
}
