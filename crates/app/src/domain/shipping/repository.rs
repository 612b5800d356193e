//! Shipping Repository

use jiff_sqlx::Timestamp as SqlxTimestamp;
use rust_decimal::Decimal;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as};
use uuid::Uuid;

use crate::domain::{
    rows::{to_db_amount, try_get_amount},
    shipping::{
        data::NewCargoZone,
        records::{
            CargoRuleRecord, CargoRuleUuid, CargoZoneRecord, CargoZoneUuid, LocationKind,
            ZoneLocationRecord, ZoneLocationUuid, condition_as_str, condition_from_str,
        },
    },
};

const LIST_ZONES_SQL: &str = include_str!("sql/list_zones.sql");
const GET_ZONE_SQL: &str = include_str!("sql/get_zone.sql");
const UPSERT_ZONE_SQL: &str = include_str!("sql/upsert_zone.sql");
const DELETE_ZONE_LOCATIONS_SQL: &str = include_str!("sql/delete_zone_locations.sql");
const DELETE_ZONE_RULES_SQL: &str = include_str!("sql/delete_zone_rules.sql");
const CREATE_ZONE_LOCATION_SQL: &str = include_str!("sql/create_zone_location.sql");
const CREATE_ZONE_RULE_SQL: &str = include_str!("sql/create_zone_rule.sql");
const GET_ZONE_LOCATIONS_SQL: &str = include_str!("sql/get_zone_locations.sql");
const GET_ZONE_RULES_SQL: &str = include_str!("sql/get_zone_rules.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgCargoZonesRepository;

impl PgCargoZonesRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn get_zones(
        &self,
        tx: &mut Transaction<'_, Postgres>,
    ) -> Result<Vec<CargoZoneRecord>, sqlx::Error> {
        let mut zones: Vec<CargoZoneRecord> = query_as(LIST_ZONES_SQL).fetch_all(&mut **tx).await?;

        for zone in &mut zones {
            zone.locations = self.get_zone_locations(tx, zone.uuid).await?;
            zone.rules = self.get_zone_rules(tx, zone.uuid).await?;
        }

        Ok(zones)
    }

    pub(crate) async fn get_zone(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        zone: CargoZoneUuid,
    ) -> Result<CargoZoneRecord, sqlx::Error> {
        let mut record: CargoZoneRecord = query_as(GET_ZONE_SQL)
            .bind(zone.into_uuid())
            .fetch_one(&mut **tx)
            .await?;

        record.locations = self.get_zone_locations(tx, record.uuid).await?;
        record.rules = self.get_zone_rules(tx, record.uuid).await?;

        Ok(record)
    }

    /// Replace a zone wholesale: upsert the zone row, delete every
    /// existing location and rule, insert the new set. The caller owns the
    /// transaction, so readers never observe the intermediate state.
    pub(crate) async fn replace_zone(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        zone: &NewCargoZone,
    ) -> Result<(), sqlx::Error> {
        query(UPSERT_ZONE_SQL)
            .bind(zone.uuid.into_uuid())
            .bind(&zone.name)
            .execute(&mut **tx)
            .await?;

        query(DELETE_ZONE_RULES_SQL)
            .bind(zone.uuid.into_uuid())
            .execute(&mut **tx)
            .await?;

        query(DELETE_ZONE_LOCATIONS_SQL)
            .bind(zone.uuid.into_uuid())
            .execute(&mut **tx)
            .await?;

        for location in &zone.locations {
            query(CREATE_ZONE_LOCATION_SQL)
                .bind(location.uuid.into_uuid())
                .bind(zone.uuid.into_uuid())
                .bind(location.country_uuid)
                .bind(location.kind.as_str())
                .bind(&location.state_uuids)
                .bind(&location.city_uuids)
                .execute(&mut **tx)
                .await?;
        }

        let mut position: i64 = 0;

        for rule in &zone.rules {
            let (min_value, max_value) = rule.normalized_bounds();

            query(CREATE_ZONE_RULE_SQL)
                .bind(rule.uuid.into_uuid())
                .bind(zone.uuid.into_uuid())
                .bind(&rule.name)
                .bind(&rule.currency)
                .bind(to_db_amount(rule.price, "price")?)
                .bind(condition_as_str(rule.condition))
                .bind(min_value)
                .bind(max_value)
                .bind(position)
                .execute(&mut **tx)
                .await?;

            position += 1;
        }

        Ok(())
    }

    async fn get_zone_locations(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        zone: CargoZoneUuid,
    ) -> Result<Vec<ZoneLocationRecord>, sqlx::Error> {
        query_as(GET_ZONE_LOCATIONS_SQL)
            .bind(zone.into_uuid())
            .fetch_all(&mut **tx)
            .await
    }

    async fn get_zone_rules(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        zone: CargoZoneUuid,
    ) -> Result<Vec<CargoRuleRecord>, sqlx::Error> {
        query_as(GET_ZONE_RULES_SQL)
            .bind(zone.into_uuid())
            .fetch_all(&mut **tx)
            .await
    }
}

impl<'r> FromRow<'r, PgRow> for CargoZoneRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: CargoZoneUuid::from_uuid(row.try_get("uuid")?),
            name: row.try_get("name")?,
            locations: Vec::new(),
            rules: Vec::new(),
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
            deleted_at: row
                .try_get::<Option<SqlxTimestamp>, _>("deleted_at")?
                .map(SqlxTimestamp::to_jiff),
        })
    }
}

impl<'r> FromRow<'r, PgRow> for ZoneLocationRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let kind: String = row.try_get("kind")?;

        let kind = LocationKind::from_str(&kind).ok_or_else(|| sqlx::Error::ColumnDecode {
            index: "kind".to_string(),
            source: format!("unknown location kind `{kind}`").into(),
        })?;

        Ok(Self {
            uuid: ZoneLocationUuid::from_uuid(row.try_get("uuid")?),
            country_uuid: row.try_get("country_uuid")?,
            kind,
            state_uuids: row.try_get::<Vec<Uuid>, _>("state_uuids")?,
            city_uuids: row.try_get::<Vec<Uuid>, _>("city_uuids")?,
        })
    }
}

impl<'r> FromRow<'r, PgRow> for CargoRuleRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let condition: String = row.try_get("condition")?;

        let condition =
            condition_from_str(&condition).ok_or_else(|| sqlx::Error::ColumnDecode {
                index: "condition".to_string(),
                source: format!("unknown rule condition `{condition}`").into(),
            })?;

        Ok(Self {
            uuid: CargoRuleUuid::from_uuid(row.try_get("uuid")?),
            name: row.try_get("name")?,
            currency: row.try_get("currency")?,
            price: try_get_amount(row, "price")?,
            condition,
            min_value: row.try_get::<Option<Decimal>, _>("min_value")?,
            max_value: row.try_get::<Option<Decimal>, _>("max_value")?,
        })
    }
}
