//! Database repository for the logical indicator entity.
//!
//! Presents the three physical tables (`economic_indicators`,
//! `health_indicators`, `environment_indicators`) as one composite-keyed
//! record. Reads fan out and merge; writes are partitioned by field group and
//! run inside a single transaction so the three tables can never disagree
//! about one key.

use crate::db::{
    errors::{DbError, Result},
    handlers::repository::{Repository, UpdateOutcome},
    models::indicators::{EconomicRow, EnvironmentRow, HealthRow, IndicatorCreate, IndicatorPatch, IndicatorRecord, indicator_key},
    schema::{KeyTuple, Page, SqlArg},
};
use crate::indicator_groups::{self, FieldGroup, GroupPatch};
use crate::types::ProviderId;
use sqlx::{Connection, PgConnection};
use std::fmt::Write as _;
use tracing::instrument;

/// Merged listing across the three tables. `USING` coalesces the key columns
/// of rows that exist in only some of the tables.
const LIST_SQL: &str = r#"
SELECT provider_id, economy_code, year,
       industry, gdp_per_capita, trade, agriculture_forestry_and_fishing,
       community_health_workers, prevalence_of_undernourishment,
       prevalence_of_severe_food_insecurity, basic_handwashing_facilities,
       safely_managed_drinking_water_services, diabetes_prevalence,
       energy_use, access_to_electricity, alternative_and_nuclear_energy,
       permanent_cropland, crop_production_index, gdp_per_unit_of_energy_use
FROM economic_indicators
FULL JOIN health_indicators USING (provider_id, economy_code, year)
FULL JOIN environment_indicators USING (provider_id, economy_code, year)
ORDER BY provider_id, economy_code, year
LIMIT $1 OFFSET $2
"#;

fn select_group_sql(group: FieldGroup) -> String {
    format!(
        "SELECT * FROM {} WHERE provider_id = $1 AND economy_code = $2 AND year = $3",
        group.table()
    )
}

/// `INSERT ... ON CONFLICT (key) DO UPDATE` over exactly the supplied columns
/// of one group. `xmax = 0` distinguishes a fresh insert from a conflict
/// update.
fn upsert_group_sql(group: &GroupPatch) -> String {
    let mut columns = String::from("provider_id, economy_code, year");
    let mut placeholders = String::from("$1, $2, $3");
    let mut set_clause = String::new();
    for (i, (column, _)) in group.fields.iter().enumerate() {
        let _ = write!(columns, ", {column}");
        let _ = write!(placeholders, ", ${}", i + 4);
        if i > 0 {
            set_clause.push_str(", ");
        }
        let _ = write!(set_clause, "{column} = EXCLUDED.{column}");
    }
    format!(
        "INSERT INTO {} ({}) VALUES ({}) \
         ON CONFLICT (provider_id, economy_code, year) DO UPDATE SET {} \
         RETURNING (xmax = 0) AS inserted",
        group.group.table(),
        columns,
        placeholders,
        set_clause
    )
}

fn update_group_sql(group: &GroupPatch) -> String {
    let set_clause = group
        .fields
        .iter()
        .enumerate()
        .map(|(i, (column, _))| format!("{} = ${}", column, i + 4))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "UPDATE {} SET {} WHERE provider_id = $1 AND economy_code = $2 AND year = $3 RETURNING provider_id",
        group.group.table(),
        set_clause
    )
}

fn parse_composite_keys(keys: &[SqlArg]) -> Result<(ProviderId, String, i32)> {
    match keys {
        [SqlArg::Int(Some(provider_id)), SqlArg::Text(Some(economy_code)), SqlArg::Int(Some(year))] => {
            Ok((*provider_id, economy_code.clone(), *year))
        }
        _ => Err(DbError::invalid_argument(
            "indicator records are keyed by (provider_id, economy_code, year)",
        )),
    }
}

pub struct Indicators<'c> {
    db: &'c mut PgConnection,
}

impl<'c> Indicators<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    /// Fan-out read across the three tables, merged into the logical record.
    /// `None` iff no group holds a row for the key.
    #[instrument(skip(self), err)]
    pub async fn get(&mut self, provider_id: ProviderId, economy_code: &str, year: i32) -> Result<Option<IndicatorRecord>> {
        let economic = sqlx::query_as::<_, EconomicRow>(&select_group_sql(FieldGroup::Economic))
            .bind(provider_id)
            .bind(economy_code)
            .bind(year)
            .fetch_optional(&mut *self.db)
            .await?;
        let health = sqlx::query_as::<_, HealthRow>(&select_group_sql(FieldGroup::Health))
            .bind(provider_id)
            .bind(economy_code)
            .bind(year)
            .fetch_optional(&mut *self.db)
            .await?;
        let environment = sqlx::query_as::<_, EnvironmentRow>(&select_group_sql(FieldGroup::Environment))
            .bind(provider_id)
            .bind(economy_code)
            .bind(year)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(indicator_groups::merge(provider_id, economy_code, year, economic, health, environment))
    }

    /// Insert-or-update the groups the patch touches, all inside one
    /// transaction. A group is touched when the patch supplies at least one
    /// non-null value for it. Returns the merged record and whether any
    /// touched group inserted a fresh row.
    ///
    /// A patch with no non-null value in any group is rejected before any
    /// statement runs; empty marker rows are never created.
    #[instrument(skip(self, patch), err)]
    pub async fn upsert(
        &mut self,
        provider_id: ProviderId,
        economy_code: &str,
        year: i32,
        patch: &IndicatorPatch,
    ) -> Result<(IndicatorRecord, bool)> {
        let groups = indicator_groups::partition(patch);
        if !groups.iter().any(GroupPatch::has_value) {
            return Err(DbError::invalid_argument("upsert supplied no indicator values"));
        }

        let mut created_any = false;
        let mut tx = self.db.begin().await?;
        for group in &groups {
            if !group.has_value() {
                continue;
            }
            let statement = upsert_group_sql(group);
            let mut query = sqlx::query_scalar::<_, bool>(&statement).bind(provider_id).bind(economy_code).bind(year);
            for (_, value) in &group.fields {
                query = query.bind(*value);
            }
            let inserted = query.fetch_one(&mut *tx).await?;
            created_any |= inserted;
        }
        tx.commit().await?;

        let record = self
            .get(provider_id, economy_code, year)
            .await?
            .ok_or_else(|| DbError::Other(anyhow::anyhow!("upsert committed but no group row is readable")))?;
        Ok((record, created_any))
    }

    /// Delete the key from all three tables in one transaction. `Some` iff at
    /// least one table held a row.
    #[instrument(skip(self), err)]
    pub async fn remove(&mut self, provider_id: ProviderId, economy_code: &str, year: i32) -> Result<Option<KeyTuple>> {
        let mut deleted_any = false;
        let mut tx = self.db.begin().await?;
        for group in FieldGroup::ALL {
            let statement = format!(
                "DELETE FROM {} WHERE provider_id = $1 AND economy_code = $2 AND year = $3",
                group.table()
            );
            let result = sqlx::query(&statement)
                .bind(provider_id)
                .bind(economy_code)
                .bind(year)
                .execute(&mut *tx)
                .await?;
            deleted_any |= result.rows_affected() > 0;
        }
        tx.commit().await?;

        Ok(deleted_any.then(|| indicator_key(provider_id, economy_code, year)))
    }
}

#[async_trait::async_trait]
impl<'c> Repository for Indicators<'c> {
    type Entity = IndicatorRecord;
    type Create = IndicatorCreate;
    type Update = IndicatorPatch;

    #[instrument(skip(self), err)]
    async fn get_by_keys(&mut self, keys: &[SqlArg]) -> Result<Option<IndicatorRecord>> {
        let (provider_id, economy_code, year) = parse_composite_keys(keys)?;
        self.get(provider_id, &economy_code, year).await
    }

    #[instrument(skip(self, page), fields(limit = page.limit, offset = page.offset), err)]
    async fn list(&mut self, page: &Page) -> Result<Vec<IndicatorRecord>> {
        page.validate()?;
        let records = sqlx::query_as::<_, IndicatorRecord>(LIST_SQL)
            .bind(page.limit)
            .bind(page.offset)
            .fetch_all(&mut *self.db)
            .await?;
        Ok(records)
    }

    /// Creation routes through the upsert so provided fields land in their
    /// group tables and nothing else is written.
    #[instrument(skip(self, create), fields(economy_code = %create.economy_code, year = create.year), err)]
    async fn insert(&mut self, create: &IndicatorCreate) -> Result<KeyTuple> {
        let patch = IndicatorPatch::from(&create.fields);
        self.upsert(create.provider_id, &create.economy_code, create.year, &patch).await?;
        Ok(indicator_key(create.provider_id, &create.economy_code, create.year))
    }

    /// Partitioned update: each group the patch touches is updated in its own
    /// table, all inside one transaction. Unlike upsert, an update never
    /// creates group rows, so a patch that only touches absent groups is
    /// `NotFound`.
    #[instrument(skip(self, update), err)]
    async fn update(&mut self, keys: &[SqlArg], update: &IndicatorPatch) -> Result<UpdateOutcome> {
        let (provider_id, economy_code, year) = parse_composite_keys(keys)?;
        let groups = indicator_groups::partition(update);
        if groups.iter().all(GroupPatch::is_empty) {
            return Ok(UpdateOutcome::NoOp);
        }

        let mut updated_any = false;
        let mut tx = self.db.begin().await?;
        for group in &groups {
            if group.is_empty() {
                continue;
            }
            let statement = update_group_sql(group);
            let mut query = sqlx::query(&statement).bind(provider_id).bind(economy_code.as_str()).bind(year);
            for (_, value) in &group.fields {
                query = query.bind(*value);
            }
            updated_any |= query.fetch_optional(&mut *tx).await?.is_some();
        }
        tx.commit().await?;

        if updated_any {
            Ok(UpdateOutcome::Updated(indicator_key(provider_id, &economy_code, year)))
        } else {
            Err(DbError::NotFound)
        }
    }

    #[instrument(skip(self), err)]
    async fn delete(&mut self, keys: &[SqlArg]) -> Result<KeyTuple> {
        let (provider_id, economy_code, year) = parse_composite_keys(keys)?;
        self.remove(provider_id, &economy_code, year).await?.ok_or(DbError::NotFound)
    }

    /// Truncates all three physical tables together so no group can outlive
    /// the logical entity.
    #[instrument(skip(self), err)]
    async fn truncate_cascade(&mut self) -> Result<()> {
        sqlx::query(
            "TRUNCATE TABLE economic_indicators, health_indicators, environment_indicators \
             RESTART IDENTITY CASCADE",
        )
        .execute(&mut *self.db)
        .await?;
        Ok(())
    }
}
