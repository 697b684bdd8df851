//! Indicator records: one logical record spread across three physical tables.
//!
//! The logical entity is keyed by `(provider_id, economy_code, year)`. Its
//! sixteen metric fields are split into three disjoint groups (economic,
//! health, environment), each stored in its own table under the same
//! composite key. The logical record exists iff at least one physical row
//! exists; a group's fields read as NULL until that group's row is written.

use crate::db::schema::SqlArg;
use crate::types::ProviderId;
use serde::{Deserialize, Serialize};
use serde_with::rust::double_option;
use sqlx::FromRow;

/// Row of `economic_indicators`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct EconomicRow {
    pub provider_id: ProviderId,
    pub economy_code: String,
    pub year: i32,
    pub industry: Option<f64>,
    pub gdp_per_capita: Option<f64>,
    pub trade: Option<f64>,
    pub agriculture_forestry_and_fishing: Option<f64>,
}

/// Row of `health_indicators`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct HealthRow {
    pub provider_id: ProviderId,
    pub economy_code: String,
    pub year: i32,
    pub community_health_workers: Option<f64>,
    pub prevalence_of_undernourishment: Option<f64>,
    pub prevalence_of_severe_food_insecurity: Option<f64>,
    pub basic_handwashing_facilities: Option<f64>,
    pub safely_managed_drinking_water_services: Option<f64>,
    pub diabetes_prevalence: Option<f64>,
}

/// Row of `environment_indicators`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct EnvironmentRow {
    pub provider_id: ProviderId,
    pub economy_code: String,
    pub year: i32,
    pub energy_use: Option<f64>,
    pub access_to_electricity: Option<f64>,
    pub alternative_and_nuclear_energy: Option<f64>,
    pub permanent_cropland: Option<f64>,
    pub crop_production_index: Option<f64>,
    pub gdp_per_unit_of_energy_use: Option<f64>,
}

/// The merged logical record presented to readers. Also decodes directly
/// from the `FULL JOIN ... USING` listing query, whose coalesced column set
/// matches this shape exactly.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, FromRow)]
pub struct IndicatorRecord {
    #[serde(default)]
    pub provider_id: ProviderId,
    #[serde(default)]
    pub economy_code: String,
    #[serde(default)]
    pub year: i32,

    pub industry: Option<f64>,
    pub gdp_per_capita: Option<f64>,
    pub trade: Option<f64>,
    pub agriculture_forestry_and_fishing: Option<f64>,

    pub community_health_workers: Option<f64>,
    pub prevalence_of_undernourishment: Option<f64>,
    pub prevalence_of_severe_food_insecurity: Option<f64>,
    pub basic_handwashing_facilities: Option<f64>,
    pub safely_managed_drinking_water_services: Option<f64>,
    pub diabetes_prevalence: Option<f64>,

    pub energy_use: Option<f64>,
    pub access_to_electricity: Option<f64>,
    pub alternative_and_nuclear_energy: Option<f64>,
    pub permanent_cropland: Option<f64>,
    pub crop_production_index: Option<f64>,
    pub gdp_per_unit_of_energy_use: Option<f64>,
}

/// Partial indicator write. Any subset of the sixteen metric fields; unset
/// fields are left alone, explicit nulls clear. Group membership of each
/// field is resolved by [`crate::indicator_groups::partition`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IndicatorPatch {
    #[serde(default, skip_serializing_if = "Option::is_none", with = "double_option")]
    pub industry: Option<Option<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "double_option")]
    pub gdp_per_capita: Option<Option<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "double_option")]
    pub trade: Option<Option<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "double_option")]
    pub agriculture_forestry_and_fishing: Option<Option<f64>>,

    #[serde(default, skip_serializing_if = "Option::is_none", with = "double_option")]
    pub community_health_workers: Option<Option<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "double_option")]
    pub prevalence_of_undernourishment: Option<Option<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "double_option")]
    pub prevalence_of_severe_food_insecurity: Option<Option<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "double_option")]
    pub basic_handwashing_facilities: Option<Option<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "double_option")]
    pub safely_managed_drinking_water_services: Option<Option<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "double_option")]
    pub diabetes_prevalence: Option<Option<f64>>,

    #[serde(default, skip_serializing_if = "Option::is_none", with = "double_option")]
    pub energy_use: Option<Option<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "double_option")]
    pub access_to_electricity: Option<Option<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "double_option")]
    pub alternative_and_nuclear_energy: Option<Option<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "double_option")]
    pub permanent_cropland: Option<Option<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "double_option")]
    pub crop_production_index: Option<Option<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "double_option")]
    pub gdp_per_unit_of_energy_use: Option<Option<f64>>,
}

/// Create request for the generic insert surface: composite key plus any
/// subset of metric values. Absent metrics simply have no row contribution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndicatorCreate {
    pub provider_id: ProviderId,
    pub economy_code: String,
    pub year: i32,
    #[serde(flatten)]
    pub fields: IndicatorFields,
}

/// Flat set of the sixteen metric fields, all optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IndicatorFields {
    pub industry: Option<f64>,
    pub gdp_per_capita: Option<f64>,
    pub trade: Option<f64>,
    pub agriculture_forestry_and_fishing: Option<f64>,

    pub community_health_workers: Option<f64>,
    pub prevalence_of_undernourishment: Option<f64>,
    pub prevalence_of_severe_food_insecurity: Option<f64>,
    pub basic_handwashing_facilities: Option<f64>,
    pub safely_managed_drinking_water_services: Option<f64>,
    pub diabetes_prevalence: Option<f64>,

    pub energy_use: Option<f64>,
    pub access_to_electricity: Option<f64>,
    pub alternative_and_nuclear_energy: Option<f64>,
    pub permanent_cropland: Option<f64>,
    pub crop_production_index: Option<f64>,
    pub gdp_per_unit_of_energy_use: Option<f64>,
}

impl From<&IndicatorFields> for IndicatorPatch {
    /// Present values become explicit sets; absent values stay unset, so a
    /// create never writes columns the caller did not supply.
    fn from(fields: &IndicatorFields) -> Self {
        IndicatorPatch {
            industry: fields.industry.map(Some),
            gdp_per_capita: fields.gdp_per_capita.map(Some),
            trade: fields.trade.map(Some),
            agriculture_forestry_and_fishing: fields.agriculture_forestry_and_fishing.map(Some),
            community_health_workers: fields.community_health_workers.map(Some),
            prevalence_of_undernourishment: fields.prevalence_of_undernourishment.map(Some),
            prevalence_of_severe_food_insecurity: fields.prevalence_of_severe_food_insecurity.map(Some),
            basic_handwashing_facilities: fields.basic_handwashing_facilities.map(Some),
            safely_managed_drinking_water_services: fields.safely_managed_drinking_water_services.map(Some),
            diabetes_prevalence: fields.diabetes_prevalence.map(Some),
            energy_use: fields.energy_use.map(Some),
            access_to_electricity: fields.access_to_electricity.map(Some),
            alternative_and_nuclear_energy: fields.alternative_and_nuclear_energy.map(Some),
            permanent_cropland: fields.permanent_cropland.map(Some),
            crop_production_index: fields.crop_production_index.map(Some),
            gdp_per_unit_of_energy_use: fields.gdp_per_unit_of_energy_use.map(Some),
        }
    }
}

/// Key tuple of the logical record, in declared order.
pub fn indicator_key(provider_id: ProviderId, economy_code: &str, year: i32) -> Vec<SqlArg> {
    vec![SqlArg::from(provider_id), SqlArg::from(economy_code), SqlArg::from(year)]
}
