//! Static field partitioning for the three-tables-as-one-entity scheme.
//!
//! The sixteen indicator fields are split into three fixed, disjoint groups;
//! each group lives in its own physical table under the shared composite key.
//! [`partition`] splits a partial write by group and [`merge`] reassembles a
//! logical record from the per-table rows. Both are pure so the split/merge
//! rules are testable without a database.

use crate::db::models::indicators::{EconomicRow, EnvironmentRow, HealthRow, IndicatorPatch, IndicatorRecord};
use crate::types::ProviderId;
use std::fmt;

pub const ECONOMIC_COLUMNS: &[&str] = &["industry", "gdp_per_capita", "trade", "agriculture_forestry_and_fishing"];

pub const HEALTH_COLUMNS: &[&str] = &[
    "community_health_workers",
    "prevalence_of_undernourishment",
    "prevalence_of_severe_food_insecurity",
    "basic_handwashing_facilities",
    "safely_managed_drinking_water_services",
    "diabetes_prevalence",
];

pub const ENVIRONMENT_COLUMNS: &[&str] = &[
    "energy_use",
    "access_to_electricity",
    "alternative_and_nuclear_energy",
    "permanent_cropland",
    "crop_production_index",
    "gdp_per_unit_of_energy_use",
];

/// One of the three physical partitions of the logical indicator record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldGroup {
    Economic,
    Health,
    Environment,
}

impl FieldGroup {
    pub const ALL: [FieldGroup; 3] = [FieldGroup::Economic, FieldGroup::Health, FieldGroup::Environment];

    pub fn table(&self) -> &'static str {
        match self {
            FieldGroup::Economic => "economic_indicators",
            FieldGroup::Health => "health_indicators",
            FieldGroup::Environment => "environment_indicators",
        }
    }

    pub fn columns(&self) -> &'static [&'static str] {
        match self {
            FieldGroup::Economic => ECONOMIC_COLUMNS,
            FieldGroup::Health => HEALTH_COLUMNS,
            FieldGroup::Environment => ENVIRONMENT_COLUMNS,
        }
    }
}

impl fmt::Display for FieldGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.table())
    }
}

/// The slice of a partial write that lands in one group's table: only the
/// fields the caller explicitly supplied, with explicit nulls preserved.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupPatch {
    pub group: FieldGroup,
    pub fields: Vec<(&'static str, Option<f64>)>,
}

impl GroupPatch {
    /// A group row is only worth creating when at least one supplied value
    /// is non-null.
    pub fn has_value(&self) -> bool {
        self.fields.iter().any(|(_, v)| v.is_some())
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Split a partial write into its three group slices. Every group is always
/// present in the output; untouched groups come back with no fields.
pub fn partition(patch: &IndicatorPatch) -> [GroupPatch; 3] {
    let mut economic = Vec::new();
    let mut health = Vec::new();
    let mut environment = Vec::new();

    let mut push = |bucket: &mut Vec<(&'static str, Option<f64>)>, name: &'static str, field: &Option<Option<f64>>| {
        if let Some(value) = field {
            bucket.push((name, *value));
        }
    };

    push(&mut economic, "industry", &patch.industry);
    push(&mut economic, "gdp_per_capita", &patch.gdp_per_capita);
    push(&mut economic, "trade", &patch.trade);
    push(
        &mut economic,
        "agriculture_forestry_and_fishing",
        &patch.agriculture_forestry_and_fishing,
    );

    push(&mut health, "community_health_workers", &patch.community_health_workers);
    push(&mut health, "prevalence_of_undernourishment", &patch.prevalence_of_undernourishment);
    push(
        &mut health,
        "prevalence_of_severe_food_insecurity",
        &patch.prevalence_of_severe_food_insecurity,
    );
    push(&mut health, "basic_handwashing_facilities", &patch.basic_handwashing_facilities);
    push(
        &mut health,
        "safely_managed_drinking_water_services",
        &patch.safely_managed_drinking_water_services,
    );
    push(&mut health, "diabetes_prevalence", &patch.diabetes_prevalence);

    push(&mut environment, "energy_use", &patch.energy_use);
    push(&mut environment, "access_to_electricity", &patch.access_to_electricity);
    push(&mut environment, "alternative_and_nuclear_energy", &patch.alternative_and_nuclear_energy);
    push(&mut environment, "permanent_cropland", &patch.permanent_cropland);
    push(&mut environment, "crop_production_index", &patch.crop_production_index);
    push(&mut environment, "gdp_per_unit_of_energy_use", &patch.gdp_per_unit_of_energy_use);

    [
        GroupPatch {
            group: FieldGroup::Economic,
            fields: economic,
        },
        GroupPatch {
            group: FieldGroup::Health,
            fields: health,
        },
        GroupPatch {
            group: FieldGroup::Environment,
            fields: environment,
        },
    ]
}

/// Reassemble the logical record from whichever group rows exist. Returns
/// `None` iff all three rows are absent; key fields are taken once (they are
/// identical across present rows by construction).
pub fn merge(
    provider_id: ProviderId,
    economy_code: &str,
    year: i32,
    economic: Option<EconomicRow>,
    health: Option<HealthRow>,
    environment: Option<EnvironmentRow>,
) -> Option<IndicatorRecord> {
    if economic.is_none() && health.is_none() && environment.is_none() {
        return None;
    }

    let mut record = IndicatorRecord {
        provider_id,
        economy_code: economy_code.to_string(),
        year,
        ..Default::default()
    };

    if let Some(row) = economic {
        record.industry = row.industry;
        record.gdp_per_capita = row.gdp_per_capita;
        record.trade = row.trade;
        record.agriculture_forestry_and_fishing = row.agriculture_forestry_and_fishing;
    }
    if let Some(row) = health {
        record.community_health_workers = row.community_health_workers;
        record.prevalence_of_undernourishment = row.prevalence_of_undernourishment;
        record.prevalence_of_severe_food_insecurity = row.prevalence_of_severe_food_insecurity;
        record.basic_handwashing_facilities = row.basic_handwashing_facilities;
        record.safely_managed_drinking_water_services = row.safely_managed_drinking_water_services;
        record.diabetes_prevalence = row.diabetes_prevalence;
    }
    if let Some(row) = environment {
        record.energy_use = row.energy_use;
        record.access_to_electricity = row.access_to_electricity;
        record.alternative_and_nuclear_energy = row.alternative_and_nuclear_energy;
        record.permanent_cropland = row.permanent_cropland;
        record.crop_production_index = row.crop_production_index;
        record.gdp_per_unit_of_energy_use = row.gdp_per_unit_of_energy_use;
    }

    Some(record)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn groups_are_disjoint_and_cover_all_sixteen_fields() {
        let mut all: Vec<&str> = Vec::new();
        for group in FieldGroup::ALL {
            all.extend(group.columns());
        }
        assert_eq!(all.len(), 16);
        let mut deduped = all.clone();
        deduped.sort_unstable();
        deduped.dedup();
        assert_eq!(deduped.len(), 16);
    }

    #[test]
    fn partition_routes_fields_to_their_group() {
        let patch = IndicatorPatch {
            gdp_per_capita: Some(Some(65000.0)),
            diabetes_prevalence: Some(None),
            energy_use: Some(Some(300.0)),
            ..Default::default()
        };
        let [economic, health, environment] = partition(&patch);

        assert_eq!(economic.fields, vec![("gdp_per_capita", Some(65000.0))]);
        assert_eq!(health.fields, vec![("diabetes_prevalence", None)]);
        assert_eq!(environment.fields, vec![("energy_use", Some(300.0))]);

        assert!(economic.has_value());
        // an explicit null alone does not justify creating a row
        assert!(!health.has_value());
        assert!(environment.has_value());
    }

    #[test]
    fn partition_of_empty_patch_is_empty() {
        let [economic, health, environment] = partition(&IndicatorPatch::default());
        assert!(economic.is_empty());
        assert!(health.is_empty());
        assert!(environment.is_empty());
    }

    #[test]
    fn merge_of_nothing_is_none() {
        assert_eq!(merge(1, "USA", 2020, None, None, None), None);
    }

    #[test]
    fn merge_fills_only_present_groups() {
        let economic = EconomicRow {
            provider_id: 1,
            economy_code: "USA".to_string(),
            year: 2020,
            industry: None,
            gdp_per_capita: Some(65000.0),
            trade: None,
            agriculture_forestry_and_fishing: None,
        };
        let record = merge(1, "USA", 2020, Some(economic), None, None).unwrap();
        assert_eq!(record.gdp_per_capita, Some(65000.0));
        assert_eq!(record.energy_use, None);
        assert_eq!(record.community_health_workers, None);
        assert_eq!(record.economy_code, "USA");
    }
}
