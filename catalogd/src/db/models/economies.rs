//! Economy records: countries and aggregate groupings tracked in the catalog.

use crate::db::schema::{ColKind, InsertValues, KeyColumn, Patch, SqlArg, TableSpec};
use crate::types::Region;
use serde::{Deserialize, Serialize};
use serde_with::rust::double_option;
use sqlx::FromRow;

/// One row of the `economies` table, keyed by the 3-letter economy code.
///
/// Aggregates (regional groupings such as "South Asia") share the table with
/// real countries; they carry `is_aggregate = true` and no region, capital,
/// or coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Economy {
    pub code: String,
    pub name: String,
    pub region: Option<Region>,
    pub income_level: Option<String>,
    pub is_aggregate: bool,
    pub capital_city: Option<String>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

impl TableSpec for Economy {
    const TABLE: &'static str = "economies";
    const KEY_COLUMNS: &'static [KeyColumn] = &[KeyColumn {
        name: "code",
        kind: ColKind::Text,
    }];
    const INSERT_COLUMNS: &'static [&'static str] = &[
        "code",
        "name",
        "region",
        "income_level",
        "is_aggregate",
        "capital_city",
        "lat",
        "lng",
    ];
}

/// The data required to create an economy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EconomyCreate {
    pub code: String,
    pub name: String,
    pub region: Option<Region>,
    pub income_level: Option<String>,
    pub is_aggregate: bool,
    pub capital_city: Option<String>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

impl InsertValues for EconomyCreate {
    fn values(&self) -> Vec<SqlArg> {
        vec![
            SqlArg::from(self.code.clone()),
            SqlArg::from(self.name.clone()),
            SqlArg::from(self.region),
            SqlArg::from(self.income_level.clone()),
            SqlArg::from(self.is_aggregate),
            SqlArg::from(self.capital_city.clone()),
            SqlArg::from(self.lat),
            SqlArg::from(self.lng),
        ]
    }
}

/// Partial economy update. The code is the key and cannot change.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EconomyUpdate {
    pub name: Option<String>,
    /// None = no change, Some(None) = clear, Some(region) = set
    #[serde(default, skip_serializing_if = "Option::is_none", with = "double_option")]
    pub region: Option<Option<Region>>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "double_option")]
    pub income_level: Option<Option<String>>,
    pub is_aggregate: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "double_option")]
    pub capital_city: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "double_option")]
    pub lat: Option<Option<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "double_option")]
    pub lng: Option<Option<f64>>,
}

impl Patch for EconomyUpdate {
    fn set_fields(&self) -> Vec<(&'static str, SqlArg)> {
        let mut fields = Vec::new();
        if let Some(name) = &self.name {
            fields.push(("name", SqlArg::from(name.clone())));
        }
        if let Some(region) = &self.region {
            fields.push(("region", SqlArg::from(*region)));
        }
        if let Some(income_level) = &self.income_level {
            fields.push(("income_level", SqlArg::from(income_level.clone())));
        }
        if let Some(is_aggregate) = self.is_aggregate {
            fields.push(("is_aggregate", SqlArg::from(is_aggregate)));
        }
        if let Some(capital_city) = &self.capital_city {
            fields.push(("capital_city", SqlArg::from(capital_city.clone())));
        }
        if let Some(lat) = self.lat {
            fields.push(("lat", SqlArg::from(lat)));
        }
        if let Some(lng) = self.lng {
            fields.push(("lng", SqlArg::from(lng)));
        }
        fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_update_sets_no_fields() {
        assert!(EconomyUpdate::default().set_fields().is_empty());
    }

    #[test]
    fn unset_and_null_are_distinguished() {
        let update = EconomyUpdate {
            name: Some("India".to_string()),
            region: Some(None),
            ..Default::default()
        };
        let fields = update.set_fields();
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[0], ("name", SqlArg::Text(Some("India".to_string()))));
        // explicit null clears the column
        assert_eq!(fields[1], ("region", SqlArg::Text(None)));
    }

    #[test]
    fn double_option_deserializes_null_as_clear() {
        let update: EconomyUpdate = serde_json::from_str(r#"{"capital_city": null}"#).unwrap();
        assert_eq!(update.capital_city, Some(None));
        assert_eq!(update.region, None);

        let update: EconomyUpdate = serde_json::from_str(r#"{"region": "SAS"}"#).unwrap();
        assert_eq!(update.region, Some(Some(crate::types::Region::SouthAsia)));
    }
}
