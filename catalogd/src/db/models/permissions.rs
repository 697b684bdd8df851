//! Permission records: time-bounded, scope-limited write grants.

use crate::db::errors::{DbError, Result};
use crate::db::schema::{ColKind, InsertValues, KeyColumn, Patch, SqlArg, TableSpec};
use crate::types::{PermissionId, ProviderId, Region};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_with::rust::double_option;
use sqlx::FromRow;

/// One row of the `permissions` table.
///
/// Exactly one of `economy_code` / `region` is set (XOR invariant): a grant
/// covers either a single economy or every economy in a region, for the
/// inclusive year range `[year_start, year_end]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Permission {
    pub id: PermissionId,
    pub provider_id: ProviderId,
    pub economy_code: Option<String>,
    pub region: Option<Region>,
    pub year_start: i32,
    pub year_end: i32,
    pub footnote: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Permission {
    /// Whether this grant covers the given economy/year cell. The economy's
    /// own region must be supplied because region-scoped grants match
    /// through it.
    pub fn covers(&self, economy_code: &str, economy_region: Option<Region>, year: i32) -> bool {
        if year < self.year_start || year > self.year_end {
            return false;
        }
        match (&self.economy_code, self.region) {
            (Some(code), None) => code == economy_code,
            (None, Some(region)) => economy_region == Some(region),
            // never stored thanks to the XOR constraint
            _ => false,
        }
    }
}

impl TableSpec for Permission {
    const TABLE: &'static str = "permissions";
    const KEY_COLUMNS: &'static [KeyColumn] = &[KeyColumn {
        name: "id",
        kind: ColKind::Int,
    }];
    const INSERT_COLUMNS: &'static [&'static str] =
        &["provider_id", "economy_code", "region", "year_start", "year_end", "footnote"];
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PermissionCreate {
    pub provider_id: ProviderId,
    pub economy_code: Option<String>,
    pub region: Option<Region>,
    pub year_start: i32,
    pub year_end: i32,
    pub footnote: Option<String>,
}

impl PermissionCreate {
    /// Reject malformed scope before anything reaches the database: exactly
    /// one of economy/region must be set, and the year range must not be
    /// inverted.
    pub fn validate(&self) -> Result<()> {
        if self.economy_code.is_some() == self.region.is_some() {
            return Err(DbError::invalid_argument(
                "permission must specify either 'economy_code' or 'region', but not both",
            ));
        }
        if self.year_end < self.year_start {
            return Err(DbError::invalid_argument(format!(
                "year_end ({}) must not precede year_start ({})",
                self.year_end, self.year_start
            )));
        }
        Ok(())
    }
}

impl InsertValues for PermissionCreate {
    fn values(&self) -> Vec<SqlArg> {
        vec![
            SqlArg::from(self.provider_id),
            SqlArg::from(self.economy_code.clone()),
            SqlArg::from(self.region),
            SqlArg::from(self.year_start),
            SqlArg::from(self.year_end),
            SqlArg::from(self.footnote.clone()),
        ]
    }
}

/// Partial permission update. Scope fields are deliberately absent: a grant's
/// scope is fixed for its lifetime, only the year range and footnote move.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PermissionUpdate {
    pub year_start: Option<i32>,
    pub year_end: Option<i32>,
    /// None = no change, Some(None) = clear, Some(text) = set
    #[serde(default, skip_serializing_if = "Option::is_none", with = "double_option")]
    pub footnote: Option<Option<String>>,
}

impl Patch for PermissionUpdate {
    fn set_fields(&self) -> Vec<(&'static str, SqlArg)> {
        let mut fields = Vec::new();
        if let Some(year_start) = self.year_start {
            fields.push(("year_start", SqlArg::from(year_start)));
        }
        if let Some(year_end) = self.year_end {
            fields.push(("year_end", SqlArg::from(year_end)));
        }
        if let Some(footnote) = &self.footnote {
            fields.push(("footnote", SqlArg::from(footnote.clone())));
        }
        fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_create() -> PermissionCreate {
        PermissionCreate {
            provider_id: 1,
            economy_code: Some("IND".to_string()),
            region: None,
            year_start: 2015,
            year_end: 2020,
            footnote: None,
        }
    }

    #[test]
    fn economy_scope_alone_is_valid() {
        assert!(base_create().validate().is_ok());
    }

    #[test]
    fn region_scope_alone_is_valid() {
        let create = PermissionCreate {
            economy_code: None,
            region: Some(Region::SouthAsia),
            ..base_create()
        };
        assert!(create.validate().is_ok());
    }

    #[test]
    fn both_scopes_are_rejected() {
        let create = PermissionCreate {
            region: Some(Region::SouthAsia),
            ..base_create()
        };
        assert!(matches!(create.validate(), Err(DbError::InvalidArgument { .. })));
    }

    #[test]
    fn neither_scope_is_rejected() {
        let create = PermissionCreate {
            economy_code: None,
            ..base_create()
        };
        assert!(matches!(create.validate(), Err(DbError::InvalidArgument { .. })));
    }

    #[test]
    fn inverted_year_range_is_rejected() {
        let create = PermissionCreate {
            year_start: 2021,
            year_end: 2020,
            ..base_create()
        };
        assert!(matches!(create.validate(), Err(DbError::InvalidArgument { .. })));
    }

    #[test]
    fn covers_checks_scope_and_year_range() {
        let grant = Permission {
            id: 1,
            provider_id: 1,
            economy_code: None,
            region: Some(Region::SouthAsia),
            year_start: 2015,
            year_end: 2020,
            footnote: None,
            created_at: Utc::now(),
        };
        assert!(grant.covers("IND", Some(Region::SouthAsia), 2018));
        assert!(!grant.covers("IND", Some(Region::SouthAsia), 2021));
        assert!(!grant.covers("USA", Some(Region::NorthAmerica), 2018));
        // aggregates have no region and can never match a region grant
        assert!(!grant.covers("SAS", None, 2018));
    }
}
