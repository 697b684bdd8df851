//! Provider records: organizations entitled to submit indicator data.

use crate::db::schema::{ColKind, InsertValues, KeyColumn, Patch, SqlArg, TableSpec};
use crate::types::{ProviderId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_with::rust::double_option;
use sqlx::FromRow;

/// One row of the `providers` table.
///
/// `immutable` providers are system-owned reference publishers: they can
/// never log in and never write data, regardless of what permissions exist
/// for them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Provider {
    pub id: ProviderId,
    pub administrative_account: UserId,
    pub technical_account: Option<UserId>,
    pub name: String,
    pub description: Option<String>,
    pub website_url: Option<String>,
    pub nologin: bool,
    pub immutable: bool,
    pub created_at: DateTime<Utc>,
}

impl TableSpec for Provider {
    const TABLE: &'static str = "providers";
    const KEY_COLUMNS: &'static [KeyColumn] = &[KeyColumn {
        name: "id",
        kind: ColKind::Int,
    }];
    const INSERT_COLUMNS: &'static [&'static str] = &[
        "administrative_account",
        "technical_account",
        "name",
        "description",
        "website_url",
        "nologin",
        "immutable",
    ];
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderCreate {
    pub administrative_account: UserId,
    pub technical_account: Option<UserId>,
    pub name: String,
    pub description: Option<String>,
    pub website_url: Option<String>,
    #[serde(default)]
    pub nologin: bool,
    #[serde(default)]
    pub immutable: bool,
}

impl InsertValues for ProviderCreate {
    fn values(&self) -> Vec<SqlArg> {
        vec![
            SqlArg::from(self.administrative_account),
            SqlArg::from(self.technical_account),
            SqlArg::from(self.name.clone()),
            SqlArg::from(self.description.clone()),
            SqlArg::from(self.website_url.clone()),
            SqlArg::from(self.nologin),
            SqlArg::from(self.immutable),
        ]
    }
}

/// Partial provider update. The `immutable` flag is set at creation and
/// never updated through this path.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProviderUpdate {
    pub administrative_account: Option<UserId>,
    /// None = no change, Some(None) = clear, Some(id) = set
    #[serde(default, skip_serializing_if = "Option::is_none", with = "double_option")]
    pub technical_account: Option<Option<UserId>>,
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "double_option")]
    pub description: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "double_option")]
    pub website_url: Option<Option<String>>,
    pub nologin: Option<bool>,
}

impl Patch for ProviderUpdate {
    fn set_fields(&self) -> Vec<(&'static str, SqlArg)> {
        let mut fields = Vec::new();
        if let Some(administrative_account) = self.administrative_account {
            fields.push(("administrative_account", SqlArg::from(administrative_account)));
        }
        if let Some(technical_account) = self.technical_account {
            fields.push(("technical_account", SqlArg::from(technical_account)));
        }
        if let Some(name) = &self.name {
            fields.push(("name", SqlArg::from(name.clone())));
        }
        if let Some(description) = &self.description {
            fields.push(("description", SqlArg::from(description.clone())));
        }
        if let Some(website_url) = &self.website_url {
            fields.push(("website_url", SqlArg::from(website_url.clone())));
        }
        if let Some(nologin) = self.nologin {
            fields.push(("nologin", SqlArg::from(nologin)));
        }
        fields
    }
}
