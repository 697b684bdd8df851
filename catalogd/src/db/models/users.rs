//! User account records.
//!
//! Users exist here only as the targets of provider account references; all
//! authentication happens outside this crate.

use crate::db::schema::{ColKind, InsertValues, KeyColumn, Patch, SqlArg, TableSpec};
use crate::types::UserId;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub password: String,
    pub name: String,
}

impl TableSpec for User {
    const TABLE: &'static str = "users";
    const KEY_COLUMNS: &'static [KeyColumn] = &[KeyColumn {
        name: "id",
        kind: ColKind::Int,
    }];
    const INSERT_COLUMNS: &'static [&'static str] = &["email", "password", "name"];
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserCreate {
    pub email: String,
    pub password: String,
    pub name: String,
}

impl InsertValues for UserCreate {
    fn values(&self) -> Vec<SqlArg> {
        vec![
            SqlArg::from(self.email.clone()),
            SqlArg::from(self.password.clone()),
            SqlArg::from(self.name.clone()),
        ]
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserUpdate {
    pub email: Option<String>,
    pub password: Option<String>,
    pub name: Option<String>,
}

impl Patch for UserUpdate {
    fn set_fields(&self) -> Vec<(&'static str, SqlArg)> {
        let mut fields = Vec::new();
        if let Some(email) = &self.email {
            fields.push(("email", SqlArg::from(email.clone())));
        }
        if let Some(password) = &self.password {
            fields.push(("password", SqlArg::from(password.clone())));
        }
        if let Some(name) = &self.name {
            fields.push(("name", SqlArg::from(name.clone())));
        }
        fields
    }
}
