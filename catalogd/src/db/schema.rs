//! Declarative table descriptors and SQL synthesis.
//!
//! Each entity declares its storage shape once via [`TableSpec`]: table name,
//! ordered key columns, and insertable columns. [`TableSql`] turns that
//! declaration into the concrete statements (keyed select, list, insert with
//! `RETURNING` of the keys, keyed delete, truncate) a single time at
//! repository construction, so no SQL is re-derived per call and no entity
//! needs hand-written statements.
//!
//! Dynamic values travel as [`SqlArg`], a typed nullable scalar. Nulls stay
//! typed (`Int(None)` vs `Text(None)`) because Postgres infers parameter
//! types from the bound value.

use crate::db::errors::{DbError, Result};
use crate::types::Region;
use sqlx::Row;
use sqlx::postgres::{PgArguments, PgRow};
use sqlx::query::{Query, QueryAs};
use std::fmt::Write as _;

/// Scalar kind of a key column, used to decode `RETURNING` rows back into
/// [`SqlArg`] tuples.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColKind {
    Bool,
    Int,
    BigInt,
    Float,
    Text,
}

/// One declared key column.
#[derive(Debug, Clone, Copy)]
pub struct KeyColumn {
    pub name: &'static str,
    pub kind: ColKind,
}

/// Per-entity storage declaration. Implemented by entity row types; the
/// generic repository derives every statement from these constants.
pub trait TableSpec {
    const TABLE: &'static str;
    /// Ordered key columns; keyed operations take their values in exactly
    /// this order.
    const KEY_COLUMNS: &'static [KeyColumn];
    /// Columns accepted by insert, in the order [`InsertValues::values`]
    /// produces them. Auto-generated columns (serial ids, defaulted
    /// timestamps) are excluded.
    const INSERT_COLUMNS: &'static [&'static str];
}

/// Values for the declared insert columns, in declaration order.
pub trait InsertValues {
    fn values(&self) -> Vec<SqlArg>;
}

/// A partial update. Only fields explicitly set by the caller are returned;
/// an explicitly cleared field comes back as a typed null. Fields absent from
/// the returned list are left unchanged by the update.
pub trait Patch {
    fn set_fields(&self) -> Vec<(&'static str, SqlArg)>;
}

/// A typed, nullable scalar bound into synthesized SQL.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlArg {
    Bool(Option<bool>),
    Int(Option<i32>),
    BigInt(Option<i64>),
    Float(Option<f64>),
    Text(Option<String>),
}

impl SqlArg {
    pub fn is_null(&self) -> bool {
        match self {
            SqlArg::Bool(v) => v.is_none(),
            SqlArg::Int(v) => v.is_none(),
            SqlArg::BigInt(v) => v.is_none(),
            SqlArg::Float(v) => v.is_none(),
            SqlArg::Text(v) => v.is_none(),
        }
    }
}

impl From<bool> for SqlArg {
    fn from(v: bool) -> Self {
        SqlArg::Bool(Some(v))
    }
}

impl From<i32> for SqlArg {
    fn from(v: i32) -> Self {
        SqlArg::Int(Some(v))
    }
}

impl From<i64> for SqlArg {
    fn from(v: i64) -> Self {
        SqlArg::BigInt(Some(v))
    }
}

impl From<f64> for SqlArg {
    fn from(v: f64) -> Self {
        SqlArg::Float(Some(v))
    }
}

impl From<&str> for SqlArg {
    fn from(v: &str) -> Self {
        SqlArg::Text(Some(v.to_string()))
    }
}

impl From<String> for SqlArg {
    fn from(v: String) -> Self {
        SqlArg::Text(Some(v))
    }
}

impl From<Region> for SqlArg {
    fn from(v: Region) -> Self {
        SqlArg::Text(Some(v.code().to_string()))
    }
}

impl From<Option<bool>> for SqlArg {
    fn from(v: Option<bool>) -> Self {
        SqlArg::Bool(v)
    }
}

impl From<Option<i32>> for SqlArg {
    fn from(v: Option<i32>) -> Self {
        SqlArg::Int(v)
    }
}

impl From<Option<i64>> for SqlArg {
    fn from(v: Option<i64>) -> Self {
        SqlArg::BigInt(v)
    }
}

impl From<Option<f64>> for SqlArg {
    fn from(v: Option<f64>) -> Self {
        SqlArg::Float(v)
    }
}

impl From<Option<String>> for SqlArg {
    fn from(v: Option<String>) -> Self {
        SqlArg::Text(v)
    }
}

impl From<Option<Region>> for SqlArg {
    fn from(v: Option<Region>) -> Self {
        SqlArg::Text(v.map(|r| r.code().to_string()))
    }
}

/// The key values of one row, in key-column order.
pub type KeyTuple = Vec<SqlArg>;

/// Bind an argument onto a plain query. Nulls are bound as typed `None` so
/// Postgres can still infer the parameter type.
pub(crate) fn bind_query<'q>(q: Query<'q, sqlx::Postgres, PgArguments>, arg: &SqlArg) -> Query<'q, sqlx::Postgres, PgArguments> {
    match arg {
        SqlArg::Bool(v) => q.bind(*v),
        SqlArg::Int(v) => q.bind(*v),
        SqlArg::BigInt(v) => q.bind(*v),
        SqlArg::Float(v) => q.bind(*v),
        SqlArg::Text(v) => q.bind(v.clone()),
    }
}

/// Bind an argument onto a `query_as` query.
pub(crate) fn bind_query_as<'q, T>(
    q: QueryAs<'q, sqlx::Postgres, T, PgArguments>,
    arg: &SqlArg,
) -> QueryAs<'q, sqlx::Postgres, T, PgArguments> {
    match arg {
        SqlArg::Bool(v) => q.bind(*v),
        SqlArg::Int(v) => q.bind(*v),
        SqlArg::BigInt(v) => q.bind(*v),
        SqlArg::Float(v) => q.bind(*v),
        SqlArg::Text(v) => q.bind(v.clone()),
    }
}

/// Decode the declared key columns out of a `RETURNING` row.
pub(crate) fn decode_keys(row: &PgRow, keys: &[KeyColumn]) -> Result<KeyTuple> {
    let mut tuple = Vec::with_capacity(keys.len());
    for key in keys {
        let arg = match key.kind {
            ColKind::Bool => SqlArg::Bool(row.try_get(key.name)?),
            ColKind::Int => SqlArg::Int(row.try_get(key.name)?),
            ColKind::BigInt => SqlArg::BigInt(row.try_get(key.name)?),
            ColKind::Float => SqlArg::Float(row.try_get(key.name)?),
            ColKind::Text => SqlArg::Text(row.try_get(key.name)?),
        };
        tuple.push(arg);
    }
    Ok(tuple)
}

/// Pagination window for list operations.
#[derive(Debug, Clone, Copy)]
pub struct Page {
    pub limit: i64,
    pub offset: i64,
}

impl Page {
    pub fn new(limit: i64, offset: i64) -> Self {
        Self { limit, offset }
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.limit < 0 || self.offset < 0 {
            return Err(DbError::invalid_argument(format!(
                "limit and offset must be non-negative, got limit={} offset={}",
                self.limit, self.offset
            )));
        }
        Ok(())
    }
}

/// `WHERE k1 = $n AND k2 = $n+1 ...` over the declared key columns, starting
/// at placeholder `first`.
pub(crate) fn key_where_clause(keys: &[KeyColumn], first: usize) -> String {
    let mut clause = String::new();
    for (i, key) in keys.iter().enumerate() {
        if i > 0 {
            clause.push_str(" AND ");
        }
        let _ = write!(clause, "{} = ${}", key.name, first + i);
    }
    clause
}

/// Statements synthesized once per table from its [`TableSpec`].
#[derive(Debug, Clone)]
pub struct TableSql {
    pub table: &'static str,
    pub keys: &'static [KeyColumn],
    pub select_by_keys: String,
    pub list: String,
    pub insert: String,
    pub delete_by_keys: String,
    pub truncate: String,
}

impl TableSql {
    pub fn new<E: TableSpec>() -> Self {
        let key_names = E::KEY_COLUMNS.iter().map(|k| k.name).collect::<Vec<_>>().join(", ");
        let where_keys = key_where_clause(E::KEY_COLUMNS, 1);

        let placeholders = (1..=E::INSERT_COLUMNS.len()).map(|i| format!("${i}")).collect::<Vec<_>>().join(", ");

        Self {
            table: E::TABLE,
            keys: E::KEY_COLUMNS,
            select_by_keys: format!("SELECT * FROM {} WHERE {}", E::TABLE, where_keys),
            list: format!("SELECT * FROM {} LIMIT $1 OFFSET $2", E::TABLE),
            insert: format!(
                "INSERT INTO {} ({}) VALUES ({}) RETURNING {}",
                E::TABLE,
                E::INSERT_COLUMNS.join(", "),
                placeholders,
                key_names
            ),
            delete_by_keys: format!("DELETE FROM {} WHERE {} RETURNING {}", E::TABLE, where_keys, key_names),
            truncate: format!("TRUNCATE TABLE {} RESTART IDENTITY CASCADE", E::TABLE),
        }
    }

    /// Synthesize the update statement for one patch. The SET clause binds
    /// first, the key columns after it, so the text depends on which fields
    /// the patch carries.
    pub fn update_statement(&self, set_columns: &[&'static str]) -> String {
        let set_clause = set_columns
            .iter()
            .enumerate()
            .map(|(i, col)| format!("{} = ${}", col, i + 1))
            .collect::<Vec<_>>()
            .join(", ");
        let key_names = self.keys.iter().map(|k| k.name).collect::<Vec<_>>().join(", ");
        format!(
            "UPDATE {} SET {} WHERE {} RETURNING {}",
            self.table,
            set_clause,
            key_where_clause(self.keys, set_columns.len() + 1),
            key_names
        )
    }
}
