//! Base repository trait and the schema-driven generic table.
//!
//! [`Repository`] is the only surface the handler layer calls: the five
//! key-based CRUD operations plus cascading truncate. [`GenericTable`] is the
//! one implementation of those operations; per-entity repositories wrap it
//! and add entity-specific queries (`resolve`, `upsert`) on top. No entity
//! writes its own CRUD SQL.

use crate::db::errors::{DbError, Result};
use crate::db::schema::{InsertValues, KeyTuple, Page, Patch, SqlArg, TableSpec, TableSql, bind_query, bind_query_as, decode_keys};
use sqlx::PgConnection;
use sqlx::postgres::PgRow;
use std::marker::PhantomData;

/// Result of a partial update.
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateOutcome {
    /// The row was updated; its key tuple is echoed back.
    Updated(KeyTuple),
    /// The patch carried no fields. Nothing was sent to the database; this
    /// is a signal, not an error.
    NoOp,
}

/// Base repository trait providing the common operations over one logical
/// entity.
///
/// Keyed operations take an ordered slice of scalar key values matching the
/// entity's declared key columns; a wrong arity fails fast with
/// [`DbError::InvalidArgument`] before any statement runs.
#[async_trait::async_trait]
pub trait Repository {
    /// The entity/row type returned by reads
    type Entity;

    /// The request type for creating entities
    type Create: Sync;

    /// The request type for partial updates
    type Update: Sync;

    /// Get an entity by its key tuple
    async fn get_by_keys(&mut self, keys: &[SqlArg]) -> Result<Option<Self::Entity>>;

    /// List entities with pagination (storage order)
    async fn list(&mut self, page: &Page) -> Result<Vec<Self::Entity>>;

    /// Create a new entity, returning its key tuple
    async fn insert(&mut self, create: &Self::Create) -> Result<KeyTuple>;

    /// Apply a partial update; only explicitly-set fields are written
    async fn update(&mut self, keys: &[SqlArg], update: &Self::Update) -> Result<UpdateOutcome>;

    /// Delete by key tuple, echoing the keys; `NotFound` when no row matched
    async fn delete(&mut self, keys: &[SqlArg]) -> Result<KeyTuple>;

    /// Clear the table, restarting identity sequences and cascading to
    /// dependents. Destructive and unprotected: the repository performs no
    /// confirmation gating, the surrounding CLI must.
    async fn truncate_cascade(&mut self) -> Result<()>;
}

/// Schema-driven table access: runs the statements [`TableSql`] synthesized
/// from the entity's [`TableSpec`] declaration.
pub struct GenericTable<'c, E> {
    db: &'c mut PgConnection,
    sql: TableSql,
    _entity: PhantomData<E>,
}

impl<'c, E> GenericTable<'c, E>
where
    E: TableSpec + for<'r> sqlx::FromRow<'r, PgRow> + Send + Unpin,
{
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self {
            db,
            sql: TableSql::new::<E>(),
            _entity: PhantomData,
        }
    }

    /// Access the underlying connection for entity-specific queries that go
    /// beyond the synthesized statements.
    pub fn connection(&mut self) -> &mut PgConnection {
        &mut *self.db
    }

    fn check_key_arity(&self, keys: &[SqlArg]) -> Result<()> {
        if keys.len() != E::KEY_COLUMNS.len() {
            return Err(DbError::invalid_argument(format!(
                "{} is keyed by {} column(s), got {} key value(s)",
                E::TABLE,
                E::KEY_COLUMNS.len(),
                keys.len()
            )));
        }
        Ok(())
    }

    pub async fn get_by_keys(&mut self, keys: &[SqlArg]) -> Result<Option<E>> {
        self.check_key_arity(keys)?;
        let mut query = sqlx::query_as::<_, E>(&self.sql.select_by_keys);
        for key in keys {
            query = bind_query_as(query, key);
        }
        Ok(query.fetch_optional(&mut *self.db).await?)
    }

    pub async fn list(&mut self, page: &Page) -> Result<Vec<E>> {
        page.validate()?;
        let rows = sqlx::query_as::<_, E>(&self.sql.list)
            .bind(page.limit)
            .bind(page.offset)
            .fetch_all(&mut *self.db)
            .await?;
        Ok(rows)
    }

    pub async fn insert<C: InsertValues>(&mut self, create: &C) -> Result<KeyTuple> {
        let values = create.values();
        // the create type's value list is declared alongside INSERT_COLUMNS,
        // a length mismatch is a programming error in the entity declaration
        if values.len() != E::INSERT_COLUMNS.len() {
            return Err(DbError::invalid_argument(format!(
                "{} declares {} insert column(s), create request produced {} value(s)",
                E::TABLE,
                E::INSERT_COLUMNS.len(),
                values.len()
            )));
        }
        let mut query = sqlx::query(&self.sql.insert);
        for value in &values {
            query = bind_query(query, value);
        }
        let row = query.fetch_one(&mut *self.db).await?;
        decode_keys(&row, E::KEY_COLUMNS)
    }

    pub async fn update<P: Patch>(&mut self, keys: &[SqlArg], patch: &P) -> Result<UpdateOutcome> {
        self.check_key_arity(keys)?;
        let fields = patch.set_fields();
        if fields.is_empty() {
            return Ok(UpdateOutcome::NoOp);
        }

        let columns: Vec<&'static str> = fields.iter().map(|(column, _)| *column).collect();
        let statement = self.sql.update_statement(&columns);
        let mut query = sqlx::query(&statement);
        for (_, value) in &fields {
            query = bind_query(query, value);
        }
        for key in keys {
            query = bind_query(query, key);
        }

        let row = query.fetch_optional(&mut *self.db).await?.ok_or(DbError::NotFound)?;
        Ok(UpdateOutcome::Updated(decode_keys(&row, E::KEY_COLUMNS)?))
    }

    pub async fn delete(&mut self, keys: &[SqlArg]) -> Result<KeyTuple> {
        self.check_key_arity(keys)?;
        let mut query = sqlx::query(&self.sql.delete_by_keys);
        for key in keys {
            query = bind_query(query, key);
        }
        let row = query.fetch_optional(&mut *self.db).await?.ok_or(DbError::NotFound)?;
        decode_keys(&row, E::KEY_COLUMNS)
    }

    pub async fn truncate_cascade(&mut self) -> Result<()> {
        sqlx::query(&self.sql.truncate).execute(&mut *self.db).await?;
        Ok(())
    }
}
