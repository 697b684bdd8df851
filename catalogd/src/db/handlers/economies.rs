//! Database repository for economies.

use crate::db::{
    errors::Result,
    handlers::repository::{GenericTable, Repository, UpdateOutcome},
    models::economies::{Economy, EconomyCreate, EconomyUpdate},
    schema::{KeyTuple, Page, SqlArg},
};
use sqlx::PgConnection;
use tracing::instrument;

pub struct Economies<'c> {
    table: GenericTable<'c, Economy>,
}

impl<'c> Economies<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self {
            table: GenericTable::new(db),
        }
    }

    /// Keyed lookup by 3-letter economy code.
    #[instrument(skip(self), err)]
    pub async fn get(&mut self, code: &str) -> Result<Option<Economy>> {
        self.table.get_by_keys(&[SqlArg::from(code)]).await
    }
}

#[async_trait::async_trait]
impl<'c> Repository for Economies<'c> {
    type Entity = Economy;
    type Create = EconomyCreate;
    type Update = EconomyUpdate;

    #[instrument(skip(self), err)]
    async fn get_by_keys(&mut self, keys: &[SqlArg]) -> Result<Option<Economy>> {
        self.table.get_by_keys(keys).await
    }

    #[instrument(skip(self, page), fields(limit = page.limit, offset = page.offset), err)]
    async fn list(&mut self, page: &Page) -> Result<Vec<Economy>> {
        self.table.list(page).await
    }

    #[instrument(skip(self, create), fields(code = %create.code), err)]
    async fn insert(&mut self, create: &EconomyCreate) -> Result<KeyTuple> {
        self.table.insert(create).await
    }

    #[instrument(skip(self, update), err)]
    async fn update(&mut self, keys: &[SqlArg], update: &EconomyUpdate) -> Result<UpdateOutcome> {
        self.table.update(keys, update).await
    }

    #[instrument(skip(self), err)]
    async fn delete(&mut self, keys: &[SqlArg]) -> Result<KeyTuple> {
        self.table.delete(keys).await
    }

    #[instrument(skip(self), err)]
    async fn truncate_cascade(&mut self) -> Result<()> {
        self.table.truncate_cascade().await
    }
}
