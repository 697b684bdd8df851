//! Database repository for user accounts.
//!
//! Only the generic operations: users exist so provider account references
//! resolve, authentication lives outside this crate.

use crate::db::{
    errors::Result,
    handlers::repository::{GenericTable, Repository, UpdateOutcome},
    models::users::{User, UserCreate, UserUpdate},
    schema::{KeyTuple, Page, SqlArg},
};
use crate::types::UserId;
use sqlx::PgConnection;
use tracing::instrument;

pub struct Users<'c> {
    table: GenericTable<'c, User>,
}

impl<'c> Users<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self {
            table: GenericTable::new(db),
        }
    }

    #[instrument(skip(self), err)]
    pub async fn get(&mut self, id: UserId) -> Result<Option<User>> {
        self.table.get_by_keys(&[SqlArg::from(id)]).await
    }
}

#[async_trait::async_trait]
impl<'c> Repository for Users<'c> {
    type Entity = User;
    type Create = UserCreate;
    type Update = UserUpdate;

    #[instrument(skip(self), err)]
    async fn get_by_keys(&mut self, keys: &[SqlArg]) -> Result<Option<User>> {
        self.table.get_by_keys(keys).await
    }

    #[instrument(skip(self, page), fields(limit = page.limit, offset = page.offset), err)]
    async fn list(&mut self, page: &Page) -> Result<Vec<User>> {
        self.table.list(page).await
    }

    #[instrument(skip(self, create), fields(email = %create.email), err)]
    async fn insert(&mut self, create: &UserCreate) -> Result<KeyTuple> {
        self.table.insert(create).await
    }

    #[instrument(skip(self, update), err)]
    async fn update(&mut self, keys: &[SqlArg], update: &UserUpdate) -> Result<UpdateOutcome> {
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
