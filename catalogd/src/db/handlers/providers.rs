//! Database repository for providers.

use crate::db::{
    errors::Result,
    handlers::repository::{GenericTable, Repository, UpdateOutcome},
    models::providers::{Provider, ProviderCreate, ProviderUpdate},
    schema::{KeyTuple, Page, SqlArg},
};
use crate::types::ProviderId;
use sqlx::PgConnection;
use tracing::instrument;

pub struct Providers<'c> {
    table: GenericTable<'c, Provider>,
}

impl<'c> Providers<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self {
            table: GenericTable::new(db),
        }
    }

    #[instrument(skip(self), err)]
    pub async fn get(&mut self, id: ProviderId) -> Result<Option<Provider>> {
        self.table.get_by_keys(&[SqlArg::from(id)]).await
    }
}

#[async_trait::async_trait]
impl<'c> Repository for Providers<'c> {
    type Entity = Provider;
    type Create = ProviderCreate;
    type Update = ProviderUpdate;

    #[instrument(skip(self), err)]
    async fn get_by_keys(&mut self, keys: &[SqlArg]) -> Result<Option<Provider>> {
        self.table.get_by_keys(keys).await
    }

    #[instrument(skip(self, page), fields(limit = page.limit, offset = page.offset), err)]
    async fn list(&mut self, page: &Page) -> Result<Vec<Provider>> {
        self.table.list(page).await
    }

    #[instrument(skip(self, create), fields(name = %create.name), err)]
    async fn insert(&mut self, create: &ProviderCreate) -> Result<KeyTuple> {
        self.table.insert(create).await
    }

    #[instrument(skip(self, update), err)]
    async fn update(&mut self, keys: &[SqlArg], update: &ProviderUpdate) -> Result<UpdateOutcome> {
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::errors::DbError;
    use crate::db::handlers::users::Users;
    use crate::db::models::users::UserCreate;
    use sqlx::PgPool;

    async fn seed_user(pool: &PgPool) -> i32 {
        let mut conn = pool.acquire().await.unwrap();
        let keys = Users::new(&mut conn)
            .insert(&UserCreate {
                email: "admin@example.org".to_string(),
                password: "hunter2".to_string(),
                name: "Admin".to_string(),
            })
            .await
            .unwrap();
        match keys[0] {
            SqlArg::Int(Some(id)) => id,
            ref other => panic!("expected integer user id, got {other:?}"),
        }
    }

    #[sqlx::test]
    #[test_log::test]
    async fn insert_returns_generated_id(pool: PgPool) {
        let admin = seed_user(&pool).await;
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Providers::new(&mut conn);

        let keys = repo
            .insert(&ProviderCreate {
                administrative_account: admin,
                technical_account: None,
                name: "World Bank".to_string(),
                description: None,
                website_url: Some("https://data.worldbank.org".to_string()),
                nologin: false,
                immutable: true,
            })
            .await
            .unwrap();

        let id = match keys[0] {
            SqlArg::Int(Some(id)) => id,
            ref other => panic!("expected integer provider id, got {other:?}"),
        };
        let provider = repo.get(id).await.unwrap().unwrap();
        assert_eq!(provider.name, "World Bank");
        assert!(provider.immutable);
        assert_eq!(provider.technical_account, None);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn dangling_account_reference_is_a_foreign_key_violation(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Providers::new(&mut conn);

        let err = repo
            .insert(&ProviderCreate {
                administrative_account: 9999,
                technical_account: None,
                name: "Ghost".to_string(),
                description: None,
                website_url: None,
                nologin: false,
                immutable: false,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::ForeignKeyViolation { .. }));
    }
}
