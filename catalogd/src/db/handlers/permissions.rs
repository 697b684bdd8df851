//! Database repository for permissions, including scope resolution.

use crate::db::{
    errors::Result,
    handlers::repository::{GenericTable, Repository, UpdateOutcome},
    models::permissions::{Permission, PermissionCreate, PermissionUpdate},
    schema::{KeyTuple, Page, SqlArg},
};
use crate::types::ProviderId;
use sqlx::PgConnection;
use tracing::instrument;

/// Matches a permission row for the provider whose year range contains the
/// requested year and whose scope covers the economy, either directly or
/// through the economy's region. When both kinds of grant cover the same
/// cell, the economy-scoped one wins; ties beyond that go to the lowest id.
const RESOLVE_SQL: &str = r#"
SELECT p.*
FROM permissions p
JOIN economies e ON e.code = $2
WHERE p.provider_id = $1
  AND $3 BETWEEN p.year_start AND p.year_end
  AND (p.economy_code = e.code OR (p.region IS NOT NULL AND p.region = e.region))
ORDER BY p.economy_code IS NULL, p.id
LIMIT 1
"#;

pub struct Permissions<'c> {
    table: GenericTable<'c, Permission>,
}

impl<'c> Permissions<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self {
            table: GenericTable::new(db),
        }
    }

    /// Resolve the grant (if any) that lets `provider_id` write the
    /// `(economy_code, year)` cell. An unknown economy resolves to `None`,
    /// which the guard reports as a denial.
    #[instrument(skip(self), err)]
    pub async fn resolve(&mut self, provider_id: ProviderId, economy_code: &str, year: i32) -> Result<Option<Permission>> {
        let grant = sqlx::query_as::<_, Permission>(RESOLVE_SQL)
            .bind(provider_id)
            .bind(economy_code)
            .bind(year)
            .fetch_optional(self.table_db())
            .await?;
        Ok(grant)
    }

    /// All grants held by one provider, newest scope last.
    #[instrument(skip(self), err)]
    pub async fn list_for_provider(&mut self, provider_id: ProviderId) -> Result<Vec<Permission>> {
        let grants = sqlx::query_as::<_, Permission>("SELECT * FROM permissions WHERE provider_id = $1 ORDER BY id")
            .bind(provider_id)
            .fetch_all(self.table_db())
            .await?;
        Ok(grants)
    }

    fn table_db(&mut self) -> &mut PgConnection {
        self.table.connection()
    }
}

#[async_trait::async_trait]
impl<'c> Repository for Permissions<'c> {
    type Entity = Permission;
    type Create = PermissionCreate;
    type Update = PermissionUpdate;

    #[instrument(skip(self), err)]
    async fn get_by_keys(&mut self, keys: &[SqlArg]) -> Result<Option<Permission>> {
        self.table.get_by_keys(keys).await
    }

    #[instrument(skip(self, page), fields(limit = page.limit, offset = page.offset), err)]
    async fn list(&mut self, page: &Page) -> Result<Vec<Permission>> {
        self.table.list(page).await
    }

    /// Scope is validated before anything reaches the database; a non-XOR
    /// scope or inverted year range never produces a statement.
    #[instrument(skip(self, create), fields(provider_id = create.provider_id), err)]
    async fn insert(&mut self, create: &PermissionCreate) -> Result<KeyTuple> {
        create.validate()?;
        self.table.insert(create).await
    }

    #[instrument(skip(self, update), err)]
    async fn update(&mut self, keys: &[SqlArg], update: &PermissionUpdate) -> Result<UpdateOutcome> {
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
    use crate::db::handlers::{economies::Economies, providers::Providers, users::Users};
    use crate::db::models::{economies::EconomyCreate, providers::ProviderCreate, users::UserCreate};
    use crate::types::Region;
    use sqlx::PgPool;

    async fn seed_provider(pool: &PgPool) -> ProviderId {
        let mut conn = pool.acquire().await.unwrap();
        let user_keys = Users::new(&mut conn)
            .insert(&UserCreate {
                email: "ops@example.org".to_string(),
                password: "hunter2".to_string(),
                name: "Ops".to_string(),
            })
            .await
            .unwrap();
        let SqlArg::Int(Some(user_id)) = user_keys[0] else {
            panic!("expected integer user id");
        };
        let provider_keys = Providers::new(&mut conn)
            .insert(&ProviderCreate {
                administrative_account: user_id,
                technical_account: None,
                name: "Statistics Office".to_string(),
                description: None,
                website_url: None,
                nologin: false,
                immutable: false,
            })
            .await
            .unwrap();
        let SqlArg::Int(Some(provider_id)) = provider_keys[0] else {
            panic!("expected integer provider id");
        };
        provider_id
    }

    async fn seed_economy(pool: &PgPool, code: &str, name: &str, region: Option<Region>) {
        let mut conn = pool.acquire().await.unwrap();
        Economies::new(&mut conn)
            .insert(&EconomyCreate {
                code: code.to_string(),
                name: name.to_string(),
                region,
                income_level: None,
                is_aggregate: region.is_none(),
                capital_city: None,
                lat: None,
                lng: None,
            })
            .await
            .unwrap();
    }

    fn region_grant(provider_id: ProviderId, region: Region, year_start: i32, year_end: i32) -> PermissionCreate {
        PermissionCreate {
            provider_id,
            economy_code: None,
            region: Some(region),
            year_start,
            year_end,
            footnote: None,
        }
    }

    #[sqlx::test]
    #[test_log::test]
    async fn region_grant_resolves_for_member_economy_within_range(pool: PgPool) {
        let provider_id = seed_provider(&pool).await;
        seed_economy(&pool, "IND", "India", Some(Region::SouthAsia)).await;

        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Permissions::new(&mut conn);
        repo.insert(&region_grant(provider_id, Region::SouthAsia, 2015, 2020)).await.unwrap();

        let grant = repo.resolve(provider_id, "IND", 2018).await.unwrap().unwrap();
        assert_eq!(grant.region, Some(Region::SouthAsia));
        assert_eq!(grant.provider_id, provider_id);

        // a year outside every stored range resolves to nothing
        assert!(repo.resolve(provider_id, "IND", 2021).await.unwrap().is_none());
    }

    #[sqlx::test]
    #[test_log::test]
    async fn economy_grant_beats_region_grant_for_the_same_cell(pool: PgPool) {
        let provider_id = seed_provider(&pool).await;
        seed_economy(&pool, "IND", "India", Some(Region::SouthAsia)).await;

        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Permissions::new(&mut conn);
        repo.insert(&region_grant(provider_id, Region::SouthAsia, 2010, 2025)).await.unwrap();
        repo.insert(&PermissionCreate {
            provider_id,
            economy_code: Some("IND".to_string()),
            region: None,
            year_start: 2015,
            year_end: 2020,
            footnote: Some("direct grant".to_string()),
        })
        .await
        .unwrap();

        let grant = repo.resolve(provider_id, "IND", 2018).await.unwrap().unwrap();
        assert_eq!(grant.economy_code.as_deref(), Some("IND"));

        // outside the direct grant's range the region grant still applies
        let grant = repo.resolve(provider_id, "IND", 2012).await.unwrap().unwrap();
        assert_eq!(grant.region, Some(Region::SouthAsia));
    }

    #[sqlx::test]
    #[test_log::test]
    async fn resolution_does_not_cross_regions_or_providers(pool: PgPool) {
        let provider_id = seed_provider(&pool).await;
        seed_economy(&pool, "IND", "India", Some(Region::SouthAsia)).await;
        seed_economy(&pool, "USA", "United States", Some(Region::NorthAmerica)).await;

        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Permissions::new(&mut conn);
        repo.insert(&region_grant(provider_id, Region::SouthAsia, 2015, 2020)).await.unwrap();

        assert!(repo.resolve(provider_id, "USA", 2018).await.unwrap().is_none());
        assert!(repo.resolve(provider_id + 1, "IND", 2018).await.unwrap().is_none());
        // unknown economies resolve to a denial, not an error
        assert!(repo.resolve(provider_id, "ZZZ", 2018).await.unwrap().is_none());
    }

    #[sqlx::test]
    #[test_log::test]
    async fn non_xor_scope_never_reaches_the_database(pool: PgPool) {
        let provider_id = seed_provider(&pool).await;
        seed_economy(&pool, "IND", "India", Some(Region::SouthAsia)).await;

        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Permissions::new(&mut conn);

        let both = PermissionCreate {
            provider_id,
            economy_code: Some("IND".to_string()),
            region: Some(Region::SouthAsia),
            year_start: 2015,
            year_end: 2020,
            footnote: None,
        };
        assert!(matches!(repo.insert(&both).await.unwrap_err(), DbError::InvalidArgument { .. }));

        let neither = PermissionCreate {
            economy_code: None,
            region: None,
            ..both
        };
        assert!(matches!(repo.insert(&neither).await.unwrap_err(), DbError::InvalidArgument { .. }));
    }

    #[sqlx::test]
    #[test_log::test]
    async fn identical_scope_conflicts_and_dangling_provider_is_a_reference_error(pool: PgPool) {
        let provider_id = seed_provider(&pool).await;
        seed_economy(&pool, "IND", "India", Some(Region::SouthAsia)).await;

        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Permissions::new(&mut conn);
        repo.insert(&region_grant(provider_id, Region::SouthAsia, 2015, 2020)).await.unwrap();

        // same provider, same scope, different years: still a conflict
        let err = repo
            .insert(&region_grant(provider_id, Region::SouthAsia, 2021, 2022))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));

        let err = repo
            .insert(&region_grant(provider_id + 100, Region::SouthAsia, 2015, 2020))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::ForeignKeyViolation { .. }));
    }

    #[sqlx::test]
    #[test_log::test]
    async fn update_moves_years_but_scope_is_fixed(pool: PgPool) {
        let provider_id = seed_provider(&pool).await;
        seed_economy(&pool, "IND", "India", Some(Region::SouthAsia)).await;

        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Permissions::new(&mut conn);
        let keys = repo.insert(&region_grant(provider_id, Region::SouthAsia, 2015, 2020)).await.unwrap();

        let outcome = repo
            .update(
                &keys,
                &PermissionUpdate {
                    year_end: Some(2022),
                    footnote: Some(Some("extended".to_string())),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert!(matches!(outcome, UpdateOutcome::Updated(_)));

        let grant = repo.resolve(provider_id, "IND", 2021).await.unwrap().unwrap();
        assert_eq!(grant.year_end, 2022);
        assert_eq!(grant.footnote.as_deref(), Some("extended"));
    }
}
