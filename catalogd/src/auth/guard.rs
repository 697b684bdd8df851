//! Write-permission decisions for indicator data.

use crate::db::handlers::{Permissions, Providers};
use crate::db::models::{permissions::Permission, providers::Provider};
use crate::errors::{Error, Result};
use crate::types::ProviderId;
use sqlx::PgConnection;
use tracing::instrument;

/// Decides whether a provider may write an `(economy, year)` cell.
pub struct PermissionGuard;

impl PermissionGuard {
    /// The pure decision rule. The immutable flag is checked before the
    /// grant, so an immutable provider is refused even when a covering grant
    /// exists.
    pub fn decide(provider: &Provider, grant: Option<&Permission>) -> Result<()> {
        if provider.immutable {
            return Err(Error::forbidden(format!(
                "provider {} is immutable and cannot write indicator data",
                provider.id
            )));
        }
        if grant.is_none() {
            return Err(Error::forbidden(format!(
                "provider {} holds no grant covering the requested economy and year",
                provider.id
            )));
        }
        Ok(())
    }

    /// Loads the provider, resolves the covering grant, and applies
    /// [`decide`](Self::decide). Returns the grant that authorized the write.
    ///
    /// An unknown provider is `NotFound`; an immutable provider is refused
    /// without running the resolution query.
    #[instrument(skip(db), err)]
    pub async fn authorize_write(db: &mut PgConnection, provider_id: ProviderId, economy_code: &str, year: i32) -> Result<Permission> {
        let provider = Providers::new(&mut *db)
            .get(provider_id)
            .await?
            .ok_or_else(|| Error::not_found("provider", provider_id))?;
        if provider.immutable {
            Self::decide(&provider, None)?;
        }

        let grant = Permissions::new(db).resolve(provider_id, economy_code, year).await?;
        Self::decide(&provider, grant.as_ref())?;
        grant.ok_or_else(|| Error::Internal {
            operation: "load the authorizing grant".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::handlers::{Economies, Repository, Users};
    use crate::db::models::{economies::EconomyCreate, permissions::PermissionCreate, providers::ProviderCreate, users::UserCreate};
    use crate::db::schema::SqlArg;
    use crate::types::Region;
    use chrono::Utc;
    use sqlx::PgPool;

    fn provider(id: ProviderId, immutable: bool) -> Provider {
        Provider {
            id,
            administrative_account: 1,
            technical_account: None,
            name: "Statistics Office".to_string(),
            description: None,
            website_url: None,
            nologin: false,
            immutable,
            created_at: Utc::now(),
        }
    }

    fn grant(provider_id: ProviderId) -> Permission {
        Permission {
            id: 1,
            provider_id,
            economy_code: Some("IND".to_string()),
            region: None,
            year_start: 2015,
            year_end: 2020,
            footnote: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn grant_holder_is_allowed() {
        let p = provider(7, false);
        assert!(PermissionGuard::decide(&p, Some(&grant(7))).is_ok());
    }

    #[test]
    fn missing_grant_is_forbidden() {
        let p = provider(7, false);
        let err = PermissionGuard::decide(&p, None).unwrap_err();
        assert!(matches!(err, Error::Forbidden { .. }));
    }

    #[test]
    fn immutable_provider_is_forbidden_even_with_a_grant() {
        let p = provider(7, true);
        let err = PermissionGuard::decide(&p, Some(&grant(7))).unwrap_err();
        assert!(matches!(err, Error::Forbidden { .. }));
        assert!(err.user_message().contains("immutable"));
    }

    async fn seed(pool: &PgPool, immutable: bool) -> ProviderId {
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
                immutable,
            })
            .await
            .unwrap();
        let SqlArg::Int(Some(provider_id)) = provider_keys[0] else {
            panic!("expected integer provider id");
        };
        Economies::new(&mut conn)
            .insert(&EconomyCreate {
                code: "IND".to_string(),
                name: "India".to_string(),
                region: Some(Region::SouthAsia),
                income_level: None,
                is_aggregate: false,
                capital_city: None,
                lat: None,
                lng: None,
            })
            .await
            .unwrap();
        provider_id
    }

    #[sqlx::test]
    #[test_log::test]
    async fn authorize_write_returns_the_covering_grant(pool: PgPool) {
        let provider_id = seed(&pool, false).await;
        let mut conn = pool.acquire().await.unwrap();
        Permissions::new(&mut conn)
            .insert(&PermissionCreate {
                provider_id,
                economy_code: None,
                region: Some(Region::SouthAsia),
                year_start: 2015,
                year_end: 2020,
                footnote: None,
            })
            .await
            .unwrap();

        let grant = PermissionGuard::authorize_write(&mut conn, provider_id, "IND", 2018).await.unwrap();
        assert_eq!(grant.region, Some(Region::SouthAsia));

        let err = PermissionGuard::authorize_write(&mut conn, provider_id, "IND", 2021).await.unwrap_err();
        assert!(matches!(err, Error::Forbidden { .. }));
    }

    #[sqlx::test]
    #[test_log::test]
    async fn unknown_provider_is_not_found(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let err = PermissionGuard::authorize_write(&mut conn, 9999, "IND", 2018).await.unwrap_err();
        assert!(matches!(err, Error::NotFound { .. }));
    }

    #[sqlx::test]
    #[test_log::test]
    async fn immutable_provider_is_refused_before_resolution(pool: PgPool) {
        let provider_id = seed(&pool, true).await;
        let mut conn = pool.acquire().await.unwrap();
        Permissions::new(&mut conn)
            .insert(&PermissionCreate {
                provider_id,
                economy_code: Some("IND".to_string()),
                region: None,
                year_start: 2015,
                year_end: 2020,
                footnote: None,
            })
            .await
            .unwrap();

        let err = PermissionGuard::authorize_write(&mut conn, provider_id, "IND", 2018).await.unwrap_err();
        assert!(matches!(err, Error::Forbidden { .. }));
        assert!(err.user_message().contains("immutable"));
    }
}
