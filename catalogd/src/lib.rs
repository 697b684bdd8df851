//! # catalogd: multi-tenant data-catalog backend
//!
//! `catalogd` is the persistence and authorization core of a statistical data
//! catalog. Data-providing organizations (providers) publish yearly indicator
//! observations about economies; which provider may write which
//! `(economy, year)` cell is governed by explicit permission grants scoped to
//! a single economy or to a whole region.
//!
//! ## Overview
//!
//! The crate has three layers:
//!
//! - a **generic persistence layer** ([`db::schema`],
//!   [`db::handlers::repository`]): each entity declares its table, key
//!   columns, and insert columns once; SELECT, INSERT, UPDATE, DELETE, LIST,
//!   and TRUNCATE statements are synthesized from that declaration at
//!   repository construction time. No entity writes its own CRUD SQL.
//! - an **indicator aggregation engine** ([`indicator_groups`],
//!   [`db::handlers::indicators`]): the 16 indicator fields live in three
//!   physical tables (economic, health, environment) keyed by
//!   `(provider_id, economy_code, year)`. Reads fan out and merge into one
//!   logical record; writes are partitioned by field group and committed in
//!   one transaction.
//! - a **permission engine** ([`db::handlers::permissions`],
//!   [`auth::PermissionGuard`]): grant resolution is a single joined query,
//!   and the guard applies the pure decision rule (immutable providers are
//!   refused before their grants are considered).
//!
//! HTTP serving and authentication live outside this crate; callers hold a
//! [`sqlx::PgPool`] and construct repositories per operation or transaction.
//!
//! ```ignore
//! use catalogd::db::handlers::{Indicators, Repository};
//!
//! async fn example(pool: &sqlx::PgPool) -> Result<(), catalogd::errors::Error> {
//!     let mut tx = pool.begin().await?;
//!     let grant = catalogd::auth::PermissionGuard::authorize_write(&mut tx, 7, "IND", 2018).await?;
//!     tracing::debug!(grant_id = grant.id, "write authorized");
//!     let (record, created) = Indicators::new(&mut tx).upsert(7, "IND", 2018, &patch).await?;
//!     tx.commit().await?;
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod config;
pub mod db;
pub mod errors;
pub mod indicator_groups;
pub mod types;

pub use config::Config;
pub use errors::Error;
pub use types::{PermissionId, ProviderId, Region, UserId};

/// Get the catalogd database migrator
pub fn migrator() -> sqlx::migrate::Migrator {
    sqlx::migrate!("./migrations")
}
