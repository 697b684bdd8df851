//! Repository implementations for database access.
//!
//! Each repository wraps a SQLx connection (or transaction), implements the
//! [`Repository`] trait for the common key-based CRUD operations, and adds
//! entity-specific queries on top. Single-table entities delegate to
//! [`repository::GenericTable`], which runs statements synthesized from the
//! entity's schema declaration; [`Indicators`] spans three tables and writes
//! its own fan-out and merge logic instead.
//!
//! # Available Repositories
//!
//! - [`Users`]: account rows referenced by providers
//! - [`Providers`]: data-providing organizations
//! - [`Economies`]: the economy reference table
//! - [`Permissions`]: write grants, including scope resolution
//! - [`Indicators`]: the logical indicator record over its group tables
//!
//! # Common Pattern
//!
//! ```ignore
//! use catalogd::db::handlers::{Economies, Repository};
//!
//! async fn example(pool: &sqlx::PgPool) -> Result<(), Box<dyn std::error::Error>> {
//!     let mut tx = pool.begin().await?;
//!     let mut repo = Economies::new(&mut tx);
//!     let economy = repo.get("IND").await?;
//!     tx.commit().await?;
//!     Ok(())
//! }
//! ```

pub mod economies;
pub mod indicators;
pub mod permissions;
pub mod providers;
pub mod repository;
pub mod users;

pub use economies::Economies;
pub use indicators::Indicators;
pub use permissions::Permissions;
pub use providers::Providers;
pub use repository::{Repository, UpdateOutcome};
pub use users::Users;
