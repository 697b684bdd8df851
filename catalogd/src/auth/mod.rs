//! Authorization for indicator writes.
//!
//! Who may write which `(economy, year)` cell is decided here, in two layers:
//!
//! - [`guard::PermissionGuard::decide`] is the pure rule: an immutable
//!   provider is refused before its grants are even considered, and a missing
//!   grant is a refusal. It takes already-loaded rows so it can be tested
//!   without a database.
//! - [`guard::PermissionGuard::authorize_write`] is the database-backed
//!   wrapper: it loads the provider, short-circuits on the immutable flag,
//!   resolves the grant through [`crate::db::handlers::Permissions`], and
//!   applies the rule.
//!
//! Authentication (who the caller is) happens outside this crate; callers
//! arrive here with a provider id they have already established.

pub mod guard;

pub use guard::PermissionGuard;
