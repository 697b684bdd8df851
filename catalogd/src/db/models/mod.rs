//! Database record models matching table schemas.
//!
//! Each entity contributes three shapes, mirroring the declared column sets
//! the generic repository synthesizes SQL from:
//!
//! - the row struct (derives `sqlx::FromRow`, declares [`crate::db::schema::TableSpec`]),
//! - a `*Create` request covering the insertable columns,
//! - a `*Update` request where every field is optional.
//!
//! Update requests distinguish "leave unchanged" from "clear": nullable
//! columns use `Option<Option<T>>` with serde's `double_option`, so an absent
//! field is `None` (untouched) and an explicit JSON `null` is `Some(None)`
//! (set to NULL). The generic repository only puts explicitly-set fields into
//! the SET clause.

pub mod economies;
pub mod indicators;
pub mod permissions;
pub mod providers;
pub mod users;
