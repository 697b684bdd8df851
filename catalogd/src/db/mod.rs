//! Database layer for data persistence and access.
//!
//! Implements the data access layer using SQLx with PostgreSQL, following the
//! Repository pattern: callers talk to repositories, repositories run
//! statements synthesized from per-entity schema declarations, and rows map
//! into the structs in [`models`].
//!
//! # Modules
//!
//! - [`handlers`]: repository implementations for CRUD and entity queries
//! - [`models`]: database record structures matching table schemas
//! - [`schema`]: table declarations, statement synthesis, and value binding
//! - [`errors`]: database-specific error types
//! - [`pools`]: connection pool construction

pub mod errors;
pub mod handlers;
pub mod models;
pub mod pools;
pub mod schema;
