//! Inheritance-aware persistence mapper over SQLite.
//!
//! Every persisted entity type maps to exactly one table. A type may extend one other entity type,
//! in which case the fields it inherits are stored in the parent's table and only the fields it
//! introduces itself live in its own table. [`repository::Repository`] reassembles such entities
//! from all tables of the chain and writes pending changes back to the tables owning them.

pub mod config;
pub mod database;
pub mod entity;
pub mod error;
pub mod query;
pub mod repository;
pub mod schema;

pub use config::DatabaseConfig;
pub use database::Database;
pub use entity::{Entity, tracked::Tracked, value::Value};
pub use error::{Error, Result};
pub use repository::Repository;

/// Derive macro generating the entity description, value conversions and column markers of a
/// model struct.
pub use mbs_orm_macros::DatabaseModel;

pub use sqlx;
