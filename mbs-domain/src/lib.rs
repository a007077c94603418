//! The thesis management domain: students, advisors, departmental board representatives and jury
//! members moving through recommendation, proposal, thesis upload, dissertation scheduling and
//! jury evaluation.
//!
//! Users are stored with table-per-type inheritance: every kind of user extends `User_`, see
//! [`entity`]. The workflows live on [`Catalog`].

pub mod catalog;
pub mod entity;
pub mod error;

pub use catalog::Catalog;
pub use error::{Result, WorkflowError};

/// The schema script creating every table of the domain.
pub const INIT_SCRIPT: &str = include_str!("../schema/init.sql");
