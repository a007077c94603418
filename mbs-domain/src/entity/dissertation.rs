use mbs_orm::DatabaseModel;
use serde::Serialize;

/// The exam in which a jury decides whether a thesis passes.
#[derive(DatabaseModel, Serialize, Debug, Clone, PartialEq, Eq)]
#[mbs_orm(table = "Dissertation", identity = dissertation_id)]
pub struct Model {
    pub dissertation_id: i64,
    /// Unix timestamp, seconds.
    pub jury_date: i64,
    /// Date and jury have been approved, evaluations count from here on.
    pub is_approved: bool,
}
