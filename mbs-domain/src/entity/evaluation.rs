use mbs_orm::DatabaseModel;
use serde::Serialize;

/// One jury member's vote on a dissertation.
#[derive(DatabaseModel, Serialize, Debug, Clone, PartialEq, Eq)]
#[mbs_orm(table = "Evaluation", identity = evaluation_id)]
pub struct Model {
    pub evaluation_id: i64,
    pub dissertation_id: i64,
    pub jury_id: i64,
    /// One of `Correction`, `Rejected` or `Approved`.
    pub evaluation: String,
}
