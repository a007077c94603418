use mbs_orm::DatabaseModel;
use serde::Serialize;

/// A student proposing to an advisor.
#[derive(DatabaseModel, Serialize, Debug, Clone, PartialEq, Eq)]
#[mbs_orm(table = "Proposal", identity = proposal_id)]
pub struct Model {
    pub proposal_id: i64,
    pub student_id: i64,
    pub advisor_id: i64,
}
