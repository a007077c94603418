use mbs_orm::DatabaseModel;
use serde::Serialize;

/// A jury member sitting on a dissertation.
#[derive(DatabaseModel, Serialize, Debug, Clone, PartialEq, Eq)]
#[mbs_orm(table = "Member", identity = member_id)]
pub struct Model {
    pub member_id: i64,
    pub dissertation_id: i64,
    pub jury_id: i64,
}
