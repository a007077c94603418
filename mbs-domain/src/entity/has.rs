use mbs_orm::DatabaseModel;
use serde::Serialize;

/// Who uploaded a thesis.
#[derive(DatabaseModel, Serialize, Debug, Clone, PartialEq, Eq)]
#[mbs_orm(table = "Has", identity = has_id)]
pub struct Model {
    pub has_id: i64,
    pub thesis_id: i64,
    pub student_id: i64,
}
