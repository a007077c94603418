use mbs_orm::DatabaseModel;
use serde::Serialize;

/// An advisor recommended to a student.
#[derive(DatabaseModel, Serialize, Debug, Clone, PartialEq, Eq)]
#[mbs_orm(table = "Recommended", identity = recommendation_id)]
pub struct Model {
    pub recommendation_id: i64,
    pub student_id: i64,
    pub advisor_id: i64,
}
