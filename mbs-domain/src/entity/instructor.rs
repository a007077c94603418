use mbs_orm::DatabaseModel;
use serde::Serialize;

/// A student and the advisor who accepted them.
#[derive(DatabaseModel, Serialize, Debug, Clone, PartialEq, Eq)]
#[mbs_orm(table = "Instructor", identity = id_)]
pub struct Model {
    pub id_: i64,
    pub student_id: i64,
    pub advisor_id: i64,
}
