use mbs_orm::DatabaseModel;
use serde::Serialize;

/// The student whose thesis a dissertation examines.
#[derive(DatabaseModel, Serialize, Debug, Clone, PartialEq, Eq)]
#[mbs_orm(table = "Defending", identity = defending_id)]
pub struct Model {
    pub defending_id: i64,
    pub dissertation_id: i64,
    pub student_id: i64,
}
