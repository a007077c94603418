use mbs_orm::DatabaseModel;
use serde::Serialize;

/// A department such as Computer Engineering.
#[derive(DatabaseModel, Serialize, Debug, Clone, PartialEq, Eq)]
#[mbs_orm(table = "Department", identity = department_id)]
pub struct Model {
    pub department_id: i64,
    pub department_name: String,
    pub turkish_department_name: String,
}
