use mbs_orm::DatabaseModel;
use serde::Serialize;

/// Departmental board representative.
#[derive(DatabaseModel, Serialize, Debug, Clone, PartialEq, Eq)]
#[mbs_orm(table = "DBR", identity = dbr_id, extends = super::user::Entity)]
pub struct Model {
    pub user_id: i64,
    #[serde(rename = "name_")]
    #[mbs_orm(column = "name_")]
    pub name: String,
    pub surname: String,
    pub password: String,
    pub email: String,
    pub department_id: i64,

    pub dbr_id: i64,
}
