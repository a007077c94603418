use mbs_orm::DatabaseModel;
use serde::Serialize;

/// The base of every kind of user. The password is stored hashed.
#[derive(DatabaseModel, Serialize, Debug, Clone, PartialEq, Eq)]
#[mbs_orm(table = "User_", identity = user_id)]
pub struct Model {
    pub user_id: i64,
    #[serde(rename = "name_")]
    #[mbs_orm(column = "name_")]
    pub name: String,
    pub surname: String,
    pub password: String,
    pub email: String,
    pub department_id: i64,
}
