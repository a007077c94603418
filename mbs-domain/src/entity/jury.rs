use mbs_orm::DatabaseModel;
use serde::Serialize;

/// A user allowed to sit on dissertation juries. Advisors get a jury row sharing their identity.
#[derive(DatabaseModel, Serialize, Debug, Clone, PartialEq, Eq)]
#[mbs_orm(table = "Jury", identity = jury_id, extends = super::user::Entity)]
pub struct Model {
    pub user_id: i64,
    #[serde(rename = "name_")]
    #[mbs_orm(column = "name_")]
    pub name: String,
    pub surname: String,
    pub password: String,
    pub email: String,
    pub department_id: i64,

    pub jury_id: i64,
    pub is_approved: bool,
    pub institution: String,
    pub phone_number: String,
    pub is_appointed: bool,
}
