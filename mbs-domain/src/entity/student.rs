use mbs_orm::DatabaseModel;
use serde::Serialize;

#[derive(DatabaseModel, Serialize, Debug, Clone, PartialEq, Eq)]
#[mbs_orm(table = "Student", identity = student_id, extends = super::user::Entity)]
pub struct Model {
    pub user_id: i64,
    #[serde(rename = "name_")]
    #[mbs_orm(column = "name_")]
    pub name: String,
    pub surname: String,
    pub password: String,
    pub email: String,
    pub department_id: i64,

    pub student_id: i64,
    /// Set once an advisor accepted the student.
    pub is_approved: bool,
    pub has_proposed: bool,
    pub semester: i64,
    pub program_name: String,
    pub thesis_topic: Option<String>,
    pub graduation_status: String,
    pub is_thesis_sent: bool,
}
