use mbs_orm::DatabaseModel;
use serde::Serialize;

#[derive(DatabaseModel, Serialize, Debug, Clone, PartialEq, Eq)]
#[mbs_orm(table = "Thesis", identity = thesis_id)]
pub struct Model {
    pub thesis_id: i64,
    pub file_path: String,
    pub plagiarism_ratio: i64,
    pub thesis_topic: String,
    /// Unix timestamp, seconds.
    pub submission_date: i64,
}
