use mbs_orm::sqlx::SqliteConnection;

use crate::{entity::dbr, error::Result};

use super::Catalog;

// A representative oversees everyone in their own department. `department_id` is owned by
// `User_`, so these lookups go through the base table and keep only rows of the leaf type.
impl Catalog {
    /// User identities of the students in the representative's department.
    ///
    /// # Errors
    ///
    /// If there's been a problem communicating with the database.
    pub async fn students_of_dbr(
        &self,
        connection: &mut SqliteConnection,
        dbr: &dbr::Model,
    ) -> Result<Vec<i64>> {
        Ok(self
            .students
            .fetch_where(connection, "department_id", dbr.department_id)
            .await?
            .iter()
            .map(|student| student.user_id)
            .collect())
    }

    /// Students of the department nobody has recommended an advisor to yet, and who neither have
    /// an advisor nor proposed to one.
    ///
    /// # Errors
    ///
    /// If there's been a problem communicating with the database.
    pub async fn students_without_recommendations(
        &self,
        connection: &mut SqliteConnection,
        dbr: &dbr::Model,
    ) -> Result<Vec<i64>> {
        let mut waiting = Vec::new();

        for student_id in self.students_of_dbr(connection, dbr).await? {
            if !self.is_advisors_recommended(connection, student_id).await? {
                waiting.push(student_id);
            }
        }

        Ok(waiting)
    }

    /// # Errors
    ///
    /// If there's been a problem communicating with the database.
    pub async fn advisors_of_dbr(
        &self,
        connection: &mut SqliteConnection,
        dbr: &dbr::Model,
    ) -> Result<Vec<i64>> {
        Ok(self
            .advisors
            .fetch_where(connection, "department_id", dbr.department_id)
            .await?
            .iter()
            .map(|advisor| advisor.user_id)
            .collect())
    }
}
