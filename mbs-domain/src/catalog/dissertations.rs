use chrono::DateTime;
use mbs_orm::{
    Tracked,
    sqlx::{Connection, SqliteConnection},
};
use serde::Serialize;
use tracing::{debug, info};

use crate::{
    entity::{dbr, defending, dissertation, jury, member},
    error::{Result, WorkflowError},
};

use super::{Catalog, DissertationStatus};

/// A student's dissertation as shown to the people involved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DissertationInfo {
    pub jury_date: i64,
    pub jury_ids: Vec<i64>,
    pub student_id: i64,
    pub status: DissertationStatus,
}

impl DissertationInfo {
    /// `jury_date` as `dd/mm/yyyy`, UTC.
    #[must_use]
    pub fn formatted_date(&self) -> Option<String> {
        DateTime::from_timestamp(self.jury_date, 0).map(|d| d.format("%d/%m/%Y").to_string())
    }

    /// `jury_date` as `HH:MM`, UTC.
    #[must_use]
    pub fn formatted_time(&self) -> Option<String> {
        DateTime::from_timestamp(self.jury_date, 0).map(|d| d.format("%H:%M").to_string())
    }
}

impl Catalog {
    /// Schedule a dissertation for the student with the given jury. The student's advisor is
    /// always part of the jury. The dissertation, its members and the defending relation are
    /// created in one transaction.
    ///
    /// # Errors
    ///
    /// [`WorkflowError::MissingAdvisor`] if the student has no advisor,
    /// [`WorkflowError::UnknownJury`] if one of the jury identities is not a jury member.
    pub async fn create_dissertation_for(
        &self,
        connection: &mut SqliteConnection,
        student_id: i64,
        jury_ids: &[i64],
        jury_date: i64,
    ) -> Result<Tracked<dissertation::Entity>> {
        let Some(advisor) = self.advisor_of(connection, student_id).await? else {
            return Err(WorkflowError::MissingAdvisor(student_id));
        };

        let mut jury_ids = jury_ids.to_vec();
        if !jury_ids.contains(&advisor.advisor_id) {
            jury_ids.push(advisor.advisor_id);
        }

        for jury_id in &jury_ids {
            if !self.juries.has(connection, *jury_id).await? {
                return Err(WorkflowError::UnknownJury(*jury_id));
            }
        }

        let mut tx = connection.begin().await?;

        let mut dissertation = Tracked::<dissertation::Entity>::new(dissertation::Model {
            dissertation_id: -1,
            jury_date,
            is_approved: false,
        });
        self.dissertations.create(&mut tx, &mut dissertation).await?;

        for jury_id in &jury_ids {
            let mut membership = Tracked::<member::Entity>::new(member::Model {
                member_id: -1,
                dissertation_id: dissertation.dissertation_id,
                jury_id: *jury_id,
            });
            self.members.create(&mut tx, &mut membership).await?;
        }

        let mut defending = Tracked::<defending::Entity>::new(defending::Model {
            defending_id: -1,
            dissertation_id: dissertation.dissertation_id,
            student_id,
        });
        self.defendings.create(&mut tx, &mut defending).await?;

        tx.commit().await?;
        info!(
            dissertation_id = dissertation.dissertation_id,
            student_id,
            jury = jury_ids.len(),
            "dissertation scheduled"
        );

        Ok(dissertation)
    }

    /// # Errors
    ///
    /// If there's been a problem communicating with the database.
    pub async fn dissertation_of(
        &self,
        connection: &mut SqliteConnection,
        student_id: i64,
    ) -> Result<Option<Tracked<dissertation::Entity>>> {
        let defending = self
            .defendings
            .fetch_where(connection, "student_id", student_id)
            .await?;

        let Some(defending) = defending.first() else {
            return Ok(None);
        };

        Ok(Some(
            self.dissertations
                .fetch(connection, defending.dissertation_id)
                .await?,
        ))
    }

    /// The student's dissertation with its jury and status. `None` if the student has no
    /// dissertation or it has no jury.
    ///
    /// # Errors
    ///
    /// If there's been a problem communicating with the database.
    pub async fn dissertation_info(
        &self,
        connection: &mut SqliteConnection,
        student_id: i64,
    ) -> Result<Option<DissertationInfo>> {
        let Some(dissertation) = self.dissertation_of(connection, student_id).await? else {
            return Ok(None);
        };

        let jury_ids = self
            .members
            .fetch_where(connection, "dissertation_id", dissertation.dissertation_id)
            .await?
            .iter()
            .map(|m| m.jury_id)
            .collect::<Vec<_>>();

        if jury_ids.is_empty() {
            return Ok(None);
        }

        let status = if dissertation.is_approved {
            self.consensus(connection, dissertation.dissertation_id, jury_ids.len())
                .await?
        } else {
            DissertationStatus::Pending
        };

        Ok(Some(DissertationInfo {
            jury_date: dissertation.jury_date,
            jury_ids,
            student_id,
            status,
        }))
    }

    /// Approve the date and jury of a student's dissertation in the representative's department,
    /// which opens it for evaluation.
    ///
    /// # Errors
    ///
    /// [`mbs_orm::Error::NotFound`] if there is no such student,
    /// [`WorkflowError::OutsideDepartment`] if the student belongs to another department,
    /// [`WorkflowError::MissingDissertation`] if the student has no dissertation with a jury.
    pub async fn approve_dissertation(
        &self,
        connection: &mut SqliteConnection,
        dbr: &dbr::Model,
        student_id: i64,
    ) -> Result<DissertationInfo> {
        let mut tx = connection.begin().await?;

        let student = self.students.fetch(&mut tx, student_id).await?;
        if student.department_id != dbr.department_id {
            return Err(WorkflowError::OutsideDepartment {
                student_id,
                department_id: dbr.department_id,
            });
        }

        let Some(mut dissertation) = self.dissertation_of(&mut tx, student_id).await? else {
            return Err(WorkflowError::MissingDissertation(student_id));
        };
        dissertation.set::<dissertation::columns::IsApproved>(true)?;
        self.dissertations
            .update(&mut tx, &mut dissertation)
            .await?;

        let Some(info) = self.dissertation_info(&mut tx, student_id).await? else {
            return Err(WorkflowError::MissingDissertation(student_id));
        };

        tx.commit().await?;
        info!(
            dbr_id = dbr.dbr_id,
            dissertation_id = dissertation.dissertation_id,
            student_id,
            "dissertation approved"
        );

        Ok(info)
    }

    /// # Errors
    ///
    /// If there's been a problem communicating with the database.
    pub async fn jury_members(
        &self,
        connection: &mut SqliteConnection,
        dissertation_id: i64,
    ) -> Result<Vec<Tracked<jury::Entity>>> {
        let members = self
            .members
            .fetch_where(connection, "dissertation_id", dissertation_id)
            .await?;

        let mut juries = Vec::with_capacity(members.len());
        for member in members {
            juries.push(self.juries.fetch(connection, member.jury_id).await?);
        }

        Ok(juries)
    }

    /// Remove a dissertation together with its defending relation, jury memberships and
    /// evaluations.
    ///
    /// # Errors
    ///
    /// [`mbs_orm::Error::InvalidState`] if the dissertation is not persisted.
    pub async fn delete_dissertation(
        &self,
        connection: &mut SqliteConnection,
        dissertation: &mut Tracked<dissertation::Entity>,
    ) -> Result<()> {
        let dissertation_id = dissertation.dissertation_id;
        let mut tx = connection.begin().await?;

        for mut defending in self
            .defendings
            .fetch_where(&mut tx, "dissertation_id", dissertation_id)
            .await?
        {
            self.defendings.delete(&mut tx, &mut defending).await?;
        }

        for mut membership in self
            .members
            .fetch_where(&mut tx, "dissertation_id", dissertation_id)
            .await?
        {
            self.members.delete(&mut tx, &mut membership).await?;
        }

        for mut vote in self
            .evaluations
            .fetch_where(&mut tx, "dissertation_id", dissertation_id)
            .await?
        {
            self.evaluations.delete(&mut tx, &mut vote).await?;
        }

        self.dissertations.delete(&mut tx, dissertation).await?;

        tx.commit().await?;
        debug!(dissertation_id, "dissertation deleted");

        Ok(())
    }

    /// Identities of the students whose dissertations the jury member sits on.
    ///
    /// # Errors
    ///
    /// If there's been a problem communicating with the database.
    pub async fn jury_students(
        &self,
        connection: &mut SqliteConnection,
        jury_id: i64,
    ) -> Result<Vec<i64>> {
        let memberships = self
            .members
            .fetch_where(connection, "jury_id", jury_id)
            .await?;

        let mut students = Vec::with_capacity(memberships.len());
        for membership in memberships {
            if let Some(defending) = self
                .defendings
                .fetch_where(connection, "dissertation_id", membership.dissertation_id)
                .await?
                .first()
            {
                students.push(defending.student_id);
            }
        }

        Ok(students)
    }

    /// Whether the jury member sits on the student's dissertation.
    ///
    /// # Errors
    ///
    /// If there's been a problem communicating with the database.
    pub async fn can_evaluate(
        &self,
        connection: &mut SqliteConnection,
        jury_id: i64,
        student_id: i64,
    ) -> Result<bool> {
        Ok(self
            .dissertation_info(connection, student_id)
            .await?
            .is_some_and(|info| info.jury_ids.contains(&jury_id)))
    }
}

#[cfg(test)]
mod test {
    use super::{DissertationInfo, DissertationStatus};

    #[test]
    fn test_formatted_date() {
        let info = DissertationInfo {
            // 2024-06-03 14:30:00 UTC
            jury_date: 1_717_425_000,
            jury_ids: vec![1, 2],
            student_id: 3,
            status: DissertationStatus::Pending,
        };

        assert_eq!(info.formatted_date().as_deref(), Some("03/06/2024"));
        assert_eq!(info.formatted_time().as_deref(), Some("14:30"));
    }
}
