use mbs_orm::{
    Tracked,
    sqlx::{Connection, SqliteConnection},
};
use tracing::info;

use crate::{
    entity::{advisor, instructor, jury, proposal, recommended, student},
    error::{Result, WorkflowError},
};

use super::{Catalog, NewJury, PLACEHOLDER_PASSWORD_HASH};

const HOME_INSTITUTION: &str = "Izmir Institute of Technology";
const UNKNOWN_PHONE_NUMBER: &str = "+90 5XX XXX XX XX";

impl Catalog {
    /// # Errors
    ///
    /// If there's been a problem communicating with the database.
    pub async fn advisor_of(
        &self,
        connection: &mut SqliteConnection,
        student_id: i64,
    ) -> Result<Option<Tracked<advisor::Entity>>> {
        let relations = self
            .instructors
            .fetch_where(connection, "student_id", student_id)
            .await?;

        let Some(relation) = relations.first() else {
            return Ok(None);
        };

        Ok(Some(
            self.advisors.fetch(connection, relation.advisor_id).await?,
        ))
    }

    /// # Errors
    ///
    /// If there's been a problem communicating with the database.
    pub async fn recommendations_of(
        &self,
        connection: &mut SqliteConnection,
        student_id: i64,
    ) -> Result<Vec<Tracked<recommended::Entity>>> {
        Ok(self
            .recommendations
            .fetch_where(connection, "student_id", student_id)
            .await?)
    }

    /// Proposals a student made.
    ///
    /// # Errors
    ///
    /// If there's been a problem communicating with the database.
    pub async fn proposals_of(
        &self,
        connection: &mut SqliteConnection,
        student_id: i64,
    ) -> Result<Vec<Tracked<proposal::Entity>>> {
        Ok(self
            .proposals
            .fetch_where(connection, "student_id", student_id)
            .await?)
    }

    /// Proposals an advisor received.
    ///
    /// # Errors
    ///
    /// If there's been a problem communicating with the database.
    pub async fn proposals_to(
        &self,
        connection: &mut SqliteConnection,
        advisor_id: i64,
    ) -> Result<Vec<Tracked<proposal::Entity>>> {
        Ok(self
            .proposals
            .fetch_where(connection, "advisor_id", advisor_id)
            .await?)
    }

    /// Whether the student has an advisor, a recommendation or a pending proposal.
    ///
    /// # Errors
    ///
    /// If there's been a problem communicating with the database.
    pub async fn is_advisors_recommended(
        &self,
        connection: &mut SqliteConnection,
        student_id: i64,
    ) -> Result<bool> {
        Ok(self
            .instructors
            .has_where(connection, "student_id", student_id)
            .await?
            || self
                .recommendations
                .has_where(connection, "student_id", student_id)
                .await?
            || self
                .proposals
                .has_where(connection, "student_id", student_id)
                .await?)
    }

    /// Make `advisor` the advisor of `student` and mark the student approved, atomically.
    /// `student` is only changed once the transaction committed.
    ///
    /// # Errors
    ///
    /// [`WorkflowError::StudentAlreadyHasAdvisor`] if the student already has one.
    pub async fn set_advisor(
        &self,
        connection: &mut SqliteConnection,
        advisor: &advisor::Model,
        student: &mut Tracked<student::Entity>,
    ) -> Result<()> {
        let mut tx = connection.begin().await?;

        if self
            .instructors
            .has_where(&mut tx, "student_id", student.student_id)
            .await?
        {
            return Err(WorkflowError::StudentAlreadyHasAdvisor {
                student_id: student.student_id,
            });
        }

        let mut relation = Tracked::<instructor::Entity>::new(instructor::Model {
            id_: -1,
            student_id: student.student_id,
            advisor_id: advisor.advisor_id,
        });
        self.instructors.create(&mut tx, &mut relation).await?;

        let mut approved = student.clone();
        approved.set::<student::columns::IsApproved>(true)?;
        self.students.update(&mut tx, &mut approved).await?;

        tx.commit().await?;
        *student = approved;
        info!(
            advisor_id = advisor.advisor_id,
            student_id = student.student_id,
            "advisor assigned"
        );

        Ok(())
    }

    /// Identities of the students an advisor instructs.
    ///
    /// # Errors
    ///
    /// If there's been a problem communicating with the database.
    pub async fn students_of_advisor(
        &self,
        connection: &mut SqliteConnection,
        advisor_id: i64,
    ) -> Result<Vec<i64>> {
        Ok(self
            .instructors
            .fetch_where(connection, "advisor_id", advisor_id)
            .await?
            .iter()
            .map(|relation| relation.student_id)
            .collect())
    }

    /// The advisor's jury row, if the advisor may also sit on juries.
    ///
    /// # Errors
    ///
    /// If there's been a problem communicating with the database.
    pub async fn jury_credentials(
        &self,
        connection: &mut SqliteConnection,
        advisor_id: i64,
    ) -> Result<Option<Tracked<jury::Entity>>> {
        if !self.juries.has(connection, advisor_id).await? {
            return Ok(None);
        }

        Ok(Some(self.juries.fetch(connection, advisor_id).await?))
    }

    /// Give an advisor a jury row sharing the advisor's identity.
    ///
    /// # Errors
    ///
    /// [`mbs_orm::Error::ConstraintViolation`] if the advisor already is a jury member.
    pub async fn create_jury(
        &self,
        connection: &mut SqliteConnection,
        advisor: &advisor::Model,
    ) -> Result<Tracked<jury::Entity>> {
        let jury = self
            .juries
            .create_unique(
                connection,
                vec![
                    advisor.advisor_id.into(),
                    false.into(),
                    HOME_INSTITUTION.into(),
                    UNKNOWN_PHONE_NUMBER.into(),
                    false.into(),
                ],
            )
            .await?;
        info!(jury_id = jury.jury_id, "advisor registered as jury member");

        Ok(jury)
    }

    /// Register an external jury member: a user row and a jury row, created together.
    ///
    /// # Errors
    ///
    /// [`mbs_orm::Error::ConstraintViolation`] if the email is taken or the department does not
    /// exist.
    pub async fn add_new_jury(
        &self,
        connection: &mut SqliteConnection,
        new_jury: NewJury,
        department_id: i64,
    ) -> Result<Tracked<jury::Entity>> {
        let mut jury = Tracked::<jury::Entity>::new(jury::Model {
            user_id: -1,
            name: new_jury.name,
            surname: new_jury.surname,
            password: PLACEHOLDER_PASSWORD_HASH.to_string(),
            email: new_jury.email,
            department_id,
            jury_id: -1,
            is_approved: false,
            institution: new_jury.institution,
            phone_number: new_jury.phone_number,
            is_appointed: true,
        });

        self.juries.create(connection, &mut jury).await?;
        info!(jury_id = jury.jury_id, "jury member registered");

        Ok(jury)
    }
}
