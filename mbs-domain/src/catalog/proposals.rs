use mbs_orm::{
    Tracked,
    sqlx::{Connection, SqliteConnection},
};
use tracing::info;

use crate::{
    entity::{advisor, dbr, proposal, recommended, student},
    error::{Result, WorkflowError},
};

use super::Catalog;

// Recommendation, proposal, approval: a representative recommends advisors to a student of their
// department, the student proposes to one of them, the advisor accepts or turns the proposal down.
impl Catalog {
    /// Recommend an advisor to a student of the representative's department.
    ///
    /// # Errors
    ///
    /// [`mbs_orm::Error::NotFound`] if there is no such student,
    /// [`WorkflowError::OutsideDepartment`] if the student belongs to another department,
    /// [`WorkflowError::UnknownAdvisor`] if `advisor_id` is not an advisor.
    pub async fn recommend_advisor(
        &self,
        connection: &mut SqliteConnection,
        dbr: &dbr::Model,
        student_id: i64,
        advisor_id: i64,
    ) -> Result<Tracked<recommended::Entity>> {
        let mut tx = connection.begin().await?;

        let student = self.students.fetch(&mut tx, student_id).await?;
        if student.department_id != dbr.department_id {
            return Err(WorkflowError::OutsideDepartment {
                student_id,
                department_id: dbr.department_id,
            });
        }
        if !self.advisors.has(&mut tx, advisor_id).await? {
            return Err(WorkflowError::UnknownAdvisor(advisor_id));
        }

        let mut recommendation = Tracked::<recommended::Entity>::new(recommended::Model {
            recommendation_id: -1,
            student_id,
            advisor_id,
        });
        self.recommendations
            .create(&mut tx, &mut recommendation)
            .await?;

        tx.commit().await?;
        info!(
            dbr_id = dbr.dbr_id,
            student_id,
            advisor_id,
            "advisor recommended"
        );

        Ok(recommendation)
    }

    /// Propose to one of the advisors recommended to the student. `student` is marked as having
    /// proposed once the transaction committed.
    ///
    /// # Errors
    ///
    /// [`WorkflowError::AlreadyProposed`], [`WorkflowError::MissingThesisTopic`] if the student
    /// has no topic yet, [`WorkflowError::NotRecommended`] if the advisor was not recommended to
    /// the student, [`WorkflowError::UnknownAdvisor`].
    pub async fn propose(
        &self,
        connection: &mut SqliteConnection,
        student: &mut Tracked<student::Entity>,
        advisor_id: i64,
    ) -> Result<Tracked<proposal::Entity>> {
        let student_id = student.student_id;

        if student.has_proposed {
            return Err(WorkflowError::AlreadyProposed(student_id));
        }
        if student
            .thesis_topic
            .as_deref()
            .is_none_or(|topic| topic.trim().is_empty())
        {
            return Err(WorkflowError::MissingThesisTopic(student_id));
        }

        let mut tx = connection.begin().await?;

        if !self
            .recommendations_of(&mut tx, student_id)
            .await?
            .iter()
            .any(|r| r.advisor_id == advisor_id)
        {
            return Err(WorkflowError::NotRecommended {
                student_id,
                advisor_id,
            });
        }
        if !self.advisors.has(&mut tx, advisor_id).await? {
            return Err(WorkflowError::UnknownAdvisor(advisor_id));
        }

        let mut proposed = student.clone();
        proposed.set::<student::columns::HasProposed>(true)?;
        self.students.update(&mut tx, &mut proposed).await?;

        let mut proposal = Tracked::<proposal::Entity>::new(proposal::Model {
            proposal_id: -1,
            student_id,
            advisor_id,
        });
        self.proposals.create(&mut tx, &mut proposal).await?;

        tx.commit().await?;
        *student = proposed;
        info!(student_id, advisor_id, "proposal made");

        Ok(proposal)
    }

    /// Accept a proposal: the proposal is consumed and the advisor becomes the student's advisor.
    /// Returns the approved student.
    ///
    /// # Errors
    ///
    /// [`mbs_orm::Error::NotFound`] if there is no such proposal,
    /// [`WorkflowError::NotProposalOwner`] if it was made to another advisor,
    /// [`WorkflowError::StudentAlreadyApproved`] if another advisor accepted the student first.
    pub async fn approve_proposal(
        &self,
        connection: &mut SqliteConnection,
        advisor: &advisor::Model,
        proposal_id: i64,
    ) -> Result<Tracked<student::Entity>> {
        let mut tx = connection.begin().await?;

        let mut proposal = self.proposals.fetch(&mut tx, proposal_id).await?;
        if proposal.advisor_id != advisor.advisor_id {
            return Err(WorkflowError::NotProposalOwner {
                advisor_id: advisor.advisor_id,
                proposal_id,
            });
        }

        let mut student = self.students.fetch(&mut tx, proposal.student_id).await?;
        if student.is_approved {
            return Err(WorkflowError::StudentAlreadyApproved(student.student_id));
        }

        self.proposals.delete(&mut tx, &mut proposal).await?;
        self.set_advisor(&mut tx, advisor, &mut student).await?;

        tx.commit().await?;

        Ok(student)
    }

    /// Turn a proposal down. The student may propose again afterwards. Rejecting a proposal that
    /// no longer exists succeeds.
    ///
    /// # Errors
    ///
    /// [`WorkflowError::NotProposalOwner`] if the proposal was made to another advisor.
    pub async fn reject_proposal(
        &self,
        connection: &mut SqliteConnection,
        advisor: &advisor::Model,
        proposal_id: i64,
    ) -> Result<()> {
        let mut tx = connection.begin().await?;

        if !self.proposals.has(&mut tx, proposal_id).await? {
            return Ok(());
        }

        let mut proposal = self.proposals.fetch(&mut tx, proposal_id).await?;
        if proposal.advisor_id != advisor.advisor_id {
            return Err(WorkflowError::NotProposalOwner {
                advisor_id: advisor.advisor_id,
                proposal_id,
            });
        }

        self.proposals.delete(&mut tx, &mut proposal).await?;

        let mut student = self.students.fetch(&mut tx, proposal.student_id).await?;
        student.set::<student::columns::HasProposed>(false)?;
        self.students.update(&mut tx, &mut student).await?;

        tx.commit().await?;
        info!(
            advisor_id = advisor.advisor_id,
            student_id = student.student_id,
            "proposal rejected"
        );

        Ok(())
    }
}
