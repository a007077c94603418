use thiserror::Error;

#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error(transparent)]
    Orm(#[from] mbs_orm::Error),

    #[error("student {student_id} already has an advisor")]
    StudentAlreadyHasAdvisor { student_id: i64 },

    #[error("\"{0}\" is not a user class")]
    InvalidUserClass(String),

    #[error("user {0} is not a jury member")]
    UnknownJury(i64),

    #[error("student {0} has no advisor")]
    MissingAdvisor(i64),

    #[error("student {0} has no dissertation")]
    MissingDissertation(i64),

    #[error("jury member {jury_id} does not evaluate student {student_id}")]
    NotEvaluator { jury_id: i64, student_id: i64 },

    #[error("jury member {jury_id} already evaluated student {student_id}")]
    AlreadyEvaluated { jury_id: i64, student_id: i64 },

    #[error("\"{0}\" is not a decision")]
    InvalidDecision(String),

    #[error("student {student_id} is not in department {department_id}")]
    OutsideDepartment {
        student_id: i64,
        department_id: i64,
    },

    #[error("user {0} is not an advisor")]
    UnknownAdvisor(i64),

    #[error("student {0} already proposed to an advisor")]
    AlreadyProposed(i64),

    #[error("student {0} has no thesis topic")]
    MissingThesisTopic(i64),

    #[error("advisor {advisor_id} was not recommended to student {student_id}")]
    NotRecommended { student_id: i64, advisor_id: i64 },

    #[error("student {0} is already approved by an advisor")]
    StudentAlreadyApproved(i64),

    #[error("proposal {proposal_id} was not made to advisor {advisor_id}")]
    NotProposalOwner { advisor_id: i64, proposal_id: i64 },

    #[error("thesis {thesis_id} does not belong to student {student_id}")]
    NotThesisOwner { student_id: i64, thesis_id: i64 },

    #[error("cannot serialize profile: {0}")]
    Serialize(#[from] serde_json::Error),
}

pub type Result<T, E = WorkflowError> = std::result::Result<T, E>;

impl From<mbs_orm::sqlx::Error> for WorkflowError {
    fn from(e: mbs_orm::sqlx::Error) -> Self {
        Self::Orm(e.into())
    }
}
