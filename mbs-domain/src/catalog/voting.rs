use std::{fmt::Display, str::FromStr};

use mbs_orm::{Tracked, sqlx::SqliteConnection};
use serde::{Serialize, Serializer};
use tracing::info;

use crate::{
    entity::evaluation,
    error::{Result, WorkflowError},
};

use super::Catalog;

/// A jury member's verdict on a dissertation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Decision {
    Correction,
    Rejected,
    Approved,
}

impl Decision {
    /// Tie-break order: on equal counts, the earlier decision wins.
    pub const ALL: [Self; 3] = [Self::Correction, Self::Rejected, Self::Approved];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Correction => "Correction",
            Self::Rejected => "Rejected",
            Self::Approved => "Approved",
        }
    }
}

impl FromStr for Decision {
    type Err = WorkflowError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|d| d.as_str() == s)
            .ok_or_else(|| WorkflowError::InvalidDecision(s.to_string()))
    }
}

impl Display for Decision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Decision {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Where a dissertation stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DissertationStatus {
    /// Date and jury are not approved yet.
    Pending,
    /// Not every jury member has voted.
    Undecided,
    Decided(Decision),
}

impl Display for DissertationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => f.write_str("Pending"),
            Self::Undecided => f.write_str("Undecided"),
            Self::Decided(decision) => decision.fmt(f),
        }
    }
}

impl Serialize for DissertationStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Vote counts of one dissertation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tally {
    pub correction: usize,
    pub rejected: usize,
    pub approved: usize,
}

impl Tally {
    #[must_use]
    pub const fn count(&self, decision: Decision) -> usize {
        match decision {
            Decision::Correction => self.correction,
            Decision::Rejected => self.rejected,
            Decision::Approved => self.approved,
        }
    }

    #[must_use]
    pub const fn total(&self) -> usize {
        self.correction + self.rejected + self.approved
    }

    /// The decision with the most votes, `None` before the first vote.
    #[must_use]
    pub fn leading(&self) -> Option<Decision> {
        Decision::ALL
            .into_iter()
            .filter(|d| self.count(*d) > 0)
            .fold(None, |best: Option<Decision>, d| match best {
                Some(b) if self.count(b) >= self.count(d) => Some(b),
                _ => Some(d),
            })
    }

    /// [`DissertationStatus::Undecided`] until `member_count` votes are in, the leading decision
    /// afterwards.
    #[must_use]
    pub fn consensus(&self, member_count: usize) -> DissertationStatus {
        if self.total() != member_count {
            return DissertationStatus::Undecided;
        }

        self.leading()
            .map_or(DissertationStatus::Undecided, DissertationStatus::Decided)
    }

    /// Whether the leading decision had dissenting votes.
    #[must_use]
    pub fn by_majority(&self) -> bool {
        self.leading()
            .is_some_and(|d| self.count(d) != self.total())
    }
}

impl FromIterator<Decision> for Tally {
    fn from_iter<T: IntoIterator<Item = Decision>>(iter: T) -> Self {
        iter.into_iter().fold(Self::default(), |mut tally, d| {
            match d {
                Decision::Correction => tally.correction += 1,
                Decision::Rejected => tally.rejected += 1,
                Decision::Approved => tally.approved += 1,
            }
            tally
        })
    }
}

impl Catalog {
    /// Count the votes cast on a dissertation.
    ///
    /// # Errors
    ///
    /// [`WorkflowError::InvalidDecision`] if a stored vote is not a [`Decision`].
    pub async fn tally(
        &self,
        connection: &mut SqliteConnection,
        dissertation_id: i64,
    ) -> Result<Tally> {
        self.evaluations
            .fetch_where(connection, "dissertation_id", dissertation_id)
            .await?
            .iter()
            .map(|e| e.evaluation.parse::<Decision>())
            .collect()
    }

    /// # Errors
    ///
    /// See [`tally`](Self::tally).
    pub async fn consensus(
        &self,
        connection: &mut SqliteConnection,
        dissertation_id: i64,
        member_count: usize,
    ) -> Result<DissertationStatus> {
        Ok(self
            .tally(connection, dissertation_id)
            .await?
            .consensus(member_count))
    }

    /// # Errors
    ///
    /// See [`tally`](Self::tally).
    pub async fn by_majority(
        &self,
        connection: &mut SqliteConnection,
        dissertation_id: i64,
    ) -> Result<bool> {
        Ok(self.tally(connection, dissertation_id).await?.by_majority())
    }

    /// Record a jury member's vote on the student's dissertation.
    ///
    /// # Errors
    ///
    /// [`WorkflowError::NotEvaluator`] if the jury member does not sit on that dissertation,
    /// [`WorkflowError::MissingDissertation`] if the student has none,
    /// [`WorkflowError::AlreadyEvaluated`] if the jury member voted before.
    pub async fn submit_evaluation(
        &self,
        connection: &mut SqliteConnection,
        jury_id: i64,
        student_id: i64,
        decision: Decision,
    ) -> Result<Tracked<evaluation::Entity>> {
        if !self.can_evaluate(connection, jury_id, student_id).await? {
            return Err(WorkflowError::NotEvaluator {
                jury_id,
                student_id,
            });
        }

        let Some(dissertation) = self.dissertation_of(connection, student_id).await? else {
            return Err(WorkflowError::MissingDissertation(student_id));
        };

        // One vote per jury member.
        if self
            .evaluations
            .fetch_where(connection, "dissertation_id", dissertation.dissertation_id)
            .await?
            .iter()
            .any(|e| e.jury_id == jury_id)
        {
            return Err(WorkflowError::AlreadyEvaluated {
                jury_id,
                student_id,
            });
        }

        let mut vote = Tracked::<evaluation::Entity>::new(evaluation::Model {
            evaluation_id: -1,
            dissertation_id: dissertation.dissertation_id,
            jury_id,
            evaluation: decision.to_string(),
        });
        self.evaluations.create(connection, &mut vote).await?;
        info!(jury_id, student_id, %decision, "evaluation submitted");

        Ok(vote)
    }

    /// The vote a jury member cast on the student's dissertation, if any.
    ///
    /// # Errors
    ///
    /// [`WorkflowError::InvalidDecision`] if the stored vote is not a [`Decision`].
    pub async fn evaluation_by(
        &self,
        connection: &mut SqliteConnection,
        jury_id: i64,
        student_id: i64,
    ) -> Result<Option<Decision>> {
        let Some(dissertation) = self.dissertation_of(connection, student_id).await? else {
            return Ok(None);
        };

        self.evaluations
            .fetch_where(connection, "dissertation_id", dissertation.dissertation_id)
            .await?
            .iter()
            .find(|e| e.jury_id == jury_id)
            .map(|e| e.evaluation.parse())
            .transpose()
    }
}

#[cfg(test)]
mod test {
    use super::{Decision, DissertationStatus, Tally};

    fn tally(votes: &[Decision]) -> Tally {
        votes.iter().copied().collect()
    }

    #[test]
    fn test_undecided_until_everyone_voted() {
        let votes = tally(&[Decision::Approved, Decision::Approved]);

        assert_eq!(votes.consensus(3), DissertationStatus::Undecided);
        assert_eq!(
            votes.consensus(2),
            DissertationStatus::Decided(Decision::Approved)
        );
        assert_eq!(tally(&[]).consensus(0), DissertationStatus::Undecided);
    }

    #[test]
    fn test_ties_follow_decision_order() {
        let votes = tally(&[Decision::Approved, Decision::Rejected]);
        assert_eq!(votes.leading(), Some(Decision::Rejected));

        let votes = tally(&[Decision::Approved, Decision::Correction, Decision::Rejected]);
        assert_eq!(votes.leading(), Some(Decision::Correction));
    }

    #[test]
    fn test_by_majority() {
        assert!(!tally(&[]).by_majority());
        assert!(!tally(&[Decision::Approved, Decision::Approved]).by_majority());
        assert!(tally(&[Decision::Approved, Decision::Approved, Decision::Rejected]).by_majority());
    }

    #[test]
    fn test_status_text() {
        assert_eq!(DissertationStatus::Pending.to_string(), "Pending");
        assert_eq!(
            DissertationStatus::Decided(Decision::Correction).to_string(),
            "Correction"
        );
        assert_eq!("Rejected".parse::<Decision>().ok(), Some(Decision::Rejected));
        assert!("rejected".parse::<Decision>().is_err());
    }
}
