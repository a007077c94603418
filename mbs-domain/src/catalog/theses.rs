use std::path::Path;

use mbs_orm::{
    Tracked,
    sqlx::{Connection, SqliteConnection},
};
use tracing::debug;

use crate::{
    entity::{has, thesis},
    error::{Result, WorkflowError},
};

use super::Catalog;

/// Display title derived from a thesis file name: the stem split on `_`, every word capitalised.
///
/// `"deep_learning_FOR_cats.pdf"` becomes `"Deep Learning For Cats"`.
#[must_use]
pub fn thesis_title(file_path: &str) -> String {
    let stem = Path::new(file_path)
        .file_stem()
        .map_or_else(|| file_path.into(), |s| s.to_string_lossy());

    stem.split('_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect()
            })
        })
        .collect::<Vec<_>>()
        .join(" ")
}

impl Catalog {
    /// Store an uploaded thesis and link it to the student.
    ///
    /// # Errors
    ///
    /// [`mbs_orm::Error::ConstraintViolation`] if the student does not exist.
    pub async fn record_thesis(
        &self,
        connection: &mut SqliteConnection,
        student_id: i64,
        thesis: thesis::Model,
    ) -> Result<Tracked<thesis::Entity>> {
        let mut tx = connection.begin().await?;

        let mut thesis = Tracked::<thesis::Entity>::new(thesis);
        self.theses.create(&mut tx, &mut thesis).await?;

        let mut relation = Tracked::<has::Entity>::new(has::Model {
            has_id: -1,
            thesis_id: thesis.thesis_id,
            student_id,
        });
        self.has.create(&mut tx, &mut relation).await?;

        tx.commit().await?;
        debug!(thesis_id = thesis.thesis_id, student_id, "thesis recorded");

        Ok(thesis)
    }

    /// Remove one of the student's theses together with its ownership relation. The removed
    /// thesis is returned so the caller can discard the uploaded file.
    ///
    /// # Errors
    ///
    /// [`WorkflowError::NotThesisOwner`] if the thesis is not the student's.
    pub async fn delete_thesis(
        &self,
        connection: &mut SqliteConnection,
        student_id: i64,
        thesis_id: i64,
    ) -> Result<thesis::Model> {
        let mut tx = connection.begin().await?;

        let relations = self
            .has
            .fetch_where(&mut tx, "thesis_id", thesis_id)
            .await?;
        if !relations.iter().any(|r| r.student_id == student_id) {
            return Err(WorkflowError::NotThesisOwner {
                student_id,
                thesis_id,
            });
        }

        for mut relation in relations {
            self.has.delete(&mut tx, &mut relation).await?;
        }

        let mut thesis = self.theses.fetch(&mut tx, thesis_id).await?;
        self.theses.delete(&mut tx, &mut thesis).await?;

        tx.commit().await?;
        debug!(thesis_id, student_id, "thesis deleted");

        Ok(thesis.into_model())
    }

    /// Every thesis the student uploaded, in upload order.
    ///
    /// # Errors
    ///
    /// If there's been a problem communicating with the database.
    pub async fn theses_of(
        &self,
        connection: &mut SqliteConnection,
        student_id: i64,
    ) -> Result<Vec<Tracked<thesis::Entity>>> {
        let relations = self
            .has
            .fetch_where(connection, "student_id", student_id)
            .await?;

        let mut theses = Vec::with_capacity(relations.len());
        for relation in relations {
            theses.push(self.theses.fetch(connection, relation.thesis_id).await?);
        }

        Ok(theses)
    }

    /// Identity of the most recently submitted thesis, `-1` if there is none. Of theses submitted
    /// at the same moment the last uploaded wins.
    ///
    /// # Errors
    ///
    /// If there's been a problem communicating with the database.
    pub async fn latest_thesis_id(
        &self,
        connection: &mut SqliteConnection,
        student_id: i64,
    ) -> Result<i64> {
        Ok(self
            .theses_of(connection, student_id)
            .await?
            .iter()
            .max_by_key(|thesis| thesis.submission_date)
            .map_or(-1, |thesis| thesis.thesis_id))
    }

    /// Display title of the most recent thesis, see [`thesis_title`].
    ///
    /// # Errors
    ///
    /// If there's been a problem communicating with the database.
    pub async fn latest_thesis_name(
        &self,
        connection: &mut SqliteConnection,
        student_id: i64,
    ) -> Result<Option<String>> {
        Ok(self
            .theses_of(connection, student_id)
            .await?
            .iter()
            .max_by_key(|thesis| thesis.submission_date)
            .map(|thesis| thesis_title(&thesis.file_path)))
    }
}

#[cfg(test)]
mod test {
    use super::thesis_title;

    #[test]
    fn test_thesis_title() {
        assert_eq!(
            thesis_title("uploads/deep_learning_FOR_cats.pdf"),
            "Deep Learning For Cats"
        );
        assert_eq!(thesis_title("single.docx"), "Single");
        assert_eq!(thesis_title("double__underscore"), "Double Underscore");
        assert_eq!(thesis_title(""), "");
    }
}
