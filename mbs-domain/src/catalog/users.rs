use std::{fmt::Display, str::FromStr};

use mbs_orm::{Tracked, sqlx::SqliteConnection};
use serde_json::Value as JsonValue;

use crate::{
    entity::{UserFields, advisor, dbr, department, jury, student},
    error::{Result, WorkflowError},
};

use super::Catalog;

/// The kinds of user that have a table of their own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserClass {
    Advisor,
    Student,
    Dbr,
    Jury,
}

impl FromStr for UserClass {
    type Err = WorkflowError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "advisor" => Ok(Self::Advisor),
            "student" => Ok(Self::Student),
            "dbr" => Ok(Self::Dbr),
            "jury" => Ok(Self::Jury),
            _ => Err(WorkflowError::InvalidUserClass(s.to_string())),
        }
    }
}

impl Display for UserClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Advisor => "Advisor",
            Self::Student => "Student",
            Self::Dbr => "DBR",
            Self::Jury => "Jury",
        })
    }
}

/// A user loaded as the most specific type it has a row for.
#[derive(Debug)]
pub enum Role {
    Advisor(Tracked<advisor::Entity>),
    Student(Tracked<student::Entity>),
    Dbr(Tracked<dbr::Entity>),
    Jury(Tracked<jury::Entity>),
}

impl Role {
    #[must_use]
    pub const fn class(&self) -> UserClass {
        match self {
            Self::Advisor(_) => UserClass::Advisor,
            Self::Student(_) => UserClass::Student,
            Self::Dbr(_) => UserClass::Dbr,
            Self::Jury(_) => UserClass::Jury,
        }
    }

    #[must_use]
    pub fn user(&self) -> &dyn UserFields {
        match self {
            Self::Advisor(r) => r.model(),
            Self::Student(r) => r.model(),
            Self::Dbr(r) => r.model(),
            Self::Jury(r) => r.model(),
        }
    }
}

/// What an advisor fills in to register an external jury member.
#[derive(Debug, Clone)]
pub struct NewJury {
    pub name: String,
    pub surname: String,
    pub email: String,
    pub institution: String,
    pub phone_number: String,
}

impl Catalog {
    /// Load the user as the first of advisor, student, DBR and jury it is registered as.
    ///
    /// # Errors
    ///
    /// If there's been a problem communicating with the database.
    pub async fn downcast(
        &self,
        connection: &mut SqliteConnection,
        user_id: i64,
    ) -> Result<Option<Role>> {
        if self.advisors.has(connection, user_id).await? {
            return Ok(Some(Role::Advisor(
                self.advisors.fetch(connection, user_id).await?,
            )));
        }
        if self.students.has(connection, user_id).await? {
            return Ok(Some(Role::Student(
                self.students.fetch(connection, user_id).await?,
            )));
        }
        if self.dbrs.has(connection, user_id).await? {
            return Ok(Some(Role::Dbr(self.dbrs.fetch(connection, user_id).await?)));
        }
        if self.juries.has(connection, user_id).await? {
            return Ok(Some(Role::Jury(self.juries.fetch(connection, user_id).await?)));
        }

        Ok(None)
    }

    /// # Errors
    ///
    /// [`mbs_orm::Error::NotFound`] if the user's department does not exist.
    pub async fn department_of(
        &self,
        connection: &mut SqliteConnection,
        user: &impl UserFields,
    ) -> Result<Tracked<department::Entity>> {
        Ok(self
            .departments
            .fetch(connection, user.department_id())
            .await?)
    }

    /// A user's public profile as JSON: every field of the class except the password, with the
    /// department's name under `department` instead of its identity. Students also get their
    /// `latest_thesis_id`.
    ///
    /// `None` if the user is not registered as `class`.
    ///
    /// # Errors
    ///
    /// [`WorkflowError::InvalidUserClass`] if `class` does not name a user class.
    pub async fn profile(
        &self,
        connection: &mut SqliteConnection,
        class: &str,
        user_id: i64,
    ) -> Result<Option<JsonValue>> {
        let class = class.parse::<UserClass>()?;

        let registered = match class {
            UserClass::Advisor => self.advisors.has(connection, user_id).await?,
            UserClass::Student => self.students.has(connection, user_id).await?,
            UserClass::Dbr => self.dbrs.has(connection, user_id).await?,
            UserClass::Jury => self.juries.has(connection, user_id).await?,
        };
        if !registered {
            return Ok(None);
        }

        let mut profile = match class {
            UserClass::Advisor => {
                serde_json::to_value(self.advisors.fetch(connection, user_id).await?.model())?
            }
            UserClass::Dbr => {
                serde_json::to_value(self.dbrs.fetch(connection, user_id).await?.model())?
            }
            UserClass::Jury => {
                serde_json::to_value(self.juries.fetch(connection, user_id).await?.model())?
            }
            UserClass::Student => {
                let mut profile =
                    serde_json::to_value(self.students.fetch(connection, user_id).await?.model())?;
                let latest = self.latest_thesis_id(connection, user_id).await?;
                if let JsonValue::Object(map) = &mut profile {
                    map.insert("latest_thesis_id".to_string(), latest.into());
                }
                profile
            }
        };

        if let JsonValue::Object(map) = &mut profile {
            map.remove("password");

            if let Some(department_id) = map.remove("department_id").and_then(|v| v.as_i64()) {
                let department = self.departments.fetch(connection, department_id).await?;
                map.insert(
                    "department".to_string(),
                    department.department_name.clone().into(),
                );
            }
        }

        Ok(Some(profile))
    }
}

#[cfg(test)]
mod test {
    use super::UserClass;
    use crate::error::WorkflowError;

    #[test]
    fn test_user_class_names() {
        assert_eq!("Student".parse::<UserClass>().ok(), Some(UserClass::Student));
        assert_eq!("DBR".parse::<UserClass>().ok(), Some(UserClass::Dbr));
        assert_eq!(UserClass::Dbr.to_string(), "DBR");
        assert!(matches!(
            "Department".parse::<UserClass>(),
            Err(WorkflowError::InvalidUserClass(name)) if name == "Department"
        ));
    }
}
