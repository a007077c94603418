//! A three level inheritance chain used by the integration tests: a teaching assistant is a
//! student, a student is a user.

use mbs_orm::{Database, DatabaseConfig, Result, sqlx};

pub mod user {
    use mbs_orm::DatabaseModel;

    #[derive(DatabaseModel, Debug, Clone, PartialEq)]
    #[mbs_orm(table = "User_", identity = user_id)]
    pub struct Model {
        pub user_id: i64,
        pub email: String,
        pub joined: i64,
        pub photo: Option<Vec<u8>>,
    }
}

pub mod student {
    use mbs_orm::DatabaseModel;

    #[derive(DatabaseModel, Debug, Clone, PartialEq)]
    #[mbs_orm(table = "Student", identity = student_id, extends = super::user::Entity)]
    pub struct Model {
        pub user_id: i64,
        pub email: String,
        pub joined: i64,
        pub photo: Option<Vec<u8>>,

        pub student_id: i64,
        #[mbs_orm(column = "name_")]
        pub name: String,
        pub semester: i64,
        pub gpa: f64,
        pub nickname: Option<String>,
    }
}

pub mod teaching_assistant {
    use mbs_orm::DatabaseModel;

    #[derive(DatabaseModel, Debug, Clone, PartialEq)]
    #[mbs_orm(
        table = "TeachingAssistant",
        identity = assistant_id,
        extends = super::student::Entity
    )]
    pub struct Model {
        pub user_id: i64,
        pub email: String,
        pub joined: i64,
        pub photo: Option<Vec<u8>>,

        pub student_id: i64,
        #[mbs_orm(column = "name_")]
        pub name: String,
        pub semester: i64,
        pub gpa: f64,
        pub nickname: Option<String>,

        pub assistant_id: i64,
        pub course: String,
    }
}

pub const SCHEMA: &str = r#"
CREATE TABLE User_ (
    user_id INTEGER PRIMARY KEY,
    email TEXT NOT NULL,
    joined INTEGER NOT NULL,
    photo BLOB
);

CREATE TABLE Student (
    student_id INTEGER PRIMARY KEY REFERENCES User_ (user_id),
    name_ TEXT NOT NULL,
    semester INTEGER NOT NULL CHECK (semester > 0),
    gpa REAL NOT NULL,
    nickname TEXT
);

CREATE TABLE TeachingAssistant (
    assistant_id INTEGER PRIMARY KEY REFERENCES Student (student_id),
    course TEXT NOT NULL
);
"#;

/// A fresh in-memory database holding [`SCHEMA`].
///
/// # Errors
///
/// If the database cannot be opened or the schema fails to apply.
pub async fn database() -> Result<Database> {
    let database = Database::connect(DatabaseConfig {
        url: "sqlite::memory:".to_string(),
        init_script: None,
        max_connections: 1,
    })
    .await?;

    sqlx::raw_sql(SCHEMA).execute(database.pool()).await?;

    Ok(database)
}

#[must_use]
pub fn student(email: &str, name: &str) -> student::Model {
    student::Model {
        user_id: -1,
        email: email.to_string(),
        joined: 2024,
        photo: None,
        student_id: -1,
        name: name.to_string(),
        semester: 1,
        gpa: 3.25,
        nickname: None,
    }
}
