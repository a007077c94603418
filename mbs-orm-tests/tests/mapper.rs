use mbs_orm::{
    Error, Repository, Tracked, Value,
    entity::tracked::Lifecycle,
    query::statement::query,
    sqlx::{self, SqliteConnection},
};
use mbs_orm_tests::{database, student, teaching_assistant, user};

async fn create_student(
    connection: &mut SqliteConnection,
    email: &str,
    name: &str,
) -> Tracked<student::Entity> {
    let mut record = Tracked::<student::Entity>::new(student(email, name));
    Repository::<student::Entity>::new()
        .expect("repository")
        .create(connection, &mut record)
        .await
        .expect("create student");

    record
}

#[tokio::test]
async fn test_round_trip_through_three_tables() {
    let database = database().await.expect("database");
    let mut connection = database.acquire().await.expect("connection");
    let assistants = Repository::<teaching_assistant::Entity>::new().expect("repository");

    let mut record = Tracked::<teaching_assistant::Entity>::new(teaching_assistant::Model {
        user_id: -1,
        email: "o'brien@example.edu".to_string(),
        joined: 2023,
        photo: Some(vec![0x89, 0x50, 0x4e, 0x47]),
        student_id: -1,
        name: "Robert'); DROP TABLE Student;--".to_string(),
        semester: 3,
        gpa: 3.5,
        nickname: Some("Bobby".to_string()),
        assistant_id: -1,
        course: "CENG 351".to_string(),
    });
    assistants
        .create(&mut connection, &mut record)
        .await
        .expect("create");

    assert_eq!(record.state(), Lifecycle::Persisted);
    assert!(!record.is_dirty());

    let id = record.assistant_id;
    assert!(id > 0);
    assert_eq!(record.user_id, id);
    assert_eq!(record.student_id, id);

    let fetched = assistants.fetch(&mut connection, id).await.expect("fetch");

    assert_eq!(fetched.state(), Lifecycle::Persisted);
    assert!(!fetched.is_dirty());
    assert_eq!(fetched.model(), record.model());
}

#[tokio::test]
async fn test_fields_land_in_their_owning_table() {
    let database = database().await.expect("database");
    let mut connection = database.acquire().await.expect("connection");

    let record = create_student(&mut connection, "ada@example.edu", "Ada").await;

    let (email, joined): (String, i64) =
        sqlx::query_as("SELECT email, joined FROM User_ WHERE user_id = ?")
            .bind(record.user_id)
            .fetch_one(&mut *connection)
            .await
            .expect("user row");
    assert_eq!(email, "ada@example.edu");
    assert_eq!(joined, 2024);

    let (name, semester): (String, i64) =
        sqlx::query_as("SELECT name_, semester FROM Student WHERE student_id = ?")
            .bind(record.student_id)
            .fetch_one(&mut *connection)
            .await
            .expect("student row");
    assert_eq!(name, "Ada");
    assert_eq!(semester, 1);

    let students = Repository::<student::Entity>::new().expect("repository");
    let tree = students.tree();
    assert_eq!(tree.owner_of("email").map(|e| e.table), Some("User_"));
    assert_eq!(tree.owner_of("name_").map(|e| e.table), Some("Student"));
    assert_eq!(
        tree.unique_fields(),
        &["student_id", "name_", "semester", "gpa", "nickname"]
    );
}

#[tokio::test]
async fn test_partial_update_writes_only_changed_columns() {
    let database = database().await.expect("database");
    let mut connection = database.acquire().await.expect("connection");
    let students = Repository::<student::Entity>::new().expect("repository");

    let created = create_student(&mut connection, "ada@example.edu", "Ada").await;
    let mut record = students
        .fetch(&mut connection, created.student_id)
        .await
        .expect("fetch");

    // Changed behind the mapper's back, must survive the update below.
    sqlx::query("UPDATE Student SET semester = 5 WHERE student_id = ?")
        .bind(record.student_id)
        .execute(&mut *connection)
        .await
        .expect("raw update");

    record
        .set::<student::columns::Email>("lovelace@example.edu".to_string())
        .expect("assignable");
    students
        .update(&mut connection, &mut record)
        .await
        .expect("update");

    assert!(!record.is_dirty());

    let stored = students
        .fetch(&mut connection, record.student_id)
        .await
        .expect("fetch");
    assert_eq!(stored.email, "lovelace@example.edu");
    assert_eq!(stored.semester, 5);
    assert_eq!(stored.name, "Ada");
    assert_eq!(stored.joined, 2024);
}

#[tokio::test]
async fn test_update_issues_one_statement_per_owning_table() {
    let database = database().await.expect("database");
    let mut connection = database.acquire().await.expect("connection");
    let students = Repository::<student::Entity>::new().expect("repository");

    let mut record = create_student(&mut connection, "ada@example.edu", "Ada").await;

    record
        .set::<student::columns::Email>("first@example.edu".to_string())
        .and_then(|r| r.set::<student::columns::Name>("Augusta".to_string()))
        .and_then(|r| r.set_value("email", "second@example.edu"))
        .expect("assignable");

    assert_eq!(
        record.changes(),
        &[
            ("email", Value::from("second@example.edu")),
            ("name_", Value::from("Augusta")),
        ]
    );

    let plan = students.plan_update(&record).expect("plan");
    let plan = plan
        .iter()
        .map(|(statement, entity, id)| (query(statement), entity.table, *id))
        .collect::<Vec<_>>();

    assert_eq!(
        plan,
        vec![
            (
                "UPDATE \"User_\" SET \"email\" = ? WHERE \"user_id\" = ?".to_string(),
                "User_",
                record.user_id
            ),
            (
                "UPDATE \"Student\" SET \"name_\" = ? WHERE \"student_id\" = ?".to_string(),
                "Student",
                record.student_id
            ),
        ]
    );

    students
        .update(&mut connection, &mut record)
        .await
        .expect("update");

    let stored = students
        .fetch(&mut connection, record.student_id)
        .await
        .expect("fetch");
    assert_eq!(stored.email, "second@example.edu");
    assert_eq!(stored.name, "Augusta");
}

#[tokio::test]
async fn test_fetch_where_on_ancestor_column_is_an_inner_join() {
    let database = database().await.expect("database");
    let mut connection = database.acquire().await.expect("connection");
    let users = Repository::<user::Entity>::new().expect("repository");
    let students = Repository::<student::Entity>::new().expect("repository");

    let mut plain = Tracked::<user::Entity>::new(user::Model {
        user_id: -1,
        email: "plain@example.edu".to_string(),
        joined: 2024,
        photo: None,
    });
    users.create(&mut connection, &mut plain).await.expect("user");

    let first = create_student(&mut connection, "ada@example.edu", "Ada").await;
    let second = create_student(&mut connection, "alan@example.edu", "Alan").await;

    let found = students
        .fetch_where(&mut connection, "joined", 2024)
        .await
        .expect("fetch_where");
    assert_eq!(
        found.iter().map(|s| s.student_id).collect::<Vec<_>>(),
        vec![first.student_id, second.student_id]
    );

    assert_eq!(
        users
            .fetch_where(&mut connection, "joined", 2024)
            .await
            .expect("fetch_where")
            .len(),
        3
    );

    assert!(
        !students
            .has_where(&mut connection, "email", "plain@example.edu")
            .await
            .expect("has_where")
    );
    assert!(
        students
            .has_where(&mut connection, "name_", "Alan")
            .await
            .expect("has_where")
    );
    assert!(
        students
            .fetch_where(&mut connection, "joined", 1999)
            .await
            .expect("fetch_where")
            .is_empty()
    );
}

#[tokio::test]
async fn test_unknown_criteria_column() {
    let database = database().await.expect("database");
    let mut connection = database.acquire().await.expect("connection");
    let students = Repository::<student::Entity>::new().expect("repository");

    create_student(&mut connection, "ada@example.edu", "Ada").await;

    assert!(matches!(
        students
            .fetch_where(&mut connection, "email\" OR 1=1 --", "x")
            .await,
        Err(Error::MalformedCriteria { entity: "Student", .. })
    ));
    assert!(
        !students
            .has_where(&mut connection, "shoe_size", 42)
            .await
            .expect("has_where")
    );
}

#[tokio::test]
async fn test_delete_leaves_ancestor_rows() {
    let database = database().await.expect("database");
    let mut connection = database.acquire().await.expect("connection");
    let users = Repository::<user::Entity>::new().expect("repository");
    let students = Repository::<student::Entity>::new().expect("repository");

    let mut record = create_student(&mut connection, "ada@example.edu", "Ada").await;
    let id = record.student_id;

    students
        .delete(&mut connection, &mut record)
        .await
        .expect("delete");

    assert_eq!(record.state(), Lifecycle::Deleted);
    assert!(!students.has(&mut connection, id).await.expect("has"));
    assert!(users.has(&mut connection, id).await.expect("has"));
    assert!(matches!(
        students.fetch(&mut connection, id).await,
        Err(Error::NotFound { table: "Student", .. })
    ));

    assert!(matches!(
        record.set::<student::columns::Semester>(2),
        Err(Error::InvalidState { .. })
    ));
    assert!(matches!(
        students.update(&mut connection, &mut record).await,
        Err(Error::InvalidState { .. })
    ));
    assert!(matches!(
        students.delete(&mut connection, &mut record).await,
        Err(Error::InvalidState { .. })
    ));
}

#[tokio::test]
async fn test_lifecycle_violations() {
    let database = database().await.expect("database");
    let mut connection = database.acquire().await.expect("connection");
    let students = Repository::<student::Entity>::new().expect("repository");

    let mut unsaved = Tracked::<student::Entity>::new(student("ada@example.edu", "Ada"));
    assert!(matches!(
        students.update(&mut connection, &mut unsaved).await,
        Err(Error::InvalidState {
            state: Lifecycle::Unsaved,
            ..
        })
    ));
    assert!(matches!(
        students.delete(&mut connection, &mut unsaved).await,
        Err(Error::InvalidState { .. })
    ));

    let mut persisted = create_student(&mut connection, "alan@example.edu", "Alan").await;
    assert!(matches!(
        students.create(&mut connection, &mut persisted).await,
        Err(Error::InvalidState {
            state: Lifecycle::Persisted,
            ..
        })
    ));
    assert!(matches!(
        persisted.set_value("student_id", 77_i64),
        Err(Error::InvalidState { .. })
    ));
    assert!(matches!(
        persisted.set_value("user_id", 77_i64),
        Err(Error::InvalidState { .. })
    ));
}

#[tokio::test]
async fn test_create_is_atomic_across_the_chain() {
    let database = database().await.expect("database");
    let mut connection = database.acquire().await.expect("connection");
    let students = Repository::<student::Entity>::new().expect("repository");

    let mut invalid = Tracked::<student::Entity>::new(student::Model {
        semester: 0,
        ..student("ada@example.edu", "Ada")
    });

    assert!(matches!(
        students.create(&mut connection, &mut invalid).await,
        Err(Error::ConstraintViolation(_))
    ));
    assert_eq!(invalid.state(), Lifecycle::Unsaved);

    let (users,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM User_")
        .fetch_one(&mut *connection)
        .await
        .expect("count");
    assert_eq!(users, 0);
}

#[tokio::test]
async fn test_create_unique_on_existing_ancestor() {
    let database = database().await.expect("database");
    let mut connection = database.acquire().await.expect("connection");
    let users = Repository::<user::Entity>::new().expect("repository");
    let students = Repository::<student::Entity>::new().expect("repository");

    let mut base = Tracked::<user::Entity>::new(user::Model {
        user_id: -1,
        email: "grace@example.edu".to_string(),
        joined: 2020,
        photo: None,
    });
    users.create(&mut connection, &mut base).await.expect("user");

    let values = || {
        vec![
            Value::from(base.user_id),
            Value::from("Grace"),
            Value::from(4),
            Value::from(3.9),
            Value::from(None::<String>),
        ]
    };

    let record = students
        .create_unique(&mut connection, values())
        .await
        .expect("create_unique");

    assert_eq!(record.student_id, base.user_id);
    assert_eq!(record.email, "grace@example.edu");
    assert_eq!(record.name, "Grace");
    assert_eq!(record.nickname, None);

    assert!(matches!(
        students.create_unique(&mut connection, values()).await,
        Err(Error::ConstraintViolation(_))
    ));
    assert!(matches!(
        students
            .create_unique(&mut connection, vec![Value::from(base.user_id)])
            .await,
        Err(Error::FieldCount {
            expected: 5,
            found: 1
        })
    ));
}

#[tokio::test]
async fn test_missing_rows_are_reported() {
    let database = database().await.expect("database");
    let mut connection = database.acquire().await.expect("connection");
    let students = Repository::<student::Entity>::new().expect("repository");

    let mut record = create_student(&mut connection, "ada@example.edu", "Ada").await;
    let id = record.student_id;

    sqlx::query("DELETE FROM Student WHERE student_id = ?")
        .bind(id)
        .execute(&mut *connection)
        .await
        .expect("raw delete");

    record
        .set::<student::columns::Email>("lovelace@example.edu".to_string())
        .and_then(|r| r.set::<student::columns::Semester>(2))
        .expect("assignable");
    assert!(matches!(
        students.update(&mut connection, &mut record).await,
        Err(Error::NotFound { table: "Student", .. })
    ));
    assert!(record.is_dirty());

    let (email,): (String,) = sqlx::query_as("SELECT email FROM User_ WHERE user_id = ?")
        .bind(id)
        .fetch_one(&mut *connection)
        .await
        .expect("user row");
    assert_eq!(email, "ada@example.edu");

    let orphan = create_student(&mut connection, "alan@example.edu", "Alan").await;
    sqlx::query("PRAGMA foreign_keys = OFF")
        .execute(&mut *connection)
        .await
        .expect("pragma");
    sqlx::query("DELETE FROM User_ WHERE user_id = ?")
        .bind(orphan.user_id)
        .execute(&mut *connection)
        .await
        .expect("raw delete");

    assert!(matches!(
        students.fetch(&mut connection, orphan.student_id).await,
        Err(Error::NotFound { table: "User_", .. })
    ));
}
