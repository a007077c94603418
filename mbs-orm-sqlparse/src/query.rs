use sqlparser::{
    ast::Statement,
    dialect::SQLiteDialect,
    parser::{Parser, ParserError},
};

use crate::schema::{SqlSchema, SqlTable};

/// Parse every `CREATE TABLE` statement of an SQL script. Other statements are skipped.
///
/// # Errors
///
/// If the script is not valid SQLite syntax.
pub fn parse_tables(script: &str) -> Result<Vec<SqlTable>, ParserError> {
    let ast = Parser::parse_sql(&SQLiteDialect {}, script)?;

    Ok(ast
        .iter()
        .filter_map(|e| {
            if let Statement::CreateTable(statement) = e {
                Some(SqlTable::from(statement))
            } else {
                None
            }
        })
        .collect())
}

/// Parse a whole schema script.
///
/// # Errors
///
/// If the script is not valid SQLite syntax.
pub fn parse_schema(script: &str) -> Result<SqlSchema, ParserError> {
    Ok(SqlSchema {
        tables: parse_tables(script)?,
    })
}

#[cfg(test)]
mod test {
    use super::{parse_schema, parse_tables};

    #[test]
    fn test_create_table() {
        let query = "CREATE TABLE `test`(
          `id` INTEGER NOT NULL PRIMARY KEY,
          `name` TEXT NOT NULL,
          `something_nullable` TEXT
        )";

        let parsed = parse_tables(query).expect("Failed to parse query");
        let [parsed] = parsed.as_slice() else {
            panic!("expected exactly one table");
        };

        assert_eq!(parsed.name, "test");
        assert_eq!(parsed.primary_key.as_deref(), Some("id"));
        assert!(
            parsed
                .columns
                .iter()
                .any(|e| e.name.eq("id") && !e.nullable)
        );
        assert!(
            parsed
                .columns
                .iter()
                .any(|e| e.name.eq("something_nullable") && e.nullable)
        );
    }

    #[test]
    fn test_inheritance_script() {
        let script = "
            CREATE TABLE User_ (
                user_id INTEGER PRIMARY KEY,
                email TEXT NOT NULL UNIQUE
            );
            CREATE TABLE Student (
                student_id INTEGER NOT NULL,
                semester INTEGER NOT NULL,
                PRIMARY KEY (student_id),
                FOREIGN KEY (student_id) REFERENCES User_ (user_id)
            );
            INSERT INTO User_ (email) VALUES ('a@b.c');
        ";

        let schema = parse_schema(script).expect("Failed to parse script");

        assert_eq!(schema.tables.len(), 2);

        let user = schema.find_table("User_").expect("User_ table");
        assert!(user.find_column("email").is_some_and(|c| c.unique && !c.nullable));

        let student = schema.find_table("Student").expect("Student table");
        assert_eq!(student.primary_key.as_deref(), Some("student_id"));

        let foreign_key = student
            .find_column("student_id")
            .and_then(|c| c.foreign_key.clone())
            .expect("foreign key");
        assert_eq!(foreign_key.target_table, "User_");
        assert_eq!(foreign_key.target_column, "user_id");
    }
}
