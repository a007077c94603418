//! The persisted entity types. Every user kind extends [`user`], every other type stands alone.

pub mod advisor;
pub mod dbr;
pub mod defending;
pub mod department;
pub mod dissertation;
pub mod evaluation;
pub mod has;
pub mod instructor;
pub mod jury;
pub mod member;
pub mod proposal;
pub mod recommended;
pub mod student;
pub mod thesis;
pub mod user;

/// The fields every kind of user inherits from [`user::Model`].
pub trait UserFields {
    fn user_id(&self) -> i64;

    fn department_id(&self) -> i64;

    fn first_name(&self) -> &str;

    fn surname(&self) -> &str;

    fn full_name(&self) -> String {
        format!("{} {}", self.first_name(), self.surname())
    }
}

macro_rules! impl_user_fields {
    ($($model:path),* $(,)?) => {
        $(
            impl UserFields for $model {
                fn user_id(&self) -> i64 {
                    self.user_id
                }

                fn department_id(&self) -> i64 {
                    self.department_id
                }

                fn first_name(&self) -> &str {
                    &self.name
                }

                fn surname(&self) -> &str {
                    &self.surname
                }
            }
        )*
    };
}

impl_user_fields!(
    user::Model,
    advisor::Model,
    jury::Model,
    student::Model,
    dbr::Model,
);
