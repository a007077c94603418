mod advising;
mod board;
mod dissertations;
mod proposals;
mod theses;
mod users;
mod voting;

use mbs_orm::{Repository, entity::inheritance::InheritanceTree};

use crate::{
    entity::{
        advisor, dbr, defending, department, dissertation, evaluation, has, instructor, jury, member,
        proposal, recommended, student, thesis, user,
    },
    error::Result,
};

pub use dissertations::DissertationInfo;
pub use theses::thesis_title;
pub use users::{NewJury, Role, UserClass};
pub use voting::{Decision, DissertationStatus, Tally};

/// Password hash stored for jury members registered through [`Catalog::add_new_jury`].
pub const PLACEHOLDER_PASSWORD_HASH: &str =
    "$pbkdf2-sha256$29000$xNh7j3HunXMuxRgDAGBMyQ$Z8D9vpTaauX/jIxrgxtCkba83F/rVI1LeYAtpHCIhRg";

/// One repository per entity type, built once at start-up, plus the workflows combining them.
///
/// Every workflow takes the connection (or transaction) to run on.
pub struct Catalog {
    pub departments: Repository<department::Entity>,
    pub users: Repository<user::Entity>,
    pub advisors: Repository<advisor::Entity>,
    pub juries: Repository<jury::Entity>,
    pub students: Repository<student::Entity>,
    pub dbrs: Repository<dbr::Entity>,
    pub theses: Repository<thesis::Entity>,
    pub dissertations: Repository<dissertation::Entity>,
    pub members: Repository<member::Entity>,
    pub defendings: Repository<defending::Entity>,
    pub has: Repository<has::Entity>,
    pub evaluations: Repository<evaluation::Entity>,
    pub instructors: Repository<instructor::Entity>,
    pub recommendations: Repository<recommended::Entity>,
    pub proposals: Repository<proposal::Entity>,
}

impl Catalog {
    /// # Errors
    ///
    /// [`mbs_orm::Error::MalformedModel`] if an entity's inheritance chain is inconsistent.
    pub fn new() -> Result<Self> {
        Ok(Self {
            departments: Repository::new()?,
            users: Repository::new()?,
            advisors: Repository::new()?,
            juries: Repository::new()?,
            students: Repository::new()?,
            dbrs: Repository::new()?,
            theses: Repository::new()?,
            dissertations: Repository::new()?,
            members: Repository::new()?,
            defendings: Repository::new()?,
            has: Repository::new()?,
            evaluations: Repository::new()?,
            instructors: Repository::new()?,
            recommendations: Repository::new()?,
            proposals: Repository::new()?,
        })
    }

    /// The inheritance trees of every entity type, user types first.
    #[must_use]
    pub fn trees(&self) -> Vec<&InheritanceTree> {
        vec![
            self.users.tree(),
            self.advisors.tree(),
            self.juries.tree(),
            self.students.tree(),
            self.dbrs.tree(),
            self.departments.tree(),
            self.theses.tree(),
            self.dissertations.tree(),
            self.members.tree(),
            self.defendings.tree(),
            self.has.tree(),
            self.evaluations.tree(),
            self.instructors.tree(),
            self.recommendations.tree(),
            self.proposals.tree(),
        ]
    }
}
