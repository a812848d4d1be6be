//! Role as a tagged union over profile state
//!
//! A user's role and their profile rows are stored in parallel tables, but
//! consumers should reason about them as one variant: either the matching
//! profile is present, or the role carries none. The identity service
//! guarantees the mapping after every mutation.

use crate::infrastructure::database::entities::{crew_leader, employee};

#[derive(Debug, Clone)]
pub enum RoleProfile {
    Employee(employee::Model),
    CrewLeader(crew_leader::Model),
    Admin,
    SuperAdmin,
}

impl RoleProfile {
    pub fn as_employee(&self) -> Option<&employee::Model> {
        match self {
            RoleProfile::Employee(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_crew_leader(&self) -> Option<&crew_leader::Model> {
        match self {
            RoleProfile::CrewLeader(l) => Some(l),
            _ => None,
        }
    }
}
