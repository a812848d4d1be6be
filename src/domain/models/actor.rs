//! Actor context
//!
//! Every workflow operation receives the caller as an opaque
//! `(user id, role)` pair resolved by the authentication boundary.

use crate::infrastructure::database::entities::user::UserRole;

#[derive(Debug, Clone, Copy)]
pub struct Actor {
    pub user_id: i32,
    pub role: UserRole,
}

impl Actor {
    pub fn new(user_id: i32, role: UserRole) -> Self {
        Self { user_id, role }
    }

    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}
