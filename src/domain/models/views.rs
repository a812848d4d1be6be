//! Read models assembled by the application services

use crate::infrastructure::database::entities::{activity, crew, neighborhood, user};

/// A crew with its resolved leader, neighborhood and member users.
#[derive(Debug, Clone)]
pub struct CrewDetail {
    pub crew: crew::Model,
    pub leader: Option<user::Model>,
    pub neighborhood: Option<neighborhood::Model>,
    pub members: Vec<user::Model>,
}

/// An activity with the name of the crew it belongs to.
#[derive(Debug, Clone)]
pub struct ActivityListing {
    pub activity: activity::Model,
    pub crew_name: String,
}

/// Outcome of an evidence upload batch. One bad file never aborts the
/// batch; it surfaces as a warning instead.
#[derive(Debug, Clone, Default)]
pub struct UploadReport {
    pub stored: usize,
    pub warnings: Vec<String>,
}
