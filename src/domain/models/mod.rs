pub mod actor;
pub mod role_profile;
pub mod views;
