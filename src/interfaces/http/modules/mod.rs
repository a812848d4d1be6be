//! API modules, one per resource

pub mod activities;
pub mod audit;
pub mod auth;
pub mod crews;
pub mod evidence;
pub mod health;
pub mod users;
