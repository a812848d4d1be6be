pub mod service;

pub use service::{AuthResult, IdentityService};
