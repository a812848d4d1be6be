//! # Limpieza Service
//!
//! Workforce management service for a municipal cleaning operation:
//! users and their role profiles, crews (cuadrillas), neighborhoods,
//! cleaning activities and photo evidence.
//!
//! ## Architecture
//!
//! The project follows Clean Architecture principles:
//!
//! - **domain**: Actor context, role profiles and read models
//! - **application**: Workflow services (identity, crews, activities, evidence, audit)
//! - **infrastructure**: Database entities and migrations, crypto, evidence storage
//! - **interfaces**: REST API with Swagger documentation
//! - **shared**: Error types used across layers

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod interfaces;
pub mod shared;

pub use config::{default_config_path, AppConfig};

// Re-export database types for easy access
pub use infrastructure::{init_database, DatabaseConfig};

// Re-export API router
pub use interfaces::http::create_api_router;
