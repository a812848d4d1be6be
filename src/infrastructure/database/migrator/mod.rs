//! Database migrations module

pub use sea_orm_migration::prelude::*;

mod m20250101_000001_create_users;
mod m20250101_000002_create_neighborhoods;
mod m20250101_000003_create_crew_leaders;
mod m20250101_000004_create_crews;
mod m20250101_000005_create_employees;
mod m20250101_000006_create_activities;
mod m20250101_000007_create_evidence;
mod m20250101_000008_create_audit_log;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250101_000001_create_users::Migration),
            Box::new(m20250101_000002_create_neighborhoods::Migration),
            Box::new(m20250101_000003_create_crew_leaders::Migration),
            Box::new(m20250101_000004_create_crews::Migration),
            Box::new(m20250101_000005_create_employees::Migration),
            Box::new(m20250101_000006_create_activities::Migration),
            Box::new(m20250101_000007_create_evidence::Migration),
            Box::new(m20250101_000008_create_audit_log::Migration),
        ]
    }
}
