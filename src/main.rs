//!
//! HTTP service for managing a municipal cleaning workforce.
//! Reads configuration from TOML file (~/.config/limpieza-service/config.toml).

use std::sync::Arc;

use sea_orm_migration::MigratorTrait;
use tracing::{error, info, warn};

use limpieza::application::{
    ActivityService, AuditLog, CrewService, EvidenceService, IdentityService,
};
use limpieza::config::AppConfig;
use limpieza::infrastructure::crypto::jwt::JwtConfig;
use limpieza::infrastructure::database::migrator::Migrator;
use limpieza::infrastructure::storage::FsEvidenceStore;
use limpieza::interfaces::http::router::AppServices;
use limpieza::{create_api_router, default_config_path, init_database, DatabaseConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // ── Load configuration ─────────────────────────────────────
    let config_path = std::env::var("LIMPIEZA_CONFIG")
        .map(std::path::PathBuf::from)
        .unwrap_or_else(|_| default_config_path());
    let app_cfg = match AppConfig::load(&config_path) {
        Ok(cfg) => {
            tracing_subscriber::fmt()
                .with_env_filter(
                    tracing_subscriber::EnvFilter::try_from_default_env()
                        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cfg.logging.level)),
                )
                .init();
            info!("Configuration loaded from {}", config_path.display());
            cfg
        }
        Err(e) => {
            tracing_subscriber::fmt()
                .with_env_filter(tracing_subscriber::EnvFilter::new("info"))
                .init();
            error!("Failed to load config: {}. Using defaults.", e);
            AppConfig::default()
        }
    };

    info!("Starting Limpieza Service...");

    let db_config = DatabaseConfig {
        url: app_cfg.database.url.clone(),
    };

    let jwt_config = JwtConfig {
        secret: app_cfg.security.jwt_secret.clone(),
        expiration_hours: app_cfg.security.jwt_expiration_hours,
        issuer: "limpieza-service".to_string(),
    };
    info!(
        "JWT configured with {}h token expiration",
        jwt_config.expiration_hours
    );

    // ── Database ───────────────────────────────────────────────
    let db = match init_database(&db_config).await {
        Ok(db) => db,
        Err(e) => {
            error!("Failed to connect to database: {}", e);
            return Err(e.into());
        }
    };

    info!("Running database migrations...");
    if let Err(e) = Migrator::up(&db, None).await {
        error!("Failed to run migrations: {}", e);
        return Err(e.into());
    }
    info!("Migrations completed");

    // Create default super admin if no users exist
    create_default_admin(&db, &app_cfg).await;

    // ── Evidence storage ───────────────────────────────────────
    let store = Arc::new(FsEvidenceStore::init(app_cfg.storage.evidence_dir.clone()).await?);
    info!(
        "Evidence stored under {}",
        app_cfg.storage.evidence_dir.display()
    );

    // ── Services ───────────────────────────────────────────────
    let audit = Arc::new(AuditLog::new(db.clone()));
    let identity = Arc::new(IdentityService::new(
        db.clone(),
        audit.clone(),
        jwt_config.clone(),
    ));
    let crews = Arc::new(CrewService::new(db.clone(), audit.clone()));
    let activities = Arc::new(ActivityService::new(
        db.clone(),
        audit.clone(),
        store.clone(),
    ));
    let evidence = Arc::new(EvidenceService::new(
        db.clone(),
        audit.clone(),
        store,
        activities.clone(),
    ));

    let services = AppServices {
        identity,
        crews,
        activities,
        evidence,
        audit,
    };

    // ── REST API server ────────────────────────────────────────
    let router = create_api_router(services, jwt_config, app_cfg.storage.evidence_dir.clone());

    let addr = format!("{}:{}", app_cfg.server.host, app_cfg.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("REST API server listening on http://{}", addr);
    info!("Swagger UI available at http://{}/docs/", addr);

    let server = axum::serve(listener, router).with_graceful_shutdown(async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for shutdown signal: {}", e);
        }
        info!("Shutdown signal received");
    });

    if let Err(e) = server.await {
        error!("REST API server error: {}", e);
    }

    if let Err(e) = db.close().await {
        warn!("Error closing database connection: {}", e);
    } else {
        info!("Database connection closed");
    }

    info!("Limpieza Service shutdown complete");
    Ok(())
}

/// Create a default super admin account when the users table is empty.
async fn create_default_admin(db: &sea_orm::DatabaseConnection, app_cfg: &AppConfig) {
    use limpieza::infrastructure::crypto::password::hash_password;
    use limpieza::infrastructure::database::entities::user::{self, UserRole};
    use sea_orm::{ActiveModelTrait, EntityTrait, PaginatorTrait, Set};

    let users_count = user::Entity::find().count(db).await.unwrap_or(0);

    if users_count == 0 {
        info!("Creating default super admin user...");

        let password_hash = match hash_password(&app_cfg.admin.password) {
            Ok(hash) => hash,
            Err(e) => {
                error!("Failed to hash admin password: {}", e);
                return;
            }
        };

        let admin = user::ActiveModel {
            name: Set(app_cfg.admin.name.clone()),
            email: Set(app_cfg.admin.email.clone()),
            password_hash: Set(password_hash),
            role: Set(UserRole::SuperAdmin),
            created_at: Set(chrono::Utc::now()),
            ..Default::default()
        };

        match admin.insert(db).await {
            Ok(_) => {
                info!("Default super admin created: {}", app_cfg.admin.email);
                warn!("Please change the admin password immediately!");
            }
            Err(e) => {
                error!("Failed to create admin user: {}", e);
            }
        }
    }
}
