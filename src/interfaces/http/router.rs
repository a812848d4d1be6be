//! API Router with Swagger UI

use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use crate::application::{ActivityService, AuditLog, CrewService, EvidenceService, IdentityService};
use crate::infrastructure::crypto::jwt::JwtConfig;
use crate::interfaces::http::common::ApiResponse;
use crate::interfaces::http::middleware::{auth_middleware, AuthState};
use crate::interfaces::http::modules::{activities, audit, auth, crews, evidence, health, users};

/// All application services the HTTP layer fans out to.
#[derive(Clone)]
pub struct AppServices {
    pub identity: Arc<IdentityService>,
    pub crews: Arc<CrewService>,
    pub activities: Arc<ActivityService>,
    pub evidence: Arc<EvidenceService>,
    pub audit: Arc<AuditLog>,
}

/// Security scheme modifier for OpenAPI
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("JWT Bearer token"))
                        .build(),
                ),
            );
        }
    }
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        // Health
        health::health_check,
        // Auth
        auth::login,
        auth::register,
        auth::get_current_user,
        // Users
        users::list_users,
        users::list_employees,
        users::get_user,
        users::get_role_profile,
        users::create_user,
        users::update_user,
        users::change_role,
        users::delete_user,
        // Crews
        crews::list_crews,
        crews::my_crews,
        crews::my_crew,
        crews::get_crew,
        crews::create_crew,
        crews::update_crew,
        crews::set_members,
        crews::delete_crew,
        // Activities
        activities::list_activities,
        activities::get_activity,
        activities::create_activity,
        activities::change_state,
        activities::delete_activity,
        // Evidence
        evidence::upload_evidence,
        evidence::list_evidence,
        evidence::delete_evidence,
        // Audit
        audit::list_audit,
    ),
    components(
        schemas(
            // Common
            ApiResponse<String>,
            // Health
            health::HealthResponse,
            // Auth
            auth::LoginRequest,
            auth::LoginResponse,
            auth::RegisterRequest,
            auth::UserInfo,
            // Users
            users::UserDto,
            users::CreateUserRequest,
            users::UpdateUserRequest,
            users::ChangeRoleRequest,
            users::RoleProfileDto,
            users::EmployeeProfileDto,
            users::LeaderProfileDto,
            // Crews
            crews::CrewDto,
            crews::CrewDetailDto,
            crews::CrewMemberDto,
            crews::NeighborhoodDto,
            crews::CrewRequest,
            crews::SetMembersRequest,
            // Activities
            activities::ActivityDto,
            activities::CreateActivityRequest,
            activities::ChangeStateRequest,
            // Evidence
            evidence::EvidenceDto,
            evidence::UploadReportDto,
            // Audit
            audit::AuditEntryDto,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Server health check"),
        (name = "Authentication", description = "Login (JWT) and self-service registration"),
        (name = "Users", description = "User administration and the role workflow"),
        (name = "Crews", description = "Crew composition: leader, neighborhood, members"),
        (name = "Activities", description = "Cleaning activities and their state transitions"),
        (name = "Evidence", description = "Photo evidence attached to activities"),
        (name = "Audit", description = "Append-only log of administrative actions"),
    ),
    info(
        title = "Limpieza Service API",
        version = "1.0.0",
        description = "REST API for municipal cleaning crew management",
        license(name = "MIT")
    )
)]
pub struct ApiDoc;

/// Create the API router with all routes
pub fn create_api_router(
    services: AppServices,
    jwt_config: JwtConfig,
    evidence_dir: PathBuf,
) -> Router {
    let middleware_state = AuthState { jwt_config };

    let auth_state = auth::AuthHandlerState {
        identity: services.identity.clone(),
    };

    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Auth routes (public)
    let auth_routes = Router::new()
        .route("/login", post(auth::login))
        .route("/register", post(auth::register))
        .with_state(auth_state.clone());

    // Auth routes (protected)
    let auth_protected_routes = Router::new()
        .route("/me", get(auth::get_current_user))
        .layer(middleware::from_fn_with_state(
            middleware_state.clone(),
            auth_middleware,
        ))
        .with_state(auth_state);

    // User routes (protected)
    let user_state = users::UserHandlerState {
        identity: services.identity.clone(),
    };
    let user_routes = Router::new()
        .route("/", get(users::list_users).post(users::create_user))
        .route("/employees", get(users::list_employees))
        .route(
            "/{id}",
            get(users::get_user)
                .put(users::update_user)
                .delete(users::delete_user),
        )
        .route("/{id}/role", put(users::change_role))
        .route("/{id}/profile", get(users::get_role_profile))
        .layer(middleware::from_fn_with_state(
            middleware_state.clone(),
            auth_middleware,
        ))
        .with_state(user_state);

    // Crew routes (protected)
    let crew_state = crews::CrewHandlerState {
        crews: services.crews.clone(),
    };
    let crew_routes = Router::new()
        .route("/", get(crews::list_crews).post(crews::create_crew))
        .route("/mine", get(crews::my_crews))
        .route("/my-crew", get(crews::my_crew))
        .route(
            "/{id}",
            get(crews::get_crew)
                .put(crews::update_crew)
                .delete(crews::delete_crew),
        )
        .route("/{id}/members", put(crews::set_members))
        .layer(middleware::from_fn_with_state(
            middleware_state.clone(),
            auth_middleware,
        ))
        .with_state(crew_state);

    // Activity routes (protected); evidence listing and upload nest under
    // the activity they belong to, so those two live here as well.
    let activity_state = activities::ActivityHandlerState {
        activities: services.activities.clone(),
    };
    let evidence_state = evidence::EvidenceHandlerState {
        evidence: services.evidence.clone(),
    };
    let activity_routes = Router::new()
        .route(
            "/",
            get(activities::list_activities).post(activities::create_activity),
        )
        .route(
            "/{id}",
            get(activities::get_activity).delete(activities::delete_activity),
        )
        .route("/{id}/state", put(activities::change_state))
        .layer(middleware::from_fn_with_state(
            middleware_state.clone(),
            auth_middleware,
        ))
        .with_state(activity_state);

    let activity_evidence_routes = Router::new()
        .route(
            "/{id}/evidence",
            get(evidence::list_evidence).post(evidence::upload_evidence),
        )
        .layer(middleware::from_fn_with_state(
            middleware_state.clone(),
            auth_middleware,
        ))
        .with_state(evidence_state.clone());

    let evidence_routes = Router::new()
        .route("/{id}", delete(evidence::delete_evidence))
        .layer(middleware::from_fn_with_state(
            middleware_state.clone(),
            auth_middleware,
        ))
        .with_state(evidence_state);

    // Audit routes (protected)
    let audit_state = audit::AuditHandlerState {
        audit: services.audit.clone(),
    };
    let audit_routes = Router::new()
        .route("/", get(audit::list_audit))
        .layer(middleware::from_fn_with_state(
            middleware_state,
            auth_middleware,
        ))
        .with_state(audit_state);

    let swagger_routes = SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi());

    // Build router
    Router::new()
        // Swagger UI
        .merge(swagger_routes)
        // Health
        .route("/health", get(health::health_check))
        // Stored evidence files
        .nest_service("/evidence", ServeDir::new(evidence_dir))
        // Auth
        .nest("/api/v1/auth", auth_routes)
        .nest("/api/v1/auth", auth_protected_routes)
        // Users
        .nest("/api/v1/users", user_routes)
        // Crews
        .nest("/api/v1/crews", crew_routes)
        // Activities (incl. nested evidence)
        .nest("/api/v1/activities", activity_routes)
        .nest("/api/v1/activities", activity_evidence_routes)
        // Evidence deletion
        .nest("/api/v1/evidence", evidence_routes)
        // Audit
        .nest("/api/v1/audit", audit_routes)
        // Middleware
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
