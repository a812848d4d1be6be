//! JWT authentication middleware for Axum

use axum::{
    body::Body,
    extract::State,
    http::{header, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use jsonwebtoken::errors::ErrorKind;
use serde_json::json;

use crate::domain::{Actor, UserRole};
use crate::infrastructure::crypto::jwt::{verify_token, Claims, JwtConfig};

/// Authentication error types
#[derive(Debug)]
pub enum AuthError {
    MissingToken,
    InvalidToken,
    ExpiredToken,
}

/// Authentication state shared by all protected routes
#[derive(Clone)]
pub struct AuthState {
    pub jwt_config: JwtConfig,
}

/// Authenticated user information decoded from a JWT
#[derive(Clone, Debug)]
pub struct AuthenticatedUser {
    pub user_id: i32,
    pub name: String,
    pub role: UserRole,
}

impl AuthenticatedUser {
    /// Returns `None` when the token's subject or role claim does not
    /// decode to a known user shape.
    pub fn from_claims(claims: &Claims) -> Option<Self> {
        Some(Self {
            user_id: claims.sub.parse().ok()?,
            name: claims.name.clone(),
            role: UserRole::parse(&claims.role)?,
        })
    }

    pub fn actor(&self) -> Actor {
        Actor::new(self.user_id, self.role)
    }

    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

fn extract_token(auth_header: &str) -> Option<&str> {
    auth_header.strip_prefix("Bearer ")
}

/// JWT authentication middleware
pub async fn auth_middleware(
    State(auth_state): State<AuthState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .map(String::from);
    let Some(auth_header) = auth_header else {
        return auth_error_response(AuthError::MissingToken);
    };

    let Some(token) = extract_token(&auth_header) else {
        return auth_error_response(AuthError::InvalidToken);
    };

    match verify_token(token, &auth_state.jwt_config) {
        Ok(claims) => match AuthenticatedUser::from_claims(&claims) {
            Some(user) => {
                request.extensions_mut().insert(user);
                next.run(request).await
            }
            None => auth_error_response(AuthError::InvalidToken),
        },
        Err(e) if matches!(e.kind(), ErrorKind::ExpiredSignature) => {
            auth_error_response(AuthError::ExpiredToken)
        }
        Err(_) => auth_error_response(AuthError::InvalidToken),
    }
}

fn auth_error_response(error: AuthError) -> Response {
    let (status, message) = match error {
        AuthError::MissingToken => (StatusCode::UNAUTHORIZED, "Missing authentication token"),
        AuthError::InvalidToken => (StatusCode::UNAUTHORIZED, "Invalid authentication token"),
        AuthError::ExpiredToken => (StatusCode::UNAUTHORIZED, "Token has expired"),
    };

    let body = Json(json!({
        "success": false,
        "error": message
    }));

    (status, body).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::crypto::jwt::create_token;

    fn config() -> JwtConfig {
        JwtConfig {
            secret: "test-secret".to_string(),
            expiration_hours: 1,
            issuer: "limpieza-service".to_string(),
        }
    }

    #[test]
    fn claims_decode_to_authenticated_user() {
        let token = create_token(7, "Ana", "crew_leader", &config()).unwrap();
        let claims = verify_token(&token, &config()).unwrap();

        let user = AuthenticatedUser::from_claims(&claims).unwrap();
        assert_eq!(user.user_id, 7);
        assert_eq!(user.role, UserRole::CrewLeader);
        assert!(!user.is_admin());
    }

    #[test]
    fn unknown_role_claim_is_rejected() {
        let token = create_token(7, "Ana", "intern", &config()).unwrap();
        let claims = verify_token(&token, &config()).unwrap();

        assert!(AuthenticatedUser::from_claims(&claims).is_none());
    }
}
