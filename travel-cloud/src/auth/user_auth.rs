//! User JWT authentication

use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use shared::error::{AppError, ErrorCode};
use shared::models::UserRole;

use crate::state::AppState;

/// JWT claims for user authentication
#[derive(Debug, Serialize, Deserialize)]
pub struct UserClaims {
    /// User ID
    pub sub: String,
    pub email: String,
    pub role: UserRole,
    /// Expiration (Unix timestamp seconds)
    pub exp: usize,
    /// Issued at (Unix timestamp seconds)
    pub iat: usize,
}

/// Authenticated user extracted from JWT
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub user_id: i64,
    pub email: String,
    pub role: UserRole,
}

impl CurrentUser {
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

const JWT_EXPIRY_HOURS: i64 = 24;

pub fn create_token(
    user_id: i64,
    email: &str,
    role: UserRole,
    secret: &str,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = chrono::Utc::now();
    let claims = UserClaims {
        sub: user_id.to_string(),
        email: email.to_string(),
        role,
        exp: (now + chrono::Duration::hours(JWT_EXPIRY_HOURS)).timestamp() as usize,
        iat: now.timestamp() as usize,
    };

    jsonwebtoken::encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

/// Verify a bearer token and build the user identity
pub fn verify_token(token: &str, secret: &str) -> Result<CurrentUser, AppError> {
    let token_data = jsonwebtoken::decode::<UserClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| {
        tracing::debug!("JWT validation failed: {e}");
        match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => AppError::token_expired(),
            _ => AppError::invalid_token("Invalid token"),
        }
    })?;

    let user_id = token_data
        .claims
        .sub
        .parse()
        .map_err(|_| AppError::invalid_token("Invalid token subject"))?;

    Ok(CurrentUser {
        user_id,
        email: token_data.claims.email,
        role: token_data.claims.role,
    })
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Identity for public routes that accept, but do not require, a token.
/// A missing or invalid token yields `None`.
pub fn optional_user(headers: &HeaderMap, secret: &str) -> Option<CurrentUser> {
    let token = bearer_token(headers)?;
    match verify_token(token, secret) {
        Ok(user) => Some(user),
        Err(e) => {
            tracing::debug!(code = %e.code, "Ignoring invalid bearer token on public route");
            None
        }
    }
}

fn authenticate(state: &AppState, request: &Request) -> Result<CurrentUser, AppError> {
    let token = bearer_token(request.headers()).ok_or_else(AppError::not_authenticated)?;
    verify_token(token, &state.jwt_secret)
}

/// Middleware: any signed-in user
pub async fn require_user(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let user = authenticate(&state, &request)?;
    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

/// Middleware: admin role required
pub async fn require_admin(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let user = authenticate(&state, &request)?;
    if !user.is_admin() {
        tracing::warn!(user_id = user.user_id, uri = %request.uri(), "Admin route denied");
        return Err(AppError::new(ErrorCode::AdminRequired));
    }
    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret";

    #[test]
    fn test_token_roundtrip() {
        let token = create_token(12, "ana@example.com", UserRole::Customer, SECRET).unwrap();
        let user = verify_token(&token, SECRET).unwrap();
        assert_eq!(user.user_id, 12);
        assert_eq!(user.email, "ana@example.com");
        assert!(!user.is_admin());
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = create_token(1, "admin@example.com", UserRole::Admin, SECRET).unwrap();
        let err = verify_token(&token, "other-secret").unwrap_err();
        assert_eq!(err.code, ErrorCode::TokenInvalid);
    }

    #[test]
    fn test_expired_token() {
        let now = chrono::Utc::now().timestamp() as usize;
        let claims = UserClaims {
            sub: "1".into(),
            email: "a@example.com".into(),
            role: UserRole::Customer,
            exp: now - 3600,
            iat: now - 7200,
        };
        let token = jsonwebtoken::encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();
        assert_eq!(
            verify_token(&token, SECRET).unwrap_err().code,
            ErrorCode::TokenExpired
        );
    }

    #[test]
    fn test_optional_user() {
        let mut headers = HeaderMap::new();
        assert!(optional_user(&headers, SECRET).is_none());

        headers.insert(http::header::AUTHORIZATION, "Bearer garbage".parse().unwrap());
        assert!(optional_user(&headers, SECRET).is_none());

        let token = create_token(5, "c@example.com", UserRole::Customer, SECRET).unwrap();
        headers.insert(
            http::header::AUTHORIZATION,
            format!("Bearer {token}").parse().unwrap(),
        );
        assert_eq!(optional_user(&headers, SECRET).unwrap().user_id, 5);
    }
}
