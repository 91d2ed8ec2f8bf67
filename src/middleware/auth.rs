use axum::{
    extract::Request,
    http::{header, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::user::UserRole;
use crate::utils::cookie::{read_cookie, AUTH_COOKIE};

pub const EMPLOYER_ROLES: &[&str] = &["employer", "admin"];
pub const APPLICANT_ROLES: &[&str] = &["seeker", "student"];
pub const ADMIN_ROLES: &[&str] = &["admin"];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
    pub iat: usize,
    pub role: Option<String>,
}

impl Claims {
    pub fn user_id(&self) -> Result<Uuid> {
        Uuid::parse_str(&self.sub).map_err(|_| Error::Unauthorized("invalid_subject".into()))
    }

    pub fn role(&self) -> Option<UserRole> {
        self.role.as_deref().and_then(|r| r.parse().ok())
    }

    pub fn is_admin(&self) -> bool {
        self.role() == Some(UserRole::Admin)
    }
}

pub fn issue_token(user_id: Uuid, role: &str, secret: &str, ttl_hours: i64) -> Result<String> {
    let now = Utc::now();
    let claims = Claims {
        sub: user_id.to_string(),
        iat: now.timestamp() as usize,
        exp: (now + Duration::hours(ttl_hours)).timestamp() as usize,
        role: Some(role.to_string()),
    };
    let token = encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;
    Ok(token)
}

pub fn decode_token(token: &str, secret: &str) -> Result<Claims> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )?;
    Ok(data.claims)
}

/// Bearer header wins over the session cookie.
pub fn token_from_headers(headers: &HeaderMap) -> std::result::Result<String, Error> {
    if let Some(auth_header) = headers.get(header::AUTHORIZATION) {
        let auth_str = auth_header
            .to_str()
            .map_err(|_| Error::Unauthorized("bad_authorization".into()))?;
        let token = auth_str
            .strip_prefix("Bearer ")
            .ok_or_else(|| Error::Unauthorized("unsupported_scheme".into()))?;
        return Ok(token.trim().to_string());
    }
    read_cookie(headers, AUTH_COOKIE).ok_or_else(|| Error::Unauthorized("missing_authorization".into()))
}

pub fn authenticate(headers: &HeaderMap) -> Result<Claims> {
    let token = token_from_headers(headers)?;
    authenticate_token(&token)
}

pub fn authenticate_token(token: &str) -> Result<Claims> {
    let config = crate::config::get_config();
    decode_token(token, &config.jwt_secret)
        .map_err(|_| Error::Unauthorized("invalid_token".into()))
}

/// Claims when the request carries a valid token; anonymous otherwise.
pub fn optional_claims(headers: &HeaderMap) -> Option<Claims> {
    authenticate(headers).ok()
}

pub async fn require_auth(mut req: Request, next: Next) -> Response {
    match authenticate(req.headers()) {
        Ok(claims) => {
            req.extensions_mut().insert(claims);
            next.run(req).await
        }
        Err(err) => err.into_response(),
    }
}

pub async fn require_roles(mut req: Request, next: Next, allowed: &[&str]) -> Response {
    match authenticate(req.headers()) {
        Ok(claims) => {
            let role = claims.role.clone().unwrap_or_default();
            if !allowed.is_empty() && !allowed.iter().any(|r| r.eq_ignore_ascii_case(&role)) {
                return Error::Forbidden("forbidden".into()).into_response();
            }
            req.extensions_mut().insert(claims);
            next.run(req).await
        }
        Err(err) => err.into_response(),
    }
}

pub async fn require_employer(req: Request, next: Next) -> Response {
    require_roles(req, next, EMPLOYER_ROLES).await
}

pub async fn require_applicant(req: Request, next: Next) -> Response {
    require_roles(req, next, APPLICANT_ROLES).await
}

pub async fn require_admin(req: Request, next: Next) -> Response {
    require_roles(req, next, ADMIN_ROLES).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    const SECRET: &str = "unit-test-secret";

    #[test]
    fn issued_tokens_decode_with_subject_and_role() {
        let user_id = Uuid::new_v4();
        let token = issue_token(user_id, "employer", SECRET, 1).unwrap();
        let claims = decode_token(&token, SECRET).unwrap();
        assert_eq!(claims.user_id().unwrap(), user_id);
        assert_eq!(claims.role(), Some(UserRole::Employer));
        assert!(!claims.is_admin());
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = issue_token(Uuid::new_v4(), "seeker", SECRET, 1).unwrap();
        assert!(decode_token(&token, "other-secret").is_err());
    }

    #[test]
    fn expired_tokens_are_rejected() {
        let token = issue_token(Uuid::new_v4(), "seeker", SECRET, -2).unwrap();
        assert!(decode_token(&token, SECRET).is_err());
    }

    #[test]
    fn bearer_header_takes_precedence_over_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer from-header"));
        headers.insert(header::COOKIE, HeaderValue::from_static("token=from-cookie"));
        assert_eq!(token_from_headers(&headers).unwrap(), "from-header");

        headers.remove(header::AUTHORIZATION);
        assert_eq!(token_from_headers(&headers).unwrap(), "from-cookie");
    }

    #[test]
    fn non_bearer_scheme_is_rejected() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert!(matches!(
            token_from_headers(&headers),
            Err(Error::Unauthorized(msg)) if msg == "unsupported_scheme"
        ));
        assert!(token_from_headers(&HeaderMap::new()).is_err());
    }
}
