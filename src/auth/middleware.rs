//! JWT 认证中间件

use crate::{
    auth::jwt::{Claims, JwtService},
    error::AppError,
};
use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

const BEARER_PREFIX: &str = "Bearer ";

/// 认证身份（附加到请求扩展，仅在本次请求内有效）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedIdentity {
    pub user_id: i64,
    pub email: String,
}

impl From<Claims> for AuthenticatedIdentity {
    fn from(claims: Claims) -> Self {
        Self {
            user_id: claims.user_id,
            email: claims.email,
        }
    }
}

// 实现 FromRequestParts 以便在 handler 中直接提取 AuthenticatedIdentity
impl<S> FromRequestParts<S> for AuthenticatedIdentity
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedIdentity>()
            .cloned()
            .ok_or(AppError::Unauthorized)
    }
}

/// 从 Authorization 头提取令牌
pub fn extract_token(headers: &HeaderMap) -> Result<&str, AppError> {
    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.strip_prefix(BEARER_PREFIX))
        .ok_or(AppError::Unauthorized)
}

/// JWT 认证中间件 - 必须认证
///
/// 所有校验失败（过期、签名错误、格式错误）统一返回 401，具体原因只写日志
pub async fn jwt_auth_middleware(
    State(jwt_service): State<Arc<JwtService>>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let claims = {
        let token = match extract_token(req.headers()) {
            Ok(token) => token,
            Err(e) => {
                metrics::counter!("auth_gate_rejections_total", "reason" => "missing_token")
                    .increment(1);
                return Err(e);
            }
        };

        jwt_service.verify(token).map_err(|e| {
            tracing::debug!(reason = e.reason(), "Token rejected");
            metrics::counter!("auth_gate_rejections_total", "reason" => e.reason()).increment(1);
            AppError::Unauthorized
        })?
    };

    req.extensions_mut().insert(AuthenticatedIdentity::from(claims));

    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_token_valid() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, "Bearer test_token_123".parse().unwrap());

        let token = extract_token(&headers).unwrap();
        assert_eq!(token, "test_token_123");
    }

    #[test]
    fn test_extract_token_missing() {
        let headers = HeaderMap::new();
        assert!(extract_token(&headers).is_err());
    }

    #[test]
    fn test_extract_token_invalid_format() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, "InvalidFormat".parse().unwrap());
        assert!(extract_token(&headers).is_err());

        headers.insert(AUTHORIZATION, "Basic dXNlcjpwYXNz".parse().unwrap());
        assert!(extract_token(&headers).is_err());
    }

    #[test]
    fn test_identity_from_claims() {
        let claims = Claims {
            user_id: 7,
            email: "id@x.com".to_string(),
            iat: 0,
            exp: 1,
        };

        let identity = AuthenticatedIdentity::from(claims);
        assert_eq!(identity.user_id, 7);
        assert_eq!(identity.email, "id@x.com");
    }
}
