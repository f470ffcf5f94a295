//! 认证服务：注册、登录、当前用户

use crate::{
    auth::{jwt::JwtService, middleware::AuthenticatedIdentity, password::PasswordHasher},
    error::AppError,
    models::{auth::*, user::*},
    repository::UserStore,
};
use std::sync::Arc;
use validator::Validate;

pub struct AuthService {
    store: Arc<dyn UserStore>,
    jwt_service: Arc<JwtService>,
    hasher: PasswordHasher,
}

impl AuthService {
    pub fn new(store: Arc<dyn UserStore>, jwt_service: Arc<JwtService>) -> Self {
        if !PasswordHasher::prepare_timing_digest() {
            tracing::warn!("Timing digest unavailable, unknown-email logins will return faster");
        }

        Self {
            store,
            jwt_service,
            hasher: PasswordHasher::new(),
        }
    }

    /// 用户注册
    pub async fn register(&self, req: RegisterRequest) -> Result<AuthResponse, AppError> {
        validate(&req)?;

        let password_hash = self.hasher.hash(&req.password)?;

        let user = self
            .store
            .create(NewUser {
                email: req.email,
                password_hash,
                name: req.name,
            })
            .await?;

        let token = self.jwt_service.issue(user.id, &user.email)?;

        tracing::info!(user_id = user.id, "User registered");

        Ok(AuthResponse {
            token,
            user: UserResponse::from(user),
        })
    }

    /// 用户登录
    ///
    /// 用户不存在与密码错误返回同一个错误，且耗时相同
    pub async fn login(&self, req: LoginRequest) -> Result<AuthResponse, AppError> {
        validate(&req)?;

        let user = match self.store.get_by_email(&req.email).await? {
            Some(user) => user,
            None => {
                self.hasher.equalize_timing(&req.password);
                return Err(login_failed());
            }
        };

        if !self.hasher.verify(&req.password, &user.password_hash) {
            return Err(login_failed());
        }

        let token = self.jwt_service.issue(user.id, &user.email)?;

        tracing::info!(user_id = user.id, "User logged in");

        Ok(AuthResponse {
            token,
            user: UserResponse::from(user),
        })
    }

    /// 获取当前用户
    pub async fn current_user(
        &self,
        identity: &AuthenticatedIdentity,
    ) -> Result<UserResponse, AppError> {
        let user = self.store.get_by_id(identity.user_id).await?.ok_or_else(|| {
            // 令牌有效但用户已不存在
            tracing::debug!(user_id = identity.user_id, "Token subject no longer exists");
            AppError::Unauthorized
        })?;

        Ok(UserResponse::from(user))
    }
}

fn validate<T: Validate>(req: &T) -> Result<(), AppError> {
    req.validate()
        .map_err(|e| AppError::BadRequest(format!("Invalid request: {}", e)))
}

fn login_failed() -> AppError {
    metrics::counter!("login_failures_total").increment(1);
    AppError::Unauthorized
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::InMemoryUserStore;

    fn service() -> AuthService {
        let jwt = Arc::new(JwtService::new("unit-test-secret", 3600).unwrap());
        AuthService::new(Arc::new(InMemoryUserStore::new()), jwt)
    }

    fn register_req(email: &str, password: &str) -> RegisterRequest {
        RegisterRequest {
            email: email.to_string(),
            password: password.to_string(),
            name: "A".to_string(),
        }
    }

    #[tokio::test]
    async fn test_register_rejects_empty_fields() {
        let service = service();

        let err = service.register(register_req("", "secret123")).await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));

        let err = service.register(register_req("a@x.com", "")).await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn test_register_then_current_user() {
        let service = service();

        let resp = service.register(register_req("a@x.com", "secret123")).await.unwrap();
        assert!(!resp.token.is_empty());

        let identity = AuthenticatedIdentity {
            user_id: resp.user.id,
            email: resp.user.email.clone(),
        };
        let me = service.current_user(&identity).await.unwrap();
        assert_eq!(me.email, "a@x.com");
    }

    #[tokio::test]
    async fn test_current_user_missing_is_unauthorized() {
        let service = service();
        let identity = AuthenticatedIdentity {
            user_id: 999,
            email: "ghost@x.com".to_string(),
        };

        let err = service.current_user(&identity).await.unwrap_err();
        assert!(matches!(err, AppError::Unauthorized));
    }
}
