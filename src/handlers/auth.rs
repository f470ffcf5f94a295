//! 认证相关的 HTTP 处理器

use crate::{
    auth::middleware::AuthenticatedIdentity,
    error::AppError,
    middleware::AppState,
    models::auth::*,
};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use http_body_util::LengthLimitError;
use std::sync::Arc;

/// 注册
pub async fn register(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(req) = payload.map_err(bad_json)?;

    let response = state.auth_service.register(req).await?;

    Ok((StatusCode::CREATED, Json(response)))
}

/// 登录
pub async fn login(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(req) = payload.map_err(bad_json)?;

    let response = state.auth_service.login(req).await?;

    Ok(Json(response))
}

/// 获取当前用户信息
pub async fn get_current_user(
    State(state): State<Arc<AppState>>,
    identity: AuthenticatedIdentity,
) -> Result<impl IntoResponse, AppError> {
    let user = state.auth_service.current_user(&identity).await?;

    Ok(Json(user))
}

/// 请求体超过上限返回 413，其余无法解析的情况返回 400
fn bad_json(rejection: JsonRejection) -> AppError {
    if exceeds_body_limit(&rejection) {
        return AppError::PayloadTooLarge;
    }

    AppError::BadRequest(format!("Invalid JSON body: {}", rejection.body_text()))
}

/// 无 Content-Length 的请求体在读取时才触发长度限制，
/// 经过多层装箱后 axum 只报告 400，需要沿错误链查找
fn exceeds_body_limit(rejection: &JsonRejection) -> bool {
    if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return true;
    }

    let mut source = std::error::Error::source(rejection);
    while let Some(err) = source {
        if err.is::<LengthLimitError>() {
            return true;
        }
        source = std::error::Error::source(err);
    }

    false
}
