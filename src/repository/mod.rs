//! Database repository layer
//!
//! `UserStore` is the persistence contract the auth flow depends on. Lookups
//! return `Ok(None)` for "no such user" so callers never confuse it with a
//! backend failure.

pub mod memory_repo;
pub mod user_repo;

pub use memory_repo::InMemoryUserStore;
pub use user_repo::PgUserStore;

use crate::models::user::{NewUser, User};
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// 存储层错误
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("email already registered")]
    DuplicateEmail,

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("storage call timed out after {0:?}")]
    Timeout(Duration),
}

/// 用户存储
#[async_trait]
pub trait UserStore: Send + Sync {
    /// 创建用户；id 与时间戳由存储分配，邮箱唯一性由存储约束保证
    async fn create(&self, user: NewUser) -> Result<User, StoreError>;

    /// 按邮箱精确查找
    async fn get_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    /// 按 ID 查找
    async fn get_by_id(&self, id: i64) -> Result<Option<User>, StoreError>;

    /// 后端连通性检查
    async fn ping(&self) -> Result<(), StoreError>;
}
