//! User repository (数据库访问层)

use super::{StoreError, UserStore};
use crate::models::user::{NewUser, User};
use async_trait::async_trait;
use sqlx::PgPool;
use std::{future::Future, time::Duration};

const USER_COLUMNS: &str = "id, email, password_hash, name, created_at, updated_at";

/// PostgreSQL 用户存储
#[derive(Clone)]
pub struct PgUserStore {
    db: PgPool,
    query_timeout: Duration,
}

impl PgUserStore {
    pub fn new(db: PgPool, query_timeout: Duration) -> Self {
        Self { db, query_timeout }
    }

    /// 为单次查询设置超时；超时后 future 被丢弃，查询随之取消
    async fn bounded<T, F>(&self, query: F) -> Result<T, StoreError>
    where
        F: Future<Output = Result<T, sqlx::Error>>,
    {
        match tokio::time::timeout(self.query_timeout, query).await {
            Ok(result) => result.map_err(StoreError::from),
            Err(_) => {
                tracing::warn!(timeout = ?self.query_timeout, "Storage call timed out");
                Err(StoreError::Timeout(self.query_timeout))
            }
        }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    /// 创建用户
    async fn create(&self, user: NewUser) -> Result<User, StoreError> {
        let sql = format!(
            r#"
            INSERT INTO users (email, password_hash, name, created_at, updated_at)
            VALUES ($1, $2, $3, NOW(), NOW())
            RETURNING {USER_COLUMNS}
            "#
        );

        let query = sqlx::query_as::<_, User>(&sql)
            .bind(&user.email)
            .bind(&user.password_hash)
            .bind(&user.name)
            .fetch_one(&self.db);

        // 依赖 users_email_key 唯一约束，不做先查后插
        match self.bounded(query).await {
            Ok(created) => Ok(created),
            Err(StoreError::Database(sqlx::Error::Database(ref db_err)))
                if db_err.is_unique_violation() =>
            {
                Err(StoreError::DuplicateEmail)
            }
            Err(e) => Err(e),
        }
    }

    /// 根据邮箱查找用户
    async fn get_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");

        let query = sqlx::query_as::<_, User>(&sql)
            .bind(email)
            .fetch_optional(&self.db);

        self.bounded(query).await
    }

    /// 根据 ID 查找用户
    async fn get_by_id(&self, id: i64) -> Result<Option<User>, StoreError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");

        let query = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.db);

        self.bounded(query).await
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.bounded(crate::db::health_check(&self.db)).await
    }
}
