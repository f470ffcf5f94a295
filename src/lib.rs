//! 账号认证服务库
//! 密码哈希、令牌签发与校验、用户存储以及注册/登录流程

pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod telemetry;
pub mod auth;
pub mod models;
pub mod repository;
pub mod services;
