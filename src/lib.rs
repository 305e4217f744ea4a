//! rapido: minimal CRUD API micro-framework. Regex router with
//! `Controller@action` dispatch, JSON request capture/validation, a fixed
//! `{status_code, status, data}` response envelope, and PostgreSQL-backed
//! models with schema auto-sync.

pub mod controller;
pub mod db;
pub mod error;
pub mod escape;
pub mod model;
pub mod request;
pub mod response;
pub mod router;
pub mod server;
pub mod sql;

pub use controller::{Controller, ControllerRegistry};
pub use db::{database_url, ensure_database_exists, Database};
pub use error::AppError;
pub use model::{sync_schema, ColumnDef, Model, TableSchema};
pub use request::Request;
pub use response::ApiResponse;
pub use router::Router;
pub use server::{ok_message, App};
pub use sql::OrderDir;
