//! Example users API: home routes plus a schema-synced users table with full
//! CRUD, all dispatched through `Controller@action` routes.

use async_trait::async_trait;
use rapido::{
    ok_message, ApiResponse, App, AppError, Controller, ControllerRegistry, Database, Model,
    OrderDir, Request, Router, TableSchema,
};
use serde_json::{json, Value};
use sqlx::PgPool;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

struct UserModel;

impl Model for UserModel {
    fn schema() -> TableSchema {
        TableSchema::new("users")
            .column("id", "SERIAL PRIMARY KEY")
            .column("name", "VARCHAR(255) NOT NULL")
            .column("password", "VARCHAR(255) NOT NULL")
            .column("email", "VARCHAR(255) NOT NULL UNIQUE")
            .column("created_at", "TIMESTAMPTZ NOT NULL DEFAULT NOW()")
    }
}

async fn pool() -> Result<&'static PgPool, AppError> {
    Database::connect().await
}

/// Password hashes never leave the API.
fn without_password(mut row: Value) -> Value {
    if let Value::Object(ref mut map) = row {
        map.remove("password");
    }
    row
}

fn parse_id(req: &Request) -> Result<i64, AppError> {
    req.param(0)
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| AppError::BadRequest("invalid id".into()))
}

struct HomeController;

#[async_trait]
impl Controller for HomeController {
    async fn call(&self, action: &str, req: Request) -> Result<ApiResponse, AppError> {
        match action {
            "index" => Ok(ok_message("Working API")),
            "echo" => Ok(ApiResponse::success(Value::Object(req.input()?))),
            _ => Err(AppError::RouteNotFound),
        }
    }
}

struct UserController;

impl UserController {
    async fn index(&self) -> Result<ApiResponse, AppError> {
        let rows = UserModel::find_all(pool().await?, "id", OrderDir::Asc).await?;
        let rows: Vec<Value> = rows.into_iter().map(without_password).collect();
        Ok(ApiResponse::success(rows))
    }

    async fn show(&self, req: Request) -> Result<ApiResponse, AppError> {
        let id = parse_id(&req)?;
        let row = UserModel::find(pool().await?, "id", json!(id))
            .await?
            .ok_or_else(|| AppError::NotFound(format!("user {}", id)))?;
        Ok(ApiResponse::success(without_password(row)))
    }

    async fn store(&self, req: Request) -> Result<ApiResponse, AppError> {
        let input = req.input()?;
        Request::validate_fields(&["name", "email", "password"], &input)?;
        let pool = pool().await?;
        let id = UserModel::create(pool, &input).await?;
        let row = UserModel::find(pool, "id", json!(id))
            .await?
            .ok_or_else(|| AppError::NotFound(format!("user {}", id)))?;
        Ok(ApiResponse::success(without_password(row)))
    }

    async fn update(&self, req: Request) -> Result<ApiResponse, AppError> {
        let id = parse_id(&req)?;
        let input = req.input()?;
        let pool = pool().await?;
        if !UserModel::update(pool, "id", json!(id), &input).await? {
            return Err(AppError::NotFound(format!("user {}", id)));
        }
        let row = UserModel::find(pool, "id", json!(id))
            .await?
            .ok_or_else(|| AppError::NotFound(format!("user {}", id)))?;
        Ok(ApiResponse::success(without_password(row)))
    }

    async fn destroy(&self, req: Request) -> Result<ApiResponse, AppError> {
        let id = parse_id(&req)?;
        if !UserModel::delete(pool().await?, "id", json!(id)).await? {
            return Err(AppError::NotFound(format!("user {}", id)));
        }
        Ok(ok_message("User deleted."))
    }
}

#[async_trait]
impl Controller for UserController {
    async fn call(&self, action: &str, req: Request) -> Result<ApiResponse, AppError> {
        match action {
            "index" => self.index().await,
            "show" => self.show(req).await,
            "store" => self.store(req).await,
            "update" => self.update(req).await,
            "destroy" => self.destroy(req).await,
            _ => Err(AppError::RouteNotFound),
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("rapido=debug".parse()?))
        .init();

    let database_url = rapido::database_url()?;
    rapido::ensure_database_exists(&database_url).await?;
    let pool = Database::connect().await?;
    UserModel::sync(pool).await?;

    let mut router = Router::new();
    router.get("/", "HomeController@index")?;
    router.post("/echo", "HomeController@echo")?;
    router.get("/users", "UserController@index")?;
    router.post("/users", "UserController@store")?;
    router.get("/users/{id}", "UserController@show")?;
    router.put("/users/{id}", "UserController@update")?;
    router.delete("/users/{id}", "UserController@destroy")?;

    let mut registry = ControllerRegistry::new();
    registry.register("HomeController", Arc::new(HomeController));
    registry.register("UserController", Arc::new(UserController));

    tracing::info!("users table synced, starting server");
    App::new(router, registry).serve("0.0.0.0:3000").await?;
    Ok(())
}
