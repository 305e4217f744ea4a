//! Controller trait and name registry. Routes carry `Controller@action`
//! strings; the registry resolves the controller half at dispatch time and
//! the controller resolves the action half.

use crate::error::AppError;
use crate::request::Request;
use crate::response::ApiResponse;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

/// A controller handles the actions routed to it by name. Implementations
/// match on `action` and return `Err(AppError::RouteNotFound)` for names they
/// do not define, which the dispatcher reports as a 404.
#[async_trait]
pub trait Controller: Send + Sync {
    async fn call(&self, action: &str, req: Request) -> Result<ApiResponse, AppError>;
}

/// Controller name -> instance. Shared by the dispatcher across requests.
#[derive(Clone, Default)]
pub struct ControllerRegistry {
    controllers: HashMap<String, Arc<dyn Controller>>,
}

impl ControllerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, name: impl Into<String>, controller: Arc<dyn Controller>) {
        self.controllers.insert(name.into(), controller);
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Controller>> {
        self.controllers.get(name)
    }
}
