//! Regex-based router: ordered linear matching per HTTP method, `{name}`
//! placeholders compile to `([^/]+)` capture groups, actions are
//! `Controller@action` strings resolved against the registry at dispatch time.

use crate::controller::ControllerRegistry;
use crate::error::AppError;
use crate::request::Request;
use crate::response::ApiResponse;
use axum::http::Method;
use regex::Regex;
use std::collections::HashMap;

pub struct Route {
    pub uri: String,
    pub action: String,
    pattern: Regex,
}

/// Route table. Registration order is match order; there are no precedence
/// rules and no conflict detection.
#[derive(Default)]
pub struct Router {
    routes: HashMap<Method, Vec<Route>>,
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&mut self, uri: &str, action: &str) -> Result<&mut Self, AppError> {
        self.add_route(Method::GET, uri, action)
    }

    pub fn post(&mut self, uri: &str, action: &str) -> Result<&mut Self, AppError> {
        self.add_route(Method::POST, uri, action)
    }

    pub fn put(&mut self, uri: &str, action: &str) -> Result<&mut Self, AppError> {
        self.add_route(Method::PUT, uri, action)
    }

    pub fn delete(&mut self, uri: &str, action: &str) -> Result<&mut Self, AppError> {
        self.add_route(Method::DELETE, uri, action)
    }

    pub fn add_route(
        &mut self,
        method: Method,
        uri: &str,
        action: &str,
    ) -> Result<&mut Self, AppError> {
        let pattern = compile_pattern(uri)?;
        self.routes.entry(method).or_default().push(Route {
            uri: uri.to_string(),
            action: action.to_string(),
            pattern,
        });
        Ok(self)
    }

    /// Dispatch a captured request: first matching route wins, captures become
    /// positional params, the action string is split on `@` and resolved
    /// against the registry. Anything unresolvable is `Route not found.`.
    pub async fn dispatch(
        &self,
        registry: &ControllerRegistry,
        mut req: Request,
    ) -> Result<ApiResponse, AppError> {
        let routes = self
            .routes
            .get(req.method())
            .map(Vec::as_slice)
            .unwrap_or(&[]);

        for route in routes {
            let Some(captures) = route.pattern.captures(req.uri()) else {
                continue;
            };
            let params: Vec<String> = captures
                .iter()
                .skip(1)
                .flatten()
                .map(|m| m.as_str().to_string())
                .collect();

            let Some((controller_name, action)) = route.action.split_once('@') else {
                tracing::warn!(action = %route.action, "malformed action, expected Controller@action");
                return Err(AppError::RouteNotFound);
            };
            let Some(controller) = registry.get(controller_name) else {
                return Err(AppError::RouteNotFound);
            };

            tracing::debug!(method = %req.method(), uri = %req.uri(), action = %route.action, "dispatch");
            req.set_params(params);
            return controller.call(action, req).await;
        }

        Err(AppError::RouteNotFound)
    }
}

/// Compile a URI pattern to an anchored regex: `{name}` placeholders become
/// `([^/]+)` groups, everything else matches literally.
fn compile_pattern(uri: &str) -> Result<Regex, AppError> {
    let placeholder = Regex::new(r"\{[a-zA-Z_][a-zA-Z0-9_]*\}")
        .map_err(|e| AppError::Schema(e.to_string()))?;
    let mut compiled = String::from("^");
    let mut last = 0;
    for m in placeholder.find_iter(uri) {
        compiled.push_str(&regex::escape(&uri[last..m.start()]));
        compiled.push_str("([^/]+)");
        last = m.end();
    }
    compiled.push_str(&regex::escape(&uri[last..]));
    compiled.push('$');
    Regex::new(&compiled).map_err(|e| AppError::Schema(format!("invalid route pattern '{}': {}", uri, e)))
}
