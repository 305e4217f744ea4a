//! End-to-end dispatch through the axum service: envelope shape, sanitation
//! round-trip, and error mapping. No database required.

use axum::body::Body;
use axum::http::{header, Request as HttpRequest, StatusCode};
use http_body_util::BodyExt;
use rapido::{ApiResponse, App, AppError, Controller, ControllerRegistry, Request, Router};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

struct HomeController;

#[async_trait::async_trait]
impl Controller for HomeController {
    async fn call(&self, action: &str, req: Request) -> Result<ApiResponse, AppError> {
        match action {
            "index" => Ok(rapido::ok_message("Working API")),
            "store" => {
                let input = req.input()?;
                Request::validate_fields(&["name", "email"], &input)?;
                Ok(ApiResponse::success(Value::Object(input)))
            }
            "show" => Ok(ApiResponse::success(json!({ "id": req.param(0) }))),
            _ => Err(AppError::RouteNotFound),
        }
    }
}

fn service() -> axum::Router {
    let mut router = Router::new();
    router.get("/", "Home@index").unwrap();
    router.post("/users", "Home@store").unwrap();
    router.get("/users/{id}", "Home@show").unwrap();
    let mut registry = ControllerRegistry::new();
    registry.register("Home", Arc::new(HomeController));
    App::new(router, registry).into_service()
}

async fn send(req: HttpRequest<Body>) -> (StatusCode, Value) {
    let resp = service().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    (status, body)
}

fn get(path: &str) -> HttpRequest<Body> {
    HttpRequest::get(path).body(Body::empty()).unwrap()
}

fn post_json(path: &str, body: &str) -> HttpRequest<Body> {
    HttpRequest::post(path)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn index_replies_with_success_envelope() {
    let (status, body) = send(get("/")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status_code"], 200);
    assert_eq!(body["status"], "success");
    assert_eq!(body["data"]["message"], "Working API");
}

#[tokio::test]
async fn unknown_route_is_404_envelope() {
    let (status, body) = send(get("/nope")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["status_code"], 404);
    assert_eq!(body["status"], "not_found");
    assert_eq!(body["data"]["message"], "Route not found.");
}

#[tokio::test]
async fn path_params_reach_the_controller() {
    let (status, body) = send(get("/users/42")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["id"], "42");
}

#[tokio::test]
async fn invalid_json_body_is_bad_request() {
    let (status, body) = send(post_json("/users", "{not json")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "bad_request");
    let message = body["data"]["message"].as_str().unwrap();
    assert!(message.starts_with("Invalid JSON:"), "got: {}", message);
}

#[tokio::test]
async fn missing_required_field_is_reported_by_name() {
    let (status, body) = send(post_json("/users", r#"{"name": "John"}"#)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["data"]["message"], "Required field 'email' was not sent.");
}

#[tokio::test]
async fn sanitized_input_is_decoded_on_the_way_out() {
    let (status, body) = send(post_json(
        "/users",
        r#"{"name": "  <John & Co>  ", "email": "a@b.com"}"#,
    ))
    .await;
    assert_eq!(status, StatusCode::OK);
    // Escaped at capture, decoded at response; the trim sticks.
    assert_eq!(body["data"]["name"], "<John & Co>");
}

#[tokio::test]
async fn cors_headers_are_applied() {
    let resp = service().oneshot(get("/")).await.unwrap();
    assert_eq!(
        resp.headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .map(|v| v.to_str().unwrap()),
        Some("*")
    );
}
