#![allow(clippy::new_without_default)]

use app::{App, AppError};
use auth::{Claims, TokenHandler};
use hyper::{
    header::{HeaderValue, CONTENT_TYPE},
    Body, Request, Response, StatusCode,
};
use model::{ApiError, ApiResponse};
use route::Route;
use serde::Serialize;
use serde_json::{Map, Value as JsonValue};
use std::sync::Arc;

pub mod app;
pub mod auth;
pub mod controller;
pub mod route;

#[macro_use]
extern crate log;

#[derive(Clone, Debug)]
pub struct AppSettings {
    pub port: u16,
    pub database_addr: Option<String>,
    pub jwt_secret: String,
    pub token_ttl_s: i64,
}

const PING_URI: &str = "/api/ping";

pub async fn entry_point(
    webserver: Arc<Webserver>,
    request: Request<Body>,
) -> Result<Response<Body>, hyper::Error> {
    Ok(webserver.handle_request(request).await)
}

pub struct Webserver {
    app: Arc<App>,
    tokens: TokenHandler,
}

impl Webserver {
    pub fn new(app: Arc<App>, tokens: TokenHandler) -> Self {
        Self { app, tokens }
    }

    pub async fn handle_request(&self, request: Request<Body>) -> Response<Body> {
        // route without trailing slash for easier matching
        let path = request.uri().path().trim_end_matches('/').to_owned();
        if path == PING_URI {
            return ping_pong_response();
        }

        match route::resolve(request.method(), &path) {
            Some(route) => {
                let response = self.api_route(route, request).await;
                generic_json_response(&response, response.http_status())
            }
            None => {
                error!(
                    "invalid http method or route request: '{} {}'",
                    request.method(),
                    path
                );
                let response = not_found();
                generic_json_response(&response, response.http_status())
            }
        }
    }

    async fn api_route(&self, route: Route, request: Request<Body>) -> ApiResponse {
        let claims = self.get_auth_claims(&request);

        match Self::get_body_as_json(request).await {
            Ok(body) => {
                self.app
                    .handle_single(route.into_request(body), &claims)
                    .await
            }
            Err(error) => {
                error!("error parsing request as json: '{:?}'", error.context);
                ApiResponse::error(error.api_error)
            }
        }
    }

    fn get_auth_claims(&self, request: &Request<Body>) -> Option<Claims> {
        let header = request.headers().get("Authorization")?;
        let token = header.to_str().ok()?.trim_start_matches("Bearer ");
        self.tokens.parse_token(token).ok()
    }

    /// Attempts to parse the body of a request as a json object.
    ///
    /// An empty body is read as an empty object.
    async fn get_body_as_json(request: Request<Body>) -> Result<JsonValue, AppError> {
        let bytes = hyper::body::to_bytes(request.into_body()).await?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(JsonValue::Object(Map::new()));
        }

        match serde_json::from_slice::<JsonValue>(&bytes)? {
            JsonValue::Object(object) => Ok(JsonValue::Object(object)),
            _ => {
                Err(AppError::invalid_request().with_message("request body must be a json object"))
            }
        }
    }
}

fn generic_json_response<T>(body: &T, status: u16) -> Response<Body>
where
    T: Serialize,
{
    let bytes = match serde_json::to_vec(body) {
        Ok(bytes) => bytes,
        Err(e) => {
            error!("failed to serialize response body: '{}'", e);
            return status_response(StatusCode::INTERNAL_SERVER_ERROR, Body::empty());
        }
    };

    let mut response = status_response(
        StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        Body::from(bytes),
    );
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    response
}

fn status_response(status: StatusCode, body: Body) -> Response<Body> {
    let mut response = Response::new(body);
    *response.status_mut() = status;
    response
}

fn ping_pong_response() -> Response<Body> {
    status_response(StatusCode::OK, Body::from("pong"))
}

fn not_found() -> ApiResponse {
    ApiResponse::error(ApiError::not_found().with_message("invalid route"))
}
