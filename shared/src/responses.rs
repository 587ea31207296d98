use lambda_http::{http::StatusCode, Body, Error, Response};
use serde::Serialize;

use crate::error::BookError;

fn builder(status: StatusCode) -> lambda_http::http::response::Builder {
    Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .header("Access-Control-Allow-Origin", "*")
        .header("Access-Control-Allow-Credentials", "true")
}

pub fn json_response<T: Serialize>(status: StatusCode, body: &T) -> Result<Response<Body>, Error> {
    Ok(builder(status)
        .body(serde_json::to_string(body)?.into())
        .map_err(Box::new)?)
}

pub fn empty_response(status: StatusCode) -> Result<Response<Body>, Error> {
    Ok(builder(status).body(Body::Empty).map_err(Box::new)?)
}

/// Render a `BookError` with its status code and JSON body.
pub fn error_response(err: &BookError) -> Result<Response<Body>, Error> {
    let status = err.status_code();
    if status.is_server_error() {
        tracing::error!("Request failed: {}", err);
    } else {
        tracing::warn!("Request rejected: {}", err);
    }
    json_response(status, &err.to_response_body())
}

/// CORS preflight answer.
pub fn preflight() -> Result<Response<Body>, Error> {
    Ok(Response::builder()
        .status(StatusCode::OK)
        .header("Access-Control-Allow-Origin", "*")
        .header("Access-Control-Allow-Credentials", "true")
        .header("Access-Control-Allow-Methods", "GET,POST,PATCH,DELETE,OPTIONS")
        .header("Access-Control-Allow-Headers", "Content-Type,Authorization")
        .body(Body::Empty)
        .map_err(Box::new)?)
}

pub fn not_found() -> Result<Response<Body>, Error> {
    json_response(
        StatusCode::NOT_FOUND,
        &serde_json::json!({"error": "Not found"}),
    )
}

pub fn method_not_allowed() -> Result<Response<Body>, Error> {
    json_response(
        StatusCode::METHOD_NOT_ALLOWED,
        &serde_json::json!({"error": "Method not allowed"}),
    )
}
