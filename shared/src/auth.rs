use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use lambda_http::{Request, RequestExt};
use serde::Deserialize;

use crate::error::{BookError, Result};

/// Claims we read from the token payload. Signature checks happen upstream
/// in the API Gateway authorizer, so nothing here is verified.
#[derive(Debug, Deserialize)]
struct JwtPayload {
    sub: Option<String>,
}

/// Resolve the caller's user id.
///
/// The authorizer's `sub` claim wins when API Gateway forwarded one; otherwise
/// the bearer token in the `Authorization` header is decoded.
pub fn user_id_from_request(event: &Request) -> Result<String> {
    let from_authorizer = event
        .request_context_ref()
        .and_then(|ctx| ctx.authorizer())
        .and_then(|auth| auth.jwt.as_ref())
        .and_then(|jwt| jwt.claims.get("sub"))
        .filter(|sub| !sub.is_empty())
        .map(|sub| sub.to_string());

    if let Some(user_id) = from_authorizer {
        return Ok(user_id);
    }

    let header = event
        .headers()
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| BookError::Unauthorized("Missing Authorization header".to_string()))?;

    parse_user_id(header)
}

/// Extract `sub` from an `Authorization: Bearer <jwt>` header value.
pub fn parse_user_id(auth_header: &str) -> Result<String> {
    let token = auth_header
        .trim()
        .split_once(' ')
        .filter(|(scheme, _)| scheme.eq_ignore_ascii_case("bearer"))
        .map(|(_, token)| token.trim())
        .ok_or_else(|| BookError::Unauthorized("Expected a bearer token".to_string()))?;

    let payload = token
        .split('.')
        .nth(1)
        .filter(|p| !p.is_empty())
        .ok_or_else(|| BookError::Unauthorized("Malformed token".to_string()))?;

    let bytes = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .map_err(|e| BookError::Unauthorized(format!("Malformed token payload: {}", e)))?;

    let claims: JwtPayload = serde_json::from_slice(&bytes)
        .map_err(|e| BookError::Unauthorized(format!("Malformed token claims: {}", e)))?;

    claims
        .sub
        .filter(|sub| !sub.is_empty())
        .ok_or_else(|| BookError::Unauthorized("Token has no subject".to_string()))
}
