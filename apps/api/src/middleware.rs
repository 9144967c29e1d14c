use axum::extract::{Request, State};
use axum::http::header;
use axum::middleware::Next;
use axum::response::Response;
use panaderia_core::AppError;

use crate::error::ApiResult;
use crate::jwt::JwtService;
use crate::state::AppState;

/// Rejects requests without a valid bearer token and injects the decoded
/// actor into request extensions for the handlers.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> ApiResult<Response> {
    let header_value = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();

    let token = JwtService::extract_from_header(header_value)
        .ok_or_else(|| AppError::Unauthorized("Autenticación requerida".to_owned()))?;

    let actor = state.jwt_service.decode(token)?;

    request.extensions_mut().insert(actor);
    Ok(next.run(request).await)
}
