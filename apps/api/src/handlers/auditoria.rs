//! Audit trail read handlers.

use axum::Json;
use axum::extract::{Extension, Path, State};
use panaderia_core::AuthenticatedUser;
use panaderia_domain::{Bitacora, DetalleBitacora};

use crate::error::ApiResult;
use crate::state::AppState;

pub async fn list_bitacoras_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthenticatedUser>,
) -> ApiResult<Json<Vec<Bitacora>>> {
    let rows = state.audit_service.list_sessions(&actor).await?;
    Ok(Json(rows))
}

pub async fn get_bitacora_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthenticatedUser>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Bitacora>> {
    let session = state.audit_service.get_session(&actor, id).await?;
    Ok(Json(session))
}

pub async fn list_detalles_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthenticatedUser>,
    Path(id_bitacora): Path<i64>,
) -> ApiResult<Json<Vec<DetalleBitacora>>> {
    let rows = state.audit_service.list_events(&actor, id_bitacora).await?;
    Ok(Json(rows))
}
