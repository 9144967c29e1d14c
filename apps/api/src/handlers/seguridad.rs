//! User account, permission catalog, and grant handlers.

use axum::Json;
use axum::extract::{Extension, Path, State};
use panaderia_application::{UsuarioDraft, UsuarioPatch};
use panaderia_core::AuthenticatedUser;
use panaderia_domain::{Permiso, RolPermiso, Usuario};

use crate::dto::MessageResponse;
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn create_usuario_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthenticatedUser>,
    Json(draft): Json<UsuarioDraft>,
) -> ApiResult<Json<MessageResponse>> {
    state.user_service.create(&actor, draft).await?;
    Ok(Json(MessageResponse::new("Usuario creado exitosamente")))
}

pub async fn list_usuarios_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthenticatedUser>,
) -> ApiResult<Json<Vec<Usuario>>> {
    let rows = state.user_service.list(&actor).await?;
    Ok(Json(rows))
}

pub async fn get_usuario_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthenticatedUser>,
    Path(nombre): Path<String>,
) -> ApiResult<Json<Usuario>> {
    let usuario = state.user_service.get(&actor, &nombre).await?;
    Ok(Json(usuario))
}

pub async fn update_usuario_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthenticatedUser>,
    Path(nombre): Path<String>,
    Json(patch): Json<UsuarioPatch>,
) -> ApiResult<Json<MessageResponse>> {
    state.user_service.update(&actor, &nombre, patch).await?;
    Ok(Json(MessageResponse::new("Usuario actualizado exitosamente")))
}

pub async fn delete_usuario_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthenticatedUser>,
    Path(nombre): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    state.user_service.delete(&actor, &nombre).await?;
    Ok(Json(MessageResponse::new("Usuario eliminado exitosamente")))
}

pub async fn list_permisos_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthenticatedUser>,
) -> ApiResult<Json<Vec<Permiso>>> {
    let rows = state.security_service.list_permissions(&actor).await?;
    Ok(Json(rows))
}

pub async fn get_permiso_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthenticatedUser>,
    Path(id): Path<i32>,
) -> ApiResult<Json<Permiso>> {
    let permiso = state.security_service.get_permission(&actor, id).await?;
    Ok(Json(permiso))
}

pub async fn grant_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthenticatedUser>,
    Json(grant): Json<RolPermiso>,
) -> ApiResult<Json<MessageResponse>> {
    state.security_service.grant(&actor, grant).await?;
    Ok(Json(MessageResponse::new("Permiso asignado exitosamente")))
}

pub async fn list_grants_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthenticatedUser>,
) -> ApiResult<Json<Vec<RolPermiso>>> {
    let rows = state.security_service.list_grants(&actor).await?;
    Ok(Json(rows))
}

pub async fn get_grant_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthenticatedUser>,
    Path((id_rol, id_permiso)): Path<(i32, i32)>,
) -> ApiResult<Json<RolPermiso>> {
    let grant = state
        .security_service
        .get_grant(&actor, id_rol, id_permiso)
        .await?;
    Ok(Json(grant))
}

pub async fn revoke_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthenticatedUser>,
    Path((id_rol, id_permiso)): Path<(i32, i32)>,
) -> ApiResult<Json<MessageResponse>> {
    state
        .security_service
        .revoke(&actor, id_rol, id_permiso)
        .await?;
    Ok(Json(MessageResponse::new("Permiso revocado exitosamente")))
}
