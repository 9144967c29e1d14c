//! Login, logout, profile, and password-change handlers.

use std::net::SocketAddr;

use axum::Json;
use axum::extract::{ConnectInfo, Extension, State};
use panaderia_core::AuthenticatedUser;
use panaderia_domain::Usuario;

use crate::dto::{ChangePasswordRequest, LoginRequest, LoginResponse, MessageResponse};
use crate::error::ApiResult;
use crate::state::AppState;

/// Verifies credentials, opens the audit session, and mints the token.
pub async fn login_handler(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Json(payload): Json<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    let outcome = state
        .auth_service
        .login(&payload.nombre, &payload.contrasena, &addr.ip().to_string())
        .await?;

    let token = state.jwt_service.mint(&outcome.usuario, outcome.id_bitacora)?;

    Ok(Json(LoginResponse {
        token,
        usuario: outcome.usuario,
    }))
}

/// Closes the actor's audit session.
pub async fn logout_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthenticatedUser>,
) -> ApiResult<Json<MessageResponse>> {
    state.auth_service.logout(&actor).await?;
    Ok(Json(MessageResponse::new("Sesión cerrada exitosamente")))
}

/// Returns the actor's own profile.
pub async fn perfil_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthenticatedUser>,
) -> ApiResult<Json<Usuario>> {
    let usuario = state.auth_service.profile(&actor).await?;
    Ok(Json(usuario))
}

/// Replaces the actor's password after verifying the current one.
pub async fn cambiar_contrasena_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthenticatedUser>,
    Json(payload): Json<ChangePasswordRequest>,
) -> ApiResult<Json<MessageResponse>> {
    state
        .auth_service
        .change_password(&actor, &payload.contrasena_actual, &payload.contrasena_nueva)
        .await?;

    Ok(Json(MessageResponse::new(
        "Contraseña actualizada exitosamente",
    )))
}
