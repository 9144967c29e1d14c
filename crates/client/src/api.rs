//! HTTP client for the REST surface.

use std::fmt::Display;

use panaderia_domain::Usuario;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::session::Session;

/// Failure talking to the API.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The server rejected the request; carries its `message` payload.
    #[error("{message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Server-provided message.
        message: String,
    },
    /// A protected call was attempted without signing in first.
    #[error("No hay una sesión activa")]
    NoSession,
    /// The request never produced a response.
    #[error(transparent)]
    Transport(#[from] reqwest::Error),
}

/// Client result type.
pub type ClientResult<T> = Result<T, ClientError>;

#[derive(Debug, Deserialize)]
struct MessageBody {
    message: String,
}

#[derive(Debug, Serialize)]
struct LoginBody<'a> {
    nombre: &'a str,
    contrasena: &'a str,
}

#[derive(Debug, Deserialize)]
struct LoginReply {
    token: String,
    usuario: Usuario,
}

#[derive(Debug, Serialize)]
struct ChangePasswordBody<'a> {
    contrasena_actual: &'a str,
    contrasena_nueva: &'a str,
}

/// REST client bound to one server and one [`Session`].
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    http: reqwest::Client,
    session: Session,
}

impl ApiClient {
    /// Creates a client for `base_url` (e.g. `http://localhost:3001`)
    /// that authenticates with `session`.
    #[must_use]
    pub fn new(base_url: impl Into<String>, session: Session) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_owned(),
            http: reqwest::Client::new(),
            session,
        }
    }

    /// Signs in and stores the credentials in the session.
    pub async fn login(&self, nombre: &str, contrasena: &str) -> ClientResult<Usuario> {
        let response = self
            .http
            .post(format!("{}/auth/login", self.base_url))
            .json(&LoginBody { nombre, contrasena })
            .send()
            .await?;

        let reply: LoginReply = parse(response).await?;
        self.session.begin(reply.token, reply.usuario.clone());
        Ok(reply.usuario)
    }

    /// Closes the audit session server-side, then forgets the credentials.
    /// The local session is cleared even when the server call fails.
    pub async fn logout(&self) -> ClientResult<String> {
        let result = match self.authorized_post("/auth/logout") {
            Ok(request) => parse::<MessageBody>(request.send().await?).await,
            Err(error) => Err(error),
        };

        self.session.clear();
        result.map(|body| body.message)
    }

    /// Fetches the signed-in user's profile.
    pub async fn perfil(&self) -> ClientResult<Usuario> {
        let request = self.authorized_get("/api/perfil")?;
        parse(request.send().await?).await
    }

    /// Changes the signed-in user's password.
    pub async fn cambiar_contrasena(
        &self,
        contrasena_actual: &str,
        contrasena_nueva: &str,
    ) -> ClientResult<String> {
        let request = self
            .authorized(reqwest::Method::PUT, "/api/cambiar_contrasena")?
            .json(&ChangePasswordBody {
                contrasena_actual,
                contrasena_nueva,
            });

        let body: MessageBody = parse(request.send().await?).await?;
        Ok(body.message)
    }

    /// Lists all rows of an entity, e.g. `list::<Cliente>("cliente")`.
    pub async fn list<T: DeserializeOwned>(&self, entidad: &str) -> ClientResult<Vec<T>> {
        let request = self.authorized_get(&format!("/api/{entidad}"))?;
        parse(request.send().await?).await
    }

    /// Fetches one row by its business key.
    pub async fn get<T: DeserializeOwned>(
        &self,
        entidad: &str,
        clave: impl Display,
    ) -> ClientResult<T> {
        let request = self.authorized_get(&format!("/api/{entidad}/{clave}"))?;
        parse(request.send().await?).await
    }

    /// Creates a row; returns the server's confirmation message.
    pub async fn create(&self, entidad: &str, draft: &impl Serialize) -> ClientResult<String> {
        let request = self
            .authorized(reqwest::Method::POST, &format!("/api/{entidad}"))?
            .json(draft);

        let body: MessageBody = parse(request.send().await?).await?;
        Ok(body.message)
    }

    /// Updates a row; returns the server's confirmation message.
    pub async fn update(
        &self,
        entidad: &str,
        clave: impl Display,
        patch: &impl Serialize,
    ) -> ClientResult<String> {
        let request = self
            .authorized(reqwest::Method::PUT, &format!("/api/{entidad}/{clave}"))?
            .json(patch);

        let body: MessageBody = parse(request.send().await?).await?;
        Ok(body.message)
    }

    /// Deletes a row; returns the server's confirmation message.
    pub async fn delete(&self, entidad: &str, clave: impl Display) -> ClientResult<String> {
        let request =
            self.authorized(reqwest::Method::DELETE, &format!("/api/{entidad}/{clave}"))?;

        let body: MessageBody = parse(request.send().await?).await?;
        Ok(body.message)
    }

    fn authorized_get(&self, path: &str) -> ClientResult<reqwest::RequestBuilder> {
        self.authorized(reqwest::Method::GET, path)
    }

    fn authorized_post(&self, path: &str) -> ClientResult<reqwest::RequestBuilder> {
        self.authorized(reqwest::Method::POST, path)
    }

    fn authorized(
        &self,
        method: reqwest::Method,
        path: &str,
    ) -> ClientResult<reqwest::RequestBuilder> {
        let token = self.session.token().ok_or(ClientError::NoSession)?;

        Ok(self
            .http
            .request(method, format!("{}{path}", self.base_url))
            .bearer_auth(token))
    }
}

async fn parse<T: DeserializeOwned>(response: reqwest::Response) -> ClientResult<T> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json().await?);
    }

    let text = response.text().await.unwrap_or_default();
    Err(api_error(status.as_u16(), &text))
}

/// Builds the API error for a failed response; the body is the server's
/// `{message}` payload when it parses, otherwise the raw text.
fn api_error(status: u16, body: &str) -> ClientError {
    let message = serde_json::from_str::<MessageBody>(body)
        .map(|parsed| parsed.message)
        .unwrap_or_else(|_| body.to_owned());

    ClientError::Api { status, message }
}

#[cfg(test)]
mod tests {
    use crate::session::Session;

    use super::{ApiClient, ClientError, api_error};

    #[test]
    fn error_body_message_is_surfaced() {
        let error = api_error(400, r#"{"message":"El cliente con este CI ya existe."}"#);
        match error {
            ClientError::Api { status, message } => {
                assert_eq!(status, 400);
                assert_eq!(message, "El cliente con este CI ya existe.");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn unparseable_error_body_falls_back_to_raw_text() {
        let error = api_error(502, "Bad Gateway");
        match error {
            ClientError::Api { status, message } => {
                assert_eq!(status, 502);
                assert_eq!(message, "Bad Gateway");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn protected_calls_require_a_session() {
        let client = ApiClient::new("http://localhost:3001/", Session::new());
        let result = client.authorized_get("/api/cliente");
        assert!(matches!(result, Err(ClientError::NoSession)));
    }

    #[test]
    fn trailing_slash_is_normalized() {
        let client = ApiClient::new("http://localhost:3001/", Session::new());
        assert_eq!(client.base_url, "http://localhost:3001");
    }
}
