//! Bearer-token service.
//!
//! Tokens carry the user identity plus the audit-session id opened at
//! login, so every later request can attribute its events to that session.

use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use panaderia_core::{AppError, AppResult, AuthenticatedUser};
use panaderia_domain::Usuario;
use serde::{Deserialize, Serialize};

const INVALID_TOKEN: &str = "Token inválido o expirado";

/// Claims stored in the token.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct Claims {
    /// User id.
    sub: i32,
    /// Username.
    nombre: String,
    /// Role held when the token was minted.
    id_rol: i32,
    /// Audit session opened at login.
    bitacora: i64,
    /// Expiration timestamp.
    exp: i64,
    /// Issued-at timestamp.
    iat: i64,
}

/// Mints and validates the HS256 bearer tokens issued at login.
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    expiration_minutes: i64,
}

impl JwtService {
    /// Creates a token service from the shared secret.
    #[must_use]
    pub fn new(secret: &str, expiration_minutes: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            expiration_minutes,
        }
    }

    /// Mints a token for a freshly authenticated user.
    pub fn mint(&self, usuario: &Usuario, id_bitacora: i64) -> AppResult<String> {
        let now = Utc::now();
        let expiration = now + Duration::minutes(self.expiration_minutes);

        let claims = Claims {
            sub: usuario.id,
            nombre: usuario.nombre.clone(),
            id_rol: usuario.id_rol,
            bitacora: id_bitacora,
            exp: expiration.timestamp(),
            iat: now.timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|error| AppError::Internal(format!("failed to mint token: {error}")))
    }

    /// Validates a token and recovers the actor it was minted for.
    pub fn decode(&self, token: &str) -> AppResult<AuthenticatedUser> {
        let data = decode::<Claims>(token, &self.decoding_key, &Validation::new(Algorithm::HS256))
            .map_err(|_| AppError::Unauthorized(INVALID_TOKEN.to_owned()))?;

        let claims = data.claims;
        Ok(AuthenticatedUser::new(
            claims.sub,
            claims.nombre,
            claims.id_rol,
            claims.bitacora,
        ))
    }

    /// Extracts the token from an `Authorization` header value.
    #[must_use]
    pub fn extract_from_header(header: &str) -> Option<&str> {
        header.strip_prefix("Bearer ")
    }
}

#[cfg(test)]
mod tests {
    use panaderia_core::{AppError, AppResult};
    use panaderia_domain::Usuario;

    use super::JwtService;

    fn usuario() -> Usuario {
        Usuario {
            id: 3,
            nombre: "ana".to_owned(),
            id_rol: 1,
        }
    }

    #[test]
    fn minted_token_round_trips_the_actor() -> AppResult<()> {
        let service = JwtService::new("una-clave-de-al-menos-32-caracteres!", 60);

        let token = service.mint(&usuario(), 42)?;
        let actor = service.decode(&token)?;

        assert_eq!(actor.id(), 3);
        assert_eq!(actor.nombre(), "ana");
        assert_eq!(actor.id_rol(), 1);
        assert_eq!(actor.id_bitacora(), 42);
        Ok(())
    }

    #[test]
    fn token_from_another_secret_is_rejected() -> AppResult<()> {
        let minter = JwtService::new("una-clave-de-al-menos-32-caracteres!", 60);
        let verifier = JwtService::new("otra-clave-distinta-de-32-caracteres", 60);

        let token = minter.mint(&usuario(), 42)?;
        let result = verifier.decode(&token);
        assert!(matches!(result, Err(AppError::Unauthorized(_))));
        Ok(())
    }

    #[test]
    fn expired_token_is_rejected() -> AppResult<()> {
        let service = JwtService::new("una-clave-de-al-menos-32-caracteres!", -5);

        let token = service.mint(&usuario(), 42)?;
        let result = service.decode(&token);
        assert!(matches!(result, Err(AppError::Unauthorized(_))));
        Ok(())
    }

    #[test]
    fn bearer_prefix_is_stripped() {
        assert_eq!(JwtService::extract_from_header("Bearer abc"), Some("abc"));
        assert_eq!(JwtService::extract_from_header("Basic abc"), None);
    }
}
