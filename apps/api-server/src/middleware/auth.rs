//! Authentication extractor.
//!
//! Verification happens here, before any handler body runs; handlers only
//! ever see the already-verified principal.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use actix_web::{FromRequest, HttpRequest, dev::Payload, http::header, web};

use bartr_core::ports::{AuthError, TokenVerifier};

/// Authenticated principal extractor.
///
/// Use this in handlers to require authentication:
/// ```ignore
/// async fn protected_route(identity: Identity) -> impl Responder {
///     format!("Hello, user {}!", identity.user_id)
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Identity {
    pub user_id: uuid::Uuid,
    pub email: Option<String>,
}

/// Error type for authentication failures.
#[derive(Debug)]
pub struct AuthenticationError(pub AuthError);

impl std::fmt::Display for AuthenticationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl actix_web::ResponseError for AuthenticationError {
    fn status_code(&self) -> actix_web::http::StatusCode {
        actix_web::http::StatusCode::UNAUTHORIZED
    }

    fn error_response(&self) -> actix_web::HttpResponse {
        use bartr_shared::ErrorResponse;

        let error = match &self.0 {
            AuthError::TokenExpired => ErrorResponse::new(401, "Token Expired")
                .with_detail("Your authentication token has expired. Please login again."),
            AuthError::InvalidToken(msg) => {
                ErrorResponse::new(401, "Invalid Token").with_detail(msg.clone())
            }
            AuthError::MissingAuth => ErrorResponse::new(401, "Authentication Required")
                .with_detail("Please provide a valid Bearer token in the Authorization header."),
        };

        actix_web::HttpResponse::build(self.status_code()).json(error)
    }
}

impl FromRequest for Identity {
    type Error = AuthenticationError;
    type Future = Pin<Box<dyn Future<Output = Result<Self, Self::Error>>>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let verifier = req
            .app_data::<web::Data<Arc<dyn TokenVerifier>>>()
            .map(|data| data.get_ref().clone());

        let auth_header = req
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(String::from);

        Box::pin(async move {
            let verifier = verifier.ok_or_else(|| {
                tracing::error!("TokenVerifier not found in app data");
                AuthenticationError(AuthError::InvalidToken(
                    "Server configuration error".to_string(),
                ))
            })?;

            let header = auth_header.ok_or(AuthenticationError(AuthError::MissingAuth))?;

            let token = header.strip_prefix("Bearer ").ok_or_else(|| {
                AuthenticationError(AuthError::InvalidToken(
                    "Expected Bearer token".to_string(),
                ))
            })?;

            let principal = verifier.verify(token).await.map_err(AuthenticationError)?;

            Ok(Identity {
                user_id: principal.user_id,
                email: principal.email,
            })
        })
    }
}
