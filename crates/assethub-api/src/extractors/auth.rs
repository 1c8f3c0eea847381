//! `AuthUser` extractor: pulls the bearer token, validates it, and builds the
//! request context every service operation takes.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum_extra::TypedHeader;
use axum_extra::typed_header::TypedHeaderRejectionReason;
use axum_extra::headers::Authorization;
use axum_extra::headers::authorization::Bearer;

use assethub_core::error::AppError;
use assethub_service::context::RequestContext;

use crate::error::ApiError;
use crate::state::AppState;

/// Extracted authenticated caller available in handlers.
#[derive(Debug, Clone)]
pub struct AuthUser(pub RequestContext);

impl std::ops::Deref for AuthUser {
    type Target = RequestContext;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|e| {
                    AppError::authentication(if matches!(e.reason(), TypedHeaderRejectionReason::Missing) {
                        "Missing Authorization header".to_string()
                    } else {
                        format!("Invalid Authorization header: {e}")
                    })
                })?;

        let claims = state.jwt_decoder.decode(bearer.token())?;
        Ok(AuthUser(RequestContext::new(claims.principal())))
    }
}
