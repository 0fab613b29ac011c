// src/middleware/auth.rs

use axum::{
    extract::{FromRequestParts, State},
    http::{request::Parts, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::headers::{authorization::Bearer, Authorization, HeaderMapExt};

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::i18n::Locale,
    models::auth::Identity,
};

/// Valida o Bearer token do cabeçalho Authorization.
pub(crate) fn authenticate(app_state: &AppState, headers: &HeaderMap) -> Result<Identity, AppError> {
    let bearer = headers
        .typed_get::<Authorization<Bearer>>()
        .ok_or(AppError::InvalidToken)?;
    app_state.token_verifier.verify(bearer.token())
}

// O middleware em si
pub async fn auth_guard(
    State(app_state): State<AppState>,
    mut request: axum::extract::Request,
    next: Next,
) -> Response {
    match authenticate(&app_state, request.headers()) {
        Ok(identity) => {
            // Insere o usuário nos "extensions" da requisição
            request.extensions_mut().insert(AuthenticatedUser(identity));
            next.run(request).await
        }
        Err(e) => e
            .to_api_error(&Locale::from_headers(request.headers()))
            .into_response(),
    }
}

// Extrator para obter o usuário autenticado diretamente nos handlers
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub Identity);

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or_else(|| {
                AppError::InvalidToken
                    .to_api_error(&Locale::from_headers(&parts.headers))
                    .into_response()
            })
    }
}
