// src/middleware/tenancy.rs

use axum::{
    extract::{FromRequestParts, State},
    http::{request::Parts, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::{
        auth::{authenticate, AuthenticatedUser},
        i18n::Locale,
    },
};

// O nome do nosso cabeçalho HTTP customizado
const TENANT_ID_HEADER: &str = "x-tenant-id";

// O tenant da requisição. Sempre o do token; o cabeçalho só pode confirmá-lo.
#[derive(Debug, Clone, Copy)]
pub struct TenantContext(pub Uuid);

/// Confere o cabeçalho X-Tenant-ID (opcional) contra a empresa do token.
fn resolve_tenant(headers: &HeaderMap, token_company: Uuid) -> Result<TenantContext, AppError> {
    let Some(value) = headers.get(TENANT_ID_HEADER) else {
        return Ok(TenantContext(token_company));
    };

    let requested = value
        .to_str()
        .ok()
        .and_then(|s| Uuid::parse_str(s.trim()).ok())
        .ok_or(AppError::TenantMismatch)?;

    if requested != token_company {
        tracing::warn!(%requested, %token_company, "Acesso a outro tenant bloqueado");
        return Err(AppError::TenantMismatch);
    }

    Ok(TenantContext(requested))
}

// Autenticação + isolamento de tenant num único middleware
pub async fn tenant_guard(
    State(app_state): State<AppState>,
    mut request: axum::extract::Request,
    next: Next,
) -> Response {
    let resolved = authenticate(&app_state, request.headers()).and_then(|identity| {
        resolve_tenant(request.headers(), identity.company_id).map(|tenant| (identity, tenant))
    });

    match resolved {
        Ok((identity, tenant)) => {
            request.extensions_mut().insert(AuthenticatedUser(identity));
            request.extensions_mut().insert(tenant);
            next.run(request).await
        }
        Err(e) => e
            .to_api_error(&Locale::from_headers(request.headers()))
            .into_response(),
    }
}

impl<S> FromRequestParts<S> for TenantContext
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts.extensions.get::<TenantContext>().copied().ok_or_else(|| {
            AppError::TenantMismatch
                .to_api_error(&Locale::from_headers(&parts.headers))
                .into_response()
        })
    }
}
