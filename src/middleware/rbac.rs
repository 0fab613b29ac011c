// src/middleware/rbac.rs

use axum::{
    extract::FromRequestParts,
    http::request::Parts,
    response::{IntoResponse, Response},
};
use std::marker::PhantomData;

use crate::{
    common::error::AppError,
    middleware::{auth::AuthenticatedUser, i18n::Locale},
    models::auth::Capability,
};

/// 1. O Trait que define uma capacidade exigida pela rota
pub trait CapabilityDef: Send + Sync + 'static {
    fn capability() -> Capability;
}

/// 2. O Extractor (Guardião)
pub struct RequireCapability<T>(pub PhantomData<T>);

// 3. Implementação do FromRequestParts
// O cargo vem do token, então não há consulta ao banco.
impl<T, S> FromRequestParts<S> for RequireCapability<T>
where
    T: CapabilityDef,
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let locale = Locale::from_headers(&parts.headers);
        let reject = |e: AppError| e.to_api_error(&locale).into_response();

        // A. Extrai Usuário
        let user = parts
            .extensions
            .get::<AuthenticatedUser>()
            .ok_or_else(|| reject(AppError::InvalidToken))?;

        // B. Verifica o cargo
        let required = T::capability();
        if !user.0.role.has(required) {
            tracing::debug!(user_id = %user.0.user_id, "Permissão '{}' negada", required.slug());
            return Err(reject(AppError::MissingCapability(required)));
        }

        Ok(RequireCapability(PhantomData))
    }
}

// ---
// DEFINIÇÃO DAS CAPACIDADES (TIPOS)
// ---

pub struct PermRecordTime;
impl CapabilityDef for PermRecordTime {
    fn capability() -> Capability { Capability::RecordTime }
}

pub struct PermViewOwnAttendance;
impl CapabilityDef for PermViewOwnAttendance {
    fn capability() -> Capability { Capability::ViewOwnAttendance }
}

pub struct PermViewTeamAttendance;
impl CapabilityDef for PermViewTeamAttendance {
    fn capability() -> Capability { Capability::ViewTeamAttendance }
}

pub struct PermApproveRequests;
impl CapabilityDef for PermApproveRequests {
    fn capability() -> Capability { Capability::ApproveRequests }
}
