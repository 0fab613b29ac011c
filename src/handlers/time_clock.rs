// src/handlers/time_clock.rs

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use utoipa::IntoParams;

use crate::{
    common::error::ApiError,
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        i18n::Locale,
        rbac::{PermRecordTime, RequireCapability},
    },
    models::attendance::{PunchEntryView, SubmitPunchPayload},
    services::state_machine::CurrentStatus,
};

#[derive(Debug, Deserialize, IntoParams)]
pub struct RecentEntriesQuery {
    /// Quantidade de batidas (padrão 10, máximo 100)
    pub limit: Option<i64>,
}

// GET /api/time-clock/status
#[utoipa::path(
    get,
    path = "/api/time-clock/status",
    tag = "Time Clock",
    responses(
        (status = 200, description = "Situação atual e ações permitidas", body = CurrentStatus),
        (status = 401, description = "Não autorizado"),
        (status = 403, description = "Sem acesso à empresa")
    ),
    params(
        ("x-tenant-id" = Option<uuid::Uuid>, Header, description = "ID da empresa (deve ser a do token)")
    ),
    security(
        ("api_jwt" = [])
    )
)]
pub async fn get_status(
    State(app_state): State<AppState>,
    locale: Locale,
    _perm: RequireCapability<PermRecordTime>,
    AuthenticatedUser(identity): AuthenticatedUser,
) -> Result<impl IntoResponse, ApiError> {
    let status = app_state
        .time_clock_service
        .current_status(&identity, Utc::now())
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(status)))
}

// POST /api/time-clock/punches
#[utoipa::path(
    post,
    path = "/api/time-clock/punches",
    tag = "Time Clock",
    request_body = SubmitPunchPayload,
    responses(
        (status = 201, description = "Batida registrada", body = CurrentStatus),
        (status = 400, description = "Payload inválido"),
        (status = 409, description = "Batida não permitida no estado atual ou concorrente"),
        (status = 422, description = "Horário anterior à última batida do dia")
    ),
    params(
        ("x-tenant-id" = Option<uuid::Uuid>, Header, description = "ID da empresa (deve ser a do token)")
    ),
    security(
        ("api_jwt" = [])
    )
)]
pub async fn submit_punch(
    State(app_state): State<AppState>,
    locale: Locale,
    _perm: RequireCapability<PermRecordTime>,
    AuthenticatedUser(identity): AuthenticatedUser,
    Json(payload): Json<SubmitPunchPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let status = app_state
        .time_clock_service
        .submit_punch(&identity, payload, Utc::now())
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::CREATED, Json(status)))
}

// GET /api/time-clock/entries
#[utoipa::path(
    get,
    path = "/api/time-clock/entries",
    tag = "Time Clock",
    params(
        RecentEntriesQuery,
        ("x-tenant-id" = Option<uuid::Uuid>, Header, description = "ID da empresa (deve ser a do token)")
    ),
    responses(
        (status = 200, description = "Últimas batidas, da mais recente para a mais antiga", body = [PunchEntryView])
    ),
    security(
        ("api_jwt" = [])
    )
)]
pub async fn list_recent_entries(
    State(app_state): State<AppState>,
    locale: Locale,
    _perm: RequireCapability<PermRecordTime>,
    AuthenticatedUser(identity): AuthenticatedUser,
    Query(query): Query<RecentEntriesQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let entries: Vec<PunchEntryView> = app_state
        .time_clock_service
        .recent_entries(&identity, query.limit)
        .await
        .map_err(|e| e.to_api_error(&locale))?
        .into_iter()
        .map(|event| PunchEntryView {
            label: event.punch_type.label(&locale.0).to_string(),
            event,
        })
        .collect();

    Ok(Json(entries))
}
