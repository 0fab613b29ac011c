// src/handlers/attendance.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::{Datelike, NaiveDate, Utc};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::{
    common::{error::ApiError, CompanyCalendar},
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        i18n::Locale,
        rbac::{PermApproveRequests, PermViewOwnAttendance, PermViewTeamAttendance, RequireCapability},
        tenancy::TenantContext,
    },
    models::{
        attendance::DailyAttendanceRecord,
        summary::{MonthlyAttendance, PeriodSummary, SummarySource},
    },
};

// ---
// Query params
// ---

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct DateRangeQuery {
    /// Primeiro dia (inclusive). Padrão: dia 1 do mês corrente
    pub from: Option<NaiveDate>,
    /// Último dia (inclusive). Padrão: hoje
    pub to: Option<NaiveDate>,
}

impl DateRangeQuery {
    fn resolve(&self, calendar: &CompanyCalendar) -> (NaiveDate, NaiveDate) {
        let (month_start, today) = calendar.current_month_until(Utc::now());
        (self.from.unwrap_or(month_start), self.to.unwrap_or(today))
    }
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct SummaryQuery {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    /// "records" (padrão) ou "events"
    #[serde(default)]
    #[param(value_type = Option<String>)]
    pub source: SummarySource,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct MonthQuery {
    /// Padrão: ano corrente
    pub year: Option<i32>,
    /// 1-12. Padrão: mês corrente
    pub month: Option<u32>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApprovalPayload {
    pub approved: bool,
}

// ---
// Próprio usuário
// ---

// GET /api/attendance/records
#[utoipa::path(
    get,
    path = "/api/attendance/records",
    tag = "Attendance",
    params(DateRangeQuery),
    responses(
        (status = 200, description = "Registros diários do período", body = [DailyAttendanceRecord]),
        (status = 400, description = "Período inválido")
    ),
    security(
        ("api_jwt" = [])
    )
)]
pub async fn list_my_records(
    State(app_state): State<AppState>,
    locale: Locale,
    _perm: RequireCapability<PermViewOwnAttendance>,
    AuthenticatedUser(identity): AuthenticatedUser,
    tenant: TenantContext,
    Query(query): Query<DateRangeQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let service = &app_state.attendance_service;
    let (from, to) = query.resolve(service.calendar());

    let records = service
        .list_records(tenant.0, identity.user_id, from, to)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(records)))
}

// GET /api/attendance/summary
#[utoipa::path(
    get,
    path = "/api/attendance/summary",
    tag = "Attendance",
    params(SummaryQuery),
    responses(
        (status = 200, description = "Totais do período", body = PeriodSummary),
        (status = 400, description = "Período inválido"),
        (status = 500, description = "Registro com valores negativos")
    ),
    security(
        ("api_jwt" = [])
    )
)]
pub async fn get_my_summary(
    State(app_state): State<AppState>,
    locale: Locale,
    _perm: RequireCapability<PermViewOwnAttendance>,
    AuthenticatedUser(identity): AuthenticatedUser,
    tenant: TenantContext,
    Query(query): Query<SummaryQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let service = &app_state.attendance_service;
    let range = DateRangeQuery { from: query.from, to: query.to };
    let (from, to) = range.resolve(service.calendar());

    let summary = service
        .period_summary(tenant.0, identity.user_id, from, to, query.source)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(summary)))
}

// GET /api/attendance/monthly
#[utoipa::path(
    get,
    path = "/api/attendance/monthly",
    tag = "Attendance",
    params(MonthQuery),
    responses(
        (status = 200, description = "Registros e totais do mês", body = MonthlyAttendance),
        (status = 400, description = "Mês inválido")
    ),
    security(
        ("api_jwt" = [])
    )
)]
pub async fn get_my_month(
    State(app_state): State<AppState>,
    locale: Locale,
    _perm: RequireCapability<PermViewOwnAttendance>,
    AuthenticatedUser(identity): AuthenticatedUser,
    tenant: TenantContext,
    Query(query): Query<MonthQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let service = &app_state.attendance_service;
    let today = service.calendar().local_date(Utc::now());

    let monthly: MonthlyAttendance = service
        .monthly(
            tenant.0,
            identity.user_id,
            query.year.unwrap_or(today.year()),
            query.month.unwrap_or(today.month()),
        )
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(monthly)))
}

// ---
// Equipe (gestores)
// ---

// GET /api/attendance/users/{user_id}/records
#[utoipa::path(
    get,
    path = "/api/attendance/users/{user_id}/records",
    tag = "Attendance",
    params(
        ("user_id" = Uuid, Path, description = "ID do funcionário"),
        DateRangeQuery
    ),
    responses(
        (status = 200, description = "Registros diários do funcionário", body = [DailyAttendanceRecord]),
        (status = 403, description = "Sem a capacidade view_team_attendance")
    ),
    security(
        ("api_jwt" = [])
    )
)]
pub async fn list_user_records(
    State(app_state): State<AppState>,
    locale: Locale,
    _perm: RequireCapability<PermViewTeamAttendance>,
    tenant: TenantContext,
    Path(user_id): Path<Uuid>,
    Query(query): Query<DateRangeQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let service = &app_state.attendance_service;
    let (from, to) = query.resolve(service.calendar());

    let records = service
        .list_records(tenant.0, user_id, from, to)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(records)))
}

// GET /api/attendance/users/{user_id}/summary
#[utoipa::path(
    get,
    path = "/api/attendance/users/{user_id}/summary",
    tag = "Attendance",
    params(
        ("user_id" = Uuid, Path, description = "ID do funcionário"),
        SummaryQuery
    ),
    responses(
        (status = 200, description = "Totais do funcionário no período", body = PeriodSummary),
        (status = 403, description = "Sem a capacidade view_team_attendance")
    ),
    security(
        ("api_jwt" = [])
    )
)]
pub async fn get_user_summary(
    State(app_state): State<AppState>,
    locale: Locale,
    _perm: RequireCapability<PermViewTeamAttendance>,
    tenant: TenantContext,
    Path(user_id): Path<Uuid>,
    Query(query): Query<SummaryQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let service = &app_state.attendance_service;
    let range = DateRangeQuery { from: query.from, to: query.to };
    let (from, to) = range.resolve(service.calendar());

    let summary = service
        .period_summary(tenant.0, user_id, from, to, query.source)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(summary)))
}

// GET /api/attendance/company/summary
#[utoipa::path(
    get,
    path = "/api/attendance/company/summary",
    tag = "Attendance",
    params(DateRangeQuery),
    responses(
        (status = 200, description = "Totais de todos os funcionários da empresa", body = PeriodSummary),
        (status = 403, description = "Sem a capacidade view_team_attendance")
    ),
    security(
        ("api_jwt" = [])
    )
)]
pub async fn get_company_summary(
    State(app_state): State<AppState>,
    locale: Locale,
    _perm: RequireCapability<PermViewTeamAttendance>,
    tenant: TenantContext,
    Query(query): Query<DateRangeQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let service = &app_state.attendance_service;
    let (from, to) = query.resolve(service.calendar());

    let summary = service
        .company_summary(tenant.0, from, to)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(summary)))
}

// POST /api/attendance/users/{user_id}/days/{date}/reconcile
#[utoipa::path(
    post,
    path = "/api/attendance/users/{user_id}/days/{date}/reconcile",
    tag = "Attendance",
    params(
        ("user_id" = Uuid, Path, description = "ID do funcionário"),
        ("date" = String, Path, description = "Dia no calendário da empresa (AAAA-MM-DD)")
    ),
    responses(
        (status = 200, description = "Registro recalculado a partir das batidas", body = DailyAttendanceRecord),
        (status = 403, description = "Sem a capacidade approve_requests")
    ),
    security(
        ("api_jwt" = [])
    )
)]
pub async fn reconcile_user_day(
    State(app_state): State<AppState>,
    locale: Locale,
    _perm: RequireCapability<PermApproveRequests>,
    tenant: TenantContext,
    Path((user_id, date)): Path<(Uuid, NaiveDate)>,
) -> Result<impl IntoResponse, ApiError> {
    let record = app_state
        .attendance_service
        .reconcile_day(tenant.0, user_id, date, Utc::now())
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(record)))
}

// PUT /api/attendance/users/{user_id}/days/{date}/approval
#[utoipa::path(
    put,
    path = "/api/attendance/users/{user_id}/days/{date}/approval",
    tag = "Attendance",
    request_body = ApprovalPayload,
    params(
        ("user_id" = Uuid, Path, description = "ID do funcionário"),
        ("date" = String, Path, description = "Dia no calendário da empresa (AAAA-MM-DD)")
    ),
    responses(
        (status = 200, description = "Aprovação atualizada", body = DailyAttendanceRecord),
        (status = 404, description = "Registro não encontrado")
    ),
    security(
        ("api_jwt" = [])
    )
)]
pub async fn set_day_approval(
    State(app_state): State<AppState>,
    locale: Locale,
    _perm: RequireCapability<PermApproveRequests>,
    AuthenticatedUser(approver): AuthenticatedUser,
    tenant: TenantContext,
    Path((user_id, date)): Path<(Uuid, NaiveDate)>,
    Json(payload): Json<ApprovalPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let record = app_state
        .attendance_service
        .set_approval(tenant.0, user_id, date, payload.approved)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    tracing::info!(
        approver = %approver.user_id,
        %user_id,
        %date,
        approved = payload.approved,
        "Aprovação de registro diário alterada"
    );

    Ok((StatusCode::OK, Json(record)))
}
