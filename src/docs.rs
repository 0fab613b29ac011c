// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use crate::handlers;
use crate::models;
use crate::services;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Users ---
        handlers::auth::get_my_capabilities,

        // --- Time Clock ---
        handlers::time_clock::get_status,
        handlers::time_clock::submit_punch,
        handlers::time_clock::list_recent_entries,

        // --- Attendance ---
        handlers::attendance::list_my_records,
        handlers::attendance::get_my_summary,
        handlers::attendance::get_my_month,
        handlers::attendance::list_user_records,
        handlers::attendance::get_user_summary,
        handlers::attendance::get_company_summary,
        handlers::attendance::reconcile_user_day,
        handlers::attendance::set_day_approval,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::Role,
            models::auth::Capability,
            models::auth::Identity,
            models::auth::CapabilitiesResponse,

            // --- Time Clock ---
            models::attendance::PunchType,
            models::attendance::PunchEvent,
            models::attendance::PunchEntryView,
            models::attendance::SubmitPunchPayload,
            services::state_machine::AttendanceState,
            services::state_machine::CurrentStatus,

            // --- Attendance ---
            models::attendance::AttendanceStatus,
            models::attendance::DailyAttendanceRecord,
            models::summary::PeriodStats,
            models::summary::DataIntegrityWarning,
            models::summary::SummarySource,
            models::summary::PeriodSummary,
            models::summary::MonthlyAttendance,
            handlers::attendance::ApprovalPayload,
        )
    ),
    tags(
        (name = "Users", description = "Identidade e capacidades do usuário"),
        (name = "Time Clock", description = "Batidas de ponto e situação atual"),
        (name = "Attendance", description = "Registros diários, totais e aprovação")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(
                Http::new(HttpAuthScheme::Bearer)
            ),
        );
    }
}
