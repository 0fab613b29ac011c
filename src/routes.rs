// src/routes.rs

use axum::{
    middleware as axum_middleware,
    routing::{get, post, put},
    Router,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    config::AppState,
    docs::ApiDoc,
    handlers,
    middleware::{auth::auth_guard, tenancy::tenant_guard},
};

pub fn build_router(app_state: AppState) -> Router {
    // Rotas do usuário (só autenticação)
    let me_routes = Router::new()
        .route("/capabilities", get(handlers::auth::get_my_capabilities))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let time_clock_routes = Router::new()
        .route("/status", get(handlers::time_clock::get_status))
        .route("/punches", post(handlers::time_clock::submit_punch))
        .route("/entries", get(handlers::time_clock::list_recent_entries))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            tenant_guard,
        ));

    let attendance_routes = Router::new()
        .route("/records", get(handlers::attendance::list_my_records))
        .route("/summary", get(handlers::attendance::get_my_summary))
        .route("/monthly", get(handlers::attendance::get_my_month))
        .route("/company/summary", get(handlers::attendance::get_company_summary))
        .route("/users/{user_id}/records", get(handlers::attendance::list_user_records))
        .route("/users/{user_id}/summary", get(handlers::attendance::get_user_summary))
        .route(
            "/users/{user_id}/days/{date}/reconcile",
            post(handlers::attendance::reconcile_user_day),
        )
        .route(
            "/users/{user_id}/days/{date}/approval",
            put(handlers::attendance::set_day_approval),
        )
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            tenant_guard,
        ));

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/api/health", get(|| async { "OK" }))
        .nest("/api/me", me_routes)
        .nest("/api/time-clock", time_clock_routes)
        .nest("/api/attendance", attendance_routes)
        .with_state(app_state)
}
