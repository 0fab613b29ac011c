// src/handlers/auth.rs

use axum::Json;

use crate::{
    middleware::auth::AuthenticatedUser,
    models::auth::CapabilitiesResponse,
};

// GET /api/me/capabilities
// O frontend monta o menu a partir desta lista, em vez de comparar strings de cargo.
#[utoipa::path(
    get,
    path = "/api/me/capabilities",
    tag = "Users",
    responses(
        (status = 200, description = "Identidade e capacidades do usuário", body = CapabilitiesResponse),
        (status = 401, description = "Não autorizado")
    ),
    security(
        ("api_jwt" = [])
    )
)]
pub async fn get_my_capabilities(
    AuthenticatedUser(identity): AuthenticatedUser,
) -> Json<CapabilitiesResponse> {
    Json(CapabilitiesResponse {
        capabilities: identity.role.capabilities(),
        identity,
    })
}
