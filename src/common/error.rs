use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;

use crate::{
    db::StoreError,
    middleware::i18n::Locale,
    models::{attendance::PunchType, auth::Capability},
    services::{aggregator::AggregationError, state_machine::AttendanceState},
};

// Nosso tipo de erro de domínio, com `thiserror` para melhor ergonomia.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Batida '{attempted}' não permitida no estado {state}")]
    IllegalTransition {
        state: AttendanceState,
        attempted: PunchType,
    },

    #[error("Horário da batida anterior à última batida do dia")]
    TimestampBeforeLatest,

    #[error("Outra batida foi registrada ao mesmo tempo")]
    ConcurrentPunch,

    #[error("Dados de ponto inconsistentes: {0}")]
    DataIntegrity(#[from] AggregationError),

    #[error("Token inválido")]
    InvalidToken,

    #[error("Tenant do cabeçalho difere do tenant do token")]
    TenantMismatch,

    #[error("Permissão ausente: {}", .0.slug())]
    MissingCapability(Capability),

    #[error("Registro diário não encontrado")]
    RecordNotFound,

    #[error("Intervalo de datas inválido")]
    InvalidRange,

    #[error("Erro no armazenamento de eventos: {0}")]
    Store(StoreError),

    // Variante genérica para qualquer outro erro inesperado
    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            // A escrita condicional perdeu a corrida para outra batida
            StoreError::Conflict => AppError::ConcurrentPunch,
            other => AppError::Store(other),
        }
    }
}

// O erro que vai para o cliente
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub error: String,
    pub details: Option<Value>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match self.details {
            Some(details) => json!({ "error": self.error, "details": details }),
            None => json!({ "error": self.error }),
        };
        (self.status, Json(body)).into_response()
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) | AppError::InvalidRange => StatusCode::BAD_REQUEST,
            AppError::IllegalTransition { .. } | AppError::ConcurrentPunch => StatusCode::CONFLICT,
            AppError::TimestampBeforeLatest => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::InvalidToken => StatusCode::UNAUTHORIZED,
            AppError::TenantMismatch | AppError::MissingCapability(_) => StatusCode::FORBIDDEN,
            AppError::RecordNotFound => StatusCode::NOT_FOUND,
            AppError::DataIntegrity(_) | AppError::Store(_) | AppError::InternalServerError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Converte o erro de domínio na resposta da API, traduzida para o idioma do cliente.
    pub fn to_api_error(&self, locale: &Locale) -> ApiError {
        let status = self.status();
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!("Erro Interno do Servidor: {}", self);
        }

        let details = match self {
            AppError::ValidationError(errors) => {
                let mut fields = serde_json::Map::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
                        .collect();
                    fields.insert(field.to_string(), json!(messages));
                }
                Some(Value::Object(fields))
            }
            AppError::IllegalTransition { state, attempted } => Some(json!({
                "state": state,
                "attempted": attempted,
                "allowed": state.allowed_punches(),
            })),
            AppError::MissingCapability(cap) => Some(json!({ "capability": cap.slug() })),
            _ => None,
        };

        ApiError {
            status,
            error: self.message(&locale.0).to_string(),
            details,
        }
    }

    fn message(&self, lang: &str) -> &'static str {
        match (lang, self) {
            ("pt", AppError::ValidationError(_)) => "Um ou mais campos são inválidos.",
            ("pt", AppError::IllegalTransition { .. }) => "Esta batida não é permitida no estado atual.",
            ("pt", AppError::TimestampBeforeLatest) => "O horário não pode ser anterior à última batida do dia.",
            ("pt", AppError::ConcurrentPunch) => "Outra batida foi registrada ao mesmo tempo. Atualize e tente novamente.",
            ("pt", AppError::InvalidToken) => "Token de autenticação inválido ou ausente.",
            ("pt", AppError::TenantMismatch) => "Sem acesso a esta empresa.",
            ("pt", AppError::MissingCapability(_)) => "Você não tem permissão para realizar esta ação.",
            ("pt", AppError::RecordNotFound) => "Registro diário não encontrado.",
            ("pt", AppError::InvalidRange) => "Intervalo de datas inválido.",
            ("pt", _) => "Ocorreu um erro inesperado.",

            ("ja", AppError::ValidationError(_)) => "入力内容に誤りがあります。",
            ("ja", AppError::IllegalTransition { .. }) => "現在の状態ではこの打刻はできません。",
            ("ja", AppError::TimestampBeforeLatest) => "本日の最新の打刻より前の時刻は記録できません。",
            ("ja", AppError::ConcurrentPunch) => "同時に別の打刻が記録されました。再読み込みしてください。",
            ("ja", AppError::InvalidToken) => "認証トークンが無効です。",
            ("ja", AppError::TenantMismatch) => "この会社へのアクセス権がありません。",
            ("ja", AppError::MissingCapability(_)) => "この操作を行う権限がありません。",
            ("ja", AppError::RecordNotFound) => "勤怠記録が見つかりません。",
            ("ja", AppError::InvalidRange) => "期間の指定が正しくありません。",
            ("ja", _) => "打刻の記録に失敗しました。",

            (_, AppError::ValidationError(_)) => "One or more fields are invalid.",
            (_, AppError::IllegalTransition { .. }) => "This punch is not allowed in the current state.",
            (_, AppError::TimestampBeforeLatest) => "The punch time cannot precede today's latest punch.",
            (_, AppError::ConcurrentPunch) => "Another punch was recorded at the same time. Refresh and retry.",
            (_, AppError::InvalidToken) => "Missing or invalid authentication token.",
            (_, AppError::TenantMismatch) => "No access to this company.",
            (_, AppError::MissingCapability(_)) => "You are not allowed to perform this action.",
            (_, AppError::RecordNotFound) => "Daily attendance record not found.",
            (_, AppError::InvalidRange) => "Invalid date range.",
            (_, _) => "An unexpected error occurred.",
        }
    }
}

// Middlewares não têm acesso ao Locale; respondem no idioma padrão.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.to_api_error(&Locale::default()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn illegal_transition_carries_state_and_allowed_actions() {
        let err = AppError::IllegalTransition {
            state: AttendanceState::NotClockedIn,
            attempted: PunchType::BreakEnd,
        };
        let api = err.to_api_error(&Locale("en".into()));
        assert_eq!(api.status, StatusCode::CONFLICT);
        let details = api.details.unwrap();
        assert_eq!(details["state"], "not_clocked_in");
        assert_eq!(details["attempted"], "break_end");
        assert_eq!(details["allowed"], json!(["clock_in"]));
    }

    #[test]
    fn store_conflict_becomes_concurrent_punch() {
        let err: AppError = StoreError::Conflict.into();
        assert!(matches!(err, AppError::ConcurrentPunch));
        assert_eq!(err.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn messages_follow_locale() {
        let err = AppError::TenantMismatch;
        assert_eq!(err.to_api_error(&Locale("ja".into())).error, "この会社へのアクセス権がありません。");
        assert_eq!(err.to_api_error(&Locale("pt".into())).error, "Sem acesso a esta empresa.");
        assert_eq!(err.to_api_error(&Locale("fr".into())).error, "No access to this company.");
    }
}
