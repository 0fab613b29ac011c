// src/models/attendance.rs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;
use uuid::Uuid;

// ---
// 1. PunchType (O "Tipo de Batida")
// ---
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "punch_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PunchType {
    ClockIn,
    ClockOut,
    BreakStart,
    BreakEnd,
}

impl PunchType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PunchType::ClockIn => "clock_in",
            PunchType::ClockOut => "clock_out",
            PunchType::BreakStart => "break_start",
            PunchType::BreakEnd => "break_end",
        }
    }

    /// Rótulo exibido no histórico de batidas, no idioma pedido.
    pub fn label(&self, lang: &str) -> &'static str {
        match (lang, self) {
            ("ja", PunchType::ClockIn) => "出勤",
            ("ja", PunchType::ClockOut) => "退勤",
            ("ja", PunchType::BreakStart) => "休憩入",
            ("ja", PunchType::BreakEnd) => "休憩戻",
            ("pt", PunchType::ClockIn) => "Entrada",
            ("pt", PunchType::ClockOut) => "Saída",
            ("pt", PunchType::BreakStart) => "Início do intervalo",
            ("pt", PunchType::BreakEnd) => "Fim do intervalo",
            (_, PunchType::ClockIn) => "Clock in",
            (_, PunchType::ClockOut) => "Clock out",
            (_, PunchType::BreakStart) => "Break start",
            (_, PunchType::BreakEnd) => "Break end",
        }
    }
}

impl std::fmt::Display for PunchType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---
// 2. PunchEvent (O fato imutável)
// ---
// Nunca é alterado nem apagado depois de gravado.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PunchEvent {
    #[schema(example = "550e8400-e29b-41d4-a716-446655440000")]
    pub id: Uuid,

    #[schema(ignore)] // vem do token
    pub company_id: Uuid,

    pub user_id: Uuid,

    #[sqlx(rename = "entry_type")]
    #[serde(rename = "type")]
    pub punch_type: PunchType,

    pub timestamp: DateTime<Utc>,

    #[schema(example = "Escritório Central")]
    pub location: Option<String>,

    pub notes: Option<String>,

    pub created_at: DateTime<Utc>,
}

// O que o serviço entrega ao gateway para gravar (o id é atribuído pelo store)
#[derive(Debug, Clone)]
pub struct NewPunchEvent {
    pub company_id: Uuid,
    pub user_id: Uuid,
    pub punch_type: PunchType,
    pub timestamp: DateTime<Utc>,
    pub location: Option<String>,
    pub notes: Option<String>,
}

// ---
// 3. AttendanceStatus (Situação do dia)
// ---
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "attendance_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum AttendanceStatus {
    Present,
    Absent,
    Leave,
    Holiday,
}

// ---
// 4. DailyAttendanceRecord (Resumo diário)
// ---
// No máximo um por (company_id, user_id, date).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DailyAttendanceRecord {
    pub id: Uuid,

    #[schema(ignore)]
    pub company_id: Uuid,

    pub user_id: Uuid,

    #[schema(example = "2025-03-14", value_type = String)]
    pub date: NaiveDate,

    pub clock_in: Option<DateTime<Utc>>,
    pub clock_out: Option<DateTime<Utc>>,

    #[schema(example = 480)]
    pub total_work_minutes: Option<i32>,
    #[schema(example = 60)]
    pub total_break_minutes: Option<i32>,
    #[schema(example = 0)]
    pub overtime_minutes: Option<i32>,

    pub status: AttendanceStatus,
    pub is_approved: bool,

    pub updated_at: DateTime<Utc>,
}

impl DailyAttendanceRecord {
    /// Os números que a reconciliação calcula; usado para decidir se a aprovação continua válida.
    pub fn same_figures(&self, other: &DailyAttendanceRecord) -> bool {
        self.clock_in == other.clock_in
            && self.clock_out == other.clock_out
            && self.total_work_minutes == other.total_work_minutes
            && self.total_break_minutes == other.total_break_minutes
            && self.overtime_minutes == other.overtime_minutes
            && self.status == other.status
    }
}

// ---
// 5. Entrada do histórico (com rótulo traduzido)
// ---
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PunchEntryView {
    #[serde(flatten)]
    pub event: PunchEvent,

    #[schema(example = "出勤")]
    pub label: String,
}

// ---
// 6. Payload de batida (POST /api/time-clock/punches)
// ---
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmitPunchPayload {
    #[serde(rename = "type")]
    pub punch_type: PunchType,

    /// Omitido: usa o horário do servidor.
    pub timestamp: Option<DateTime<Utc>>,

    #[validate(length(max = 200, message = "O local deve ter no máximo 200 caracteres."))]
    pub location: Option<String>,

    #[validate(length(max = 500, message = "A observação deve ter no máximo 500 caracteres."))]
    pub notes: Option<String>,
}

impl SubmitPunchPayload {
    pub fn new(punch_type: PunchType) -> Self {
        Self {
            punch_type,
            timestamp: None,
            location: None,
            notes: None,
        }
    }

    pub fn at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }
}
