// src/models/summary.rs

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::attendance::DailyAttendanceRecord;

// ---
// 1. Estatísticas de um período (os cards do topo da tela de ponto)
// ---
#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PeriodStats {
    pub total_work_minutes: u64,
    pub total_break_minutes: u64,
    pub overtime_minutes: u64,
    #[schema(example = 15.5)]
    pub total_work_hours: f64,
    #[schema(example = 1.6)]
    pub overtime_hours: f64,
    pub days_present: u32,
    pub record_count: u32,
    pub warnings: Vec<DataIntegrityWarning>,
}

// ---
// 2. Avisos de integridade (não fatais)
// ---
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, ToSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DataIntegrityWarning {
    /// Registro "present" sem minutos trabalhados; contado como zero.
    MissingWorkMinutes {
        #[schema(value_type = String)]
        date: NaiveDate,
    },
}

// De onde a agregação lê os dados
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SummarySource {
    #[default]
    Records,
    Events,
}

// Resposta de /api/attendance/summary
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PeriodSummary {
    #[schema(value_type = String)]
    pub from: NaiveDate,
    #[schema(value_type = String)]
    pub to: NaiveDate,
    pub stats: PeriodStats,
    #[schema(example = "15:30")]
    pub total_work_display: String,
    #[schema(example = "1:35")]
    pub overtime_display: String,
}

// Resposta de /api/attendance/monthly
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyAttendance {
    pub year: i32,
    pub month: u32,
    pub records: Vec<DailyAttendanceRecord>,
    pub summary: PeriodSummary,
}
