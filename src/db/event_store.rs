// src/db/event_store.rs

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::{
    common::CompanyCalendar,
    models::attendance::{DailyAttendanceRecord, NewPunchEvent, PunchEvent},
};

#[derive(Debug, Error)]
pub enum StoreError {
    /// A última batida do usuário mudou entre a leitura e a escrita.
    #[error("a última batida do usuário mudou durante a gravação")]
    Conflict,

    #[error("erro de banco de dados: {0}")]
    Database(#[from] sqlx::Error),
}

// ---
// O "Gateway" de eventos de ponto
// ---
// Toda operação recebe `company_id`: nenhum método cruza tenants.
#[async_trait]
pub trait EventStore: Send + Sync {
    /// Grava a batida se a última batida *gravada* do usuário ainda for `expected_guard`.
    /// Escritas do mesmo (company_id, user_id) são serializadas pelo store.
    async fn append_event(
        &self,
        event: NewPunchEvent,
        expected_guard: Option<Uuid>,
    ) -> Result<PunchEvent, StoreError>;

    /// Versão do usuário: id da última batida em ordem de inserção, não de horário.
    /// Uma batida retroativa também muda a versão.
    async fn append_guard(
        &self,
        company_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Uuid>, StoreError>;

    async fn latest_event(
        &self,
        company_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<PunchEvent>, StoreError>;

    /// Batidas em `[from, to)`, em ordem crescente de horário.
    async fn events_in_range(
        &self,
        company_id: Uuid,
        user_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<PunchEvent>, StoreError>;

    /// Últimas `limit` batidas, da mais recente para a mais antiga.
    async fn recent_events(
        &self,
        company_id: Uuid,
        user_id: Uuid,
        limit: i64,
    ) -> Result<Vec<PunchEvent>, StoreError>;

    /// Registros diários em `[from, to]`; `user_id = None` traz a empresa inteira.
    async fn records_in_range(
        &self,
        company_id: Uuid,
        user_id: Option<Uuid>,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<DailyAttendanceRecord>, StoreError>;

    async fn find_record(
        &self,
        company_id: Uuid,
        user_id: Uuid,
        date: NaiveDate,
    ) -> Result<Option<DailyAttendanceRecord>, StoreError>;

    /// Insere ou substitui o registro de (company_id, user_id, date), mantendo o id existente.
    ///
    /// Na substituição o `is_approved` recebido é ignorado: a aprovação gravada continua
    /// se os números não mudaram e cai para `false` se mudaram, decidido na própria escrita.
    async fn upsert_record(
        &self,
        record: DailyAttendanceRecord,
    ) -> Result<DailyAttendanceRecord, StoreError>;

    async fn set_record_approval(
        &self,
        company_id: Uuid,
        user_id: Uuid,
        date: NaiveDate,
        approved: bool,
    ) -> Result<Option<DailyAttendanceRecord>, StoreError>;

    /// Batidas de um dia civil da empresa, em ordem crescente.
    async fn events_for_day(
        &self,
        company_id: Uuid,
        user_id: Uuid,
        date: NaiveDate,
        calendar: &CompanyCalendar,
    ) -> Result<Vec<PunchEvent>, StoreError> {
        let (from, to) = calendar.day_bounds(date);
        self.events_in_range(company_id, user_id, from, to).await
    }
}
