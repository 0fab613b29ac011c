// src/db/test_support.rs
//
// Store para testes que abre janelas de corrida em pontos escolhidos.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use crate::{
    db::{EventStore, InMemoryEventStore, StoreError},
    models::attendance::{DailyAttendanceRecord, NewPunchEvent, PunchEvent},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hook {
    /// Devolve o controle ao executor antes de gravar a batida.
    YieldBeforeAppend,
    /// Um gestor aprova o registro logo depois de ele ser lido.
    ApproveAfterFind,
}

pub struct HookedStore {
    pub inner: InMemoryEventStore,
    hook: Hook,
}

impl HookedStore {
    pub fn new(hook: Hook) -> Self {
        Self {
            inner: InMemoryEventStore::new(),
            hook,
        }
    }
}

#[async_trait]
impl EventStore for HookedStore {
    async fn append_event(
        &self,
        event: NewPunchEvent,
        expected_guard: Option<Uuid>,
    ) -> Result<PunchEvent, StoreError> {
        if self.hook == Hook::YieldBeforeAppend {
            tokio::task::yield_now().await;
        }
        self.inner.append_event(event, expected_guard).await
    }

    async fn append_guard(&self, company_id: Uuid, user_id: Uuid) -> Result<Option<Uuid>, StoreError> {
        self.inner.append_guard(company_id, user_id).await
    }

    async fn latest_event(&self, company_id: Uuid, user_id: Uuid) -> Result<Option<PunchEvent>, StoreError> {
        self.inner.latest_event(company_id, user_id).await
    }

    async fn events_in_range(
        &self,
        company_id: Uuid,
        user_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<PunchEvent>, StoreError> {
        self.inner.events_in_range(company_id, user_id, from, to).await
    }

    async fn recent_events(&self, company_id: Uuid, user_id: Uuid, limit: i64) -> Result<Vec<PunchEvent>, StoreError> {
        self.inner.recent_events(company_id, user_id, limit).await
    }

    async fn records_in_range(
        &self,
        company_id: Uuid,
        user_id: Option<Uuid>,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<DailyAttendanceRecord>, StoreError> {
        self.inner.records_in_range(company_id, user_id, from, to).await
    }

    async fn find_record(
        &self,
        company_id: Uuid,
        user_id: Uuid,
        date: NaiveDate,
    ) -> Result<Option<DailyAttendanceRecord>, StoreError> {
        let found = self.inner.find_record(company_id, user_id, date).await?;
        if self.hook == Hook::ApproveAfterFind && found.is_some() {
            self.inner.set_record_approval(company_id, user_id, date, true).await?;
        }
        Ok(found)
    }

    async fn upsert_record(&self, record: DailyAttendanceRecord) -> Result<DailyAttendanceRecord, StoreError> {
        self.inner.upsert_record(record).await
    }

    async fn set_record_approval(
        &self,
        company_id: Uuid,
        user_id: Uuid,
        date: NaiveDate,
        approved: bool,
    ) -> Result<Option<DailyAttendanceRecord>, StoreError> {
        self.inner.set_record_approval(company_id, user_id, date, approved).await
    }
}
