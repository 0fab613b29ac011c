// src/db/memory_store.rs

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    db::event_store::{EventStore, StoreError},
    models::attendance::{DailyAttendanceRecord, NewPunchEvent, PunchEvent},
};

type UserKey = (Uuid, Uuid);

#[derive(Default)]
struct Inner {
    // Ordem de inserção por usuário; o horário da batida desempata pela posição
    events: HashMap<UserKey, Vec<PunchEvent>>,
    records: HashMap<(Uuid, Uuid, NaiveDate), DailyAttendanceRecord>,
}

// Store em memória: usado nos testes e quando não há DATABASE_URL.
#[derive(Default)]
pub struct InMemoryEventStore {
    inner: RwLock<Inner>,
}

impl InMemoryEventStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn latest(events: &[PunchEvent]) -> Option<&PunchEvent> {
    // Empate no horário: vence a inserção mais recente
    events
        .iter()
        .enumerate()
        .max_by_key(|(pos, e)| (e.timestamp, *pos))
        .map(|(_, e)| e)
}

#[async_trait]
impl EventStore for InMemoryEventStore {
    async fn append_event(
        &self,
        event: NewPunchEvent,
        expected_guard: Option<Uuid>,
    ) -> Result<PunchEvent, StoreError> {
        let mut inner = self.inner.write().await;
        let events = inner
            .events
            .entry((event.company_id, event.user_id))
            .or_default();

        if events.last().map(|e| e.id) != expected_guard {
            return Err(StoreError::Conflict);
        }

        let stored = PunchEvent {
            id: Uuid::new_v4(),
            company_id: event.company_id,
            user_id: event.user_id,
            punch_type: event.punch_type,
            timestamp: event.timestamp,
            location: event.location,
            notes: event.notes,
            created_at: Utc::now(),
        };
        events.push(stored.clone());
        Ok(stored)
    }

    async fn append_guard(
        &self,
        company_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Uuid>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .events
            .get(&(company_id, user_id))
            .and_then(|events| events.last())
            .map(|e| e.id))
    }

    async fn latest_event(
        &self,
        company_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<PunchEvent>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .events
            .get(&(company_id, user_id))
            .and_then(|events| latest(events))
            .cloned())
    }

    async fn events_in_range(
        &self,
        company_id: Uuid,
        user_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<PunchEvent>, StoreError> {
        let inner = self.inner.read().await;
        let mut found: Vec<PunchEvent> = inner
            .events
            .get(&(company_id, user_id))
            .map(|events| {
                events
                    .iter()
                    .filter(|e| e.timestamp >= from && e.timestamp < to)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        // sort_by_key é estável: empates mantêm a ordem de inserção
        found.sort_by_key(|e| e.timestamp);
        Ok(found)
    }

    async fn recent_events(
        &self,
        company_id: Uuid,
        user_id: Uuid,
        limit: i64,
    ) -> Result<Vec<PunchEvent>, StoreError> {
        let inner = self.inner.read().await;
        let mut found: Vec<PunchEvent> = inner
            .events
            .get(&(company_id, user_id))
            .cloned()
            .unwrap_or_default();
        found.sort_by_key(|e| e.timestamp);
        found.reverse();
        found.truncate(usize::try_from(limit.max(0)).unwrap_or(0));
        Ok(found)
    }

    async fn records_in_range(
        &self,
        company_id: Uuid,
        user_id: Option<Uuid>,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<DailyAttendanceRecord>, StoreError> {
        let inner = self.inner.read().await;
        let mut found: Vec<DailyAttendanceRecord> = inner
            .records
            .values()
            .filter(|r| r.company_id == company_id)
            .filter(|r| user_id.is_none_or(|u| r.user_id == u))
            .filter(|r| r.date >= from && r.date <= to)
            .cloned()
            .collect();
        found.sort_by(|a, b| b.date.cmp(&a.date).then(a.user_id.cmp(&b.user_id)));
        Ok(found)
    }

    async fn find_record(
        &self,
        company_id: Uuid,
        user_id: Uuid,
        date: NaiveDate,
    ) -> Result<Option<DailyAttendanceRecord>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.records.get(&(company_id, user_id, date)).cloned())
    }

    async fn upsert_record(
        &self,
        mut record: DailyAttendanceRecord,
    ) -> Result<DailyAttendanceRecord, StoreError> {
        let mut inner = self.inner.write().await;
        let key = (record.company_id, record.user_id, record.date);
        if let Some(existing) = inner.records.get(&key) {
            record.id = existing.id;
            record.is_approved = existing.is_approved && existing.same_figures(&record);
        }
        inner.records.insert(key, record.clone());
        Ok(record)
    }

    async fn set_record_approval(
        &self,
        company_id: Uuid,
        user_id: Uuid,
        date: NaiveDate,
        approved: bool,
    ) -> Result<Option<DailyAttendanceRecord>, StoreError> {
        let mut inner = self.inner.write().await;
        Ok(inner
            .records
            .get_mut(&(company_id, user_id, date))
            .map(|record| {
                record.is_approved = approved;
                record.updated_at = Utc::now();
                record.clone()
            }))
    }
}
