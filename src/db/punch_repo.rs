// src/db/punch_repo.rs

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    db::event_store::{EventStore, StoreError},
    models::attendance::{DailyAttendanceRecord, NewPunchEvent, PunchEvent},
};

const EVENT_COLUMNS: &str =
    r#"id, company_id, user_id, entry_type, "timestamp", location, notes, created_at"#;

const RECORD_COLUMNS: &str = "id, company_id, user_id, date, clock_in, clock_out, \
     total_work_minutes, total_break_minutes, overtime_minutes, status, is_approved, updated_at";

// Versão do usuário: ordem de inserção (seq), nunca o horário informado pelo cliente
const GUARD_QUERY: &str = r#"
    SELECT id FROM punch_events
    WHERE company_id = $1 AND user_id = $2
    ORDER BY seq DESC
    LIMIT 1
"#;

// O repositório de ponto, responsável pelas tabelas 'punch_events' e 'daily_attendance'
#[derive(Clone)]
pub struct PgEventStore {
    pool: PgPool,
}

impl PgEventStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EventStore for PgEventStore {
    async fn append_event(
        &self,
        event: NewPunchEvent,
        expected_guard: Option<Uuid>,
    ) -> Result<PunchEvent, StoreError> {
        // 1. Inicia Transação
        let mut tx = self.pool.begin().await?;

        // 2. Serializa as escritas deste usuário até o commit
        sqlx::query("SELECT pg_advisory_xact_lock(hashtextextended($1, 0))")
            .bind(format!("{}:{}", event.company_id, event.user_id))
            .execute(&mut *tx)
            .await?;

        // 3. Confere se ninguém gravou desde a leitura do serviço
        let current: Option<Uuid> = sqlx::query_scalar(GUARD_QUERY)
            .bind(event.company_id)
            .bind(event.user_id)
            .fetch_optional(&mut *tx)
            .await?;

        if current != expected_guard {
            // O drop do `tx` faz o rollback e libera o lock
            return Err(StoreError::Conflict);
        }

        // 4. Grava
        let stored = sqlx::query_as::<_, PunchEvent>(&format!(
            r#"
            INSERT INTO punch_events (company_id, user_id, entry_type, "timestamp", location, notes)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {EVENT_COLUMNS}
            "#
        ))
        .bind(event.company_id)
        .bind(event.user_id)
        .bind(event.punch_type)
        .bind(event.timestamp)
        .bind(event.location)
        .bind(event.notes)
        .fetch_one(&mut *tx)
        .await?;

        // 5. Commit
        tx.commit().await?;

        Ok(stored)
    }

    async fn append_guard(
        &self,
        company_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Uuid>, StoreError> {
        let guard = sqlx::query_scalar(GUARD_QUERY)
            .bind(company_id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(guard)
    }

    async fn latest_event(
        &self,
        company_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<PunchEvent>, StoreError> {
        let event = sqlx::query_as::<_, PunchEvent>(&format!(
            r#"
            SELECT {EVENT_COLUMNS} FROM punch_events
            WHERE company_id = $1 AND user_id = $2
            ORDER BY "timestamp" DESC, seq DESC
            LIMIT 1
            "#
        ))
        .bind(company_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(event)
    }

    async fn events_in_range(
        &self,
        company_id: Uuid,
        user_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<PunchEvent>, StoreError> {
        let events = sqlx::query_as::<_, PunchEvent>(&format!(
            r#"
            SELECT {EVENT_COLUMNS} FROM punch_events
            WHERE company_id = $1 AND user_id = $2
              AND "timestamp" >= $3 AND "timestamp" < $4
            ORDER BY "timestamp" ASC, seq ASC
            "#
        ))
        .bind(company_id)
        .bind(user_id)
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;

        Ok(events)
    }

    async fn recent_events(
        &self,
        company_id: Uuid,
        user_id: Uuid,
        limit: i64,
    ) -> Result<Vec<PunchEvent>, StoreError> {
        let events = sqlx::query_as::<_, PunchEvent>(&format!(
            r#"
            SELECT {EVENT_COLUMNS} FROM punch_events
            WHERE company_id = $1 AND user_id = $2
            ORDER BY "timestamp" DESC, seq DESC
            LIMIT $3
            "#
        ))
        .bind(company_id)
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(events)
    }

    async fn records_in_range(
        &self,
        company_id: Uuid,
        user_id: Option<Uuid>,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<DailyAttendanceRecord>, StoreError> {
        // `$2 IS NULL` devolve a empresa inteira
        let records = sqlx::query_as::<_, DailyAttendanceRecord>(&format!(
            r#"
            SELECT {RECORD_COLUMNS} FROM daily_attendance
            WHERE company_id = $1
              AND ($2::uuid IS NULL OR user_id = $2)
              AND date BETWEEN $3 AND $4
            ORDER BY date DESC, user_id
            "#
        ))
        .bind(company_id)
        .bind(user_id)
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    async fn find_record(
        &self,
        company_id: Uuid,
        user_id: Uuid,
        date: NaiveDate,
    ) -> Result<Option<DailyAttendanceRecord>, StoreError> {
        let record = sqlx::query_as::<_, DailyAttendanceRecord>(&format!(
            r#"
            SELECT {RECORD_COLUMNS} FROM daily_attendance
            WHERE company_id = $1 AND user_id = $2 AND date = $3
            "#
        ))
        .bind(company_id)
        .bind(user_id)
        .bind(date)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    async fn upsert_record(
        &self,
        record: DailyAttendanceRecord,
    ) -> Result<DailyAttendanceRecord, StoreError> {
        let saved = sqlx::query_as::<_, DailyAttendanceRecord>(&format!(
            r#"
            INSERT INTO daily_attendance (
                id, company_id, user_id, date, clock_in, clock_out,
                total_work_minutes, total_break_minutes, overtime_minutes,
                status, is_approved, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            ON CONFLICT (company_id, user_id, date) DO UPDATE SET
                clock_in = EXCLUDED.clock_in,
                clock_out = EXCLUDED.clock_out,
                total_work_minutes = EXCLUDED.total_work_minutes,
                total_break_minutes = EXCLUDED.total_break_minutes,
                overtime_minutes = EXCLUDED.overtime_minutes,
                status = EXCLUDED.status,
                -- Aprovação só sobrevive se os números continuarem os mesmos
                is_approved = daily_attendance.is_approved
                    AND daily_attendance.clock_in IS NOT DISTINCT FROM EXCLUDED.clock_in
                    AND daily_attendance.clock_out IS NOT DISTINCT FROM EXCLUDED.clock_out
                    AND daily_attendance.total_work_minutes IS NOT DISTINCT FROM EXCLUDED.total_work_minutes
                    AND daily_attendance.total_break_minutes IS NOT DISTINCT FROM EXCLUDED.total_break_minutes
                    AND daily_attendance.overtime_minutes IS NOT DISTINCT FROM EXCLUDED.overtime_minutes
                    AND daily_attendance.status = EXCLUDED.status,
                updated_at = EXCLUDED.updated_at
            RETURNING {RECORD_COLUMNS}
            "#
        ))
        .bind(record.id)
        .bind(record.company_id)
        .bind(record.user_id)
        .bind(record.date)
        .bind(record.clock_in)
        .bind(record.clock_out)
        .bind(record.total_work_minutes)
        .bind(record.total_break_minutes)
        .bind(record.overtime_minutes)
        .bind(record.status)
        .bind(record.is_approved)
        .bind(record.updated_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(saved)
    }

    async fn set_record_approval(
        &self,
        company_id: Uuid,
        user_id: Uuid,
        date: NaiveDate,
        approved: bool,
    ) -> Result<Option<DailyAttendanceRecord>, StoreError> {
        let record = sqlx::query_as::<_, DailyAttendanceRecord>(&format!(
            r#"
            UPDATE daily_attendance
            SET is_approved = $4, updated_at = NOW()
            WHERE company_id = $1 AND user_id = $2 AND date = $3
            RETURNING {RECORD_COLUMNS}
            "#
        ))
        .bind(company_id)
        .bind(user_id)
        .bind(date)
        .bind(approved)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }
}
