// src/services/time_clock_service.rs

use std::sync::Arc;

use chrono::{DateTime, Utc};
use validator::Validate;

use crate::{
    common::{error::AppError, CompanyCalendar},
    db::EventStore,
    models::{
        attendance::{NewPunchEvent, PunchEvent, PunchType, SubmitPunchPayload},
        auth::Identity,
    },
    services::{
        attendance_service::AttendanceService,
        state_machine::{AttendanceState, CurrentStatus},
    },
};

pub const DEFAULT_RECENT_LIMIT: i64 = 10;
pub const MAX_RECENT_LIMIT: i64 = 100;

#[derive(Clone)]
pub struct TimeClockService {
    store: Arc<dyn EventStore>,
    calendar: CompanyCalendar,
    attendance: AttendanceService,
}

impl TimeClockService {
    pub fn new(store: Arc<dyn EventStore>, calendar: CompanyCalendar, attendance: AttendanceService) -> Self {
        Self { store, calendar, attendance }
    }

    /// Situação atual do usuário, derivada da última batida do dia corrente.
    pub async fn current_status(
        &self,
        identity: &Identity,
        now: DateTime<Utc>,
    ) -> Result<CurrentStatus, AppError> {
        let today = self.calendar.local_date(now);
        let mut day_events = self
            .store
            .events_for_day(identity.company_id, identity.user_id, today, &self.calendar)
            .await?;

        if let Some(latest_today) = day_events.pop() {
            return Ok(CurrentStatus::from_latest(Some(latest_today)));
        }

        // Dia novo: o estado de ontem não passa para hoje, mas uma sessão aberta é sinalizada
        let unclosed = self
            .store
            .latest_event(identity.company_id, identity.user_id)
            .await?
            .filter(|e| self.calendar.local_date(e.timestamp) < today)
            .filter(|e| AttendanceState::from_latest(Some(e.punch_type)) != AttendanceState::NotClockedIn);

        if let Some(event) = &unclosed {
            tracing::warn!(
                user_id = %identity.user_id,
                event_id = %event.id,
                "Sessão de {} ficou aberta sem clock_out",
                self.calendar.local_date(event.timestamp)
            );
        }

        Ok(CurrentStatus::from_latest(None).with_unclosed_session(unclosed))
    }

    /// Registra uma batida se ela for permitida a partir do estado atual.
    pub async fn submit_punch(
        &self,
        identity: &Identity,
        payload: SubmitPunchPayload,
        now: DateTime<Utc>,
    ) -> Result<CurrentStatus, AppError> {
        // 1. Validar o payload
        payload.validate()?;

        let timestamp = payload.timestamp.unwrap_or(now);
        let day = self.calendar.local_date(timestamp);

        // 2. Lê a "versão" do usuário ANTES das batidas do dia: qualquer gravação
        //    concorrente ou aparece na leitura abaixo ou derruba a escrita condicional.
        let guard = self
            .store
            .append_guard(identity.company_id, identity.user_id)
            .await?;

        let day_events = self
            .store
            .events_for_day(identity.company_id, identity.user_id, day, &self.calendar)
            .await?;
        let latest_today = day_events.last();

        // 3. Monotonicidade dentro do dia
        if latest_today.is_some_and(|prev| timestamp < prev.timestamp) {
            return Err(AppError::TimestampBeforeLatest);
        }

        // 4. Tabela de ações permitidas
        let state = AttendanceState::from_latest(latest_today.map(|e| e.punch_type));
        if state.transition(payload.punch_type).is_none() {
            return Err(AppError::IllegalTransition {
                state,
                attempted: payload.punch_type,
            });
        }

        // 5. Grava
        let stored = self
            .store
            .append_event(
                NewPunchEvent {
                    company_id: identity.company_id,
                    user_id: identity.user_id,
                    punch_type: payload.punch_type,
                    timestamp,
                    location: payload.location,
                    notes: payload.notes,
                },
                guard,
            )
            .await?;

        tracing::info!(
            user_id = %identity.user_id,
            company_id = %identity.company_id,
            event_id = %stored.id,
            "Batida '{}' registrada",
            stored.punch_type
        );

        // 6. Fim de sessão: atualiza o resumo do dia. A batida já foi gravada,
        //    então uma falha aqui só é registrada no log.
        if stored.punch_type == PunchType::ClockOut {
            if let Err(e) = self
                .attendance
                .reconcile_day(identity.company_id, identity.user_id, day, now)
                .await
            {
                tracing::warn!(user_id = %identity.user_id, %day, "Falha ao reconciliar o dia: {}", e);
            }
        }

        Ok(CurrentStatus::from_latest(Some(stored)))
    }

    pub async fn recent_entries(
        &self,
        identity: &Identity,
        limit: Option<i64>,
    ) -> Result<Vec<PunchEvent>, AppError> {
        let limit = limit
            .unwrap_or(DEFAULT_RECENT_LIMIT)
            .clamp(1, MAX_RECENT_LIMIT);
        Ok(self
            .store
            .recent_events(identity.company_id, identity.user_id, limit)
            .await?)
    }
}
