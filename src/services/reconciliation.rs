// src/services/reconciliation.rs

use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use crate::{
    models::attendance::{AttendanceStatus, DailyAttendanceRecord, PunchEvent, PunchType},
    services::state_machine::AttendanceState,
};

// Regras de jornada usadas para calcular hora extra
#[derive(Debug, Clone, Copy)]
pub struct WorkPolicy {
    pub standard_work_minutes: u32,
}

impl Default for WorkPolicy {
    fn default() -> Self {
        Self { standard_work_minutes: 480 }
    }
}

/// Monta o registro diário a partir das batidas do dia (ordem crescente de horário).
///
/// As batidas são reaplicadas na máquina de estados; as que não seriam permitidas
/// no estado reconstruído são ignoradas. Uma sessão que termina o dia aberta não conta
/// tempo depois da última batida que a fechou.
pub fn reconcile_day(
    company_id: Uuid,
    user_id: Uuid,
    date: NaiveDate,
    events: &[PunchEvent],
    policy: &WorkPolicy,
    now: DateTime<Utc>,
) -> DailyAttendanceRecord {
    let mut state = AttendanceState::NotClockedIn;
    let mut segment_start: Option<DateTime<Utc>> = None;
    let mut work_seconds: i64 = 0;
    let mut break_seconds: i64 = 0;
    let mut first_clock_in = None;
    let mut last_clock_out = None;

    for event in events {
        let Some(next) = state.transition(event.punch_type) else {
            tracing::warn!(
                event_id = %event.id,
                %user_id,
                %date,
                "Batida '{}' ignorada na reconciliação (estado {})",
                event.punch_type,
                state
            );
            continue;
        };

        if let Some(start) = segment_start {
            let elapsed = (event.timestamp - start).num_seconds().max(0);
            match state {
                AttendanceState::Working => work_seconds += elapsed,
                AttendanceState::OnBreak => break_seconds += elapsed,
                AttendanceState::NotClockedIn => {}
            }
        }

        match event.punch_type {
            PunchType::ClockIn => {
                first_clock_in.get_or_insert(event.timestamp);
            }
            PunchType::ClockOut => last_clock_out = Some(event.timestamp),
            PunchType::BreakStart | PunchType::BreakEnd => {}
        }

        state = next;
        segment_start = (state != AttendanceState::NotClockedIn).then_some(event.timestamp);
    }

    let work_minutes = to_minutes(work_seconds);
    let standard_minutes = i32::try_from(policy.standard_work_minutes).unwrap_or(i32::MAX);
    let status = if first_clock_in.is_some() {
        AttendanceStatus::Present
    } else {
        AttendanceStatus::Absent
    };

    DailyAttendanceRecord {
        id: Uuid::new_v4(),
        company_id,
        user_id,
        date,
        clock_in: first_clock_in,
        clock_out: last_clock_out,
        total_work_minutes: Some(work_minutes),
        total_break_minutes: Some(to_minutes(break_seconds)),
        overtime_minutes: Some((work_minutes - standard_minutes).max(0)),
        status,
        is_approved: false,
        updated_at: now,
    }
}

fn to_minutes(seconds: i64) -> i32 {
    i32::try_from(seconds / 60).unwrap_or(i32::MAX)
}
