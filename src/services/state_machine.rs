// src/services/state_machine.rs

use serde::Serialize;
use utoipa::ToSchema;

use crate::models::attendance::{PunchEvent, PunchType};

// ---
// 1. Estados operacionais
// ---
// `clock_out` volta para `NotClockedIn`; um novo `clock_in` no mesmo dia abre outra sessão.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum AttendanceState {
    NotClockedIn,
    Working,
    OnBreak,
}

impl AttendanceState {
    /// Estado derivado da última batida do dia corrente.
    pub fn from_latest(latest: Option<PunchType>) -> Self {
        match latest {
            None | Some(PunchType::ClockOut) => AttendanceState::NotClockedIn,
            Some(PunchType::ClockIn) | Some(PunchType::BreakEnd) => AttendanceState::Working,
            Some(PunchType::BreakStart) => AttendanceState::OnBreak,
        }
    }

    /// Estado depois de aplicar a sequência do dia, em ordem crescente de horário.
    pub fn from_events(events: &[PunchEvent]) -> Self {
        Self::from_latest(events.last().map(|e| e.punch_type))
    }

    /// Tabela de ações permitidas.
    pub fn allowed_punches(&self) -> &'static [PunchType] {
        match self {
            AttendanceState::NotClockedIn => &[PunchType::ClockIn],
            AttendanceState::Working => &[PunchType::ClockOut, PunchType::BreakStart],
            AttendanceState::OnBreak => &[PunchType::BreakEnd],
        }
    }

    pub fn permits(&self, punch: PunchType) -> bool {
        self.allowed_punches().contains(&punch)
    }

    /// Próximo estado, ou `None` se a batida não é permitida a partir daqui.
    pub fn transition(&self, punch: PunchType) -> Option<AttendanceState> {
        self.permits(punch)
            .then(|| AttendanceState::from_latest(Some(punch)))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AttendanceState::NotClockedIn => "not_clocked_in",
            AttendanceState::Working => "working",
            AttendanceState::OnBreak => "on_break",
        }
    }
}

impl std::fmt::Display for AttendanceState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---
// 2. CurrentStatus (a "foto" que a tela de ponto renderiza)
// ---
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CurrentStatus {
    pub state: AttendanceState,
    // `clocked_in` só é verdadeiro trabalhando; no intervalo quem responde é `on_break`
    pub clocked_in: bool,
    pub on_break: bool,
    pub last_entry: Option<PunchEvent>,
    pub allowed_actions: Vec<PunchType>,
    /// Última batida de um dia anterior que ficou sem `clock_out`.
    pub unclosed_session: Option<PunchEvent>,
}

impl CurrentStatus {
    pub fn from_latest(last_entry: Option<PunchEvent>) -> Self {
        let state = AttendanceState::from_latest(last_entry.as_ref().map(|e| e.punch_type));
        Self {
            state,
            clocked_in: state == AttendanceState::Working,
            on_break: state == AttendanceState::OnBreak,
            last_entry,
            allowed_actions: state.allowed_punches().to_vec(),
            unclosed_session: None,
        }
    }

    pub fn with_unclosed_session(mut self, event: Option<PunchEvent>) -> Self {
        self.unclosed_session = event;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    fn event(punch_type: PunchType, hour: u32) -> PunchEvent {
        let ts = Utc.with_ymd_and_hms(2025, 3, 14, hour, 0, 0).unwrap();
        PunchEvent {
            id: Uuid::new_v4(),
            company_id: Uuid::nil(),
            user_id: Uuid::nil(),
            punch_type,
            timestamp: ts,
            location: None,
            notes: None,
            created_at: ts,
        }
    }

    #[test]
    fn legal_action_table() {
        use AttendanceState::*;
        use PunchType::*;

        let expected = [
            (NotClockedIn, [true, false, false, false]),
            (Working, [false, true, true, false]),
            (OnBreak, [false, false, false, true]),
        ];

        for (state, row) in expected {
            for (punch, allowed) in [ClockIn, ClockOut, BreakStart, BreakEnd].into_iter().zip(row) {
                assert_eq!(state.permits(punch), allowed, "{state} x {punch}");
                assert_eq!(state.transition(punch).is_some(), allowed, "{state} x {punch}");
            }
        }
    }

    #[test]
    fn derivation_from_day_sequences() {
        use PunchType::*;

        assert_eq!(AttendanceState::from_events(&[]), AttendanceState::NotClockedIn);
        assert_eq!(AttendanceState::from_events(&[event(ClockIn, 9)]), AttendanceState::Working);
        assert_eq!(
            AttendanceState::from_events(&[event(ClockIn, 9), event(BreakStart, 12)]),
            AttendanceState::OnBreak
        );
        assert_eq!(
            AttendanceState::from_events(&[event(ClockIn, 9), event(BreakStart, 12), event(BreakEnd, 13)]),
            AttendanceState::Working
        );
        assert_eq!(
            AttendanceState::from_events(&[event(ClockIn, 9), event(ClockOut, 18)]),
            AttendanceState::NotClockedIn
        );
    }

    #[test]
    fn transitions_land_on_expected_states() {
        assert_eq!(
            AttendanceState::NotClockedIn.transition(PunchType::ClockIn),
            Some(AttendanceState::Working)
        );
        assert_eq!(
            AttendanceState::Working.transition(PunchType::BreakStart),
            Some(AttendanceState::OnBreak)
        );
        assert_eq!(
            AttendanceState::OnBreak.transition(PunchType::BreakEnd),
            Some(AttendanceState::Working)
        );
        assert_eq!(
            AttendanceState::Working.transition(PunchType::ClockOut),
            Some(AttendanceState::NotClockedIn)
        );
    }

    #[test]
    fn status_flags_mirror_state() {
        let on_break = CurrentStatus::from_latest(Some(event(PunchType::BreakStart, 12)));
        assert!(!on_break.clocked_in);
        assert!(on_break.on_break);
        assert_eq!(on_break.allowed_actions, vec![PunchType::BreakEnd]);

        let idle = CurrentStatus::from_latest(None);
        assert_eq!(idle.state, AttendanceState::NotClockedIn);
        assert!(idle.last_entry.is_none());
        assert_eq!(idle.allowed_actions, vec![PunchType::ClockIn]);
    }
}
