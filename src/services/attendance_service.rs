// src/services/attendance_service.rs

use std::{collections::BTreeMap, sync::Arc};

use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use crate::{
    common::{error::AppError, CompanyCalendar},
    db::EventStore,
    models::{
        attendance::{DailyAttendanceRecord, PunchEvent},
        summary::{MonthlyAttendance, PeriodStats, PeriodSummary, SummarySource},
    },
    services::{
        aggregator::{aggregate, aggregate_range, format_minutes},
        reconciliation::{self, WorkPolicy},
    },
};

#[derive(Clone)]
pub struct AttendanceService {
    store: Arc<dyn EventStore>,
    calendar: CompanyCalendar,
    policy: WorkPolicy,
}

impl AttendanceService {
    pub fn new(store: Arc<dyn EventStore>, calendar: CompanyCalendar, policy: WorkPolicy) -> Self {
        Self { store, calendar, policy }
    }

    pub fn calendar(&self) -> &CompanyCalendar {
        &self.calendar
    }

    pub async fn list_records(
        &self,
        company_id: Uuid,
        user_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<DailyAttendanceRecord>, AppError> {
        check_range(from, to)?;
        Ok(self
            .store
            .records_in_range(company_id, Some(user_id), from, to)
            .await?)
    }

    /// Estatísticas de um usuário no período, a partir dos registros diários
    /// ou direto das batidas (quando os registros ainda não foram gerados).
    pub async fn period_summary(
        &self,
        company_id: Uuid,
        user_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
        source: SummarySource,
    ) -> Result<PeriodSummary, AppError> {
        check_range(from, to)?;

        let stats = match source {
            SummarySource::Records => {
                let records = self
                    .store
                    .records_in_range(company_id, Some(user_id), from, to)
                    .await?;
                aggregate_range(&records, from, to)?
            }
            SummarySource::Events => {
                let (start, end) = self.calendar.range_bounds(from, to);
                let events = self
                    .store
                    .events_in_range(company_id, user_id, start, end)
                    .await?;
                let records = self.records_from_events(company_id, user_id, &events, Utc::now());
                aggregate(&records)?
            }
        };

        Ok(summary(from, to, stats))
    }

    /// Registros e totais de um mês (a tela "勤怠一覧").
    pub async fn monthly(
        &self,
        company_id: Uuid,
        user_id: Uuid,
        year: i32,
        month: u32,
    ) -> Result<MonthlyAttendance, AppError> {
        let (from, to) = CompanyCalendar::month_bounds(year, month).ok_or(AppError::InvalidRange)?;
        let records = self
            .store
            .records_in_range(company_id, Some(user_id), from, to)
            .await?;
        let stats = aggregate_range(&records, from, to)?;

        Ok(MonthlyAttendance {
            year,
            month,
            records,
            summary: summary(from, to, stats),
        })
    }

    /// Totais da empresa inteira no período.
    pub async fn company_summary(
        &self,
        company_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<PeriodSummary, AppError> {
        check_range(from, to)?;
        let records = self.store.records_in_range(company_id, None, from, to).await?;
        let stats = aggregate_range(&records, from, to)?;
        Ok(summary(from, to, stats))
    }

    /// Recalcula o registro de um dia a partir das batidas e grava.
    ///
    /// Se os números não mudaram, a aprovação é mantida; se mudaram, volta para pendente.
    /// Um dia sem batidas com registro já existente (folga, feriado) não é tocado.
    pub async fn reconcile_day(
        &self,
        company_id: Uuid,
        user_id: Uuid,
        date: NaiveDate,
        now: DateTime<Utc>,
    ) -> Result<DailyAttendanceRecord, AppError> {
        let events = self
            .store
            .events_for_day(company_id, user_id, date, &self.calendar)
            .await?;
        let existing = self.store.find_record(company_id, user_id, date).await?;

        let computed = reconciliation::reconcile_day(company_id, user_id, date, &events, &self.policy, now);

        // A decisão sobre a aprovação fica com o upsert, que compara com a linha gravada
        match existing {
            Some(existing) if events.is_empty() => return Ok(existing),
            Some(existing) if existing.is_approved && !existing.same_figures(&computed) => {
                tracing::info!(%user_id, %date, "Registro aprovado alterado; aprovação volta a pendente");
            }
            _ => {}
        }

        Ok(self.store.upsert_record(computed).await?)
    }

    pub async fn set_approval(
        &self,
        company_id: Uuid,
        user_id: Uuid,
        date: NaiveDate,
        approved: bool,
    ) -> Result<DailyAttendanceRecord, AppError> {
        self.store
            .set_record_approval(company_id, user_id, date, approved)
            .await?
            .ok_or(AppError::RecordNotFound)
    }

    fn records_from_events(
        &self,
        company_id: Uuid,
        user_id: Uuid,
        events: &[PunchEvent],
        now: DateTime<Utc>,
    ) -> Vec<DailyAttendanceRecord> {
        let mut by_day: BTreeMap<NaiveDate, Vec<PunchEvent>> = BTreeMap::new();
        for event in events {
            by_day
                .entry(self.calendar.local_date(event.timestamp))
                .or_default()
                .push(event.clone());
        }

        by_day
            .into_iter()
            .map(|(date, day_events)| {
                reconciliation::reconcile_day(company_id, user_id, date, &day_events, &self.policy, now)
            })
            .collect()
    }
}

fn check_range(from: NaiveDate, to: NaiveDate) -> Result<(), AppError> {
    if from > to {
        return Err(AppError::InvalidRange);
    }
    Ok(())
}

fn summary(from: NaiveDate, to: NaiveDate, stats: PeriodStats) -> PeriodSummary {
    PeriodSummary {
        from,
        to,
        total_work_display: format_minutes(stats.total_work_minutes),
        overtime_display: format_minutes(stats.overtime_minutes),
        stats,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        db::{
            test_support::{Hook, HookedStore},
            InMemoryEventStore,
        },
        models::attendance::{AttendanceStatus, NewPunchEvent, PunchType},
    };
    use chrono::TimeZone;

    struct Fixture {
        store: Arc<InMemoryEventStore>,
        service: AttendanceService,
        company: Uuid,
        user: Uuid,
    }

    fn fixture() -> Fixture {
        let store = Arc::new(InMemoryEventStore::new());
        let service = AttendanceService::new(store.clone(), CompanyCalendar::utc(), WorkPolicy::default());
        Fixture {
            store,
            service,
            company: Uuid::new_v4(),
            user: Uuid::new_v4(),
        }
    }

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, day).unwrap()
    }

    impl Fixture {
        async fn punch_day(&self, day: u32, punches: &[(PunchType, u32, u32)]) {
            let mut latest = self.store.append_guard(self.company, self.user).await.unwrap();
            for (punch_type, hour, minute) in punches {
                let stored = self
                    .store
                    .append_event(
                        NewPunchEvent {
                            company_id: self.company,
                            user_id: self.user,
                            punch_type: *punch_type,
                            timestamp: Utc.with_ymd_and_hms(2025, 3, day, *hour, *minute, 0).unwrap(),
                            location: None,
                            notes: None,
                        },
                        latest,
                    )
                    .await
                    .unwrap();
                latest = Some(stored.id);
            }
        }

        async fn seed_record(&self, day: u32, work: i32, status: AttendanceStatus) {
            self.store
                .upsert_record(DailyAttendanceRecord {
                    id: Uuid::new_v4(),
                    company_id: self.company,
                    user_id: self.user,
                    date: date(day),
                    clock_in: None,
                    clock_out: None,
                    total_work_minutes: Some(work),
                    total_break_minutes: Some(0),
                    overtime_minutes: Some(0),
                    status,
                    is_approved: false,
                    updated_at: Utc::now(),
                })
                .await
                .unwrap();
        }
    }

    #[tokio::test]
    async fn summary_from_records_matches_monthly_scenario() {
        let fx = fixture();
        fx.seed_record(3, 480, AttendanceStatus::Present).await;
        fx.seed_record(4, 450, AttendanceStatus::Present).await;
        fx.seed_record(5, 0, AttendanceStatus::Absent).await;

        let summary = fx
            .service
            .period_summary(fx.company, fx.user, date(1), date(31), SummarySource::Records)
            .await
            .unwrap();
        assert_eq!(summary.stats.total_work_minutes, 930);
        assert_eq!(summary.stats.total_work_hours, 15.5);
        assert_eq!(summary.stats.days_present, 2);
        assert_eq!(summary.total_work_display, "15:30");

        let monthly = fx.service.monthly(fx.company, fx.user, 2025, 3).await.unwrap();
        assert_eq!(monthly.records.len(), 3);
        assert_eq!(monthly.summary.stats, summary.stats);
    }

    #[tokio::test]
    async fn summary_from_raw_events() {
        let fx = fixture();
        use PunchType::*;
        fx.punch_day(3, &[(ClockIn, 9, 0), (BreakStart, 12, 0), (BreakEnd, 13, 0), (ClockOut, 18, 0)])
            .await;
        fx.punch_day(4, &[(ClockIn, 8, 0), (ClockOut, 17, 35)]).await;

        let summary = fx
            .service
            .period_summary(fx.company, fx.user, date(1), date(31), SummarySource::Events)
            .await
            .unwrap();
        assert_eq!(summary.stats.total_work_minutes, 1055);
        assert_eq!(summary.stats.overtime_minutes, 95);
        assert_eq!(summary.stats.overtime_hours, 1.6);
        assert_eq!(summary.stats.days_present, 2);
        assert_eq!(summary.overtime_display, "1:35");
    }

    #[tokio::test]
    async fn inverted_range_is_rejected() {
        let fx = fixture();
        let err = fx
            .service
            .period_summary(fx.company, fx.user, date(10), date(1), SummarySource::Records)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidRange));
    }

    #[tokio::test]
    async fn negative_minutes_surface_as_integrity_error() {
        let fx = fixture();
        fx.seed_record(3, -10, AttendanceStatus::Present).await;
        let err = fx
            .service
            .period_summary(fx.company, fx.user, date(1), date(31), SummarySource::Records)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::DataIntegrity(_)));
    }

    #[tokio::test]
    async fn reconcile_keeps_approval_only_when_figures_match() {
        let fx = fixture();
        use PunchType::*;
        fx.punch_day(3, &[(ClockIn, 9, 0), (ClockOut, 17, 0)]).await;

        fx.service.reconcile_day(fx.company, fx.user, date(3), Utc::now()).await.unwrap();
        fx.service.set_approval(fx.company, fx.user, date(3), true).await.unwrap();

        let again = fx.service.reconcile_day(fx.company, fx.user, date(3), Utc::now()).await.unwrap();
        assert!(again.is_approved);

        // Segunda sessão no mesmo dia muda os números
        fx.punch_day(3, &[(ClockIn, 19, 0), (ClockOut, 20, 0)]).await;
        let changed = fx.service.reconcile_day(fx.company, fx.user, date(3), Utc::now()).await.unwrap();
        assert!(!changed.is_approved);
        assert_eq!(changed.total_work_minutes, Some(540));
        assert_eq!(changed.overtime_minutes, Some(60));
    }

    #[tokio::test]
    async fn approval_landing_during_reconcile_is_kept() {
        let store = Arc::new(HookedStore::new(Hook::ApproveAfterFind));
        let service = AttendanceService::new(store.clone(), CompanyCalendar::utc(), WorkPolicy::default());
        let (company, user) = (Uuid::new_v4(), Uuid::new_v4());

        let punch = |punch_type, hour| NewPunchEvent {
            company_id: company,
            user_id: user,
            punch_type,
            timestamp: Utc.with_ymd_and_hms(2025, 3, 3, hour, 0, 0).unwrap(),
            location: None,
            notes: None,
        };
        let clock_in = store.inner.append_event(punch(PunchType::ClockIn, 9), None).await.unwrap();
        store
            .inner
            .append_event(punch(PunchType::ClockOut, 17), Some(clock_in.id))
            .await
            .unwrap();

        // Primeira reconciliação cria o registro (nada para aprovar ainda)
        service.reconcile_day(company, user, date(3), Utc::now()).await.unwrap();

        // Na segunda, a aprovação chega entre a leitura e a escrita; os números não mudam
        let record = service.reconcile_day(company, user, date(3), Utc::now()).await.unwrap();
        assert!(record.is_approved);
        let stored = store.inner.find_record(company, user, date(3)).await.unwrap().unwrap();
        assert!(stored.is_approved);
    }

    #[tokio::test]
    async fn reconcile_leaves_leave_days_alone() {
        let fx = fixture();
        fx.seed_record(7, 0, AttendanceStatus::Leave).await;
        let record = fx.service.reconcile_day(fx.company, fx.user, date(7), Utc::now()).await.unwrap();
        assert_eq!(record.status, AttendanceStatus::Leave);
    }

    #[tokio::test]
    async fn approving_a_missing_record_fails() {
        let fx = fixture();
        let err = fx.service.set_approval(fx.company, fx.user, date(9), true).await.unwrap_err();
        assert!(matches!(err, AppError::RecordNotFound));
    }

    #[tokio::test]
    async fn company_summary_spans_all_users() {
        let fx = fixture();
        fx.seed_record(3, 480, AttendanceStatus::Present).await;
        // mesmo store e empresa, outro usuário
        let colleague = Fixture {
            store: fx.store.clone(),
            service: fx.service.clone(),
            company: fx.company,
            user: Uuid::new_v4(),
        };
        colleague.seed_record(3, 300, AttendanceStatus::Present).await;

        let summary = fx.service.company_summary(fx.company, date(1), date(31)).await.unwrap();
        assert_eq!(summary.stats.total_work_minutes, 780);
        assert_eq!(summary.stats.days_present, 2);

        let other_company = fx.service.company_summary(Uuid::new_v4(), date(1), date(31)).await.unwrap();
        assert_eq!(other_company.stats.record_count, 0);
    }
}
