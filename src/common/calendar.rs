// src/common/calendar.rs

use chrono::{DateTime, Datelike, Days, FixedOffset, NaiveDate, NaiveTime, Offset, TimeZone, Utc};

// O "dia" de trabalho é sempre o dia civil no fuso da empresa.
#[derive(Debug, Clone, Copy)]
pub struct CompanyCalendar {
    offset: FixedOffset,
}

impl CompanyCalendar {
    pub fn new(offset: FixedOffset) -> Self {
        Self { offset }
    }

    pub fn utc() -> Self {
        Self::new(Utc.fix())
    }

    /// Dia local de um instante.
    pub fn local_date(&self, instant: DateTime<Utc>) -> NaiveDate {
        instant.with_timezone(&self.offset).date_naive()
    }

    /// Intervalo semiaberto [início, início do dia seguinte) em UTC.
    pub fn day_bounds(&self, date: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
        let start = self.start_of(date);
        let end = date
            .checked_add_days(Days::new(1))
            .map(|next| self.start_of(next))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        (start, end)
    }

    /// Intervalo que cobre os dias [from, to] inclusive.
    pub fn range_bounds(&self, from: NaiveDate, to: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
        let (start, _) = self.day_bounds(from);
        let (_, end) = self.day_bounds(to);
        (start, end)
    }

    /// Primeiro e último dia do mês.
    pub fn month_bounds(year: i32, month: u32) -> Option<(NaiveDate, NaiveDate)> {
        let first = NaiveDate::from_ymd_opt(year, month, 1)?;
        let next_month = if month == 12 {
            NaiveDate::from_ymd_opt(year + 1, 1, 1)?
        } else {
            NaiveDate::from_ymd_opt(year, month + 1, 1)?
        };
        Some((first, next_month.pred_opt()?))
    }

    /// Do dia 1 do mês corrente até hoje.
    pub fn current_month_until(&self, now: DateTime<Utc>) -> (NaiveDate, NaiveDate) {
        let today = self.local_date(now);
        (today.with_day(1).unwrap_or(today), today)
    }

    fn start_of(&self, date: NaiveDate) -> DateTime<Utc> {
        let local = date.and_time(NaiveTime::MIN);
        // Offsets fixos não têm ambiguidade, então `single` sempre resolve
        self.offset
            .from_local_datetime(&local)
            .single()
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|| Utc.from_utc_datetime(&local))
    }
}

impl Default for CompanyCalendar {
    fn default() -> Self {
        Self::utc()
    }
}
