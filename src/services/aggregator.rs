// src/services/aggregator.rs
//
// Agregação pura sobre registros diários: não guarda estado, não depende da ordem.

use chrono::NaiveDate;
use thiserror::Error;

use crate::models::{
    attendance::{AttendanceStatus, DailyAttendanceRecord},
    summary::{DataIntegrityWarning, PeriodStats},
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AggregationError {
    #[error("{field} negativo ({value}) no registro de {date}")]
    NegativeMinutes {
        date: NaiveDate,
        field: &'static str,
        value: i32,
    },
}

/// Soma os registros recebidos.
pub fn aggregate(records: &[DailyAttendanceRecord]) -> Result<PeriodStats, AggregationError> {
    let mut stats = PeriodStats::default();

    for record in records {
        if record.total_work_minutes.is_none() && record.status == AttendanceStatus::Present {
            stats
                .warnings
                .push(DataIntegrityWarning::MissingWorkMinutes { date: record.date });
        }

        stats.total_work_minutes += minutes(record, "total_work_minutes", record.total_work_minutes)?;
        stats.total_break_minutes += minutes(record, "total_break_minutes", record.total_break_minutes)?;
        stats.overtime_minutes += minutes(record, "overtime_minutes", record.overtime_minutes)?;

        if record.status == AttendanceStatus::Present {
            stats.days_present += 1;
        }
        stats.record_count += 1;
    }

    stats.total_work_hours = minutes_to_hours(stats.total_work_minutes);
    stats.overtime_hours = minutes_to_hours(stats.overtime_minutes);
    stats.warnings.sort();

    Ok(stats)
}

/// Igual a `aggregate`, considerando só os registros com data em `[from, to]`.
pub fn aggregate_range(
    records: &[DailyAttendanceRecord],
    from: NaiveDate,
    to: NaiveDate,
) -> Result<PeriodStats, AggregationError> {
    let in_range: Vec<DailyAttendanceRecord> = records
        .iter()
        .filter(|r| r.date >= from && r.date <= to)
        .cloned()
        .collect();
    aggregate(&in_range)
}

fn minutes(
    record: &DailyAttendanceRecord,
    field: &'static str,
    value: Option<i32>,
) -> Result<u64, AggregationError> {
    match value {
        None => Ok(0),
        Some(v) if v < 0 => Err(AggregationError::NegativeMinutes {
            date: record.date,
            field,
            value: v,
        }),
        Some(v) => Ok(v as u64),
    }
}

/// Horas com uma casa decimal: `round(minutes / 60 * 10) / 10`.
pub fn minutes_to_hours(minutes: u64) -> f64 {
    (minutes as f64 / 60.0 * 10.0).round() / 10.0
}

/// Formato "H:MM".
pub fn format_minutes(minutes: u64) -> String {
    format!("{}:{:02}", minutes / 60, minutes % 60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn record(day: u32, work: Option<i32>, overtime: Option<i32>, status: AttendanceStatus) -> DailyAttendanceRecord {
        DailyAttendanceRecord {
            id: Uuid::new_v4(),
            company_id: Uuid::nil(),
            user_id: Uuid::nil(),
            date: NaiveDate::from_ymd_opt(2025, 3, day).unwrap(),
            clock_in: None,
            clock_out: None,
            total_work_minutes: work,
            total_break_minutes: Some(60),
            overtime_minutes: overtime,
            status,
            is_approved: false,
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn empty_input_yields_zeroes() {
        let stats = aggregate(&[]).unwrap();
        assert_eq!(stats, PeriodStats::default());
        assert_eq!(stats.total_work_minutes, 0);
        assert_eq!(stats.overtime_minutes, 0);
        assert_eq!(stats.days_present, 0);
        assert_eq!(stats.total_work_minutes, 0);
    }

    #[test]
    fn three_day_month() {
        let records = vec![
            record(3, Some(480), Some(0), AttendanceStatus::Present),
            record(4, Some(450), Some(0), AttendanceStatus::Present),
            record(5, Some(0), Some(0), AttendanceStatus::Absent),
        ];
        let stats = aggregate(&records).unwrap();
        assert_eq!(stats.total_work_minutes, 930);
        assert_eq!(stats.total_work_hours, 15.5);
        assert_eq!(stats.days_present, 2);
        assert_eq!(stats.record_count, 3);
        assert_eq!(stats.total_break_minutes, 180);
    }

    #[test]
    fn order_does_not_matter() {
        let mut records = vec![
            record(3, Some(480), Some(30), AttendanceStatus::Present),
            record(4, None, None, AttendanceStatus::Present),
            record(5, Some(0), None, AttendanceStatus::Leave),
            record(6, Some(95), Some(95), AttendanceStatus::Present),
        ];
        let forward = aggregate(&records).unwrap();
        records.reverse();
        let backward = aggregate(&records).unwrap();
        records.swap(0, 2);
        let shuffled = aggregate(&records).unwrap();

        assert_eq!(forward, backward);
        assert_eq!(forward, shuffled);
    }

    #[test]
    fn overtime_hours_round_to_one_decimal() {
        let stats = aggregate(&[record(3, Some(575), Some(95), AttendanceStatus::Present)]).unwrap();
        assert_eq!(stats.overtime_hours, 1.6);
        assert_eq!(minutes_to_hours(95), 1.6);
        assert_eq!(minutes_to_hours(0), 0.0);
    }

    #[test]
    fn missing_work_minutes_count_as_zero_with_warning() {
        let records = vec![
            record(4, None, None, AttendanceStatus::Present),
            record(5, None, None, AttendanceStatus::Absent),
        ];
        let stats = aggregate(&records).unwrap();
        assert_eq!(stats.total_work_minutes, 0);
        assert_eq!(
            stats.warnings,
            vec![DataIntegrityWarning::MissingWorkMinutes {
                date: NaiveDate::from_ymd_opt(2025, 3, 4).unwrap()
            }]
        );
    }

    #[test]
    fn negative_minutes_fail_loudly() {
        let records = vec![
            record(3, Some(480), Some(0), AttendanceStatus::Present),
            record(4, Some(-30), Some(0), AttendanceStatus::Present),
        ];
        let err = aggregate(&records).unwrap_err();
        assert_eq!(
            err,
            AggregationError::NegativeMinutes {
                date: NaiveDate::from_ymd_opt(2025, 3, 4).unwrap(),
                field: "total_work_minutes",
                value: -30,
            }
        );
    }

    #[test]
    fn range_is_inclusive() {
        let records = vec![
            record(2, Some(100), None, AttendanceStatus::Present),
            record(3, Some(200), None, AttendanceStatus::Present),
            record(5, Some(300), None, AttendanceStatus::Present),
            record(6, Some(400), None, AttendanceStatus::Present),
        ];
        let from = NaiveDate::from_ymd_opt(2025, 3, 3).unwrap();
        let to = NaiveDate::from_ymd_opt(2025, 3, 5).unwrap();
        let stats = aggregate_range(&records, from, to).unwrap();
        assert_eq!(stats.total_work_minutes, 500);
        assert_eq!(stats.days_present, 2);
    }

    #[test]
    fn formats_hours_and_minutes() {
        assert_eq!(format_minutes(125), "2:05");
        assert_eq!(format_minutes(0), "0:00");
        assert_eq!(format_minutes(59), "0:59");
        assert_eq!(format_minutes(600), "10:00");
    }
}
