pub mod aggregator;
pub mod attendance_service;
pub mod auth;
pub mod reconciliation;
pub mod state_machine;
pub mod time_clock_service;

pub use attendance_service::AttendanceService;
pub use time_clock_service::TimeClockService;
