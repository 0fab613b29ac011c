pub mod attendance;
pub mod auth;
pub mod time_clock;
