pub mod attendance_log;
pub mod catalog;
pub mod change;
pub mod onboarding;
pub mod subject_total;
