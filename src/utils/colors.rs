//! ANSI color helpers for terminal output.
pub const RESET: &str = "\x1b[0m";

pub const GREY: &str = "\x1b[90m";
pub const RED: &str = "\x1b[31m";
pub const GREEN: &str = "\x1b[32m";
pub const YELLOW: &str = "\x1b[33m";
pub const CYAN: &str = "\x1b[36m";

/// Attendance percentage color:
/// ≥ 75 → green, ≥ 50 → yellow, below → red, uncapped → grey
pub fn color_for_percent(percent: Option<i64>) -> &'static str {
    match percent {
        None => GREY,
        Some(p) if p >= 75 => GREEN,
        Some(p) if p >= 50 => YELLOW,
        Some(_) => RED,
    }
}

pub fn colorize(value: &str, color: &str) -> String {
    format!("{color}{value}{RESET}")
}
