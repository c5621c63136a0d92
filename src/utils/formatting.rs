//! Formatting helpers for CLI output.

use crate::models::subject_total::SubjectTotal;

/// `"3/5"` for capped subjects, `"7"` for uncapped ones. Uses the clamped count.
pub fn count_label(t: &SubjectTotal) -> String {
    let p = t.project();
    if t.is_capped() {
        format!("{}/{}", p.capped, t.total)
    } else {
        p.capped.to_string()
    }
}

pub fn percent_label(percent: Option<i64>) -> String {
    match percent {
        Some(p) => format!("{}%", p),
        None => "--".to_string(),
    }
}

/// Fixed-width bar such as `[#####-----]`.
pub fn progress_bar(percent: Option<i64>, width: usize, fill: char) -> String {
    let filled = match percent {
        Some(p) => ((p.clamp(0, 100) as usize) * width + 50) / 100,
        None => 0,
    };
    let mut bar = String::with_capacity(width + 2);
    bar.push('[');
    bar.extend(std::iter::repeat_n('#', filled));
    bar.extend(std::iter::repeat_n(fill, width - filled));
    bar.push(']');
    bar
}

/// Shorten `s` to `max` characters, ending with an ellipsis when cut.
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
    out.push('…');
    out
}
