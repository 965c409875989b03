//! Spanish date rendering for user-facing strings.

use chrono::{DateTime, Datelike, Utc};

const MONTHS: [&str; 12] = [
    "enero", "febrero", "marzo", "abril", "mayo", "junio",
    "julio", "agosto", "septiembre", "octubre", "noviembre", "diciembre",
];

/// "18 de octubre de 2026"
pub fn format_date(date: &DateTime<Utc>) -> String {
    format!(
        "{} de {} de {}",
        date.day(),
        MONTHS[date.month0() as usize],
        date.year()
    )
}

fn plural(n: i64, singular: &str, plural: &str) -> String {
    if n == 1 {
        format!("hace 1 {}", singular)
    } else {
        format!("hace {} {}", n, plural)
    }
}

/// Relative time from `then` to `now`. Future instants and anything under a
/// minute read as "justo ahora"; past a week the absolute date is used.
pub fn format_relative(then: &DateTime<Utc>, now: &DateTime<Utc>) -> String {
    let elapsed = now.signed_duration_since(*then);

    if elapsed.num_minutes() < 1 {
        "justo ahora".to_string()
    } else if elapsed.num_hours() < 1 {
        plural(elapsed.num_minutes(), "minuto", "minutos")
    } else if elapsed.num_days() < 1 {
        plural(elapsed.num_hours(), "hora", "horas")
    } else if elapsed.num_days() < 7 {
        plural(elapsed.num_days(), "día", "días")
    } else {
        format_date(then)
    }
}
