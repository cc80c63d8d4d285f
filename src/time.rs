//! The discrete time grid the simulator walks.
//!
//! Intervals are identified by their `initial_datetime`, in the
//! `YYYY-MM-DD HH:MM:SS` local format the tabular inputs use. We parse that
//! into a [`chrono::NaiveDateTime`] once at the boundary rather than carrying
//! raw strings through the simulator, which keeps interval arithmetic (`+
//! Δ`) and ordering exact instead of relying on lexicographic string
//! comparison.

use chrono::{Duration, NaiveDateTime};

use crate::prelude::*;

pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Interval length in hours. Fixed throughout the portfolio.
pub const TIME_LAPSE_HOURS: f64 = 0.25;

pub fn parse_datetime(s: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, DATETIME_FORMAT)
        .with_context(|| format!("invalid datetime `{s}`"))
}

pub fn format_datetime(t: NaiveDateTime) -> String {
    t.format(DATETIME_FORMAT).to_string()
}

pub fn step(time_lapse_hours: f64) -> Duration {
    Duration::milliseconds((time_lapse_hours * 3_600_000.0).round() as i64)
}

/// The closed-closed sequence of interval start timestamps from `initial` to
/// `final_` inclusive, matching the source's `while initial_date <=
/// final_datetime` loop.
pub fn grid(
    initial: NaiveDateTime,
    final_: NaiveDateTime,
    time_lapse_hours: f64,
) -> impl Iterator<Item = NaiveDateTime> {
    let delta = step(time_lapse_hours);
    let mut current = Some(initial);
    std::iter::from_fn(move || {
        let this = current?;
        current = if this <= final_ { Some(this + delta) } else { None };
        (this <= final_).then_some(this)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_four_intervals() {
        let initial = parse_datetime("2026-01-01 00:00:00").unwrap();
        let final_ = parse_datetime("2026-01-01 00:45:00").unwrap();
        let points: Vec<_> = grid(initial, final_, TIME_LAPSE_HOURS).collect();
        assert_eq!(points.len(), 4);
        assert_eq!(points[0], initial);
        assert_eq!(points[3], final_);
    }
}
