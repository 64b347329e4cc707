//! Current-status snapshot for one user.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::Serialize;

use crate::phase::classify;
use crate::timeline::parse_date;

/// Disclaimer attached to every snapshot.
pub const PREDICTION_NOTE: &str = "Predictions are approximate (±2–3 days).";

/// Point-in-time summary written next to each generated calendar.
///
/// The camelCase fields at the top predate the snake_case ones and are
/// kept because published app pages still read them.
#[derive(Debug, Clone, Serialize)]
pub struct StatusSnapshot {
    #[serde(rename = "cycleStart")]
    pub cycle_start: String,
    #[serde(rename = "cycleLength")]
    pub cycle_length: i64,
    #[serde(rename = "generatedAt")]
    pub generated_at_compat: String,
    pub source: String,
    pub generated_at: String,
    pub today: String,
    pub last_period_start: String,
    pub previous_period_start: Option<String>,
    pub history: Vec<String>,
    pub cycle_day: i64,
    pub phase: String,
    pub phase_short: String,
    pub phase_emoji: String,
    pub last_cycle_length_days: Option<i64>,
    pub avg_cycle_length_days: i64,
    pub predicted_next_start: String,
    pub predicted_ovulation_day: String,
    pub note: String,
    pub token: String,
    pub label: String,
}

/// Mean of the positive gaps between consecutive history dates, rounded
/// to whole days. Needs at least three dates to say anything; returns
/// `None` otherwise, and when every gap is zero or negative.
pub fn average_cycle_length(history_dates: &[NaiveDate]) -> Option<i64> {
    if history_dates.len() < 3 {
        return None;
    }

    let gaps: Vec<i64> = history_dates
        .windows(2)
        .map(|pair| (pair[1] - pair[0]).num_days())
        .filter(|gap| *gap > 0)
        .collect();

    if gaps.is_empty() {
        return None;
    }

    let sum: i64 = gaps.iter().sum();
    Some((sum as f64 / gaps.len() as f64).round() as i64)
}

/// Compute the snapshot for one user.
///
/// `history` is passed through verbatim; only parseable entries feed the
/// average. The ovulation estimate uses the averaged cycle length, not
/// the configured one, so it tracks the user's actual rhythm.
#[allow(clippy::too_many_arguments)]
pub fn compute_status(
    today: NaiveDate,
    last_period_start: NaiveDate,
    history: &[String],
    cycle_length: i64,
    period_length: i64,
    source: &str,
    generated_at: DateTime<Utc>,
    token: &str,
    label: &str,
) -> StatusSnapshot {
    let previous_period_start = if history.len() >= 2 {
        Some(history[history.len() - 2].clone())
    } else {
        None
    };

    let history_dates: Vec<NaiveDate> = history.iter().filter_map(|s| parse_date(s)).collect();

    let last_cycle_length_days = previous_period_start
        .as_deref()
        .and_then(parse_date)
        .map(|previous| (last_period_start - previous).num_days());

    let avg_cycle_length_days = average_cycle_length(&history_dates).unwrap_or(cycle_length);

    let delta_days = (today - last_period_start).num_days();
    let cycle_day = if delta_days >= 0 { delta_days + 1 } else { 0 };

    let phase = classify(cycle_day, avg_cycle_length_days, period_length);

    let predicted_next_start = last_period_start + Duration::days(avg_cycle_length_days);
    let predicted_ovulation_day = predicted_next_start - Duration::days(14);

    let generated_at = generated_at.format("%Y-%m-%dT%H:%M:%SZ").to_string();

    StatusSnapshot {
        cycle_start: last_period_start.to_string(),
        cycle_length,
        generated_at_compat: generated_at.clone(),
        source: source.to_string(),
        generated_at,
        today: today.to_string(),
        last_period_start: last_period_start.to_string(),
        previous_period_start,
        history: history.to_vec(),
        cycle_day,
        phase: phase.name().to_string(),
        phase_short: phase.code().to_string(),
        phase_emoji: phase.emoji().to_string(),
        last_cycle_length_days,
        avg_cycle_length_days,
        predicted_next_start: predicted_next_start.to_string(),
        predicted_ovulation_day: predicted_ovulation_day.to_string(),
        note: PREDICTION_NOTE.to_string(),
        token: token.to_string(),
        label: label.to_string(),
    }
}
