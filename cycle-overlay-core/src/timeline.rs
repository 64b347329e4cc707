//! Cycle-start bookkeeping and per-day labeling.

use chrono::{Duration, NaiveDate};

use crate::phase::{classify, Phase};

/// Days after a predicted-but-unconfirmed start during which both
/// readings are shown.
pub const HYPOTHETICAL_WINDOW_DAYS: i64 = 5;

/// Parse a `YYYY-MM-DD` date string.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").ok()
}

/// A single labeled calendar day.
#[derive(Debug, Clone, PartialEq)]
pub struct DayRecord {
    pub date: NaiveDate,
    pub day_in_cycle: i64,
    pub phase: Phase,
    pub summary: String,
}

/// Resolved cycle-start list plus the lengths needed to label any day.
#[derive(Debug, Clone)]
pub struct CycleTimeline {
    starts: Vec<NaiveDate>,
    last_known_start: NaiveDate,
    cycle_length: i64,
    period_length: i64,
}

impl CycleTimeline {
    /// Build a timeline from the explicit start and raw history strings.
    ///
    /// Unparseable history entries are dropped without complaint. The
    /// resulting list is sorted, deduplicated, and always contains
    /// `last_period_start`.
    pub fn resolve(
        last_period_start: NaiveDate,
        history: &[String],
        cycle_length: i64,
        period_length: i64,
    ) -> Self {
        let mut starts: Vec<NaiveDate> = history.iter().filter_map(|s| parse_date(s)).collect();
        starts.push(last_period_start);
        starts.sort();
        starts.dedup();

        let last_known_start = starts.last().copied().unwrap_or(last_period_start);

        CycleTimeline {
            starts,
            last_known_start,
            cycle_length,
            period_length,
        }
    }

    /// Extend the start list with predicted future starts through `end`.
    pub fn project_to(&mut self, end: NaiveDate) {
        let mut next = self.last_known_start + Duration::days(self.cycle_length);
        while next <= end {
            self.starts.push(next);
            next += Duration::days(self.cycle_length);
        }
    }

    pub fn starts(&self) -> &[NaiveDate] {
        &self.starts
    }

    /// Earliest known start, anchoring the output range.
    pub fn first_start(&self) -> NaiveDate {
        self.starts.first().copied().unwrap_or(self.last_known_start)
    }

    /// Latest start that was actually observed (not projected).
    pub fn last_known_start(&self) -> NaiveDate {
        self.last_known_start
    }

    /// Next predicted start after the last confirmed one.
    pub fn next_predicted_start(&self) -> NaiveDate {
        self.last_known_start + Duration::days(self.cycle_length)
    }

    /// Latest start on or before `date`. Dates before the first start
    /// clamp to the first start.
    pub fn start_for(&self, date: NaiveDate) -> NaiveDate {
        let index = self.starts.partition_point(|s| *s <= date);
        if index == 0 {
            self.first_start()
        } else {
            self.starts[index - 1]
        }
    }

    /// 1-based day number within the governing cycle.
    pub fn day_in_cycle(&self, date: NaiveDate) -> i64 {
        (date - self.start_for(date)).num_days() + 1
    }

    /// Label one calendar day.
    ///
    /// Days just past the next predicted start have not been confirmed as
    /// a new cycle yet, so they render as luteal of the old cycle with a
    /// parenthetical showing the would-be day of the new one.
    pub fn day_record(&self, date: NaiveDate) -> DayRecord {
        let next_start = self.next_predicted_start();
        let window_end = next_start + Duration::days(HYPOTHETICAL_WINDOW_DAYS - 1);

        if date >= next_start && date <= window_end {
            let hypothetical_day = (date - next_start).num_days() + 1;
            let hypothetical_emoji = if hypothetical_day <= self.period_length {
                Phase::Menstruation.emoji()
            } else {
                Phase::Follicular.emoji()
            };

            return DayRecord {
                date,
                day_in_cycle: self.cycle_length + hypothetical_day,
                phase: Phase::Luteal,
                summary: format!(
                    "{} {} ({}{})",
                    Phase::Luteal.emoji(),
                    Phase::Luteal.code(),
                    hypothetical_day,
                    hypothetical_emoji
                ),
            };
        }

        let day_in_cycle = self.day_in_cycle(date);
        let phase = classify(day_in_cycle, self.cycle_length, self.period_length);

        DayRecord {
            date,
            day_in_cycle,
            phase,
            summary: format_summary(day_in_cycle, phase),
        }
    }
}

/// Render a day label. Early period days are glyph-only to keep the
/// calendar quiet.
pub fn format_summary(day_in_cycle: i64, phase: Phase) -> String {
    match phase {
        Phase::Menstruation if day_in_cycle <= 3 => {
            format!("{}{}", day_in_cycle, phase.emoji())
        }
        Phase::Menstruation => format!("{} {}", day_in_cycle, phase.emoji()),
        _ => format!("{} {} {}", day_in_cycle, phase.emoji(), phase.code()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_resolve_sorts_dedups_and_drops_invalid() {
        let history = strings(&["2026-02-26", "not-a-date", "2026-01-29", "2026-01-29", ""]);
        let timeline = CycleTimeline::resolve(date(2026, 1, 1), &history, 28, 3);

        assert_eq!(
            timeline.starts(),
            &[date(2026, 1, 1), date(2026, 1, 29), date(2026, 2, 26)]
        );
        assert_eq!(timeline.last_known_start(), date(2026, 2, 26));
    }

    #[test]
    fn test_resolve_is_idempotent() {
        let history = strings(&["2026-01-29", "bogus", "2026-01-01"]);
        let first = CycleTimeline::resolve(date(2026, 1, 1), &history, 28, 3);

        let as_strings: Vec<String> = first
            .starts()
            .iter()
            .map(|d| d.format("%Y-%m-%d").to_string())
            .collect();
        let second = CycleTimeline::resolve(date(2026, 1, 1), &as_strings, 28, 3);

        assert_eq!(first.starts(), second.starts());
    }

    #[test]
    fn test_project_to_stops_at_range_end() {
        let mut timeline = CycleTimeline::resolve(date(2026, 1, 1), &[], 28, 3);
        timeline.project_to(date(2026, 3, 15));

        // 2026-01-29 and 2026-02-26 fit; 2026-03-26 would overshoot.
        assert_eq!(
            timeline.starts(),
            &[date(2026, 1, 1), date(2026, 1, 29), date(2026, 2, 26)]
        );
        // Projection does not move the confirmed anchor.
        assert_eq!(timeline.last_known_start(), date(2026, 1, 1));
    }

    #[test]
    fn test_start_for_picks_latest_on_or_before() {
        let mut timeline = CycleTimeline::resolve(date(2026, 1, 1), &[], 28, 3);
        timeline.project_to(date(2026, 4, 1));

        assert_eq!(timeline.start_for(date(2026, 1, 1)), date(2026, 1, 1));
        assert_eq!(timeline.start_for(date(2026, 1, 28)), date(2026, 1, 1));
        assert_eq!(timeline.start_for(date(2026, 1, 29)), date(2026, 1, 29));
        assert_eq!(timeline.start_for(date(2026, 3, 1)), date(2026, 2, 26));
        // Before the first start: clamp rather than fail.
        assert_eq!(timeline.start_for(date(2025, 12, 25)), date(2026, 1, 1));
    }

    #[test]
    fn test_day_records_across_hypothetical_window() {
        let start = date(2026, 1, 1);
        let mut timeline = CycleTimeline::resolve(start, &[], 28, 3);
        timeline.project_to(start + Duration::days(40));

        // Last ordinary day of the confirmed cycle.
        assert_eq!(timeline.day_record(date(2026, 1, 28)).summary, "28 🌙 Lut");
        // Window opens on the predicted start.
        assert_eq!(timeline.day_record(date(2026, 1, 29)).summary, "🌙 Lut (1🩸)");
        assert_eq!(timeline.day_record(date(2026, 2, 2)).summary, "🌙 Lut (5🌿)");
        // Window closed: the projected start governs again.
        assert_eq!(timeline.day_record(date(2026, 2, 3)).summary, "6 🌿 Fol");
    }

    #[test]
    fn test_hypothetical_day_counts_from_predicted_start() {
        let start = date(2026, 1, 1);
        let mut timeline = CycleTimeline::resolve(start, &[], 28, 3);
        timeline.project_to(start + Duration::days(40));

        let record = timeline.day_record(date(2026, 1, 31));
        assert_eq!(record.summary, "🌙 Lut (3🩸)");
        assert_eq!(record.day_in_cycle, 31);
        assert_eq!(record.phase, Phase::Luteal);
    }

    #[test]
    fn test_format_summary_rules() {
        assert_eq!(format_summary(2, Phase::Menstruation), "2🩸");
        assert_eq!(format_summary(3, Phase::Menstruation), "3🩸");
        assert_eq!(format_summary(4, Phase::Menstruation), "4 🩸");
        assert_eq!(format_summary(14, Phase::Ovulation), "14 ⭐ Ovl");
        assert_eq!(format_summary(20, Phase::Luteal), "20 🌙 Lut");
        assert_eq!(format_summary(8, Phase::Follicular), "8 🌿 Fol");
    }
}
