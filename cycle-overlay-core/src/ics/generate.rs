//! ICS file generation.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use icalendar::{Calendar, Component, EventLike, Property, ValueType};

use crate::error::CycleOverlayResult;
use crate::timeline::CycleTimeline;

/// Generate .ics content with one all-day event per day in the inclusive
/// range, labeled from the timeline.
pub fn build_calendar(
    calendar_name: &str,
    start_date: NaiveDate,
    end_date: NaiveDate,
    timeline: &CycleTimeline,
    generated_at: DateTime<Utc>,
) -> CycleOverlayResult<String> {
    let mut cal = Calendar::new();

    // X-WR-CALNAME - human-readable calendar name (de facto standard)
    cal.append_property(Property::new("X-WR-CALNAME", calendar_name));

    // One DTSTAMP for the whole run keeps the output deterministic and
    // diffable between builds.
    let dtstamp = generated_at.format("%Y%m%dT%H%M%SZ").to_string();

    let total_days = (end_date - start_date).num_days() + 1;
    for offset in 0..total_days {
        let current = start_date + Duration::days(offset);
        let record = timeline.day_record(current);

        let mut event = icalendar::Event::new();
        event.uid(&format!("{}-cycle-overlay", current.format("%Y%m%d")));
        event.summary(&record.summary);
        event.add_property("DTSTAMP", &dtstamp);
        add_date_property(&mut event, "DTSTART", current);
        // DTEND is exclusive per RFC 5545, so an all-day event ends on
        // the following day.
        add_date_property(&mut event, "DTEND", current + Duration::days(1));

        cal.push(event.done());
    }

    let cal = cal.done();
    Ok(normalize_ics(&cal.to_string()))
}

/// Clean up ICS output from the icalendar crate: stamp our PRODID and
/// force CRLF line endings.
fn normalize_ics(ics: &str) -> String {
    let mut result = String::with_capacity(ics.len());

    for line in ics.lines() {
        if line.starts_with("PRODID:") {
            result.push_str("PRODID:-//cycle-overlay//Cycle Calendar//EN\r\n");
            continue;
        }

        result.push_str(line);
        result.push_str("\r\n");
    }

    result
}

/// Add an all-day date property (DTSTART/DTEND with VALUE=DATE).
fn add_date_property(event: &mut icalendar::Event, name: &str, date: NaiveDate) {
    let mut prop = Property::new(name, date.format("%Y%m%d").to_string());
    prop.append_parameter(ValueType::Date);
    event.append_property(prop);
}
