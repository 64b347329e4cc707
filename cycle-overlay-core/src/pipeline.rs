//! One full generation run over a site layout.

use std::path::Path;

use chrono::{DateTime, Duration, Utc};

use crate::config::GenerationConfig;
use crate::error::{CycleOverlayError, CycleOverlayResult};
use crate::ics::build_calendar;
use crate::layout::SiteLayout;
use crate::source::{self, SourceRecord};
use crate::status::{compute_status, StatusSnapshot};
use crate::timeline::{parse_date, CycleTimeline};

/// Tag recorded in status output when no override is given.
pub const DEFAULT_SOURCE_TAG: &str = "schedule";

/// Everything produced for one user.
#[derive(Debug, Clone)]
pub struct GeneratedUser {
    pub token: String,
    pub label: String,
    pub ics: String,
    pub status: StatusSnapshot,
}

/// Outcome of a run, for reporting.
#[derive(Debug)]
pub struct RunReport {
    pub users: Vec<GeneratedUser>,
    pub legacy_mode: bool,
}

/// Run the generator.
///
/// With a non-empty roster, every user's source record is normalized and
/// rewritten, then one calendar and one status document are written per
/// user; the first user is mirrored to the old single-user URLs. With no
/// roster, the legacy `data.json` record is mandatory and only the old
/// URLs are written.
pub fn run(
    layout: &SiteLayout,
    source_tag: &str,
    now: DateTime<Utc>,
) -> CycleOverlayResult<RunReport> {
    let config = GenerationConfig::load(&layout.config_path())?;
    let rows = source::load_roster(&layout.roster_path())?;

    let mut users = Vec::new();
    let legacy_mode = rows.is_empty();

    if legacy_mode {
        let record = source::load_legacy_source(&layout.legacy_source_path())?;
        let cycle_length = resolve_cycle_length(&record, None, &config);
        let user = generate_user("legacy", "Legacy", &record, cycle_length, &config, source_tag, now)?;

        write_text(&layout.legacy_calendar_path(), &user.ics)?;
        write_json(&layout.legacy_status_path(), &user.status)?;
        users.push(user);
    } else {
        for row in &rows {
            let record =
                source::ensure_source(&layout.source_path(&row.token), &row.start_date, row.cycle_length)?;
            let cycle_length = resolve_cycle_length(&record, row.cycle_length, &config);
            let user =
                generate_user(&row.token, &row.label, &record, cycle_length, &config, source_tag, now)?;

            write_text(&layout.calendar_path(&user.token), &user.ics)?;
            write_json(&layout.status_path(&user.token), &user.status)?;
            users.push(user);
        }

        // The first roster user keeps serving the old single-user URLs.
        if let Some(first) = users.first() {
            write_text(&layout.legacy_calendar_path(), &first.ics)?;
            write_json(&layout.legacy_status_path(), &first.status)?;
        }
    }

    Ok(RunReport { users, legacy_mode })
}

/// Compute the snapshot for one user without touching site outputs.
pub fn status_for(
    layout: &SiteLayout,
    token: &str,
    source_tag: &str,
    now: DateTime<Utc>,
) -> CycleOverlayResult<StatusSnapshot> {
    let config = GenerationConfig::load(&layout.config_path())?;
    let rows = source::load_roster(&layout.roster_path())?;

    if let Some(row) = rows.iter().find(|row| row.token == token) {
        let record = source::read_source(&layout.source_path(&row.token));

        let start = if record.last_period_start.is_empty() {
            row.start_date.clone()
        } else {
            record.last_period_start.clone()
        };
        let history = source::normalize_history(&record.history, &start);
        let last_period_start = parse_start(&start, token)?;
        let cycle_length = resolve_cycle_length(&record, row.cycle_length, &config);

        return Ok(compute_status(
            now.date_naive(),
            last_period_start,
            &history,
            cycle_length,
            config.period_length,
            source_tag,
            now,
            &row.token,
            &row.label,
        ));
    }

    if token == "legacy" {
        let record = source::load_legacy_source(&layout.legacy_source_path())?;
        let last_period_start = parse_start(&record.last_period_start, token)?;
        let cycle_length = resolve_cycle_length(&record, None, &config);

        return Ok(compute_status(
            now.date_naive(),
            last_period_start,
            &record.history,
            cycle_length,
            config.period_length,
            source_tag,
            now,
            "legacy",
            "Legacy",
        ));
    }

    Err(CycleOverlayError::Roster(format!(
        "Unknown user token '{}'",
        token
    )))
}

/// The record's own override wins, then the roster's, then the site-wide
/// default. Non-positive values are ignored.
fn resolve_cycle_length(
    record: &SourceRecord,
    roster_override: Option<i64>,
    config: &GenerationConfig,
) -> i64 {
    record
        .cycle_length
        .filter(|n| *n > 0)
        .or(roster_override)
        .unwrap_or(config.cycle_length)
}

fn generate_user(
    token: &str,
    label: &str,
    record: &SourceRecord,
    cycle_length: i64,
    config: &GenerationConfig,
    source_tag: &str,
    now: DateTime<Utc>,
) -> CycleOverlayResult<GeneratedUser> {
    let last_period_start = parse_start(&record.last_period_start, token)?;

    let today = now.date_naive();
    let end_date = today + Duration::days(config.days_ahead());

    let mut timeline =
        CycleTimeline::resolve(last_period_start, &record.history, cycle_length, config.period_length);
    timeline.project_to(end_date);

    let title = if label.is_empty() {
        config.calendar_name.clone()
    } else {
        format!("{} - {}", config.calendar_name, label)
    };

    let ics = build_calendar(&title, timeline.first_start(), end_date, &timeline, now)?;

    let status = compute_status(
        today,
        last_period_start,
        &record.history,
        cycle_length,
        config.period_length,
        source_tag,
        now,
        token,
        label,
    );

    Ok(GeneratedUser {
        token: token.to_string(),
        label: label.to_string(),
        ics,
        status,
    })
}

fn parse_start(value: &str, token: &str) -> CycleOverlayResult<chrono::NaiveDate> {
    parse_date(value).ok_or_else(|| {
        CycleOverlayError::Config(format!(
            "Invalid last_period_start '{}' for user '{}'. Expected YYYY-MM-DD",
            value, token
        ))
    })
}

fn write_text(path: &Path, content: &str) -> CycleOverlayResult<()> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    std::fs::write(path, content)?;
    Ok(())
}

fn write_json(path: &Path, status: &StatusSnapshot) -> CycleOverlayResult<()> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }

    let content = serde_json::to_string_pretty(status)
        .map_err(|e| CycleOverlayError::Serialization(e.to_string()))?;

    std::fs::write(path, content + "\n")?;
    Ok(())
}
