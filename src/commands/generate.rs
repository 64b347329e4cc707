use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use cycle_overlay_core::layout::SiteLayout;
use cycle_overlay_core::pipeline;
use owo_colors::OwoColorize;

pub fn run(layout: &SiteLayout, source_tag: &str, today: Option<&str>) -> Result<()> {
    let now = match today {
        Some(value) => {
            let date = NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .with_context(|| format!("Invalid date '{}'. Expected YYYY-MM-DD", value))?;
            date.and_hms_opt(0, 0, 0).unwrap().and_utc()
        }
        None => Utc::now(),
    };

    let report = pipeline::run(layout, source_tag, now)?;

    for (i, user) in report.users.iter().enumerate() {
        println!("{} {}", user.label.bold(), format!("({})", user.token).dimmed());
        println!(
            "   day {} {} {}",
            user.status.cycle_day, user.status.phase_emoji, user.status.phase
        );

        let calendar_path = if report.legacy_mode {
            layout.legacy_calendar_path()
        } else {
            layout.calendar_path(&user.token)
        };
        println!("   {}", calendar_path.display().to_string().dimmed());

        if i < report.users.len() - 1 {
            println!();
        }
    }

    println!(
        "\nGenerated {} calendar{}",
        report.users.len(),
        if report.users.len() == 1 { "" } else { "s" }
    );

    Ok(())
}
