use anyhow::Result;
use chrono::Utc;
use cycle_overlay_core::layout::SiteLayout;
use cycle_overlay_core::pipeline::{self, DEFAULT_SOURCE_TAG};
use owo_colors::OwoColorize;

pub fn run(layout: &SiteLayout, token: &str, json: bool) -> Result<()> {
    let status = pipeline::status_for(layout, token, DEFAULT_SOURCE_TAG, Utc::now())?;

    if json {
        println!("{}", serde_json::to_string_pretty(&status)?);
        return Ok(());
    }

    println!(
        "{} {}",
        status.label.bold(),
        format!("({})", status.token).dimmed()
    );
    println!(
        "   {} {} (day {})",
        status.phase_emoji, status.phase, status.cycle_day
    );
    println!(
        "   cycle length: {} (avg {})",
        status.cycle_length, status.avg_cycle_length_days
    );
    println!("   next period:  {}", status.predicted_next_start);
    println!("   ovulation:    {}", status.predicted_ovulation_day);
    println!("   {}", status.note.dimmed());

    Ok(())
}
