//! Site-wide generation settings.

use std::path::Path;

use config::{Config, File};
use serde::Deserialize;

use crate::error::{CycleOverlayError, CycleOverlayResult};

fn default_cycle_length() -> i64 {
    28
}

fn default_period_length() -> i64 {
    3
}

fn default_months_ahead() -> i64 {
    12
}

fn default_calendar_name() -> String {
    "Cycle".to_string()
}

/// Settings read from `config.json` at the site root.
///
/// Per-user cycle-length overrides live in each user's source record
/// instead.
#[derive(Debug, Deserialize, Clone)]
pub struct GenerationConfig {
    #[serde(default = "default_cycle_length")]
    pub cycle_length: i64,

    #[serde(default = "default_period_length")]
    pub period_length: i64,

    #[serde(default = "default_months_ahead")]
    pub months_ahead: i64,

    #[serde(default = "default_calendar_name")]
    pub calendar_name: String,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        GenerationConfig {
            cycle_length: default_cycle_length(),
            period_length: default_period_length(),
            months_ahead: default_months_ahead(),
            calendar_name: default_calendar_name(),
        }
    }
}

impl GenerationConfig {
    /// Load settings; a missing file means all defaults.
    pub fn load(path: &Path) -> CycleOverlayResult<Self> {
        let settings: GenerationConfig = Config::builder()
            .add_source(File::from(path.to_path_buf()).required(false))
            .build()
            .map_err(|e| CycleOverlayError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| CycleOverlayError::Config(e.to_string()))?;

        Ok(settings)
    }

    /// Number of days covered by `months_ahead`.
    ///
    /// Twelve months maps to exactly one year so yearly subscriptions
    /// line up; anything else approximates a month as 30.5 days.
    pub fn days_ahead(&self) -> i64 {
        if self.months_ahead == 12 {
            365
        } else {
            (self.months_ahead as f64 * 30.5).round() as i64
        }
    }
}
