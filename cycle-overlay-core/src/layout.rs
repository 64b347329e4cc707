//! Filesystem layout of a cycle-overlay site.

use std::path::{Path, PathBuf};

/// All input and output locations, derived from a single site root.
///
/// The generator never touches a path that does not come from here, so a
/// run is fully scoped to the root it was started with.
#[derive(Debug, Clone)]
pub struct SiteLayout {
    root: PathBuf,
}

impl SiteLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        SiteLayout { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Site-wide generation settings.
    pub fn config_path(&self) -> PathBuf {
        self.root.join("config.json")
    }

    /// Single-user source record kept for pre-roster sites.
    pub fn legacy_source_path(&self) -> PathBuf {
        self.root.join("data.json")
    }

    /// CSV roster of users.
    pub fn roster_path(&self) -> PathBuf {
        self.root.join("docs").join("data").join("users.csv")
    }

    /// Per-user source of truth (read-modify-write).
    pub fn source_path(&self, token: &str) -> PathBuf {
        self.root
            .join("data")
            .join("users")
            .join(format!("{}.json", token))
    }

    pub fn calendar_path(&self, token: &str) -> PathBuf {
        self.root
            .join("docs")
            .join("cal")
            .join(format!("{}.ics", token))
    }

    pub fn status_path(&self, token: &str) -> PathBuf {
        self.root
            .join("docs")
            .join("data")
            .join("users")
            .join(format!("{}.json", token))
    }

    /// Old single-user calendar URL still served by the site.
    pub fn legacy_calendar_path(&self) -> PathBuf {
        self.root.join("docs").join("calendar.ics")
    }

    /// Old single-user status URL still served by the site.
    pub fn legacy_status_path(&self) -> PathBuf {
        self.root.join("docs").join("app").join("data.json")
    }
}
