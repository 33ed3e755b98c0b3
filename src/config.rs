use crate::dates::DateWindow;
use anyhow::Result;
use chrono::NaiveDate;
use std::path::PathBuf;
use std::time::Duration;

/// Longest trailing window the settings screen accepts.
pub const MAX_TRAILING_DAYS: u32 = 3650;

/// Main configuration for the scrape pipeline.
pub struct Config {
    /// Site root, without trailing slash.
    pub base_url: String,
    /// Format filter on listing pages (e.g. "PAU").
    pub format_code: String,
    /// Metagame period id on listing pages.
    pub meta_id: u32,
    /// Explicit window start, `YYYYMMDD`. None = trailing window.
    pub start_date: Option<String>,
    /// Explicit window end, `YYYYMMDD`. None = today.
    pub end_date: Option<String>,
    /// Length of the default window ending today.
    pub trailing_days: u32,
    /// Pause before every HTTP request.
    pub request_delay: Duration,
    /// Base output directory.
    pub output_dir: PathBuf,
    /// Path to the SQLite database.
    pub db_path: PathBuf,
    /// Load the data tree into the database after scraping.
    pub load_database: bool,
}

impl Config {
    /// Pauper results on mtgtop8, last three days.
    pub fn default_pauper() -> Self {
        let base = PathBuf::from(".");
        Self {
            base_url: "https://www.mtgtop8.com".into(),
            format_code: "PAU".into(),
            meta_id: 127,
            start_date: None,
            end_date: None,
            trailing_days: 3,
            request_delay: Duration::from_secs(2),
            db_path: base.join("pauper.db"),
            output_dir: base,
            load_database: false,
        }
    }

    /// Published events live here.
    pub fn data_dir(&self) -> PathBuf {
        self.output_dir.join("data")
    }

    /// Kept beside `data_dir` so promotion is a same-filesystem rename.
    pub fn staging_dir(&self) -> PathBuf {
        self.output_dir.join(".staging")
    }

    pub fn resolve_window(&self, today: NaiveDate) -> Result<DateWindow> {
        let window = match (&self.start_date, &self.end_date) {
            (None, None) => DateWindow::trailing(today, self.trailing_days)?,
            (start, end) => {
                let trailing = DateWindow::trailing(today, self.trailing_days)?;
                let start = start.clone().unwrap_or_else(|| trailing.start().to_string());
                let end = end.clone().unwrap_or_else(|| trailing.end().to_string());
                DateWindow::new(&start, &end)?
            }
        };
        Ok(window)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 8, 17).unwrap()
    }

    #[test]
    fn test_default_window_trails_today() {
        let config = Config::default_pauper();
        let w = config.resolve_window(today()).unwrap();
        assert_eq!((w.start(), w.end()), (20240814, 20240817));
    }

    #[test]
    fn test_explicit_window() {
        let mut config = Config::default_pauper();
        config.start_date = Some("20240101".into());
        config.end_date = Some("20240131".into());
        let w = config.resolve_window(today()).unwrap();
        assert_eq!((w.start(), w.end()), (20240101, 20240131));

        config.end_date = None;
        let w = config.resolve_window(today()).unwrap();
        assert_eq!((w.start(), w.end()), (20240101, 20240817));
    }

    #[test]
    fn test_reversed_window_is_rejected() {
        let mut config = Config::default_pauper();
        config.start_date = Some("20240901".into());
        assert!(config.resolve_window(today()).is_err());
    }

    #[test]
    fn test_huge_trailing_window_is_an_error() {
        let mut config = Config::default_pauper();
        config.trailing_days = u32::MAX;
        assert!(config.resolve_window(today()).is_err());
    }

    #[test]
    fn test_staging_shares_output_dir() {
        let config = Config::default_pauper();
        assert_eq!(config.data_dir().parent(), config.staging_dir().parent());
    }
}
