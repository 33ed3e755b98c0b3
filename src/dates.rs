use crate::error::ScrapeError;
use chrono::{Datelike, Days, NaiveDate};

/// Convert a listing date (`DD/MM/YY`) into canonical `YYYYMMDD`.
pub fn convert_date_str(date: &str) -> Result<String, ScrapeError> {
    let parsed = NaiveDate::parse_from_str(date.trim(), "%d/%m/%y").map_err(|_| {
        ScrapeError::parse(format!("date '{}' not in expected DD/MM/YY format", date))
    })?;
    Ok(parsed.format("%Y%m%d").to_string())
}

/// Integer value of a `YYYYMMDD` string. Dates are always compared this way.
pub fn date_value(date: &str) -> Option<u32> {
    date.trim().parse().ok()
}

/// Integer `YYYYMMDD` of a calendar date; only four-digit years are representable.
fn naive_value(date: NaiveDate) -> Result<u32, ScrapeError> {
    match u32::try_from(date.year()) {
        Ok(year) if year <= 9999 => Ok(year * 10_000 + date.month() * 100 + date.day()),
        _ => Err(ScrapeError::parse(format!("date {} has no YYYYMMDD form", date))),
    }
}

/// Inclusive `[start, end]` window of canonical dates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateWindow {
    start: u32,
    end: u32,
}

impl DateWindow {
    pub fn new(start: &str, end: &str) -> Result<Self, ScrapeError> {
        let start_value = date_value(start)
            .ok_or_else(|| ScrapeError::parse(format!("start date '{}' is not YYYYMMDD", start)))?;
        let end_value = date_value(end)
            .ok_or_else(|| ScrapeError::parse(format!("end date '{}' is not YYYYMMDD", end)))?;
        if start_value > end_value {
            return Err(ScrapeError::parse(format!(
                "start date {} is after end date {}",
                start, end
            )));
        }
        Ok(Self { start: start_value, end: end_value })
    }

    /// The `days`-long window ending on `today`.
    pub fn trailing(today: NaiveDate, days: u32) -> Result<Self, ScrapeError> {
        let start = today
            .checked_sub_days(Days::new(u64::from(days)))
            .ok_or_else(|| ScrapeError::parse(format!("{} days before {} is out of range", days, today)))?;
        Ok(Self { start: naive_value(start)?, end: naive_value(today)? })
    }

    pub fn start(&self) -> u32 {
        self.start
    }

    pub fn end(&self) -> u32 {
        self.end
    }

    /// Whether `date` (canonical form) lies within the window. Unparseable dates never do.
    pub fn contains(&self, date: &str) -> bool {
        date_value(date).is_some_and(|d| d >= self.start && d <= self.end)
    }

    /// Whether `date` falls strictly before the window start.
    pub fn precedes(&self, date: &str) -> bool {
        date_value(date).is_none_or(|d| d < self.start)
    }
}

impl std::fmt::Display for DateWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}..={}", self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_convert_date_str() {
        assert_eq!(convert_date_str("17/08/24").unwrap(), "20240817");
        assert_eq!(convert_date_str(" 01/01/25 ").unwrap(), "20250101");
        assert!(matches!(convert_date_str("2024-08-17"), Err(ScrapeError::Parse(_))));
        assert!(convert_date_str("31/02/24").is_err());
    }

    #[test]
    fn test_window_is_inclusive() {
        let w = DateWindow::new("20240810", "20240817").unwrap();
        assert!(w.contains("20240810"));
        assert!(w.contains("20240817"));
        assert!(!w.contains("20240809"));
        assert!(!w.contains("20240818"));
        assert!(!w.contains("garbage"));
    }

    #[test]
    fn test_widening_never_drops_dates() {
        let narrow = DateWindow::new("20240812", "20240814").unwrap();
        let wide = DateWindow::new("20240801", "20240830").unwrap();
        for day in 1..=31 {
            let d = format!("202408{:02}", day);
            if narrow.contains(&d) {
                assert!(wide.contains(&d), "{} dropped by wider window", d);
            }
        }
    }

    #[test]
    fn test_window_rejects_reversed_bounds() {
        assert!(DateWindow::new("20240818", "20240817").is_err());
    }

    #[test]
    fn test_trailing_window_crosses_month() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 2).unwrap();
        let w = DateWindow::trailing(today, 3).unwrap();
        assert_eq!(w.start(), 20240228);
        assert_eq!(w.end(), 20240302);
        assert!(w.precedes("20240227"));
        assert!(!w.precedes("20240228"));
    }

    #[test]
    fn test_trailing_window_out_of_range() {
        let today = NaiveDate::from_ymd_opt(2024, 8, 17).unwrap();
        assert!(matches!(DateWindow::trailing(today, u32::MAX), Err(ScrapeError::Parse(_))));
        // Past year zero there is no eight-digit form.
        assert!(DateWindow::trailing(today, 2025 * 366).is_err());
        assert_eq!(DateWindow::trailing(today, 0).unwrap().start(), 20240817);
    }
}
