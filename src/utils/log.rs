//! Colored stderr logging behind the `info!`, `warn!` and `error!` macros.
//!
//! The validator reports applied fixes and unreachable nodes through these
//! macros, and the coin selector reports change outputs. Output is tuned
//! through [`configure`], usually from
//! [`Settings::apply_logging`](crate::config::Settings::apply_logging).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::Write;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

const SECS_PER_DAY: u64 = 86_400;

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Info = 1,
    Warn = 2,
    Error = 3,
}

impl Level {
    pub fn as_str(self) -> &'static str {
        match self {
            Level::Info => "INFO",
            Level::Warn => "WARN",
            Level::Error => "ERROR",
        }
    }

    fn color(self) -> ColorSpec {
        let mut spec = ColorSpec::new();
        match self {
            Level::Info => {}
            Level::Warn => {
                spec.set_fg(Some(Color::Yellow)).set_bold(true);
            }
            Level::Error => {
                spec.set_fg(Some(Color::Red)).set_bold(true);
            }
        }
        spec
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Case-insensitive, as written in settings files.
impl FromStr for Level {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "info" => Ok(Level::Info),
            "warn" | "warning" => Ok(Level::Warn),
            "error" => Ok(Level::Error),
            other => Err(format!("unknown log level `{other}`")),
        }
    }
}

static SHOW_TIMESTAMP: AtomicBool = AtomicBool::new(true);
static SHOW_LEVEL: AtomicBool = AtomicBool::new(true);
static MIN_LEVEL: AtomicU8 = AtomicU8::new(Level::Info as u8);

/// Sets the output switches and the lowest level that gets printed.
pub fn configure(show_timestamp: bool, show_level: bool, min_level: Level) {
    SHOW_TIMESTAMP.store(show_timestamp, Ordering::Relaxed);
    SHOW_LEVEL.store(show_level, Ordering::Relaxed);
    MIN_LEVEL.store(min_level as u8, Ordering::Relaxed);
}

pub fn enabled(level: Level) -> bool {
    level as u8 >= MIN_LEVEL.load(Ordering::Relaxed)
}

/// Proleptic Gregorian (year, month, day) for a count of days since 1970-01-01.
fn civil_date(days: u64) -> (u32, u32, u32) {
    // Shift the epoch to 0000-03-01 so leap days end each 400-year cycle.
    let shifted = days as i64 + 719_468;
    let cycle = shifted.div_euclid(146_097);
    let day_of_cycle = shifted.rem_euclid(146_097) as u32;
    let year_of_cycle =
        (day_of_cycle - day_of_cycle / 1_460 + day_of_cycle / 36_524 - day_of_cycle / 146_096) / 365;
    let day_of_year = day_of_cycle - (365 * year_of_cycle + year_of_cycle / 4 - year_of_cycle / 100);
    let month_from_march = (5 * day_of_year + 2) / 153;
    let day = day_of_year - (153 * month_from_march + 2) / 5 + 1;
    let month = if month_from_march < 10 { month_from_march + 3 } else { month_from_march - 9 };
    let year = year_of_cycle as i64 + cycle * 400 + i64::from(month <= 2);
    (year as u32, month, day)
}

/// `YYYY-MM-DD hh:mm:ss.mmm` in UTC.
fn format_timestamp(since_epoch: Duration) -> String {
    let secs = since_epoch.as_secs();
    let (year, month, day) = civil_date(secs / SECS_PER_DAY);
    let in_day = secs % SECS_PER_DAY;
    format!(
        "{year:04}-{month:02}-{day:02} {:02}:{:02}:{:02}.{:03}",
        in_day / 3_600,
        (in_day / 60) % 60,
        in_day % 60,
        since_epoch.subsec_millis()
    )
}

/// Text written before the message, honoring the switches.
fn line_prefix(level: Level, since_epoch: Duration, show_timestamp: bool, show_level: bool) -> String {
    let mut prefix = String::new();
    if show_timestamp {
        prefix.push_str(&format_timestamp(since_epoch));
        prefix.push(' ');
    }
    if show_level {
        prefix.push_str(&format!("[{:5}] ", level.as_str()));
    }
    prefix
}

/// Writes one line to stderr. Use the macros instead.
#[doc(hidden)]
pub fn log(level: Level, message: &str) {
    if !enabled(level) {
        return;
    }
    let now = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default();
    let prefix = line_prefix(
        level,
        now,
        SHOW_TIMESTAMP.load(Ordering::Relaxed),
        SHOW_LEVEL.load(Ordering::Relaxed),
    );

    let mut stderr = StandardStream::stderr(ColorChoice::Auto);
    let _ = stderr.set_color(&level.color());
    let _ = writeln!(stderr, "{prefix}{message}");
    let _ = stderr.reset();
}

/// Routine progress, such as a fix the validator applied.
#[macro_export]
macro_rules! info {
    ($($arg:tt)*) => {{
        if cfg!(not(test)) {
            $crate::utils::log::log($crate::utils::log::Level::Info, &format!($($arg)*))
        }
    }};
}

/// Something went wrong but work continues, such as a rule the network
/// could not answer.
#[macro_export]
macro_rules! warn {
    ($($arg:tt)*) => {{
        if cfg!(not(test)) {
            $crate::utils::log::log($crate::utils::log::Level::Warn, &format!($($arg)*))
        }
    }};
}

#[macro_export]
macro_rules! error {
    ($($arg:tt)*) => {{
        if cfg!(not(test)) {
            $crate::utils::log::log($crate::utils::log::Level::Error, &format!($($arg)*))
        }
    }};
}

#[cfg(test)]
mod tests {
    use super::*;

    // ========== Level Tests ==========

    #[test]
    fn levels_order_by_severity() {
        assert!(Level::Info < Level::Warn);
        assert!(Level::Warn < Level::Error);
    }

    #[test]
    fn level_names() {
        assert_eq!(Level::Warn.to_string(), "WARN");
        assert_eq!("Warning".parse::<Level>(), Ok(Level::Warn));
        assert_eq!("ERROR".parse::<Level>(), Ok(Level::Error));
        assert!("debug".parse::<Level>().is_err());
        assert_eq!(serde_json::to_string(&Level::Warn).unwrap(), "\"warn\"");
        assert_eq!(serde_json::from_str::<Level>("\"error\"").unwrap(), Level::Error);
    }

    #[test]
    fn min_level_filters() {
        configure(true, true, Level::Warn);
        assert!(!enabled(Level::Info));
        assert!(enabled(Level::Warn));
        assert!(enabled(Level::Error));
        configure(true, true, Level::Info);
        assert!(enabled(Level::Info));
    }

    // ========== Prefix Tests ==========

    #[test]
    fn civil_dates() {
        assert_eq!(civil_date(0), (1970, 1, 1));
        assert_eq!(civil_date(19_723), (2024, 1, 1));
        assert_eq!(civil_date(19_782), (2024, 2, 29));
        assert_eq!(civil_date(11_016), (2000, 2, 29));
    }

    #[test]
    fn timestamp_format() {
        let at = Duration::from_millis(19_782 * SECS_PER_DAY * 1_000 + 13 * 3_600_000 + 5 * 60_000 + 9_042);
        assert_eq!(format_timestamp(at), "2024-02-29 13:05:09.042");
    }

    #[test]
    fn prefix_follows_switches() {
        let at = Duration::from_secs(0);
        assert_eq!(line_prefix(Level::Info, at, true, true), "1970-01-01 00:00:00.000 [INFO ] ");
        assert_eq!(line_prefix(Level::Error, at, false, true), "[ERROR] ");
        assert_eq!(line_prefix(Level::Warn, at, false, false), "");
    }
}
