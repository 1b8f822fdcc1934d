//! Severity levels, ordered from the most verbose to the most critical
use std::{convert::Infallible, fmt, str::FromStr};

/// Importance of a log document.
///
/// The derived ordering follows the declaration order and is the only thing used to gate
/// emission: a call is suppressed when its severity is lower than the configured minimum.
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Severity {
    /// Debugging details. All other severities are emitted when this is the minimum.
    Trace = 0,
    /// Relevant information about a process.
    #[default]
    Info,
    /// Unexpected behavior that may not be a critical issue.
    Warn,
    /// Something that deserves attention.
    Error,
    /// Something very wrong. Emitting at this severity also halts the application.
    Fatal,
}

static SEVERITY_NAMES: [&str; 5] = ["debug", "info", "warn", "error", "fatal"];

impl Severity {
    pub const ALL: [Severity; 5] = [
        Severity::Trace,
        Severity::Info,
        Severity::Warn,
        Severity::Error,
        Severity::Fatal,
    ];

    #[inline(always)]
    pub fn rank(self) -> u8 {
        self as u8
    }

    pub fn from_rank(rank: u8) -> Option<Self> {
        Self::ALL.get(rank as usize).copied()
    }

    /// Canonical lowercase name, as written in the `level` field.
    ///
    /// Note that `Trace` renders as `"debug"`.
    #[inline(always)]
    pub fn as_str(self) -> &'static str {
        SEVERITY_NAMES[self as usize]
    }

    /// Case-insensitive parsing that never fails: anything unrecognized maps to `Info`.
    pub fn parse_lenient(level: &str) -> Self {
        if level.eq_ignore_ascii_case("trace") || level.eq_ignore_ascii_case("debug") {
            Severity::Trace
        } else if level.eq_ignore_ascii_case("warn") {
            Severity::Warn
        } else if level.eq_ignore_ascii_case("error") {
            Severity::Error
        } else if level.eq_ignore_ascii_case("fatal") {
            Severity::Fatal
        } else {
            Severity::Info
        }
    }
}

/// Name of a raw rank, empty when the rank does not match any severity.
pub fn rank_name(rank: u8) -> &'static str {
    Severity::from_rank(rank).map_or("", Severity::as_str)
}

impl fmt::Display for Severity {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt.pad(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = Infallible;

    fn from_str(level: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse_lenient(level))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_order() {
        for pair in Severity::ALL.windows(2) {
            assert!(pair[0] < pair[1]);
            assert!(pair[0].rank() < pair[1].rank());
        }
    }

    #[test]
    fn test_names() {
        assert_eq!(Severity::Trace.as_str(), "debug");
        assert_eq!(Severity::Info.to_string(), "info");
        assert_eq!(Severity::Warn.as_str(), "warn");
        assert_eq!(Severity::Error.as_str(), "error");
        assert_eq!(Severity::Fatal.as_str(), "fatal");
        assert_eq!(format!("{:<6}|", Severity::Warn), "warn  |");
    }

    #[test]
    fn test_rank_name_out_of_range() {
        assert_eq!(rank_name(3), "error");
        assert_eq!(rank_name(5), "");
        assert_eq!(rank_name(u8::MAX), "");
        assert_eq!(Severity::from_rank(5), None);
    }

    #[test]
    fn test_parse_lenient() {
        assert_eq!(Severity::parse_lenient("trace"), Severity::Trace);
        assert_eq!(Severity::parse_lenient("DEBUG"), Severity::Trace);
        assert_eq!(Severity::parse_lenient("Warn"), Severity::Warn);
        assert_eq!(Severity::parse_lenient("error"), Severity::Error);
        assert_eq!(Severity::parse_lenient("FATAL"), Severity::Fatal);
        assert_eq!(Severity::parse_lenient("info"), Severity::Info);
        assert_eq!(Severity::parse_lenient(""), Severity::Info);
        assert_eq!(Severity::parse_lenient("verbose"), Severity::Info);
        assert_eq!("warn".parse::<Severity>(), Ok(Severity::Warn));
    }
}
