//! Rendering of the `time` field
use crate::{
    encoder::write_raw_fmt,
    errors::{Error, Result},
};
use chrono::{
    DateTime, Local, TimeZone,
    format::{Item, StrftimeItems},
};
use std::{
    fmt::{self, Write as _},
    sync::Arc,
};

/// strftime equivalent of RFC 3339 with second precision.
pub const RFC3339: &str = "%Y-%m-%dT%H:%M:%S%:z";

/// Validated strftime format, or nothing when documents carry no `time` field.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TimeFormat(Option<Arc<str>>);

impl TimeFormat {
    pub fn none() -> Self {
        Self(None)
    }

    pub fn rfc3339() -> Self {
        Self(Some(Arc::from(RFC3339)))
    }

    /// An empty format disables the `time` field.
    ///
    /// Some specifiers parse but cannot be rendered (`%#z`), so the format is also tried once
    /// against the current time.
    pub fn new(format: &str) -> Result<Self> {
        if format.is_empty() {
            return Ok(Self::none());
        }
        if StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
            return Err(Error::InvalidTimeFormat(format.to_owned()));
        }
        let mut rendered = String::new();
        if write!(rendered, "{}", Local::now().format(format)).is_err() {
            return Err(Error::InvalidTimeFormat(format.to_owned()));
        }
        Ok(Self(Some(Arc::from(format))))
    }

    pub fn is_enabled(&self) -> bool {
        self.0.is_some()
    }

    pub fn as_str(&self) -> &str {
        self.0.as_deref().unwrap_or("")
    }

    /// Appends the current local time, unescaped.
    pub fn write_now(&self, buf: &mut Vec<u8>) {
        self.write_time(buf, &Local::now());
    }

    pub fn write_time<Tz>(&self, buf: &mut Vec<u8>, time: &DateTime<Tz>)
    where
        Tz: TimeZone,
        Tz::Offset: fmt::Display,
    {
        if let Some(format) = &self.0 {
            write_raw_fmt(buf, format_args!("{}", time.format(format)));
        }
    }
}

impl TryFrom<&str> for TimeFormat {
    type Error = Error;

    fn try_from(format: &str) -> Result<Self> {
        Self::new(format)
    }
}
