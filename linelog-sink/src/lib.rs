//! Configuration of the current linelog logger
//!
//! Explicit settings win over environment variables, which win over defaults:
//!
//! | setting     | builder method          | environment           | default  |
//! |-------------|-------------------------|-----------------------|----------|
//! | min level   | `with_min_level`        | `LINELOG_LEVEL`       | `info`   |
//! | time format | `with_time_format`      | `LINELOG_TIME_FORMAT` | no time  |
//! | output      | `with_output`           | `LINELOG_OUTPUT`      | `stderr` |
//!
//! ```no_run
//! use linelog_sink::LoggerConfigBuilder;
//!
//! let _logger = LoggerConfigBuilder::default()
//!     .with_time_format(linelog::time::RFC3339)
//!     .with_install_log_capture(true)
//!     .install()
//!     .expect("logger configuration");
//! log::info!("routed through linelog");
//! ```

// crate-specific lint exceptions:
#![allow(clippy::missing_errors_doc)]

pub mod log_interop;

use anyhow::{Context, Result, bail};
use linelog::{
    current::{current, set_current},
    emitter::{Emitter, Hook},
    exit::SharedExitAction,
    levels::Severity,
    sink::{SharedSink, StderrSink, StdoutSink},
};
use log_interop::install_log_interop;
use std::{str::FromStr, sync::Arc};

pub const LEVEL_ENV_VAR: &str = "LINELOG_LEVEL";
pub const TIME_FORMAT_ENV_VAR: &str = "LINELOG_TIME_FORMAT";
pub const OUTPUT_ENV_VAR: &str = "LINELOG_OUTPUT";

/// Standard stream receiving the documents when no custom sink is given.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Output {
    #[default]
    Stderr,
    Stdout,
}

impl Output {
    pub fn sink(self) -> SharedSink {
        match self {
            Output::Stderr => Arc::new(StderrSink),
            Output::Stdout => Arc::new(StdoutSink),
        }
    }
}

impl FromStr for Output {
    type Err = anyhow::Error;

    fn from_str(output: &str) -> Result<Self> {
        if output.eq_ignore_ascii_case("stderr") {
            Ok(Output::Stderr)
        } else if output.eq_ignore_ascii_case("stdout") {
            Ok(Output::Stdout)
        } else {
            bail!("unknown output {output:?}, expected stderr or stdout")
        }
    }
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

#[derive(Default)]
pub struct LoggerConfigBuilder {
    min_level: Option<Severity>,
    time_format: Option<String>,
    output: Option<Output>,
    sink: Option<SharedSink>,
    hook: Option<Hook>,
    exit_action: Option<SharedExitAction>,
    install_log_capture: bool,
    interop_max_level_override: Option<Severity>,
}

impl LoggerConfigBuilder {
    /// Programmatic override of `LINELOG_LEVEL`
    #[must_use]
    pub fn with_min_level(mut self, level: Severity) -> Self {
        self.min_level = Some(level);
        self
    }

    /// strftime format, empty to leave the `time` field out. Overrides `LINELOG_TIME_FORMAT`.
    #[must_use]
    pub fn with_time_format(mut self, time_format: impl Into<String>) -> Self {
        self.time_format = Some(time_format.into());
        self
    }

    #[must_use]
    pub fn with_output(mut self, output: Output) -> Self {
        self.output = Some(output);
        self
    }

    /// Custom destination, takes precedence over the output setting.
    #[must_use]
    pub fn with_sink(mut self, sink: SharedSink) -> Self {
        self.sink = Some(sink);
        self
    }

    #[must_use]
    pub fn with_hook(mut self, hook: Hook) -> Self {
        self.hook = Some(hook);
        self
    }

    #[must_use]
    pub fn with_exit_action(mut self, exit_action: SharedExitAction) -> Self {
        self.exit_action = Some(exit_action);
        self
    }

    /// Forward records of the `log` crate when installing.
    #[must_use]
    pub fn with_install_log_capture(mut self, enabled: bool) -> Self {
        self.install_log_capture = enabled;
        self
    }

    #[must_use]
    pub fn with_interop_max_level_override(mut self, level: Severity) -> Self {
        self.interop_max_level_override = Some(level);
        self
    }

    pub fn build(self) -> Result<Emitter> {
        let min_level = self
            .min_level
            .or_else(|| env_var(LEVEL_ENV_VAR).map(|level| Severity::parse_lenient(&level)))
            .unwrap_or_default();
        let time_format = self
            .time_format
            .or_else(|| env_var(TIME_FORMAT_ENV_VAR))
            .unwrap_or_default();
        let sink = match self.sink {
            Some(sink) => sink,
            None => {
                let output = match self.output {
                    Some(output) => output,
                    None => env_var(OUTPUT_ENV_VAR)
                        .map(|output| output.parse::<Output>())
                        .transpose()
                        .with_context(|| format!("reading {OUTPUT_ENV_VAR}"))?
                        .unwrap_or_default(),
                };
                output.sink()
            }
        };

        let mut builder = Emitter::builder()
            .with_min_level(min_level)
            .with_shared_sink(sink)
            .with_time_format(time_format.clone())
            .with_shared_hook(self.hook);
        if let Some(exit_action) = self.exit_action {
            builder = builder.with_exit_action(exit_action);
        }
        builder
            .build()
            .with_context(|| format!("configuring time format {time_format:?}"))
    }

    /// Builds the emitter and makes it the current logger.
    pub fn install(self) -> Result<Arc<Emitter>> {
        let install_log_capture = self.install_log_capture;
        let interop_max_level_override = self.interop_max_level_override;
        set_current(self.build()?);
        // the interop max level defaults to the level of the logger just installed
        if install_log_capture {
            install_log_interop(interop_max_level_override);
        }
        Ok(current())
    }
}
