use linelog::{
    current::{self, current},
    encoder::{Field, Value},
    levels::Severity,
};

struct LogDispatch;

impl log::Log for LogDispatch {
    fn enabled(&self, metadata: &log::Metadata<'_>) -> bool {
        current().is_enabled(log_level_to_severity(metadata.level()))
    }

    fn log(&self, record: &log::Record<'_>) {
        let emitter = current();
        let level = log_level_to_severity(record.level());
        if !emitter.is_enabled(level) {
            return;
        }
        let module = Field::new("module", record.module_path().unwrap_or("unknown"));
        match record.line() {
            Some(line) => emitter.emit_fmt(
                record.target(),
                level,
                *record.args(),
                &[module, Field::new("line", line)],
            ),
            None => emitter.emit_fmt(record.target(), level, *record.args(), &[module]),
        }
    }

    // every document is written synchronously
    fn flush(&self) {}
}

/// Installs a `log` crate dispatcher that forwards records to the current logger.
///
/// The record target becomes the tag, the formatted arguments the message, and the module
/// path and line are added as fields. `debug` and `trace` records both map to
/// [`Severity::Trace`].
///
/// # Arguments
///
/// * `interop_max_level_override` - maximum level handed to `log::set_max_level`. If `None`,
///   the minimum level of the current logger is used.
pub fn install_log_interop(interop_max_level_override: Option<Severity>) {
    static LOG_DISPATCHER: LogDispatch = LogDispatch;
    let max_level = severity_to_log_level_filter(
        interop_max_level_override.unwrap_or_else(|| current().min_level()),
    );
    match log::set_logger(&LOG_DISPATCHER) {
        Ok(()) => log::set_max_level(max_level),
        Err(e) => current::error(
            "linelog",
            "could not set log crate dispatcher",
            &[Field::new("error", Value::error(&e))],
        ),
    }
}

pub(crate) fn log_level_to_severity(level: log::Level) -> Severity {
    match level {
        log::Level::Error => Severity::Error,
        log::Level::Warn => Severity::Warn,
        log::Level::Info => Severity::Info,
        log::Level::Debug | log::Level::Trace => Severity::Trace,
    }
}

pub(crate) fn severity_to_log_level_filter(level: Severity) -> log::LevelFilter {
    match level {
        Severity::Trace => log::LevelFilter::Trace,
        Severity::Info => log::LevelFilter::Info,
        Severity::Warn => log::LevelFilter::Warn,
        Severity::Error => log::LevelFilter::Error,
        Severity::Fatal => log::LevelFilter::Off, //there is no fatal level in the log crate
    }
}
