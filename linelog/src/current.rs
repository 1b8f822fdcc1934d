//! The current logger
//!
//! Free functions and [`Context::new`] go through a process-wide handle. It starts as
//! `Emitter::default()` (info and above, to stderr, no time) and is replaced as a whole: a setter
//! builds a modified copy and swaps it in, so emitters already handed out by [`current`] and
//! contexts derived from them keep their configuration.
use crate::{
    context::Context,
    emitter::{Emitter, Hook},
    encoder::Field,
    levels::Severity,
    time::TimeFormat,
};
use std::sync::{Arc, PoisonError, RwLock};

lazy_static! {
    static ref G_CURRENT: RwLock<Arc<Emitter>> = RwLock::new(Arc::new(Emitter::default()));
}

#[inline]
pub fn current() -> Arc<Emitter> {
    G_CURRENT
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .clone()
}

/// Installs `emitter` as the current logger, returning the one it replaces.
pub fn set_current(emitter: Emitter) -> Arc<Emitter> {
    replace_current(Arc::new(emitter))
}

pub(crate) fn replace_current(emitter: Arc<Emitter>) -> Arc<Emitter> {
    let mut guard = G_CURRENT.write().unwrap_or_else(PoisonError::into_inner);
    std::mem::replace(&mut *guard, emitter)
}

/// Installs a modified copy of the current logger.
pub fn update_current(update: impl FnOnce(&mut Emitter)) {
    let mut guard = G_CURRENT.write().unwrap_or_else(PoisonError::into_inner);
    let mut emitter = Emitter::clone(&guard);
    update(&mut emitter);
    *guard = Arc::new(emitter);
}

/// Sets the minimum level from a name, unknown names meaning `info`.
pub fn set_level(level: &str) {
    let level = Severity::parse_lenient(level);
    update_current(|emitter| emitter.set_min_level(level));
}

/// Adds an RFC 3339 `time` field to the documents of the current logger.
///
/// Only the time format changes: level, sink, hook and context are kept rather than reset to
/// the defaults.
pub fn set_with_time() {
    update_current(|emitter| emitter.set_time_format(TimeFormat::rfc3339()));
}

/// Installs `hook` on the current logger.
///
/// Only the hook changes: level, sink, time format and context are kept rather than reset to
/// the defaults.
pub fn set_hook(hook: Hook) {
    update_current(|emitter| emitter.set_hook(Some(hook)));
}

/// Context bound to a snapshot of the current logger.
pub fn context(tag: impl Into<String>, fields: &[Field<'_>]) -> Context {
    Context::new(tag, fields)
}

pub fn trace(tag: &str, message: &str, fields: &[Field<'_>]) {
    current().trace(tag, message, fields);
}

pub fn info(tag: &str, message: &str, fields: &[Field<'_>]) {
    current().info(tag, message, fields);
}

pub fn warn(tag: &str, message: &str, fields: &[Field<'_>]) {
    current().warn(tag, message, fields);
}

pub fn error(tag: &str, message: &str, fields: &[Field<'_>]) {
    current().error(tag, message, fields);
}

/// Emits at `Fatal` through the current logger, which then runs its exit action.
pub fn fatal(tag: &str, message: &str, fields: &[Field<'_>]) {
    current().fatal(tag, message, fields);
}
