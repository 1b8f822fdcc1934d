//! Assembly and delivery of log documents
use crate::{
    buffer_pool::BufferPool,
    encoder::{Field, Value, write_fields, write_flat_fields, write_json_fmt, write_json_str},
    errors::Result,
    exit::{FATAL_EXIT_CODE, ProcessExit, SharedExitAction},
    levels::Severity,
    sink::{SharedSink, Sink, StderrSink},
    time::TimeFormat,
};
use std::{fmt, sync::Arc};

/// Observer invoked with every document that passes the severity gate, before the sink sees it.
///
/// The slice is only valid for the duration of the call.
pub type Hook = Arc<dyn Fn(Severity, &[u8]) + Send + Sync>;

// room for the tag, level and a short message on top of the context
const DOCUMENT_OVERHEAD: usize = 128;

/// Configured engine writing one JSON line per call.
///
/// Cloning is cheap: the sink, hook, exit action and context bytes are shared. A clone is a
/// snapshot, changing its configuration does not affect the original.
#[derive(Clone)]
pub struct Emitter {
    min_level: Severity,
    sink: SharedSink,
    time_format: TimeFormat,
    hook: Option<Hook>,
    exit_action: SharedExitAction,
    // pre-encoded `,"key":value` fragments, never mutated once built
    context: Arc<[u8]>,
}

impl Default for Emitter {
    fn default() -> Self {
        Self {
            min_level: Severity::Info,
            sink: Arc::new(StderrSink),
            time_format: TimeFormat::none(),
            hook: None,
            exit_action: Arc::new(ProcessExit),
            context: Arc::from(Vec::new()),
        }
    }
}

impl fmt::Debug for Emitter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Emitter")
            .field("min_level", &self.min_level)
            .field("time_format", &self.time_format.as_str())
            .field("hook", &self.hook.is_some())
            .field("context", &String::from_utf8_lossy(&self.context))
            .finish_non_exhaustive()
    }
}

impl Emitter {
    /// Most deployments use [`TimeFormat::rfc3339`]. When documents are shipped through syslog
    /// the time can be left out.
    pub fn new(sink: SharedSink, time_format: TimeFormat) -> Self {
        Self {
            sink,
            time_format,
            ..Self::default()
        }
    }

    pub fn builder() -> EmitterBuilder {
        EmitterBuilder::default()
    }

    pub fn min_level(&self) -> Severity {
        self.min_level
    }

    pub fn set_min_level(&mut self, level: Severity) {
        self.min_level = level;
    }

    #[inline(always)]
    pub fn is_enabled(&self, level: Severity) -> bool {
        level >= self.min_level
    }

    pub fn sink(&self) -> &SharedSink {
        &self.sink
    }

    pub fn set_sink(&mut self, sink: SharedSink) {
        self.sink = sink;
    }

    pub fn time_format(&self) -> &TimeFormat {
        &self.time_format
    }

    pub fn set_time_format(&mut self, time_format: TimeFormat) {
        self.time_format = time_format;
    }

    pub fn hook(&self) -> Option<&Hook> {
        self.hook.as_ref()
    }

    pub fn set_hook(&mut self, hook: Option<Hook>) {
        self.hook = hook;
    }

    pub fn exit_action(&self) -> &SharedExitAction {
        &self.exit_action
    }

    pub fn set_exit_action(&mut self, exit_action: SharedExitAction) {
        self.exit_action = exit_action;
    }

    /// Pre-encoded fields written after `msg` in every document.
    pub fn context_bytes(&self) -> &[u8] {
        &self.context
    }

    /// Same configuration, with `fields` appended to a copy of the context bytes.
    pub fn with_fields(&self, fields: &[Field<'_>]) -> Self {
        let mut context = Vec::with_capacity(self.context.len());
        context.extend_from_slice(&self.context);
        write_fields(&mut context, fields);
        self.with_context(context)
    }

    /// Same configuration, with the context bytes replaced.
    pub(crate) fn with_context(&self, context: Vec<u8>) -> Self {
        Self {
            context: Arc::from(context),
            ..self.clone()
        }
    }

    pub fn trace(&self, tag: &str, message: &str, fields: &[Field<'_>]) {
        self.emit(tag, Severity::Trace, message, fields);
    }

    pub fn info(&self, tag: &str, message: &str, fields: &[Field<'_>]) {
        self.emit(tag, Severity::Info, message, fields);
    }

    pub fn warn(&self, tag: &str, message: &str, fields: &[Field<'_>]) {
        self.emit(tag, Severity::Warn, message, fields);
    }

    pub fn error(&self, tag: &str, message: &str, fields: &[Field<'_>]) {
        self.emit(tag, Severity::Error, message, fields);
    }

    /// Emits at `Fatal`, then runs the exit action.
    pub fn fatal(&self, tag: &str, message: &str, fields: &[Field<'_>]) {
        self.emit(tag, Severity::Fatal, message, fields);
        self.exit_action.exit(FATAL_EXIT_CODE);
    }

    /// Formats and writes a document to the sink.
    ///
    /// Nothing happens below the minimum level. Sink errors are dropped: logging never fails
    /// from the caller's point of view.
    pub fn emit(&self, tag: &str, level: Severity, message: &str, fields: &[Field<'_>]) {
        if !self.is_enabled(level) {
            return;
        }
        self.emit_document(
            tag,
            level,
            |buf| write_json_str(buf, message),
            |buf| write_fields(buf, fields),
        );
    }

    /// Like [`Emitter::emit`] with a message formatted straight into the document.
    pub fn emit_fmt(
        &self,
        tag: &str,
        level: Severity,
        args: fmt::Arguments<'_>,
        fields: &[Field<'_>],
    ) {
        if !self.is_enabled(level) {
            return;
        }
        self.emit_document(
            tag,
            level,
            |buf| write_json_fmt(buf, args),
            |buf| write_fields(buf, fields),
        );
    }

    /// Like [`Emitter::emit`] with a flat `key, value, ...` list. A trailing key is dropped.
    pub fn emit_pairs(&self, tag: &str, level: Severity, message: &str, values: &[Value<'_>]) {
        if !self.is_enabled(level) {
            return;
        }
        self.emit_document(
            tag,
            level,
            |buf| write_json_str(buf, message),
            |buf| write_flat_fields(buf, values),
        );
    }

    fn emit_document(
        &self,
        tag: &str,
        level: Severity,
        write_message: impl FnOnce(&mut Vec<u8>),
        write_call_fields: impl FnOnce(&mut Vec<u8>),
    ) {
        // returned to the pool on every exit path, unwinding included
        let mut lease = BufferPool::global().acquire(self.context.len() + DOCUMENT_OVERHEAD);
        let buf: &mut Vec<u8> = &mut lease;

        buf.push(b'{');
        if self.time_format.is_enabled() {
            buf.extend_from_slice(b"\"time\":\"");
            self.time_format.write_now(buf);
            buf.extend_from_slice(b"\",");
        }
        buf.extend_from_slice(b"\"tag\":\"");
        buf.extend_from_slice(tag.as_bytes());
        buf.extend_from_slice(b"\",\"level\":\"");
        buf.extend_from_slice(level.as_str().as_bytes());
        buf.extend_from_slice(b"\",\"msg\":");
        write_message(&mut *buf);
        buf.extend_from_slice(&self.context);
        write_call_fields(&mut *buf);
        buf.extend_from_slice(b"}\n");

        if let Some(hook) = &self.hook {
            hook(level, buf.as_slice());
        }
        let _ = self.sink.write_document(buf);
    }
}

/// Builds an [`Emitter`], validating the time format.
#[derive(Default)]
pub struct EmitterBuilder {
    min_level: Severity,
    sink: Option<SharedSink>,
    time_format: String,
    hook: Option<Hook>,
    exit_action: Option<SharedExitAction>,
}

impl EmitterBuilder {
    #[must_use]
    pub fn with_min_level(mut self, level: Severity) -> Self {
        self.min_level = level;
        self
    }

    #[must_use]
    pub fn with_sink<S>(mut self, sink: S) -> Self
    where
        S: Sink + 'static,
    {
        self.sink = Some(Arc::new(sink));
        self
    }

    #[must_use]
    pub fn with_shared_sink(mut self, sink: SharedSink) -> Self {
        self.sink = Some(sink);
        self
    }

    /// strftime format, empty to leave the `time` field out.
    #[must_use]
    pub fn with_time_format(mut self, time_format: impl Into<String>) -> Self {
        self.time_format = time_format.into();
        self
    }

    #[must_use]
    pub fn with_hook<F>(mut self, hook: F) -> Self
    where
        F: Fn(Severity, &[u8]) + Send + Sync + 'static,
    {
        self.hook = Some(Arc::new(hook));
        self
    }

    #[must_use]
    pub fn with_shared_hook(mut self, hook: Option<Hook>) -> Self {
        self.hook = hook;
        self
    }

    #[must_use]
    pub fn with_exit_action(mut self, exit_action: SharedExitAction) -> Self {
        self.exit_action = Some(exit_action);
        self
    }

    pub fn build(self) -> Result<Emitter> {
        let defaults = Emitter::default();
        Ok(Emitter {
            min_level: self.min_level,
            sink: self.sink.unwrap_or(defaults.sink),
            time_format: TimeFormat::new(&self.time_format)?,
            hook: self.hook,
            exit_action: self.exit_action.unwrap_or(defaults.exit_action),
            context: defaults.context,
        })
    }
}
