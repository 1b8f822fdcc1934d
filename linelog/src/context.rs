//! Emitters with pre-bound fields
//!
//! The common use case is
//!
//! ```
//! use linelog::{context::Context, fields};
//!
//! let logger = Context::new("TAG", &fields!["one" => 1, "two" => 2]);
//! logger.info("start", &[]);
//! logger.info("stop", &[]);
//! ```
//!
//! which writes something like
//!
//! ```text
//! {"tag":"TAG","level":"info","msg":"start","one":1,"two":2}
//! {"tag":"TAG","level":"info","msg":"stop","one":1,"two":2}
//! ```
use crate::{
    current::current,
    emitter::Emitter,
    encoder::{Field, write_fields},
    levels::Severity,
};
use std::fmt;

/// A tag and an emitter whose context bytes hold the bound fields.
///
/// The emitter is a snapshot: changing the configuration of the emitter a context was derived
/// from has no effect on the context, and the other way around.
#[derive(Clone, Debug)]
pub struct Context {
    tag: String,
    emitter: Emitter,
}

impl Context {
    /// Binds `fields` to a snapshot of the current logger.
    pub fn new(tag: impl Into<String>, fields: &[Field<'_>]) -> Self {
        Self::with_emitter(&current(), tag, fields)
    }

    /// Binds `fields` to a snapshot of `emitter`'s configuration.
    ///
    /// Only `fields` end up in the context bytes, whatever `emitter` already had bound.
    pub fn with_emitter(emitter: &Emitter, tag: impl Into<String>, fields: &[Field<'_>]) -> Self {
        let mut context = Vec::new();
        write_fields(&mut context, fields);
        Self {
            tag: tag.into(),
            emitter: emitter.with_context(context),
        }
    }

    /// Derives a context with the same tag, the parent's fields and then `fields`.
    pub fn child(&self, fields: &[Field<'_>]) -> Self {
        Self {
            tag: self.tag.clone(),
            emitter: self.emitter.with_fields(fields),
        }
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn emitter(&self) -> &Emitter {
        &self.emitter
    }

    pub fn emitter_mut(&mut self) -> &mut Emitter {
        &mut self.emitter
    }

    pub fn emit(&self, level: Severity, message: &str, fields: &[Field<'_>]) {
        self.emitter.emit(&self.tag, level, message, fields);
    }

    pub fn emit_fmt(&self, level: Severity, args: fmt::Arguments<'_>, fields: &[Field<'_>]) {
        self.emitter.emit_fmt(&self.tag, level, args, fields);
    }

    pub fn trace(&self, message: &str, fields: &[Field<'_>]) {
        self.emitter.trace(&self.tag, message, fields);
    }

    pub fn info(&self, message: &str, fields: &[Field<'_>]) {
        self.emitter.info(&self.tag, message, fields);
    }

    pub fn warn(&self, message: &str, fields: &[Field<'_>]) {
        self.emitter.warn(&self.tag, message, fields);
    }

    pub fn error(&self, message: &str, fields: &[Field<'_>]) {
        self.emitter.error(&self.tag, message, fields);
    }

    /// Emits at `Fatal`, then runs the emitter's exit action.
    pub fn fatal(&self, message: &str, fields: &[Field<'_>]) {
        self.emitter.fatal(&self.tag, message, fields);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{exit::RecordingExit, fields, test_utils::InMemorySink, time::TimeFormat};
    use std::sync::Arc;

    fn memory_root(tag: &str, fields: &[Field<'_>]) -> (Context, Arc<InMemorySink>) {
        let sink = Arc::new(InMemorySink::new());
        let emitter = Emitter::new(sink.clone(), TimeFormat::none());
        (Context::with_emitter(&emitter, tag, fields), sink)
    }

    #[test]
    fn test_bound_fields_follow_message() {
        let (ctx, sink) = memory_root("TAG", &fields!["one" => 1, "two" => 2]);
        ctx.info("start", &[]);
        ctx.warn("stop", &fields!["three" => 3]);
        assert_eq!(
            sink.lines(),
            vec![
                r#"{"tag":"TAG","level":"info","msg":"start","one":1,"two":2}"#,
                r#"{"tag":"TAG","level":"warn","msg":"stop","one":1,"two":2,"three":3}"#,
            ]
        );
    }

    #[test]
    fn test_child_order_parent_then_child_then_call_site() {
        let (ctx, sink) = memory_root("tag", &fields!["a" => 1]);
        ctx.child(&fields!["b" => 2]).info("m", &fields!["c" => 3]);
        assert_eq!(
            sink.lines(),
            vec![r#"{"tag":"tag","level":"info","msg":"m","a":1,"b":2,"c":3}"#]
        );
    }

    #[test]
    fn test_chain_is_concatenation_of_steps() {
        let (root, _sink) = memory_root("tag", &fields!["a" => 1]);
        let left = root.child(&fields!["b" => "x"]);
        // siblings derived from the same parent do not leak into each other
        let _right = root.child(&fields!["z" => 26]);
        let deep = left.child(&fields!["c" => true]).child(&[]);
        let _right_again = root.child(&fields!["y" => 25]);

        assert_eq!(root.emitter().context_bytes(), br#","a":1"#);
        assert_eq!(left.emitter().context_bytes(), br#","a":1,"b":"x""#);
        assert_eq!(
            deep.emitter().context_bytes(),
            br#","a":1,"b":"x","c":true"#
        );
        assert_eq!(deep.tag(), "tag");
    }

    #[test]
    fn test_root_ignores_emitter_context() {
        let sink = Arc::new(InMemorySink::new());
        let emitter =
            Emitter::new(sink.clone(), TimeFormat::none()).with_fields(&fields!["old" => 0]);
        let ctx = Context::with_emitter(&emitter, "fresh", &fields!["new" => 1]);
        assert_eq!(ctx.emitter().context_bytes(), br#","new":1"#);
    }

    #[test]
    fn test_child_configuration_is_a_snapshot() {
        let (mut parent, sink) = memory_root("svc", &[]);
        let child = parent.child(&fields!["k" => "v"]);
        parent.emitter_mut().set_min_level(Severity::Fatal);

        parent.warn("parent suppressed", &[]);
        child.warn("child still emits", &[]);
        assert_eq!(sink.len(), 1);
        assert_eq!(child.emitter().min_level(), Severity::Info);

        let mut later = parent.child(&[]);
        assert_eq!(later.emitter().min_level(), Severity::Fatal);
        later.emitter_mut().set_min_level(Severity::Trace);
        assert_eq!(parent.emitter().min_level(), Severity::Fatal);
    }

    #[test]
    fn test_parent_unaffected_by_child() {
        let (parent, sink) = memory_root("svc", &fields!["p" => 1]);
        let _child = parent.child(&fields!["c" => 2]);
        parent.info("m", &[]);
        assert_eq!(
            sink.lines(),
            vec![r#"{"tag":"svc","level":"info","msg":"m","p":1}"#]
        );
    }

    #[test]
    fn test_context_fatal_uses_exit_action() {
        let (mut ctx, sink) = memory_root("svc", &[]);
        let exit = Arc::new(RecordingExit::new());
        ctx.emitter_mut().set_exit_action(exit.clone());
        let child = ctx.child(&fields!["stage" => "shutdown"]);
        child.fatal("unrecoverable", &[]);
        assert_eq!(exit.calls(), 1);
        assert_eq!(exit.last_code(), 1);
        assert_eq!(
            sink.lines(),
            vec![r#"{"tag":"svc","level":"fatal","msg":"unrecoverable","stage":"shutdown"}"#]
        );
    }

    #[test]
    fn test_context_emit_fmt() {
        let (ctx, sink) = memory_root("svc", &fields!["id" => 9]);
        ctx.emit_fmt(Severity::Error, format_args!("failed {} times", 3), &[]);
        assert_eq!(
            sink.lines(),
            vec![r#"{"tag":"svc","level":"error","msg":"failed 3 times","id":9}"#]
        );
    }
}
