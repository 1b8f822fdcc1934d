//! Structured logging to single-line JSON documents
//!
//! Each call turns a tag, a severity, a message and a list of fields into one JSON object
//! terminated by a newline, handed to a sink in a single write. Documents always start with the
//! same keys, in the same order:
//!
//! ```text
//! {"time":"...","tag":"svc","level":"warn","msg":"retrying","attempt":3}
//! ```
//!
//! `time` is only present when a time format is configured. Fields bound to a [`context::Context`]
//! come after `msg`, before the fields passed at the call site.
//!
//! Emission is synchronous and allocation-light: documents are assembled in buffers leased from a
//! process-wide pool, fields bound to a context are encoded once when the context is created.
//!
//! # Examples
//! ```
//! use linelog::{context::Context, emitter::Emitter, fields, levels::Severity, sink::StdoutSink};
//!
//! let emitter = Emitter::builder()
//!     .with_min_level(Severity::Trace)
//!     .with_sink(StdoutSink)
//!     .with_time_format(linelog::time::RFC3339)
//!     .build()
//!     .expect("valid configuration");
//!
//! emitter.warn("svc", "retrying", &fields!["attempt" => 3]);
//!
//! let request = Context::with_emitter(&emitter, "http", &fields!["request_id" => "a1b2"]);
//! request.info("accepted", &[]);
//! request.child(&fields!["user" => 42]).trace("authorized", &[]);
//! ```
//!

// crate-specific lint exceptions:
#![allow(clippy::missing_errors_doc, clippy::inline_always)]

pub mod buffer_pool;
pub mod context;
pub mod current;
pub mod emitter;
pub mod encoder;
pub mod errors;
pub mod exit;
pub mod levels;
pub mod sink;
pub mod test_utils;
pub mod time;

#[macro_use]
extern crate lazy_static;

pub mod prelude {
    pub use crate::context::Context;
    pub use crate::emitter::{Emitter, Hook};
    pub use crate::encoder::{Field, Value};
    pub use crate::fields;
    pub use crate::levels::Severity;
    pub use crate::sink::{SharedSink, Sink};
    pub use crate::time::TimeFormat;
}
