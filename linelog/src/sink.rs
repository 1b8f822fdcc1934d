//! Destinations for emitted documents
use std::{
    fmt,
    io::{self, Write},
    sync::{Arc, Mutex, PoisonError},
};

pub type SharedSink = Arc<dyn Sink>;

/// Interface needed by the emitter to hand out a finished document.
///
/// Each call receives one complete document, newline included, and should write it as a single
/// contiguous write. Errors are reported back but the emitter drops them.
pub trait Sink: Send + Sync {
    fn write_document(&self, document: &[u8]) -> io::Result<()>;
}

/// Default destination.
#[derive(Debug, Default, Clone, Copy)]
pub struct StderrSink;

impl Sink for StderrSink {
    fn write_document(&self, document: &[u8]) -> io::Result<()> {
        io::stderr().lock().write_all(document)
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutSink;

impl Sink for StdoutSink {
    fn write_document(&self, document: &[u8]) -> io::Result<()> {
        io::stdout().lock().write_all(document)
    }
}

/// For cases where the documents can be dropped, hooks still see them.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl Sink for NullSink {
    fn write_document(&self, _document: &[u8]) -> io::Result<()> {
        Ok(())
    }
}

/// Adapts any `io::Write` (file, socket, `Vec<u8>`) into a sink.
pub struct WriterSink<W> {
    writer: Mutex<W>,
}

impl<W: Write + Send> WriterSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    pub fn into_inner(self) -> W {
        self.writer
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl<W: Write + Send> Sink for WriterSink<W> {
    fn write_document(&self, document: &[u8]) -> io::Result<()> {
        self.writer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .write_all(document)
    }
}

impl<W> fmt::Debug for WriterSink<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WriterSink").finish_non_exhaustive()
    }
}
