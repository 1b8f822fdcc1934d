//! What happens after a fatal document has been written
use std::sync::{
    Arc,
    atomic::{AtomicI32, AtomicUsize, Ordering},
};

/// Status requested by fatal emissions.
pub const FATAL_EXIT_CODE: i32 = 1;

pub type SharedExitAction = Arc<dyn ExitAction>;

/// Called exactly once per fatal emission, after the sink received the document.
pub trait ExitAction: Send + Sync {
    fn exit(&self, code: i32);
}

/// Terminates the process.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessExit;

impl ExitAction for ProcessExit {
    fn exit(&self, code: i32) {
        std::process::exit(code);
    }
}

/// Records the requested status instead of exiting, for tests and diagnostics.
#[derive(Debug, Default)]
pub struct RecordingExit {
    last_code: AtomicI32,
    calls: AtomicUsize,
}

impl RecordingExit {
    pub fn new() -> Self {
        Self::default()
    }

    /// Status of the last request, 0 when nothing was requested.
    pub fn last_code(&self) -> i32 {
        self.last_code.load(Ordering::SeqCst)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ExitAction for RecordingExit {
    fn exit(&self, code: i32) {
        self.last_code.store(code, Ordering::SeqCst);
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}
