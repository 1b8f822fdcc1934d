use crate::{
    current::{current, replace_current},
    emitter::Emitter,
    exit::RecordingExit,
    levels::Severity,
    sink::Sink,
    time::TimeFormat,
};
use std::{
    io,
    sync::{Arc, Mutex, PoisonError},
};

/// Sink keeping every document, for tests that inspect the output
#[derive(Debug, Default)]
pub struct InMemorySink {
    documents: Mutex<Vec<Vec<u8>>>,
}

impl InMemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_documents<R>(&self, f: impl FnOnce(&mut Vec<Vec<u8>>) -> R) -> R {
        let mut documents = self.documents.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut *documents)
    }

    pub fn len(&self) -> usize {
        self.with_documents(|documents| documents.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Raw documents, trailing newline included.
    pub fn documents(&self) -> Vec<Vec<u8>> {
        self.with_documents(|documents| documents.clone())
    }

    /// Documents as text, without the trailing newline.
    pub fn lines(&self) -> Vec<String> {
        self.with_documents(|documents| {
            documents
                .iter()
                .map(|document| {
                    let document = document.strip_suffix(b"\n").unwrap_or(document);
                    String::from_utf8_lossy(document).into_owned()
                })
                .collect()
        })
    }

    /// Everything written so far, as it would appear in a file.
    pub fn contents(&self) -> String {
        self.with_documents(|documents| String::from_utf8_lossy(&documents.concat()).into_owned())
    }

    pub fn clear(&self) {
        self.with_documents(Vec::clear);
    }
}

impl Sink for InMemorySink {
    fn write_document(&self, document: &[u8]) -> io::Result<()> {
        self.with_documents(|documents| documents.push(document.to_vec()));
        Ok(())
    }
}

/// RAII guard for test mode
///
/// While alive, the current logger writes every level to an in-memory sink and fatal
/// emissions record their exit status instead of terminating the process. The hook of the
/// previous logger is kept. The previous logger is restored on drop.
///
/// # Important
/// Tests using this guard MUST be marked with #[serial] since they share the current logger.
pub struct TestModeGuard {
    sink: Arc<InMemorySink>,
    exit: Arc<RecordingExit>,
    previous: Option<Arc<Emitter>>,
}

impl TestModeGuard {
    pub fn new() -> Self {
        let sink = Arc::new(InMemorySink::new());
        let exit = Arc::new(RecordingExit::new());
        let mut emitter = Emitter::new(sink.clone(), TimeFormat::none());
        emitter.set_min_level(Severity::Trace);
        emitter.set_hook(current().hook().cloned());
        emitter.set_exit_action(exit.clone());
        let previous = replace_current(Arc::new(emitter));
        Self {
            sink,
            exit,
            previous: Some(previous),
        }
    }

    pub fn sink(&self) -> &Arc<InMemorySink> {
        &self.sink
    }

    pub fn exit(&self) -> &Arc<RecordingExit> {
        &self.exit
    }

    /// Status requested by the last fatal emission, 0 if there was none.
    pub fn last_exit_code(&self) -> i32 {
        self.exit.last_code()
    }
}

impl Default for TestModeGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for TestModeGuard {
    fn drop(&mut self) {
        if let Some(previous) = self.previous.take() {
            replace_current(previous);
        }
    }
}

/// Switches the current logger to test mode until the guard is dropped
///
/// # Example
/// ```rust
/// use linelog::{current, test_utils::init_test_mode};
///
/// // In your test file, with #[serial]:
/// let guard = init_test_mode();
/// current::fatal("TAG", "cannot continue", &[]);
/// assert_eq!(guard.last_exit_code(), 1);
/// assert_eq!(guard.sink().len(), 1);
/// ```
pub fn init_test_mode() -> TestModeGuard {
    TestModeGuard::new()
}
