use parking_lot::Mutex;

/// Where listeners render their lines.
pub trait Sink: Send + Sync {
    fn emit(&self, line: &str);
}

/// Writes every line to standard output.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutSink;

impl Sink for StdoutSink {
    fn emit(&self, line: &str) {
        println!("{}", line);
    }
}

/// Keeps lines in memory, for tests and scripted runs.
#[derive(Debug, Default)]
pub struct MemorySink {
    lines: Mutex<Vec<String>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().clone()
    }

    /// Return and clear the collected lines.
    pub fn take(&self) -> Vec<String> {
        std::mem::take(&mut *self.lines.lock())
    }
}

impl Sink for MemorySink {
    fn emit(&self, line: &str) {
        self.lines.lock().push(line.to_string());
    }
}
