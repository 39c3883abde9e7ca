use anyhow::Result;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Local content source and sink. The OS clipboard primitive itself stays
/// outside the core; implementations adapt whatever the platform offers.
pub trait Clipboard: Send + Sync + 'static {
    /// Current text content, `None` when empty.
    fn read(&self) -> Result<Option<String>>;

    fn write(&self, text: &str) -> Result<()>;
}

/// In-memory clipboard for tests and embedding. `set` models the user
/// copying something locally; `write_count` counts only the writes performed
/// through the `Clipboard` trait, i.e. applied remote updates.
#[derive(Default)]
pub struct MemoryClipboard {
    content: Mutex<Option<String>>,
    writes: AtomicUsize,
}

impl MemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, text: &str) {
        *self.content.lock().unwrap() = Some(text.to_string());
    }

    pub fn get(&self) -> Option<String> {
        self.content.lock().unwrap().clone()
    }

    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::Relaxed)
    }
}

impl Clipboard for MemoryClipboard {
    fn read(&self) -> Result<Option<String>> {
        Ok(self.get())
    }

    fn write(&self, text: &str) -> Result<()> {
        self.set(text);
        self.writes.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}
