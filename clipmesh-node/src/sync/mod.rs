mod clipboard;
mod engine;

pub use clipboard::{Clipboard, MemoryClipboard};
pub use engine::{SyncEngine, DEFAULT_POLL_INTERVAL};
