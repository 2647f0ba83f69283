//! Log capture for asserting on what the widget and providers logged.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::{
    collections::HashMap,
    io::Write,
    sync::{Arc, Mutex},
};
use tracing::Level;
use tracing_subscriber::fmt::MakeWriter;

/// Buffers the JSON lines written by the test subscriber and parses them
/// on demand.
#[derive(Default)]
pub struct LogWatcher {
    /// Raw bytes received from Tracing: newline separated JSON objects, the
    /// last of which may be incomplete.
    buf: Arc<Mutex<Vec<u8>>>,

    /// Events parsed out of [`buf`](Self::buf) so far.
    events: Vec<TracingJsonEvent>,
}

impl LogWatcher {
    /// Every complete event logged up to now.
    pub fn events(&mut self) -> std::slice::Iter<TracingJsonEvent> {
        self.convert_events();
        self.events.iter()
    }

    /// Whether some logged event satisfies `predicate`.
    #[must_use = "wrap LogWatcher::has in assert!()"]
    pub fn has<F>(&mut self, predicate: F) -> bool
    where
        F: FnMut(&TracingJsonEvent) -> bool,
    {
        self.events().any(predicate)
    }

    /// Move every complete line of `buf` into `events`.
    fn convert_events(&mut self) {
        let mut buf = self.buf.lock().expect("mutex was poisoned");
        let complete = match buf.iter().rposition(|b| *b == b'\n') {
            Some(idx) => idx + 1,
            None => return,
        };
        let rest = buf.split_off(complete);
        let text = String::from_utf8(std::mem::replace(&mut *buf, rest)).expect("bad utf8");

        for line in text.lines().filter(|line| !line.trim().is_empty()) {
            let event: TracingJsonEvent = serde_json::from_str(line)
                .unwrap_or_else(|_| panic!("Bad JSON in log line: {}", line));
            self.events.push(event);
        }
    }
}

impl MakeWriter for LogWatcher {
    type Writer = LogWatcherWriter;

    fn make_writer(&self) -> Self::Writer {
        LogWatcherWriter {
            buf: Arc::clone(&self.buf),
        }
    }
}

/// Writer side of a [`LogWatcher`], shared with the subscriber.
#[derive(Clone)]
pub struct LogWatcherWriter {
    /// Shared with the owning watcher.
    buf: Arc<Mutex<Vec<u8>>>,
}

impl Write for LogWatcherWriter {
    fn write(&mut self, new_bytes: &[u8]) -> std::io::Result<usize> {
        let mut buf = self
            .buf
            .lock()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))?;
        buf.extend_from_slice(new_bytes);
        Ok(new_bytes.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

/// A parsed line of JSON log output.
#[derive(Debug, Deserialize, Serialize)]
pub struct TracingJsonEvent {
    /// Event fields, `message` included.
    pub fields: HashMap<String, Value>,
    /// Severity.
    #[serde(with = "serde_with::rust::display_fromstr")]
    pub level: Level,
    /// Module path the event came from.
    pub target: String,
    /// When it was logged.
    pub timestamp: String,
}

impl TracingJsonEvent {
    /// Whether the string field `field_name` contains `pat`.
    pub fn field_contains(&self, field_name: &str, pat: &str) -> bool {
        self.fields
            .get(field_name)
            .and_then(Value::as_str)
            .map_or(false, |value| value.contains(pat))
    }
}
