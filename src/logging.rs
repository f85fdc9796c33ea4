//! In-process log capture on top of the `log` facade.
//!
//! Every record is echoed to stdout, kept in a bounded ring buffer for
//! `/api/logs`, and broadcast to live `/api/logs/stream` subscribers.

use crate::constants::LOG_BUFFER_SIZE;
use log::{LevelFilter, Metadata, Record, SetLoggerError};
use once_cell::sync::OnceCell;
use std::collections::VecDeque;
use std::sync::Mutex;
use tokio::sync::broadcast;

pub struct WebLogger {
    buffer: Mutex<VecDeque<String>>,
    sender: broadcast::Sender<String>,
}

impl WebLogger {
    fn new() -> Self {
        let (sender, _) = broadcast::channel(LOG_BUFFER_SIZE);
        Self {
            buffer: Mutex::new(VecDeque::with_capacity(LOG_BUFFER_SIZE)),
            sender,
        }
    }

    fn record(&self, line: String) {
        if let Ok(mut buf) = self.buffer.lock() {
            buf.push_back(line.clone());
            if buf.len() > LOG_BUFFER_SIZE {
                buf.pop_front();
            }
        }
        // no subscribers is fine
        let _ = self.sender.send(line);
    }
}

static LOGGER: OnceCell<WebLogger> = OnceCell::new();

impl log::Log for WebLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let msg = format!(
                "{} {} [{}] {}",
                chrono::Utc::now().format("%Y-%m-%dT%H:%M:%S%.3fZ"),
                record.level(),
                record.target(),
                record.args()
            );
            println!("{}", msg);
            self.record(msg);
        }
    }

    fn flush(&self) {}
}

/// Install the logger at the given level (`"info"`, `"debug"`, ...).
///
/// Unknown levels fall back to `info`. Fails if another logger is already
/// installed; the level is applied regardless.
pub fn init(level: &str) -> Result<(), SetLoggerError> {
    let filter = level.parse::<LevelFilter>().unwrap_or(LevelFilter::Info);
    log::set_max_level(filter);
    let logger = LOGGER.get_or_init(WebLogger::new);
    log::set_logger(logger)
}

pub fn get_logs() -> Vec<String> {
    LOGGER
        .get()
        .and_then(|l| l.buffer.lock().ok().map(|buf| buf.iter().cloned().collect()))
        .unwrap_or_default()
}

pub fn subscribe() -> Option<broadcast::Receiver<String>> {
    LOGGER.get().map(|l| l.sender.subscribe())
}
