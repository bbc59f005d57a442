//! Shared helpers for integration tests

#![allow(dead_code)]

use parking_lot::Mutex;
use rust_gelf_appender::prelude::*;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// In-memory transport recording every call it receives
#[derive(Default)]
pub struct RecordingTransport {
    sent: Mutex<Vec<GelfMessage>>,
    tried: Mutex<Vec<GelfMessage>>,
    accept_try_send: AtomicBool,
    fail_send: AtomicBool,
    flushes: AtomicUsize,
    stopped: AtomicBool,
}

impl RecordingTransport {
    /// Transport whose `try_send` accepts every message
    pub fn new() -> Arc<Self> {
        let transport = Self::default();
        transport.accept_try_send.store(true, Ordering::SeqCst);
        Arc::new(transport)
    }

    /// Transport whose `try_send` always reports a full queue
    pub fn rejecting() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Transport whose `send` always fails
    pub fn failing() -> Arc<Self> {
        let transport = Self::default();
        transport.fail_send.store(true, Ordering::SeqCst);
        Arc::new(transport)
    }

    pub fn sent(&self) -> Vec<GelfMessage> {
        self.sent.lock().clone()
    }

    pub fn tried(&self) -> Vec<GelfMessage> {
        self.tried.lock().clone()
    }

    pub fn flush_count(&self) -> usize {
        self.flushes.load(Ordering::SeqCst)
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }
}

impl GelfTransport for RecordingTransport {
    fn send(&self, message: GelfMessage) -> Result<()> {
        if self.fail_send.load(Ordering::SeqCst) {
            return Err(GelfError::TransportClosed);
        }
        self.sent.lock().push(message);
        Ok(())
    }

    fn try_send(&self, message: GelfMessage) -> bool {
        self.tried.lock().push(message);
        self.accept_try_send.load(Ordering::SeqCst)
    }

    fn flush(&self, _timeout: Duration) -> Result<()> {
        self.flushes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn stop(&self) {
        self.stopped.store(true, Ordering::SeqCst);
    }
}

/// Appender builder with a fixed host and the given transport
pub fn appender_builder(transport: &Arc<RecordingTransport>) -> GelfAppenderBuilder {
    GelfAppender::builder("appender")
        .host("host")
        .transport(Arc::clone(transport) as Arc<dyn GelfTransport>)
}

/// Logger named "test" with a single appender
pub fn logger_with(appender: GelfAppender) -> Logger {
    let mut logger = Logger::new("test");
    logger.add_appender(Box::new(appender));
    logger
}
