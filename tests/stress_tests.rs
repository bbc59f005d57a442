//! Stress tests for concurrent logging
//!
//! These tests verify:
//! - A shared appender and transport stay consistent under many threads
//! - Thread context never leaks between concurrently logging threads
//! - Non-blocking hand-over to a small queue drops instead of blocking
//! - Blocking hand-over delivers every message through a real client

mod common;

use common::{appender_builder, RecordingTransport};
use rust_gelf_appender::prelude::*;
use rust_gelf_appender::transport::{Compression, GelfClient, GelfConfiguration, GelfProtocol};
use std::io::{BufRead, BufReader};
use std::net::{TcpListener, UdpSocket};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

const THREADS: usize = 8;
const PER_THREAD: usize = 250;

/// Counts the outcome of every hand-over before passing it to the client
struct CountingTransport {
    client: Arc<GelfClient>,
    accepted: AtomicU64,
    rejected: AtomicU64,
}

impl GelfTransport for CountingTransport {
    fn send(&self, message: GelfMessage) -> Result<()> {
        self.client.send(message)
    }

    fn try_send(&self, message: GelfMessage) -> bool {
        let accepted = self.client.try_send(message);
        let counter = if accepted { &self.accepted } else { &self.rejected };
        counter.fetch_add(1, Ordering::Relaxed);
        accepted
    }

    fn flush(&self, timeout: Duration) -> Result<()> {
        self.client.flush(timeout)
    }

    fn stop(&self) {
        self.client.stop();
    }
}

#[test]
fn test_concurrent_logging_keeps_context_per_thread() {
    let transport = RecordingTransport::new();
    let mut logger = Logger::new("stress");
    logger.add_appender(Box::new(appender_builder(&transport).build().unwrap()));
    let logger = Arc::new(logger);

    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let logger = Arc::clone(&logger);
            thread::spawn(move || {
                ThreadContext::put("worker", t as i64);
                for i in 0..PER_THREAD {
                    logger.info(format!("worker {} message {}", t, i));
                }
                ThreadContext::clear_all();
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    let sent = transport.sent();
    assert_eq!(sent.len(), THREADS * PER_THREAD);
    for message in &sent {
        let worker = match message.additional_field("worker") {
            Some(FieldValue::Int(worker)) => *worker,
            other => panic!("missing worker field: {:?}", other),
        };
        assert!(message
            .short_message()
            .starts_with(&format!("worker {} ", worker)));
    }
    assert_eq!(logger.metrics().total_logged(), (THREADS * PER_THREAD) as u64);
}

#[test]
fn test_try_send_on_small_queue_never_blocks() {
    // Nobody reads this socket; the worker still drains as fast as it can write
    let sink = UdpSocket::bind("127.0.0.1:0").unwrap();
    let port = sink.local_addr().unwrap().port();
    let config = GelfConfiguration::new("127.0.0.1", port)
        .with_compression(Compression::None)
        .with_queue_size(4);
    let client = Arc::new(GelfClient::new(&config).unwrap());
    let counting = Arc::new(CountingTransport {
        client: Arc::clone(&client),
        accepted: AtomicU64::new(0),
        rejected: AtomicU64::new(0),
    });

    let mut appender = appender_builder(&RecordingTransport::new())
        .blocking(false)
        .build()
        .unwrap();
    appender.set_transport(Arc::clone(&counting) as Arc<dyn GelfTransport>);
    let mut logger = Logger::new("stress");
    logger.add_appender(Box::new(appender));
    let logger = Arc::new(logger);

    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let logger = Arc::clone(&logger);
            thread::spawn(move || {
                for i in 0..PER_THREAD {
                    logger.info(format!("burst {} {}", t, i));
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    client.flush(Duration::from_secs(5)).unwrap();
    let accepted = counting.accepted.load(Ordering::Relaxed);
    let rejected = counting.rejected.load(Ordering::Relaxed);
    assert_eq!(accepted + rejected, (THREADS * PER_THREAD) as u64);
    // Everything the queue took was written or counted as failed, nothing more
    assert_eq!(client.metrics().sent() + client.metrics().failed(), accepted);
    assert_eq!(logger.dropped_count(), 0);
    client.stop();
    assert!(client.is_stopped());
}

#[test]
fn test_blocking_tcp_delivers_everything() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();

    let reader = thread::spawn(move || {
        let (stream, _) = listener.accept().unwrap();
        stream.set_read_timeout(Some(Duration::from_secs(10))).unwrap();
        let mut reader = BufReader::new(stream);
        let mut count = 0;
        let mut frame = Vec::new();
        while count < THREADS * PER_THREAD {
            frame.clear();
            if reader.read_until(0, &mut frame).unwrap() == 0 {
                break;
            }
            count += 1;
        }
        count
    });

    let config = GelfConfiguration::new("127.0.0.1", port)
        .with_protocol(GelfProtocol::Tcp)
        .with_queue_size(16);
    let appender = GelfAppender::builder("tcp")
        .host("host")
        .server(config)
        .build()
        .unwrap();
    let mut logger = Logger::new("stress");
    logger.add_appender(Box::new(appender));
    let logger = Arc::new(logger);

    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let logger = Arc::clone(&logger);
            thread::spawn(move || {
                for i in 0..PER_THREAD {
                    logger.warn(format!("tcp {} {}", t, i));
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }
    logger.flush().unwrap();

    assert_eq!(reader.join().unwrap(), THREADS * PER_THREAD);
}
