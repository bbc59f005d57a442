//! Queue-backed GELF client
//!
//! Callers hand messages to a bounded queue; a single worker thread encodes
//! them and writes them to the collector. Blocking `send` waits for queue
//! space, `try_send` gives up immediately, and `flush` waits for the worker
//! to acknowledge everything queued before it.

use super::codec::GelfEncoder;
use super::config::{GelfConfiguration, GelfProtocol};
use super::FrameSink;
use crate::core::{status, DeliveryMetrics, GelfError, GelfMessage, GelfTransport, Result};
use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, SendTimeoutError, Sender};
use parking_lot::{Mutex, RwLock};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

enum Command {
    Message(GelfMessage),
    Flush(Sender<()>),
}

/// GELF client delivering over UDP or TCP from a background worker
///
/// # Example
///
/// ```no_run
/// use rust_gelf_appender::core::{GelfMessage, GelfTransport};
/// use rust_gelf_appender::transport::{GelfClient, GelfConfiguration, GelfProtocol};
/// use std::time::Duration;
///
/// let config = GelfConfiguration::new("graylog.internal", 12201)
///     .with_protocol(GelfProtocol::Tcp);
/// let client = GelfClient::new(&config)?;
///
/// client.send(GelfMessage::builder("Hello World", "app-01").build()?)?;
/// client.flush(Duration::from_secs(1))?;
/// client.stop();
/// # Ok::<(), rust_gelf_appender::GelfError>(())
/// ```
pub struct GelfClient {
    sender: RwLock<Option<Sender<Command>>>,
    worker: Mutex<Option<thread::JoinHandle<()>>>,
    metrics: Arc<DeliveryMetrics>,
}

impl GelfClient {
    /// Open a client for `config`. TCP connections are established lazily.
    pub fn new(config: &GelfConfiguration) -> Result<Self> {
        config.validate()?;

        let (sink, encoder): (Box<dyn FrameSink>, GelfEncoder) = match config.protocol {
            #[cfg(feature = "udp")]
            GelfProtocol::Udp => (
                Box::new(super::udp::UdpSink::connect(config)?) as Box<dyn FrameSink>,
                GelfEncoder::for_udp(config.compression),
            ),
            #[cfg(feature = "tcp")]
            GelfProtocol::Tcp => (
                Box::new(super::tcp::TcpSink::new(config)) as Box<dyn FrameSink>,
                GelfEncoder::for_tcp(),
            ),
            #[allow(unreachable_patterns)]
            other => {
                return Err(GelfError::config(
                    "GelfClient",
                    format!("{:?} support is not compiled in", other),
                ))
            }
        };

        Ok(Self::with_sink(sink, encoder, config.queue_size))
    }

    pub(crate) fn with_sink(sink: Box<dyn FrameSink>, encoder: GelfEncoder, queue_size: usize) -> Self {
        let (sender, receiver) = bounded(queue_size);
        let metrics = Arc::new(DeliveryMetrics::new());
        let metrics_clone = Arc::clone(&metrics);

        let handle = thread::Builder::new()
            .name("gelf-client".to_string())
            .spawn(move || Self::run_worker(receiver, sink, encoder, &metrics_clone));

        let worker = match handle {
            Ok(handle) => Some(handle),
            Err(e) => {
                status::report_error("GelfClient", format!("failed to spawn worker: {}", e));
                None
            }
        };

        Self {
            // Without a worker nothing would drain the queue
            sender: RwLock::new(worker.as_ref().map(|_| sender)),
            worker: Mutex::new(worker),
            metrics,
        }
    }

    fn run_worker(
        receiver: Receiver<Command>,
        mut sink: Box<dyn FrameSink>,
        encoder: GelfEncoder,
        metrics: &DeliveryMetrics,
    ) {
        for command in receiver.iter() {
            match command {
                Command::Message(message) => {
                    Self::deliver(sink.as_mut(), &encoder, &message, metrics);
                }
                Command::Flush(ack) => {
                    if let Err(e) = sink.flush() {
                        status::report_error("GelfClient", format!("flush failed: {}", e));
                    }
                    let _ = ack.send(());
                }
            }
        }

        if let Err(e) = sink.flush() {
            status::report_error("GelfClient", format!("final flush failed: {}", e));
        }
    }

    fn deliver(
        sink: &mut dyn FrameSink,
        encoder: &GelfEncoder,
        message: &GelfMessage,
        metrics: &DeliveryMetrics,
    ) {
        let result = encoder
            .encode(message)
            .and_then(|frame| sink.write_frame(&frame));

        match result {
            Ok(()) => {
                metrics.record_sent();
            }
            Err(e) => {
                let previous = metrics.record_failed();
                if status::should_alert(previous) {
                    status::report_error(
                        "GelfClient",
                        format!("{} messages failed so far, latest: {}", previous + 1, e),
                    );
                }
            }
        }
    }

    fn current_sender(&self) -> Option<Sender<Command>> {
        self.sender.read().clone()
    }

    /// Outcome of writes to the collector
    pub fn metrics(&self) -> &DeliveryMetrics {
        &self.metrics
    }

    /// Messages waiting in the queue
    pub fn pending(&self) -> usize {
        self.sender.read().as_ref().map_or(0, Sender::len)
    }

    pub fn is_stopped(&self) -> bool {
        self.sender.read().is_none()
    }
}

impl GelfTransport for GelfClient {
    fn send(&self, message: GelfMessage) -> Result<()> {
        let sender = self.current_sender().ok_or(GelfError::TransportClosed)?;
        sender
            .send(Command::Message(message))
            .map_err(|_| GelfError::TransportClosed)
    }

    fn try_send(&self, message: GelfMessage) -> bool {
        match self.sender.read().as_ref() {
            Some(sender) => sender.try_send(Command::Message(message)).is_ok(),
            None => false,
        }
    }

    fn flush(&self, timeout: Duration) -> Result<()> {
        let Some(sender) = self.current_sender() else {
            // Stopped clients have already drained
            return Ok(());
        };

        let deadline = Instant::now() + timeout;
        let (ack_tx, ack_rx) = bounded(1);
        match sender.send_timeout(Command::Flush(ack_tx), timeout) {
            Ok(()) => {}
            Err(SendTimeoutError::Timeout(_)) => return Err(GelfError::FlushTimeout { timeout }),
            Err(SendTimeoutError::Disconnected(_)) => return Err(GelfError::TransportClosed),
        }

        let remaining = deadline.saturating_duration_since(Instant::now());
        match ack_rx.recv_timeout(remaining) {
            Ok(()) => Ok(()),
            Err(RecvTimeoutError::Timeout) => Err(GelfError::FlushTimeout { timeout }),
            Err(RecvTimeoutError::Disconnected) => Err(GelfError::TransportClosed),
        }
    }

    fn stop(&self) {
        // Closing the queue lets the worker drain what is left and exit
        drop(self.sender.write().take());

        if let Some(handle) = self.worker.lock().take() {
            if let Err(e) = handle.join() {
                status::report_error("GelfClient", format!("worker panicked: {:?}", e));
            }
        }
    }
}

impl Drop for GelfClient {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::unbounded;

    /// Sink that records frames and can be held on a gate
    struct GatedSink {
        started: Sender<()>,
        gate: Receiver<()>,
        frames: Sender<Vec<u8>>,
    }

    impl FrameSink for GatedSink {
        fn write_frame(&mut self, frame: &[u8]) -> Result<()> {
            let _ = self.started.send(());
            let _ = self.gate.recv();
            let _ = self.frames.send(frame.to_vec());
            Ok(())
        }
    }

    struct FailingSink;

    impl FrameSink for FailingSink {
        fn write_frame(&mut self, _frame: &[u8]) -> Result<()> {
            Err(GelfError::TransportClosed)
        }
    }

    fn message(text: &str) -> GelfMessage {
        GelfMessage::builder(text, "host").build().unwrap()
    }

    #[test]
    fn test_try_send_reports_full_queue() {
        let (started_tx, started_rx) = unbounded();
        let (gate_tx, gate_rx) = unbounded();
        let (frames_tx, frames_rx) = unbounded();
        let sink = GatedSink {
            started: started_tx,
            gate: gate_rx,
            frames: frames_tx,
        };
        let client = GelfClient::with_sink(Box::new(sink), GelfEncoder::for_tcp(), 1);

        assert!(client.try_send(message("first")));
        // Worker now holds "first" inside the sink
        started_rx.recv_timeout(Duration::from_secs(2)).unwrap();

        assert!(client.try_send(message("second")));
        assert!(!client.try_send(message("third")));
        assert_eq!(client.pending(), 1);

        for _ in 0..2 {
            gate_tx.send(()).unwrap();
        }
        client.flush(Duration::from_secs(2)).unwrap();

        assert_eq!(frames_rx.try_iter().count(), 2);
        assert_eq!(client.metrics().sent(), 2);
    }

    #[test]
    fn test_blocking_send_waits_for_queue_space() {
        let (started_tx, started_rx) = unbounded();
        let (gate_tx, gate_rx) = unbounded();
        let (frames_tx, frames_rx) = unbounded();
        let sink = GatedSink {
            started: started_tx,
            gate: gate_rx,
            frames: frames_tx,
        };
        let client = Arc::new(GelfClient::with_sink(Box::new(sink), GelfEncoder::for_tcp(), 1));

        client.send(message("first")).unwrap();
        started_rx.recv_timeout(Duration::from_secs(2)).unwrap();
        // Worker holds "first"; "second" fills the queue
        client.send(message("second")).unwrap();

        let (done_tx, done_rx) = bounded(1);
        let sender = {
            let client = Arc::clone(&client);
            thread::spawn(move || {
                let result = client.send(message("third"));
                let _ = done_tx.send(());
                result
            })
        };

        assert!(done_rx.recv_timeout(Duration::from_millis(200)).is_err());

        for _ in 0..3 {
            gate_tx.send(()).unwrap();
        }
        done_rx.recv_timeout(Duration::from_secs(2)).unwrap();
        assert!(sender.join().unwrap().is_ok());

        client.flush(Duration::from_secs(2)).unwrap();
        assert_eq!(frames_rx.try_iter().count(), 3);
        assert_eq!(client.metrics().sent(), 3);
    }

    #[test]
    fn test_flush_waits_for_queued_messages() {
        let (started_tx, _started_rx) = unbounded();
        let (gate_tx, gate_rx) = unbounded();
        let (frames_tx, frames_rx) = unbounded();
        let sink = GatedSink {
            started: started_tx,
            gate: gate_rx,
            frames: frames_tx,
        };
        let client = GelfClient::with_sink(Box::new(sink), GelfEncoder::for_tcp(), 8);

        for i in 0..3 {
            client.send(message(&format!("message {}", i))).unwrap();
        }

        let result = client.flush(Duration::from_millis(50));
        assert!(matches!(result, Err(GelfError::FlushTimeout { .. })));

        for _ in 0..3 {
            gate_tx.send(()).unwrap();
        }
        client.flush(Duration::from_secs(2)).unwrap();
        assert_eq!(frames_rx.try_iter().count(), 3);
    }

    #[test]
    fn test_stop_closes_transport() {
        let client = GelfClient::with_sink(Box::new(FailingSink), GelfEncoder::for_tcp(), 4);
        client.send(message("before stop")).unwrap();
        client.stop();

        assert!(client.is_stopped());
        assert_eq!(client.metrics().failed(), 1);
        assert!(!client.try_send(message("after stop")));
        assert!(matches!(
            client.send(message("after stop")),
            Err(GelfError::TransportClosed)
        ));
        assert!(client.flush(Duration::from_millis(10)).is_ok());
    }
}
