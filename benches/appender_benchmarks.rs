//! Criterion benchmarks for rust_gelf_appender

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use rust_gelf_appender::prelude::*;
use rust_gelf_appender::transport::{Compression, GelfEncoder};
use std::sync::Arc;
use std::time::Duration;

/// Transport that accepts and discards everything
struct NullTransport;

impl GelfTransport for NullTransport {
    fn send(&self, message: GelfMessage) -> Result<()> {
        black_box(message);
        Ok(())
    }

    fn try_send(&self, message: GelfMessage) -> bool {
        black_box(message);
        true
    }

    fn flush(&self, _timeout: Duration) -> Result<()> {
        Ok(())
    }

    fn stop(&self) {}
}

fn appender(include_exception_cause: bool) -> GelfAppender {
    GelfAppender::builder("bench")
        .host("bench-host")
        .include_exception_cause(include_exception_cause)
        .additional_field("environment", "bench")
        .transport(Arc::new(NullTransport))
        .build()
        .unwrap()
}

fn thrown_chain() -> ThrownError {
    ThrownError::new("Exception", "Test")
        .with_frames(["app::handler", "app::router", "app::main"])
        .with_cause(
            ThrownError::new("Exception", "Cause")
                .with_frames(["app::db::query"])
                .with_cause(ThrownError::new("RuntimeException", "Inner Cause")),
        )
}

// ============================================================================
// Message Construction Benchmarks
// ============================================================================

fn bench_message_construction(c: &mut Criterion) {
    let mut group = c.benchmark_group("message_construction");
    group.throughput(Throughput::Elements(1));

    let plain = appender(false);
    let with_cause = appender(true);

    let event = LogEvent::new(LogLevel::Info, "Hello World")
        .with_logger_name("bench")
        .with_location("src/main.rs", 42, "bench");
    group.bench_function("plain", |b| {
        b.iter(|| black_box(plain.build_message(black_box(&event)).unwrap()));
    });

    let context = ContextSnapshot::new()
        .with_field("requestId", "abc-123")
        .with_field("userId", 42i64)
        .with_entry(StackEntry::Message("Message only".into()));
    let event_with_context = event.clone().with_context(context);
    group.bench_function("with_context", |b| {
        b.iter(|| black_box(plain.build_message(black_box(&event_with_context)).unwrap()));
    });

    let error_event = LogEvent::new(LogLevel::Error, "Hello World").with_thrown(thrown_chain());
    group.bench_function("with_exception", |b| {
        b.iter(|| black_box(plain.build_message(black_box(&error_event)).unwrap()));
    });
    group.bench_function("with_exception_cause", |b| {
        b.iter(|| black_box(with_cause.build_message(black_box(&error_event)).unwrap()));
    });

    group.finish();
}

// ============================================================================
// Wire Encoding Benchmarks
// ============================================================================

fn bench_encoding(c: &mut Criterion) {
    let mut group = c.benchmark_group("encoding");
    group.throughput(Throughput::Elements(1));

    let event = LogEvent::new(LogLevel::Error, "Hello World").with_thrown(thrown_chain());
    let message = appender(true).build_message(&event).unwrap();

    let encoders = [
        ("udp_plain", GelfEncoder::for_udp(Compression::None)),
        ("udp_gzip", GelfEncoder::for_udp(Compression::Gzip)),
        ("tcp", GelfEncoder::for_tcp()),
    ];
    for (name, encoder) in encoders {
        group.bench_function(name, |b| {
            b.iter(|| black_box(encoder.encode(black_box(&message)).unwrap()));
        });
    }

    group.finish();
}

// ============================================================================
// Logging Path Benchmarks
// ============================================================================

fn bench_logging(c: &mut Criterion) {
    let mut group = c.benchmark_group("logging");
    group.throughput(Throughput::Elements(1));

    let mut logger = Logger::new("bench");
    logger.add_appender(Box::new(appender(false)));

    group.bench_function("info", |b| {
        b.iter(|| logger.info(black_box("Info message")));
    });

    group.bench_function("filtered_debug", |b| {
        b.iter(|| logger.debug(black_box("Debug message (filtered)")));
    });

    ThreadContext::put("requestId", "abc-123");
    group.bench_function("info_with_context", |b| {
        b.iter(|| logger.info(black_box("Info message")));
    });
    ThreadContext::clear_all();

    group.finish();
}

// ============================================================================
// Criterion Configuration
// ============================================================================

criterion_group!(benches, bench_message_construction, bench_encoding, bench_logging);

criterion_main!(benches);
