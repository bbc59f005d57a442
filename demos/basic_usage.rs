//! Basic GELF appender usage example
//!
//! Sends a few events to a GELF collector on localhost (UDP 12201 by
//! default), covering exceptions, markers and thread context.
//!
//! Run with: cargo run --example basic_usage [host] [port]

use rust_gelf_appender::prelude::*;
use rust_gelf_appender::transport::GelfConfiguration;
use std::io;

fn main() -> Result<()> {
    println!("=== Rust GELF Appender - Basic Usage Example ===\n");

    let mut args = std::env::args().skip(1);
    let host = args.next().unwrap_or_else(|| "127.0.0.1".to_string());
    let port = match args.next() {
        Some(port) => port
            .parse()
            .map_err(|_| GelfError::config("basic_usage", format!("invalid port '{}'", port)))?,
        None => 12201,
    };

    let appender = GelfAppender::builder("graylog")
        .include_exception_cause(true)
        .include_markers(true)
        .additional_field("application", "basic_usage")
        .server(GelfConfiguration::new(host.as_str(), port))
        .build()?;
    println!("Sending to {}:{} as host '{}'", host, port, appender.host());

    let mut logger = Logger::new("test");
    logger.set_min_level(LogLevel::Trace);
    logger.add_appender(Box::new(appender));

    println!("1. Plain message");
    logger.info("Hello World");

    println!("2. Marker with parent");
    let parent = MarkerManager::get_marker("PARENT");
    let marker = MarkerManager::get_marker("TEST");
    marker.add_parents(&[parent])?;
    logger.log_with_marker(LogLevel::Info, &marker, "Hello World");

    println!("3. Exception with causes");
    let inner = io::Error::new(io::ErrorKind::ConnectionReset, "Inner Cause");
    let thrown = ThrownError::new("Exception", "Test")
        .with_captured_frames()
        .with_cause(ThrownError::new("Exception", "Cause").with_cause(ThrownError::from_error(&inner)));
    logger.log_thrown(LogLevel::Error, "Hello World", thrown);

    println!("4. Thread context");
    ThreadContext::push("Message only");
    ThreadContext::push_values("int", [1]);
    ThreadContext::push_values(
        "int-long-string",
        [FieldValue::from(1), FieldValue::from(2i64), FieldValue::from("3")],
    );
    ThreadContext::put("key", "value");
    logger.info("Hello World");
    ThreadContext::clear_all();

    logger.flush()?;
    println!("\n=== Example completed successfully! ===");
    Ok(())
}
