//! GELF appender for remote logging
//!
//! Converts log events into GELF messages and hands them to a
//! [`GelfTransport`], either blocking until the transport accepts the
//! message or trying once without waiting.
//!
//! Fields added to every message:
//! - `loggerName`, `threadName`
//! - `file`, `line`, `modulePath` with `includeSource`
//! - thread context map entries and `contextStack` with `includeThreadContext`
//! - `marker` with `includeMarkers`
//! - `exceptionClass`, `exceptionMessage` (and the trace as full message)
//!   with `includeStackTrace`
//! - the configured static `additionalFields`

use crate::core::{
    is_valid_field_key, status, Appender, DeliveryMetrics, Filter, GelfError, GelfMessage,
    GelfTransport, Layout, LogEvent, Result,
};
use crate::transport::{GelfClient, GelfConfiguration};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Appender settings, deserializable from camelCase JSON
///
/// # Example
///
/// ```
/// use rust_gelf_appender::appenders::GelfAppenderConfig;
///
/// let config = GelfAppenderConfig::from_json(r#"{
///     "name": "graylog",
///     "host": "app-01",
///     "includeExceptionCause": true,
///     "blocking": false,
///     "additionalFields": { "environment": "staging" },
///     "server": { "host": "graylog.internal", "protocol": "tcp" }
/// }"#).unwrap();
///
/// assert!(config.include_stack_trace);
/// assert!(!config.blocking);
/// assert_eq!(config.server.port, 12201);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GelfAppenderConfig {
    pub name: String,
    /// Origin host written into every message; the local hostname when unset
    pub host: Option<String>,
    pub include_source: bool,
    pub include_thread_context: bool,
    pub include_stack_trace: bool,
    pub include_exception_cause: bool,
    pub include_markers: bool,
    pub blocking: bool,
    /// Swallow blocking-send failures instead of returning them
    pub ignore_exceptions: bool,
    pub additional_fields: BTreeMap<String, String>,
    pub flush_timeout_ms: u64,
    pub server: GelfConfiguration,
}

impl Default for GelfAppenderConfig {
    fn default() -> Self {
        Self {
            name: "gelf".to_string(),
            host: None,
            include_source: true,
            include_thread_context: true,
            include_stack_trace: true,
            include_exception_cause: false,
            include_markers: false,
            blocking: true,
            ignore_exceptions: true,
            additional_fields: BTreeMap::new(),
            flush_timeout_ms: 5000,
            server: GelfConfiguration::default(),
        }
    }
}

impl GelfAppenderConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn flush_timeout(&self) -> Duration {
        Duration::from_millis(self.flush_timeout_ms)
    }

    fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(GelfError::config("GelfAppender", "name must not be empty"));
        }
        if let Some(host) = &self.host {
            if host.trim().is_empty() {
                return Err(GelfError::config("GelfAppender", "host must not be blank"));
            }
        }
        if let Some(key) = self.additional_fields.keys().find(|k| !is_valid_field_key(k)) {
            return Err(GelfError::config(
                "GelfAppender",
                format!("invalid additional field name '{}'", key),
            ));
        }
        Ok(())
    }
}

fn local_hostname() -> String {
    hostname::get()
        .ok()
        .and_then(|name| name.into_string().ok())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| "localhost".to_string())
}

/// Appender that forwards events to a GELF collector
///
/// # Example
///
/// ```
/// use rust_gelf_appender::appenders::GelfAppender;
/// use rust_gelf_appender::transport::{Compression, GelfConfiguration};
/// use rust_gelf_appender::prelude::*;
///
/// let appender = GelfAppender::builder("graylog")
///     .host("app-01")
///     .include_exception_cause(true)
///     .additional_field("environment", "staging")
///     .server(GelfConfiguration::new("127.0.0.1", 12201).with_compression(Compression::None))
///     .build()?;
///
/// let mut logger = Logger::new("payments");
/// logger.add_appender(Box::new(appender));
/// logger.info("Hello World");
/// # Ok::<(), GelfError>(())
/// ```
pub struct GelfAppender {
    config: GelfAppenderConfig,
    origin_host: String,
    filter: Option<Box<dyn Filter>>,
    layout: Option<Box<dyn Layout>>,
    transport: Arc<dyn GelfTransport>,
    metrics: DeliveryMetrics,
    skipped_fields: AtomicU64,
}

impl GelfAppender {
    pub fn builder(name: impl Into<String>) -> GelfAppenderBuilder {
        GelfAppenderBuilder::new(name)
    }

    /// Create an appender with its own [`GelfClient`] built from `config.server`
    pub fn from_config(config: GelfAppenderConfig) -> Result<Self> {
        config.validate()?;
        let client = GelfClient::new(&config.server)?;
        Self::with_transport(config, Arc::new(client))
    }

    /// Create an appender delivering through an existing transport
    pub fn with_transport(config: GelfAppenderConfig, transport: Arc<dyn GelfTransport>) -> Result<Self> {
        config.validate()?;
        let origin_host = config.host.clone().unwrap_or_else(local_hostname);

        Ok(Self {
            config,
            origin_host,
            filter: None,
            layout: None,
            transport,
            metrics: DeliveryMetrics::new(),
            skipped_fields: AtomicU64::new(0),
        })
    }

    /// Replace the transport messages are handed to
    pub fn set_transport(&mut self, transport: Arc<dyn GelfTransport>) {
        self.transport = transport;
    }

    pub fn transport(&self) -> &Arc<dyn GelfTransport> {
        &self.transport
    }

    pub fn config(&self) -> &GelfAppenderConfig {
        &self.config
    }

    pub fn host(&self) -> &str {
        &self.origin_host
    }

    /// Hand-over outcomes: sent, rejected, failed, construction failures
    pub fn metrics(&self) -> &DeliveryMetrics {
        &self.metrics
    }

    /// Build the GELF message for an event without sending it
    pub fn build_message(&self, event: &LogEvent) -> Result<GelfMessage> {
        let short_message = match &self.layout {
            Some(layout) => layout.format(event),
            None => event.message.clone(),
        };

        let mut builder = GelfMessage::builder(short_message, self.origin_host.clone())
            .level(event.level.gelf_level())
            .timestamp(event.timestamp)
            .additional_fields(
                self.config
                    .additional_fields
                    .iter()
                    .map(|(k, v)| (k.as_str(), v.as_str())),
            );

        if self.config.include_thread_context {
            for (key, value) in event.context.map() {
                if is_valid_field_key(key) {
                    builder = builder.additional_field(key, value.clone());
                } else {
                    self.report_skipped_field(key);
                }
            }
            if !event.context.stack().is_empty() {
                builder = builder.additional_field("contextStack", event.context.format_stack());
            }
        }

        if !event.logger_name.is_empty() {
            builder = builder.additional_field("loggerName", event.logger_name.as_str());
        }
        let thread_name = event.thread_name.as_deref().unwrap_or(&event.thread_id);
        builder = builder.additional_field("threadName", thread_name);

        if self.config.include_source {
            if let Some(file) = &event.file {
                builder = builder.additional_field("file", file.as_str());
            }
            if let Some(line) = event.line {
                builder = builder.additional_field("line", line);
            }
            if let Some(module_path) = &event.module_path {
                builder = builder.additional_field("modulePath", module_path.as_str());
            }
        }

        if self.config.include_markers {
            if let Some(marker) = &event.marker {
                builder = builder.additional_field("marker", marker.to_string());
            }
        }

        if self.config.include_stack_trace {
            if let Some(thrown) = &event.thrown {
                builder = builder
                    .full_message(thrown.render(self.config.include_exception_cause))
                    .additional_field("exceptionMessage", thrown.message());
                if let Some(kind) = thrown.kind() {
                    builder = builder.additional_field("exceptionClass", kind);
                }
            }
        }

        builder.build()
    }

    fn report_skipped_field(&self, key: &str) {
        let previous = self.skipped_fields.fetch_add(1, Ordering::Relaxed);
        if status::should_alert(previous) {
            status::report_warning(
                &self.config.name,
                format!("skipped context key '{}': not a valid GELF field name", key),
            );
        }
    }

    /// Flush and stop the transport
    pub fn stop(&mut self) -> Result<()> {
        let flushed = self.transport.flush(self.config.flush_timeout());
        self.transport.stop();
        flushed
    }
}

impl Appender for GelfAppender {
    fn append(&mut self, event: &LogEvent) -> Result<()> {
        if let Some(filter) = &self.filter {
            if !filter.accepts(event) {
                return Ok(());
            }
        }

        let message = match self.build_message(event) {
            Ok(message) => message,
            Err(e) => {
                // Malformed events never reach the caller
                self.metrics.record_construction_failed();
                status::report_error(&self.config.name, format!("dropping event: {}", e));
                return Ok(());
            }
        };

        if self.config.blocking {
            match self.transport.send(message) {
                Ok(()) => {
                    self.metrics.record_sent();
                    Ok(())
                }
                Err(e) => {
                    self.metrics.record_failed();
                    if self.config.ignore_exceptions {
                        status::report_error(&self.config.name, &e);
                        Ok(())
                    } else {
                        Err(GelfError::delivery(self.config.name.clone(), e))
                    }
                }
            }
        } else {
            if self.transport.try_send(message) {
                self.metrics.record_sent();
            } else {
                let previous = self.metrics.record_rejected();
                if status::should_alert(previous) {
                    status::report_warning(
                        &self.config.name,
                        format!(
                            "transport rejected {} messages. \
                             Consider increasing the queue size or enabling blocking mode.",
                            previous + 1
                        ),
                    );
                }
            }
            Ok(())
        }
    }

    fn flush(&mut self) -> Result<()> {
        self.transport.flush(self.config.flush_timeout())
    }

    fn name(&self) -> &str {
        &self.config.name
    }
}

/// Builder for [`GelfAppender`] mirroring the appender's construction parameters
pub struct GelfAppenderBuilder {
    config: GelfAppenderConfig,
    filter: Option<Box<dyn Filter>>,
    layout: Option<Box<dyn Layout>>,
    transport: Option<Arc<dyn GelfTransport>>,
}

impl GelfAppenderBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            config: GelfAppenderConfig {
                name: name.into(),
                ..GelfAppenderConfig::default()
            },
            filter: None,
            layout: None,
            transport: None,
        }
    }

    /// Start from a deserialized configuration
    pub fn from_config(config: GelfAppenderConfig) -> Self {
        Self {
            config,
            filter: None,
            layout: None,
            transport: None,
        }
    }

    #[must_use = "builder methods return a new value"]
    pub fn filter<F: Filter + 'static>(mut self, filter: F) -> Self {
        self.filter = Some(Box::new(filter));
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn layout<L: Layout + 'static>(mut self, layout: L) -> Self {
        self.layout = Some(Box::new(layout));
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn ignore_exceptions(mut self, ignore: bool) -> Self {
        self.config.ignore_exceptions = ignore;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn server(mut self, server: GelfConfiguration) -> Self {
        self.config.server = server;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.config.host = Some(host.into());
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn include_source(mut self, include: bool) -> Self {
        self.config.include_source = include;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn include_thread_context(mut self, include: bool) -> Self {
        self.config.include_thread_context = include;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn include_stack_trace(mut self, include: bool) -> Self {
        self.config.include_stack_trace = include;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn include_exception_cause(mut self, include: bool) -> Self {
        self.config.include_exception_cause = include;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn include_markers(mut self, include: bool) -> Self {
        self.config.include_markers = include;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn blocking(mut self, blocking: bool) -> Self {
        self.config.blocking = blocking;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn additional_field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.additional_fields.insert(key.into(), value.into());
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn flush_timeout(mut self, timeout: Duration) -> Self {
        self.config.flush_timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Deliver through this transport instead of opening a client from `server`
    #[must_use = "builder methods return a new value"]
    pub fn transport(mut self, transport: Arc<dyn GelfTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn build(self) -> Result<GelfAppender> {
        let mut appender = match self.transport {
            Some(transport) => GelfAppender::with_transport(self.config, transport)?,
            None => GelfAppender::from_config(self.config)?,
        };
        appender.filter = self.filter;
        appender.layout = self.layout;
        Ok(appender)
    }
}
