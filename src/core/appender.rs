//! Appender, filter and layout traits

use super::{error::Result, log_event::LogEvent, log_level::LogLevel};

pub trait Appender: Send + Sync {
    fn append(&mut self, event: &LogEvent) -> Result<()>;
    fn flush(&mut self) -> Result<()>;
    fn name(&self) -> &str;
}

/// Decides whether an appender handles an event
pub trait Filter: Send + Sync {
    fn accepts(&self, event: &LogEvent) -> bool;
}

/// Renders the message text an appender sends for an event
pub trait Layout: Send + Sync {
    fn format(&self, event: &LogEvent) -> String;
}

/// Accepts events at or above a minimum level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThresholdFilter {
    min_level: LogLevel,
}

impl ThresholdFilter {
    pub fn new(min_level: LogLevel) -> Self {
        Self { min_level }
    }
}

impl Filter for ThresholdFilter {
    fn accepts(&self, event: &LogEvent) -> bool {
        event.level >= self.min_level
    }
}

/// Accepts events whose marker is, or descends from, the named marker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerFilter {
    name: String,
}

impl MarkerFilter {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Filter for MarkerFilter {
    fn accepts(&self, event: &LogEvent) -> bool {
        event
            .marker
            .as_ref()
            .is_some_and(|marker| marker.is_instance_of(&self.name))
    }
}
