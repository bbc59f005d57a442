//! GELF message and builder
//!
//! A [`GelfMessage`] is immutable once built. Construction goes through
//! [`GelfMessageBuilder`], which enforces the GELF 1.1 rules:
//! - `short_message` and `host` must not be blank
//! - additional field names match `^[\w\.\-]+$` and `id` is reserved
//!
//! On the wire additional fields are prefixed with `_`.

use super::error::{GelfError, Result};
use super::log_level::GelfLevel;
use super::thread_context::FieldValue;
use chrono::{DateTime, Utc};
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::collections::BTreeMap;

/// GELF format version written in every message
pub const GELF_VERSION: &str = "1.1";

/// Check an additional field name against the GELF naming rules.
///
/// A single leading underscore is accepted and ignored.
pub fn is_valid_field_key(key: &str) -> bool {
    let name = key.strip_prefix('_').unwrap_or(key);
    !name.is_empty()
        && name != "id"
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
}

fn normalize_key(key: &str) -> &str {
    key.strip_prefix('_').unwrap_or(key)
}

#[derive(Debug, Clone, PartialEq)]
pub struct GelfMessage {
    host: String,
    short_message: String,
    full_message: Option<String>,
    timestamp: DateTime<Utc>,
    level: GelfLevel,
    additional_fields: BTreeMap<String, FieldValue>,
}

impl GelfMessage {
    /// Start building a message
    ///
    /// # Example
    ///
    /// ```
    /// use rust_gelf_appender::{GelfLevel, GelfMessage};
    ///
    /// let message = GelfMessage::builder("Hello World", "app-01")
    ///     .level(GelfLevel::Info)
    ///     .additional_field("loggerName", "test")
    ///     .build()
    ///     .unwrap();
    ///
    /// let json = message.to_json().unwrap();
    /// assert!(json.contains("\"_loggerName\":\"test\""));
    /// ```
    pub fn builder(short_message: impl Into<String>, host: impl Into<String>) -> GelfMessageBuilder {
        GelfMessageBuilder::new(short_message, host)
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn short_message(&self) -> &str {
        &self.short_message
    }

    pub fn full_message(&self) -> Option<&str> {
        self.full_message.as_deref()
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Seconds since the epoch with millisecond precision
    pub fn timestamp_secs(&self) -> f64 {
        self.timestamp.timestamp_millis() as f64 / 1000.0
    }

    pub fn level(&self) -> GelfLevel {
        self.level
    }

    /// Additional fields keyed by their name without the `_` prefix
    pub fn additional_fields(&self) -> &BTreeMap<String, FieldValue> {
        &self.additional_fields
    }

    pub fn additional_field(&self, key: &str) -> Option<&FieldValue> {
        self.additional_fields.get(normalize_key(key))
    }

    /// Serialize to a GELF JSON document
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_json_bytes(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }
}

impl Serialize for GelfMessage {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("version", GELF_VERSION)?;
        map.serialize_entry("host", &self.host)?;
        map.serialize_entry("short_message", &self.short_message)?;
        if let Some(full_message) = &self.full_message {
            map.serialize_entry("full_message", full_message)?;
        }
        map.serialize_entry("timestamp", &self.timestamp_secs())?;
        map.serialize_entry("level", &self.level.numeric())?;
        for (key, value) in &self.additional_fields {
            if let Some(value) = value.to_gelf_value() {
                map.serialize_entry(&format!("_{}", key), &value)?;
            }
        }
        map.end()
    }
}

/// Builder for [`GelfMessage`]
#[derive(Debug, Clone)]
pub struct GelfMessageBuilder {
    host: String,
    short_message: String,
    full_message: Option<String>,
    timestamp: Option<DateTime<Utc>>,
    level: GelfLevel,
    additional_fields: BTreeMap<String, FieldValue>,
}

impl GelfMessageBuilder {
    pub fn new(short_message: impl Into<String>, host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            short_message: short_message.into(),
            full_message: None,
            timestamp: None,
            level: GelfLevel::Alert,
            additional_fields: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn full_message(mut self, full_message: impl Into<String>) -> Self {
        self.full_message = Some(full_message.into());
        self
    }

    #[must_use]
    pub fn timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    #[must_use]
    pub fn level(mut self, level: GelfLevel) -> Self {
        self.level = level;
        self
    }

    /// Add an additional field; a later value for the same key wins
    #[must_use]
    pub fn additional_field<K, V>(mut self, key: K, value: V) -> Self
    where
        K: AsRef<str>,
        V: Into<FieldValue>,
    {
        self.additional_fields
            .insert(normalize_key(key.as_ref()).to_string(), value.into());
        self
    }

    #[must_use]
    pub fn additional_fields<I, K, V>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<FieldValue>,
    {
        for (key, value) in fields {
            self = self.additional_field(key, value);
        }
        self
    }

    /// Validate and build the message
    pub fn build(self) -> Result<GelfMessage> {
        if self.short_message.trim().is_empty() {
            return Err(GelfError::invalid_message("short message is empty"));
        }
        if self.host.trim().is_empty() {
            return Err(GelfError::invalid_message("host is empty"));
        }
        if let Some(key) = self.additional_fields.keys().find(|k| !is_valid_field_key(k)) {
            return Err(GelfError::invalid_field(key.clone()));
        }

        Ok(GelfMessage {
            host: self.host,
            short_message: self.short_message,
            full_message: self.full_message.filter(|m| !m.is_empty()),
            timestamp: self.timestamp.unwrap_or_else(Utc::now),
            level: self.level,
            additional_fields: self.additional_fields,
        })
    }
}
