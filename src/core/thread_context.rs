//! Thread-scoped logging context
//!
//! This module provides:
//! - `FieldValue`: Values carried by context fields
//! - `ThreadContext`: Per-thread stack and key/value map, never inherited by spawned threads
//! - `ContextSnapshot`: Immutable copy of the context taken at the log call
//! - `ContextGuard`: RAII guard for scoped map entries

use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::marker::PhantomData;

/// Value type for structured logging fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    String(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Null,
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::String(s) => write!(f, "{}", s),
            FieldValue::Int(i) => write!(f, "{}", i),
            FieldValue::Float(fl) => write!(f, "{}", fl),
            FieldValue::Bool(b) => write!(f, "{}", b),
            FieldValue::Null => write!(f, "null"),
        }
    }
}

impl FieldValue {
    /// Convert to the JSON value written into a GELF additional field.
    ///
    /// GELF only allows strings and numbers, so booleans are written as strings
    /// and nulls yield `None`.
    #[must_use]
    pub fn to_gelf_value(&self) -> Option<serde_json::Value> {
        match self {
            FieldValue::String(s) => Some(serde_json::Value::String(s.clone())),
            FieldValue::Int(i) => Some(serde_json::Value::Number((*i).into())),
            FieldValue::Float(f) => Some(
                serde_json::Number::from_f64(*f)
                    .map(serde_json::Value::Number)
                    .unwrap_or_else(|| serde_json::Value::String(f.to_string())),
            ),
            FieldValue::Bool(b) => Some(serde_json::Value::String(b.to_string())),
            FieldValue::Null => None,
        }
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::String(s)
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::String(s.to_string())
    }
}

impl From<i64> for FieldValue {
    fn from(i: i64) -> Self {
        FieldValue::Int(i)
    }
}

impl From<i32> for FieldValue {
    fn from(i: i32) -> Self {
        FieldValue::Int(i as i64)
    }
}

impl From<u32> for FieldValue {
    fn from(i: u32) -> Self {
        FieldValue::Int(i as i64)
    }
}

impl From<f64> for FieldValue {
    fn from(f: f64) -> Self {
        FieldValue::Float(f)
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        FieldValue::Bool(b)
    }
}

/// One entry of the context stack
#[derive(Debug, Clone, PartialEq)]
pub enum StackEntry {
    /// Plain message pushed without values
    Message(String),
    /// Key pushed together with one or more values
    Keyed { key: String, values: Vec<FieldValue> },
}

impl fmt::Display for StackEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StackEntry::Message(message) => write!(f, "{}", message),
            StackEntry::Keyed { key, values } => {
                write!(f, "{}=", key)?;
                for (idx, value) in values.iter().enumerate() {
                    if idx > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{}", value)?;
                }
                Ok(())
            }
        }
    }
}

thread_local! {
    static CONTEXT_STACK: RefCell<Vec<StackEntry>> = const { RefCell::new(Vec::new()) };
    static CONTEXT_MAP: RefCell<BTreeMap<String, FieldValue>> = const { RefCell::new(BTreeMap::new()) };
}

/// Per-thread diagnostic context
///
/// Entries pushed or put here are visible only to log calls made on the same
/// thread, and only until they are popped, removed or cleared.
///
/// # Example
///
/// ```
/// use rust_gelf_appender::ThreadContext;
///
/// ThreadContext::push("Message only");
/// ThreadContext::push_values("int-long-string", [1, 2]);
/// ThreadContext::put("key", "value");
///
/// let snapshot = ThreadContext::snapshot();
/// assert_eq!(snapshot.format_stack(), "[Message only, int-long-string=1,2]");
///
/// ThreadContext::clear_all();
/// assert!(ThreadContext::snapshot().is_empty());
/// ```
pub struct ThreadContext;

impl ThreadContext {
    /// Push a message-only entry onto the stack
    pub fn push(message: impl Into<String>) {
        let entry = StackEntry::Message(message.into());
        CONTEXT_STACK.with(|stack| stack.borrow_mut().push(entry));
    }

    /// Push a key with its values onto the stack
    pub fn push_values<K, I, V>(key: K, values: I)
    where
        K: Into<String>,
        I: IntoIterator<Item = V>,
        V: Into<FieldValue>,
    {
        let entry = StackEntry::Keyed {
            key: key.into(),
            values: values.into_iter().map(Into::into).collect(),
        };
        CONTEXT_STACK.with(|stack| stack.borrow_mut().push(entry));
    }

    /// Remove and return the most recently pushed entry
    pub fn pop() -> Option<StackEntry> {
        CONTEXT_STACK.with(|stack| stack.borrow_mut().pop())
    }

    /// Return the most recently pushed entry without removing it
    pub fn peek() -> Option<StackEntry> {
        CONTEXT_STACK.with(|stack| stack.borrow().last().cloned())
    }

    /// Number of entries on the stack
    pub fn depth() -> usize {
        CONTEXT_STACK.with(|stack| stack.borrow().len())
    }

    /// Set a key in the map, returning the previous value
    pub fn put<K, V>(key: K, value: V) -> Option<FieldValue>
    where
        K: Into<String>,
        V: Into<FieldValue>,
    {
        CONTEXT_MAP.with(|map| map.borrow_mut().insert(key.into(), value.into()))
    }

    pub fn get(key: &str) -> Option<FieldValue> {
        CONTEXT_MAP.with(|map| map.borrow().get(key).cloned())
    }

    pub fn remove(key: &str) -> Option<FieldValue> {
        CONTEXT_MAP.with(|map| map.borrow_mut().remove(key))
    }

    pub fn clear_stack() {
        CONTEXT_STACK.with(|stack| stack.borrow_mut().clear());
    }

    pub fn clear_map() {
        CONTEXT_MAP.with(|map| map.borrow_mut().clear());
    }

    /// Clear both the stack and the map of the calling thread
    pub fn clear_all() {
        Self::clear_stack();
        Self::clear_map();
    }

    /// Copy the calling thread's context
    pub fn snapshot() -> ContextSnapshot {
        ContextSnapshot {
            map: CONTEXT_MAP.with(|map| map.borrow().clone()),
            stack: CONTEXT_STACK.with(|stack| stack.borrow().clone()),
        }
    }

    /// Put a key for the lifetime of the returned guard
    ///
    /// When the guard is dropped the previous value (if any) is restored.
    #[must_use = "the entry is removed as soon as the guard is dropped"]
    pub fn scoped<K, V>(key: K, value: V) -> ContextGuard
    where
        K: Into<String>,
        V: Into<FieldValue>,
    {
        let key = key.into();
        let previous = Self::put(key.clone(), value);
        ContextGuard {
            key,
            previous,
            _not_send: PhantomData,
        }
    }
}

/// Immutable copy of a thread's context, carried by a log event
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContextSnapshot {
    map: BTreeMap<String, FieldValue>,
    stack: Vec<StackEntry>,
}

impl ContextSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a map entry (builder style, mostly for tests and manual events)
    #[must_use]
    pub fn with_field<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<FieldValue>,
    {
        self.map.insert(key.into(), value.into());
        self
    }

    /// Add a stack entry (builder style)
    #[must_use]
    pub fn with_entry(mut self, entry: StackEntry) -> Self {
        self.stack.push(entry);
        self
    }

    pub fn map(&self) -> &BTreeMap<String, FieldValue> {
        &self.map
    }

    pub fn stack(&self) -> &[StackEntry] {
        &self.stack
    }

    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.map.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty() && self.stack.is_empty()
    }

    /// Render the stack oldest first, e.g. `[Message only, int=1]`
    pub fn format_stack(&self) -> String {
        let items: Vec<String> = self.stack.iter().map(ToString::to_string).collect();
        format!("[{}]", items.join(", "))
    }
}

/// RAII guard for a scoped thread context entry
///
/// Not `Send`: the entry lives in the thread that created the guard.
pub struct ContextGuard {
    key: String,
    previous: Option<FieldValue>,
    _not_send: PhantomData<*const ()>,
}

impl Drop for ContextGuard {
    fn drop(&mut self) {
        match self.previous.take() {
            Some(value) => {
                ThreadContext::put(self.key.clone(), value);
            }
            None => {
                ThreadContext::remove(&self.key);
            }
        }
    }
}
