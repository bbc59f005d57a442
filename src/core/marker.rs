//! Named, hierarchical markers
//!
//! A marker tags a log event for categorization. Markers may have parents,
//! forming a directed acyclic graph: `marker.is_instance_of("PARENT")` is true
//! for the marker itself and for every ancestor.

use super::error::{GelfError, Result};
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock};

/// Serializes hierarchy changes so the cycle check and the insert are atomic
static HIERARCHY: Mutex<()> = Mutex::new(());

struct MarkerInner {
    name: String,
    parents: RwLock<Vec<Marker>>,
}

/// A named tag attachable to log events
///
/// Cloning is cheap; clones share the same parent list.
#[derive(Clone)]
pub struct Marker {
    inner: Arc<MarkerInner>,
}

impl Marker {
    /// Create a marker outside the global registry
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(MarkerInner {
                name: name.into(),
                parents: RwLock::new(Vec::new()),
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Direct parents, in insertion order
    pub fn parents(&self) -> Vec<Marker> {
        self.inner.parents.read().clone()
    }

    pub fn has_parents(&self) -> bool {
        !self.inner.parents.read().is_empty()
    }

    /// Add parents to this marker
    ///
    /// Parents already present are skipped. A parent that is this marker or one
    /// of its descendants is refused, keeping the hierarchy acyclic.
    pub fn add_parents(&self, parents: &[Marker]) -> Result<&Self> {
        let _hierarchy = HIERARCHY.lock();
        for parent in parents {
            if parent.is_instance_of(self.name()) {
                return Err(GelfError::config(
                    "Marker",
                    format!(
                        "adding '{}' as parent of '{}' would create a cycle",
                        parent.name(),
                        self.name()
                    ),
                ));
            }
        }

        let mut current = self.inner.parents.write();
        for parent in parents {
            if !current.iter().any(|p| p.name() == parent.name()) {
                current.push(parent.clone());
            }
        }
        Ok(self)
    }

    /// Remove a direct parent by name; returns whether it was present
    pub fn remove_parent(&self, name: &str) -> bool {
        let mut current = self.inner.parents.write();
        let before = current.len();
        current.retain(|p| p.name() != name);
        current.len() != before
    }

    /// True if this marker or any ancestor is named `name`
    pub fn is_instance_of(&self, name: &str) -> bool {
        if self.name() == name {
            return true;
        }
        self.inner
            .parents
            .read()
            .iter()
            .any(|parent| parent.is_instance_of(name))
    }
}

impl PartialEq for Marker {
    fn eq(&self, other: &Self) -> bool {
        self.name() == other.name()
    }
}

impl Eq for Marker {}

impl fmt::Debug for Marker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Marker")
            .field("name", &self.name())
            .field(
                "parents",
                &self.parents().iter().map(|p| p.name().to_string()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

/// Renders `NAME[ PARENT1, PARENT2[ GRANDPARENT ] ]`
impl fmt::Display for Marker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())?;
        let parents = self.inner.parents.read();
        if !parents.is_empty() {
            write!(f, "[ ")?;
            for (idx, parent) in parents.iter().enumerate() {
                if idx > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{}", parent)?;
            }
            write!(f, " ]")?;
        }
        Ok(())
    }
}

fn registry() -> &'static RwLock<HashMap<String, Marker>> {
    static REGISTRY: OnceLock<RwLock<HashMap<String, Marker>>> = OnceLock::new();
    REGISTRY.get_or_init(|| RwLock::new(HashMap::new()))
}

/// Process-wide registry of markers keyed by name
///
/// # Example
///
/// ```
/// use rust_gelf_appender::MarkerManager;
///
/// let parent = MarkerManager::get_marker("PARENT");
/// let marker = MarkerManager::get_marker("TEST");
/// marker.add_parents(&[parent]).unwrap();
///
/// assert!(MarkerManager::get_marker("TEST").is_instance_of("PARENT"));
/// assert_eq!(marker.to_string(), "TEST[ PARENT ]");
/// ```
pub struct MarkerManager;

impl MarkerManager {
    /// Return the marker registered under `name`, creating it on first use
    pub fn get_marker(name: &str) -> Marker {
        if let Some(marker) = registry().read().get(name) {
            return marker.clone();
        }
        registry()
            .write()
            .entry(name.to_string())
            .or_insert_with(|| Marker::new(name))
            .clone()
    }

    pub fn exists(name: &str) -> bool {
        registry().read().contains_key(name)
    }

    /// Forget every registered marker. Existing handles stay valid.
    pub fn clear() {
        registry().write().clear();
    }
}
