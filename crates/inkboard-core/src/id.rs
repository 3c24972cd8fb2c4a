use lasso::{Spur, ThreadedRodeo};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::sync::LazyLock;
use std::sync::atomic::{AtomicU64, Ordering};

/// Global string interner for object IDs.
static INTERNER: LazyLock<ThreadedRodeo> = LazyLock::new(ThreadedRodeo::default);

/// Monotonic counter shared by every generated ID.
static COUNTER: AtomicU64 = AtomicU64::new(0);

/// A lightweight, interned handle for an object on the canvas.
/// Internally a `Spur` index: 4 bytes, Copy, Eq, Hash in O(1).
///
/// The handle is what history commands hold: the object itself stays owned
/// by the scene (live or retained), never by the command.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectId(Spur);

impl ObjectId {
    /// Intern a string as an ObjectId, or return the existing one.
    pub fn intern(s: &str) -> Self {
        ObjectId(INTERNER.get_or_intern(s))
    }

    /// Resolve back to a string slice.
    pub fn as_str(&self) -> &str {
        INTERNER.resolve(&self.0)
    }

    /// Generate a unique ID with a category prefix (e.g. `stroke_4`, `icon_9`).
    /// Names already interned (for instance by a loaded document) are skipped.
    pub fn with_prefix(prefix: &str) -> Self {
        loop {
            let n = COUNTER.fetch_add(1, Ordering::Relaxed);
            let name = format!("{prefix}_{n}");
            if INTERNER.get(name.as_str()).is_none() {
                return Self::intern(&name);
            }
        }
    }
}

impl fmt::Debug for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.as_str())
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ObjectId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ObjectId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(ObjectId::intern(&s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_roundtrip() {
        let a = ObjectId::intern("stroke_floorplan");
        let b = ObjectId::intern("stroke_floorplan");
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "stroke_floorplan");
    }

    #[test]
    fn prefixed_ids_are_unique() {
        let a = ObjectId::with_prefix("icon");
        let b = ObjectId::with_prefix("icon");
        assert_ne!(a, b);
        assert!(a.as_str().starts_with("icon_"));
    }

    #[test]
    fn generated_ids_skip_loaded_names() {
        let taken: Vec<ObjectId> = (0..64).map(|n| ObjectId::intern(&format!("loaded_{n}"))).collect();
        let fresh = ObjectId::with_prefix("loaded");
        assert!(!taken.contains(&fresh));
    }

    #[test]
    fn serializes_as_plain_string() {
        let id = ObjectId::intern("line_42");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"line_42\"");
        let back: ObjectId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
