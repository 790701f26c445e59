//! Source identifiers

use core::borrow::Borrow;
use core::fmt;

use uuid::Uuid;

/// Opaque identifier of a noise source
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SourceId(String);

impl SourceId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for SourceId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl AsRef<str> for SourceId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// Lets maps keyed by `SourceId` be queried with a plain `&str`
impl Borrow<str> for SourceId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Produces a fresh, never repeated id on each call
pub trait IdProvider {
    fn next_id(&mut self) -> SourceId;
}

/// Random UUID v4 ids
#[derive(Clone, Copy, Debug, Default)]
pub struct UuidProvider;

impl IdProvider for UuidProvider {
    fn next_id(&mut self) -> SourceId {
        SourceId(Uuid::new_v4().to_string())
    }
}

/// Deterministic `"{prefix}-{n}"` ids, counting from 0
#[derive(Clone, Debug)]
pub struct SequentialIds {
    prefix: String,
    next: u64,
}

impl SequentialIds {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: 0,
        }
    }
}

impl IdProvider for SequentialIds {
    fn next_id(&mut self) -> SourceId {
        let id = format!("{}-{}", self.prefix, self.next);
        self.next += 1;
        SourceId(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequential_ids_count_up() {
        let mut ids = SequentialIds::new("src");
        assert_eq!(ids.next_id().as_str(), "src-0");
        assert_eq!(ids.next_id().as_str(), "src-1");
    }

    #[test]
    fn uuids_are_unique() {
        let mut ids = UuidProvider;
        let a = ids.next_id();
        let b = ids.next_id();
        assert_ne!(a, b);
        assert!(Uuid::parse_str(a.as_str()).is_ok());
    }
}
