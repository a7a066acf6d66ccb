//! Fact extraction: pulls high-confidence personal details (name, email,
//! phone, location) out of recent user turns so the model is not asked for
//! them twice.
//!
//! Pure and synchronous. Regexes are compiled once and shared read-only.

pub mod extractor;
pub mod rules;

use serde::ser::{Serialize, SerializeMap, Serializer};

pub use extractor::{extract_facts, validate_email, validate_phone};

/// Header line of the prompt block produced by [`build_facts_context`].
pub const FACTS_HEADER: &str = "---OBSERVED FACTS (already provided by user)---";
/// Footer of the prompt block produced by [`build_facts_context`].
pub const FACTS_FOOTER: &str = "---\n";

/// The four personal-data categories the extractor resolves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FactKey {
    Name,
    Email,
    Phone,
    Location,
}

impl FactKey {
    pub const ALL: [FactKey; 4] = [
        FactKey::Name,
        FactKey::Email,
        FactKey::Phone,
        FactKey::Location,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FactKey::Name => "name",
            FactKey::Email => "email",
            FactKey::Phone => "phone",
            FactKey::Location => "location",
        }
    }
}

/// At most one value per [`FactKey`], kept in insertion order.
///
/// The first value recorded for a key wins; later inserts for the same key
/// are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FactSet {
    entries: Vec<(FactKey, String)>,
}

impl FactSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: FactKey) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, key: FactKey) -> bool {
        self.get(key).is_some()
    }

    /// Records `value` under `key` unless the key is already set.
    /// Returns whether the value was stored.
    pub fn insert_if_absent(&mut self, key: FactKey, value: String) -> bool {
        if self.contains(key) {
            return false;
        }
        self.entries.push((key, value));
        true
    }

    pub fn iter(&self) -> impl Iterator<Item = (FactKey, &str)> {
        self.entries.iter().map(|(k, v)| (*k, v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// True once every fact key has a value.
    pub fn is_complete(&self) -> bool {
        FactKey::ALL.iter().all(|k| self.contains(*k))
    }
}

impl Serialize for FactSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key.as_str(), value)?;
        }
        map.end()
    }
}

/// Formats facts as a block for verbatim inclusion in a prompt.
/// Returns an empty string when there is nothing to report.
pub fn build_facts_context(facts: &FactSet) -> String {
    if facts.is_empty() {
        return String::new();
    }

    let mut lines = Vec::with_capacity(facts.len() + 2);
    lines.push(FACTS_HEADER.to_string());
    for (key, value) in facts.iter() {
        lines.push(format!("{}: {}", key.as_str(), value));
    }
    lines.push(FACTS_FOOTER.to_string());
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_facts_build_empty_context() {
        assert_eq!(build_facts_context(&FactSet::new()), "");
    }

    #[test]
    fn test_context_block_layout() {
        let mut facts = FactSet::new();
        facts.insert_if_absent(FactKey::Name, "Jane Doe".to_string());
        facts.insert_if_absent(FactKey::Email, "jane@example.com".to_string());

        let ctx = build_facts_context(&facts);
        assert_eq!(
            ctx,
            "---OBSERVED FACTS (already provided by user)---\n\
             name: Jane Doe\n\
             email: jane@example.com\n\
             ---\n"
        );
    }

    #[test]
    fn test_context_follows_insertion_order() {
        let mut facts = FactSet::new();
        facts.insert_if_absent(FactKey::Location, "Austin, TX".to_string());
        facts.insert_if_absent(FactKey::Name, "Jane Doe".to_string());

        let ctx = build_facts_context(&facts);
        let location_at = ctx.find("location:").unwrap();
        let name_at = ctx.find("name:").unwrap();
        assert!(location_at < name_at);
    }

    #[test]
    fn test_first_value_wins() {
        let mut facts = FactSet::new();
        assert!(facts.insert_if_absent(FactKey::Phone, "5551234567".to_string()));
        assert!(!facts.insert_if_absent(FactKey::Phone, "5559999999".to_string()));
        assert_eq!(facts.get(FactKey::Phone), Some("5551234567"));
        assert_eq!(facts.len(), 1);
    }

    #[test]
    fn test_is_complete() {
        let mut facts = FactSet::new();
        for key in FactKey::ALL {
            assert!(!facts.is_complete());
            facts.insert_if_absent(key, "x".to_string());
        }
        assert!(facts.is_complete());
    }

    #[test]
    fn test_serializes_as_ordered_map() {
        let mut facts = FactSet::new();
        facts.insert_if_absent(FactKey::Email, "a@b.co".to_string());
        facts.insert_if_absent(FactKey::Name, "Ada Lovelace".to_string());
        let json = serde_json::to_string(&facts).unwrap();
        assert_eq!(json, r#"{"email":"a@b.co","name":"Ada Lovelace"}"#);
    }
}
