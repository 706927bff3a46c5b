//! The analytics event record model.
//!
//! An [`EventRecord`] is an open string-to-string mapping. No schema is
//! imposed on the fields so records pass through the export stage exactly as
//! the upstream API produced them.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::collections::btree_map;

/// Key that conventionally holds the unique identifier of an event.
pub const EVENT_ID_KEY: &str = "id";

/// One analytics event.
///
/// Serializes as a flat JSON object with string values. Fields are kept in a
/// [`BTreeMap`], so the encoded key order is lexicographic and two equal
/// records always encode to identical bytes. `<`, `>` and `&` are written
/// literally rather than as `\u003c`-style escapes.
///
/// # Examples
///
/// ```
/// use mixport_exports::EventRecord;
///
/// let mut event = EventRecord::with_event_id("42");
/// event.insert("event", "signup");
///
/// assert_eq!(event.event_id(), Some("42"));
/// assert_eq!(
///     serde_json::to_string(&event).unwrap(),
///     r#"{"event":"signup","id":"42"}"#
/// );
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventRecord {
    fields: BTreeMap<String, String>,
}

impl EventRecord {
    /// Creates an empty record.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a record holding only the event identifier.
    #[must_use]
    pub fn with_event_id(id: impl Into<String>) -> Self {
        let mut record = Self::new();
        record.insert(EVENT_ID_KEY, id);
        record
    }

    /// Sets a field, returning the previous value if the key was present.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.fields.insert(key.into(), value.into())
    }

    /// Returns the value of a field.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    /// Removes a field, returning its value.
    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.fields.remove(key)
    }

    /// Returns `true` if the record has a field named `key`.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    /// Returns the event identifier stored under [`EVENT_ID_KEY`].
    #[must_use]
    pub fn event_id(&self) -> Option<&str> {
        self.get(EVENT_ID_KEY)
    }

    /// Number of fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns `true` if the record has no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterates over `(key, value)` pairs in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Consumes the record, returning the underlying map.
    #[must_use]
    pub fn into_inner(self) -> BTreeMap<String, String> {
        self.fields
    }
}

impl From<BTreeMap<String, String>> for EventRecord {
    fn from(fields: BTreeMap<String, String>) -> Self {
        Self { fields }
    }
}

impl<K, V> FromIterator<(K, V)> for EventRecord
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = Self::new();
        record.extend(iter);
        record
    }
}

impl<K, V> Extend<(K, V)> for EventRecord
where
    K: Into<String>,
    V: Into<String>,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        self.fields
            .extend(iter.into_iter().map(|(k, v)| (k.into(), v.into())));
    }
}

impl IntoIterator for EventRecord {
    type Item = (String, String);
    type IntoIter = btree_map::IntoIter<String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.into_iter()
    }
}
