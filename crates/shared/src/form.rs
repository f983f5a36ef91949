//! Turns submitted form fields into a key/value object and then into
//! [`EventFields`].

use std::collections::BTreeMap;

use crate::domain::event::EventFields;
use crate::error::ValidationError;

const ARRAY_SUFFIX: &str = "[]";
const BLOCKED_KEYS: [&str; 3] = ["__proto__", "prototype", "constructor"];

pub const INVALID_JSON_MESSAGE: &str = "Invalid JSON data format";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormValue {
    Text(String),
    File(UploadedFile),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormEntry {
    Single(FormValue),
    Many(Vec<FormValue>),
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FormObject(BTreeMap<String, FormEntry>);

impl FormObject {
    /// Keys ending in `[]` lose the suffix and always collect into a list.
    /// A plain key seen twice is promoted to a list. Reserved prototype
    /// names are dropped.
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (String, FormValue)>,
    {
        let mut map: BTreeMap<String, FormEntry> = BTreeMap::new();
        for (key, value) in pairs {
            let (key, is_array) = match key.strip_suffix(ARRAY_SUFFIX) {
                Some(stripped) => (stripped.to_string(), true),
                None => (key, false),
            };
            if BLOCKED_KEYS.contains(&key.as_str()) {
                continue;
            }
            match map.remove(&key) {
                Some(FormEntry::Single(prev)) => map.insert(key, FormEntry::Many(vec![prev, value])),
                Some(FormEntry::Many(mut values)) => {
                    values.push(value);
                    map.insert(key, FormEntry::Many(values))
                }
                None if is_array => map.insert(key, FormEntry::Many(vec![value])),
                None => map.insert(key, FormEntry::Single(value)),
            };
        }
        Self(map)
    }

    pub fn get(&self, key: &str) -> Option<&FormEntry> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn file(&self, key: &str) -> Option<&UploadedFile> {
        let value = match self.get(key)? {
            FormEntry::Single(v) => v,
            FormEntry::Many(values) => values.first()?,
        };
        match value {
            FormValue::File(f) => Some(f),
            FormValue::Text(_) => None,
        }
    }

    fn text(&self, key: &str) -> Result<Option<String>, ValidationError> {
        match self.get(key) {
            None => Ok(None),
            Some(FormEntry::Single(FormValue::Text(s))) => Ok(Some(s.clone())),
            Some(FormEntry::Single(FormValue::File(_))) => {
                Err(ValidationError::Malformed(format!("Field '{key}' must be text")))
            }
            Some(FormEntry::Many(_)) => {
                Err(ValidationError::Malformed(format!("Field '{key}' must have a single value")))
            }
        }
    }

    /// A single text value holding a JSON array is decoded; any other
    /// single value becomes a one-item list.
    fn list(&self, key: &str) -> Result<Option<Vec<String>>, ValidationError> {
        let values = match self.get(key) {
            None => return Ok(None),
            Some(FormEntry::Single(FormValue::Text(s))) if s.trim_start().starts_with('[') => {
                return serde_json::from_str::<Vec<String>>(s)
                    .map(Some)
                    .map_err(|_| ValidationError::Malformed(INVALID_JSON_MESSAGE.into()));
            }
            Some(FormEntry::Single(v)) => std::slice::from_ref(v),
            Some(FormEntry::Many(values)) => values.as_slice(),
        };
        values
            .iter()
            .map(|v| match v {
                FormValue::Text(s) => Ok(s.clone()),
                FormValue::File(_) => Err(ValidationError::Malformed(format!("Field '{key}' must be text"))),
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Some)
    }

    /// The `image` entry is not read here; it is uploaded separately and its
    /// URL filled in by the caller.
    pub fn event_fields(&self) -> Result<EventFields, ValidationError> {
        Ok(EventFields {
            title: self.text("title")?,
            description: self.text("description")?,
            overview: self.text("overview")?,
            image: None,
            venue: self.text("venue")?,
            location: self.text("location")?,
            date: self.text("date")?,
            time: self.text("time")?,
            mode: self.text("mode")?,
            audience: self.text("audience")?,
            agenda: self.list("agenda")?,
            organizer: self.text("organizer")?,
            tags: self.list("tags")?,
        })
    }
}
