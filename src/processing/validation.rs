//! Field-level validation of JSON replies against the stage schemas

use crate::error::{JobMatcherError, Result};
use regex::Regex;
use serde_json::{Map, Value};
use std::collections::{BTreeSet, HashSet};
use std::sync::LazyLock;

static LEADING_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(-?\d+(?:\.\d+)?)").unwrap());

/// A reply field: its canonical name and any aliases accepted in its place.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Key {
    pub name: &'static str,
    pub aliases: &'static [&'static str],
}

impl Key {
    pub const fn with_aliases(name: &'static str, aliases: &'static [&'static str]) -> Self {
        Self { name, aliases }
    }

    fn candidates(self) -> impl Iterator<Item = &'static str> {
        std::iter::once(self.name).chain(self.aliases.iter().copied())
    }
}

impl From<&'static str> for Key {
    fn from(name: &'static str) -> Self {
        Self::with_aliases(name, &[])
    }
}

/// Borrowed view over a reply object, tagged with the schema it should satisfy.
pub struct Fields<'a> {
    schema: &'static str,
    map: &'a Map<String, Value>,
}

impl<'a> Fields<'a> {
    pub fn of(schema: &'static str, value: &'a Value) -> Result<Self> {
        value
            .as_object()
            .map(|map| Self { schema, map })
            .ok_or_else(|| {
                JobMatcherError::schema(schema, format!("expected a JSON object, got {}", kind(value)))
            })
    }

    /// First non-null value under the canonical name or, failing that, an alias.
    pub fn get(&self, key: impl Into<Key>) -> Option<&'a Value> {
        key.into()
            .candidates()
            .filter_map(|name| self.map.get(name))
            .find(|value| !value.is_null())
    }

    pub fn required_string(&self, key: impl Into<Key>) -> Result<String> {
        let key: Key = key.into();
        let value = self
            .get(key)
            .ok_or_else(|| self.error(format!("missing required field `{}`", key.name)))?;
        let text = self.as_string(key.name, value)?;

        if text.is_empty() {
            return Err(self.error(format!("field `{}` must not be empty", key.name)));
        }
        Ok(text)
    }

    /// Absent or null becomes an empty string.
    pub fn optional_string(&self, key: impl Into<Key>) -> Result<String> {
        let key: Key = key.into();
        match self.get(key) {
            Some(value) => self.as_string(key.name, value),
            None => Ok(String::new()),
        }
    }

    /// Absent or null becomes an empty list; entries are trimmed and blanks dropped.
    pub fn string_list(&self, key: impl Into<Key>) -> Result<Vec<String>> {
        let key: Key = key.into();
        let Some(value) = self.get(key) else {
            return Ok(Vec::new());
        };

        let items = value.as_array().ok_or_else(|| {
            self.error(format!("field `{}` must be a list, got {}", key.name, kind(value)))
        })?;

        let mut list = Vec::with_capacity(items.len());
        for item in items {
            let text = item.as_str().ok_or_else(|| {
                self.error(format!(
                    "field `{}` must contain only strings, found {}",
                    key.name,
                    kind(item)
                ))
            })?;
            let text = text.trim();
            if !text.is_empty() {
                list.push(text.to_string());
            }
        }
        Ok(list)
    }

    /// A number, or a string starting with one ("5+ years"), as a plain float.
    pub fn number(&self, key: impl Into<Key>) -> Result<Option<f64>> {
        let key: Key = key.into();
        let Some(value) = self.get(key) else {
            return Ok(None);
        };

        let number = match value {
            Value::Number(number) => number.as_f64(),
            Value::String(text) => leading_number(text),
            _ => None,
        };

        number.map(Some).ok_or_else(|| {
            self.error(format!("field `{}` must be a number, got {}", key.name, kind(value)))
        })
    }

    pub fn error(&self, message: String) -> JobMatcherError {
        JobMatcherError::schema(self.schema, message)
    }

    fn as_string(&self, key: &str, value: &Value) -> Result<String> {
        value
            .as_str()
            .map(|text| text.trim().to_string())
            .ok_or_else(|| self.error(format!("field `{}` must be a string, got {}", key, kind(value))))
    }
}

fn leading_number(text: &str) -> Option<f64> {
    LEADING_NUMBER
        .captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}

/// Remove case-insensitive duplicates, keeping the first spelling and order.
pub fn dedupe_ordered(items: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.to_lowercase()))
        .collect()
}

pub fn to_skill_set(items: Vec<String>) -> BTreeSet<String> {
    dedupe_ordered(items).into_iter().collect()
}
