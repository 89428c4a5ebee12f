use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Current string value of every control in a form, in control order.
///
/// Inserting a name that is already present replaces its value in place, which matches how
/// browsers collapse repeated control names when a form is read into an object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(into = "serde_json::Map<String, Value>")]
pub struct RawFormValues {
    entries: Vec<(String, String)>,
}

impl RawFormValues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(existing, _)| *existing == name) {
            Some((_, slot)) => *slot = value,
            None => self.entries.push((name, value)),
        }
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn remove(&mut self, name: &str) -> Option<String> {
        let index = self.entries.iter().position(|(existing, _)| existing == name)?;
        Some(self.entries.remove(index).1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Parse a `name=value` pair as typed on a command line.
    pub fn parse_pair(raw: &str) -> Result<(String, String), String> {
        match raw.split_once('=') {
            Some((name, value)) if !name.trim().is_empty() => {
                Ok((name.trim().to_string(), value.to_string()))
            }
            _ => Err(format!("expected NAME=VALUE, found '{raw}'")),
        }
    }
}

impl<K, V> FromIterator<(K, V)> for RawFormValues
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut values = Self::new();
        for (name, value) in iter {
            values.insert(name, value);
        }
        values
    }
}

impl From<RawFormValues> for serde_json::Map<String, Value> {
    fn from(values: RawFormValues) -> Self {
        values
            .entries
            .into_iter()
            .map(|(name, value)| (name, Value::String(value)))
            .collect()
    }
}

fn textual(value: Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text,
        Value::Bool(flag) => flag.to_string(),
        Value::Number(number) => number.to_string(),
        other => other.to_string(),
    }
}

struct RawFormValuesVisitor;

impl<'de> Visitor<'de> for RawFormValuesVisitor {
    type Value = RawFormValues;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("an object mapping field names to scalar values")
    }

    fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut values = RawFormValues::new();
        while let Some((name, value)) = access.next_entry::<String, Value>()? {
            values.insert(name, textual(value));
        }
        Ok(values)
    }
}

impl<'de> Deserialize<'de> for RawFormValues {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(RawFormValuesVisitor)
    }
}
