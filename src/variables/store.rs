use super::Value;
use ahash::AHashMap;
use serde::{Deserialize, Serialize};

/// Variables of a single conversation run. Later writes overwrite earlier ones and
/// reads of an unset name never fail.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VariableStore {
    values: AHashMap<String, Value>,
}

impl VariableStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_map(values: AHashMap<String, Value>) -> Self {
        Self { values }
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// The stringified value, or the empty string when the variable is unset.
    pub fn get_text(&self, name: &str) -> String {
        self.values
            .get(name)
            .map(|v| v.to_string())
            .unwrap_or_default()
    }

    /// Resolves `name` or `name.path.to.field` against the store.
    pub fn resolve(&self, reference: &str) -> Option<&Value> {
        let mut segments = reference.split('.');
        let root = self.values.get(segments.next()?)?;
        root.lookup(segments)
    }

    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.values.remove(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.values.iter()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn into_map(self) -> AHashMap<String, Value> {
        self.values
    }
}
