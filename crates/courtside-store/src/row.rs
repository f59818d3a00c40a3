//! Rows and attribute values.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A typed attribute value. Numbers split into integer (`N`, used for
/// counters and unix timestamps, the only type `Add` applies to) and
/// float (`F`, used for coordinates).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AttrValue {
    /// String
    S(String),
    /// Integer
    N(i64),
    /// Float
    F(f64),
    /// Boolean
    Bool(bool),
}

/// One storage record addressed by `(pk, sk)`. Multiple logical entity
/// types share the table, distinguished by key prefixes and an
/// `entity_type` discriminator attribute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Row {
    /// Partition key
    pub pk: String,
    /// Sort key
    pub sk: String,
    /// Named attributes
    pub attrs: BTreeMap<String, AttrValue>,
}

impl Row {
    /// Create an empty row at a key.
    pub fn new(pk: impl Into<String>, sk: impl Into<String>) -> Self {
        Self {
            pk: pk.into(),
            sk: sk.into(),
            attrs: BTreeMap::new(),
        }
    }

    /// Builder-style attribute insertion.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: AttrValue) -> Self {
        self.attrs.insert(name.into(), value);
        self
    }

    /// Builder-style string attribute.
    #[must_use]
    pub fn with_s(self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.with(name, AttrValue::S(value.into()))
    }

    /// Builder-style integer attribute.
    #[must_use]
    pub fn with_n(self, name: impl Into<String>, value: i64) -> Self {
        self.with(name, AttrValue::N(value))
    }

    /// String attribute, if present and a string.
    pub fn get_s(&self, name: &str) -> Option<&str> {
        match self.attrs.get(name) {
            Some(AttrValue::S(v)) => Some(v),
            _ => None,
        }
    }

    /// Integer attribute, if present and an integer.
    pub fn get_n(&self, name: &str) -> Option<i64> {
        match self.attrs.get(name) {
            Some(AttrValue::N(v)) => Some(*v),
            _ => None,
        }
    }

    /// Float attribute; integer attributes widen.
    pub fn get_f(&self, name: &str) -> Option<f64> {
        match self.attrs.get(name) {
            Some(AttrValue::F(v)) => Some(*v),
            Some(AttrValue::N(v)) => Some(*v as f64),
            _ => None,
        }
    }

    /// Boolean attribute, if present and boolean.
    pub fn get_bool(&self, name: &str) -> Option<bool> {
        match self.attrs.get(name) {
            Some(AttrValue::Bool(v)) => Some(*v),
            _ => None,
        }
    }
}
