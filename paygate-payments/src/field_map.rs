//! Ordered protocol field storage

use serde::{Deserialize, Serialize};

/// Field names shared by the built-in gateways
pub mod names {
    pub const TRXTYPE: &str = "TRXTYPE";
    pub const TENDER: &str = "TENDER";
    pub const AMT: &str = "AMT";
    pub const ACCT: &str = "ACCT";
    pub const EXPDATE: &str = "EXPDATE";
    pub const CVV2: &str = "CVV2";
    pub const ORIGID: &str = "ORIGID";
    pub const COMMENT1: &str = "COMMENT1";
    pub const USER: &str = "USER";
    pub const VENDOR: &str = "VENDOR";
    pub const PARTNER: &str = "PARTNER";
    pub const PWD: &str = "PWD";
    pub const VERBOSITY: &str = "VERBOSITY";

    pub const RESULT: &str = "RESULT";
    pub const PNREF: &str = "PNREF";
    pub const RESPMSG: &str = "RESPMSG";
    pub const AUTHCODE: &str = "AUTHCODE";
}

/// Insertion-ordered mapping of case-sensitive field name to value.
///
/// Setting an existing name replaces its value in place, so serialization
/// order follows first insertion: gateway defaults, then the operation code,
/// then caller fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldMap {
    entries: Vec<(String, String)>,
}

impl FieldMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite a field, returning the previous value.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) -> Option<String> {
        let name = name.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => Some(std::mem::replace(existing, value)),
            None => {
                self.entries.push((name, value));
                None
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|(n, _)| n == name)
    }

    /// Present with a non-empty value.
    pub fn is_filled(&self, name: &str) -> bool {
        self.get(name).is_some_and(|v| !v.is_empty())
    }

    pub fn remove(&mut self, name: &str) -> Option<String> {
        let index = self.entries.iter().position(|(n, _)| n == name)?;
        Some(self.entries.remove(index).1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FieldMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = FieldMap::new();
        for (k, v) in iter {
            map.set(k, v);
        }
        map
    }
}

impl<K: Into<String>, V: Into<String>> Extend<(K, V)> for FieldMap {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.set(k, v);
        }
    }
}

impl IntoIterator for FieldMap {
    type Item = (String, String);
    type IntoIter = std::vec::IntoIter<(String, String)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
