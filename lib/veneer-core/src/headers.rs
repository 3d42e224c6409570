//! Case-insensitive, insertion-ordered header map.
//!
//! Header names are normalized to their canonical form (`content-type` becomes
//! `Content-Type`), so lookups ignore case and a later insert of the same name
//! replaces the earlier value in place.
//!
//! # Example
//!
//! ```
//! use veneer_core::Headers;
//!
//! let mut headers = Headers::new();
//! headers.insert("user-agent", "first");
//! headers.insert("USER-AGENT", "second");
//!
//! assert_eq!(headers.get("User-Agent"), Some("second"));
//! assert_eq!(headers.len(), 1);
//! ```

use std::fmt;

/// Header names that are used by the pipeline itself.
pub mod names {
    /// `Authorization`.
    pub const AUTHORIZATION: &str = "Authorization";
    /// `Content-Type`.
    pub const CONTENT_TYPE: &str = "Content-Type";
    /// `User-Agent`.
    pub const USER_AGENT: &str = "User-Agent";
}

/// Ordered header mapping with case-insensitive, last-write-wins keys.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Headers {
    entries: Vec<(String, String)>,
}

impl Headers {
    /// Creates an empty header map.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Sets a header, replacing any previous value for the same name.
    ///
    /// Returns the replaced value, if any.
    pub fn insert(&mut self, name: impl AsRef<str>, value: impl Into<String>) -> Option<String> {
        let name = canonical_name(name.as_ref());
        let value = value.into();

        match self.entries.iter_mut().find(|(key, _)| *key == name) {
            Some((_, existing)) => Some(std::mem::replace(existing, value)),
            None => {
                self.entries.push((name, value));
                None
            }
        }
    }

    /// Returns the value for `name`, ignoring case.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        let name = canonical_name(name);
        self.entries
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Returns `true` if a header with this name is present.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Removes a header, returning its value.
    pub fn remove(&mut self, name: &str) -> Option<String> {
        let name = canonical_name(name);
        let index = self.entries.iter().position(|(key, _)| *key == name)?;
        Some(self.entries.remove(index).1)
    }

    /// Number of headers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if there are no headers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over `(name, value)` pairs in insertion order.
    #[must_use]
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            inner: self.entries.iter(),
        }
    }
}

/// Iterator over header `(name, value)` pairs.
#[derive(Debug, Clone)]
pub struct Iter<'a> {
    inner: std::slice::Iter<'a, (String, String)>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = (&'a str, &'a str);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner
            .next()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl fmt::Debug for Headers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K, V> FromIterator<(K, V)> for Headers
where
    K: AsRef<str>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut headers = Self::new();
        headers.extend(iter);
        headers
    }
}

impl<K, V> Extend<(K, V)> for Headers
where
    K: AsRef<str>,
    V: Into<String>,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (name, value) in iter {
            self.insert(name, value);
        }
    }
}

impl<'a> IntoIterator for &'a Headers {
    type Item = (&'a str, &'a str);
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Canonical form of a header name: each dash-separated word capitalized.
#[must_use]
pub fn canonical_name(name: &str) -> String {
    let mut canonical = String::with_capacity(name.len());
    let mut upper = true;
    for ch in name.trim().chars() {
        canonical.push(if upper {
            ch.to_ascii_uppercase()
        } else {
            ch.to_ascii_lowercase()
        });
        upper = ch == '-';
    }
    canonical
}
