//! The parameter multimap attached to every property.

use encoding_rs::Encoding;

use crate::codec::{self, CharsetError};

/// A multimap holding the parameters of a property.
///
/// Keys are case-insensitive and stored in upper-case ASCII; the insertion
/// order of keys is preserved. The `None` key holds legacy nameless
/// parameter values (e.g. the value-only `;QUOTED-PRINTABLE` form of
/// old-style syntax).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Parameters {
    entries: Vec<(Option<String>, Vec<String>)>,
}

impl Parameters {
    /// Creates an empty parameter list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the values assigned to a key, or `None` if the key does not
    /// exist.
    #[must_use]
    pub fn values(&self, key: Option<&str>) -> Option<&[String]> {
        let key = sanitize_key(key);
        self.entries
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, values)| values.as_slice())
    }

    /// Returns the first value assigned to a key.
    #[must_use]
    pub fn first(&self, key: Option<&str>) -> Option<&str> {
        self.values(key)
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    /// Inserts a value under a key.
    pub fn put(&mut self, key: Option<&str>, value: impl Into<String>) {
        let key = sanitize_key(key);
        self.entry_mut(key).push(value.into());
    }

    /// Inserts multiple values under a key. Does nothing if `values` is
    /// empty.
    pub fn put_all<I, S>(&mut self, key: Option<&str>, values: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut values = values.into_iter().peekable();
        if values.peek().is_none() {
            return;
        }
        let key = sanitize_key(key);
        self.entry_mut(key).extend(values.map(Into::into));
    }

    /// Replaces all values of a key with a single value.
    ///
    /// Returns the replaced values, or `None` if the key did not exist.
    pub fn replace(&mut self, key: Option<&str>, value: impl Into<String>) -> Option<Vec<String>> {
        let replaced = self.remove_all(key);
        self.put(key, value);
        replaced
    }

    /// Replaces all values of a key with the given values. An empty `values`
    /// removes the key.
    ///
    /// Returns the replaced values, or `None` if the key did not exist.
    pub fn replace_all<I, S>(&mut self, key: Option<&str>, values: I) -> Option<Vec<String>>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let replaced = self.remove_all(key);
        self.put_all(key, values);
        replaced
    }

    /// Removes a single value from a key.
    ///
    /// Returns whether the value was found.
    pub fn remove(&mut self, key: Option<&str>, value: &str) -> bool {
        let key = sanitize_key(key);
        let Some((_, values)) = self.entries.iter_mut().find(|(k, _)| *k == key) else {
            return false;
        };
        let Some(index) = values.iter().position(|v| v == value) else {
            return false;
        };
        values.remove(index);
        true
    }

    /// Removes a key along with all of its values.
    ///
    /// Returns the removed values, or `None` if the key did not exist.
    pub fn remove_all(&mut self, key: Option<&str>) -> Option<Vec<String>> {
        let key = sanitize_key(key);
        let index = self.entries.iter().position(|(k, _)| *k == key)?;
        Some(self.entries.remove(index).1)
    }

    /// Removes all parameters.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Returns the number of keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns whether there are no parameters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over the keys and their values in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (Option<&str>, &[String])> + '_ {
        self.entries
            .iter()
            .map(|(key, values)| (key.as_deref(), values.as_slice()))
    }

    /// Determines if a quoted-printable encoding parameter exists.
    ///
    /// Both the `ENCODING=QUOTED-PRINTABLE` form and the legacy nameless
    /// `;QUOTED-PRINTABLE` form are recognized, case-insensitively.
    #[must_use]
    pub fn is_quoted_printable(&self) -> bool {
        [Some("ENCODING"), None].into_iter().any(|key| {
            self.values(key).is_some_and(|values| {
                values
                    .iter()
                    .any(|v| v.eq_ignore_ascii_case("QUOTED-PRINTABLE"))
            })
        })
    }

    /// Looks up the character set named by the CHARSET parameter.
    ///
    /// Returns `Ok(None)` when no CHARSET parameter is present.
    ///
    /// ## Errors
    /// Returns [`CharsetError::IllegalName`] if the charset name is
    /// malformed, or [`CharsetError::Unsupported`] if it is not a known
    /// character set.
    pub fn charset(&self) -> Result<Option<&'static Encoding>, CharsetError> {
        match self.first(Some("CHARSET")) {
            Some(label) => codec::lookup_charset(label).map(Some),
            None => Ok(None),
        }
    }

    fn entry_mut(&mut self, key: Option<String>) -> &mut Vec<String> {
        if let Some(index) = self.entries.iter().position(|(k, _)| *k == key) {
            &mut self.entries[index].1
        } else {
            self.entries.push((key, Vec::new()));
            &mut self.entries.last_mut().expect("just pushed").1
        }
    }
}

fn sanitize_key(key: Option<&str>) -> Option<String> {
    key.map(str::to_ascii_uppercase)
}
