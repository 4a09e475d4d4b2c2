//! Parsing and writing of composite property values.
//!
//! Four shapes of composite values share the same backslash escape
//! convention (`\\`, `\;`, `\,`, and `\n`/`\N` for a newline):
//!
//! - **list** values: comma-separated, order usually does not matter
//!   (e.g. CATEGORIES);
//! - **semi-structured** values: semicolon-separated, order matters, no
//!   nested sub-values (e.g. AGENT);
//! - **structured** values: semicolon-separated components, each holding a
//!   comma-separated list of sub-values (e.g. N, ADR);
//! - **multimap** values: semicolon-separated `KEY=v1,v2` pairs with
//!   upper-cased keys.
//!
//! These helpers operate on the property value after line unfolding; they
//! are orthogonal to the reader and writer.

/// The newline sequence produced when unescaping `\n`.
const NEWLINE: &str = if cfg!(windows) { "\r\n" } else { "\n" };

/// Unescapes all escaped characters in a property value.
///
/// `\n` and `\N` become the local newline sequence; `\\`, `\,`, and `\;`
/// drop their backslash. Any other escape passes both characters through
/// verbatim.
///
/// ```rust
/// use vobject_stream::values::unescape;
///
/// assert_eq!(unescape(r"one\,two\;three\nfour"), "one,two;three\nfour");
/// ```
#[must_use]
pub fn unescape(value: &str) -> String {
    let mut result = String::with_capacity(value.len());
    let mut chars = value.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            result.push(c);
            continue;
        }
        match chars.next() {
            Some('n' | 'N') => result.push_str(NEWLINE),
            Some(next @ ('\\' | ',' | ';')) => result.push(next),
            Some(next) => {
                result.push('\\');
                result.push(next);
            }
            None => result.push('\\'),
        }
    }

    result
}

/// Escapes the special characters in a property value: backslashes,
/// commas, and semicolons.
///
/// Newlines are not escaped here; the writer escapes or encodes them
/// according to the dialect when the property is serialized.
///
/// ```rust
/// use vobject_stream::values::escape;
///
/// assert_eq!(escape("one,two;three\nfour"), "one\\,two\\;three\nfour");
/// ```
#[must_use]
pub fn escape(value: &str) -> String {
    let mut result = String::with_capacity(value.len());
    escape_into(value, true, &mut result);
    result
}

fn escape_into(value: &str, escape_commas: bool, result: &mut String) {
    for c in value.chars() {
        if c == '\\' || c == ';' || (escape_commas && c == ',') {
            result.push('\\');
        }
        result.push(c);
    }
}

/// Parses a "list" property value: values separated by unescaped commas.
/// An empty input yields an empty list.
#[must_use]
pub fn parse_list(value: &str) -> Vec<String> {
    split(value, ',', 0)
}

/// Writes a "list" property value. Absent values emit the literal text
/// `null`.
#[must_use]
pub fn write_list<S: AsRef<str>>(values: &[Option<S>]) -> String {
    let mut result = String::new();
    for (index, value) in values.iter().enumerate() {
        if index > 0 {
            result.push(',');
        }
        match value {
            Some(value) => escape_into(value.as_ref(), true, &mut result),
            None => result.push_str("null"),
        }
    }
    result
}

/// Parses a "semi-structured" property value: values separated by
/// unescaped semicolons, with no nested sub-values.
#[must_use]
pub fn parse_semi_structured(value: &str) -> Vec<String> {
    split(value, ';', 0)
}

/// Parses a "semi-structured" property value, stopping after `limit`
/// values; the last value keeps its remaining semicolons unsplit (but
/// still unescaped). A limit of 0 parses all values.
///
/// ```rust
/// use vobject_stream::values::parse_semi_structured_limit;
///
/// let values = parse_semi_structured_limit("one;two;three", 2);
/// assert_eq!(values, vec!["one", "two;three"]);
/// ```
#[must_use]
pub fn parse_semi_structured_limit(value: &str, limit: usize) -> Vec<String> {
    split(value, ';', limit)
}

/// Writes a "semi-structured" property value.
///
/// `escape_commas` is off for old-style data, which does not expect commas
/// to be escaped in semi-structured values. When
/// `include_trailing_semicolons` is off, the delimiters of empty values at
/// the end of the list are trimmed.
#[must_use]
pub fn write_semi_structured<S: AsRef<str>>(
    values: &[S],
    escape_commas: bool,
    include_trailing_semicolons: bool,
) -> String {
    let mut result = String::new();
    for (index, value) in values.iter().enumerate() {
        if index > 0 {
            result.push(';');
        }
        escape_into(value.as_ref(), escape_commas, &mut result);
    }

    if !include_trailing_semicolons {
        trim_trailing_semicolons(&mut result);
    }
    result
}

/// Parses a "structured" property value: components separated by
/// semicolons, each component a comma-separated list of sub-values.
///
/// A component consisting of a single empty sub-value is represented as an
/// empty component.
///
/// ```rust
/// use vobject_stream::values::parse_structured;
///
/// let components = parse_structured(r"one;two,three;four\,five\;six");
/// assert_eq!(components, vec![
///     vec!["one".to_string()],
///     vec!["two".to_string(), "three".to_string()],
///     vec!["four,five;six".to_string()],
/// ]);
/// ```
#[must_use]
pub fn parse_structured(value: &str) -> Vec<Vec<String>> {
    if value.is_empty() {
        return Vec::new();
    }

    let mut components = Vec::new();
    let mut component: Vec<String> = Vec::new();
    let mut escaped = false;
    let mut cursor = 0;

    for (i, c) in value.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }

        match c {
            ';' => {
                let sub_value = unescape(&value[cursor..i]);
                if !(component.is_empty() && sub_value.is_empty()) {
                    component.push(sub_value);
                }
                components.push(std::mem::take(&mut component));
                cursor = i + 1;
            }
            ',' => {
                component.push(unescape(&value[cursor..i]));
                cursor = i + 1;
            }
            '\\' => escaped = true,
            _ => {}
        }
    }

    let sub_value = unescape(&value[cursor..]);
    if !(component.is_empty() && sub_value.is_empty()) {
        component.push(sub_value);
    }
    components.push(component);

    components
}

/// Writes a "structured" property value.
///
/// Absent sub-values emit the literal text `null`. When
/// `include_trailing_semicolons` is off, the delimiters of empty
/// components at the end are trimmed.
#[must_use]
pub fn write_structured<S: AsRef<str>>(
    components: &[Vec<Option<S>>],
    include_trailing_semicolons: bool,
) -> String {
    let mut result = String::new();

    for (index, component) in components.iter().enumerate() {
        if index > 0 {
            result.push(';');
        }

        for (value_index, value) in component.iter().enumerate() {
            if value_index > 0 {
                result.push(',');
            }
            match value {
                Some(value) => escape_into(value.as_ref(), true, &mut result),
                None => result.push_str("null"),
            }
        }
    }

    if !include_trailing_semicolons {
        trim_trailing_semicolons(&mut result);
    }
    result
}

/// Parses a "multimap" property value: semicolon-separated `KEY=v1,v2`
/// pairs.
///
/// Keys are upper-cased; key insertion order is preserved; repeated keys
/// accumulate their values. A key without `=` is stored with a single
/// empty value, and empty keys are skipped.
#[must_use]
pub fn parse_multimap(value: &str) -> Vec<(String, Vec<String>)> {
    if value.is_empty() {
        return Vec::new();
    }

    let mut multimap: Vec<(String, Vec<String>)> = Vec::new();
    let mut cur_name: Option<String> = None;
    let mut cur_values: Vec<String> = Vec::new();
    let mut escaped = false;
    let mut cursor = 0;

    for (i, c) in value.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }

        match c {
            ';' => {
                let name = match cur_name.take() {
                    Some(name) => {
                        cur_values.push(unescape(&value[cursor..i]));
                        name
                    }
                    None => unescape(&value[cursor..i]).to_ascii_uppercase(),
                };
                commit_multimap_entry(&mut multimap, name, std::mem::take(&mut cur_values));
                cursor = i + 1;
            }
            '=' => {
                if cur_name.is_none() {
                    cur_name = Some(unescape(&value[cursor..i]).to_ascii_uppercase());
                    cursor = i + 1;
                }
            }
            ',' => {
                cur_values.push(unescape(&value[cursor..i]));
                cursor = i + 1;
            }
            '\\' => escaped = true,
            _ => {}
        }
    }

    let name = match cur_name.take() {
        Some(name) => {
            cur_values.push(unescape(&value[cursor..]));
            name
        }
        None => unescape(&value[cursor..]).to_ascii_uppercase(),
    };
    commit_multimap_entry(&mut multimap, name, cur_values);

    multimap
}

fn commit_multimap_entry(
    multimap: &mut Vec<(String, Vec<String>)>,
    name: String,
    mut values: Vec<String>,
) {
    if name.is_empty() {
        return;
    }
    if values.is_empty() {
        values.push(String::new());
    }
    if let Some((_, existing)) = multimap.iter_mut().find(|(key, _)| *key == name) {
        existing.extend(values);
    } else {
        multimap.push((name, values));
    }
}

/// Writes a "multimap" property value. Keys are upper-cased; absent values
/// emit the literal text `null`; an entry with no values writes just its
/// bare key, with no `=`.
#[must_use]
pub fn write_multimap<S: AsRef<str>>(entries: &[(S, Vec<Option<S>>)]) -> String {
    let mut result = String::new();

    for (index, (key, values)) in entries.iter().enumerate() {
        if index > 0 {
            result.push(';');
        }
        escape_into(&key.as_ref().to_ascii_uppercase(), true, &mut result);

        if values.is_empty() {
            continue;
        }
        result.push('=');

        for (value_index, value) in values.iter().enumerate() {
            if value_index > 0 {
                result.push(',');
            }
            match value {
                Some(value) => escape_into(value.as_ref(), true, &mut result),
                None => result.push_str("null"),
            }
        }
    }

    result
}

fn trim_trailing_semicolons(result: &mut String) {
    let trimmed = result.trim_end_matches(';').len();
    result.truncate(trimmed);
}

/// Splits on an unescaped delimiter, unescaping each piece. A limit of 0
/// splits everywhere; otherwise splitting stops once `limit - 1` splits
/// have been made.
fn split(value: &str, delimiter: char, limit: usize) -> Vec<String> {
    if value.is_empty() {
        return Vec::new();
    }

    let mut list = Vec::new();
    let mut escaped = false;
    let mut cursor = 0;

    for (i, c) in value.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }

        if c == delimiter {
            list.push(unescape(&value[cursor..i]));
            cursor = i + c.len_utf8();
            if limit > 0 && list.len() == limit - 1 {
                break;
            }
            continue;
        }

        if c == '\\' {
            escaped = true;
        }
    }

    list.push(unescape(&value[cursor..]));
    list
}

/// Iterates over the values of a "semi-structured" property value.
///
/// Empty values come back as `None`.
#[derive(Debug)]
pub struct SemiStructuredValueIterator {
    values: std::vec::IntoIter<String>,
}

impl SemiStructuredValueIterator {
    /// Parses a semi-structured value and iterates over all of its values.
    #[must_use]
    pub fn new(value: &str) -> Self {
        Self {
            values: parse_semi_structured(value).into_iter(),
        }
    }

    /// Parses at most `limit` values; the last value keeps its remaining
    /// semicolons.
    #[must_use]
    pub fn with_limit(value: &str, limit: usize) -> Self {
        Self {
            values: parse_semi_structured_limit(value, limit).into_iter(),
        }
    }

    /// The next value, or `None` when the value is empty or the iterator
    /// is exhausted (see [`has_next`](Self::has_next)).
    pub fn next_value(&mut self) -> Option<String> {
        let next = self.values.next()?;
        (!next.is_empty()).then_some(next)
    }

    /// Whether there are more values.
    #[must_use]
    pub fn has_next(&self) -> bool {
        !self.values.as_slice().is_empty()
    }
}

/// Builds a "semi-structured" property value.
#[derive(Debug, Default)]
pub struct SemiStructuredValueBuilder {
    values: Vec<String>,
}

impl SemiStructuredValueBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a value. `None` appends an empty value.
    pub fn append(&mut self, value: Option<impl Into<String>>) -> &mut Self {
        self.values.push(value.map(Into::into).unwrap_or_default());
        self
    }

    /// Builds the value string; see [`write_semi_structured`].
    #[must_use]
    pub fn build(&self, escape_commas: bool, include_trailing_semicolons: bool) -> String {
        write_semi_structured(&self.values, escape_commas, include_trailing_semicolons)
    }
}

/// Iterates over the components of a "structured" property value.
#[derive(Debug)]
pub struct StructuredValueIterator {
    components: std::vec::IntoIter<Vec<String>>,
}

impl StructuredValueIterator {
    /// Parses a structured value and iterates over its components.
    #[must_use]
    pub fn new(value: &str) -> Self {
        Self::from_components(parse_structured(value))
    }

    /// Iterates over already-parsed components.
    #[must_use]
    pub fn from_components(components: Vec<Vec<String>>) -> Self {
        Self {
            components: components.into_iter(),
        }
    }

    /// The first value of the next component, or `None` when the component
    /// is empty or there are no more components.
    pub fn next_value(&mut self) -> Option<String> {
        let component = self.components.next()?;
        component.into_iter().next()
    }

    /// The next component, or an empty component when there are no more.
    pub fn next_component(&mut self) -> Vec<String> {
        self.components.next().unwrap_or_default()
    }

    /// Whether there are more components.
    #[must_use]
    pub fn has_next(&self) -> bool {
        !self.components.as_slice().is_empty()
    }
}

/// Builds a "structured" property value.
#[derive(Debug, Default)]
pub struct StructuredValueBuilder {
    components: Vec<Vec<Option<String>>>,
}

impl StructuredValueBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a single-valued component. `None` appends an empty
    /// component.
    pub fn append(&mut self, value: Option<impl Into<String>>) -> &mut Self {
        let component = match value {
            Some(value) => vec![Some(value.into())],
            None => Vec::new(),
        };
        self.append_component(component)
    }

    /// Appends a component. Absent sub-values are written as the literal
    /// text `null`.
    pub fn append_component(&mut self, component: Vec<Option<String>>) -> &mut Self {
        self.components.push(component);
        self
    }

    /// Builds the value string; see [`write_structured`].
    #[must_use]
    pub fn build(&self, include_trailing_semicolons: bool) -> String {
        write_structured(&self.components, include_trailing_semicolons)
    }
}
