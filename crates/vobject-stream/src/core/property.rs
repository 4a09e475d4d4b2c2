//! The property record produced by the reader and consumed by the writer.

use super::Parameters;

/// A single vobject property.
///
/// Format: `[group.]name[;param]*:value`
///
/// ```text
/// iteM1.NOTE;X-SIZE=8:The body of the note
/// |     |    |        |
/// group name params   value
/// ```
///
/// The reader constructs a fresh `Property` for every `on_property` event;
/// equality is structural across all four fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Property {
    /// Optional group prefix (e.g. "item1" in "item1.TEL").
    pub group: Option<String>,
    /// Property name (e.g. "FN"). Preserved in its input case by the reader.
    pub name: String,
    /// Property parameters.
    pub parameters: Parameters,
    /// Property value. May be empty, but is never absent once parsed.
    pub value: String,
}

impl Property {
    /// Creates a property with a name and value and no parameters.
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            group: None,
            name: name.into(),
            parameters: Parameters::new(),
            value: value.into(),
        }
    }

    /// Creates a grouped property with a name and value and no parameters.
    #[must_use]
    pub fn with_group(
        group: impl Into<String>,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            group: Some(group.into()),
            name: name.into(),
            parameters: Parameters::new(),
            value: value.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_has_no_group() {
        let property = Property::new("FN", "John Doe");
        assert!(property.group.is_none());
        assert_eq!(property.name, "FN");
        assert!(property.parameters.is_empty());
        assert_eq!(property.value, "John Doe");
    }

    #[test]
    fn with_group_sets_group() {
        let property = Property::with_group("item1", "TEL", "+1-555-555-5555");
        assert_eq!(property.group.as_deref(), Some("item1"));
    }

    #[test]
    fn structural_equality() {
        let mut a = Property::new("NOTE", "hello");
        let b = Property::new("NOTE", "hello");
        assert_eq!(a, b);

        a.parameters.put(Some("LANGUAGE"), "en");
        assert_ne!(a, b);
    }
}
