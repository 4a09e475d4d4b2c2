//! Shared helpers for the integration tests.
#![allow(dead_code)]

use vobject_stream::parse::{SyntaxRules, VObjectReader};
use vobject_stream::{Context, Property, SyntaxStyle, VObjectListener, Warning, WarningKind};

/// A recorded reader event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    ComponentBegin {
        name: String,
        parents: Vec<String>,
    },
    ComponentEnd {
        name: String,
        parents: Vec<String>,
    },
    Property {
        property: Property,
        line: usize,
        unfolded_line: String,
    },
    Version {
        value: String,
    },
    Warning {
        kind: WarningKind,
        property: Option<Property>,
    },
}

impl Event {
    pub fn begin(name: &str) -> Self {
        Event::ComponentBegin {
            name: name.to_string(),
            parents: Vec::new(),
        }
    }

    pub fn begin_in(name: &str, parents: &[&str]) -> Self {
        Event::ComponentBegin {
            name: name.to_string(),
            parents: parents.iter().map(ToString::to_string).collect(),
        }
    }

    pub fn end(name: &str) -> Self {
        Event::ComponentEnd {
            name: name.to_string(),
            parents: Vec::new(),
        }
    }

    pub fn end_in(name: &str, parents: &[&str]) -> Self {
        Event::ComponentEnd {
            name: name.to_string(),
            parents: parents.iter().map(ToString::to_string).collect(),
        }
    }

    pub fn warning(kind: WarningKind) -> Self {
        Event::Warning {
            kind,
            property: None,
        }
    }
}

/// Records every event delivered by the reader.
#[derive(Debug, Default)]
pub struct EventCollector {
    pub events: Vec<Event>,
    /// When set, raises the stop flag after every event.
    pub stop_after_each_event: bool,
}

impl EventCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// The recorded properties, in document order.
    pub fn properties(&self) -> Vec<&Property> {
        self.events
            .iter()
            .filter_map(|event| match event {
                Event::Property { property, .. } => Some(property),
                _ => None,
            })
            .collect()
    }

    /// The recorded warning kinds, in document order.
    pub fn warnings(&self) -> Vec<WarningKind> {
        self.events
            .iter()
            .filter_map(|event| match event {
                Event::Warning { kind, .. } => Some(*kind),
                _ => None,
            })
            .collect()
    }

    fn record(&mut self, event: Event, context: &mut Context) {
        self.events.push(event);
        if self.stop_after_each_event {
            context.stop();
        }
    }
}

impl VObjectListener for EventCollector {
    fn on_component_begin(&mut self, name: &str, context: &mut Context) {
        let event = Event::ComponentBegin {
            name: name.to_string(),
            parents: context.parent_components().to_vec(),
        };
        self.record(event, context);
    }

    fn on_component_end(&mut self, name: &str, context: &mut Context) {
        let event = Event::ComponentEnd {
            name: name.to_string(),
            parents: context.parent_components().to_vec(),
        };
        self.record(event, context);
    }

    fn on_property(&mut self, property: Property, context: &mut Context) {
        let event = Event::Property {
            property,
            line: context.line_number(),
            unfolded_line: context.unfolded_line().to_string(),
        };
        self.record(event, context);
    }

    fn on_version(&mut self, value: &str, context: &mut Context) {
        let event = Event::Version {
            value: value.to_string(),
        };
        self.record(event, context);
    }

    fn on_warning(&mut self, warning: Warning<'_>, context: &mut Context) {
        let event = Event::Warning {
            kind: warning.kind(),
            property: warning.property().cloned(),
        };
        self.record(event, context);
    }
}

/// Parses the entire input with the given rules and returns the events.
pub fn parse_with_rules(data: &str, rules: SyntaxRules) -> Vec<Event> {
    let mut reader = VObjectReader::new(data.as_bytes(), rules);
    reader.set_newline("\n");
    let mut listener = EventCollector::new();
    reader.parse(&mut listener).unwrap();
    listener.events
}

/// Parses the entire input pinned to one syntax style.
pub fn parse_with_style(data: &str, style: SyntaxStyle) -> Vec<Event> {
    parse_with_rules(data, SyntaxRules::new(style))
}

/// Builds a property from its parts, for assertions.
pub fn property(name: &str, value: &str) -> Property {
    Property::new(name, value)
}

/// Builds a property with parameters, for assertions.
pub fn property_with_params(
    name: &str,
    params: &[(Option<&str>, &str)],
    value: &str,
) -> Property {
    let mut property = Property::new(name, value);
    for (key, param_value) in params {
        property.parameters.put(*key, *param_value);
    }
    property
}
