//! End-to-end tests of the streaming reader.

mod common;

use common::{parse_with_rules, parse_with_style, property, property_with_params, Event, EventCollector};
use vobject_stream::parse::{SyntaxRules, VObjectReader};
use vobject_stream::{SyntaxStyle, WarningKind};

fn property_event(event: &Event) -> &vobject_stream::Property {
    match event {
        Event::Property { property, .. } => property,
        other => panic!("expected a property event, got {other:?}"),
    }
}

#[test]
fn component_structure() {
    let data = "\
BEGIN:COMP1\r\n\
PROP1:value1\r\n\
BEGIN:COMP2\r\n\
PROP2:value2\r\n\
END:COMP2\r\n\
END:COMP1\r\n";

    for style in [SyntaxStyle::Old, SyntaxStyle::New] {
        let events = parse_with_style(data, style);
        assert_eq!(
            events,
            vec![
                Event::begin("COMP1"),
                Event::Property {
                    property: property("PROP1", "value1"),
                    line: 2,
                    unfolded_line: "PROP1:value1".to_string(),
                },
                Event::begin_in("COMP2", &["COMP1"]),
                Event::Property {
                    property: property("PROP2", "value2"),
                    line: 4,
                    unfolded_line: "PROP2:value2".to_string(),
                },
                Event::end_in("COMP2", &["COMP1"]),
                Event::end("COMP1"),
            ]
        );
    }
}

#[test]
fn out_of_order_end_force_closes_components() {
    let data = "\
BEGIN:A\r\n\
BEGIN:B\r\n\
BEGIN:C\r\n\
END:A\r\n\
END:C\r\n\
END:B\r\n";

    let events = parse_with_style(data, SyntaxStyle::New);
    assert_eq!(
        events,
        vec![
            Event::begin("A"),
            Event::begin_in("B", &["A"]),
            Event::begin_in("C", &["A", "B"]),
            // END:A closes everything A contains, innermost first
            Event::end_in("C", &["A", "B"]),
            Event::end_in("B", &["A"]),
            Event::end("A"),
            Event::warning(WarningKind::UnmatchedEnd),
            Event::warning(WarningKind::UnmatchedEnd),
        ]
    );
}

#[test]
fn begin_end_are_case_insensitive() {
    let data = "Begin:Comp\r\nend:COMP\r\n";
    let events = parse_with_style(data, SyntaxStyle::New);
    assert_eq!(events, vec![Event::begin("COMP"), Event::end("COMP")]);
}

#[test]
fn whitespace_around_component_names() {
    // old style syntax allows whitespace around the colon of BEGIN and END
    let data = "BEGIN  :  Comp  \r\nEND:Comp\r\n";
    let events = parse_with_style(data, SyntaxStyle::Old);
    assert_eq!(events, vec![Event::begin("COMP"), Event::end("COMP")]);
}

#[test]
fn empty_begin_and_end() {
    let data = "BEGIN:\r\nEND:  \r\nNOTE:x\r\n";
    let events = parse_with_style(data, SyntaxStyle::New);
    assert_eq!(
        events,
        vec![
            Event::warning(WarningKind::EmptyBegin),
            Event::warning(WarningKind::EmptyEnd),
            Event::Property {
                property: property("NOTE", "x"),
                line: 3,
                unfolded_line: "NOTE:x".to_string(),
            },
        ]
    );
}

#[test]
fn bare_cr_and_bare_lf_line_terminators() {
    for data in ["A:1\rB:2\r", "A:1\nB:2\n", "A:1\r\nB:2"] {
        let events = parse_with_style(data, SyntaxStyle::New);
        let properties: Vec<_> = events.iter().map(property_event).collect();
        assert_eq!(
            properties,
            vec![&property("A", "1"), &property("B", "2")],
            "{data:?}"
        );
    }
}

#[test]
fn blank_lines_are_skipped() {
    let data = "A:1\r\n\r\n\r\nB:2\r\n\r\n";
    let events = parse_with_style(data, SyntaxStyle::New);
    let properties: Vec<_> = events.iter().map(property_event).collect();
    assert_eq!(properties, vec![&property("A", "1"), &property("B", "2")]);
}

#[test]
fn line_without_colon_is_malformed() {
    let data = "NOTE\r\nNOTE:ok\r\n";
    let events = parse_with_style(data, SyntaxStyle::New);
    assert_eq!(events.len(), 2);
    assert_eq!(events[0], Event::warning(WarningKind::MalformedLine));
    assert_eq!(property_event(&events[1]), &property("NOTE", "ok"));
}

#[test]
fn stream_cut_off_mid_value_still_delivers_the_property() {
    let events = parse_with_style("NOTE:partial", SyntaxStyle::New);
    assert_eq!(property_event(&events[0]), &property("NOTE", "partial"));
}

#[test]
fn stream_cut_off_before_colon_is_malformed() {
    let events = parse_with_style("NOTE;PARAM=x", SyntaxStyle::New);
    assert_eq!(events, vec![Event::warning(WarningKind::MalformedLine)]);
}

#[test]
fn empty_group_and_name() {
    let events = parse_with_style(".NOTE:a\r\n:b\r\n", SyntaxStyle::New);
    let mut expected_grouped = property("NOTE", "a");
    expected_grouped.group = Some(String::new());
    assert_eq!(property_event(&events[0]), &expected_grouped);
    assert_eq!(property_event(&events[1]), &property("", "b"));
}

#[test]
fn folded_lines() {
    let data = concat!(
        "PROP:fo\r\n lded\r\n",
        "PROP:fo\r\n\tlded\r\n",
        "PROP:fo\r\n \r\n lded\r\n",
        "PROP:fo\r\n \tlded\r\n",
        "PROP:fo\r\n\t lded\r\n",
        "PROP;ENCODING=QUOTED-PRINTABLE:fo=\r\n lded\r\n",
        "PROP;QUOTED-PRINTABLE:fo=\r\n lded\r\n",
        "PROP;ENCODING=QUOTED-PRINTABLE:fo=\r\nlded\r\n",
        "PROP;P\r\n ARAM=value:\r\n",
        "PROP:last",
    );

    // old style: any run of leading whitespace belongs to the fold
    let events = parse_with_style(data, SyntaxStyle::Old);
    let properties: Vec<_> = events.iter().map(property_event).collect();
    assert_eq!(
        properties,
        vec![
            &property("PROP", "folded"),
            &property("PROP", "folded"),
            &property("PROP", "folded"),
            &property("PROP", "folded"),
            &property("PROP", "folded"),
            &property_with_params("PROP", &[(Some("ENCODING"), "QUOTED-PRINTABLE")], "folded"),
            &property_with_params("PROP", &[(None, "QUOTED-PRINTABLE")], "folded"),
            &property_with_params("PROP", &[(Some("ENCODING"), "QUOTED-PRINTABLE")], "folded"),
            &property_with_params("PROP", &[(Some("PARAM"), "value")], ""),
            &property("PROP", "last"),
        ]
    );

    // new style: exactly one whitespace character is removed per fold
    let events = parse_with_style(data, SyntaxStyle::New);
    let properties: Vec<_> = events.iter().map(property_event).collect();
    assert_eq!(
        properties,
        vec![
            &property("PROP", "folded"),
            &property("PROP", "folded"),
            &property("PROP", "folded"),
            &property("PROP", "fo\tlded"),
            &property("PROP", "fo lded"),
            &property_with_params("PROP", &[(Some("ENCODING"), "QUOTED-PRINTABLE")], "folded"),
            &property_with_params("PROP", &[(None, "QUOTED-PRINTABLE")], "folded"),
            &property_with_params("PROP", &[(Some("ENCODING"), "QUOTED-PRINTABLE")], "folded"),
            &property_with_params("PROP", &[(Some("PARAM"), "value")], ""),
            &property("PROP", "last"),
        ]
    );
}

#[test]
fn folded_line_reports_its_first_physical_line() {
    let data = "A:1\r\nNOTE:Lorem ipsum dolor sit amet\\, consectetur adipiscing elit. Vestibulum u\r\n ltricies tempor orci ac dignissim.\r\n";
    let events = parse_with_style(data, SyntaxStyle::New);
    let Event::Property { property, line, unfolded_line } = &events[1] else {
        panic!("expected a property event");
    };
    assert_eq!(
        property.value,
        "Lorem ipsum dolor sit amet\\, consectetur adipiscing elit. Vestibulum ultricies tempor orci ac dignissim."
    );
    assert_eq!(*line, 2);
    assert!(unfolded_line.ends_with("dignissim."));
}

#[test]
fn quoted_printable_values() {
    let data = "\
PROP;QUOTED-PRINTABLE:one=0D=0Atwo\r\n\
PROP;quoted-printable:one=0D=0Atwo\r\n\
PROP;ENCODING=QUOTED-PRINTABLE:one=0D=0Atwo\r\n\
PROP;ENCODING=quoted-printable:one=0D=0Atwo\r\n\
PROP;ENCODING=QUOTED-PRINTABLE:=XX\r\n\
PROP;ENCODING=QUOTED-PRINTABLE;CHARSET=UTF-8:one=0D=0Atwo\r\n\
PROP;ENCODING=QUOTED-PRINTABLE;CHARSET=invalid:one=0D=0Atwo\r\n\
PROP;ENCODING=QUOTED-PRINTABLE;CHARSET=illegal name:one=0D=0Atwo";

    for style in [SyntaxStyle::Old, SyntaxStyle::New] {
        let events = parse_with_style(data, style);

        let bad_decode =
            property_with_params("PROP", &[(Some("ENCODING"), "QUOTED-PRINTABLE")], "=XX");
        let invalid_charset = property_with_params(
            "PROP",
            &[
                (Some("ENCODING"), "QUOTED-PRINTABLE"),
                (Some("CHARSET"), "invalid"),
            ],
            "one\r\ntwo",
        );
        let illegal_charset = property_with_params(
            "PROP",
            &[
                (Some("ENCODING"), "QUOTED-PRINTABLE"),
                (Some("CHARSET"), "illegal name"),
            ],
            "one\r\ntwo",
        );

        let expected_properties = [
            property_with_params("PROP", &[(None, "QUOTED-PRINTABLE")], "one\r\ntwo"),
            property_with_params("PROP", &[(None, "quoted-printable")], "one\r\ntwo"),
            property_with_params("PROP", &[(Some("ENCODING"), "QUOTED-PRINTABLE")], "one\r\ntwo"),
            property_with_params("PROP", &[(Some("ENCODING"), "quoted-printable")], "one\r\ntwo"),
            bad_decode.clone(),
            property_with_params(
                "PROP",
                &[
                    (Some("ENCODING"), "QUOTED-PRINTABLE"),
                    (Some("CHARSET"), "UTF-8"),
                ],
                "one\r\ntwo",
            ),
            invalid_charset.clone(),
            illegal_charset.clone(),
        ];

        let mut events = events.into_iter();
        for (index, expected) in expected_properties.iter().enumerate() {
            match index {
                // the decode failure is reported before the property, with
                // the raw value retained
                4 => {
                    let warning = events.next().unwrap();
                    assert_eq!(
                        warning,
                        Event::Warning {
                            kind: WarningKind::QuotedPrintableError,
                            property: Some(bad_decode.clone()),
                        }
                    );
                }
                6 | 7 => {
                    let warning = events.next().unwrap();
                    let Event::Warning { kind, property } = warning else {
                        panic!("expected a warning");
                    };
                    assert_eq!(kind, WarningKind::UnknownCharset);
                    // the warning fires before decoding, so the property
                    // still holds the raw value
                    let warned = property.unwrap();
                    assert_eq!(warned.parameters, expected.parameters);
                    assert_eq!(warned.value, "one=0D=0Atwo");
                }
                _ => {}
            }
            assert_eq!(property_event(&events.next().unwrap()), expected);
        }
        assert!(events.next().is_none());
    }
}

#[test]
fn quoted_printable_decode_hola() {
    let data = "NOTE;ENCODING=QUOTED-PRINTABLE;CHARSET=UTF-8:=C2=A1Hola, mundo!\r\n";
    let events = parse_with_style(data, SyntaxStyle::Old);
    assert_eq!(
        property_event(&events[0]),
        &property_with_params(
            "NOTE",
            &[
                (Some("ENCODING"), "QUOTED-PRINTABLE"),
                (Some("CHARSET"), "UTF-8"),
            ],
            "\u{a1}Hola, mundo!",
        )
    );
}

#[test]
fn default_quoted_printable_charset_is_configurable() {
    let data = "NOTE;ENCODING=QUOTED-PRINTABLE:=A1Hola, mundo!\r\n";
    let mut reader = VObjectReader::new(data.as_bytes(), SyntaxRules::vcard());
    reader.set_default_quoted_printable_charset(encoding_rs::WINDOWS_1252);
    let mut listener = EventCollector::new();
    reader.parse(&mut listener).unwrap();

    assert_eq!(
        listener.properties(),
        vec![&property_with_params(
            "NOTE",
            &[(Some("ENCODING"), "QUOTED-PRINTABLE")],
            "\u{a1}Hola, mundo!",
        )]
    );
}

#[test]
fn parameter_value_escaping_old_style() {
    // backslash escapes only backslashes and semicolons; carets and double
    // quotes have no special meaning
    let data = "PROP;PARAM=1\\ 2^^ 3^n 5\\; 8^' 9\" b\\\\:\r\n";

    for caret_decoding in [false, true] {
        let mut reader = VObjectReader::new(data.as_bytes(), SyntaxRules::new(SyntaxStyle::Old));
        reader.set_caret_decoding_enabled(caret_decoding);
        let mut listener = EventCollector::new();
        reader.parse(&mut listener).unwrap();

        assert_eq!(
            listener.properties(),
            vec![&property_with_params(
                "PROP",
                &[(Some("PARAM"), "1\\ 2^^ 3^n 5; 8^' 9\" b\\")],
                "",
            )],
            "caret_decoding={caret_decoding}"
        );
    }
}

#[test]
fn parameter_value_escaping_new_style() {
    // ^^, ^n and ^' decode when caret decoding is on; backslashes have no
    // special meaning in new style parameter values
    let data = "PROP;PARAM=2^^ 3^n 7^' a^ b\\n:\r\n";

    let expectations = [
        (false, "2^^ 3^n 7^' a^ b\\n"),
        (true, "2^ 3\n 7\" a^ b\\n"),
    ];

    for (caret_decoding, expected) in expectations {
        let mut reader = VObjectReader::new(data.as_bytes(), SyntaxRules::new(SyntaxStyle::New));
        reader.set_caret_decoding_enabled(caret_decoding);
        reader.set_newline("\n");
        let mut listener = EventCollector::new();
        reader.parse(&mut listener).unwrap();

        assert_eq!(
            listener.properties(),
            vec![&property_with_params("PROP", &[(Some("PARAM"), expected)], "")],
            "caret_decoding={caret_decoding}"
        );
    }
}

#[test]
fn caret_decoded_author() {
    let data = "NOTE;X-AUTHOR=Fox ^'Spooky^' Mulder:The truth is out there.\r\n";
    let events = parse_with_style(data, SyntaxStyle::New);
    assert_eq!(
        property_event(&events[0]),
        &property_with_params(
            "NOTE",
            &[(Some("X-AUTHOR"), "Fox \"Spooky\" Mulder")],
            "The truth is out there.",
        )
    );
}

#[test]
fn multi_valued_parameters() {
    let data = "PROP;PARAM=one,two,three:\r\n";

    // new style: comma separates values
    let events = parse_with_style(data, SyntaxStyle::New);
    let expected = {
        let mut p = property("PROP", "");
        p.parameters.put_all(Some("PARAM"), ["one", "two", "three"]);
        p
    };
    assert_eq!(property_event(&events[0]), &expected);

    // old style: the comma is an ordinary character
    let events = parse_with_style(data, SyntaxStyle::Old);
    assert_eq!(
        property_event(&events[0]),
        &property_with_params("PROP", &[(Some("PARAM"), "one,two,three")], "")
    );
}

#[test]
fn double_quoted_parameter_values() {
    // new style: quotes protect , : ; and are stripped
    let data = "PROP;PARAM=\"one,two;three:four\",five:value\r\n";
    let events = parse_with_style(data, SyntaxStyle::New);
    let expected = {
        let mut p = property("PROP", "value");
        p.parameters
            .put_all(Some("PARAM"), ["one,two;three:four", "five"]);
        p
    };
    assert_eq!(property_event(&events[0]), &expected);

    // old style: quotes are ordinary characters
    let data = "PROP;PARAM=\"hello\":value\r\n";
    let events = parse_with_style(data, SyntaxStyle::Old);
    assert_eq!(
        property_event(&events[0]),
        &property_with_params("PROP", &[(Some("PARAM"), "\"hello\"")], "value")
    );
}

#[test]
fn whitespace_around_parameter_equals() {
    let data = "PROP;PARAM = value:\r\n";

    // old style allows whitespace around the "="
    let events = parse_with_style(data, SyntaxStyle::Old);
    assert_eq!(
        property_event(&events[0]),
        &property_with_params("PROP", &[(Some("PARAM"), "value")], "")
    );

    // new style keeps it
    let events = parse_with_style(data, SyntaxStyle::New);
    assert_eq!(
        property_event(&events[0]),
        &property_with_params("PROP", &[(Some("PARAM "), " value")], "")
    );
}

#[test]
fn nameless_parameters() {
    let data = "PROP;ONE;TWO:value\r\n";
    let events = parse_with_style(data, SyntaxStyle::Old);
    let expected = {
        let mut p = property("PROP", "value");
        p.parameters.put(None, "ONE");
        p.parameters.put(None, "TWO");
        p
    };
    assert_eq!(property_event(&events[0]), &expected);
}

#[test]
fn version_switches_the_dialect_mid_stream() {
    // 2.1 data decodes backslash escapes in parameter values; 4.0 data
    // decodes quoted values instead
    let data = "\
BEGIN:VCARD\r\n\
VERSION:2.1\r\n\
PROP;PARAM=a\\;b:one\r\n\
END:VCARD\r\n\
BEGIN:VCARD\r\n\
VERSION:4.0\r\n\
PROP;PARAM=\"a;b\":two\r\n\
END:VCARD\r\n";

    let events = parse_with_rules(data, SyntaxRules::vcard());
    assert_eq!(
        events,
        vec![
            Event::begin("VCARD"),
            Event::Version {
                value: "2.1".to_string()
            },
            Event::Property {
                property: property_with_params("PROP", &[(Some("PARAM"), "a;b")], "one"),
                line: 3,
                unfolded_line: "PROP;PARAM=a\\;b:one".to_string(),
            },
            Event::end("VCARD"),
            Event::begin("VCARD"),
            Event::Version {
                value: "4.0".to_string()
            },
            Event::Property {
                property: property_with_params("PROP", &[(Some("PARAM"), "a;b")], "two"),
                line: 7,
                unfolded_line: "PROP;PARAM=\"a;b\":two".to_string(),
            },
            Event::end("VCARD"),
        ]
    );
}

#[test]
fn unknown_version_is_a_regular_property() {
    let data = "BEGIN:VCARD\r\nVERSION:5.0\r\nEND:VCARD\r\n";
    let events = parse_with_rules(data, SyntaxRules::vcard());
    let version_property = property("VERSION", "5.0");
    assert_eq!(
        events,
        vec![
            Event::begin("VCARD"),
            Event::Warning {
                kind: WarningKind::UnknownVersion,
                property: Some(version_property.clone()),
            },
            Event::Property {
                property: version_property,
                line: 2,
                unfolded_line: "VERSION:5.0".to_string(),
            },
            Event::end("VCARD"),
        ]
    );
}

#[test]
fn version_outside_a_ruled_component_is_a_regular_property() {
    let data = "BEGIN:OTHER\r\nVERSION:2.1\r\nEND:OTHER\r\n";
    let events = parse_with_rules(data, SyntaxRules::vcard());
    assert_eq!(events.len(), 3);
    assert_eq!(property_event(&events[1]), &property("VERSION", "2.1"));
}

#[test]
fn nested_components_inherit_the_dialect() {
    // the VCALENDAR's 2.0 applies inside the nested VEVENT
    let data = "\
BEGIN:VCALENDAR\r\n\
VERSION:2.0\r\n\
BEGIN:VEVENT\r\n\
ATTENDEE;ROLE=\"a;b\":mailto:jane@example.com\r\n\
END:VEVENT\r\n\
END:VCALENDAR\r\n";

    let events = parse_with_rules(data, SyntaxRules::icalendar());
    let attendee = events
        .iter()
        .find_map(|event| match event {
            Event::Property { property, .. } if property.name == "ATTENDEE" => Some(property),
            _ => None,
        })
        .unwrap();
    assert_eq!(attendee.parameters.first(Some("ROLE")), Some("a;b"));
    assert_eq!(attendee.value, "mailto:jane@example.com");
}

#[test]
fn stop_suspends_and_parse_resumes() {
    let data = "\
BEGIN:VCARD\r\n\
FN:John Doe\r\n\
NOTE:one\r\n\
END:VCARD\r\n";

    let expected = parse_with_style(data, SyntaxStyle::New);
    assert_eq!(expected.len(), 4);

    let mut reader = VObjectReader::new(data.as_bytes(), SyntaxRules::new(SyntaxStyle::New));
    let mut listener = EventCollector::new();
    listener.stop_after_each_event = true;

    // each parse call delivers exactly one more event
    for delivered in 1..=4 {
        reader.parse(&mut listener).unwrap();
        assert_eq!(listener.events.len(), delivered);
    }

    // the stream is exhausted; further calls deliver nothing
    reader.parse(&mut listener).unwrap();
    assert_eq!(listener.events, expected);
}
