use proptest::prelude::*;
use scriptweave_loader::{parse, resolve, ResourceUrl, Segment};

fn base() -> ResourceUrl {
    ResourceUrl::parse("http://h/a/b/c.js").unwrap()
}

fn arb_reference() -> impl Strategy<Value = String> {
    prop::collection::vec(
        prop_oneof![
            Just("..".to_string()),
            Just(".".to_string()),
            Just(String::new()),
            "[a-z]{1,6}",
        ],
        1..8,
    )
    .prop_map(|parts| parts.join("/"))
}

fn arb_literal() -> impl Strategy<Value = String> {
    "[a-z ;(){}=]{0,12}"
}

proptest! {
    #[test]
    fn relative_reference_stays_on_base_host(reference in arb_reference()) {
        let resolved = resolve(&reference, &base()).unwrap();
        prop_assert_eq!(resolved.scheme(), "http");
        prop_assert_eq!(resolved.authority(), "h");
        prop_assert!(!resolved.path().split('/').any(|s| s == ".." || s == "."));
    }

    #[test]
    fn resolution_is_deterministic(reference in arb_reference()) {
        prop_assert_eq!(resolve(&reference, &base()), resolve(&reference, &base()));
    }

    #[test]
    fn text_without_directives_is_one_literal(text in "[a-z /;()]{1,40}") {
        let parsed = parse(&text, &base());
        prop_assert!(parsed.imports.is_empty());
        prop_assert_eq!(parsed.segments, vec![Segment::Literal(text)]);
    }

    #[test]
    fn every_directive_becomes_an_import(
        chunks in prop::collection::vec((arb_literal(), "[a-z]{1,8}"), 0..6),
        tail in arb_literal(),
    ) {
        let mut text = String::new();
        let mut literal_text = String::new();
        for (literal, name) in &chunks {
            text.push_str(literal);
            text.push_str(&format!("//@import({name}.js)"));
            literal_text.push_str(literal);
        }
        text.push_str(&tail);
        literal_text.push_str(&tail);

        let parsed = parse(&text, &base());
        prop_assert_eq!(parsed.imports.len(), chunks.len());
        for (import, (_, name)) in parsed.imports.iter().zip(&chunks) {
            prop_assert_eq!(import.as_str(), format!("http://h/a/b/{name}.js"));
        }

        let rebuilt: String = parsed
            .segments
            .iter()
            .filter_map(Segment::as_literal)
            .collect();
        prop_assert_eq!(rebuilt, literal_text);
        prop_assert!(parsed
            .segments
            .iter()
            .all(|s| s.as_literal().is_none_or(|l| !l.is_empty())));
    }
}
