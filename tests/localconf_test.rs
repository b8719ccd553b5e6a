//! Round-trip stability tests for the local configuration writer.

use proptest::prelude::*;
use serde_json::Value;
use zt_agent::localconf::LocalConfigWriter;

/// Strategy producing arbitrary JSON trees of the shapes local.conf can hold
fn arb_json() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(|n| Value::Number(n.into())),
        "[a-zA-Z0-9 _.-]{0,16}".prop_map(Value::String),
    ];

    leaf.prop_recursive(3, 32, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
            prop::collection::btree_map("[a-zA-Z]{1,10}", inner, 0..4)
                .prop_map(|m| Value::Object(m.into_iter().collect())),
        ]
    })
}

proptest! {
    /// render → parse → render is byte-identical for any mapping
    #[test]
    fn prop_render_round_trip_stable(value in arb_json()) {
        let rendered = LocalConfigWriter::render(&value).unwrap();
        let reparsed: Value = serde_json::from_str(&rendered).unwrap();
        let rerendered = LocalConfigWriter::render(&reparsed).unwrap();
        prop_assert_eq!(rendered, rerendered);
    }

    /// A written file reads back to the declared value
    #[test]
    fn prop_written_file_matches_declaration(value in arb_json()) {
        let dir = tempfile::tempdir().unwrap();
        let writer = LocalConfigWriter::new(dir.path());

        writer.write(&value).unwrap();

        let on_disk = std::fs::read_to_string(writer.path()).unwrap();
        let parsed: Value = serde_json::from_str(&on_disk).unwrap();
        prop_assert_eq!(parsed, value.clone());

        // And the immediate re-write is a no-op
        prop_assert!(!writer.write(&value).unwrap());
    }
}

#[test]
fn test_rendered_file_ends_with_newline() {
    let value = serde_json::json!({ "settings": { "primaryPort": 9993 } });
    let rendered = LocalConfigWriter::render(&value).unwrap();
    assert!(rendered.ends_with('\n'));
    assert!(!rendered.ends_with("\n\n"));
}
