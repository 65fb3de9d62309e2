//! Property-based checks of the engine invariants: no-op idempotence,
//! determinism, and semantic preservation of untouched subtrees.

use config_patcher::{ConfigurationFile, Format, ReplaceValue, Replacement, Selector};
use proptest::prelude::*;
use serde_json::Value;

fn arb_json() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(|n| Value::Number(n.into())),
        "[a-zA-Z0-9 _.\"\\\\-]{0,12}".prop_map(Value::String),
    ];
    leaf.prop_recursive(3, 24, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..6).prop_map(Value::Array),
            prop::collection::btree_map("[a-zA-Z][a-zA-Z0-9_]{0,8}", inner, 0..6)
                .prop_map(|m| Value::Object(m.into_iter().collect())),
        ]
    })
}

fn serialize(value: &Value, pretty: bool) -> Vec<u8> {
    if pretty {
        serde_json::to_vec_pretty(value).expect("serialize")
    } else {
        serde_json::to_vec(value).expect("serialize")
    }
}

// The '-' in these keys cannot appear in generated object keys, so the
// selectors are guaranteed inert.
fn inert_rules() -> Vec<Replacement> {
    vec![
        Replacement::new(
            Selector::parse("no-such-key").expect("selector"),
            ReplaceValue::string("x"),
        ),
        Replacement::new(
            Selector::parse("no-such-key.*.deeper").expect("selector"),
            ReplaceValue::boolean(true),
        ),
    ]
}

proptest! {
    #[test]
    fn test_noop_rules_return_byte_identical_output(value in arb_json(), pretty in any::<bool>()) {
        let input = serialize(&value, pretty);
        let file = ConfigurationFile::new("t.json", Format::Json, inert_rules());

        let output = file.update_json_preserving_structure(&input).unwrap();
        prop_assert_eq!(output, input);
    }

    #[test]
    fn test_repeated_application_is_deterministic(value in arb_json(), pretty in any::<bool>()) {
        let input = serialize(&value, pretty);
        let file = ConfigurationFile::new(
            "t.json",
            Format::Json,
            vec![Replacement::new(
                Selector::parse("*").expect("selector"),
                ReplaceValue::string("patched"),
            )],
        );

        let first = file.update_json_preserving_structure(&input).unwrap();
        let second = file.update_json_preserving_structure(&input).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn test_untouched_subtrees_survive_semantically(value in arb_json(), pretty in any::<bool>()) {
        let document = serde_json::json!({ "keep": value, "target": "old" });
        let input = serialize(&document, pretty);
        let file = ConfigurationFile::new(
            "t.json",
            Format::Json,
            vec![Replacement::new(
                Selector::parse("target").expect("selector"),
                ReplaceValue::string("new"),
            )],
        );

        let output = file.update_json_preserving_structure(&input).unwrap();
        let parsed: Value = serde_json::from_slice(&output).unwrap();
        prop_assert_eq!(&parsed["keep"], &value);
        prop_assert_eq!(&parsed["target"], &Value::String("new".to_string()));
    }

    #[test]
    fn test_scanner_accepts_all_serde_output(value in arb_json(), pretty in any::<bool>()) {
        let input = serialize(&value, pretty);
        let file = ConfigurationFile::new("t.json", Format::Json, vec![]);
        let output = file.update_json_preserving_structure(&input).unwrap();
        prop_assert_eq!(output, input);
    }
}
