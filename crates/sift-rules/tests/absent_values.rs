//! Rules that do not opt into absent values never report on them, and no
//! rule panics on arbitrary JSON.

use proptest::prelude::*;
use serde_json::{json, Value};
use sift_core::{ErrorReporter, Helpers, Messages, Subtype, VanillaReporter};
use sift_rules::{CompiledRule, NodeAttributes, RuleContext, RuleLibrary};
use sift_schema::Modifiers;

/// Every built-in rule with arguments it accepts.
fn configured() -> Vec<(&'static str, Subtype, Vec<Value>)> {
    vec![
        ("required", Subtype::String, vec![]),
        ("nullable", Subtype::String, vec![]),
        ("string", Subtype::String, vec![json!({ "trim": true })]),
        ("number", Subtype::Number, vec![]),
        ("boolean", Subtype::Boolean, vec![]),
        ("date", Subtype::Date, vec![]),
        ("enum", Subtype::Enum, vec![json!({ "choices": ["a", 1] })]),
        ("object", Subtype::Object, vec![]),
        ("array", Subtype::Array, vec![]),
        ("mobile", Subtype::String, vec![json!({ "strict": false })]),
        ("email", Subtype::String, vec![]),
        ("regex", Subtype::String, vec![json!("^a")]),
        ("alpha", Subtype::String, vec![]),
        ("alphaNum", Subtype::String, vec![]),
        ("uuid", Subtype::String, vec![]),
        ("url", Subtype::String, vec![]),
        ("minLength", Subtype::String, vec![json!(2)]),
        ("maxLength", Subtype::Array, vec![json!(2)]),
        ("range", Subtype::Number, vec![json!(0), json!(10)]),
        ("unsigned", Subtype::Number, vec![]),
        ("distinct", Subtype::Array, vec![]),
    ]
}

fn compiled(library: &RuleLibrary) -> Vec<(&'static str, CompiledRule)> {
    let attributes = NodeAttributes {
        pointer: "field",
        modifiers: Modifiers::default(),
    };
    configured()
        .into_iter()
        .map(|(name, subtype, args)| {
            let definition = library.get(name).expect("built-in rule");
            let rule = definition
                .compile(&attributes, subtype, &args)
                .unwrap_or_else(|e| panic!("{name} failed to compile: {e}"));
            (name, rule)
        })
        .collect()
}

fn report_count(library: &RuleLibrary, name: &str, rule: &CompiledRule, value: Option<&Value>) -> usize {
    let mut reporter = VanillaReporter::new(Messages::empty(), false);
    {
        let mut ctx = RuleContext::new("field", None, Helpers::LOOSE, &mut reporter);
        library
            .get(name)
            .expect("built-in rule")
            .validate(value, &rule.options, &mut ctx);
    }
    reporter.to_error().len()
}

#[test]
fn test_every_builtin_compiles_with_sample_args() {
    let library = RuleLibrary::builtin();
    assert_eq!(compiled(&library).len(), library.len());
}

#[test]
fn test_only_presence_rules_run_on_absent_values() {
    let library = RuleLibrary::builtin();
    for (name, rule) in compiled(&library) {
        let expected = matches!(name, "required" | "nullable");
        assert_eq!(rule.allow_undefineds, expected, "{name}");
    }
}

#[test]
fn test_absent_value_never_reported_without_opt_in() {
    let library = RuleLibrary::builtin();
    for (name, rule) in compiled(&library) {
        if rule.allow_undefineds {
            continue;
        }
        assert_eq!(report_count(&library, name, &rule, None), 0, "{name}");
    }
}

fn arbitrary_json() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(|n| json!(n)),
        (-1.0e6f64..1.0e6).prop_map(|f| json!(f)),
        ".{0,16}".prop_map(Value::String),
    ];
    leaf.prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            proptest::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
            proptest::collection::btree_map("[a-z]{1,4}", inner, 0..4)
                .prop_map(|m| Value::Object(m.into_iter().collect())),
        ]
    })
}

proptest! {
    #[test]
    fn prop_rules_report_at_most_once(value in arbitrary_json()) {
        let library = RuleLibrary::builtin();
        for (name, rule) in compiled(&library) {
            prop_assert!(report_count(&library, name, &rule, Some(&value)) <= 1, "{}", name);
        }
    }
}
