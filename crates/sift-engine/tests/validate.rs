//! End-to-end validation through [`Validator::validate`].

use std::sync::Arc;

use serde_json::{json, Value};
use sift_core::{reporter_factory, ApiReporter, ConfigError, JsonApiReporter, Messages, Subtype};
use sift_engine::{ValidateOptions, Validator};
use sift_rules::{
    default_message, CompiledRule, NodeAttributes, RuleContext, RuleDefinition, RuleLibrary,
    RuleOptions,
};
use sift_schema::{rules, schema, Schema};

async fn run(validator: &Validator, options: ValidateOptions) -> Result<Value, sift_core::ValidationFailure> {
    validator.validate(options).expect("schema compiles").await
}

fn phone_schema() -> Schema {
    Schema::create([(
        "phone",
        schema::string().rule(rules::mobile_with(json!({ "strict": false }))),
    )])
}

// -- Mobile rule --------------------------------------------------------------

#[tokio::test]
async fn test_mobile_accepts_us_number() {
    let validator = Validator::new();
    let out = run(
        &validator,
        ValidateOptions::new(phone_schema(), json!({ "phone": "+1 650-555-0100" })),
    )
    .await
    .unwrap();
    assert_eq!(out, json!({ "phone": "+1 650-555-0100" }));
}

#[tokio::test]
async fn test_mobile_rejects_garbage_with_one_error() {
    let validator = Validator::new();
    let failure = run(
        &validator,
        ValidateOptions::new(phone_schema(), json!({ "phone": "not-a-phone" })),
    )
    .await
    .unwrap_err();
    assert_eq!(failure.len(), 1);
    let error = &failure.errors()[0];
    assert_eq!(error.pointer, "phone");
    assert_eq!(error.rule, "mobile");
    assert_eq!(error.message, "mobile validation failed");
    assert_eq!(
        failure.body(),
        &json!({ "errors": { "phone": ["mobile validation failed"] } })
    );
}

#[tokio::test]
async fn test_mobile_defers_non_strings_to_type_rule() {
    let validator = Validator::new();
    let failure = run(
        &validator,
        ValidateOptions::new(phone_schema(), json!({ "phone": 42 })),
    )
    .await
    .unwrap_err();
    assert!(failure.errors().iter().all(|e| e.rule != "mobile"));
    assert_eq!(failure.errors()[0].rule, "string");
}

#[test]
fn test_mobile_on_number_node_is_config_error() {
    let validator = Validator::new();
    let s = Schema::create([("phone", schema::number().rule(rules::mobile()))]);
    let err = validator
        .validate(ValidateOptions::new(s, json!({ "phone": 1 })))
        .err()
        .expect("config error");
    assert_eq!(err, ConfigError::incompatible("mobile", Subtype::Number));
}

// -- Bail vs collect ----------------------------------------------------------

fn two_failures() -> (Schema, Value) {
    let s = Schema::create([(
        "username",
        schema::string()
            .rule(rules::min_length(5))
            .rule(rules::alpha()),
    )]);
    (s, json!({ "username": "a1" }))
}

#[tokio::test]
async fn test_bail_surfaces_first_error_only() {
    let validator = Validator::new();
    let (s, data) = two_failures();
    let failure = run(&validator, ValidateOptions::new(s, data).bail(true))
        .await
        .unwrap_err();
    assert_eq!(failure.len(), 1);
    assert_eq!(failure.errors()[0].rule, "minLength");
}

#[tokio::test]
async fn test_collect_surfaces_both_errors() {
    let validator = Validator::new();
    let (s, data) = two_failures();
    let failure = run(&validator, ValidateOptions::new(s, data)).await.unwrap_err();
    let rules: Vec<&str> = failure.errors().iter().map(|e| e.rule.as_str()).collect();
    assert_eq!(failure.len(), 2);
    assert!(rules.contains(&"minLength"));
    assert!(rules.contains(&"alpha"));
}

#[tokio::test]
async fn test_bail_stops_sibling_fields() {
    let validator = Validator::new();
    let s = Schema::create([("a", schema::string()), ("b", schema::string())]);
    let failure = run(&validator, ValidateOptions::new(s, json!({})).bail(true))
        .await
        .unwrap_err();
    assert_eq!(failure.len(), 1);
    assert_eq!(failure.errors()[0].pointer, "a");
}

#[tokio::test]
async fn test_collect_keeps_going_after_sibling_failure() {
    let validator = Validator::new();
    let s = Schema::create([
        ("a", schema::string()),
        ("b", schema::number().rule(rules::unsigned())),
    ]);
    let failure = run(&validator, ValidateOptions::new(s, json!({ "b": -1 })))
        .await
        .unwrap_err();
    let pointers: Vec<&str> = failure.errors().iter().map(|e| e.pointer.as_str()).collect();
    assert!(pointers.contains(&"a"));
    assert!(pointers.contains(&"b"));
}

fn failing_union() -> (Schema, Value) {
    let s = Schema::create([
        (
            "id",
            schema::any_of([
                schema::number(),
                schema::string().rule(rules::min_length(10)).rule(rules::alpha()),
            ]),
        ),
        ("name", schema::string()),
    ]);
    (s, json!({ "id": "a-1" }))
}

#[tokio::test]
async fn test_bail_stops_inside_rejected_union() {
    let validator = Validator::new();
    let (s, data) = failing_union();
    let failure = run(&validator, ValidateOptions::new(s, data).bail(true))
        .await
        .unwrap_err();
    assert_eq!(failure.len(), 1);
    assert_eq!(failure.errors()[0].pointer, "id");
    assert_eq!(failure.errors()[0].rule, "minLength");
}

#[tokio::test]
async fn test_collect_replays_union_errors_and_continues() {
    let validator = Validator::new();
    let (s, data) = failing_union();
    let failure = run(&validator, ValidateOptions::new(s, data)).await.unwrap_err();
    let reported: Vec<(&str, &str)> = failure
        .errors()
        .iter()
        .map(|e| (e.pointer.as_str(), e.rule.as_str()))
        .collect();
    assert_eq!(failure.len(), 3);
    assert!(reported.contains(&("id", "minLength")));
    assert!(reported.contains(&("id", "alpha")));
    assert!(reported.contains(&("name", "required")));
}

// -- Round trip and normalization ---------------------------------------------

fn profile_schema() -> Schema {
    Schema::create([
        ("name", schema::string().rule(rules::alpha_num())),
        ("age", schema::number().rule(rules::range(0.0, 150.0))),
        ("active", schema::boolean()),
        ("role", schema::enumeration(["admin", "member"])),
        (
            "emails",
            schema::array(schema::string().rule(rules::email())).rule(rules::distinct()),
        ),
        (
            "address",
            schema::object([
                ("city", schema::string()),
                ("zip", schema::string().optional()),
            ]),
        ),
        ("website", schema::string().optional().rule(rules::url())),
    ])
}

#[tokio::test]
async fn test_valid_data_round_trips() {
    let validator = Validator::new();
    let data = json!({
        "name": "ada99",
        "age": 36,
        "active": true,
        "role": "admin",
        "emails": ["ada@example.com", "lovelace@example.org"],
        "address": { "city": "London", "zip": "N1" },
        "website": "https://example.com"
    });
    let out = run(&validator, ValidateOptions::new(profile_schema(), data.clone()))
        .await
        .unwrap();
    assert_eq!(out, data);
}

#[tokio::test]
async fn test_coercion_and_stripping() {
    let validator = Validator::new();
    let data = json!({
        "name": "ada",
        "age": "36",
        "active": "on",
        "role": "member",
        "emails": [],
        "address": { "city": "London", "planet": "Earth" },
        "debug": true
    });
    let out = run(&validator, ValidateOptions::new(profile_schema(), data))
        .await
        .unwrap();
    assert_eq!(
        out,
        json!({
            "name": "ada",
            "age": 36,
            "active": true,
            "role": "member",
            "emails": [],
            "address": { "city": "London" }
        })
    );
}

#[tokio::test]
async fn test_date_and_string_normalization() {
    let validator = Validator::new();
    let s = Schema::create([
        ("born", schema::date_with_format("%d/%m/%Y")),
        ("bio", schema::string_with(json!({ "trim": true, "escape": true }))),
    ]);
    let out = run(
        &validator,
        ValidateOptions::new(s, json!({ "born": "10/12/1815", "bio": "  <b>math</b> " })),
    )
    .await
    .unwrap();
    assert_eq!(
        out,
        json!({ "born": "1815-12-10T00:00:00Z", "bio": "&lt;b&gt;math&lt;&#x2F;b&gt;" })
    );
}

// -- Pointers and messages ----------------------------------------------------

#[tokio::test]
async fn test_array_element_pointers() {
    let validator = Validator::new();
    let s = Schema::create([(
        "users",
        schema::array(schema::object([(
            "tags",
            schema::array(schema::string().rule(rules::min_length(2))),
        )])),
    )]);
    let data = json!({ "users": [{ "tags": ["ok"] }, { "tags": ["ok", "x"] }] });
    let failure = run(&validator, ValidateOptions::new(s, data)).await.unwrap_err();
    assert_eq!(failure.len(), 1);
    let error = &failure.errors()[0];
    assert_eq!(error.pointer, "users.1.tags.1");
    assert_eq!(error.array_expression_pointer.as_deref(), Some("users.*.tags.*"));
}

#[tokio::test]
async fn test_custom_messages_lookup_order() {
    let validator = Validator::new();
    let s = Schema::create([
        ("name", schema::string()),
        ("tags", schema::array(schema::string().rule(rules::min_length(3)))),
        ("nick", schema::string()),
    ]);
    let messages: Messages = [
        ("name.required", "Name is needed"),
        ("tags.*.minLength", "{{ field }} needs {{ options.minLength }} characters"),
        ("required", "{{ field }} is missing"),
    ]
    .into_iter()
    .collect();
    let failure = run(
        &validator,
        ValidateOptions::new(s, json!({ "tags": ["ab"] })).messages(messages),
    )
    .await
    .unwrap_err();
    let by_pointer = |p: &str| failure.for_pointer(p).next().map(|e| e.message.clone());
    assert_eq!(by_pointer("name").as_deref(), Some("Name is needed"));
    assert_eq!(by_pointer("tags.0").as_deref(), Some("tags.0 needs 3 characters"));
    assert_eq!(by_pointer("nick").as_deref(), Some("nick is missing"));
}

#[tokio::test]
async fn test_api_reporter_body() {
    let validator = Validator::new();
    let failure = run(
        &validator,
        ValidateOptions::new(phone_schema(), json!({ "phone": "nope" }))
            .reporter(reporter_factory::<ApiReporter>()),
    )
    .await
    .unwrap_err();
    assert_eq!(
        failure.body(),
        &json!({ "errors": [{
            "rule": "mobile",
            "field": "phone",
            "message": "mobile validation failed"
        }] })
    );
}

#[tokio::test]
async fn test_jsonapi_reporter_body() {
    let validator = Validator::new();
    let s = Schema::create([("code", schema::string().rule(rules::min_length(4)))]);
    let failure = run(
        &validator,
        ValidateOptions::new(s, json!({ "code": "ab" }))
            .reporter(reporter_factory::<JsonApiReporter>()),
    )
    .await
    .unwrap_err();
    let first = &failure.body()["errors"][0];
    assert_eq!(first["code"], "E_MIN_LENGTH");
    assert_eq!(first["source"]["pointer"], "code");
}

// -- Existence helpers --------------------------------------------------------

#[tokio::test]
async fn test_empty_string_is_absent_unless_strict() {
    let validator = Validator::new();
    let s = Schema::create([("name", schema::string())]);

    let failure = run(&validator, ValidateOptions::new(s.clone(), json!({ "name": "" })))
        .await
        .unwrap_err();
    assert_eq!(failure.errors()[0].rule, "required");

    let out = run(
        &validator,
        ValidateOptions::new(s, json!({ "name": "" })).exists_strict(true),
    )
    .await
    .unwrap();
    assert_eq!(out, json!({ "name": "" }));
}

#[tokio::test]
async fn test_optional_empty_string_skips_rules() {
    let validator = Validator::new();
    let s = Schema::create([("email", schema::string().optional().rule(rules::email()))]);
    let out = run(&validator, ValidateOptions::new(s, json!({ "email": "" })))
        .await
        .unwrap();
    assert_eq!(out, json!({ "email": "" }));
}

// -- Cache --------------------------------------------------------------------

#[tokio::test]
async fn test_cache_key_reuse_keeps_first_schema() {
    let validator = Validator::new();
    let first = Schema::create([("a", schema::string())]);
    let second = Schema::create([("b", schema::number())]);

    run(&validator, ValidateOptions::new(first, json!({ "a": "x" })).cache_key("shared"))
        .await
        .unwrap();
    // The second schema would require "b"; the cached first schema does not.
    let out = run(
        &validator,
        ValidateOptions::new(second, json!({ "a": "y" })).cache_key("shared"),
    )
    .await
    .unwrap();
    assert_eq!(out, json!({ "a": "y" }));
    assert_eq!(validator.cache().len(), 1);
}

// -- Registries ---------------------------------------------------------------

struct AlwaysFails;

impl RuleDefinition for AlwaysFails {
    fn compile(
        &self,
        _attributes: &NodeAttributes<'_>,
        _subtype: Subtype,
        _args: &[Value],
    ) -> Result<CompiledRule, ConfigError> {
        Ok(CompiledRule::sync("mobile", RuleOptions::none()))
    }

    fn validate(&self, _value: Option<&Value>, _options: &RuleOptions, ctx: &mut RuleContext<'_>) {
        ctx.report("mobile", "stubbed", None);
    }
}

#[tokio::test]
async fn test_runtime_library_substitution() {
    let validator = Validator::new();
    let mut stubbed = RuleLibrary::builtin();
    stubbed.add_rule("mobile", AlwaysFails);

    let data = json!({ "phone": "+1 650-555-0100" });
    let failure = run(
        &validator,
        ValidateOptions::new(phone_schema(), data.clone())
            .cache_key("phone")
            .library(Arc::new(stubbed)),
    )
    .await
    .unwrap_err();
    assert_eq!(failure.errors()[0].message, "stubbed");

    // Same cached routine, real library.
    run(&validator, ValidateOptions::new(phone_schema(), data).cache_key("phone"))
        .await
        .unwrap();
}

struct Lowercase;

impl RuleDefinition for Lowercase {
    fn compile(
        &self,
        _attributes: &NodeAttributes<'_>,
        subtype: Subtype,
        args: &[Value],
    ) -> Result<CompiledRule, ConfigError> {
        sift_rules::ensure_subtype("lowercase", subtype, &[Subtype::String])?;
        sift_rules::ensure_arg_count("lowercase", args, 0)?;
        Ok(CompiledRule::sync("lowercase", RuleOptions::none()))
    }

    fn validate(&self, value: Option<&Value>, _options: &RuleOptions, ctx: &mut RuleContext<'_>) {
        if let Some(Value::String(text)) = value {
            if text.chars().any(char::is_uppercase) {
                ctx.report("lowercase", &default_message("lowercase"), None);
            }
        }
    }
}

#[tokio::test]
async fn test_add_rule_and_add_type() {
    let mut validator = Validator::new();
    validator.add_rule("lowercase", Lowercase);
    validator.add_type("handle", |_| {
        Ok(schema::string().rule(rules::custom("lowercase", Vec::new())))
    });

    let document = sift_schema::SchemaDocument::from_yaml_str("fields:\n  user:\n    type: handle\n")
        .unwrap();
    let s = validator.schema_from_document(&document).unwrap();

    run(&validator, ValidateOptions::new(s.clone(), json!({ "user": "ada" })))
        .await
        .unwrap();
    let failure = run(&validator, ValidateOptions::new(s, json!({ "user": "Ada" })))
        .await
        .unwrap_err();
    assert_eq!(failure.errors()[0].message, "lowercase validation failed");
}

#[test]
fn test_unknown_rule_is_config_error() {
    let validator = Validator::new();
    let s = Schema::create([("user", schema::string().rule(rules::custom("lowercase", Vec::new())))]);
    let err = validator
        .validate(ValidateOptions::new(s, json!({})))
        .err()
        .expect("config error");
    assert!(matches!(err, ConfigError::UnknownRule { ref rule, .. } if rule == "lowercase"));
}
