//! # Compiled Routine
//!
//! The executable form of a schema. A routine holds no mutable state: the
//! data, the rule library, the reporter and the existence helpers are all
//! passed per invocation, so one routine may serve any number of concurrent
//! validations.
//!
//! ## Traversal
//!
//! - Rules of a node run in compiled order. After each rule the routine
//!   asks the reporter whether it should halt (bail mode with an error).
//! - Object children run in declaration order; undeclared keys are dropped
//!   from the output unless the node accepts any members.
//! - Array elements run in index order with pointer `<array>.<index>` and
//!   array expression pointer `<array>.*`.
//! - Union variants are tried in order against a private collector; the
//!   first variant without errors wins. When none match, the last
//!   variant's errors are replayed into the real reporter. Absent values
//!   skip the variants; the union's own presence rule covers them.
//!
//! ## Sync and Async
//!
//! Every compiled node knows whether its subtree contains an asynchronous
//! rule. Subtrees without one are walked by plain recursive functions; only
//! subtrees with one are walked through boxed futures.

use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use futures_util::future::{self, BoxFuture};
use serde_json::{Map, Value};
use sift_core::{pointer, ErrorReporter, Helpers, ReportedError, ValidationFailure};
use sift_rules::{RuleContext, RuleDefinition, RuleLibrary};

use crate::compiler::{CompiledNode, CompiledStep, NodeKind};

/// Executable validation routine produced by [`compile`](crate::compile).
#[derive(Clone)]
pub struct CompiledRoutine {
    root: Arc<CompiledNode>,
}

impl CompiledRoutine {
    pub(crate) fn new(root: CompiledNode) -> Self {
        Self {
            root: Arc::new(root),
        }
    }

    #[cfg(test)]
    pub(crate) fn root(&self) -> &CompiledNode {
        &self.root
    }

    /// Whether any rule in the schema is asynchronous.
    pub fn is_async(&self) -> bool {
        self.root.has_async
    }

    /// Validate `data`, resolving with the normalized output or rejecting
    /// with the reporter's failure.
    ///
    /// `library` is consulted at invocation time, so it may differ from the
    /// library the routine was compiled against.
    pub async fn run(
        &self,
        data: &Value,
        library: &RuleLibrary,
        reporter: &mut dyn ErrorReporter,
        helpers: Helpers,
    ) -> Result<Value, ValidationFailure> {
        let empty = Value::Object(Map::new());
        let data = root_data(data, &empty);
        let mut walk = Walk {
            library,
            reporter,
            helpers,
        };
        let outcome = if self.root.has_async {
            walk.node_async(&self.root, Some(data), "", None).await
        } else {
            walk.node(&self.root, Some(data), "", None)
        };
        finish(outcome, walk.reporter)
    }

    /// Validate `data` without an executor.
    ///
    /// Returns `None` when the schema contains asynchronous rules.
    pub fn run_sync(
        &self,
        data: &Value,
        library: &RuleLibrary,
        reporter: &mut dyn ErrorReporter,
        helpers: Helpers,
    ) -> Option<Result<Value, ValidationFailure>> {
        if self.root.has_async {
            return None;
        }
        let empty = Value::Object(Map::new());
        let data = root_data(data, &empty);
        let mut walk = Walk {
            library,
            reporter,
            helpers,
        };
        let outcome = walk.node(&self.root, Some(data), "", None);
        Some(finish(outcome, walk.reporter))
    }
}

impl fmt::Debug for CompiledRoutine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledRoutine")
            .field("is_async", &self.root.has_async)
            .finish_non_exhaustive()
    }
}

/// Top-level fields of a non-object root are treated as absent.
fn root_data<'v>(data: &'v Value, empty: &'v Value) -> &'v Value {
    if data.is_object() {
        data
    } else {
        tracing::debug!("root value is not an object; fields treated as absent");
        empty
    }
}

fn finish(
    outcome: Result<Option<Value>, Halt>,
    reporter: &mut dyn ErrorReporter,
) -> Result<Value, ValidationFailure> {
    match outcome {
        Ok(output) if !reporter.has_errors() => Ok(output.unwrap_or(Value::Null)),
        _ => {
            let failure = reporter.to_error();
            tracing::debug!(errors = failure.len(), "validation rejected");
            Err(failure)
        }
    }
}

/// The reporter asked the walk to stop.
#[derive(Debug)]
struct Halt;

type Step<T> = Result<T, Halt>;

struct Walk<'a> {
    library: &'a RuleLibrary,
    reporter: &'a mut dyn ErrorReporter,
    helpers: Helpers,
}

impl<'a> Walk<'a> {
    fn definition(&self, step: &CompiledStep, at: &str) -> Option<&'a Arc<dyn RuleDefinition>> {
        let library: &'a RuleLibrary = self.library;
        let definition = library.get(&step.key);
        if definition.is_none() {
            tracing::warn!(rule = %step.key, pointer = at, "rule missing from runtime library; skipped");
        }
        definition
    }

    fn should_run(&self, step: &CompiledStep, value: Option<&Value>) -> bool {
        step.rule.allow_undefineds || self.helpers.exists(value)
    }

    fn settle<'v>(&self, current: &mut Option<Cow<'v, Value>>, mutation: Option<Value>) -> Step<()> {
        if let Some(value) = mutation {
            *current = Some(Cow::Owned(value));
        }
        if self.reporter.bail() && self.reporter.has_errors() {
            Err(Halt)
        } else {
            Ok(())
        }
    }

    fn replay(&mut self, rejected: Collector) -> Step<()> {
        for error in rejected.errors {
            self.reporter.report(
                &error.pointer,
                &error.rule,
                &error.message,
                error.array_expression_pointer.as_deref(),
                error.args.as_ref(),
            );
            if self.reporter.bail() {
                return Err(Halt);
            }
        }
        Ok(())
    }

    // -- Synchronous walk -----------------------------------------------------

    fn steps<'v>(
        &mut self,
        node: &CompiledNode,
        value: Option<&'v Value>,
        at: &str,
        aep: Option<&str>,
    ) -> Step<Option<Cow<'v, Value>>> {
        let mut current = value.map(Cow::Borrowed);
        for step in &node.steps {
            if !self.should_run(step, current.as_deref()) {
                continue;
            }
            let Some(definition) = self.definition(step, at) else {
                continue;
            };
            let mutation = {
                let mut ctx = RuleContext::new(at, aep, self.helpers, &mut *self.reporter);
                definition.validate(current.as_deref(), &step.rule.options, &mut ctx);
                ctx.take_mutation()
            };
            self.settle(&mut current, mutation)?;
        }
        Ok(current)
    }

    fn node(
        &mut self,
        node: &CompiledNode,
        value: Option<&Value>,
        at: &str,
        aep: Option<&str>,
    ) -> Step<Option<Value>> {
        if node.nullable && matches!(value, Some(Value::Null)) {
            return Ok(Some(Value::Null));
        }
        let current = self.steps(node, value, at, aep)?;

        match &node.kind {
            NodeKind::Literal => Ok(current.map(Cow::into_owned)),
            NodeKind::Object {
                children,
                any_members,
            } => {
                let map = match current.as_deref() {
                    Some(Value::Object(map)) => map,
                    _ => return Ok(current.map(Cow::into_owned)),
                };
                let mut out = if *any_members { map.clone() } else { Map::new() };
                for (name, child) in children {
                    let child_at = pointer::child(at, name);
                    let child_aep = pointer::child_expression(aep, name);
                    let output = self.node(child, map.get(name), &child_at, child_aep.as_deref())?;
                    place(&mut out, name, output);
                }
                Ok(Some(Value::Object(out)))
            }
            NodeKind::Array { member } => {
                let items = match current.as_deref() {
                    Some(Value::Array(items)) => items,
                    _ => return Ok(current.map(Cow::into_owned)),
                };
                let Some(member) = member else {
                    return Ok(Some(Value::Array(items.clone())));
                };
                let element_aep = pointer::elements(at, aep);
                let mut out = Vec::with_capacity(items.len());
                for (index, item) in items.iter().enumerate() {
                    let item_at = pointer::index(at, index);
                    let output = self.node(member, Some(item), &item_at, Some(&element_aep))?;
                    out.push(output.unwrap_or(Value::Null));
                }
                Ok(Some(Value::Array(out)))
            }
            NodeKind::Union { variants } => {
                let candidate = current.as_deref();
                if !self.helpers.exists(candidate) {
                    return Ok(current.map(Cow::into_owned));
                }
                let mut rejected = Collector::default();
                for variant in variants {
                    let mut collector = Collector::default();
                    let outcome = Walk {
                        library: self.library,
                        reporter: &mut collector,
                        helpers: self.helpers,
                    }
                    .node(variant, candidate, at, aep);
                    match outcome {
                        Ok(output) if collector.errors.is_empty() => return Ok(output),
                        _ => rejected = collector,
                    }
                }
                self.replay(rejected)?;
                Ok(current.map(Cow::into_owned))
            }
        }
    }

    // -- Asynchronous walk ----------------------------------------------------

    async fn steps_async<'v>(
        &mut self,
        node: &CompiledNode,
        value: Option<&'v Value>,
        at: &str,
        aep: Option<&str>,
    ) -> Step<Option<Cow<'v, Value>>> {
        let mut current = value.map(Cow::Borrowed);
        for step in &node.steps {
            if !self.should_run(step, current.as_deref()) {
                continue;
            }
            let Some(definition) = self.definition(step, at) else {
                continue;
            };
            let mutation = {
                let mut ctx = RuleContext::new(at, aep, self.helpers, &mut *self.reporter);
                if step.rule.is_async {
                    definition
                        .validate_async(current.as_deref(), &step.rule.options, &mut ctx)
                        .await;
                } else {
                    definition.validate(current.as_deref(), &step.rule.options, &mut ctx);
                }
                ctx.take_mutation()
            };
            self.settle(&mut current, mutation)?;
        }
        Ok(current)
    }

    fn node_async<'s>(
        &'s mut self,
        node: &'s CompiledNode,
        value: Option<&'s Value>,
        at: &'s str,
        aep: Option<&'s str>,
    ) -> BoxFuture<'s, Step<Option<Value>>> {
        if !node.has_async {
            return Box::pin(future::ready(self.node(node, value, at, aep)));
        }
        Box::pin(async move {
            if node.nullable && matches!(value, Some(Value::Null)) {
                return Ok(Some(Value::Null));
            }
            let current = self.steps_async(node, value, at, aep).await?;

            match &node.kind {
                NodeKind::Literal => Ok(current.map(Cow::into_owned)),
                NodeKind::Object {
                    children,
                    any_members,
                } => {
                    let map = match current.as_deref() {
                        Some(Value::Object(map)) => map,
                        _ => return Ok(current.map(Cow::into_owned)),
                    };
                    let mut out = if *any_members { map.clone() } else { Map::new() };
                    for (name, child) in children {
                        let child_at = pointer::child(at, name);
                        let child_aep = pointer::child_expression(aep, name);
                        let output = self
                            .node_async(child, map.get(name), &child_at, child_aep.as_deref())
                            .await?;
                        place(&mut out, name, output);
                    }
                    Ok(Some(Value::Object(out)))
                }
                NodeKind::Array { member } => {
                    let items = match current.as_deref() {
                        Some(Value::Array(items)) => items,
                        _ => return Ok(current.map(Cow::into_owned)),
                    };
                    let Some(member) = member else {
                        return Ok(Some(Value::Array(items.clone())));
                    };
                    let element_aep = pointer::elements(at, aep);
                    let mut out = Vec::with_capacity(items.len());
                    for (index, item) in items.iter().enumerate() {
                        let item_at = pointer::index(at, index);
                        let output = self
                            .node_async(member, Some(item), &item_at, Some(&element_aep))
                            .await?;
                        out.push(output.unwrap_or(Value::Null));
                    }
                    Ok(Some(Value::Array(out)))
                }
                NodeKind::Union { variants } => {
                    let candidate = current.as_deref();
                    if !self.helpers.exists(candidate) {
                        return Ok(current.map(Cow::into_owned));
                    }
                    let mut rejected = Collector::default();
                    for variant in variants {
                        let mut collector = Collector::default();
                        let outcome = {
                            let mut walk = Walk {
                                library: self.library,
                                reporter: &mut collector,
                                helpers: self.helpers,
                            };
                            walk.node_async(variant, candidate, at, aep).await
                        };
                        match outcome {
                            Ok(output) if collector.errors.is_empty() => return Ok(output),
                            _ => rejected = collector,
                        }
                    }
                    self.replay(rejected)?;
                    Ok(current.map(Cow::into_owned))
                }
            }
        })
    }
}

fn place(out: &mut Map<String, Value>, name: &str, output: Option<Value>) {
    match output {
        Some(value) => {
            out.insert(name.to_string(), value);
        }
        None => {
            out.remove(name);
        }
    }
}

/// Private reporter used while trying union variants.
///
/// Keeps raw default messages; the real reporter resolves custom messages
/// when the entries are replayed.
#[derive(Debug, Default)]
struct Collector {
    errors: Vec<ReportedError>,
}

impl ErrorReporter for Collector {
    fn report(
        &mut self,
        pointer: &str,
        rule: &str,
        message: &str,
        array_expression_pointer: Option<&str>,
        args: Option<&Value>,
    ) {
        self.errors.push(ReportedError {
            pointer: pointer.to_string(),
            rule: rule.to_string(),
            message: message.to_string(),
            array_expression_pointer: array_expression_pointer.map(str::to_string),
            args: args.cloned(),
        });
    }

    fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    fn bail(&self) -> bool {
        false
    }

    fn to_error(&mut self) -> ValidationFailure {
        ValidationFailure::new(std::mem::take(&mut self.errors), Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compile;
    use serde_json::json;
    use sift_core::{Messages, VanillaReporter};
    use sift_schema::{rules, schema, Schema};

    fn run(schema: &Schema, data: Value, bail: bool) -> Result<Value, ValidationFailure> {
        let library = RuleLibrary::builtin();
        let routine = compile(schema, &library).unwrap();
        let mut reporter = VanillaReporter::new(Messages::empty(), bail);
        routine
            .run_sync(&data, &library, &mut reporter, Helpers::LOOSE)
            .unwrap()
    }

    #[test]
    fn test_object_strips_undeclared_keys() {
        let s = Schema::create([(
            "user",
            schema::object([("name", schema::string())]),
        )]);
        let out = run(&s, json!({ "user": { "name": "ada", "admin": true }, "extra": 1 }), false);
        assert_eq!(out.unwrap(), json!({ "user": { "name": "ada" } }));
    }

    #[test]
    fn test_any_members_keeps_keys() {
        let s = Schema::create([(
            "meta",
            schema::object_any_members([("id", schema::number())]),
        )]);
        let out = run(&s, json!({ "meta": { "id": "7", "note": "x" } }), false);
        assert_eq!(out.unwrap(), json!({ "meta": { "id": 7, "note": "x" } }));
    }

    #[test]
    fn test_absent_optional_is_omitted() {
        let s = Schema::create([("nick", schema::string().optional())]);
        assert_eq!(run(&s, json!({}), false).unwrap(), json!({}));
    }

    #[test]
    fn test_nullable_null_skips_rules() {
        let s = Schema::create([("age", schema::number().nullable().rule(rules::range(1.0, 2.0)))]);
        assert_eq!(run(&s, json!({ "age": null }), false).unwrap(), json!({ "age": null }));
        let err = run(&s, json!({}), false).unwrap_err();
        assert_eq!(err.errors()[0].rule, "nullable");
    }

    #[test]
    fn test_array_pointers() {
        let s = Schema::create([(
            "emails",
            schema::array(schema::string().rule(rules::email())),
        )]);
        let err = run(&s, json!({ "emails": ["a@x.io", "nope"] }), false).unwrap_err();
        assert_eq!(err.len(), 1);
        assert_eq!(err.errors()[0].pointer, "emails.1");
        assert_eq!(err.errors()[0].array_expression_pointer.as_deref(), Some("emails.*"));
    }

    #[test]
    fn test_nested_array_expression_pointer() {
        let s = Schema::create([(
            "users",
            schema::array(schema::object([("email", schema::string().rule(rules::email()))])),
        )]);
        let err = run(&s, json!({ "users": [{ "email": "bad" }] }), false).unwrap_err();
        assert_eq!(err.errors()[0].pointer, "users.0.email");
        assert_eq!(
            err.errors()[0].array_expression_pointer.as_deref(),
            Some("users.*.email")
        );
    }

    #[test]
    fn test_union_first_match_wins() {
        let s = Schema::create([(
            "id",
            schema::any_of([schema::number(), schema::string().rule(rules::uuid())]),
        )]);
        assert_eq!(run(&s, json!({ "id": "12" }), false).unwrap(), json!({ "id": 12 }));
        let uuid = "f47ac10b-58cc-4372-a567-0e02b2c3d479";
        assert_eq!(run(&s, json!({ "id": uuid }), false).unwrap(), json!({ "id": uuid }));
    }

    #[test]
    fn test_union_reports_last_variant() {
        let s = Schema::create([(
            "id",
            schema::any_of([schema::number(), schema::string().rule(rules::uuid())]),
        )]);
        let err = run(&s, json!({ "id": "abc" }), false).unwrap_err();
        assert_eq!(err.len(), 1);
        assert_eq!(err.errors()[0].rule, "uuid");
    }

    #[test]
    fn test_absent_union_reports_presence_once() {
        let s = Schema::create([
            ("id", schema::any_of([schema::number(), schema::string()])),
            ("alt", schema::any_of([schema::number(), schema::string()]).optional()),
        ]);
        let err = run(&s, json!({}), false).unwrap_err();
        assert_eq!(err.len(), 1);
        assert_eq!(err.errors()[0].pointer, "id");
        assert_eq!(err.errors()[0].rule, "required");
    }

    #[test]
    fn test_non_object_root_sees_absent_fields() {
        let s = Schema::create([("name", schema::string())]);
        let err = run(&s, json!([1, 2]), false).unwrap_err();
        assert_eq!(err.errors()[0].pointer, "name");
        assert_eq!(err.errors()[0].rule, "required");
    }

    #[test]
    fn test_missing_runtime_rule_is_skipped() {
        let s = Schema::create([("tag", schema::string().rule(rules::alpha()))]);
        let compiled_with = RuleLibrary::builtin();
        let routine = compile(&s, &compiled_with).unwrap();
        let runtime = RuleLibrary::new();
        let mut reporter = VanillaReporter::new(Messages::empty(), false);
        let out = routine
            .run_sync(&json!({ "tag": "a b" }), &runtime, &mut reporter, Helpers::LOOSE)
            .unwrap();
        assert_eq!(out.unwrap(), json!({ "tag": "a b" }));
    }

    #[test]
    fn test_collector_never_bails() {
        let mut collector = Collector::default();
        collector.report("a", "required", "required validation failed", None, None);
        assert!(collector.has_errors());
        assert!(!collector.bail());
        assert_eq!(collector.to_error().len(), 1);
        assert!(!collector.has_errors());
    }
}
