//! Unit tests for the parser module.
//!
//! This module contains tests for parsing the language constructs including:
//! - Deferred top-level declarations and forward references
//! - Operator precedence and associativity
//! - Argument and parameter lists
//! - Function bodies with local declarations and control flow

use crate::{
    ast::ast::DeclId,
    context::{compile, parse_expression, Context},
    errors::errors::Error,
    eval::{evaluator::EvalMode, value::Value},
    lexer::lexer::tokenize,
    symbols::symbols::SymbolTable,
    types::types::{IntRank, Type},
};

use super::deferred::{DeferredAction, DeferredKind, Scheduler};

fn compile_ok(source: &str) -> (Context, DeclId) {
    compile(source.to_string(), Some("test.bn".to_string())).unwrap()
}

fn compile_err(source: &str) -> Error {
    compile(source.to_string(), Some("test.bn".to_string())).unwrap_err()
}

fn folded(cx: &Context, unit: DeclId, name: &str) -> Value {
    cx.store.get(cx.find_member(unit, name).unwrap())
}

#[test]
fn test_parse_empty_program() {
    let (cx, unit) = compile_ok("");

    assert!(cx.members(unit).is_empty());
    assert!(cx.ast.decl(unit).is_translation_unit());
}

#[test]
fn test_forward_reference_to_function() {
    let (cx, unit) = compile_ok(
        "func f() -> int { return g(); } func g() -> int { return 1; }",
    );

    let f = cx.find_member(unit, "f").unwrap();
    let g = cx.find_member(unit, "g").unwrap();
    assert!(cx.ast.decl(f).as_function().unwrap().body.is_some());
    assert_eq!(cx.ast.decl(f).ty, cx.ast.decl(g).ty);
}

#[test]
fn test_forward_reference_to_value() {
    let (cx, unit) = compile_ok("val a : int = b + 1; val b : int = 2;");

    assert_eq!(folded(&cx, unit, "a"), Value::Integer(3));
    assert_eq!(folded(&cx, unit, "b"), Value::Integer(2));
}

#[test]
fn test_members_keep_declaration_order() {
    let (cx, unit) = compile_ok("func z() { } val y = 1; var x : bool;");
    let names: Vec<&str> = cx
        .members(unit)
        .iter()
        .map(|decl| cx.name(*decl))
        .collect();

    assert_eq!(names, vec!["z", "y", "x"]);
}

#[test]
fn test_binary_precedence() {
    let (cx, unit) = compile_ok(
        "val a = 1 + 2 * 3; val b = (1 + 2) * 3; val c = 10 - 4 - 3; val d = ~0 + 1; val e = 1 | 6 & 3;",
    );

    assert_eq!(folded(&cx, unit, "a"), Value::Integer(7));
    assert_eq!(folded(&cx, unit, "b"), Value::Integer(9));
    assert_eq!(folded(&cx, unit, "c"), Value::Integer(3));
    assert_eq!(folded(&cx, unit, "d"), Value::Integer(0));
    assert_eq!(folded(&cx, unit, "e"), Value::Integer(3));
}

#[test]
fn test_logical_precedence() {
    let (cx, unit) = compile_ok(
        "val a = true || false && false; val b = 1 < 2 == 2 < 3; val c = !false && 3 > 2;",
    );

    assert_eq!(folded(&cx, unit, "a"), Value::Integer(1));
    assert_eq!(folded(&cx, unit, "b"), Value::Integer(1));
    assert_eq!(folded(&cx, unit, "c"), Value::Integer(1));
}

#[test]
fn test_conditional_is_right_associative() {
    let (cx, unit) = compile_ok(
        "val c = true ? 1 : false ? 2 : 3; val d = false ? 1 : true ? 2 : 3; val e = false ? 1 : false ? 2 : 3;",
    );

    assert_eq!(folded(&cx, unit, "c"), Value::Integer(1));
    assert_eq!(folded(&cx, unit, "d"), Value::Integer(2));
    assert_eq!(folded(&cx, unit, "e"), Value::Integer(3));
}

#[test]
fn test_assignment_is_right_associative() {
    let (mut cx, unit) = compile_ok("var a : int; var b : int;");
    let a = cx.store.get(cx.find_member(unit, "a").unwrap());
    let b = cx.store.get(cx.find_member(unit, "b").unwrap());

    let expr = parse_expression(&mut cx, unit, "a = b = 3").unwrap();
    let result = cx.evaluator(EvalMode::ConstantEval).evaluate(expr).unwrap();
    assert_eq!(result, Some(a));

    for value in [a, b] {
        let object = value.as_reference().unwrap();
        assert_eq!(cx.store.object(object).value(), Value::Integer(3));
    }
}

#[test]
fn test_argument_list_must_terminate() {
    let source = "func f(a : int, b : int) -> int { return a; }";

    let trailing = compile_err(&format!("{} val x = f(1,);", source));
    assert_eq!(trailing.get_error_name(), "UnexpectedToken");

    let missing = compile_err(&format!("{} val x = f(1 2);", source));
    assert_eq!(missing.get_error_name(), "UnexpectedTokenDetailed");

    assert!(compile(format!("{} func g() {{ f(1, 2); }}", source), None).is_ok());
}

#[test]
fn test_parameter_list_must_terminate() {
    assert_eq!(
        compile_err("func f(a : int b : int) { }").get_error_name(),
        "UnexpectedTokenDetailed"
    );
    assert_eq!(
        compile_err("func f(a : int,) { }").get_error_name(),
        "UnexpectedTokenDetailed"
    );
    assert_eq!(
        compile_err("func f(a) { }").get_error_name(),
        "UnexpectedToken"
    );
}

#[test]
fn test_function_type_parameters() {
    let (cx, unit) = compile_ok(
        "func apply(g : func(int) -> int, x : int) -> int { return g(x); }
         func twice(x : int) -> int { return x * 2; }
         func run() -> int { return apply(twice, 4); }
         val h : func(int) -> int = twice;",
    );

    let apply = cx.find_member(unit, "apply").unwrap();
    let Type::Function { params, ret } = cx.types.get(cx.ast.decl(apply).ty.unwrap()) else {
        panic!("expected a function type");
    };

    let int = cx.types.get_int(IntRank::I32);
    assert_eq!(params.len(), 2);
    assert_eq!(params[1], int);
    assert_eq!(*ret, int);
    assert!(matches!(cx.types.get(params[0]), Type::Function { .. }));

    let twice = cx.find_member(unit, "twice").unwrap();
    assert_eq!(folded(&cx, unit, "h"), Value::Function(twice));
}

#[test]
fn test_nested_brackets_are_captured() {
    let (cx, unit) = compile_ok(
        "val x = (1 + (2 * (3))); func f() { { val a = (1); } { } }",
    );

    assert_eq!(folded(&cx, unit, "x"), Value::Integer(7));
    let f = cx.find_member(unit, "f").unwrap();
    assert!(cx.ast.decl(f).as_function().unwrap().body.is_some());
}

#[test]
fn test_unterminated_declarations() {
    assert_eq!(
        compile_err("val x = 1").get_error_name(),
        "UnexpectedTokenDetailed"
    );
    assert_eq!(
        compile_err("func f() { val a = 1;").get_error_name(),
        "UnexpectedTokenDetailed"
    );
    assert_eq!(
        compile_err("val x = (1;").get_error_name(),
        "UnexpectedTokenDetailed"
    );
    assert_eq!(
        compile_err("val x = 1);").get_error_name(),
        "UnexpectedToken"
    );
}

#[test]
fn test_malformed_declarations() {
    assert_eq!(
        compile_err("val = 1;").get_error_name(),
        "UnexpectedTokenDetailed"
    );
    assert_eq!(
        compile_err("val x = ;").get_error_name(),
        "UnexpectedTokenDetailed"
    );
    assert_eq!(
        compile_err("1 + 2;").get_error_name(),
        "UnexpectedTokenDetailed"
    );
    assert_eq!(
        compile_err("val x : = 1;").get_error_name(),
        "UnexpectedTokenDetailed"
    );
    assert_eq!(
        compile_err("val x = 1 2;").get_error_name(),
        "UnexpectedToken"
    );
}

#[test]
fn test_function_body_statements() {
    let source = "
        func f(n : int) -> int {
            var i = 0;
            var acc : int = 1;
            while i < n {
                acc = acc * 2;
                i = i + 1;
            }
            if acc > 100 { return 100; } else { return acc; }
            ;
        }
        func g(var x : int) -> bool {
            if x < 0 x = -x;
            { val x = 1.5; }
            return x == 0;
        }
    ";

    let (cx, unit) = compile_ok(source);
    assert!(cx.find_member(unit, "f").is_some());
    assert!(cx.find_member(unit, "g").is_some());
}

#[test]
fn test_locals_are_not_members() {
    let (cx, unit) = compile_ok("func f() { val local = 1; }");
    let f = cx.find_member(unit, "f").unwrap();

    assert!(cx.find_member(unit, "local").is_none());
    assert!(cx.find_member(f, "local").is_none());
}

#[test]
fn test_local_redeclaration() {
    assert_eq!(
        compile_err("func f() { val a = 1; var a : int; }").get_error_name(),
        "Redeclaration"
    );
    assert_eq!(
        compile_err("func f(a : int) { } func f() { }").get_error_name(),
        "Redeclaration"
    );
}

#[test]
fn test_scheduler_runs_passes_in_order() {
    let mut symbols = SymbolTable::new();
    let tokens = tokenize(String::new(), None, &mut symbols).unwrap();
    let end = tokens[0].clone();

    let action = |kind, decl| DeferredAction {
        kind,
        decl: DeclId::from_raw(decl),
        tokens: vec![],
        end: end.clone(),
    };

    let mut scheduler = Scheduler::default();
    scheduler.enqueue(action(DeferredKind::Body, 0));
    scheduler.enqueue(action(DeferredKind::Initializer, 1));
    scheduler.enqueue(action(DeferredKind::Type, 2));
    scheduler.enqueue(action(DeferredKind::Signature, 3));
    scheduler.enqueue(action(DeferredKind::Initializer, 4));
    assert_eq!(scheduler.len(), 5);

    let order: Vec<(DeferredKind, DeclId)> = std::iter::from_fn(|| scheduler.next())
        .map(|action| (action.kind, action.decl))
        .collect();

    assert_eq!(
        order,
        vec![
            (DeferredKind::Type, DeclId::from_raw(2)),
            (DeferredKind::Signature, DeclId::from_raw(3)),
            (DeferredKind::Initializer, DeclId::from_raw(1)),
            (DeferredKind::Initializer, DeclId::from_raw(4)),
            (DeferredKind::Body, DeclId::from_raw(0)),
        ]
    );
    assert!(scheduler.is_empty());
}

#[test]
fn test_parse_expression_in_function_scope() {
    let (mut cx, unit) = compile_ok("val p = 1; func f(p : bool) { }");
    let f = cx.find_member(unit, "f").unwrap();

    let expr = parse_expression(&mut cx, f, "p").unwrap();
    assert_eq!(cx.ast.expr(expr).ty, cx.types.get_bool());

    let expr = parse_expression(&mut cx, unit, "p").unwrap();
    assert_eq!(cx.ast.expr(expr).ty, cx.types.get_int(IntRank::I32));

    assert!(parse_expression(&mut cx, unit, "p p").is_err());
}

#[test]
fn test_scheduler_takes_pending_initializer() {
    let mut symbols = SymbolTable::new();
    let tokens = tokenize(String::new(), None, &mut symbols).unwrap();
    let end = tokens[0].clone();

    let action = |kind, decl| DeferredAction {
        kind,
        decl: DeclId::from_raw(decl),
        tokens: vec![],
        end: end.clone(),
    };

    let mut scheduler = Scheduler::default();
    scheduler.enqueue(action(DeferredKind::Type, 1));
    scheduler.enqueue(action(DeferredKind::Initializer, 0));
    scheduler.enqueue(action(DeferredKind::Initializer, 1));

    let taken = scheduler.take_initializer(DeclId::from_raw(1)).unwrap();
    assert_eq!(taken.kind, DeferredKind::Initializer);
    assert!(scheduler.take_initializer(DeclId::from_raw(1)).is_none());
    assert!(scheduler.take_initializer(DeclId::from_raw(2)).is_none());
    assert_eq!(scheduler.len(), 2);
}

#[test]
fn test_forward_auto_initializers_chain() {
    let (cx, unit) = compile_ok("val a = b * 2; val b = c + 0.5; val c = 1;");

    assert_eq!(folded(&cx, unit, "a"), Value::Float(3.0));
    assert_eq!(folded(&cx, unit, "b"), Value::Float(1.5));
    assert_eq!(folded(&cx, unit, "c"), Value::Integer(1));
}
