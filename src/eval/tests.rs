//! Unit tests for constant evaluation.

use crate::{
    ast::ast::DeclId,
    context::{compile, parse_expression, parse_value_expression, Context},
    errors::errors::ErrorImpl,
    eval::{evaluator::EvalMode, value::Value},
    types::types::IntRank,
};

fn compile_ok(source: &str) -> (Context, DeclId) {
    compile(source.to_string(), Some("test.bn".to_string())).unwrap()
}

fn member(cx: &Context, unit: DeclId, name: &str) -> DeclId {
    cx.find_member(unit, name).unwrap()
}

fn eval(cx: &mut Context, unit: DeclId, source: &str, mode: EvalMode) -> Option<Value> {
    let expr = parse_value_expression(cx, unit, source).unwrap();
    cx.evaluator(mode).evaluate(expr).unwrap()
}

#[test]
fn test_folds_arithmetic() {
    let (mut cx, unit) = compile_ok("val a = 6 * 7; val b = a - 2 * 3 % 4; val c = -a;");

    let a = member(&cx, unit, "a");
    let b = member(&cx, unit, "b");
    let c = member(&cx, unit, "c");

    assert_eq!(cx.store.get(a), Value::Integer(42));
    assert_eq!(cx.store.get(b), Value::Integer(40));
    assert_eq!(cx.store.get(c), Value::Integer(-42));
    assert_eq!(
        cx.evaluator(EvalMode::ConstantEval).fetch_value(b).unwrap(),
        Some(Value::Integer(40))
    );
}

#[test]
fn test_bitwise_and_comparisons() {
    let (mut cx, unit) = compile_ok("val x = 12;");

    assert_eq!(
        eval(&mut cx, unit, "x & 10", EvalMode::ConstantEval),
        Some(Value::Integer(8))
    );
    assert_eq!(
        eval(&mut cx, unit, "x | 3", EvalMode::ConstantEval),
        Some(Value::Integer(15))
    );
    assert_eq!(
        eval(&mut cx, unit, "x ^ 4", EvalMode::ConstantEval),
        Some(Value::Integer(8))
    );
    assert_eq!(
        eval(&mut cx, unit, "~x", EvalMode::ConstantEval),
        Some(Value::Integer(-13))
    );
    assert_eq!(
        eval(&mut cx, unit, "x >= 12", EvalMode::ConstantEval),
        Some(Value::Integer(1))
    );
    assert_eq!(
        eval(&mut cx, unit, "x != 12", EvalMode::ConstantEval),
        Some(Value::Integer(0))
    );
    assert_eq!(
        eval(&mut cx, unit, "!(x < 3)", EvalMode::ConstantEval),
        Some(Value::Integer(1))
    );
}

#[test]
fn test_numeric_conversions() {
    let (cx, unit) = compile_ok(
        "val f : f64 = 1; val i : int = 2.9; val h = 1 + 0.5; val s : f32 = 0.1; val b : bool = 3;",
    );

    assert_eq!(cx.store.get(member(&cx, unit, "f")), Value::Float(1.0));
    assert_eq!(cx.store.get(member(&cx, unit, "i")), Value::Integer(2));
    assert_eq!(cx.store.get(member(&cx, unit, "h")), Value::Float(1.5));
    assert_eq!(
        cx.store.get(member(&cx, unit, "s")),
        Value::Float(0.1f32 as f64)
    );
    assert_eq!(cx.store.get(member(&cx, unit, "b")), Value::Integer(1));
}

#[test]
fn test_float_arithmetic() {
    let (mut cx, unit) = compile_ok("val q = 7.0 / 2.0;");

    assert_eq!(cx.store.get(member(&cx, unit, "q")), Value::Float(3.5));
    assert_eq!(
        eval(&mut cx, unit, "q > 3", EvalMode::ConstantEval),
        Some(Value::Integer(1))
    );
}

#[test]
fn test_division_by_zero_depends_on_mode() {
    let (mut cx, unit) = compile_ok("val d = 1 / 0;");
    let d = member(&cx, unit, "d");

    // Folding gave up on it at compile time.
    assert!(cx.store.get_if(d).is_none());
    assert_eq!(
        cx.evaluator(EvalMode::ConstantFold).fetch_value(d).unwrap(),
        None
    );

    let error = cx
        .evaluator(EvalMode::PotentialEval)
        .fetch_value(d)
        .unwrap_err();
    assert_eq!(*error.get_impl(), ErrorImpl::DivisionByZero);

    let error = cx
        .evaluator(EvalMode::ConstantEval)
        .fetch_value(d)
        .unwrap_err();
    assert_eq!(*error.get_impl(), ErrorImpl::DivisionByZero);
}

#[test]
fn test_integer_overflow_respects_rank() {
    let (mut cx, unit) = compile_ok("val o : i8 = 100; val p = o + o; val q = o + 100;");

    let p = member(&cx, unit, "p");
    let error = cx
        .evaluator(EvalMode::ConstantEval)
        .fetch_value(p)
        .unwrap_err();
    assert_eq!(*error.get_impl(), ErrorImpl::IntegerOverflow);

    // `o + 100` is computed as `int`.
    let q = member(&cx, unit, "q");
    assert_eq!(cx.store.get(q), Value::Integer(200));
    assert_eq!(
        cx.ast.decl(q).ty,
        Some(cx.types.get_int(IntRank::I32))
    );
}

#[test]
fn test_out_of_range_conversion_overflows() {
    let (mut cx, unit) = compile_ok("val big : i16 = 70000;");
    let big = member(&cx, unit, "big");

    let error = cx
        .evaluator(EvalMode::ConstantEval)
        .fetch_value(big)
        .unwrap_err();
    assert_eq!(*error.get_impl(), ErrorImpl::IntegerOverflow);
}

#[test]
fn test_calls_are_not_constant() {
    let (mut cx, unit) = compile_ok("func one() -> int { return 1; } val x = one();");
    let x = member(&cx, unit, "x");

    assert_eq!(
        cx.evaluator(EvalMode::PotentialEval).fetch_value(x).unwrap(),
        None
    );

    let error = cx
        .evaluator(EvalMode::ConstantEval)
        .fetch_value(x)
        .unwrap_err();
    assert_eq!(error.get_error_name(), "NonConstantExpression");
}

#[test]
fn test_functions_evaluate_to_themselves() {
    let (mut cx, unit) = compile_ok("func f() { } val g = f;");
    let f = member(&cx, unit, "f");

    assert_eq!(
        eval(&mut cx, unit, "g", EvalMode::ConstantEval),
        Some(Value::Function(f))
    );
    assert_eq!(
        eval(&mut cx, unit, "f ? 1 : 2", EvalMode::ConstantEval),
        Some(Value::Integer(1))
    );
}

#[test]
fn test_parameters_have_automatic_storage() {
    let (mut cx, unit) = compile_ok("func f(p : int) -> int { return p; }");
    let f = member(&cx, unit, "f");

    let expr = parse_value_expression(&mut cx, f, "p + 1").unwrap();
    assert_eq!(
        cx.evaluator(EvalMode::PotentialEval).evaluate(expr).unwrap(),
        None
    );

    let error = cx
        .evaluator(EvalMode::ConstantEval)
        .evaluate(expr)
        .unwrap_err();
    assert_eq!(error.get_error_name(), "AutomaticStorage");
}

#[test]
fn test_cyclic_initialization() {
    let (mut cx, unit) = compile_ok("val a = b; val b = a;");
    let a = member(&cx, unit, "a");

    let error = cx
        .evaluator(EvalMode::ConstantEval)
        .fetch_value(a)
        .unwrap_err();
    assert_eq!(error.get_error_name(), "CyclicInitialization");
}

#[test]
fn test_assignment_yields_reference() {
    let (mut cx, unit) = compile_ok("var x : int = 1;");
    let x = member(&cx, unit, "x");
    let object = cx.store.get(x).as_reference().unwrap();

    let expr = parse_expression(&mut cx, unit, "x = 2 + 3").unwrap();
    let result = cx.evaluator(EvalMode::ConstantEval).evaluate(expr).unwrap();

    assert_eq!(result, Some(Value::Reference(object)));
    assert_eq!(cx.store.object(object).value(), Value::Integer(5));
    assert!(cx.store.object(object).is_constant_written());
}

#[test]
fn test_variable_initializer_is_not_constant() {
    let (mut cx, unit) = compile_ok("var v : int = 10;");
    let v = member(&cx, unit, "v");

    let object = cx.store.get(v).as_reference().unwrap();
    assert_eq!(cx.store.object(object).value(), Value::Integer(10));

    assert_eq!(
        cx.evaluator(EvalMode::PotentialEval).read(v).unwrap(),
        None
    );
    let error = cx.evaluator(EvalMode::ConstantEval).read(v).unwrap_err();
    assert_eq!(error.get_error_name(), "NonConstantGlobal");
}

#[test]
fn test_conditional_reference_result() {
    let (mut cx, unit) = compile_ok("var a : int; var b : int;");
    let b = member(&cx, unit, "b");
    let object = cx.store.get(b).as_reference().unwrap();

    let expr = parse_expression(&mut cx, unit, "(false ? a : b) = 9").unwrap();
    cx.evaluator(EvalMode::ConstantEval).evaluate(expr).unwrap();

    assert_eq!(cx.store.object(object).value(), Value::Integer(9));
    assert_eq!(
        eval(&mut cx, unit, "b", EvalMode::ConstantEval),
        Some(Value::Integer(9))
    );
}

#[test]
fn test_forward_auto_operands_fold() {
    let (cx, unit) = compile_ok("val b = a + 1.5; val a = 2;");

    assert_eq!(cx.store.get(member(&cx, unit, "b")), Value::Float(3.5));
    assert_eq!(cx.store.get(member(&cx, unit, "a")), Value::Integer(2));
}

#[test]
fn test_auto_value_converts_to_declared_type() {
    let (cx, unit) = compile_ok("val b = a; val c : int = b; val a = 2.5;");

    assert_eq!(cx.store.get(member(&cx, unit, "b")), Value::Float(2.5));
    assert_eq!(cx.store.get(member(&cx, unit, "c")), Value::Integer(2));
}

#[test]
fn test_cyclic_auto_operands_are_promoted() {
    let (cx, unit) = compile_ok("val a = true || b; val b = a + 1.5;");

    assert_eq!(cx.store.get(member(&cx, unit, "a")), Value::Integer(1));
    assert_eq!(cx.store.get(member(&cx, unit, "b")), Value::Float(2.5));
}

#[test]
fn test_cyclic_auto_operand_mismatch_is_an_error() {
    let (mut cx, unit) = compile_ok("func h() { } val p = q + 1; val q = true ? h : p;");
    let p = member(&cx, unit, "p");
    let h = member(&cx, unit, "h");

    assert!(cx.store.get_if(p).is_none());
    assert_eq!(cx.store.get(member(&cx, unit, "q")), Value::Function(h));

    let error = cx
        .evaluator(EvalMode::ConstantEval)
        .fetch_value(p)
        .unwrap_err();
    assert_eq!(error.get_error_name(), "OperandMismatch");
}

#[test]
fn test_initializer_writing_its_own_variable() {
    let (mut cx, unit) = compile_ok("var v : int = v = 3;");
    let v = member(&cx, unit, "v");

    assert!(cx.store.get_if(v).is_none());

    let error = cx
        .evaluator(EvalMode::ConstantEval)
        .fetch_value(v)
        .unwrap_err();
    assert_eq!(
        *error.get_impl(),
        ErrorImpl::CyclicInitialization {
            name: String::from("v")
        }
    );
    assert!(cx.store.get_if(v).is_none());
}

#[test]
fn test_failed_variable_initializer_reports_its_error() {
    let (mut cx, unit) = compile_ok("var v : int = 1 / 0;");
    let v = member(&cx, unit, "v");

    assert!(cx.store.get_if(v).is_none());

    let error = cx.evaluator(EvalMode::ConstantEval).read(v).unwrap_err();
    assert_eq!(*error.get_impl(), ErrorImpl::DivisionByZero);

    let error = cx.evaluator(EvalMode::ConstantEval).read(v).unwrap_err();
    assert_eq!(*error.get_impl(), ErrorImpl::DivisionByZero);
}
