//! Unit tests for name resolution and the conversion rules.

use std::rc::Rc;

use crate::{
    ast::{ast::DeclId, expressions::ExprKind},
    context::{compile, Context},
    errors::errors::Error,
    types::types::{FloatRank, IntRank},
    Position, Span,
};

use super::semantics::Semantics;

fn span() -> Span {
    let file = Rc::new("test.bn".to_string());
    Span {
        start: Position(0, Rc::clone(&file)),
        end: Position(0, file),
    }
}

fn compile_ok(source: &str) -> (Context, DeclId) {
    compile(source.to_string(), Some("test.bn".to_string())).unwrap()
}

fn compile_err(source: &str) -> Error {
    compile(source.to_string(), Some("test.bn".to_string())).unwrap_err()
}

#[test]
fn test_redeclaration_in_one_scope() {
    let mut cx = Context::new();
    let mut sema = Semantics::new(&mut cx);
    let unit = sema.on_translation_unit(span());
    sema.enter_declaration(unit);

    let x = sema.cx.symbols.intern("x");
    sema.identify_data(x, false, span()).unwrap();
    let error = sema.identify_data(x, true, span()).unwrap_err();

    assert_eq!(error.get_error_name(), "Redeclaration");
}

#[test]
fn test_shadowing_in_nested_scope() {
    let mut cx = Context::new();
    let mut sema = Semantics::new(&mut cx);
    let unit = sema.on_translation_unit(span());
    sema.enter_declaration(unit);

    let x = sema.cx.symbols.intern("x");
    let outer = sema.identify_data(x, false, span()).unwrap();

    sema.scopes.enter_block();
    let inner = sema.identify_data(x, true, span()).unwrap();
    assert_eq!(sema.lookup(x), Some(inner));
    sema.scopes.leave_block();

    assert_eq!(sema.lookup(x), Some(outer));
    sema.scopes.leave_declaration(unit);
    assert!(sema.scopes.is_empty());

    // Only the translation unit's own record knows the outer declaration.
    let members = cx.members(unit);
    assert_eq!(members, &[outer]);
}

#[test]
fn test_lookup_does_not_merge_outer_scopes() {
    let (mut cx, unit) = compile_ok("val x = 1; func f(x : bool) { }");
    let f = cx.find_member(unit, "f").unwrap();
    let x = cx.symbols.find("x").unwrap();

    let mut sema = Semantics::new(&mut cx);
    sema.restore(f);
    sema.enter_declaration(f);

    let found = sema.scopes.lookup(&sema.cx.ast, x).unwrap();
    assert_eq!(found.len(), 1);
    assert!(!sema.cx.ast.has_static_storage(found[0]));
}

#[test]
fn test_restore_pushes_enclosing_declarations() {
    let (mut cx, unit) = compile_ok("func f(a : int) { }");
    let f = cx.find_member(unit, "f").unwrap();
    let a = cx.ast.decl(f).as_function().unwrap().params[0];

    let mut sema = Semantics::new(&mut cx);
    sema.restore(a);
    assert_eq!(sema.scopes.depth(), 2);
    assert_eq!(sema.scopes.current_declaration(), Some(f));

    sema.scopes.empty();
    assert!(sema.scopes.is_empty());

    sema.restore(f);
    assert_eq!(sema.scopes.depth(), 1);
    assert_eq!(sema.scopes.current_declaration(), Some(unit));
}

#[test]
#[should_panic(expected = "unbalanced scope stack")]
fn test_unbalanced_leave_panics() {
    let mut cx = Context::new();
    let mut sema = Semantics::new(&mut cx);
    let unit = sema.on_translation_unit(span());

    sema.scopes.enter_block();
    sema.scopes.leave_declaration(unit);
}

#[test]
#[should_panic(expected = "is not a scoped declaration")]
fn test_entering_unscoped_declaration_panics() {
    let mut cx = Context::new();
    let mut sema = Semantics::new(&mut cx);
    let unit = sema.on_translation_unit(span());
    sema.enter_declaration(unit);

    let x = sema.cx.symbols.intern("x");
    let decl = sema.identify_data(x, false, span()).unwrap();
    sema.enter_declaration(decl);
}

#[test]
fn test_incomplete_declaration() {
    let mut cx = Context::new();
    let mut sema = Semantics::new(&mut cx);
    let unit = sema.on_translation_unit(span());
    sema.enter_declaration(unit);

    let x = sema.cx.symbols.intern("x");
    sema.identify_data(x, false, span()).unwrap();
    let error = sema.on_id_expression(x, span()).unwrap_err();

    assert_eq!(error.get_error_name(), "IncompleteDeclaration");
}

#[test]
fn test_variables_are_references() {
    let (mut cx, unit) = compile_ok("var v : int = 1; val w : f64 = v;");
    let w = cx.find_member(unit, "w").unwrap();
    let init = cx.ast.decl(w).initializer().unwrap();

    let ExprKind::NumericConversion(loaded) = cx.ast.expr(init).kind else {
        panic!("expected a numeric conversion");
    };
    let ExprKind::ValueConversion(id) = cx.ast.expr(loaded).kind else {
        panic!("expected a value conversion");
    };

    let int = cx.types.get_int(IntRank::I32);
    let int_ref = cx.types.get_reference(int);
    assert_eq!(cx.ast.expr(loaded).ty, int);
    assert_eq!(cx.ast.expr(id).ty, int_ref);
    assert_eq!(cx.ast.expr(init).ty, cx.types.get_float(FloatRank::F64));
}

#[test]
fn test_variable_initializer_is_value_init() {
    let (cx, unit) = compile_ok("var v : i64 = 1;");
    let v = cx.find_member(unit, "v").unwrap();
    let init = cx.ast.decl(v).initializer().unwrap();

    assert!(matches!(cx.ast.expr(init).kind, ExprKind::ValueInit { .. }));
    assert!(cx.types.is_unit(cx.ast.expr(init).ty));
}

#[test]
fn test_auto_is_refined_to_initializer_type() {
    let (cx, unit) = compile_ok("var a = 1.5; val b = a; val c = d; val d = 1;");
    let ty = |name: &str| cx.ast.decl(cx.find_member(unit, name).unwrap()).ty.unwrap();

    assert_eq!(ty("a"), cx.types.get_float(FloatRank::F64));
    assert_eq!(ty("b"), cx.types.get_float(FloatRank::F64));
    // `d` is analyzed as soon as `c` names it.
    assert_eq!(ty("c"), cx.types.get_int(IntRank::I32));
    assert_eq!(ty("d"), cx.types.get_int(IntRank::I32));
}

#[test]
fn test_forward_auto_operand_is_refined() {
    let (cx, unit) = compile_ok("val b = a + 1.5; val a = 2; val n = -m; val m = 4;");
    let ty = |name: &str| cx.ast.decl(cx.find_member(unit, name).unwrap()).ty.unwrap();

    assert_eq!(ty("a"), cx.types.get_int(IntRank::I32));
    assert_eq!(ty("b"), cx.types.get_float(FloatRank::F64));
    assert_eq!(ty("n"), cx.types.get_int(IntRank::I32));
}

#[test]
fn test_forward_auto_operand_is_type_checked() {
    assert_eq!(
        compile_err("val b = ~a; val a = 2.5;").get_error_name(),
        "TypeMatchError"
    );
    assert_eq!(
        compile_err("val b : int = a; val a = f; func f() { }").get_error_name(),
        "TypeMatchError"
    );
}

#[test]
fn test_cyclic_auto_declarations_stay_auto() {
    let (cx, unit) = compile_ok("val p = q; val q = p;");
    let ty = |name: &str| cx.ast.decl(cx.find_member(unit, name).unwrap()).ty.unwrap();

    assert!(cx.types.is_auto(ty("p")));
    assert!(cx.types.is_auto(ty("q")));
}

#[test]
fn test_auto_operand_converts_to_declared_type() {
    // `u` is still being analyzed when `w` assigns it to `t`.
    let (cx, unit) = compile_ok("var t : int; val u = w; val w = t = u;");
    let w = cx.find_member(unit, "w").unwrap();
    let init = cx.ast.decl(w).initializer().unwrap();

    let ExprKind::ValueConversion(assign) = cx.ast.expr(init).kind else {
        panic!("expected a load of the assignment");
    };
    let ExprKind::Assign { value, .. } = cx.ast.expr(assign).kind else {
        panic!("expected an assignment");
    };
    assert!(matches!(cx.ast.expr(value).kind, ExprKind::NumericConversion(_)));
    assert_eq!(cx.ast.expr(value).ty, cx.types.get_int(IntRank::I32));
}

#[test]
fn test_large_literals_are_i64() {
    let (cx, unit) = compile_ok("val big = 3000000000;");
    let big = cx.find_member(unit, "big").unwrap();

    assert_eq!(cx.ast.decl(big).ty, Some(cx.types.get_int(IntRank::I64)));
}

#[test]
fn test_common_type_errors() {
    assert_eq!(
        compile_err("val x = true + 1;").get_error_name(),
        "NoCommonType"
    );
    assert_eq!(
        compile_err("func f() { } val x = f + 1;").get_error_name(),
        "NoCommonType"
    );
    assert_eq!(
        compile_err("val x = 1.5 % 2;").get_error_name(),
        "TypeMatchError"
    );
    assert_eq!(
        compile_err("val x = 1.5 | 2;").get_error_name(),
        "TypeMatchError"
    );
    assert_eq!(
        compile_err("val x = true < false;").get_error_name(),
        "TypeMatchError"
    );
}

#[test]
fn test_conversion_errors() {
    assert_eq!(
        compile_err("val x = 1; val y = x = 2;").get_error_name(),
        "ReferenceRequired"
    );
    assert_eq!(
        compile_err("func f() { } val b = !f();").get_error_name(),
        "NotConvertibleToBool"
    );
    assert_eq!(
        compile_err("val x : &int = 1;").get_error_name(),
        "TypeMatchError"
    );
    assert_eq!(
        compile_err("val y;").get_error_name(),
        "MissingInitializer"
    );
    assert_eq!(
        compile_err("val u = nothing;").get_error_name(),
        "UnresolvedIdentifier"
    );
}

#[test]
fn test_call_errors() {
    assert_eq!(
        compile_err("val c = 3(1);").get_error_name(),
        "NotCallable"
    );

    let error = compile_err("func f(a : int) -> int { return a; } val r = f(1, 2);");
    assert_eq!(error.get_error_name(), "ArgumentCountMismatch");
}

#[test]
fn test_return_checks() {
    assert_eq!(
        compile_err("func f() -> int { return; }").get_error_name(),
        "TypeMatchError"
    );
    assert_eq!(
        compile_err("func g() { return 1; }").get_error_name(),
        "TypeMatchError"
    );
    assert!(compile("func h(x : i8) -> f32 { return x; }".to_string(), None).is_ok());
}

#[test]
fn test_var_parameters_are_assignable() {
    assert!(compile("func f(var x : int) { x = x + 1; }".to_string(), None).is_ok());
    assert_eq!(
        compile_err("func g(x : int) { x = 1; }").get_error_name(),
        "ReferenceRequired"
    );
}
