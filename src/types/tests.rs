//! Unit tests for type interning.

use super::types::{FloatRank, IntRank, Type, TypeFactory};

#[test]
fn test_singletons_are_stable() {
    let types = TypeFactory::new();

    assert_eq!(types.get_unit(), types.get_unit());
    assert_eq!(types.get_int(IntRank::I32), types.get_int(IntRank::I32));
    assert_ne!(types.get_int(IntRank::I32), types.get_int(IntRank::I64));
    assert_ne!(types.get_float(FloatRank::F32), types.get_float(FloatRank::F64));
    assert_ne!(types.get_bool(), types.get_auto());
    assert_eq!(*types.get(types.get_int(IntRank::I16)), Type::Int(IntRank::I16));
}

#[test]
fn test_function_types_are_interned() {
    let mut types = TypeFactory::new();
    let int = types.get_int(IntRank::I32);
    let float = types.get_float(FloatRank::F64);

    let first = types.get_function(vec![int, float], int);
    let before = types.len();
    let second = types.get_function(vec![int, float], int);

    assert_eq!(first, second);
    assert_eq!(types.len(), before);
}

#[test]
fn test_distinct_function_shapes_are_distinct() {
    let mut types = TypeFactory::new();
    let int = types.get_int(IntRank::I32);
    let long = types.get_int(IntRank::I64);
    let float = types.get_float(FloatRank::F64);

    let a = types.get_function(vec![int], int);
    let b = types.get_function(vec![long], int);
    let c = types.get_function(vec![int], float);
    let d = types.get_function(vec![int, int], int);
    let e = types.get_function(vec![], int);

    let all = [a, b, c, d, e];
    for (i, x) in all.iter().enumerate() {
        for y in all.iter().skip(i + 1) {
            assert_ne!(x, y);
        }
    }
}

#[test]
fn test_reference_types_are_interned() {
    let mut types = TypeFactory::new();
    let int = types.get_int(IntRank::I32);
    let float = types.get_float(FloatRank::F32);

    let a = types.get_reference(int);
    let b = types.get_reference(int);
    let c = types.get_reference(float);

    assert_eq!(a, b);
    assert_ne!(a, c);
    assert!(types.is_reference(a));
    assert_eq!(types.non_reference(a), int);
    assert_eq!(types.non_reference(int), int);
}

#[test]
fn test_nested_shapes_are_interned() {
    let mut types = TypeFactory::new();
    let int = types.get_int(IntRank::I32);
    let int_ref = types.get_reference(int);
    let callback = types.get_function(vec![int_ref], int);

    let again_ref = types.get_reference(int);
    let again = types.get_function(vec![again_ref], int);
    let pointer_to_callback = types.get_reference(callback);

    assert_eq!(callback, again);
    assert_eq!(types.get_reference(again), pointer_to_callback);
}

#[test]
fn test_display() {
    let mut types = TypeFactory::new();
    let int = types.get_int(IntRank::I32);
    let float = types.get_float(FloatRank::F64);
    let int_ref = types.get_reference(int);
    let function = types.get_function(vec![int_ref, float], types.get_bool());

    assert_eq!(types.display(function), "func(&i32, f64) -> bool");
    assert_eq!(types.display(types.get_unit()), "void");
}
