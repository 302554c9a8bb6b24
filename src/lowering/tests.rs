use crate::{
    context::compile,
    eval::value::Value,
    types::types::{Type, TypeFactory, TypeId},
};

use super::{lower_statics, Lowering};

/// Lowers to the textual form of types and values.
struct TextLowering;

impl Lowering for TextLowering {
    type Type = String;
    type Constant = String;

    fn lower_type(&mut self, types: &TypeFactory, ty: TypeId) -> String {
        types.display(ty)
    }

    fn lower_constant(&mut self, types: &TypeFactory, ty: TypeId, value: Value) -> Option<String> {
        match (types.get(ty), value) {
            (Type::Bool, Value::Integer(value)) => Some((value != 0).to_string()),
            (_, Value::Integer(value)) => Some(value.to_string()),
            (_, Value::Float(value)) => Some(format!("{:?}", value)),
            _ => None,
        }
    }
}

#[test]
fn test_lower_statics_in_declaration_order() {
    let source = "val a : i64 = 2 + 3; var b : bool = a > 4; func f() { } val c = 1.5;";
    let (cx, unit) = compile(source.to_string(), Some("test.bn".to_string())).unwrap();

    let lowered = lower_statics(&cx, unit, &mut TextLowering);
    let summary: Vec<(String, String, Option<String>)> = lowered
        .into_iter()
        .map(|lowered| (lowered.name, lowered.ty, lowered.init))
        .collect();

    assert_eq!(
        summary,
        vec![
            ("a".to_string(), "i64".to_string(), Some("5".to_string())),
            ("b".to_string(), "bool".to_string(), Some("true".to_string())),
            ("f".to_string(), "func() -> void".to_string(), None),
            ("c".to_string(), "f64".to_string(), Some("1.5".to_string())),
        ]
    );
}

#[test]
fn test_lower_statics_skips_unfolded_declarations() {
    let source = "func g() -> int { return 1; } val x = g();";
    let (cx, unit) = compile(source.to_string(), None).unwrap();

    let lowered = lower_statics(&cx, unit, &mut TextLowering);
    let names: Vec<&str> = lowered.iter().map(|lowered| lowered.name.as_str()).collect();

    assert_eq!(names, vec!["g"]);
}
