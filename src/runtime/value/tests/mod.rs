//! Value unit tests

use std::sync::Arc;

use crate::runtime::value::{format_num, new_table, TableKey, Value};

#[test]
fn test_truthiness() {
    assert!(!Value::Nil.is_truthy());
    assert!(!Value::Bool(false).is_truthy());
    assert!(Value::Bool(true).is_truthy());
    assert!(Value::Num(0.0).is_truthy());
    assert!(Value::str("").is_truthy());
    assert!(Value::Table(new_table()).is_truthy());
}

#[test]
fn test_type_names() {
    assert_eq!(Value::Nil.type_name(), "nil");
    assert_eq!(Value::Num(1.0).type_name(), "number");
    assert_eq!(Value::str("x").type_name(), "string");
    assert_eq!(Value::Table(new_table()).type_name(), "table");
}

#[test]
fn test_display_integral_numbers() {
    assert_eq!(Value::Num(42.0).to_string(), "42");
    assert_eq!(Value::Num(3.5).to_string(), "3.5");
    assert_eq!(Value::Num(-7.0).to_string(), "-7");
    assert_eq!(format_num(0.0), "0");
}

#[test]
fn test_table_key_negative_zero() {
    assert_eq!(TableKey::num(-0.0), TableKey::num(0.0));
}

#[test]
fn test_table_key_from_value() {
    assert_eq!(TableKey::from_value(&Value::Num(1.0)), Some(TableKey::num(1.0)));
    assert_eq!(
        TableKey::from_value(&Value::str("k")),
        Some(TableKey::str("k"))
    );
    assert_eq!(TableKey::from_value(&Value::Nil), None);
    assert_eq!(TableKey::from_value(&Value::Bool(true)), None);
}

#[test]
fn test_table_equality_is_identity() {
    let a = new_table();
    let b = new_table();
    assert_ne!(Value::Table(a.clone()), Value::Table(b));
    assert_eq!(Value::Table(a.clone()), Value::Table(a));
}

#[test]
fn test_table_mutation_shared() {
    let table = new_table();
    let alias = Value::Table(Arc::clone(&table));
    table.write().insert(TableKey::str("hp"), Value::Num(10.0));
    match alias {
        Value::Table(t) => {
            assert_eq!(t.read().get(&TableKey::str("hp")), Some(&Value::Num(10.0)));
        }
        _ => unreachable!(),
    }
}

#[test]
fn test_display_self_referential_table() {
    let table = new_table();
    table
        .write()
        .insert(TableKey::str("me"), Value::Table(Arc::clone(&table)));
    assert_eq!(Value::Table(table).to_string(), "{me: {...}}");
}

#[test]
fn test_display_mutually_referential_tables() {
    let a = new_table();
    let b = new_table();
    a.write().insert(TableKey::str("b"), Value::Table(Arc::clone(&b)));
    b.write().insert(TableKey::str("a"), Value::Table(Arc::clone(&a)));
    assert_eq!(Value::Table(a).to_string(), "{b: {a: {...}}}");
}

#[test]
fn test_scalar_equality() {
    assert_eq!(Value::Num(2.0), Value::Num(2.0));
    assert_eq!(Value::str("a"), Value::str("a"));
    assert_ne!(Value::Num(2.0), Value::str("2"));
}
