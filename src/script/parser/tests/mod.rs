//! Parser unit tests

use crate::script::parser::ast::*;
use crate::script::parser::{parse, parse_expression, ParseError};

#[test]
fn test_assignment() {
    let block = parse("x = 10").expect("parse should succeed");
    assert_eq!(block.stmts.len(), 1);
    match &block.stmts[0] {
        Stmt::Assign {
            target: AssignTarget::Name(name),
            value: Expr::Lit(Literal::Num(n), _),
            ..
        } => {
            assert_eq!(name, "x");
            assert_eq!(*n, 10.0);
        }
        other => panic!("unexpected statement: {other:?}"),
    }
}

#[test]
fn test_if_elseif_else() {
    let block = parse(
        "if x > 5 then a = 1 elseif x > 2 then a = 2 else a = 3 end",
    )
    .expect("parse should succeed");
    match &block.stmts[0] {
        Stmt::If {
            arms, else_branch, ..
        } => {
            assert_eq!(arms.len(), 2);
            assert!(else_branch.is_some());
        }
        other => panic!("unexpected statement: {other:?}"),
    }
}

#[test]
fn test_numeric_for_with_step() {
    let block = parse("for i = 10, 1, -1 do total = total + i end").expect("parse should succeed");
    match &block.stmts[0] {
        Stmt::NumericFor { var, step, .. } => {
            assert_eq!(var, "i");
            assert!(step.is_some());
        }
        other => panic!("unexpected statement: {other:?}"),
    }
}

#[test]
fn test_function_definition() {
    let block = parse("function greet(name, mood) return name end").expect("parse should succeed");
    match &block.stmts[0] {
        Stmt::FnDef { name, params, body, .. } => {
            assert_eq!(name, "greet");
            assert_eq!(params, &["name".to_string(), "mood".to_string()]);
            assert!(matches!(body.stmts[0], Stmt::Return { value: Some(_), .. }));
        }
        other => panic!("unexpected statement: {other:?}"),
    }
}

#[test]
fn test_bare_return() {
    let block = parse("function f() return end").expect("parse should succeed");
    match &block.stmts[0] {
        Stmt::FnDef { body, .. } => {
            assert!(matches!(body.stmts[0], Stmt::Return { value: None, .. }));
        }
        other => panic!("unexpected statement: {other:?}"),
    }
}

#[test]
fn test_operator_precedence() {
    // 1 + 2 * 3 parses as 1 + (2 * 3)
    let expr = parse_expression("1 + 2 * 3").expect("parse should succeed");
    match expr {
        Expr::BinOp {
            op: BinOp::Add,
            right,
            ..
        } => assert!(matches!(*right, Expr::BinOp { op: BinOp::Mul, .. })),
        other => panic!("unexpected expression: {other:?}"),
    }
}

#[test]
fn test_logical_precedence() {
    // a or b and c parses as a or (b and c)
    let expr = parse_expression("a or b and c").expect("parse should succeed");
    match expr {
        Expr::BinOp {
            op: BinOp::Or,
            right,
            ..
        } => assert!(matches!(*right, Expr::BinOp { op: BinOp::And, .. })),
        other => panic!("unexpected expression: {other:?}"),
    }
}

#[test]
fn test_concat_binds_looser_than_add() {
    // "n: " .. 1 + 2 parses as "n: " .. (1 + 2)
    let expr = parse_expression("\"n: \" .. 1 + 2").expect("parse should succeed");
    match expr {
        Expr::BinOp {
            op: BinOp::Concat,
            right,
            ..
        } => assert!(matches!(*right, Expr::BinOp { op: BinOp::Add, .. })),
        other => panic!("unexpected expression: {other:?}"),
    }
}

#[test]
fn test_table_constructor_mixed() {
    let expr = parse_expression("{1, 2, x = 3, [\"k\"] = 4}").expect("parse should succeed");
    match expr {
        Expr::TableCtor { entries, .. } => {
            assert_eq!(entries.len(), 4);
            assert!(matches!(entries[0], TableEntry::Positional(_)));
            assert!(matches!(entries[2], TableEntry::Named(_, _)));
            assert!(matches!(entries[3], TableEntry::Keyed(_, _)));
        }
        other => panic!("unexpected expression: {other:?}"),
    }
}

#[test]
fn test_dot_access_desugars_to_index() {
    let expr = parse_expression("npc.mood").expect("parse should succeed");
    match expr {
        Expr::Index { index, .. } => {
            assert!(matches!(*index, Expr::Lit(Literal::Str(ref s), _) if s == "mood"));
        }
        other => panic!("unexpected expression: {other:?}"),
    }
}

#[test]
fn test_call_with_dotted_callee() {
    let block = parse("x = math.random(1, 6)").expect("parse should succeed");
    match &block.stmts[0] {
        Stmt::Assign {
            value: Expr::Call { func, args, .. },
            ..
        } => {
            assert!(matches!(**func, Expr::Index { .. }));
            assert_eq!(args.len(), 2);
        }
        other => panic!("unexpected statement: {other:?}"),
    }
}

#[test]
fn test_missing_end_is_error() {
    let err = parse("if x > 5 then a = 1").unwrap_err();
    match err {
        ParseError::Expected { expected, .. } => assert!(expected.contains("end")),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_missing_then_is_error() {
    assert!(parse("if x > 5 a = 1 end").is_err());
}

#[test]
fn test_missing_do_is_error() {
    assert!(parse("while x < 5 x = x + 1 end").is_err());
}

#[test]
fn test_no_partial_result_on_failure() {
    // Second statement is malformed; the whole parse must fail
    assert!(parse("x = 1\ny = ").is_err());
}

#[test]
fn test_error_carries_position() {
    let err = parse("x = \n  = 2").unwrap_err();
    let message = err.to_string();
    assert!(message.starts_with("2:"), "message was: {message}");
}

#[test]
fn test_bare_non_call_expression_rejected() {
    assert!(parse("x + 1").is_err());
}

#[test]
fn test_assignment_to_call_rejected() {
    assert!(parse("f() = 3").is_err());
}
