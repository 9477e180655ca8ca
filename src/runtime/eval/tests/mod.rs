//! Evaluator unit tests

use crate::runtime::eval::ScriptEngine;
use crate::runtime::value::{TableKey, Value};

fn run(engine: &mut ScriptEngine, source: &str) {
    let outcome = engine.execute(source);
    assert!(
        outcome.success,
        "script failed: {:?}\nsource: {source}",
        outcome.errors
    );
}

fn num(engine: &ScriptEngine, name: &str) -> f64 {
    match engine.get_variable(name) {
        Some(Value::Num(n)) => n,
        other => panic!("expected number in `{name}`, got {other:?}"),
    }
}

#[test]
fn test_if_comparison() {
    let mut engine = ScriptEngine::new();
    run(&mut engine, "x = 10 if x > 5 then result = \"pass\" end");
    assert_eq!(engine.get_variable("result"), Some(Value::str("pass")));
}

#[test]
fn test_for_loop_sum() {
    let mut engine = ScriptEngine::new();
    run(&mut engine, "total = 0 for i = 1, 10 do total = total + i end");
    assert_eq!(num(&engine, "total"), 55.0);
}

#[test]
fn test_while_loop() {
    let mut engine = ScriptEngine::new();
    run(
        &mut engine,
        "count = 0 total = 0 while count < 5 do total = total + count count = count + 1 end",
    );
    assert_eq!(num(&engine, "total"), 10.0);
    assert_eq!(num(&engine, "count"), 5.0);
}

#[test]
fn test_for_loop_negative_step() {
    let mut engine = ScriptEngine::new();
    run(
        &mut engine,
        "out = \"\" for i = 3, 1, -1 do out = out .. i end",
    );
    assert_eq!(engine.get_variable("out"), Some(Value::str("321")));
}

#[test]
fn test_for_bounds_evaluated_once() {
    let mut engine = ScriptEngine::new();
    run(
        &mut engine,
        "n = 3 total = 0 for i = 1, n do n = 100 total = total + 1 end",
    );
    assert_eq!(num(&engine, "total"), 3.0);
}

#[test]
fn test_for_zero_step_is_fault() {
    let mut engine = ScriptEngine::new();
    let outcome = engine.execute("for i = 1, 10, 0 do end");
    assert!(!outcome.success);
    assert!(outcome.errors[0].contains("step"));
}

#[test]
fn test_while_iteration_cap() {
    let mut engine = ScriptEngine::new();
    let outcome = engine.execute("x = 0 while true do x = x + 1 end");
    assert!(!outcome.success);
    assert!(outcome.errors[0].contains("exceeded maximum iterations"));
    // Mutations before the fault are retained
    assert!(num(&engine, "x") > 0.0);
}

#[test]
fn test_for_iteration_cap() {
    let mut engine = ScriptEngine::new();
    let outcome = engine.execute("for i = 1, 10000000 do end");
    assert!(!outcome.success);
    assert!(outcome.errors[0].contains("exceeded maximum iterations"));
}

#[test]
fn test_fault_does_not_poison_next_execute() {
    let mut engine = ScriptEngine::new();
    assert!(!engine.execute("while true do end").success);
    run(&mut engine, "y = 1");
    assert_eq!(num(&engine, "y"), 1.0);
}

#[test]
fn test_division_by_zero_is_safe() {
    let mut engine = ScriptEngine::new();
    run(&mut engine, "a = 5 / 0 b = 5 % 0");
    assert_eq!(num(&engine, "a"), 0.0);
    assert_eq!(num(&engine, "b"), 0.0);
}

#[test]
fn test_concat_coerces_numbers() {
    let mut engine = ScriptEngine::new();
    run(&mut engine, "s = \"hp: \" .. 42 t = 1 .. 2");
    assert_eq!(engine.get_variable("s"), Some(Value::str("hp: 42")));
    assert_eq!(engine.get_variable("t"), Some(Value::str("12")));
}

#[test]
fn test_arithmetic_type_fault() {
    let mut engine = ScriptEngine::new();
    let outcome = engine.execute("x = 1 + \"two\"");
    assert!(!outcome.success);
    assert!(outcome.errors[0].contains("+"));
}

#[test]
fn test_function_return_value() {
    let mut engine = ScriptEngine::new();
    run(
        &mut engine,
        "function add(a, b) return a + b end x = add(2, 3)",
    );
    assert_eq!(num(&engine, "x"), 5.0);
}

#[test]
fn test_function_without_return_yields_nil() {
    let mut engine = ScriptEngine::new();
    run(&mut engine, "function noop() end x = noop()");
    assert_eq!(engine.get_variable("x"), Some(Value::Nil));
}

#[test]
fn test_recursion() {
    let mut engine = ScriptEngine::new();
    run(
        &mut engine,
        "function fib(n) if n < 2 then return n end return fib(n - 1) + fib(n - 2) end x = fib(10)",
    );
    assert_eq!(num(&engine, "x"), 55.0);
}

#[test]
fn test_unbounded_recursion_is_fault() {
    let mut engine = ScriptEngine::new();
    let outcome = engine.execute("function f() return f() end x = f()");
    assert!(!outcome.success);
    assert!(outcome.errors[0].contains("call depth"));
}

#[test]
fn test_function_results_as_arguments() {
    let mut engine = ScriptEngine::new();
    run(
        &mut engine,
        "function double(n) return n * 2 end x = double(double(3))",
    );
    assert_eq!(num(&engine, "x"), 12.0);
}

#[test]
fn test_table_passed_by_reference() {
    let mut engine = ScriptEngine::new();
    run(
        &mut engine,
        "t = {hp = 10} function hit(target) target.hp = target.hp - 3 end hit(t) x = t.hp",
    );
    assert_eq!(num(&engine, "x"), 7.0);
}

#[test]
fn test_flat_scope_leaks_to_globals() {
    // Documented language semantic: assignments inside a function body to
    // non-parameter names land in the enclosing scope
    let mut engine = ScriptEngine::new();
    run(&mut engine, "function mark() seen = true end mark()");
    assert_eq!(engine.get_variable("seen"), Some(Value::Bool(true)));
}

#[test]
fn test_parameters_do_not_leak() {
    let mut engine = ScriptEngine::new();
    run(&mut engine, "function f(p) p = 99 end f(1)");
    assert_eq!(engine.get_variable("p"), None);
}

#[test]
fn test_table_positional_and_named() {
    let mut engine = ScriptEngine::new();
    run(
        &mut engine,
        "t = {10, 20, name = \"elm\", [\"k\"] = 4} a = t[1] b = t[2] c = t.name d = t[\"k\"]",
    );
    assert_eq!(num(&engine, "a"), 10.0);
    assert_eq!(num(&engine, "b"), 20.0);
    assert_eq!(engine.get_variable("c"), Some(Value::str("elm")));
    assert_eq!(num(&engine, "d"), 4.0);
}

#[test]
fn test_bracket_and_dot_interchangeable() {
    let mut engine = ScriptEngine::new();
    run(&mut engine, "t = {} t.x = 1 a = t[\"x\"] t[\"y\"] = 2 b = t.y");
    assert_eq!(num(&engine, "a"), 1.0);
    assert_eq!(num(&engine, "b"), 2.0);
}

#[test]
fn test_missing_table_slot_is_nil() {
    let mut engine = ScriptEngine::new();
    run(&mut engine, "t = {} x = t.missing");
    assert_eq!(engine.get_variable("x"), Some(Value::Nil));
}

#[test]
fn test_indexing_non_table_is_fault() {
    let mut engine = ScriptEngine::new();
    let outcome = engine.execute("x = 5 y = x.field");
    assert!(!outcome.success);
    assert!(outcome.errors[0].contains("index"));
}

#[test]
fn test_print_output() {
    let mut engine = ScriptEngine::new();
    let outcome = engine.execute("print(\"hello\", 42)");
    assert!(outcome.success);
    assert_eq!(outcome.output, vec!["hello\t42".to_string()]);
    // Output does not accumulate across executes
    let outcome = engine.execute("print(\"next\")");
    assert_eq!(outcome.output, vec!["next".to_string()]);
}

#[test]
fn test_math_builtins() {
    let mut engine = ScriptEngine::new();
    run(&mut engine, "a = math.floor(3.9) b = math.abs(0 - 4)");
    assert_eq!(num(&engine, "a"), 3.0);
    assert_eq!(num(&engine, "b"), 4.0);
}

#[test]
fn test_math_random_in_range() {
    let mut engine = ScriptEngine::new();
    for _ in 0..20 {
        run(&mut engine, "r = math.random(1, 6)");
        let r = num(&engine, "r");
        assert!((1.0..=6.0).contains(&r));
        assert_eq!(r.fract(), 0.0);
    }
}

#[test]
fn test_string_builtins() {
    let mut engine = ScriptEngine::new();
    run(&mut engine, "a = string.upper(\"abc\") b = string.lower(\"ABC\")");
    assert_eq!(engine.get_variable("a"), Some(Value::str("ABC")));
    assert_eq!(engine.get_variable("b"), Some(Value::str("abc")));
}

#[test]
fn test_tostring_tonumber() {
    let mut engine = ScriptEngine::new();
    run(&mut engine, "a = tostring(4) b = tonumber(\"2.5\") c = tonumber(\"x\")");
    assert_eq!(engine.get_variable("a"), Some(Value::str("4")));
    assert_eq!(engine.get_variable("b"), Some(Value::Num(2.5)));
    assert_eq!(engine.get_variable("c"), Some(Value::Nil));
}

#[test]
fn test_logical_operators_return_operands() {
    let mut engine = ScriptEngine::new();
    run(&mut engine, "a = nil or 3 b = 2 and 5 c = false and 9");
    assert_eq!(num(&engine, "a"), 3.0);
    assert_eq!(num(&engine, "b"), 5.0);
    assert_eq!(engine.get_variable("c"), Some(Value::Bool(false)));
}

#[test]
fn test_unknown_function_is_fault() {
    let mut engine = ScriptEngine::new();
    let outcome = engine.execute("x = summonDragon()");
    assert!(!outcome.success);
    assert!(outcome.errors[0].contains("summonDragon"));
}

#[test]
fn test_builtin_shadowed_by_non_function_is_fault() {
    let mut engine = ScriptEngine::new();
    run(&mut engine, "print = 5");
    let outcome = engine.execute("print(\"x\")");
    assert!(!outcome.success);
    assert!(outcome.errors[0].contains("attempt to call a number value"));
    assert!(outcome.output.is_empty());
    // The binding itself is untouched by the fault
    assert_eq!(num(&engine, "print"), 5.0);
}

#[test]
fn test_print_self_referential_table() {
    let mut engine = ScriptEngine::new();
    let outcome = engine.execute("t = {} t.me = t print(t)");
    assert!(outcome.success, "errors: {:?}", outcome.errors);
    assert_eq!(outcome.output, vec!["{me: {...}}"]);
}

#[test]
fn test_external_function_call() {
    let mut engine = ScriptEngine::new();
    engine.externals().write().register("roll", |args| {
        match args.first() {
            Some(Value::Num(n)) => Value::Num(n + 100.0),
            _ => Value::Nil,
        }
    });
    run(&mut engine, "x = roll(7)");
    assert_eq!(num(&engine, "x"), 107.0);
}

#[test]
fn test_variables_persist_across_executes() {
    let mut engine = ScriptEngine::new();
    run(&mut engine, "x = 1");
    run(&mut engine, "x = x + 1");
    assert_eq!(num(&engine, "x"), 2.0);
}

#[test]
fn test_reset_clears_everything() {
    let mut engine = ScriptEngine::new();
    run(&mut engine, "x = 1 t = {1}");
    engine.reset();
    assert_eq!(engine.get_variable("x"), None);
    assert_eq!(engine.get_variable("t"), None);
    assert!(engine.get_all_variables().is_empty());
}

#[test]
fn test_get_all_variables() {
    let mut engine = ScriptEngine::new();
    run(&mut engine, "x = 1 s = \"a\"");
    let all = engine.get_all_variables();
    assert_eq!(all.len(), 2);
    assert_eq!(all.get("x"), Some(&Value::Num(1.0)));
}

#[test]
fn test_set_variable_visible_to_script() {
    let mut engine = ScriptEngine::new();
    engine.set_variable("hp", Value::Num(9.0));
    run(&mut engine, "hp = hp + 1");
    assert_eq!(num(&engine, "hp"), 10.0);
}

#[test]
fn test_parse_error_reports_position() {
    let mut engine = ScriptEngine::new();
    let outcome = engine.execute("if x > 5 then\n  y = 1\n");
    assert!(!outcome.success);
    assert_eq!(outcome.errors.len(), 1);
    assert!(outcome.errors[0].contains("expected"), "{}", outcome.errors[0]);
}

#[test]
fn test_table_key_variants_in_storage() {
    let mut engine = ScriptEngine::new();
    run(&mut engine, "t = {[1] = \"one\"}");
    match engine.get_variable("t") {
        Some(Value::Table(t)) => {
            assert_eq!(t.read().get(&TableKey::num(1.0)), Some(&Value::str("one")));
        }
        other => panic!("expected table, got {other:?}"),
    }
}
