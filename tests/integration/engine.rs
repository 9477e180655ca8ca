//! Script engine integration tests
//!
//! End-to-end scripts run through the public API.

use weft::{ScriptEngine, Value};

fn num(engine: &ScriptEngine, name: &str) -> f64 {
    match engine.get_variable(name) {
        Some(Value::Num(n)) => n,
        other => panic!("expected number in `{name}`, got {other:?}"),
    }
}

#[test]
fn test_branching_script() {
    let mut engine = ScriptEngine::new();
    let outcome = engine.execute(
        r#"
        x = 7
        if x > 5 then
            result = "pass"
        else
            result = "fail"
        end
        "#,
    );
    assert!(outcome.success, "errors: {:?}", outcome.errors);
    assert_eq!(engine.get_variable("result"), Some(Value::str("pass")));
}

#[test]
fn test_loops_and_accumulation() {
    let mut engine = ScriptEngine::new();
    let outcome = engine.execute(
        r#"
        total = 0
        for i = 1, 10 do
            total = total + i
        end
        count = 0
        while count < 5 do
            count = count + 1
        end
        "#,
    );
    assert!(outcome.success, "errors: {:?}", outcome.errors);
    assert_eq!(num(&engine, "total"), 55.0);
    assert_eq!(num(&engine, "count"), 5.0);
}

#[test]
fn test_functions_and_tables() {
    let mut engine = ScriptEngine::new();
    let outcome = engine.execute(
        r#"
        function damage(target, amount)
            target.hp = target.hp - amount
            return target.hp
        end

        hero = { hp = 100, name = "Rell" }
        remaining = damage(hero, 35)
        "#,
    );
    assert!(outcome.success, "errors: {:?}", outcome.errors);
    assert_eq!(num(&engine, "remaining"), 65.0);
    // The table argument is shared, not copied
    let outcome = engine.execute("hp_after = hero.hp");
    assert!(outcome.success);
    assert_eq!(num(&engine, "hp_after"), 65.0);
}

#[test]
fn test_recursion() {
    let mut engine = ScriptEngine::new();
    let outcome = engine.execute(
        r#"
        function fib(n)
            if n < 2 then
                return n
            end
            return fib(n - 1) + fib(n - 2)
        end
        answer = fib(10)
        "#,
    );
    assert!(outcome.success, "errors: {:?}", outcome.errors);
    assert_eq!(num(&engine, "answer"), 55.0);
}

#[test]
fn test_print_output_is_collected() {
    let mut engine = ScriptEngine::new();
    let outcome = engine.execute(
        r#"
        print("chapter", 1)
        print("the " .. "end")
        "#,
    );
    assert!(outcome.success);
    assert_eq!(outcome.output, vec!["chapter\t1", "the end"]);
}

#[test]
fn test_runaway_loop_faults_but_keeps_state() {
    let mut engine = ScriptEngine::new();
    let outcome = engine.execute(
        r#"
        ticks = 0
        while true do
            ticks = ticks + 1
        end
        "#,
    );
    assert!(!outcome.success);
    assert!(
        outcome.errors[0].contains("exceeded maximum iterations"),
        "unexpected error: {:?}",
        outcome.errors
    );
    // Mutations before the fault are visible, and the engine still works
    assert!(num(&engine, "ticks") > 0.0);
    let outcome = engine.execute("after = ticks + 1");
    assert!(outcome.success, "errors: {:?}", outcome.errors);
}

#[test]
fn test_state_persists_across_executions() {
    let mut engine = ScriptEngine::new();
    assert!(engine.execute("gold = 10").success);
    assert!(engine.execute("gold = gold + 5").success);
    assert_eq!(num(&engine, "gold"), 15.0);

    engine.reset();
    let outcome = engine.execute("still_there = gold ~= nil");
    assert!(outcome.success);
    assert_eq!(engine.get_variable("still_there"), Some(Value::Bool(false)));
}

#[test]
fn test_host_functions_callable_from_scripts() {
    let mut engine = ScriptEngine::new();
    engine.externals().write().register("roll", |args| {
        match args.first() {
            Some(Value::Num(sides)) => Value::Num(*sides), // deterministic stand-in
            _ => Value::Nil,
        }
    });
    let outcome = engine.execute("result = roll(20)");
    assert!(outcome.success, "errors: {:?}", outcome.errors);
    assert_eq!(num(&engine, "result"), 20.0);
}

#[test]
fn test_parse_error_reports_position() {
    let mut engine = ScriptEngine::new();
    let outcome = engine.execute("x = 1\nif x then\n");
    assert!(!outcome.success);
    assert!(!outcome.errors.is_empty());
    // Parsing happens before any execution, so the first assignment never ran
    assert_eq!(engine.get_variable("x"), None);
}
