//! Builtin script functions
//!
//! The narrow standard library available to narrative scripts: `print`,
//! `tostring`/`tonumber`, and the `math.*` / `string.*` namespaces.

use rand::Rng;

use super::{EvalError, ScriptEngine};
use crate::runtime::value::Value;
use crate::util::span::Position;

/// Dispatch a builtin by (possibly dotted) name. Returns `None` when the
/// name is not a builtin so the caller can fall through to externals.
pub(super) fn call_builtin(
    engine: &mut ScriptEngine,
    name: &str,
    args: &[Value],
    position: Position,
) -> Option<Result<Value, EvalError>> {
    match name {
        "print" => Some(builtin_print(engine, args)),
        "tostring" => Some(Ok(Value::str(
            args.first().unwrap_or(&Value::Nil).to_string(),
        ))),
        "tonumber" => Some(Ok(builtin_tonumber(args))),
        "math.random" => Some(builtin_random(args, position)),
        "math.floor" => Some(num_builtin(args, position, "math.floor", f64::floor)),
        "math.abs" => Some(num_builtin(args, position, "math.abs", f64::abs)),
        "string.upper" => Some(str_builtin(args, position, "string.upper", |s| {
            s.to_uppercase()
        })),
        "string.lower" => Some(str_builtin(args, position, "string.lower", |s| {
            s.to_lowercase()
        })),
        _ => None,
    }
}

fn builtin_print(engine: &mut ScriptEngine, args: &[Value]) -> Result<Value, EvalError> {
    let line = args
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join("\t");
    engine.push_output(line);
    Ok(Value::Nil)
}

fn builtin_tonumber(args: &[Value]) -> Value {
    match args.first() {
        Some(Value::Num(n)) => Value::Num(*n),
        Some(Value::Str(s)) => match s.trim().parse::<f64>() {
            Ok(n) => Value::Num(n),
            Err(_) => Value::Nil,
        },
        _ => Value::Nil,
    }
}

/// `math.random(min, max)` - inclusive integer range
fn builtin_random(args: &[Value], position: Position) -> Result<Value, EvalError> {
    let (min, max) = match (args.first(), args.get(1)) {
        (Some(Value::Num(a)), Some(Value::Num(b))) => (*a as i64, *b as i64),
        _ => {
            return Err(EvalError::BadArgument {
                message: "math.random expects two numbers".into(),
                position,
            })
        }
    };
    if min > max {
        return Err(EvalError::BadArgument {
            message: format!("math.random range is empty ({min} > {max})"),
            position,
        });
    }
    let n = rand::rng().random_range(min..=max);
    Ok(Value::Num(n as f64))
}

fn num_builtin(
    args: &[Value],
    position: Position,
    name: &str,
    f: impl Fn(f64) -> f64,
) -> Result<Value, EvalError> {
    match args.first() {
        Some(Value::Num(n)) => Ok(Value::Num(f(*n))),
        other => Err(EvalError::BadArgument {
            message: format!(
                "{name} expects a number, got {}",
                other.map(|v| v.type_name()).unwrap_or("nothing")
            ),
            position,
        }),
    }
}

fn str_builtin(
    args: &[Value],
    position: Position,
    name: &str,
    f: impl Fn(&str) -> String,
) -> Result<Value, EvalError> {
    match args.first() {
        Some(Value::Str(s)) => Ok(Value::str(f(s))),
        other => Err(EvalError::BadArgument {
            message: format!(
                "{name} expects a string, got {}",
                other.map(|v| v.type_name()).unwrap_or("nothing")
            ),
            position,
        }),
    }
}
