//! Runtime: values, environment, evaluator and the external-function bridge

pub mod env;
pub mod eval;
pub mod extfunc;
pub mod value;
