//! Parameterized passage templates
//!
//! A passage template is declared as `Name(param, param2 = defaultExpr, …)`.
//! Default expressions are parsed once at registration and evaluated in the
//! calling environment when a call site omits the argument.

use indexmap::IndexMap;

use crate::runtime::eval::ScriptEngine;
use crate::runtime::value::Value;
use crate::script::lexer::tokens::TokenKind;
use crate::script::lexer::tokenize;
use crate::script::parser::ast::Expr;
use crate::script::parser::ParserState;

/// Passage error
#[derive(Debug, Clone, thiserror::Error)]
pub enum PassageError {
    #[error("invalid passage signature: {0}")]
    InvalidSignature(String),
    #[error("passage `{0}` is already registered")]
    Duplicate(String),
    #[error("passage `{template}` has no argument for parameter `{param}` and no default")]
    MissingArgument { template: String, param: String },
    #[error("default for parameter `{param}` failed to evaluate: {message}")]
    DefaultEval { param: String, message: String },
}

/// One declared parameter
#[derive(Debug, Clone, PartialEq)]
pub struct PassageParam {
    pub name: String,
    /// Default expression AST, if declared
    pub default: Option<Expr>,
}

/// A registered passage template
#[derive(Debug, Clone, PartialEq)]
pub struct PassageTemplate {
    pub name: String,
    /// Ordered parameters
    pub params: Vec<PassageParam>,
}

/// Parameter values bound for one passage call
#[derive(Debug, Clone, PartialEq)]
pub struct ArgumentBinding {
    pub template: String,
    /// Parameter name to bound value, in declaration order
    pub values: IndexMap<String, Value>,
}

/// Registry of passage templates
#[derive(Debug, Default)]
pub struct PassageRegistry {
    templates: IndexMap<String, PassageTemplate>,
}

impl PassageRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a template from its signature text,
    /// e.g. `Greeting(name, mood = "neutral")`
    pub fn register_passage(&mut self, signature: &str) -> Result<(), PassageError> {
        let template = parse_signature(signature)?;
        if self.templates.contains_key(&template.name) {
            return Err(PassageError::Duplicate(template.name));
        }
        self.templates.insert(template.name.clone(), template);
        Ok(())
    }

    /// Whether a template name is registered
    pub fn is_registered(&self, name: &str) -> bool {
        self.templates.contains_key(name)
    }

    /// Get a template by name
    pub fn template(&self, name: &str) -> Option<&PassageTemplate> {
        self.templates.get(name)
    }

    /// All templates, in registration order
    pub fn all_templates(&self) -> Vec<&PassageTemplate> {
        self.templates.values().collect()
    }

    /// Bind positional arguments to a template's parameters.
    ///
    /// Returns `Ok(None)` when `name` is not registered (a query-style miss,
    /// not a fault). Unsupplied trailing parameters evaluate their default
    /// expressions in the calling engine's environment; an unsupplied
    /// parameter with no default is a binding failure.
    pub fn bind_arguments(
        &self,
        name: &str,
        args: &[Value],
        engine: &mut ScriptEngine,
    ) -> Result<Option<ArgumentBinding>, PassageError> {
        let Some(template) = self.templates.get(name) else {
            return Ok(None);
        };

        let mut values = IndexMap::with_capacity(template.params.len());
        for (i, param) in template.params.iter().enumerate() {
            let value = match args.get(i) {
                Some(value) => value.clone(),
                None => match &param.default {
                    Some(expr) => {
                        engine
                            .eval_expression(expr)
                            .map_err(|err| PassageError::DefaultEval {
                                param: param.name.clone(),
                                message: err.to_string(),
                            })?
                    }
                    None => {
                        return Err(PassageError::MissingArgument {
                            template: template.name.clone(),
                            param: param.name.clone(),
                        })
                    }
                },
            };
            values.insert(param.name.clone(), value);
        }

        Ok(Some(ArgumentBinding {
            template: template.name.clone(),
            values,
        }))
    }

    /// Remove every template
    pub fn clear(&mut self) {
        self.templates.clear();
    }
}

/// Parse `Name(param, param2 = expr, …)` using the script lexer/parser
fn parse_signature(signature: &str) -> Result<PassageTemplate, PassageError> {
    let invalid = || PassageError::InvalidSignature(signature.trim().to_string());

    let tokens = tokenize(signature).map_err(|_| invalid())?;
    let mut state = ParserState::new(&tokens);

    let (name, _) = state.expect_identifier().map_err(|_| invalid())?;
    state.expect(&TokenKind::LParen).map_err(|_| invalid())?;

    let mut params = Vec::new();
    if !state.at(&TokenKind::RParen) {
        loop {
            let (param_name, _) = state.expect_identifier().map_err(|_| invalid())?;
            let default = if state.skip(&TokenKind::Assign) {
                Some(state.parse_expr().map_err(|_| invalid())?)
            } else {
                None
            };
            params.push(PassageParam {
                name: param_name,
                default,
            });
            if !state.skip(&TokenKind::Comma) {
                break;
            }
        }
    }
    state.expect(&TokenKind::RParen).map_err(|_| invalid())?;
    if !state.at_end() {
        return Err(invalid());
    }

    Ok(PassageTemplate { name, params })
}
