use std::collections::HashMap;
use evalexpr::{
    build_operator_tree, ContextWithMutableVariables, DefaultNumericTypes, HashMapContext,
    Node as EvalNode, Value as EvalValue,
};
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExprError {
    #[error("cannot parse expression '{expr}': {message}")]
    Parse { expr: String, message: String },

    #[error("cannot evaluate expression '{expr}': {message}")]
    Eval { expr: String, message: String },

    #[error("expression '{expr}' did not produce a scalar value")]
    NotScalar { expr: String },
}

/// A pre-compiled loop condition or decision case expression.
///
/// `${name}` placeholders are accepted and read as plain variables.
#[derive(Debug)]
pub struct Expression {
    raw: String,
    tree: EvalNode<DefaultNumericTypes>,
}

impl Expression {
    pub fn compile(raw: &str) -> Result<Self, ExprError> {
        let clean = strip_placeholders(raw);
        let tree = build_operator_tree::<DefaultNumericTypes>(&clean).map_err(|e| ExprError::Parse {
            expr: raw.to_string(),
            message: e.to_string(),
        })?;
        Ok(Self {
            raw: raw.to_string(),
            tree,
        })
    }

    pub fn eval_boolean(&self, vars: &HashMap<String, Value>) -> Result<bool, ExprError> {
        let ctx = eval_context(vars);
        self.tree
            .eval_boolean_with_context(&ctx)
            .map_err(|e| ExprError::Eval {
                expr: self.raw.clone(),
                message: e.to_string(),
            })
    }

    /// Evaluates to a scalar and renders it as a case label.
    pub fn eval_case(&self, vars: &HashMap<String, Value>) -> Result<String, ExprError> {
        let ctx = eval_context(vars);
        let value = self.tree.eval_with_context(&ctx).map_err(|e| ExprError::Eval {
            expr: self.raw.clone(),
            message: e.to_string(),
        })?;

        match value {
            EvalValue::String(s) => Ok(s),
            EvalValue::Int(i) => Ok(i.to_string()),
            EvalValue::Float(f) => Ok(f.to_string()),
            EvalValue::Boolean(b) => Ok(b.to_string()),
            _ => Err(ExprError::NotScalar {
                expr: self.raw.clone(),
            }),
        }
    }
}

/// Unwraps `${name}` placeholders; braces anywhere else are left alone.
fn strip_placeholders(raw: &str) -> String {
    let mut clean = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(start) = rest.find("${") {
        clean.push_str(&rest[..start]);
        let inner = &rest[start + 2..];
        match inner.find('}') {
            Some(end) => {
                clean.push_str(&inner[..end]);
                rest = &inner[end + 1..];
            }
            None => {
                clean.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    clean.push_str(rest);
    clean
}

/// Scalars become variables; arrays, objects and nulls are skipped.
fn eval_context(vars: &HashMap<String, Value>) -> HashMapContext<DefaultNumericTypes> {
    let mut eval_ctx = HashMapContext::<DefaultNumericTypes>::new();
    for (k, v) in vars {
        let eval_val = match v {
            Value::String(s) => Some(EvalValue::String(s.clone())),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() { Some(EvalValue::Int(i)) }
                else if let Some(f) = n.as_f64() { Some(EvalValue::Float(f)) }
                else { None }
            },
            Value::Bool(b) => Some(EvalValue::Boolean(*b)),
            _ => None,
        };
        if let Some(ev) = eval_val {
            let _ = eval_ctx.set_value(k.clone(), ev);
        }
    }
    eval_ctx
}
