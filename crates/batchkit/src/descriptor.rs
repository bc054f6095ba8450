//! Parameter and handler metadata.
//!
//! Descriptors are plain data built once at registration time and held by
//! the registry for the life of the engine. Nothing in this module is
//! discovered per invocation.
//!
//! # Core Types
//!
//! - [`ParamSpec`]: one declared parameter (name, kind, positional index,
//!   short alias, default)
//! - [`ValueKind`]: the coercion target of a parameter
//! - [`BoundValue`]: a value after coercion, as handed to handlers
//! - [`HandlerDescriptor`]: one invocable operation of a batch type

use std::fmt;
use std::sync::Arc;

use crate::bind::BoundArgs;
use crate::handler::HandlerResult;
use crate::tokenize::SWITCH_PREFIX;

/// The coercion target of a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    /// The raw token, passed through unchanged.
    Text,
    /// A boolean literal (`true` / `false`).
    Bool,
    /// A numeric literal, integer or float.
    Number,
    /// Any structured literal: object, array, quoted string, nested values.
    Structured,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueKind::Text => "text",
            ValueKind::Bool => "bool",
            ValueKind::Number => "number",
            ValueKind::Structured => "structured",
        };
        write!(f, "{}", name)
    }
}

/// A value bound to one parameter after coercion.
///
/// `Text` carries the exact token the caller supplied. The other variants
/// carry the parsed literal.
#[derive(Debug, Clone, PartialEq)]
pub enum BoundValue {
    Text(String),
    Bool(bool),
    Number(serde_json::Number),
    Structured(serde_json::Value),
}

impl BoundValue {
    /// The kind this value satisfies.
    pub fn kind(&self) -> ValueKind {
        match self {
            BoundValue::Text(_) => ValueKind::Text,
            BoundValue::Bool(_) => ValueKind::Bool,
            BoundValue::Number(_) => ValueKind::Number,
            BoundValue::Structured(_) => ValueKind::Structured,
        }
    }

    /// The raw text, if this is a `Text` value.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            BoundValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// The boolean, if this is a `Bool` value.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            BoundValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// The number as `f64`, if this is a `Number` value.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            BoundValue::Number(n) => n.as_f64(),
            _ => None,
        }
    }

    /// The number as `i64`, if this is an integral `Number` value.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            BoundValue::Number(n) => n.as_i64(),
            _ => None,
        }
    }

    /// The structured literal, if this is a `Structured` value.
    pub fn as_structured(&self) -> Option<&serde_json::Value> {
        match self {
            BoundValue::Structured(v) => Some(v),
            _ => None,
        }
    }

    /// A JSON view of the value, used for typed decoding. Text becomes a
    /// JSON string.
    pub(crate) fn to_json(&self) -> serde_json::Value {
        match self {
            BoundValue::Text(s) => serde_json::Value::String(s.clone()),
            BoundValue::Bool(b) => serde_json::Value::Bool(*b),
            BoundValue::Number(n) => serde_json::Value::Number(n.clone()),
            BoundValue::Structured(v) => v.clone(),
        }
    }
}

impl From<&str> for BoundValue {
    fn from(value: &str) -> Self {
        BoundValue::Text(value.to_string())
    }
}

impl From<String> for BoundValue {
    fn from(value: String) -> Self {
        BoundValue::Text(value)
    }
}

impl From<bool> for BoundValue {
    fn from(value: bool) -> Self {
        BoundValue::Bool(value)
    }
}

impl From<i64> for BoundValue {
    fn from(value: i64) -> Self {
        BoundValue::Number(serde_json::Number::from(value))
    }
}

/// Non-finite floats have no JSON representation; they map to a
/// structured null, which the registry's kind check then rejects for a
/// `Number` parameter. Same convention as `serde_json::Value::from(f64)`.
impl From<f64> for BoundValue {
    fn from(value: f64) -> Self {
        match serde_json::Number::from_f64(value) {
            Some(number) => BoundValue::Number(number),
            None => BoundValue::Structured(serde_json::Value::Null),
        }
    }
}

/// Maps JSON scalars onto the matching variant, so `serde_json::json!`
/// literals make natural defaults: numbers become `Number`, booleans
/// become `Bool`, strings become `Text`, everything else is `Structured`.
impl From<serde_json::Value> for BoundValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Bool(b) => BoundValue::Bool(b),
            serde_json::Value::Number(n) => BoundValue::Number(n),
            serde_json::Value::String(s) => BoundValue::Text(s),
            other => BoundValue::Structured(other),
        }
    }
}

/// Declarative metadata for one parameter of a handler.
///
/// Built with the kind constructors and chained modifiers:
///
/// ```
/// use batchkit::ParamSpec;
///
/// let path = ParamSpec::text("path").index(0);
/// let dry_run = ParamSpec::boolean("dry-run").short("-n").default(false);
/// assert!(path.is_required());
/// assert!(!dry_run.is_required());
/// ```
#[derive(Debug, Clone)]
pub struct ParamSpec {
    pub(crate) name: String,
    pub(crate) kind: ValueKind,
    pub(crate) index: Option<usize>,
    pub(crate) short: Option<String>,
    pub(crate) default: Option<BoundValue>,
}

impl ParamSpec {
    fn new(name: impl Into<String>, kind: ValueKind) -> Self {
        Self {
            name: name.into(),
            kind,
            index: None,
            short: None,
            default: None,
        }
    }

    /// A parameter bound to the raw token text.
    pub fn text(name: impl Into<String>) -> Self {
        Self::new(name, ValueKind::Text)
    }

    /// A parameter coerced to a boolean literal.
    pub fn boolean(name: impl Into<String>) -> Self {
        Self::new(name, ValueKind::Bool)
    }

    /// A parameter coerced to a numeric literal.
    pub fn number(name: impl Into<String>) -> Self {
        Self::new(name, ValueKind::Number)
    }

    /// A parameter coerced from a structured literal.
    pub fn structured(name: impl Into<String>) -> Self {
        Self::new(name, ValueKind::Structured)
    }

    /// Binds this parameter to a position in the token tail instead of an
    /// option key. Position 0 is the first token after the command name.
    pub fn index(mut self, index: usize) -> Self {
        self.index = Some(index);
        self
    }

    /// Adds a short alias. A leading switch prefix is accepted and
    /// ignored, so `"-n"` and `"n"` declare the same alias.
    pub fn short(mut self, alias: impl Into<String>) -> Self {
        self.short = Some(alias.into());
        self
    }

    /// Supplies a fallback used when the caller omits the parameter.
    /// The fallback's kind must match the declared kind; the registry
    /// checks this at build time.
    pub fn default(mut self, value: impl Into<BoundValue>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// The declared name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The declared coercion target.
    pub fn kind(&self) -> ValueKind {
        self.kind
    }

    /// The declared positional index, if any.
    pub fn position(&self) -> Option<usize> {
        self.index
    }

    /// True when the caller must supply the parameter.
    pub fn is_required(&self) -> bool {
        self.default.is_none()
    }

    /// The short alias with any leading switch prefix stripped.
    pub(crate) fn short_stripped(&self) -> Option<&str> {
        self.short
            .as_deref()
            .map(|s| s.trim_start_matches(SWITCH_PREFIX))
    }
}

/// The shape of every handler callable held by a descriptor.
pub(crate) type HandlerFn<B> = Arc<dyn Fn(&mut B, &BoundArgs) -> HandlerResult + Send + Sync>;

/// One invocable operation exposed by a batch type.
///
/// `method` is the diagnostic name used in failure messages and logs.
/// `command` is the selector token callers type; operations without one
/// are only reachable in single-operation mode.
pub struct HandlerDescriptor<B> {
    pub(crate) method: String,
    pub(crate) command: Option<String>,
    pub(crate) params: Vec<ParamSpec>,
    pub(crate) invoke: HandlerFn<B>,
}

impl<B> HandlerDescriptor<B> {
    /// The diagnostic name of the operation.
    pub fn method(&self) -> &str {
        &self.method
    }

    /// The selector token, if the operation is named.
    pub fn command(&self) -> Option<&str> {
        self.command.as_deref()
    }

    /// The declared parameters, in declaration order.
    pub fn params(&self) -> &[ParamSpec] {
        &self.params
    }
}

impl<B> Clone for HandlerDescriptor<B> {
    fn clone(&self) -> Self {
        Self {
            method: self.method.clone(),
            command: self.command.clone(),
            params: self.params.clone(),
            invoke: Arc::clone(&self.invoke),
        }
    }
}

impl<B> fmt::Debug for HandlerDescriptor<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerDescriptor")
            .field("method", &self.method)
            .field("command", &self.command)
            .field("params", &self.params)
            .field("invoke", &"<fn>")
            .finish()
    }
}
