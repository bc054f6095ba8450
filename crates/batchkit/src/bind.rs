//! Parameter binding.
//!
//! Resolves every declared parameter of the selected handler against the
//! token tail and coerces it to its declared kind. The result is a
//! [`BoundArgs`] in declaration order, ready to hand to the handler body.
//!
//! # Source order
//!
//! Each parameter is tried against these sources, first hit wins:
//!
//! 1. positional index, when declared: the token at `offset + index`,
//!    taken verbatim
//! 2. the option map, under the parameter's name
//! 3. the option map, under the short alias
//! 4. the declared default
//!
//! A parameter with none of these is missing, and binding stops at the
//! first failing parameter. Nothing is invoked on a partial binding.
//!
//! # Coercion
//!
//! `Text` parameters receive the raw token unchanged; they are never
//! parsed or re-encoded. All other kinds parse the token as a literal
//! (the same syntax `serde_json` accepts), so booleans are `true` or
//! `false`, numbers are bare digits, and structured values are quoted
//! JSON. A token that does not parse as the declared kind is a binding
//! failure naming the parameter.

use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::descriptor::{BoundValue, ParamSpec, ValueKind};
use crate::tokenize::{ArgumentMap, DuplicateOption};

/// Why binding failed. The offending parameter is always named.
#[derive(Debug, Error)]
pub enum BindError {
    /// The token tail itself was malformed.
    #[error(transparent)]
    DuplicateOption(#[from] DuplicateOption),

    /// A parameter without a default matched no source.
    #[error("required parameter '{param}' not found")]
    MissingRequired { param: String },

    /// A positional parameter pointed past the supplied tokens.
    #[error(
        "parameter '{param}' reads position {position}, but only {supplied} tokens were supplied"
    )]
    IndexOutOfRange {
        param: String,
        position: usize,
        supplied: usize,
    },

    /// The supplied token did not parse as the declared kind.
    #[error(
        "parameter '{param}' could not be read as {kind}; check the value's type and escaping"
    )]
    Coercion {
        param: String,
        kind: ValueKind,
        #[source]
        source: serde_json::Error,
    },
}

impl BindError {
    /// The name of the parameter that failed, when one is at fault.
    pub fn param(&self) -> Option<&str> {
        match self {
            BindError::DuplicateOption(_) => None,
            BindError::MissingRequired { param }
            | BindError::IndexOutOfRange { param, .. }
            | BindError::Coercion { param, .. } => Some(param),
        }
    }
}

/// The fully bound argument list for one invocation, in declaration
/// order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoundArgs {
    values: Vec<(String, BoundValue)>,
}

impl BoundArgs {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The value at a declaration position.
    pub fn value_at(&self, position: usize) -> Option<&BoundValue> {
        self.values.get(position).map(|(_, v)| v)
    }

    /// The value bound to a parameter name.
    pub fn value(&self, name: &str) -> Option<&BoundValue> {
        self.values
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    /// The raw text of a `Text` parameter.
    pub fn text(&self, name: &str) -> Option<&str> {
        self.value(name).and_then(BoundValue::as_text)
    }

    /// The value of a `Bool` parameter.
    pub fn boolean(&self, name: &str) -> Option<bool> {
        self.value(name).and_then(BoundValue::as_bool)
    }

    /// The value of a `Number` parameter, widened to `f64`.
    pub fn number(&self, name: &str) -> Option<f64> {
        self.value(name).and_then(BoundValue::as_f64)
    }

    /// The value of an integral `Number` parameter.
    pub fn integer(&self, name: &str) -> Option<i64> {
        self.value(name).and_then(BoundValue::as_i64)
    }

    /// The literal of a `Structured` parameter.
    pub fn structured(&self, name: &str) -> Option<&serde_json::Value> {
        self.value(name).and_then(BoundValue::as_structured)
    }

    /// Decodes a bound value into a typed view via serde. Works for any
    /// kind; `Text` decodes as a string.
    ///
    /// ```
    /// use batchkit::{bind, ParamSpec};
    /// use serde::Deserialize;
    ///
    /// #[derive(Deserialize)]
    /// struct Filter {
    ///     older_than_days: u32,
    /// }
    ///
    /// let args = vec!["--filter".to_string(), r#"{"older_than_days":30}"#.to_string()];
    /// let bound = bind(&[ParamSpec::structured("filter")], &args, 0).unwrap();
    /// let filter: Filter = bound.decode("filter").unwrap();
    /// assert_eq!(filter.older_than_days, 30);
    /// ```
    pub fn decode<T: DeserializeOwned>(&self, name: &str) -> anyhow::Result<T> {
        let value = self
            .value(name)
            .ok_or_else(|| anyhow::anyhow!("no parameter named '{name}' was bound"))?;
        Ok(serde_json::from_value(value.to_json())?)
    }

    /// The bound pairs in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &BoundValue)> {
        self.values.iter().map(|(n, v)| (n.as_str(), v))
    }
}

/// Binds `params` from `args[offset..]`.
///
/// `offset` is the index where the handler's own tokens begin, as
/// reported by resolution: 1 past the selector in named mode, 0 in
/// single-operation mode.
pub fn bind(params: &[ParamSpec], args: &[String], offset: usize) -> Result<BoundArgs, BindError> {
    let options = ArgumentMap::parse(args, offset)?;
    let mut values = Vec::with_capacity(params.len());
    for param in params {
        let value = bind_one(param, args, offset, &options)?;
        values.push((param.name.clone(), value));
    }
    Ok(BoundArgs { values })
}

fn bind_one(
    param: &ParamSpec,
    args: &[String],
    offset: usize,
    options: &ArgumentMap,
) -> Result<BoundValue, BindError> {
    if let Some(index) = param.index {
        let position = offset + index;
        return match args.get(position) {
            Some(raw) => coerce(param, raw),
            None => Err(BindError::IndexOutOfRange {
                param: param.name.clone(),
                position,
                supplied: args.len(),
            }),
        };
    }

    let named = options
        .get(&param.name)
        .or_else(|| param.short_stripped().and_then(|alias| options.get(alias)));
    if let Some(raw) = named {
        return coerce(param, raw);
    }

    if let Some(default) = &param.default {
        return Ok(default.clone());
    }

    Err(BindError::MissingRequired {
        param: param.name.clone(),
    })
}

fn coerce(param: &ParamSpec, raw: &str) -> Result<BoundValue, BindError> {
    let fail = |source| BindError::Coercion {
        param: param.name.clone(),
        kind: param.kind,
        source,
    };
    match param.kind {
        ValueKind::Text => Ok(BoundValue::Text(raw.to_string())),
        ValueKind::Bool => serde_json::from_str(raw).map(BoundValue::Bool).map_err(fail),
        ValueKind::Number => serde_json::from_str(raw)
            .map(BoundValue::Number)
            .map_err(fail),
        ValueKind::Structured => serde_json::from_str(raw)
            .map(BoundValue::Structured)
            .map_err(fail),
    }
}
