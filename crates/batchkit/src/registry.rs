//! Handler registration.
//!
//! A [`BatchRegistry`] is the declarative operation set for one batch
//! type: every invocable method, its selector, and its parameter
//! descriptors. Registries are immutable once built; the builder
//! validates declarations so malformed registrations fail at startup
//! rather than on some future invocation.
//!
//! Note that declaring several unnamed operations is accepted here. The
//! ambiguity only matters if one of them would actually be selected, so
//! it is reported at resolution time instead.

use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::bind::BoundArgs;
use crate::descriptor::{HandlerDescriptor, ParamSpec, ValueKind};
use crate::handler::HandlerResult;

/// Declaration errors caught when the registry is built.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("operation names must not be empty")]
    EmptyName,

    #[error("parameter of '{method}' has an empty name")]
    EmptyParamName { method: String },

    #[error(
        "parameter '{param}' of '{method}' is declared {declared} but its default is {default}"
    )]
    DefaultKindMismatch {
        method: String,
        param: String,
        declared: ValueKind,
        default: ValueKind,
    },

    /// Names collide the way lookups do, ignoring ASCII case.
    #[error("parameter '{param}' of '{method}' is declared more than once")]
    DuplicateParamName { method: String, param: String },

    #[error("parameter '{param}' of '{method}' reuses position {position}")]
    DuplicateParamIndex {
        method: String,
        param: String,
        position: usize,
    },
}

/// The operation set for a batch type `B`.
pub struct BatchRegistry<B> {
    type_name: String,
    handlers: Vec<HandlerDescriptor<B>>,
}

impl<B> BatchRegistry<B> {
    /// Starts an empty registry for `B`.
    pub fn builder() -> BatchRegistryBuilder<B> {
        BatchRegistryBuilder::new()
    }

    /// The short name of `B`, used in failure messages and logs.
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// The registered operations, in declaration order.
    pub fn handlers(&self) -> &[HandlerDescriptor<B>] {
        &self.handlers
    }

    /// A plain-text summary of the registered operations and their
    /// parameters. Hosts typically print this when resolution fails;
    /// the engine itself never does.
    pub fn usage(&self) -> String {
        crate::usage::render(self)
    }
}

impl<B> fmt::Debug for BatchRegistry<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BatchRegistry")
            .field("type_name", &self.type_name)
            .field("handlers", &self.handlers)
            .finish()
    }
}

/// Builder for [`BatchRegistry`].
///
/// ```
/// use batchkit::{BatchRegistry, Completion, ParamSpec};
///
/// let registry: BatchRegistry<()> = BatchRegistry::builder()
///     .command("hello", vec![ParamSpec::text("name")], |_, args| {
///         println!("hello, {}", args.text("name").unwrap_or("world"));
///         Ok(Completion::Finished)
///     })
///     .build()
///     .unwrap();
/// assert_eq!(registry.handlers().len(), 1);
/// ```
pub struct BatchRegistryBuilder<B> {
    handlers: Vec<HandlerDescriptor<B>>,
}

impl<B> BatchRegistryBuilder<B> {
    pub fn new() -> Self {
        Self {
            handlers: Vec::new(),
        }
    }

    /// Registers a named operation. Callers select it by typing `name`
    /// as their first token; the diagnostic method name is the same.
    pub fn command<F>(
        mut self,
        name: impl Into<String>,
        params: Vec<ParamSpec>,
        handler: F,
    ) -> Self
    where
        F: Fn(&mut B, &BoundArgs) -> HandlerResult + Send + Sync + 'static,
    {
        let name = name.into();
        self.handlers.push(HandlerDescriptor {
            method: name.clone(),
            command: Some(name),
            params,
            invoke: Arc::new(handler),
        });
        self
    }

    /// Registers an unnamed operation. When it is the only operation in
    /// the registry, every invocation selects it and token 0 already
    /// belongs to its parameters. `method` is the diagnostic name.
    pub fn implicit<F>(
        mut self,
        method: impl Into<String>,
        params: Vec<ParamSpec>,
        handler: F,
    ) -> Self
    where
        F: Fn(&mut B, &BoundArgs) -> HandlerResult + Send + Sync + 'static,
    {
        self.handlers.push(HandlerDescriptor {
            method: method.into(),
            command: None,
            params,
            invoke: Arc::new(handler),
        });
        self
    }

    /// Validates the declarations and produces the registry.
    pub fn build(self) -> Result<BatchRegistry<B>, RegistryError> {
        for handler in &self.handlers {
            if handler.method.is_empty() {
                return Err(RegistryError::EmptyName);
            }
            for (i, param) in handler.params.iter().enumerate() {
                if param.name.is_empty() {
                    return Err(RegistryError::EmptyParamName {
                        method: handler.method.clone(),
                    });
                }
                if let Some(default) = &param.default {
                    if default.kind() != param.kind {
                        return Err(RegistryError::DefaultKindMismatch {
                            method: handler.method.clone(),
                            param: param.name.clone(),
                            declared: param.kind,
                            default: default.kind(),
                        });
                    }
                }
                for earlier in &handler.params[..i] {
                    if earlier.name.eq_ignore_ascii_case(&param.name) {
                        return Err(RegistryError::DuplicateParamName {
                            method: handler.method.clone(),
                            param: param.name.clone(),
                        });
                    }
                    if let Some(position) = param.index {
                        if earlier.index == Some(position) {
                            return Err(RegistryError::DuplicateParamIndex {
                                method: handler.method.clone(),
                                param: param.name.clone(),
                                position,
                            });
                        }
                    }
                }
            }
        }
        Ok(BatchRegistry {
            type_name: short_type_name::<B>(),
            handlers: self.handlers,
        })
    }
}

impl<B> Default for BatchRegistryBuilder<B> {
    fn default() -> Self {
        Self::new()
    }
}

/// The tail of the full type path, for diagnostics. Generic arguments
/// are dropped first so they cannot split the path at their own `::`.
fn short_type_name<B>() -> String {
    let full = std::any::type_name::<B>();
    let base = full.split('<').next().unwrap_or(full);
    match base.rsplit("::").next() {
        Some(tail) => tail.to_string(),
        None => full.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::Completion;

    struct MaintenanceJobs;

    #[test]
    fn test_type_name_is_short() {
        let registry: BatchRegistry<MaintenanceJobs> = BatchRegistry::builder()
            .command("sweep", vec![], |_, _| Ok(Completion::Finished))
            .build()
            .unwrap();
        assert_eq!(registry.type_name(), "MaintenanceJobs");
    }

    #[test]
    fn test_generic_type_name_drops_arguments() {
        let registry: BatchRegistry<Vec<String>> = BatchRegistry::builder()
            .command("push", vec![], |_, _| Ok(Completion::Finished))
            .build()
            .unwrap();
        assert_eq!(registry.type_name(), "Vec");
    }

    #[test]
    fn test_declaration_order_is_preserved() {
        let registry: BatchRegistry<()> = BatchRegistry::builder()
            .command("b", vec![], |_, _| Ok(Completion::Finished))
            .command("a", vec![], |_, _| Ok(Completion::Finished))
            .build()
            .unwrap();
        let names: Vec<&str> = registry.handlers().iter().map(|h| h.method()).collect();
        assert_eq!(names, vec!["b", "a"]);
    }

    #[test]
    fn test_empty_command_name_is_rejected() {
        let err = BatchRegistry::<()>::builder()
            .command("", vec![], |_, _| Ok(Completion::Finished))
            .build()
            .unwrap_err();
        assert_eq!(err, RegistryError::EmptyName);
    }

    #[test]
    fn test_empty_param_name_is_rejected() {
        let err = BatchRegistry::<()>::builder()
            .command("run", vec![ParamSpec::text("")], |_, _| {
                Ok(Completion::Finished)
            })
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            RegistryError::EmptyParamName { method } if method == "run"
        ));
    }

    #[test]
    fn test_default_kind_mismatch_is_rejected() {
        let err = BatchRegistry::<()>::builder()
            .command(
                "run",
                vec![ParamSpec::number("count").default("three")],
                |_, _| Ok(Completion::Finished),
            )
            .build()
            .unwrap_err();
        match err {
            RegistryError::DefaultKindMismatch {
                method,
                param,
                declared,
                default,
            } => {
                assert_eq!(method, "run");
                assert_eq!(param, "count");
                assert_eq!(declared, ValueKind::Number);
                assert_eq!(default, ValueKind::Text);
            }
            other => panic!("expected DefaultKindMismatch, got {other:?}"),
        }
    }

    #[test]
    fn test_duplicate_param_name_is_rejected() {
        // Lookup is case-insensitive, so the clash is too.
        let err = BatchRegistry::<()>::builder()
            .command(
                "run",
                vec![ParamSpec::text("path"), ParamSpec::number("PATH")],
                |_, _| Ok(Completion::Finished),
            )
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            RegistryError::DuplicateParamName { method, param }
                if method == "run" && param == "PATH"
        ));
    }

    #[test]
    fn test_duplicate_param_index_is_rejected() {
        let err = BatchRegistry::<()>::builder()
            .command(
                "run",
                vec![
                    ParamSpec::text("source").index(0),
                    ParamSpec::text("target").index(0),
                ],
                |_, _| Ok(Completion::Finished),
            )
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            RegistryError::DuplicateParamIndex { param, position: 0, .. }
                if param == "target"
        ));
    }

    #[test]
    fn test_distinct_positions_build() {
        let registry = BatchRegistry::<()>::builder()
            .command(
                "copy",
                vec![
                    ParamSpec::text("source").index(0),
                    ParamSpec::text("target").index(1),
                ],
                |_, _| Ok(Completion::Finished),
            )
            .build();
        assert!(registry.is_ok());
    }

    #[test]
    fn test_matching_default_kind_builds() {
        let registry = BatchRegistry::<()>::builder()
            .command(
                "run",
                vec![
                    ParamSpec::number("count").default(1),
                    ParamSpec::boolean("dry-run").default(false),
                    ParamSpec::structured("filter").default(serde_json::json!({})),
                ],
                |_, _| Ok(Completion::Finished),
            )
            .build();
        assert!(registry.is_ok());
    }

    #[test]
    fn test_several_unnamed_operations_build() {
        // Ambiguity is a resolution-time concern.
        let registry = BatchRegistry::<()>::builder()
            .implicit("first", vec![], |_, _| Ok(Completion::Finished))
            .implicit("second", vec![], |_, _| Ok(Completion::Finished))
            .build();
        assert!(registry.is_ok());
    }
}
