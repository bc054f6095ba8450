//! Command resolution.
//!
//! Picks exactly one handler out of a registry for a given argument
//! vector, or fails with a value the engine reports like any other
//! failure. Resolution never panics and never exits the process.
//!
//! Two modes, decided by the registry's contents:
//!
//! - any named operation present: token 0 selects by name,
//!   case-insensitively, first declaration wins; options start at
//!   token 1
//! - no named operations: a sole operation is selected unconditionally
//!   and options start at token 0; several unnamed operations are
//!   ambiguous and cannot be selected at all

use thiserror::Error;

use crate::descriptor::HandlerDescriptor;
use crate::registry::BatchRegistry;

/// A successful resolution: the chosen handler plus the index where its
/// option and positional tokens begin.
#[derive(Debug)]
pub struct Resolution<'a, B> {
    pub handler: &'a HandlerDescriptor<B>,
    pub offset: usize,
}

/// Why no handler could be selected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    /// Token 0 named no known command, the selector was missing, or the
    /// registry is empty.
    #[error("no operation of '{type_name}' matches arguments {args:?}")]
    NotFound { type_name: String, args: Vec<String> },

    /// Several operations carry no command name, so none of them can be
    /// picked deterministically.
    #[error(
        "'{type_name}' exposes {count} unnamed operations, so arguments {args:?} select none \
         of them; at most one operation may be left unnamed"
    )]
    Ambiguous {
        type_name: String,
        count: usize,
        args: Vec<String>,
    },
}

/// Resolves `args` against `registry`.
pub fn resolve<'a, B>(
    registry: &'a BatchRegistry<B>,
    args: &[String],
) -> Result<Resolution<'a, B>, ResolveError> {
    let handlers = registry.handlers();
    let has_named = handlers.iter().any(|h| h.command().is_some());

    if has_named {
        if let Some(selector) = args.first() {
            for handler in handlers {
                if let Some(command) = handler.command() {
                    if command.eq_ignore_ascii_case(selector) {
                        return Ok(Resolution { handler, offset: 1 });
                    }
                }
            }
        }
        return Err(ResolveError::NotFound {
            type_name: registry.type_name().to_string(),
            args: args.to_vec(),
        });
    }

    match handlers {
        [single] => Ok(Resolution {
            handler: single,
            offset: 0,
        }),
        [] => Err(ResolveError::NotFound {
            type_name: registry.type_name().to_string(),
            args: args.to_vec(),
        }),
        many => Err(ResolveError::Ambiguous {
            type_name: registry.type_name().to_string(),
            count: many.len(),
            args: args.to_vec(),
        }),
    }
}
