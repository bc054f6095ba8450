//! Terminal run outcomes.
//!
//! Every engine run ends in exactly one [`RunOutcome`]. Failures carry
//! an [`EngineError`] naming the stage that failed; by the time the
//! caller sees one it has already been reported through the
//! interceptor, so hosts usually only need [`RunOutcome::exit_code`].

use thiserror::Error;

use crate::bind::BindError;
use crate::resolve::ResolveError;

/// A failure raised by one stage of a run.
///
/// The display string is the stage message; the underlying cause hangs
/// off `source()` where one exists.
#[derive(Debug, Error)]
pub enum EngineError {
    /// No handler could be selected.
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    /// Parameter binding failed for the selected handler.
    #[error("cannot bind parameters of {type_name}.{method} from {args:?}")]
    Binding {
        type_name: String,
        method: String,
        args: Vec<String>,
        #[source]
        source: BindError,
    },

    /// The factory could not produce a batch instance.
    #[error("cannot construct batch type '{type_name}'")]
    Construction {
        type_name: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The handler body returned an error.
    #[error("{type_name}.{method} failed")]
    Handler {
        type_name: String,
        method: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// The terminal result of one engine run.
#[derive(Debug)]
pub enum RunOutcome {
    /// The handler finished without error.
    Succeeded,
    /// The run observed cancellation and stopped quietly.
    Cancelled,
    /// A stage failed. Already reported through the interceptor.
    Failed(EngineError),
}

impl RunOutcome {
    pub fn is_succeeded(&self) -> bool {
        matches!(self, RunOutcome::Succeeded)
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, RunOutcome::Cancelled)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, RunOutcome::Failed(_))
    }

    /// The failure, when there is one.
    pub fn failure(&self) -> Option<&EngineError> {
        match self {
            RunOutcome::Failed(error) => Some(error),
            _ => None,
        }
    }

    /// The process exit status a host should use: nonzero only for
    /// failures. Cancelled runs exit like successful ones.
    pub fn exit_code(&self) -> i32 {
        if self.is_failed() {
            1
        } else {
            0
        }
    }
}
