//! The handler-side contract.
//!
//! This module defines what a batch type implements and what a handler
//! body receives and returns:
//!
//! - [`Batch`]: implemented by the type whose methods are invoked, so the
//!   engine can hand it the per-run [`BatchContext`]
//! - [`ContextSlot`]: the one-field storage most implementations embed
//! - [`Completion`] / [`HandlerResult`]: how a handler body reports back
//!
//! # Cancellation is an outcome, not an error
//!
//! A handler that observes cancellation returns
//! `Ok(Completion::Cancelled)`. The engine treats that as a quiet stop:
//! no failure is reported and the exit code stays at its default. The
//! error channel (`Err`) always means failure, whether or not the token
//! was triggered in the meantime.
//!
//! ```rust,ignore
//! fn sweep(batch: &mut Jobs, args: &BoundArgs) -> HandlerResult {
//!     for entry in entries {
//!         if batch.context().is_cancelled() {
//!             return Ok(Completion::Cancelled);
//!         }
//!         remove(entry)?;
//!     }
//!     Ok(Completion::Finished)
//! }
//! ```

use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime};

use tokio_util::sync::CancellationToken;
use tracing::Span;

/// How a handler body finished.
///
/// The engine inspects this tag to pick between the success and the
/// quiet cancellation path. It never inspects error values for that.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// The body ran to its end.
    Finished,
    /// The body observed cancellation and stopped early. Not a failure.
    Cancelled,
}

/// The result type for handler bodies.
///
/// Failures are `anyhow::Error`, so handler code can use `?` on anything
/// that implements `std::error::Error` and attach context as it goes.
pub type HandlerResult = Result<Completion, anyhow::Error>;

/// Per-run state attached to the batch instance before its handler runs.
///
/// The context is cheap to clone; the argument vector is shared and the
/// cancellation token is a handle onto the engine's signal.
#[derive(Debug, Clone)]
pub struct BatchContext {
    args: Arc<[String]>,
    started_at: SystemTime,
    started: Instant,
    cancellation: CancellationToken,
    span: Span,
}

impl BatchContext {
    pub(crate) fn new(args: Vec<String>, cancellation: CancellationToken) -> Self {
        let span = tracing::info_span!("batch_run", command = tracing::field::Empty);
        Self {
            args: args.into(),
            started_at: SystemTime::now(),
            started: Instant::now(),
            cancellation,
            span,
        }
    }

    /// The raw argument vector of this invocation, selector included.
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Wall-clock time the run began.
    pub fn started_at(&self) -> SystemTime {
        self.started_at
    }

    /// Time elapsed since the run began.
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// The shared cancellation signal for this run. Handlers poll it at
    /// safe points; hosts trigger it from timeouts or signal handlers.
    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancellation
    }

    /// True once the host has triggered cancellation.
    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }

    /// The tracing span covering this run.
    pub fn span(&self) -> &Span {
        &self.span
    }
}

/// Implemented by batch types so the engine can attach the per-run
/// context after construction and before invocation.
///
/// The usual implementation embeds a [`ContextSlot`]:
///
/// ```
/// use batchkit::{Batch, BatchContext, ContextSlot};
///
/// #[derive(Default)]
/// struct Jobs {
///     context: ContextSlot,
/// }
///
/// impl Batch for Jobs {
///     fn attach_context(&mut self, ctx: BatchContext) {
///         self.context.attach(ctx);
///     }
///     fn context(&self) -> &BatchContext {
///         self.context.get()
///     }
/// }
/// ```
pub trait Batch {
    /// Called once per run, after construction and binding succeed.
    fn attach_context(&mut self, ctx: BatchContext);

    /// The context of the run currently executing.
    fn context(&self) -> &BatchContext;
}

/// Storage for the attached [`BatchContext`].
#[derive(Debug, Default)]
pub struct ContextSlot(Option<BatchContext>);

impl ContextSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attach(&mut self, ctx: BatchContext) {
        self.0 = Some(ctx);
    }

    /// The attached context.
    ///
    /// # Panics
    ///
    /// Panics when no context is attached, i.e. outside an engine run.
    pub fn get(&self) -> &BatchContext {
        match &self.0 {
            Some(ctx) => ctx,
            None => panic!("batch context is only available during an engine run"),
        }
    }

    pub fn is_attached(&self) -> bool {
        self.0.is_some()
    }
}
