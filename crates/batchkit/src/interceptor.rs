//! Run lifecycle interception.
//!
//! Interceptors observe every run the engine performs: once before
//! resolution starts and exactly once when the run reaches a terminal
//! state. The completion call carries `(None, None)` for successful and
//! cancelled runs, or the failure message and its underlying cause.
//!
//! The engine runs with [`NullInterceptor`] unless told otherwise;
//! [`LogInterceptor`] reports through `tracing`; [`CompositeInterceptor`]
//! fans out to several interceptors in order.

use std::error::Error;
use std::fmt;
use std::sync::Arc;

use tracing::{error, info};

use crate::handler::BatchContext;

/// Lifecycle collaborator for engine runs.
pub trait BatchInterceptor: Send + Sync {
    /// Called once per run, before resolution proceeds.
    fn on_run_begin(&self, ctx: &BatchContext);

    /// Called exactly once per run. `message` and `cause` are `None`
    /// unless the run failed; cancelled runs complete quietly.
    fn on_run_complete(
        &self,
        ctx: &BatchContext,
        message: Option<&str>,
        cause: Option<&(dyn Error + 'static)>,
    );
}

/// Interceptor that does nothing. The engine's default.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullInterceptor;

impl BatchInterceptor for NullInterceptor {
    fn on_run_begin(&self, _ctx: &BatchContext) {}

    fn on_run_complete(
        &self,
        _ctx: &BatchContext,
        _message: Option<&str>,
        _cause: Option<&(dyn Error + 'static)>,
    ) {
    }
}

/// Interceptor that reports run boundaries through `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogInterceptor;

impl BatchInterceptor for LogInterceptor {
    fn on_run_begin(&self, ctx: &BatchContext) {
        info!(args = ?ctx.args(), "batch run started");
    }

    fn on_run_complete(
        &self,
        ctx: &BatchContext,
        message: Option<&str>,
        cause: Option<&(dyn Error + 'static)>,
    ) {
        let elapsed_ms = ctx.elapsed().as_millis() as u64;
        match (message, cause) {
            (None, _) => info!(elapsed_ms, "batch run completed"),
            (Some(message), None) => error!(elapsed_ms, "{message}"),
            (Some(message), Some(cause)) => {
                error!(elapsed_ms, cause = %error_chain(cause), "{message}")
            }
        }
    }
}

/// Flattens an error and its sources into one `a: b: c` line.
fn error_chain(error: &(dyn Error + 'static)) -> String {
    let mut chain = error.to_string();
    let mut current = error.source();
    while let Some(next) = current {
        chain.push_str(": ");
        chain.push_str(&next.to_string());
        current = next.source();
    }
    chain
}

/// Fans out to several interceptors in registration order, for both
/// lifecycle calls.
#[derive(Default)]
pub struct CompositeInterceptor {
    inner: Vec<Arc<dyn BatchInterceptor>>,
}

impl CompositeInterceptor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an interceptor.
    pub fn with(mut self, interceptor: impl BatchInterceptor + 'static) -> Self {
        self.inner.push(Arc::new(interceptor));
        self
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl fmt::Debug for CompositeInterceptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeInterceptor")
            .field("interceptors", &self.inner.len())
            .finish()
    }
}

impl BatchInterceptor for CompositeInterceptor {
    fn on_run_begin(&self, ctx: &BatchContext) {
        for interceptor in &self.inner {
            interceptor.on_run_begin(ctx);
        }
    }

    fn on_run_complete(
        &self,
        ctx: &BatchContext,
        message: Option<&str>,
        cause: Option<&(dyn Error + 'static)>,
    ) {
        for interceptor in &self.inner {
            interceptor.on_run_complete(ctx, message, cause);
        }
    }
}
