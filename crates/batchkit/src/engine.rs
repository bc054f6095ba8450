//! The invocation runner.
//!
//! [`BatchEngine`] drives one argument vector to a terminal
//! [`RunOutcome`] through a fixed sequence of stages:
//!
//! 1. begin: the interceptor is told the run started
//! 2. resolving: a handler is selected ([`crate::resolve`])
//! 3. binding: its parameters are bound ([`crate::bind`])
//! 4. instantiating: the factory produces a batch instance and the
//!    per-run context is attached
//! 5. invoking: the handler body runs
//! 6. completing: the interceptor is told how the run ended
//!
//! A failure in any stage skips the remaining ones and jumps to
//! completion. The engine never panics on bad input, never exits the
//! process, and reports every run's end exactly once.
//!
//! # Construction
//!
//! [`BatchEngine::new`] covers `Default`-constructible batch types.
//! Everything else goes through the builder:
//!
//! ```rust,ignore
//! let engine = BatchEngine::builder(registry)
//!     .factory(move || Ok(Jobs::connected(pool.clone())))
//!     .interceptor(LogInterceptor)
//!     .cancellation(shutdown.clone())
//!     .build()?;
//! std::process::exit(engine.run(std::env::args().skip(1)).exit_code());
//! ```

use std::marker::PhantomData;
use std::sync::Arc;

use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::bind::bind;
use crate::handler::{Batch, BatchContext, Completion};
use crate::interceptor::{BatchInterceptor, NullInterceptor};
use crate::outcome::{EngineError, RunOutcome};
use crate::registry::BatchRegistry;
use crate::resolve::resolve;

/// Construction collaborator: produces the batch instance for one run.
///
/// Closures of type `Fn() -> Result<B, anyhow::Error>` implement this
/// directly, so most hosts never write the impl by hand.
pub trait BatchFactory<B>: Send + Sync {
    fn construct(&self) -> Result<B, anyhow::Error>;
}

impl<B, F> BatchFactory<B> for F
where
    F: Fn() -> Result<B, anyhow::Error> + Send + Sync,
{
    fn construct(&self) -> Result<B, anyhow::Error> {
        self()
    }
}

/// Factory for batch types with a `Default` impl.
pub struct DefaultFactory<B>(PhantomData<fn() -> B>);

impl<B> DefaultFactory<B> {
    pub fn new() -> Self {
        Self(PhantomData)
    }
}

impl<B> Default for DefaultFactory<B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B> std::fmt::Debug for DefaultFactory<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("DefaultFactory")
    }
}

impl<B: Default> BatchFactory<B> for DefaultFactory<B> {
    fn construct(&self) -> Result<B, anyhow::Error> {
        Ok(B::default())
    }
}

/// Engine assembly errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SetupError {
    #[error(
        "no batch factory configured; set one with `factory`, or use `BatchEngine::new` \
         for Default-constructible batch types"
    )]
    MissingFactory,
}

/// Drives invocations of one batch type.
///
/// The engine is immutable and every call to [`run`](Self::run) is an
/// independent invocation, so a host may run it any number of times.
/// All runs share the engine's cancellation token.
pub struct BatchEngine<B> {
    registry: BatchRegistry<B>,
    factory: Arc<dyn BatchFactory<B>>,
    interceptor: Arc<dyn BatchInterceptor>,
    cancellation: CancellationToken,
}

impl<B> BatchEngine<B> {
    /// An engine with defaults: `Default`-constructed instances, no
    /// interception, a fresh cancellation token.
    pub fn new(registry: BatchRegistry<B>) -> Self
    where
        B: Default + 'static,
    {
        Self {
            registry,
            factory: Arc::new(DefaultFactory::new()),
            interceptor: Arc::new(NullInterceptor),
            cancellation: CancellationToken::new(),
        }
    }

    /// Starts a builder around `registry`.
    pub fn builder(registry: BatchRegistry<B>) -> EngineBuilder<B> {
        EngineBuilder::new(registry)
    }

    /// The operation set this engine serves.
    pub fn registry(&self) -> &BatchRegistry<B> {
        &self.registry
    }

    /// The cancellation token observed by every run. Hosts trigger it
    /// from timeouts or signal handlers; handlers poll it through their
    /// context.
    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancellation
    }
}

impl<B: Batch> BatchEngine<B> {
    /// Runs one invocation to its terminal outcome.
    ///
    /// The argument vector starts at the selector (no program name), the
    /// shape `std::env::args().skip(1)` produces.
    pub fn run<I, S>(&self, args: I) -> RunOutcome
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let args: Vec<String> = args.into_iter().map(Into::into).collect();
        let ctx = BatchContext::new(args.clone(), self.cancellation.clone());
        let _guard = ctx.span().clone().entered();

        self.interceptor.on_run_begin(&ctx);
        let outcome = self.run_stages(&ctx, &args);
        match &outcome {
            RunOutcome::Succeeded | RunOutcome::Cancelled => {
                self.interceptor.on_run_complete(&ctx, None, None);
            }
            RunOutcome::Failed(error) => {
                let message = error.to_string();
                self.interceptor
                    .on_run_complete(&ctx, Some(&message), std::error::Error::source(error));
            }
        }
        outcome
    }

    fn run_stages(&self, ctx: &BatchContext, args: &[String]) -> RunOutcome {
        let resolution = match resolve(&self.registry, args) {
            Ok(resolution) => resolution,
            Err(error) => return RunOutcome::Failed(EngineError::Resolve(error)),
        };
        let handler = resolution.handler;
        ctx.span().record("command", handler.method());
        debug!(
            method = handler.method(),
            offset = resolution.offset,
            "handler resolved"
        );

        let bound = match bind(handler.params(), args, resolution.offset) {
            Ok(bound) => bound,
            Err(source) => {
                return RunOutcome::Failed(EngineError::Binding {
                    type_name: self.registry.type_name().to_string(),
                    method: handler.method().to_string(),
                    args: args.to_vec(),
                    source,
                })
            }
        };
        debug!(params = bound.len(), "parameters bound");

        let mut instance = match self.factory.construct() {
            Ok(instance) => instance,
            Err(source) => {
                return RunOutcome::Failed(EngineError::Construction {
                    type_name: self.registry.type_name().to_string(),
                    source: source.into(),
                })
            }
        };
        instance.attach_context(ctx.clone());

        match (handler.invoke)(&mut instance, &bound) {
            Ok(Completion::Finished) => RunOutcome::Succeeded,
            Ok(Completion::Cancelled) => RunOutcome::Cancelled,
            Err(source) => RunOutcome::Failed(EngineError::Handler {
                type_name: self.registry.type_name().to_string(),
                method: handler.method().to_string(),
                source: source.into(),
            }),
        }
    }
}

impl<B> std::fmt::Debug for BatchEngine<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchEngine")
            .field("registry", &self.registry)
            .finish()
    }
}

/// Builder for [`BatchEngine`].
pub struct EngineBuilder<B> {
    registry: BatchRegistry<B>,
    factory: Option<Arc<dyn BatchFactory<B>>>,
    interceptor: Arc<dyn BatchInterceptor>,
    cancellation: CancellationToken,
}

impl<B> EngineBuilder<B> {
    fn new(registry: BatchRegistry<B>) -> Self {
        Self {
            registry,
            factory: None,
            interceptor: Arc::new(NullInterceptor),
            cancellation: CancellationToken::new(),
        }
    }

    /// Sets the construction collaborator. A closure returning
    /// `Result<B, anyhow::Error>` works directly.
    pub fn factory(mut self, factory: impl BatchFactory<B> + 'static) -> Self {
        self.factory = Some(Arc::new(factory));
        self
    }

    /// Sets the lifecycle interceptor. Compose several with
    /// [`crate::CompositeInterceptor`].
    pub fn interceptor(mut self, interceptor: impl BatchInterceptor + 'static) -> Self {
        self.interceptor = Arc::new(interceptor);
        self
    }

    /// Shares `token` as the cancellation signal instead of a fresh,
    /// never-triggered one.
    pub fn cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    /// Assembles the engine.
    pub fn build(self) -> Result<BatchEngine<B>, SetupError> {
        let factory = self.factory.ok_or(SetupError::MissingFactory)?;
        Ok(BatchEngine {
            registry: self.registry,
            factory,
            interceptor: self.interceptor,
            cancellation: self.cancellation,
        })
    }
}
