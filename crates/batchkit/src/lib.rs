//! Command resolution, argument binding, and cancellation-aware
//! invocation for batch-style CLIs.
//!
//! `batchkit` is the core of a small framework for programs that expose
//! a set of operations on a "batch type": a plain struct whose methods
//! do the work. The engine takes the raw argument vector and drives it
//! through a fixed pipeline:
//!
//! 1. **resolve** which operation the caller selected (or the sole
//!    operation, when the type exposes exactly one without a name)
//! 2. **tokenize** the remaining tokens into an option map
//! 3. **bind** each declared parameter from position, name, short alias
//!    or default, coercing to its declared kind
//! 4. **construct** the batch instance through a factory and attach the
//!    per-run context (arguments, clock, cancellation token)
//! 5. **invoke** the handler body
//! 6. **complete** the run through the interceptor, exactly once,
//!    succeed or fail
//!
//! Every failure mode is a value: bad selectors, unparseable values and
//! handler errors all end in a [`RunOutcome`] carrying an
//! [`EngineError`], never a panic and never a process exit. Hosts decide
//! what to do with the outcome; [`RunOutcome::exit_code`] gives the
//! conventional mapping.
//!
//! # Quick start
//!
//! ```
//! use batchkit::{Batch, BatchContext, BatchEngine, BatchRegistry, Completion, ContextSlot, ParamSpec};
//!
//! #[derive(Default)]
//! struct Greeter {
//!     context: ContextSlot,
//! }
//!
//! impl Batch for Greeter {
//!     fn attach_context(&mut self, ctx: BatchContext) {
//!         self.context.attach(ctx);
//!     }
//!     fn context(&self) -> &BatchContext {
//!         self.context.get()
//!     }
//! }
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let registry = BatchRegistry::<Greeter>::builder()
//!     .command("hello", vec![ParamSpec::text("name").index(0)], |batch, args| {
//!         let name = args.text("name").unwrap_or("world");
//!         println!("hello, {name} (after {:?})", batch.context().elapsed());
//!         Ok(Completion::Finished)
//!     })
//!     .build()?;
//!
//! let outcome = BatchEngine::new(registry).run(["hello", "Ada"]);
//! assert!(outcome.is_succeeded());
//! # Ok(())
//! # }
//! ```
//!
//! # Cancellation
//!
//! Runs share the engine's [`CancellationToken`]. Hosts trigger it from
//! wherever makes sense (a timeout thread, a signal handler); handler
//! bodies poll it through their context and return
//! `Ok(Completion::Cancelled)` when they stop early. A cancelled run
//! completes quietly: no failure report, exit code 0.

mod bind;
mod descriptor;
mod engine;
mod handler;
mod interceptor;
mod outcome;
mod registry;
mod resolve;
mod tokenize;
mod usage;

pub use bind::{bind, BindError, BoundArgs};
pub use descriptor::{BoundValue, HandlerDescriptor, ParamSpec, ValueKind};
pub use engine::{BatchEngine, BatchFactory, DefaultFactory, EngineBuilder, SetupError};
pub use handler::{Batch, BatchContext, Completion, ContextSlot, HandlerResult};
pub use interceptor::{
    BatchInterceptor, CompositeInterceptor, LogInterceptor, NullInterceptor,
};
pub use outcome::{EngineError, RunOutcome};
pub use resolve::{resolve, Resolution, ResolveError};
pub use registry::{BatchRegistry, BatchRegistryBuilder, RegistryError};
pub use tokenize::{ArgumentMap, DuplicateOption, SWITCH_PREFIX};

/// Re-exported so hosts share the exact token type the engine observes.
pub use tokio_util::sync::CancellationToken;
