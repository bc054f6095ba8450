//! `jobs`: a worked example of a batchkit CLI.
//!
//! One batch type, two operations:
//!
//! ```text
//! jobs sweep /var/tmp --dry-run
//! jobs sweep /var/tmp --max-age-days 7
//! jobs report --filter '{"older_than_days":30,"prefix":"/var/tmp/cache"}'
//! ```
//!
//! Set `JOBS_TIMEOUT_SECS` to turn the engine's cancellation token into
//! a deadline; a sweep that overruns it stops quietly with exit code 0.

use anyhow::Context as _;
use serde::Deserialize;
use tracing::info;

use batchkit::{
    Batch, BatchContext, BatchEngine, BatchRegistry, BoundArgs, Completion, ContextSlot,
    EngineError, HandlerResult, LogInterceptor, ParamSpec, RegistryError, ResolveError,
};

/// The batch type. One instance is constructed per run; its methods are
/// the operations callers select.
#[derive(Default)]
struct MaintenanceJobs {
    context: ContextSlot,
    removed: usize,
}

impl Batch for MaintenanceJobs {
    fn attach_context(&mut self, ctx: BatchContext) {
        self.context.attach(ctx);
    }

    fn context(&self) -> &BatchContext {
        self.context.get()
    }
}

/// Filter accepted by `report` as a structured parameter.
#[derive(Debug, Deserialize)]
struct ReportFilter {
    #[serde(default)]
    older_than_days: i64,
    #[serde(default)]
    prefix: String,
}

impl MaintenanceJobs {
    /// Removes entries older than `max-age-days` under `path`.
    fn sweep(&mut self, args: &BoundArgs) -> HandlerResult {
        let path = args.text("path").context("path is required")?.to_string();
        let dry_run = args.boolean("dry-run").unwrap_or(false);
        let max_age_days = args.integer("max-age-days").unwrap_or(30);
        info!(path = %path, dry_run, max_age_days, "sweep starting");

        for (entry, age_days) in stale_entries(&path) {
            if self.context().is_cancelled() {
                info!(removed = self.removed, "sweep interrupted");
                return Ok(Completion::Cancelled);
            }
            if age_days < max_age_days {
                continue;
            }
            if !dry_run {
                // A real deployment would delete the entry here.
            }
            self.removed += 1;
            info!(entry = %entry, age_days, dry_run, "swept");
        }

        info!(removed = self.removed, "sweep finished");
        Ok(Completion::Finished)
    }

    /// Prints the entries a sweep with the given filter would touch.
    fn report(&mut self, args: &BoundArgs) -> HandlerResult {
        let path = args.text("path").context("path is required")?.to_string();
        let filter: ReportFilter = args.decode("filter")?;

        let mut matched = 0usize;
        for (entry, age_days) in stale_entries(&path) {
            if self.context().is_cancelled() {
                return Ok(Completion::Cancelled);
            }
            if age_days < filter.older_than_days || !entry.starts_with(&filter.prefix) {
                continue;
            }
            println!("{age_days:>4}d  {entry}");
            matched += 1;
        }
        println!("{matched} entries match {filter:?}");
        Ok(Completion::Finished)
    }
}

/// Stand-in for a directory scan, as (entry, age in days). A real tool
/// would read the filesystem; the example keeps the data deterministic.
fn stale_entries(path: &str) -> Vec<(String, i64)> {
    [
        ("cache/assets.bin", 41),
        ("core.1823", 12),
        ("session.log", 92),
        ("editor.swp", 3),
    ]
    .iter()
    .map(|(name, age)| (format!("{path}/{name}"), *age))
    .collect()
}

fn registry() -> Result<BatchRegistry<MaintenanceJobs>, RegistryError> {
    BatchRegistry::builder()
        .command(
            "sweep",
            vec![
                ParamSpec::text("path").index(0),
                ParamSpec::boolean("dry-run").short("-n").default(false),
                ParamSpec::number("max-age-days").default(30),
            ],
            MaintenanceJobs::sweep,
        )
        .command(
            "report",
            vec![
                ParamSpec::text("path").default("/var/tmp"),
                ParamSpec::structured("filter").default(serde_json::json!({})),
            ],
            MaintenanceJobs::report,
        )
        .build()
}

fn run(args: Vec<String>) -> anyhow::Result<i32> {
    let engine = BatchEngine::builder(registry()?)
        .factory(|| Ok(MaintenanceJobs::default()))
        .interceptor(LogInterceptor)
        .build()?;

    if let Ok(secs) = std::env::var("JOBS_TIMEOUT_SECS") {
        let secs: u64 = secs.parse().context("JOBS_TIMEOUT_SECS must be a number")?;
        let token = engine.cancellation().clone();
        std::thread::spawn(move || {
            std::thread::sleep(std::time::Duration::from_secs(secs));
            token.cancel();
        });
    }

    let outcome = engine.run(args);
    if let Some(EngineError::Resolve(ResolveError::NotFound { .. })) = outcome.failure() {
        eprint!("{}", engine.registry().usage());
    }
    Ok(outcome.exit_code())
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    match run(args) {
        Ok(code) => std::process::exit(code),
        Err(error) => {
            eprintln!("jobs: {error:#}");
            std::process::exit(2);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use batchkit::CancellationToken;

    fn engine() -> BatchEngine<MaintenanceJobs> {
        BatchEngine::new(registry().unwrap())
    }

    #[test]
    fn test_registry_builds() {
        let registry = registry().unwrap();
        assert_eq!(registry.handlers().len(), 2);
        assert_eq!(registry.type_name(), "MaintenanceJobs");
    }

    #[test]
    fn test_sweep_dry_run_succeeds() {
        let outcome = engine().run(["sweep", "/var/tmp", "--dry-run"]);
        assert!(outcome.is_succeeded(), "outcome: {outcome:?}");
        assert_eq!(outcome.exit_code(), 0);
    }

    #[test]
    fn test_sweep_short_alias_and_number_option() {
        let outcome = engine().run(["sweep", "/var/tmp", "-n", "--max-age-days", "7"]);
        assert!(outcome.is_succeeded(), "outcome: {outcome:?}");
    }

    #[test]
    fn test_sweep_without_path_is_a_binding_failure() {
        let outcome = engine().run(["sweep"]);
        assert!(matches!(
            outcome.failure(),
            Some(EngineError::Binding { .. })
        ));
        assert_eq!(outcome.exit_code(), 1);
    }

    #[test]
    fn test_report_decodes_structured_filter() {
        let outcome = engine().run([
            "report",
            "--filter",
            r#"{"older_than_days":10,"prefix":"/var/tmp"}"#,
        ]);
        assert!(outcome.is_succeeded(), "outcome: {outcome:?}");
    }

    #[test]
    fn test_report_rejects_malformed_filter() {
        let outcome = engine().run(["report", "--filter", "{not json}"]);
        assert!(matches!(
            outcome.failure(),
            Some(EngineError::Binding { .. })
        ));
    }

    #[test]
    fn test_unknown_command_is_a_failure() {
        let outcome = engine().run(["scrub"]);
        assert!(matches!(
            outcome.failure(),
            Some(EngineError::Resolve(ResolveError::NotFound { .. }))
        ));
        assert_eq!(outcome.exit_code(), 1);
    }

    #[test]
    fn test_cancelled_sweep_exits_zero() {
        let token = CancellationToken::new();
        token.cancel();
        let engine = BatchEngine::builder(registry().unwrap())
            .factory(|| Ok(MaintenanceJobs::default()))
            .cancellation(token)
            .build()
            .unwrap();

        let outcome = engine.run(["sweep", "/var/tmp"]);
        assert!(outcome.is_cancelled());
        assert_eq!(outcome.exit_code(), 0);
    }

    #[test]
    fn test_usage_lists_both_operations() {
        let usage = registry().unwrap().usage();
        assert!(usage.contains("sweep"), "usage: {usage}");
        assert!(usage.contains("report"), "usage: {usage}");
        assert!(usage.contains("--max-age-days <number>"), "usage: {usage}");
    }
}
