//! Plain-text usage summaries.
//!
//! Rendering is line-oriented and unstyled so hosts can print it to any
//! stream. The engine never prints usage on its own; a typical host
//! prints [`crate::BatchRegistry::usage`] after a resolution failure.

use std::fmt::Write;

use crate::descriptor::ParamSpec;
use crate::registry::BatchRegistry;

/// Renders the operation summary for a registry.
pub(crate) fn render<B>(registry: &BatchRegistry<B>) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "operations for {}:", registry.type_name());
    for handler in registry.handlers() {
        match handler.command() {
            Some(command) => {
                let _ = writeln!(out, "  {}", command);
            }
            None => {
                let _ = writeln!(out, "  (no selector) {}", handler.method());
            }
        }
        for param in handler.params() {
            let _ = writeln!(out, "    {}", param_line(param));
        }
    }
    out
}

fn param_line(param: &ParamSpec) -> String {
    let mut line = format!("--{} <{}>", param.name(), param.kind());
    if let Some(short) = param.short_stripped() {
        let _ = write!(line, " [-{}]", short);
    }
    if let Some(position) = param.position() {
        let _ = write!(line, " (position {})", position);
    }
    match &param.default {
        Some(default) => {
            let _ = write!(line, " (default: {})", default.to_json());
        }
        None => line.push_str(" (required)"),
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::ParamSpec;
    use crate::handler::Completion;

    #[test]
    fn test_render_lists_commands_and_params() {
        let registry: BatchRegistry<()> = BatchRegistry::builder()
            .command(
                "sweep",
                vec![
                    ParamSpec::text("path").index(0),
                    ParamSpec::boolean("dry-run").short("-n").default(false),
                ],
                |_, _| Ok(Completion::Finished),
            )
            .command("report", vec![], |_, _| Ok(Completion::Finished))
            .build()
            .unwrap();

        let usage = registry.usage();
        assert!(usage.starts_with("operations for ():"), "usage: {usage}");
        assert!(usage.contains("  sweep\n"), "usage: {usage}");
        assert!(
            usage.contains("--path <text> (position 0) (required)"),
            "usage: {usage}"
        );
        assert!(
            usage.contains("--dry-run <bool> [-n] (default: false)"),
            "usage: {usage}"
        );
        assert!(usage.contains("  report\n"), "usage: {usage}");
    }

    #[test]
    fn test_render_marks_unnamed_operations() {
        let registry: BatchRegistry<()> = BatchRegistry::builder()
            .implicit("run", vec![ParamSpec::number("count")], |_, _| {
                Ok(Completion::Finished)
            })
            .build()
            .unwrap();

        let usage = registry.usage();
        assert!(usage.contains("(no selector) run"), "usage: {usage}");
        assert!(usage.contains("--count <number> (required)"), "usage: {usage}");
    }
}
