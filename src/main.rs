use anyhow::{Context, Result};
use clap::Parser;
use diagramerz::analysis::{Analysis, analyze};
use diagramerz::cli::{Cli, Commands};
use diagramerz::config::Settings;
use diagramerz::logging::init_logging;
use diagramerz::sequence::{trace_all_entry_points, trace_entry};
use diagramerz::source::{SourceUnit, load_sources};
use diagramerz::class_diagram;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::warn;

fn main() -> Result<()> {
    let cli = parse_cli();
    let settings = Settings::load(cli.config.as_deref())?;
    init_logging(cli.log_level.as_deref(), settings.log_level.as_deref())?;

    match cli.command {
        Commands::Class { paths, output } => {
            let (_, analysis) = build(&paths)?;
            write_output(&class_diagram::render(&analysis.model), output.as_deref())?;
        }
        Commands::Sequence {
            paths,
            class,
            method,
            max_depth,
            max_entries,
            output,
        } => {
            let (_, analysis) = build(&paths)?;
            let options = settings.sequence_options(max_depth, max_entries);
            let diagram = match (class, method) {
                (Some(class), Some(method)) => {
                    trace_entry(&analysis.model, &class, &method, options)
                }
                _ => trace_all_entry_points(&analysis.model, options),
            };
            write_output(&diagram.to_string(), output.as_deref())?;
        }
        Commands::Model { paths, output } => {
            let (units, analysis) = build(&paths)?;
            let report = ModelOutput {
                units: &units,
                analysis: &analysis,
            };
            write_output(&serde_json::to_string_pretty(&report)?, output.as_deref())?;
        }
    }

    Ok(())
}

#[derive(Serialize)]
struct ModelOutput<'a> {
    units: &'a [SourceUnit],
    #[serde(flatten)]
    analysis: &'a Analysis,
}

fn build(paths: &[PathBuf]) -> Result<(Vec<SourceUnit>, Analysis)> {
    let units = load_sources(paths)?;
    let analysis = analyze(&units).context("failed to parse Java sources")?;
    let skipped = analysis.skipped_declarations();
    if skipped > 0 {
        warn!(skipped, "some declarations could not be extracted");
    }
    Ok((units, analysis))
}

fn parse_cli() -> Cli {
    let args: Vec<String> = std::env::args().collect();
    Cli::parse_from(rewrite_args_for_implicit_class(args))
}

/// `diagramerz src/` is shorthand for `diagramerz class src/`.
fn rewrite_args_for_implicit_class(mut args: Vec<String>) -> Vec<String> {
    if args.len() <= 1 {
        return args;
    }

    let subcommands = ["class", "sequence", "model", "help"];

    let mut idx = 1usize;
    while idx < args.len() {
        let a = args[idx].as_str();
        if a == "--" {
            idx += 1;
            break;
        }

        if a == "--config" || a == "--log-level" {
            idx += 2;
            continue;
        }

        if a.starts_with('-') {
            idx += 1;
            continue;
        }

        break;
    }

    if idx < args.len() {
        let token = args[idx].as_str();
        if !subcommands.contains(&token) {
            args.insert(idx, "class".to_string());
        }
    }

    args
}

fn write_output(content: &str, output: Option<&Path>) -> Result<()> {
    if let Some(path) = output {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("failed to create {}", parent.display()))?;
            }
        }
        std::fs::write(path, content)
            .with_context(|| format!("failed to write {}", path.display()))?;
    } else {
        print!("{content}");
        if !content.ends_with('\n') {
            println!();
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn bare_paths_default_to_class_command() {
        let rewritten = rewrite_args_for_implicit_class(args(&["diagramerz", "src/"]));
        assert_eq!(rewritten, args(&["diagramerz", "class", "src/"]));
    }

    #[test]
    fn implicit_class_skips_global_option_values() {
        let rewritten = rewrite_args_for_implicit_class(args(&[
            "diagramerz",
            "--log-level",
            "debug",
            "--config=cfg.toml",
            "Order.java",
        ]));
        assert_eq!(
            rewritten,
            args(&[
                "diagramerz",
                "--log-level",
                "debug",
                "--config=cfg.toml",
                "class",
                "Order.java",
            ])
        );
    }

    #[test]
    fn explicit_subcommand_is_left_alone() {
        let original = args(&["diagramerz", "sequence", "src/", "--class", "A", "--method", "b"]);
        assert_eq!(rewrite_args_for_implicit_class(original.clone()), original);
    }

    #[test]
    fn cli_parses_sequence_options() {
        let cli = Cli::parse_from(args(&[
            "diagramerz",
            "sequence",
            "src/",
            "--class",
            "OrderService",
            "--method",
            "place",
            "--max-depth",
            "3",
        ]));
        match cli.command {
            Commands::Sequence {
                class,
                method,
                max_depth,
                max_entries,
                ..
            } => {
                assert_eq!(class.as_deref(), Some("OrderService"));
                assert_eq!(method.as_deref(), Some("place"));
                assert_eq!(max_depth, Some(3));
                assert_eq!(max_entries, None);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn class_without_method_is_rejected() {
        let parsed = Cli::try_parse_from(args(&["diagramerz", "sequence", "src/", "--class", "A"]));
        assert!(parsed.is_err());
    }
}
