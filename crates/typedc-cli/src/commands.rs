use std::path::Path;

use anyhow::Context;
use colored::Colorize;
use serde_json::json;
use typedc_diff::flatten;
use typedc_gate::{CompatibilityGate, GateOutcome, IgnoreRuleSet, RunConfig};
use typedc_types::{load_declarations, DeclarationNode};

use crate::cli::*;
use crate::report::{write_flat_out, Reporter};

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Check(args) => cmd_check(args, cli.verbose, cli.format),
        Command::Flatten(args) => cmd_flatten(args, cli.format),
    }
}

fn load_tree(path: &Path) -> anyhow::Result<DeclarationNode> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    load_declarations(&json).with_context(|| format!("failed to load {}", path.display()))
}

fn resolve_config(args: &CheckArgs, verbose: bool) -> anyhow::Result<RunConfig> {
    let file = match &args.config {
        Some(path) => RunConfig::load(path)?,
        None => RunConfig::default(),
    };
    Ok(file.merge(args.to_overrides(verbose)))
}

/// Run the full comparison described by `config`.
fn run_check(config: &RunConfig, format: OutputFormat) -> anyhow::Result<GateOutcome> {
    let (Some(previous), Some(next)) = (&config.previous, &config.next) else {
        anyhow::bail!("both --previous and --next are required (on the command line or in the config file)");
    };

    let old = load_tree(previous)?;
    let new = load_tree(next)?;
    let rules = match &config.ignore {
        Some(path) => IgnoreRuleSet::load(path)?,
        None => IgnoreRuleSet::default(),
    };

    let mut reporter = Reporter::new(
        config.out.as_deref(),
        config.map_source_dir.clone(),
        config.verbose,
    )?
    .quiet(format == OutputFormat::Json);

    let gate = CompatibilityGate::new(rules).exclude_root_node(config.exclude_root_node);
    let outcome = gate.evaluate(&old, &new, &mut reporter);
    let issues = reporter.finish()?;

    if let Some(path) = &config.flat_out {
        write_flat_out(path, &issues)?;
    }

    match format {
        OutputFormat::Json => {
            let doc = json!({
                "passed": outcome.is_pass(),
                "verdict": outcome.verdict.to_string(),
                "oldNodes": outcome.summary.old_nodes,
                "newNodes": outcome.summary.new_nodes,
                "breaking": outcome.summary.breaking,
                "added": outcome.summary.added,
                "nonBreaking": outcome.summary.non_breaking,
                "suppressed": outcome.summary.suppressed,
                "unusedRules": outcome.unused_rules,
                "issues": issues,
            });
            println!("{}", serde_json::to_string_pretty(&doc)?);
        }
        OutputFormat::Text => {
            let s = &outcome.summary;
            let mark = if outcome.is_pass() { "✓".green().bold() } else { "✗".red().bold() };
            println!(
                "{} {} breaking, {} added, {} suppressed ({} declarations checked in {:.1?})",
                mark,
                s.breaking.to_string().bold(),
                s.added,
                s.suppressed,
                s.old_nodes,
                outcome.elapsed,
            );
            for rule in &outcome.unused_rules {
                println!("  {} unused ignore rule {}", "!".yellow(), rule.path.yellow());
            }
        }
    }

    Ok(outcome)
}

fn cmd_check(args: CheckArgs, verbose: bool, format: OutputFormat) -> anyhow::Result<()> {
    let config = resolve_config(&args, verbose)?;
    let outcome = run_check(&config, format)?;
    if !outcome.is_pass() {
        anyhow::bail!("{}", outcome.verdict);
    }
    Ok(())
}

fn cmd_flatten(args: FlattenArgs, format: OutputFormat) -> anyhow::Result<()> {
    let tree = load_tree(&args.file)?;
    let root_name = args.exclude_root_node.then_some("");
    let flat = flatten(&tree, root_name);

    match format {
        OutputFormat::Json => {
            let entries: Vec<_> = flat
                .iter()
                .skip(1)
                .map(|n| json!({ "path": n.path, "kind": n.node.kind }))
                .collect();
            println!("{}", serde_json::to_string_pretty(&entries)?);
        }
        OutputFormat::Text => {
            for n in flat.iter().skip(1) {
                println!("{}  {}", n.path, n.node.kind.label().dimmed());
            }
        }
    }
    Ok(())
}
