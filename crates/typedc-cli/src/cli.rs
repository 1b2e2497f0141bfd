use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use typedc_gate::RunConfig;

#[derive(Parser)]
#[command(
    name = "typedc",
    about = "TypeScript definitions compare: fail the build on breaking API changes",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Print every compatible change and suppressed issue
    #[arg(long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Compare two TypeDoc JSON files and report breaking changes
    Check(CheckArgs),
    /// Print every qualified path in a TypeDoc JSON file
    Flatten(FlattenArgs),
}

#[derive(Args, Default)]
pub struct CheckArgs {
    /// JSON config file; command-line options take priority
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// TypeDoc JSON generated from the previous release
    #[arg(short, long)]
    pub previous: Option<PathBuf>,
    /// TypeDoc JSON generated from the current sources
    #[arg(short, long)]
    pub next: Option<PathBuf>,
    /// Write the human-readable report here instead of the console
    #[arg(short, long)]
    pub out: Option<PathBuf>,
    /// Write the issues as a JSON array, usable as an ignore file
    #[arg(short, long)]
    pub flat_out: Option<PathBuf>,
    /// JSON ignore rules
    #[arg(short, long)]
    pub ignore: Option<PathBuf>,
    /// Source folder prefixed to declaration locations in the report
    #[arg(short, long)]
    pub map_source_dir: Option<String>,
    /// Leave the root node's name out of every path
    #[arg(long)]
    pub exclude_root_node: bool,
}

impl CheckArgs {
    /// The options given on the command line, as a config layer.
    pub fn to_overrides(&self, verbose: bool) -> RunConfig {
        RunConfig {
            previous: self.previous.clone(),
            next: self.next.clone(),
            out: self.out.clone(),
            flat_out: self.flat_out.clone(),
            ignore: self.ignore.clone(),
            map_source_dir: self.map_source_dir.clone(),
            exclude_root_node: self.exclude_root_node,
            verbose,
        }
    }
}

#[derive(Args)]
pub struct FlattenArgs {
    pub file: PathBuf,
    #[arg(long)]
    pub exclude_root_node: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_check() {
        let cli = Cli::try_parse_from(["typedc", "check", "-p", "old.json", "-n", "new.json"]).unwrap();
        if let Command::Check(args) = cli.command {
            assert_eq!(args.previous, Some(PathBuf::from("old.json")));
            assert_eq!(args.next, Some(PathBuf::from("new.json")));
            assert!(!args.exclude_root_node);
        } else { panic!("wrong command"); }
        assert_eq!(cli.format, OutputFormat::Text);
    }

    #[test]
    fn parse_check_all_options() {
        let cli = Cli::try_parse_from([
            "typedc", "check", "-c", "typedc.json", "-o", "report.txt", "-f", "issues.json",
            "-i", "ignore.json", "-m", "src/", "--exclude-root-node", "--verbose",
        ]).unwrap();
        assert!(cli.verbose);
        if let Command::Check(args) = cli.command {
            assert_eq!(args.config, Some(PathBuf::from("typedc.json")));
            assert_eq!(args.out, Some(PathBuf::from("report.txt")));
            assert_eq!(args.flat_out, Some(PathBuf::from("issues.json")));
            assert_eq!(args.ignore, Some(PathBuf::from("ignore.json")));
            assert_eq!(args.map_source_dir, Some("src/".into()));
            assert!(args.exclude_root_node);
        } else { panic!("wrong command"); }
    }

    #[test]
    fn parse_long_flags() {
        let cli = Cli::try_parse_from([
            "typedc", "check", "--previous", "a.json", "--next", "b.json",
            "--flat-out", "f.json", "--map-source-dir", "lib",
        ]).unwrap();
        if let Command::Check(args) = cli.command {
            assert_eq!(args.flat_out, Some(PathBuf::from("f.json")));
            assert_eq!(args.map_source_dir, Some("lib".into()));
        } else { panic!("wrong command"); }
    }

    #[test]
    fn parse_json_format() {
        let cli = Cli::try_parse_from(["typedc", "--format", "json", "check"]).unwrap();
        assert_eq!(cli.format, OutputFormat::Json);
    }

    #[test]
    fn parse_flatten() {
        let cli = Cli::try_parse_from(["typedc", "flatten", "api.json", "--exclude-root-node"]).unwrap();
        if let Command::Flatten(args) = cli.command {
            assert_eq!(args.file, PathBuf::from("api.json"));
            assert!(args.exclude_root_node);
        } else { panic!("wrong command"); }
    }

    #[test]
    fn flatten_requires_file() {
        assert!(Cli::try_parse_from(["typedc", "flatten"]).is_err());
    }

    #[test]
    fn overrides_carry_cli_values() {
        let args = CheckArgs {
            next: Some("b.json".into()),
            exclude_root_node: true,
            ..Default::default()
        };
        let config = args.to_overrides(true);
        assert_eq!(config.next, Some(PathBuf::from("b.json")));
        assert!(config.previous.is_none());
        assert!(config.exclude_root_node);
        assert!(config.verbose);
    }
}
