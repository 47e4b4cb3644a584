use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::io::Write;
use std::path::PathBuf;

use crate::commands::{self, CommandReport, PathOverrides};

#[derive(Debug, Parser)]
#[command(name = "daily-index")]
#[command(version)]
#[command(about = "Group daily photo posts by timestamp and maintain daily.json")]
struct Cli {
    /// Print the command report as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Scan the data dir, merge with the existing summary and write it (default)
    Build(BuildArgs),
    /// Show resolved paths and summary statistics
    Status(PathArgs),
}

#[derive(Debug, Clone, Default, Args)]
struct PathArgs {
    /// Directory holding the .jpg/.txt post files
    #[arg(long)]
    data_dir: Option<PathBuf>,
    /// Summary document to read and rewrite
    #[arg(long)]
    output: Option<PathBuf>,
}

impl From<PathArgs> for PathOverrides {
    fn from(args: PathArgs) -> Self {
        Self {
            data_dir: args.data_dir,
            output_file: args.output,
        }
    }
}

#[derive(Debug, Clone, Default, Args)]
struct BuildArgs {
    #[command(flatten)]
    paths: PathArgs,
    /// Load, scan and merge without writing anything
    #[arg(long)]
    dry_run: bool,
}

fn print_report(report: &CommandReport, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
    } else {
        print!("{}", report.render_text());
    }
    Ok(())
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Build(BuildArgs::default()));

    let report = match command {
        Command::Build(args) => commands::build::run(&commands::build::BuildOptions {
            paths: args.paths.into(),
            dry_run: args.dry_run,
        })?,
        Command::Status(args) => commands::status::run(&args.into())?,
    };

    print_report(&report, cli.json)?;
    if !report.ok {
        std::io::stdout().flush()?;
        std::process::exit(2);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{Cli, Command};
    use clap::{CommandFactory, Parser};

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn no_subcommand_means_default_build() {
        let cli = Cli::try_parse_from(["daily-index"]).expect("parse");
        assert!(cli.command.is_none());
        assert!(!cli.json);
    }

    #[test]
    fn build_flags_parse() {
        let cli = Cli::try_parse_from([
            "daily-index",
            "build",
            "--data-dir",
            "posts",
            "--output",
            "out.json",
            "--dry-run",
            "--json",
        ])
        .expect("parse");
        let Some(Command::Build(args)) = cli.command else {
            panic!("expected build");
        };
        assert!(args.dry_run);
        assert_eq!(args.paths.data_dir.as_deref(), Some(std::path::Path::new("posts")));
        assert_eq!(args.paths.output.as_deref(), Some(std::path::Path::new("out.json")));
        assert!(cli.json);
    }
}
