//! CLI 명령 파싱 모듈.

use clap::{Parser, Subcommand};

use crate::domain::lens::Topology;
use crate::domain::review::RunOptions;

#[derive(Debug, Parser)]
#[command(name = "prlens", version)]
#[command(about = "Multi-lens LLM code review for GitHub pull requests")]
#[command(args_conflicts_with_subcommands = true)]
pub struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// owner/repo, owner/repo#N, or https://<host>/owner/repo/pull/N
    target: Option<String>,

    /// PR number when TARGET is owner/repo
    pr_number: Option<u64>,

    /// Print the report to stdout, do not post
    #[arg(long)]
    dry_run: bool,

    /// Print the final issue list as JSON to stdout
    #[arg(long)]
    json: bool,

    /// Review topology: single (one generic lens) or multi (security, performance, style)
    #[arg(long)]
    topology: Option<Topology>,

    /// LLM provider
    #[arg(long, value_parser = ["gemini", "openai", "anthropic"])]
    provider: Option<String>,

    /// Maximum number of concurrent LLM calls
    #[arg(long, value_parser = parse_concurrency)]
    concurrency: Option<usize>,

    /// Suppress progress output
    #[arg(short, long)]
    quiet: bool,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Show effective merged config and where credentials come from
    Config,
}

pub enum CliAction {
    InspectConfig,
    Review { options: RunOptions, quiet: bool },
}

impl Cli {
    pub fn parse_action() -> Result<CliAction, String> {
        Cli::parse().into_action()
    }

    fn into_action(self) -> Result<CliAction, String> {
        match self.command {
            Some(Commands::Config) => Ok(CliAction::InspectConfig),
            None => {
                let Some(target) = self.target else {
                    return Err("missing TARGET (try `prlens owner/repo#123`)".to_string());
                };

                Ok(CliAction::Review {
                    options: RunOptions {
                        target,
                        pr_number: self.pr_number,
                        dry_run: self.dry_run,
                        json: self.json,
                        topology: self.topology,
                        provider: self.provider,
                        concurrency: self.concurrency,
                    },
                    quiet: self.quiet,
                })
            }
        }
    }
}

fn parse_concurrency(raw: &str) -> Result<usize, String> {
    match raw.parse::<usize>() {
        Ok(n) if n >= 1 => Ok(n),
        _ => Err(format!("expected a positive integer, got '{raw}'")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn action(args: &[&str]) -> Result<CliAction, String> {
        Cli::try_parse_from(args)
            .map_err(|e| e.to_string())?
            .into_action()
    }

    #[test]
    fn review_flags_map_to_run_options() {
        let Ok(CliAction::Review { options, quiet }) = action(&[
            "prlens",
            "octo/demo",
            "7",
            "--dry-run",
            "--topology",
            "multi",
            "--provider",
            "openai",
            "--concurrency",
            "2",
        ]) else {
            panic!("expected review action");
        };

        assert_eq!(options.target, "octo/demo");
        assert_eq!(options.pr_number, Some(7));
        assert!(options.dry_run);
        assert!(!options.json);
        assert_eq!(options.topology, Some(Topology::Multi));
        assert_eq!(options.provider.as_deref(), Some("openai"));
        assert_eq!(options.concurrency, Some(2));
        assert!(!quiet);
    }

    #[test]
    fn config_subcommand() {
        assert!(matches!(action(&["prlens", "config"]), Ok(CliAction::InspectConfig)));
    }

    #[test]
    fn missing_target_is_usage_error() {
        assert!(action(&["prlens"]).is_err());
    }

    #[test]
    fn rejects_zero_concurrency_and_unknown_provider() {
        assert!(action(&["prlens", "o/r#1", "--concurrency", "0"]).is_err());
        assert!(action(&["prlens", "o/r#1", "--provider", "llama"]).is_err());
        assert!(action(&["prlens", "o/r#1", "--topology", "tree"]).is_err());
    }
}
