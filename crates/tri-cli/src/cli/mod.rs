use clap::Parser;
use std::path::PathBuf;

pub mod global;
pub mod root_commands;

pub use global::{GlobalFlags, OutputFormat};
pub use root_commands::Commands;

/// Top-level CLI parser for the `tri` binary.
#[derive(Debug, Parser)]
#[command(name = "tri", version, about = "Ask questions about triathlon results in plain language")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format: json, table, raw
    #[arg(short, long, global = true, default_value = "table")]
    pub format: OutputFormat,

    /// Quiet mode (errors only)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose mode (debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Extra configuration file, layered above .tri/config.toml
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

impl Cli {
    /// Extract ergonomic global flags struct for command handlers.
    #[must_use]
    pub fn global_flags(&self) -> GlobalFlags {
        GlobalFlags {
            format: self.format,
            quiet: self.quiet,
            verbose: self.verbose,
            config: self.config.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::{CommandFactory, Parser};
    use pretty_assertions::assert_eq;
    use std::path::PathBuf;
    use tri_core::enums::VoteType;

    use super::{Cli, Commands, OutputFormat};

    #[test]
    fn clap_command_tree_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_flags_parse_before_subcommand() {
        let cli = Cli::try_parse_from(["tri", "--format", "json", "--verbose", "catalog"])
            .expect("cli should parse");

        assert_eq!(cli.format, OutputFormat::Json);
        assert!(cli.verbose);
        assert!(matches!(cli.command, Commands::Catalog(_)));
    }

    #[test]
    fn global_flags_parse_after_subcommand() {
        let cli = Cli::try_parse_from(["tri", "config", "--format", "raw", "--quiet"])
            .expect("cli should parse");

        assert_eq!(cli.format, OutputFormat::Raw);
        assert!(cli.quiet);
        assert!(matches!(cli.command, Commands::Config));
    }

    #[test]
    fn output_format_rejects_invalid_value() {
        let parsed = Cli::try_parse_from(["tri", "--format", "xml", "config"]);
        assert!(parsed.is_err());
    }

    #[test]
    fn ask_collects_filters_and_session() {
        let cli = Cli::try_parse_from([
            "tri",
            "ask",
            "Who won Kona?",
            "--gender",
            "women",
            "--distance",
            "Iron (140.6 miles)",
            "--session",
            "chat.json",
            "--follow-up",
        ])
        .expect("cli should parse");

        let Commands::Ask(args) = cli.command else {
            panic!("expected ask");
        };
        assert_eq!(args.question, "Who won Kona?");
        assert_eq!(args.session, Some(PathBuf::from("chat.json")));
        assert!(args.follow_up);
        let filters = args.filters();
        assert_eq!(filters.gender.as_deref(), Some("women"));
        assert_eq!(filters.distance.as_deref(), Some("Iron (140.6 miles)"));
        assert_eq!(filters.athlete, None);
    }

    #[test]
    fn vote_parses_direction() {
        let cli = Cli::try_parse_from(["tri", "vote", "UP", "--session", "chat.json"])
            .expect("cli should parse");
        let Commands::Vote(args) = cli.command else {
            panic!("expected vote");
        };
        assert_eq!(args.vote, VoteType::Up);
        assert!(Cli::try_parse_from(["tri", "vote", "sideways", "--session", "c.json"]).is_err());
    }

    #[test]
    fn explicit_config_path_is_global() {
        let cli = Cli::try_parse_from(["tri", "check-sql", "SELECT 1", "--config", "alt.toml"])
            .expect("cli should parse");
        assert_eq!(cli.global_flags().config, Some(PathBuf::from("alt.toml")));
    }
}
