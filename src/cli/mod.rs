//! CLI module for Tekst.

pub mod commands;
mod output;
pub mod preflight;

pub use output::Output;

use clap::{Parser, Subcommand};

/// Tekst - YouTube transcripts for AI assistants
///
/// Runs an MCP server that fetches video metadata and transcripts, or does a
/// one-shot fetch from the command line.
#[derive(Parser, Debug)]
#[command(name = "tekst")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true, env = "TEKST_CONFIG")]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start MCP server for AI assistant integration (Claude, etc.)
    Mcp,

    /// Fetch the transcript of a video
    Transcript {
        /// YouTube URL or 11-character video ID
        input: String,

        /// Include timestamps (same as --format json)
        #[arg(long)]
        timed: bool,

        /// Output format (text, json, srt, vtt)
        #[arg(short, long, default_value = "text")]
        format: String,

        /// Output file (stdout if not specified)
        #[arg(short, long)]
        output: Option<String>,

        /// Language code
        #[arg(long, default_value = "en")]
        lang: String,
    },

    /// Show video metadata
    Info {
        /// YouTube URL or 11-character video ID
        input: String,

        /// Print the raw JSON payload
        #[arg(long)]
        json: bool,
    },

    /// Check system requirements and configuration
    Doctor,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,

    /// Write a configuration file with default values
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_transcript_command() {
        let cli = Cli::parse_from(["tekst", "-vv", "transcript", "jNQXAC9IVRw", "--format", "srt"]);
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Transcript { input, timed, format, output, lang } => {
                assert_eq!(input, "jNQXAC9IVRw");
                assert!(!timed);
                assert_eq!(format, "srt");
                assert!(output.is_none());
                assert_eq!(lang, "en");
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_config_init() {
        let cli = Cli::parse_from(["tekst", "config", "init", "--force"]);
        assert!(matches!(
            cli.command,
            Commands::Config { action: ConfigAction::Init { force: true } }
        ));
    }
}
