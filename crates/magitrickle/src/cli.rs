//! Clap derive structures for the `magitrickle` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.
//! Also compiled by `build.rs` for man pages, so it depends on clap only.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// magitrickle -- administer the MagiTrickle routing daemon
#[derive(Debug, Parser)]
#[command(
    name = "magitrickle",
    version,
    about = "Manage MagiTrickle groups, rules and system hooks",
    long_about = "Command-line client for the MagiTrickle daemon.\n\n\
        Talks HTTP/1.1 to the daemon over its local Unix socket. Changes apply to\n\
        the daemon's in-memory state unless --save is given or `system save-config`\n\
        is run.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Daemon socket path [default: /var/run/magitrickle.sock]
    #[arg(long, env = "MAGITRICKLE_SOCKET", global = true, value_name = "PATH")]
    pub socket: Option<PathBuf>,

    /// Request timeout in seconds [default: 10]
    #[arg(
        long,
        env = "MAGITRICKLE_TIMEOUT",
        global = true,
        value_name = "SECS",
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub timeout: Option<u64>,

    /// Output format [default: table]
    #[arg(long, short = 'o', env = "MAGITRICKLE_OUTPUT", global = true)]
    pub output: Option<OutputFormat>,

    /// When to use color output [default: auto]
    #[arg(long = "color-mode", global = true, value_name = "WHEN")]
    pub color_mode: Option<ColorMode>,

    /// Client config file
    #[arg(long, env = "MAGITRICKLE_CONFIG", global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Manage routing groups
    #[command(alias = "groups", alias = "g")]
    Group(GroupArgs),

    /// Manage the rules of a group
    #[command(alias = "rules", alias = "r")]
    Rule(RuleArgs),

    /// Daemon system operations
    #[command(alias = "sys")]
    System(SystemArgs),

    /// Inspect client configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  GROUPS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct GroupArgs {
    #[command(subcommand)]
    pub command: GroupCommand,
}

#[derive(Debug, Subcommand)]
pub enum GroupCommand {
    /// List all groups
    #[command(alias = "ls")]
    List {
        /// Include each group's rules
        #[arg(long)]
        with_rules: bool,
    },

    /// Create a group
    #[command(alias = "add")]
    Create {
        /// Group name
        #[arg(long, default_value = "NewGroup")]
        name: String,

        /// Outgoing interface
        #[arg(long, default_value = "br0")]
        interface: String,

        /// Whether the group is active
        #[arg(
            long,
            default_value = "true",
            num_args = 0..=1,
            default_missing_value = "true",
            action = clap::ArgAction::Set
        )]
        enable: bool,

        /// Display color
        #[arg(long, default_value = "#ffffff")]
        color: String,

        /// Persist the daemon configuration after the change
        #[arg(long)]
        save: bool,
    },

    /// Replace every field of a group
    #[command(alias = "edit")]
    Update {
        /// Group ID
        group_id: String,

        /// Group name
        #[arg(long, default_value = "")]
        name: String,

        /// Outgoing interface
        #[arg(long, default_value = "")]
        interface: String,

        /// Whether the group is active
        #[arg(
            long,
            default_value = "true",
            num_args = 0..=1,
            default_missing_value = "true",
            action = clap::ArgAction::Set
        )]
        enable: bool,

        /// Display color
        #[arg(long, default_value = "")]
        color: String,

        /// Persist the daemon configuration after the change
        #[arg(long)]
        save: bool,
    },

    /// Delete a group and its rules
    #[command(alias = "rm")]
    Delete {
        /// Group ID
        group_id: String,

        /// Persist the daemon configuration after the change
        #[arg(long)]
        save: bool,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  RULES
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct RuleArgs {
    #[command(subcommand)]
    pub command: RuleCommand,
}

#[derive(Debug, Subcommand)]
pub enum RuleCommand {
    /// List the rules of a group
    #[command(alias = "ls")]
    List {
        /// Group ID
        group_id: String,
    },

    /// Replace a group's whole rule set from a JSON file
    Replace {
        /// Group ID
        group_id: String,

        /// JSON file: an array of rules, or {"rules": [...]}
        #[arg(long, short = 'f', value_name = "PATH")]
        file: PathBuf,

        /// Persist the daemon configuration after the change
        #[arg(long)]
        save: bool,
    },

    /// Add a rule to a group
    #[command(alias = "add")]
    Create {
        /// Group ID
        group_id: String,

        /// Rule name
        #[arg(long, default_value = "")]
        name: String,

        /// Matcher type (domain, namespace, wildcard, regex, subnet, ...)
        #[arg(long = "type", default_value = "domain", value_name = "TYPE")]
        rule_type: String,

        /// Matcher expression
        #[arg(long, default_value = "")]
        rule: String,

        /// Whether the rule is active
        #[arg(
            long,
            default_value = "true",
            num_args = 0..=1,
            default_missing_value = "true",
            action = clap::ArgAction::Set
        )]
        enable: bool,

        /// Persist the daemon configuration after the change
        #[arg(long)]
        save: bool,
    },

    /// Show one rule
    Get {
        /// Group ID
        group_id: String,

        /// Rule ID
        rule_id: String,
    },

    /// Replace every field of a rule
    #[command(alias = "edit")]
    Update {
        /// Group ID
        group_id: String,

        /// Rule ID
        rule_id: String,

        /// Rule name
        #[arg(long, default_value = "")]
        name: String,

        /// Matcher type
        #[arg(long = "type", default_value = "", value_name = "TYPE")]
        rule_type: String,

        /// Matcher expression
        #[arg(long, default_value = "")]
        rule: String,

        /// Whether the rule is active
        #[arg(
            long,
            default_value = "true",
            num_args = 0..=1,
            default_missing_value = "true",
            action = clap::ArgAction::Set
        )]
        enable: bool,

        /// Persist the daemon configuration after the change
        #[arg(long)]
        save: bool,
    },

    /// Delete a rule
    #[command(alias = "rm")]
    Delete {
        /// Group ID
        group_id: String,

        /// Rule ID
        rule_id: String,

        /// Persist the daemon configuration after the change
        #[arg(long)]
        save: bool,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  SYSTEM
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct SystemArgs {
    #[command(subcommand)]
    pub command: SystemCommand,
}

#[derive(Debug, Subcommand)]
pub enum SystemCommand {
    /// Run the netfilterd hook so the daemon re-applies its rules
    Netfilterd {
        /// Hook type
        #[arg(long = "type", default_value = "filter", value_name = "TYPE")]
        hook_type: String,

        /// Netfilter table
        #[arg(long, default_value = "filter")]
        table: String,
    },

    /// List network interfaces known to the daemon
    #[command(alias = "ifaces")]
    Interfaces,

    /// Persist the daemon's current configuration
    SaveConfig,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CONFIG
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Display the resolved client settings
    Show,

    /// Print the config file location
    Path,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  COMPLETIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}

#[cfg(test)]
mod tests {
    use clap::{CommandFactory, Parser};

    use super::*;

    #[test]
    fn cli_debug_assert() {
        Cli::command().debug_assert();
    }

    #[test]
    fn group_color_and_color_mode_are_distinct() {
        let cli = Cli::try_parse_from([
            "magitrickle",
            "--color-mode",
            "never",
            "group",
            "create",
            "--name",
            "MyGroup",
            "--color",
            "#ffffff",
        ])
        .expect("parse");
        assert_eq!(cli.global.color_mode, Some(ColorMode::Never));
        match cli.command {
            Command::Group(GroupArgs {
                command: GroupCommand::Create { name, color, .. },
            }) => {
                assert_eq!(name, "MyGroup");
                assert_eq!(color, "#ffffff");
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
