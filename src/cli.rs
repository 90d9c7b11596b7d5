use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "wildsync")]
#[command(author = "Alberto Cavalcante")]
#[command(version)]
#[command(about = "Declarative configuration sync for WildFly/JBoss servers", long_about = None)]
pub struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Converge a server to a declared configuration document
    Apply(ApplyArgs),

    /// Parse a configuration document and report its sections
    Validate {
        /// Configuration document (YAML or JSON)
        file: PathBuf,
    },
}

#[derive(Args)]
pub struct ApplyArgs {
    /// Configuration document (YAML or JSON)
    pub file: PathBuf,

    /// Management CLI launcher to shell out to
    #[arg(long, default_value = "jboss-cli.sh", env = "WILDSYNC_CLI_COMMAND")]
    pub cli_command: String,

    /// Controller address (host:port)
    #[arg(long, env = "WILDSYNC_CONTROLLER")]
    pub controller: Option<String>,

    /// Management user
    #[arg(long, env = "WILDSYNC_USER")]
    pub user: Option<String>,

    /// Management password
    #[arg(long, env = "WILDSYNC_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Launcher connection timeout in milliseconds
    #[arg(long, env = "WILDSYNC_TIMEOUT")]
    pub timeout: Option<u64>,

    /// Connection attempts before giving up
    #[arg(long, default_value_t = 4)]
    pub retry_attempts: u32,
}
