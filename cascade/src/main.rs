mod commands;
mod formatting;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::Level;

#[derive(Parser)]
#[command(name = "cascade")]
#[command(about = "Publish interdependent workspace packages in dependency order")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(long = "verbose", action = clap::ArgAction::Count)]
    verbose: u8,

    #[arg(short, long, action)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Mark the current directory as the workspace root.
    Init,
    /// Publish packages and every package that depends on them.
    Publish {
        /// Package names or directory names; defaults to the current package.
        packages: Vec<String>,
        /// New version, or one of major, minor, patch.
        #[arg(short = 'v', long = "version", value_name = "LEVEL_OR_VERSION")]
        target: Option<String>,
    },
    /// Republish packages whose workspace dependency requirements are outdated.
    Sync,
    /// Print the tool's version.
    Version,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.quiet {
        Level::ERROR
    } else {
        match cli.verbose {
            0 => Level::INFO,
            1 => Level::DEBUG,
            _ => Level::TRACE,
        }
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(false)
        .init();

    match cli.command {
        Commands::Init => commands::cmd_init()?,
        Commands::Publish { packages, target } => commands::cmd_publish(packages, target)?,
        Commands::Sync => commands::cmd_sync()?,
        Commands::Version => commands::cmd_version(),
    }

    Ok(())
}
