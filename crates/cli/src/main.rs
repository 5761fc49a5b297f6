use anyhow::Result;
use clap::{Parser, Subcommand};
use sls_go_build::commands::{build_command, package_command, plan_command, test_command};
use tracing_subscriber::EnvFilter;

/// Build, test and package Go functions of a serverless service.
///
/// This CLI is a thin wrapper around `gobuild-core` (exposed in code as
/// `gobuild_core`); it loads the service file and maps results to exit codes.
#[derive(Parser, Debug)]
#[command(
    name = "sls-go-build",
    version,
    about = "Go build support for serverless services",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate entry points, compile the Go functions and pack the binaries.
    Build {
        /// Service root directory. Defaults to the current working directory.
        #[arg(long, default_value = ".")]
        root: String,

        /// Service file relative to the root. Defaults to serverless.yml / serverless.yaml.
        #[arg(long)]
        config: Option<String>,

        /// Build a single function by name.
        #[arg(short, long)]
        function: Option<String>,

        /// Reserved; the AWS target prefix is applied regardless.
        #[arg(short, long, default_value_t = false)]
        local: bool,
    },

    /// Run the configured test plugins and Go tests.
    Test {
        /// Service root directory. Defaults to the current working directory.
        #[arg(long, default_value = ".")]
        root: String,

        /// Service file relative to the root.
        #[arg(long)]
        config: Option<String>,
    },

    /// Write the service description with handlers pointing at built binaries.
    Package {
        /// Service root directory. Defaults to the current working directory.
        #[arg(long, default_value = ".")]
        root: String,

        /// Service file relative to the root.
        #[arg(long)]
        config: Option<String>,

        /// Rewrite a single function by name.
        #[arg(short, long)]
        function: Option<String>,

        /// Write the rewritten YAML here instead of stdout.
        #[arg(long)]
        output: Option<String>,
    },

    /// Show what `build` would run, without running anything.
    Plan {
        /// Service root directory. Defaults to the current working directory.
        #[arg(long, default_value = ".")]
        root: String,

        /// Service file relative to the root.
        #[arg(long)]
        config: Option<String>,

        /// Plan a single function by name.
        #[arg(short, long)]
        function: Option<String>,

        /// Emit JSON instead of human-readable text.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Command::Build { root, config, function, local } => {
            build_command(&root, config.as_deref(), function.as_deref(), local)?
        }
        Command::Test { root, config } => test_command(&root, config.as_deref())?,
        Command::Package { root, config, function, output } => {
            package_command(&root, config.as_deref(), function.as_deref(), output.as_deref())?
        }
        Command::Plan { root, config, function, json } => {
            plan_command(&root, config.as_deref(), function.as_deref(), json)?
        }
    }

    Ok(())
}
