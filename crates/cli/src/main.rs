mod commands;
mod serve;

use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use salonbook_access::AccessConfig;

/// Output format for CLI responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    Text,
    Json,
}

/// Salonbook user-state toolkit.
#[derive(Parser)]
#[command(
    name = "salonbook",
    version,
    about = "Salonbook user-state resolution toolkit"
)]
struct Cli {
    /// Output format (text or json)
    #[arg(long, global = true, default_value = "text", value_enum)]
    output: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, global = true)]
    quiet: bool,

    /// Access config TOML (cache, http, store sections)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify a user from facts given on the command line
    Classify {
        /// User id; omit to classify a signed-out visitor
        #[arg(long)]
        user: Option<String>,
        /// The user passes the admin check
        #[arg(long)]
        admin: bool,
        /// Profile role tag (customer, owner, both, admin, ...); omit for no profile
        #[arg(long)]
        user_type: Option<String>,
        /// Number of businesses the user owns
        #[arg(long, default_value = "0")]
        businesses: u32,
    },

    /// Resolve a user's state through a lookup backend
    Resolve {
        /// User id to resolve
        user: String,
        /// Platform API base URL (uses the HTTP lookup)
        #[arg(long, conflicts_with = "fixtures")]
        base_url: Option<String>,
        /// Bearer token for the platform API
        #[arg(long)]
        token: Option<String>,
        /// Store fixture JSON (uses the direct-store lookup)
        #[arg(long)]
        fixtures: Option<PathBuf>,
        /// Also report the guard decision for this route
        #[arg(long)]
        path: Option<String>,
    },

    /// Print the banner message for a redirect reason code
    Message {
        /// Reason code (e.g. owner_no_business)
        reason: String,
    },

    /// Start the lookup API server over a fixture-seeded store
    Serve {
        /// Port to listen on
        #[arg(long, default_value = "8080")]
        port: u16,
        /// Store fixture JSON to pre-load
        #[arg(long)]
        fixtures: Option<PathBuf>,
    },
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.quiet);

    let config = load_config(cli.config.as_deref(), cli.output, cli.quiet);

    match cli.command {
        Commands::Classify {
            user,
            admin,
            user_type,
            businesses,
        } => {
            commands::classify::cmd_classify(
                commands::classify::ClassifyArgs {
                    user: user.as_deref(),
                    admin,
                    user_type: user_type.as_deref(),
                    businesses,
                },
                cli.output,
                cli.quiet,
            );
        }
        Commands::Resolve {
            user,
            base_url,
            token,
            fixtures,
            path,
        } => {
            commands::resolve::cmd_resolve(
                commands::resolve::ResolveArgs {
                    user: &user,
                    base_url: base_url.as_deref(),
                    token: token.as_deref(),
                    fixtures: fixtures.as_deref(),
                    path: path.as_deref(),
                },
                &config,
                cli.output,
                cli.quiet,
            );
        }
        Commands::Message { reason } => {
            commands::message::cmd_message(&reason, cli.output, cli.quiet);
        }
        Commands::Serve { port, fixtures } => {
            let fixtures = fixtures.or_else(|| config.store.fixtures.clone());
            let rt = runtime(cli.output, cli.quiet);
            if let Err(e) = rt.block_on(serve::start_server(port, fixtures)) {
                report_error(&format!("server error: {}", e), cli.output, cli.quiet);
                process::exit(1);
            }
        }
    }
}

/// Log to stderr, filtered by `RUST_LOG` (default: warnings only).
fn init_tracing(quiet: bool) {
    let default_filter = if quiet { "error" } else { "warn" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();
}

fn load_config(path: Option<&Path>, output: OutputFormat, quiet: bool) -> AccessConfig {
    match path {
        None => AccessConfig::default(),
        Some(p) => match AccessConfig::load(p) {
            Ok(config) => config,
            Err(e) => {
                report_error(&format!("error: {}", e), output, quiet);
                process::exit(1);
            }
        },
    }
}

pub(crate) fn runtime(output: OutputFormat, quiet: bool) -> tokio::runtime::Runtime {
    match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            report_error(
                &format!("error: failed to create tokio runtime: {}", e),
                output,
                quiet,
            );
            process::exit(1);
        }
    }
}

pub(crate) fn report_error(msg: &str, output: OutputFormat, quiet: bool) {
    if quiet {
        return;
    }
    match output {
        OutputFormat::Text => eprintln!("{}", msg),
        OutputFormat::Json => {
            eprintln!("{}", serde_json::json!({ "error": msg }));
        }
    }
}
