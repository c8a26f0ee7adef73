use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use lagoon_sync::commands::{self, export, import, parse};
use lagoon_sync::engine::SkipExport;
use lagoon_sync::prompt::{self, TerminalConfirmer};
use lagoon_sync::{input, GraphqlClient};

#[derive(Parser)]
#[command(name = "lagoon-sync")]
#[command(about = "Import and export Lagoon groups, users, notifications and projects")]
#[command(version)]
struct Cli {
    /// Path to the config file (default: ~/.lagoon.yml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Lagoon context to use
    #[arg(short, long, global = true)]
    lagoon: Option<String>,

    /// Log requests and responses
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Import a config from a yaml file or stdin
    #[command(visible_alias = "i")]
    Import(ImportArgs),
    /// Parse lagoon output to import yaml
    #[command(visible_alias = "p")]
    Parse(ParseArgs),
    /// Export lagoon output to yaml
    #[command(visible_alias = "e")]
    Export(ExportArgs),
}

#[derive(Args)]
struct ImportArgs {
    /// Path to the file to import
    #[arg(short = 'I', long = "import")]
    file: Option<PathBuf>,

    /// Display example yaml
    #[arg(long)]
    example: bool,

    /// Don't prompt, continue past failures
    #[arg(long)]
    force: bool,

    /// Print the planned operations without applying them
    #[arg(long)]
    dry_run: bool,

    /// Target platform id for projects that don't set one
    #[arg(long)]
    openshift: Option<u64>,
}

#[derive(Args)]
struct ParseArgs {
    /// Path to the file to parse
    #[arg(short = 'I', long = "import")]
    file: Option<PathBuf>,

    /// Write the yaml here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Args)]
struct ExportArgs {
    /// Export a single project
    #[arg(short, long)]
    project: Option<String>,

    /// Skip exporting of users
    #[arg(long)]
    skip_users: bool,

    /// Skip exporting of groups
    #[arg(long)]
    skip_groups: bool,

    /// Skip exporting of notifications
    #[arg(long)]
    skip_notifications: bool,

    /// Skip exporting of slack notifications
    #[arg(long)]
    skip_slack: bool,

    /// Skip exporting of rocketchat notifications
    #[arg(long)]
    skip_rocketchat: bool,

    /// Don't prompt
    #[arg(long)]
    force: bool,

    /// Write the yaml here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,
}

/// Initialize tracing on stderr; stdout carries command output.
fn init_tracing(debug: bool) {
    let default = if debug {
        "lagoon_sync=debug,lagoon_sync_core=debug"
    } else {
        "lagoon_sync=info,lagoon_sync_core=info"
    };
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| default.into()),
    );

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Cancel `token` on the first Ctrl-C.
fn cancel_on_ctrl_c(token: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupt received, stopping after the current operation");
            token.cancel();
        }
    });
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    match cli.command {
        Commands::Import(ref args) => {
            if args.example {
                print!("{}", import::EXAMPLE);
                return Ok(());
            }

            let raw = input::read_stdin_or_file(args.file.as_deref())?;
            let options = import::ImportOptions {
                force: args.force,
                dry_run: args.dry_run,
                interactive: prompt::is_interactive(),
                default_openshift: args.openshift,
            };

            let cancel = CancellationToken::new();
            cancel_on_ctrl_c(cancel.clone());

            let connect = || GraphqlClient::connect(cli.config.as_deref(), cli.lagoon.as_deref());
            match import::run_with(&raw, &options, connect, &TerminalConfirmer, cancel).await? {
                import::ImportOutcome::Planned(plan) => print!("{}", commands::render_plan(&plan)),
                import::ImportOutcome::Declined => println!("Import cancelled."),
                import::ImportOutcome::Applied(result) => {
                    print!("{}", commands::render_apply_result(&result));
                    if !result.failed.is_empty() {
                        anyhow::bail!("{} operation(s) failed", result.failed.len());
                    }
                    if result.cancelled {
                        anyhow::bail!("import interrupted");
                    }
                }
            }
        }
        Commands::Parse(ref args) => {
            let raw = input::read_stdin_or_file(args.file.as_deref())?;
            let yaml = parse::run(&raw)?;
            input::write_output(args.output.as_deref(), &yaml)?;
        }
        Commands::Export(ref args) => {
            let client = GraphqlClient::connect(cli.config.as_deref(), cli.lagoon.as_deref())?;
            let options = export::ExportOptions {
                project: args.project.clone(),
                skip: SkipExport {
                    users: args.skip_users,
                    groups: args.skip_groups,
                    notifications: args.skip_notifications,
                    slack: args.skip_slack,
                    rocketchat: args.skip_rocketchat,
                },
                force: args.force,
                interactive: prompt::is_interactive(),
            };

            match export::run(&options, &client, &TerminalConfirmer).await? {
                Some(yaml) => input::write_output(args.output.as_deref(), &yaml)?,
                None => println!("Export cancelled."),
            }
        }
    }

    Ok(())
}
