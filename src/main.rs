// Entrypoint for the CLI application.
// - Keeps `main` small: build the API client and the command table, then
//   hand stdin/stdout to the prompt loop.
// - Logs go to stderr and are filtered by `RUST_LOG` (default: warn).

use std::io;

use anyhow::Context;
use ghstats_cli::api::ApiClient;
use ghstats_cli::commands::CommandRegistry;
use ghstats_cli::config::ClientConfig;
use ghstats_cli::session::Session;
use ghstats_cli::ui;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let env_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .with_target(false)
        .compact()
        .init();
}

fn main() -> anyhow::Result<()> {
    init_tracing();

    let api = ApiClient::new(ClientConfig::default())?;
    let registry = CommandRegistry::with_builtins();
    let mut session = Session::new();

    // Blocks until `exit` or end of input.
    ui::run(&registry, &api, &mut session, io::stdin().lock(), io::stdout())
        .context("Failed to read from standard input")?;
    Ok(())
}
