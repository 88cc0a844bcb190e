mod app;
mod claim;
mod config;
mod error;
mod notify;
mod settings;
mod token;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::error::Error;
use crate::notify::SmtpNotifier;
use crate::settings::Settings;

const USAGE: &str = "<<<AutoChronoGG>>>
Usage: autochrono <Cookie>
Please insert your cookie. Press CTRL+SHIFT+J on the website (CTRL+SHIFT+K on Firefox) and type document.cookie. Then paste the whole string as an argument.
You only need to do this once because AutoChronoGG will remember your cookie (if valid).";

/// Claims the daily chrono.gg coin.
#[derive(Parser, Debug)]
#[command(version)]
struct Cli {
    /// Cookie string copied from the browser. Stored for later runs once the
    /// server accepts it.
    token: Option<String>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();
    let settings = Settings::from_env();
    init_tracing(settings.debug)?;

    match app::run_until(&settings, cli.token, &SmtpNotifier, interrupted()).await {
        Some(result) => println!("{}", report(result)),
        None => println!("Interrupted."),
    }
    Ok(())
}

async fn interrupted() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("cannot listen for Ctrl-C: {e}");
        std::future::pending::<()>().await;
    }
}

fn init_tracing(debug: bool) -> anyhow::Result<()> {
    let default_level = if debug { "autochrono=debug,info" } else { "autochrono=info,warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to install log subscriber: {e}"))
}

fn report(result: error::Result<claim::Outcome>) -> String {
    match result {
        Ok(outcome) => outcome.to_string(),
        Err(Error::NoCredential) => USAGE.to_string(),
        Err(Error::TokenNotSaved {
            outcome,
            path,
            source,
        }) => {
            tracing::error!("failed to write {}: {source}", path.display());
            format!("{outcome}\nThe cookie could not be saved; pass it as an argument again next time.")
        }
        Err(e) => {
            tracing::error!("{e}");
            "Terminating...".to_string()
        }
    }
}
