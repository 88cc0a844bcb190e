use std::future::Future;

use crate::claim::{Claimer, Outcome};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::notify::{self, Notifier};
use crate::settings::Settings;
use crate::token::{TokenStore, resolve_token};

/// One pass: resolve the token, claim, then persist or alert depending on
/// the outcome. Config and credential problems stop the run before the
/// network is touched.
pub async fn run<N: Notifier>(
    settings: &Settings,
    token_arg: Option<String>,
    notifier: &N,
) -> Result<Outcome> {
    let config = Config::load(&settings.config_file)?;

    let store = TokenStore::new(&settings.token_file);
    let token = resolve_token(token_arg, store.load()?).ok_or(Error::NoCredential)?;

    let claimer = match Claimer::new(&settings.claim) {
        Ok(claimer) => claimer,
        Err(e) => {
            tracing::error!("failed to set up HTTP client: {e}");
            return Ok(Outcome::Unknown);
        }
    };
    let outcome = claimer.claim(&token).await;

    match outcome {
        Outcome::Success | Outcome::AlreadyClaimed => {
            store.save(&token).map_err(|e| match e {
                Error::TokenFile { path, source } => Error::TokenNotSaved {
                    outcome,
                    path,
                    source,
                },
                other => other,
            })?
        }
        Outcome::Unauthorized => notify_operator(&config, notifier).await,
        Outcome::Unknown => {}
    }
    Ok(outcome)
}

/// Races [`run`] against `shutdown`. `None` means the shutdown fired first and
/// the run was dropped; the token file is only written after the response, so
/// it is never left half-written.
pub async fn run_until<N: Notifier>(
    settings: &Settings,
    token_arg: Option<String>,
    notifier: &N,
    shutdown: impl Future<Output = ()>,
) -> Option<Result<Outcome>> {
    tokio::select! {
        biased;
        () = shutdown => None,
        result = run(settings, token_arg, notifier) => Some(result),
    }
}

async fn notify_operator<N: Notifier>(config: &Config, notifier: &N) {
    let Some(email) = config.enabled_email() else {
        tracing::debug!("email notification disabled");
        return;
    };
    if email.to.is_empty() {
        tracing::warn!("email notification enabled but no recipients configured");
        return;
    }

    if let Err(e) = notifier
        .send_notification(&email.to, notify::SUBJECT, notify::BODY, &email.from, &email.server)
        .await
    {
        tracing::error!("failed to notify operator: {e}");
    }
}
