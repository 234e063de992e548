use std::sync::Arc;
use std::time::Duration;

use tessera::application_impl::{RealRotationService, RotationConfig};
use tessera::application_port::RotationService;
use tessera::domain_model::OwnerId;
use tessera::domain_port::SessionStore;
use tessera::infra_memory::{
    InMemoryCredentialStore, InMemoryRevocationRegistry, InMemorySessionStore, OsRngSecretSource,
    SessionConfig, SystemClock,
};
use tessera::logger::*;
use tessera::reaper::Reaper;
use tessera::settings::*;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let logger = Logger::new_bootstrap();

    let project_settings = parse_settings(cli.settings.as_deref())?;
    info!(?project_settings);
    let filter = cli
        .log_filter
        .clone()
        .unwrap_or_else(|| project_settings.log.filter.clone());
    logger.reload_from_config(&LogConfig { filter })?;

    let clock = Arc::new(SystemClock);
    let secrets = Arc::new(OsRngSecretSource);
    let credentials = Arc::new(InMemoryCredentialStore::new());
    let revocations = Arc::new(InMemoryRevocationRegistry::new());
    let sessions = Arc::new(InMemorySessionStore::new(
        secrets.clone(),
        clock.clone(),
        SessionConfig {
            idle_timeout: Duration::from_secs(project_settings.session.idle_timeout_secs),
            max_lifetime: project_settings
                .session
                .max_lifetime_secs
                .map(Duration::from_secs),
        },
    ));

    let reaper = Reaper::new(
        Duration::from_secs(project_settings.reaper.interval_secs),
        clock.clone(),
    )
    .register(credentials.clone())
    .register(revocations.clone())
    .register(sessions.clone())
    .spawn();

    let rotation = RealRotationService::new(
        credentials,
        revocations,
        secrets,
        clock,
        RotationConfig {
            access_ttl: Duration::from_secs(project_settings.rotation.access_ttl_secs),
            refresh_ttl: Duration::from_secs(project_settings.rotation.refresh_ttl_secs),
        },
    );

    let owner = OwnerId::from("demo-user");

    let pair1 = rotation.issue_pair(owner.clone()).await?;
    info!(refresh_expires_at = %pair1.refresh_token_expires_at, "issued initial pair");

    let pair2 = rotation.exchange(&pair1.refresh_token).await?;
    info!("legitimate rotation succeeded");

    match rotation.exchange(&pair1.refresh_token).await {
        Err(e) if e.is_security_event() => {
            warn!(public = e.public_message(), "replay rejected: {e}");
        }
        other => warn!("unexpected replay outcome: {other:?}"),
    }

    match rotation.exchange(&pair2.refresh_token).await {
        Err(e) => info!(
            public = e.public_message(),
            "successor rejected after lineage revocation: {e}"
        ),
        Ok(_) => warn!("successor survived lineage revocation"),
    }

    let session = sessions.create(owner.clone()).await?;
    let session = sessions.touch(&session.id).await?;
    let regenerated = sessions.regenerate(&session.id, owner).await?;
    info!(session = %regenerated.id, "session regenerated after trust change");
    println!("{}", serde_json::to_string_pretty(&regenerated)?);

    let shutdown_timeout = Duration::from_secs(5);
    match tokio::time::timeout(shutdown_timeout, reaper.shutdown()).await {
        Ok(()) => info!("reaper shutdown successfully"),
        Err(_) => error!("reaper shutdown timed out"),
    }

    Ok(())
}
