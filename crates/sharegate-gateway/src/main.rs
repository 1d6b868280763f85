use anyhow::Context;
use clap::Parser;
use sharegate_core::{AllowAll, Repository, ShareLinks, SystemClock};
use sharegate_gateway::cli::{LogFormat, StorageBackendArg, CLI};
use sharegate_gateway::{App, AppState, StaticIdentityProvider};
use sharegate_generator::RandomGenerator;
use sharegate_manager::{ManagerSettings, ShareLinkManager, Sweeper};
use sharegate_storage::{InMemoryRepository, MySqlRepository, RedisRepository};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CLI::parse();
    init_tracing(config.log_format);

    info!(
        listen_addr = %config.listen_addr,
        public_origin = %config.public_origin,
        storage_backend = %config.storage,
        "starting sharegate gateway"
    );

    let settings = ManagerSettings::builder()
        .origin(config.public_origin.clone())
        .store_timeout(Duration::from_millis(config.store_timeout_ms))
        .max_ttl(Duration::from_secs(config.max_ttl_seconds))
        .max_subjects(config.max_subjects)
        .build();

    let links = match config.storage {
        StorageBackendArg::InMemory => {
            warn!("in-memory storage loses every link on restart");
            manager(InMemoryRepository::new(), settings)
        }
        StorageBackendArg::Mysql => {
            let dsn = config
                .mysql_dsn
                .as_deref()
                .context("mysql dsn is required when storage backend is mysql")?;
            let repository = MySqlRepository::connect(dsn)
                .await
                .context("failed to connect to MySQL")?;
            repository
                .ensure_schema()
                .await
                .context("failed to create share_links table")?;
            manager(repository, settings)
        }
        StorageBackendArg::Redis => {
            let url = config
                .redis_url
                .as_deref()
                .context("redis url is required when storage backend is redis")?;
            let repository =
                RedisRepository::connect_with_prefix(url, config.redis_key_prefix.clone())
                    .await
                    .context("failed to connect to Redis")?;
            manager(repository, settings)
        }
    };

    let identities = StaticIdentityProvider::from_entries(&config.api_keys)
        .context("invalid api key configuration")?;
    if identities.is_empty() {
        warn!("no api keys configured, owner endpoints will reject every request");
    }

    let shutdown = CancellationToken::new();
    let sweeper = (config.sweep_interval_seconds > 0).then(|| {
        Sweeper::new(
            Arc::clone(&links),
            Duration::from_secs(config.sweep_interval_seconds),
            Duration::from_secs(config.sweep_retention_seconds),
        )
        .spawn(shutdown.clone())
    });

    let router = App::router(AppState::new(links, Arc::new(identities)));
    let listener = tokio::net::TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.listen_addr))?;
    info!(listen_addr = %listener.local_addr()?, "listening");

    tokio::spawn(wait_for_signal(shutdown.clone()));
    let graceful = shutdown.clone();
    axum::serve(listener, router)
        .with_graceful_shutdown(async move { graceful.cancelled().await })
        .await
        .context("http server failed")?;

    shutdown.cancel();
    if let Some(sweeper) = sweeper {
        if let Err(e) = sweeper.await {
            warn!(error = %e, "sweeper task did not shut down cleanly");
        }
    }

    info!("sharegate gateway stopped");
    Ok(())
}

fn manager<R: Repository>(repository: R, settings: ManagerSettings) -> Arc<dyn ShareLinks> {
    Arc::new(ShareLinkManager::new(
        repository,
        RandomGenerator::new(),
        AllowAll,
        Arc::new(SystemClock),
        settings,
    ))
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

async fn wait_for_signal(shutdown: CancellationToken) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for shutdown signal");
        return;
    }
    info!("received shutdown signal");
    shutdown.cancel();
}
