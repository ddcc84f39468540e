use anyhow::Context;
use tablesum::Config;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = Config::from_env()?;

    // The TUI owns the terminal, so logs go to a rolling file. The guard must
    // live for the whole process or buffered lines are lost.
    std::fs::create_dir_all(&config.log.dir)
        .with_context(|| format!("could not create log directory {}", config.log.dir))?;
    let appender = tracing_appender::rolling::daily(&config.log.dir, "tablesum.log");
    let (writer, _guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log.filter)),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false),
        )
        .init();

    info!(backend = %config.backend.base_url, "starting tablesum");

    tablesum::tui::run(config).await
}
