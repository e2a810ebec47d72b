use candidate_scout::core::config::DEFAULT_LOG_FILTER;
use candidate_scout::AppConfig;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() {
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Fatal error: {err:#}");
            std::process::exit(1);
        }
    };

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting candidate-scout v{}", env!("CARGO_PKG_VERSION"));

    if let Err(err) = candidate_scout::run(&config).await {
        error!(error = %format!("{err:#}"), "fatal error");
        std::process::exit(1);
    }
}
