use anyhow::Result;
use axum::routing::get;
use axum::Router;
use clap::Parser;
use facetscope::api::{ApiServer, AppState};
use facetscope::backend::{SearchBackend, SolrBackend};
use facetscope::search::Searcher;
use facetscope::store::{CollectionStore, InMemoryCollectionStore};
use facetscope::Config;
use metrics_exporter_prometheus::PrometheusBuilder;
use std::path::Path;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "facetscope-server")]
#[command(about = "Faceted search query server for Solr")]
#[command(version)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "facetscope.toml")]
    config: String,

    /// Host to bind to (overrides server.bind_addr)
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on (overrides server.bind_addr)
    #[arg(short, long)]
    port: Option<u16>,

    /// Solr base URL (overrides backend.url)
    #[arg(long, env = "FACETSCOPE_BACKEND_URL")]
    backend_url: Option<String>,
}

fn init_tracing(config: &Config) {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| config.observability.log_level.clone()),
    );
    let format =
        std::env::var("LOG_FORMAT").unwrap_or_else(|_| config.observability.log_format.clone());

    let registry = tracing_subscriber::registry().with(filter);
    if format.eq_ignore_ascii_case("json") {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

/// `host:port` from the config with CLI overrides applied
fn bind_addr(configured: &str, host: Option<&str>, port: Option<u16>) -> String {
    let (configured_host, configured_port) = configured
        .rsplit_once(':')
        .unwrap_or((configured, "8085"));
    let host = host.unwrap_or(configured_host);
    match port {
        Some(port) => format!("{}:{}", host, port),
        None => format!("{}:{}", host, configured_port),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = Config::load_or_create(Path::new(&args.config))?;
    if let Some(url) = &args.backend_url {
        config.backend.url = url.clone();
    }

    init_tracing(&config);
    tracing::info!("Config file: {}", args.config);

    let backend: Arc<dyn SearchBackend> = Arc::new(SolrBackend::new(&config.backend)?);
    tracing::info!("Search engine at {}", config.backend.url);

    let store: Arc<dyn CollectionStore> = match &config.store.seed_file {
        Some(path) => Arc::new(InMemoryCollectionStore::from_seed_file(path)?),
        None => Arc::new(InMemoryCollectionStore::new()),
    };

    let state = AppState {
        searcher: Arc::new(Searcher::from_config(backend, &config)),
        store,
    };
    let mut server = ApiServer::new(state, config.server.clone());

    if config.observability.metrics_enabled {
        let handle = PrometheusBuilder::new().install_recorder()?;
        server = server.merge(Router::new().route(
            "/metrics",
            get(move || std::future::ready(handle.render())),
        ));
        tracing::info!("Prometheus metrics at GET /metrics");
    }

    let addr = bind_addr(
        &config.server.bind_addr,
        args.host.as_deref(),
        args.port,
    );
    tracing::info!("Starting facetscope server on {}", addr);

    server.serve(&addr).await
}
