use clap::Parser;
use estately_api::{ApiConfig, RestApi};
use estately_embed::{load_embedder, EmbedderSpec, DEFAULT_MODEL};
use estately_storage::{CatalogManager, CatalogOptions};
use std::path::PathBuf;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

/// Hybrid keyword and semantic search over real-estate listings
#[derive(Parser, Debug)]
#[command(name = "estately")]
#[command(about = "Real-estate listing search with a chat endpoint", long_about = None)]
struct Args {
    /// Listings JSON file
    #[arg(short, long, default_value = "data/properties.json")]
    data_file: PathBuf,

    /// Address to bind the HTTP server to
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    /// HTTP API port
    #[arg(long, default_value_t = 5000)]
    http_port: u16,

    /// Embedding model: "hash", "hash:<dim>" or a pretrained model name
    #[arg(long, default_value = DEFAULT_MODEL)]
    model: String,

    /// Where pretrained model files are downloaded
    #[arg(long)]
    model_cache_dir: Option<PathBuf>,

    /// Directory for index snapshots; the index is rebuilt on every start without it
    #[arg(long)]
    index_cache_dir: Option<PathBuf>,

    /// Directory served under /static
    #[arg(long)]
    static_dir: Option<PathBuf>,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_level = match args.log_level.as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting Estately v{}", env!("CARGO_PKG_VERSION"));
    info!("Data file: {:?}", args.data_file);
    info!("Embedding model: {}", args.model);

    let mut spec = EmbedderSpec::new(args.model.clone());
    if let Some(dir) = &args.model_cache_dir {
        spec = spec.with_cache_dir(dir);
    }
    let embedder = load_embedder(&spec)?;

    let mut options = CatalogOptions::new(&args.data_file);
    if let Some(dir) = &args.index_cache_dir {
        options = options.with_index_cache_dir(dir);
    }
    let catalog = CatalogManager::open(options, embedder)?;
    let resolver = catalog.resolver();
    info!(
        listings = resolver.corpus().len(),
        duplicates_removed = catalog.duplicates_removed(),
        source = ?catalog.index_source(),
        "Catalog ready"
    );

    let config = ApiConfig {
        host: args.host.clone(),
        port: args.http_port,
        static_dir: args.static_dir.clone(),
    };

    let http_handle = std::thread::spawn(move || {
        info!("Starting HTTP server on {}:{}", config.host, config.port);
        let sys = actix_web::rt::System::new();
        sys.block_on(async {
            if let Err(e) = RestApi::start(resolver, config).await {
                error!("HTTP server error: {}", e);
            }
        })
    });

    info!("HTTP API: http://localhost:{}/", args.http_port);

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received");
        }
        _ = tokio::task::spawn_blocking(move || {
            http_handle.join().ok();
        }) => {
            info!("HTTP server stopped");
        }
    }

    info!("Shutting down...");
    Ok(())
}
