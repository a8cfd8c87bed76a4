mod cli;
mod engine;
mod modes;
mod page;
mod window_host;

use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use weft_config::schema::LogLevel;
use weft_config::WeftConfig;

use cli::Mode;

fn init_logging(directive: &str) {
    let filter = EnvFilter::from_default_env();
    let filter = match directive.parse() {
        Ok(directive) => filter.add_directive(directive),
        Err(e) => {
            eprintln!("invalid log level '{directive}' ({e}), using info");
            filter.add_directive(LevelFilter::INFO.into())
        }
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn main() {
    let args = cli::parse();

    // Config is read before logging starts so its level can apply.
    let loaded = match &args.config {
        Some(path) => weft_config::load_config_from(path),
        None => weft_config::load_config(),
    };
    let configured = loaded
        .as_ref()
        .map_or(LogLevel::default(), |config| config.logging.level);
    init_logging(&args.log_directive(configured.directive()));

    tracing::info!("Weft v{} starting...", env!("CARGO_PKG_VERSION"));
    if let Some(ref path) = args.config {
        tracing::info!("Using config override: {}", path.display());
    }
    let config = loaded.unwrap_or_else(|e| {
        tracing::warn!("Config load failed, using defaults: {e}");
        WeftConfig::default()
    });

    let result = match args.mode() {
        Mode::Run { page } => modes::run(&config, page.as_deref()),
        Mode::Host => modes::host(&config),
        Mode::Client { page } => modes::client(&config, page.as_deref()),
    };

    if let Err(e) = result {
        tracing::error!("{e}");
        std::process::exit(1);
    }
    tracing::info!("Shutdown complete");
}
