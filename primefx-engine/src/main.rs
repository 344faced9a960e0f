use primefx_engine::{EngineConfig, RenkoBreakoutStrategy};
use smol_str::SmolStr;
use std::path::PathBuf;

fn main() {
    init_logging();

    let path = match std::env::args().nth(1) {
        Some(path) => PathBuf::from(path),
        None => {
            eprintln!("usage: primefx-engine <config.toml>");
            std::process::exit(2);
        }
    };

    let config = match EngineConfig::load(&path) {
        Ok(config) => config,
        Err(error) => {
            tracing::error!(%error, "failed to load configuration");
            std::process::exit(1);
        }
    };

    let symbols: Vec<SmolStr> = config.strategy.symbols.iter().map(SmolStr::from).collect();
    let strategies: Vec<Box<dyn primefx_strategy::Strategy>> = vec![Box::new(RenkoBreakoutStrategy::new(symbols))];

    let runtime = tokio::runtime::Runtime::new().expect("failed to start async runtime");
    if let Err(error) = runtime.block_on(primefx_engine::run(config, strategies)) {
        tracing::error!(%error, "engine exited with an error");
        std::process::exit(1);
    }
}

/// Installs an INFO-by-default `Subscriber`, overridable via `RUST_LOG`.
fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::builder()
                .with_default_directive(tracing_subscriber::filter::LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .with_ansi(cfg!(debug_assertions))
        .init();
}
