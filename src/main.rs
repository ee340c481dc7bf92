use tracing_subscriber::EnvFilter;

use chainscope_engine::config::Config;
use chainscope_engine::engine::ForensicEngine;
use chainscope_engine::model::TxRecord;

fn main() -> eyre::Result<()> {
    color_eyre::install()?;

    // Initialize structured logging (set RUST_LOG=debug for detector output)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    let mut args = std::env::args().skip(1);
    let (transactions_path, root_address) = match (args.next(), args.next()) {
        (Some(path), Some(address)) => (path, address),
        _ => {
            eprintln!("Usage: chainscope-engine <transactions.json> <root_address> [config.toml]");
            std::process::exit(2);
        }
    };

    let config = match args.next() {
        Some(path) => {
            let config = Config::load(&path)?;
            tracing::info!("Configuration loaded from {}", path);
            config
        }
        None => Config::default(),
    };

    let content = std::fs::read_to_string(&transactions_path).map_err(|e| {
        eyre::eyre!(
            "Failed to read transactions file '{}': {}",
            transactions_path,
            e
        )
    })?;
    let transactions: Vec<TxRecord> = serde_json::from_str(&content).map_err(|e| {
        eyre::eyre!(
            "Failed to parse transactions file '{}': {}",
            transactions_path,
            e
        )
    })?;
    tracing::info!(
        count = transactions.len(),
        root = %root_address,
        "Transactions loaded"
    );

    let engine = ForensicEngine::from_config(&config)?;
    let summary = engine.analyze(&transactions, &root_address, None);

    let stdout = std::io::stdout();
    serde_json::to_writer_pretty(stdout.lock(), &summary)
        .map_err(|e| eyre::eyre!("Failed to serialize summary: {}", e))?;
    println!();

    Ok(())
}
