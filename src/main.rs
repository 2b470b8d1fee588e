mod channels;
mod config;
mod core;
mod daemon;
mod relay;
mod traits;

#[cfg(test)]
mod testing;

use std::path::PathBuf;

use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Handle CLI arguments
    let args: Vec<String> = std::env::args().collect();
    if args.len() > 1 {
        match args[1].as_str() {
            "--version" | "-V" => {
                println!("mirrorbot {}", env!("CARGO_PKG_VERSION"));
                return Ok(());
            }
            "--help" | "-h" => {
                println!("mirrorbot {}", env!("CARGO_PKG_VERSION"));
                println!("{}\n", env!("CARGO_PKG_DESCRIPTION"));
                println!("Usage: mirrorbot [OPTIONS]\n");
                println!("Configuration is read from config.toml in the working directory.");
                println!("DISCORD_BOT_TOKEN overrides [discord].bot_token (.env is honored).\n");
                println!("Options:");
                println!("  -h, --help       Print help");
                println!("  -V, --version    Print version");
                return Ok(());
            }
            other => {
                eprintln!("Unknown argument: {}", other);
                eprintln!("Run mirrorbot --help for usage.");
                std::process::exit(2);
            }
        }
    }

    let config_path = PathBuf::from("config.toml");
    let config = config::AppConfig::load(&config_path)?;

    // Run async
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(crate::core::run(config))
}
