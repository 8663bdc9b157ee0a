use chain_arcade::config::{
    AppConfig,
    Cli,
};
use clap::Parser;
use color_eyre::eyre::Result;

mod client;
mod ui;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let config = AppConfig::from(Cli::parse());
    let _log_guard = client::init_tracing(&config.log_dir)?;
    tracing::info!(rpc_url = %config.rpc_url, manifest = %config.manifest, "starting chain-arcade client");
    client::run_app(config).await
}
