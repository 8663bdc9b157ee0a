use crate::arcade::{
    DEFAULT_REWARD_CHANCE,
    reward::DEFAULT_REWARD_DELAY,
};
use clap::Parser;
use color_eyre::eyre::{
    Result,
    WrapErr,
    eyre,
};
use deployments::{
    ContractManifest,
    MANIFEST_FILE,
};
use std::{
    path::PathBuf,
    time::Duration,
};

pub const DEFAULT_RPC_URL: &str = "http://127.0.0.1:8545";
pub const DEFAULT_MANIFEST: &str = "src/contractInfo.json";
pub const DEFAULT_LOG_DIR: &str = "logs";

#[derive(Debug, Parser)]
#[command(
    name = "chain-arcade",
    about = "Terminal client for the on-chain NFT game, with a local arcade"
)]
pub struct Cli {
    /// JSON-RPC endpoint of the wallet node
    #[arg(long, env = "RPC_URL", default_value = DEFAULT_RPC_URL)]
    pub rpc_url: String,
    /// Deployment manifest, as a file path or an http(s) URL
    #[arg(long, default_value = DEFAULT_MANIFEST)]
    pub manifest: String,
    /// Sign locally with this keystore instead of the node's unlocked accounts
    #[arg(long)]
    pub keystore: Option<String>,
    /// Keystore directory (defaults to ~/.foundry/keystores)
    #[arg(long, requires = "keystore")]
    pub keystore_dir: Option<String>,
    #[arg(long, default_value = DEFAULT_LOG_DIR)]
    pub log_dir: PathBuf,
    /// Do not register the player automatically after connecting
    #[arg(long)]
    pub no_auto_register: bool,
    /// Probability that a collected coin triggers an on-chain action
    #[arg(long, default_value_t = DEFAULT_REWARD_CHANCE)]
    pub reward_chance: f64,
    #[arg(long, default_value_t = DEFAULT_REWARD_DELAY.as_millis() as u64)]
    pub reward_delay_ms: u64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ManifestSource {
    Path(PathBuf),
    Url(String),
}

impl ManifestSource {
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
            let url = if trimmed.ends_with('/') {
                format!("{trimmed}{MANIFEST_FILE}")
            } else {
                trimmed.to_string()
            };
            ManifestSource::Url(url)
        } else {
            ManifestSource::Path(PathBuf::from(shellexpand::tilde(trimmed).into_owned()))
        }
    }

    /// `Ok(None)` when the manifest does not exist.
    pub async fn load(&self) -> Result<Option<ContractManifest>> {
        match self {
            ManifestSource::Path(path) => {
                deployments::read_manifest(path).map_err(|e| eyre!("{e:#}"))
            }
            ManifestSource::Url(url) => {
                let response = reqwest::get(url)
                    .await
                    .wrap_err_with(|| format!("fetching manifest from {url} failed"))?;
                if response.status() == reqwest::StatusCode::NOT_FOUND {
                    return Ok(None);
                }
                let body = response
                    .error_for_status()
                    .wrap_err("manifest request failed")?
                    .bytes()
                    .await
                    .wrap_err("reading manifest body failed")?;
                ContractManifest::parse(&body).map_err(|e| eyre!("{e:#}"))
            }
        }
    }
}

impl std::fmt::Display for ManifestSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ManifestSource::Path(path) => write!(f, "{}", path.display()),
            ManifestSource::Url(url) => f.write_str(url),
        }
    }
}

#[derive(Clone, Debug)]
pub struct KeystoreChoice {
    pub name: String,
    pub dir: Option<String>,
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub rpc_url: String,
    pub manifest: ManifestSource,
    pub keystore: Option<KeystoreChoice>,
    pub log_dir: PathBuf,
    pub auto_register: bool,
    pub reward_chance: f64,
    pub reward_delay: Duration,
}

impl From<Cli> for AppConfig {
    fn from(cli: Cli) -> Self {
        Self {
            rpc_url: cli.rpc_url,
            manifest: ManifestSource::parse(&cli.manifest),
            keystore: cli.keystore.map(|name| KeystoreChoice {
                name,
                dir: cli.keystore_dir,
            }),
            log_dir: cli.log_dir,
            auto_register: !cli.no_auto_register,
            reward_chance: cli.reward_chance,
            reward_delay: Duration::from_millis(cli.reward_delay_ms),
        }
    }
}
