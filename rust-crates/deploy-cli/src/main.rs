use alloy::primitives::{
    Address,
    Bytes,
};
use anyhow::{
    Context,
    Result,
    anyhow,
};
use clap::{
    ArgGroup,
    Parser,
};
use deployments::{
    ContractEntry,
    ContractManifest,
    DeploymentEnv,
    MANIFEST_FILE,
    ManifestStore,
};
use game_abi::{
    WalletProvider,
    rpc::RpcWallet,
    wallets::{
        find_keystore,
        resolve_keystore_dir,
        unlock_keystore,
    },
};
use serde_json::Value;
use std::{
    fs,
    path::{
        Path,
        PathBuf,
    },
};

const DEFAULT_LOCAL_RPC_URL: &str = "http://127.0.0.1:8545";
const DEFAULT_OUT: &str = "src/contractInfo.json";
const DIST_DIR: &str = "dist";

#[derive(Parser, Debug)]
#[command(
    name = "game-deploy",
    about = "Deploy the game contract or record an existing deployment",
    version,
    group(
        ArgGroup::new("network")
            .args(["dev", "test", "local"])
            .required(true)
    )
)]
struct Args {
    /// Deploy to the development network
    #[arg(long)]
    dev: bool,

    /// Deploy to the test network
    #[arg(long)]
    test: bool,

    /// Deploy to a local node
    #[arg(long)]
    local: bool,

    /// Override RPC URL (required for --dev and --test)
    #[arg(long, env = "RPC_URL")]
    rpc_url: Option<String>,

    /// Hex-encoded creation bytecode
    #[arg(long, required_unless_present = "address")]
    bytecode: Option<PathBuf>,

    /// Contract ABI as a JSON array, or an artifact with an `abi` field
    #[arg(long)]
    abi: PathBuf,

    /// Record an already deployed contract instead of deploying
    #[arg(long, conflicts_with = "bytecode")]
    address: Option<Address>,

    /// Manifest copy consumed by the client
    #[arg(long, default_value = DEFAULT_OUT)]
    out: PathBuf,

    /// Keystore used to sign; the node's first unlocked account otherwise
    #[arg(long)]
    keystore: Option<String>,

    /// Override keystore directory (defaults to ~/.foundry/keystores)
    #[arg(long, requires = "keystore")]
    keystore_dir: Option<String>,
}

struct DeploySummary {
    address: Address,
    tx_hash: Option<String>,
    block_number: Option<u64>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .try_init();
    deployments::ensure_structure().context("initializing deployment directories")?;

    let env = if args.dev {
        DeploymentEnv::Dev
    } else if args.test {
        DeploymentEnv::Test
    } else {
        DeploymentEnv::Local
    };
    let rpc_url = match (&args.rpc_url, env) {
        (Some(url), _) => url.clone(),
        (None, DeploymentEnv::Local) => DEFAULT_LOCAL_RPC_URL.to_string(),
        (None, other) => return Err(anyhow!("--rpc-url is required for {other}")),
    };

    let abi = read_abi(&args.abi)?;

    let signer = match args.keystore.as_deref() {
        Some(name) => {
            let dir = resolve_keystore_dir(args.keystore_dir.as_deref())
                .context("resolving keystore directory")?;
            let descriptor = find_keystore(&dir, name).context("locating requested keystore")?;
            Some(unlock_keystore(&descriptor).context("unlocking keystore")?)
        }
        None => None,
    };
    let wallet = RpcWallet::connect(&rpc_url, signer).context("connecting to RPC node")?;
    let deployer = wallet
        .request_accounts()
        .await
        .map_err(|e| anyhow!("requesting accounts: {e}"))?
        .into_iter()
        .next()
        .ok_or_else(|| anyhow!("node at {rpc_url} exposes no accounts; pass --keystore"))?;
    let chain_id = wallet
        .chain_id()
        .await
        .map_err(|e| anyhow!("querying chain id: {e}"))?;

    let summary = match (args.address, args.bytecode.as_deref()) {
        (Some(address), _) => {
            println!("Recording existing deployment {address}");
            DeploySummary {
                address,
                tx_hash: None,
                block_number: None,
            }
        }
        (None, Some(path)) => {
            let bytecode = read_bytecode(path)?;
            println!(
                "Deploying {} bytes from {deployer} to {env} (chain {chain_id})...",
                bytecode.len()
            );
            let deployment = wallet
                .deploy(deployer, bytecode)
                .await
                .context("deploying game contract")?;
            DeploySummary {
                address: deployment.address,
                tx_hash: Some(deployment.tx_hash.to_string()),
                block_number: deployment.block_number,
            }
        }
        (None, None) => return Err(anyhow!("either --bytecode or --address is required")),
    };

    let manifest = build_manifest(summary.address, abi, env, chain_id, deployer)?;
    let store = ManifestStore::new(env).context("opening manifest store")?;
    store.save(&manifest).context("recording deployment")?;
    tracing::info!(path = %store.path().display(), %env, "manifest recorded");
    let dist = Path::new(DIST_DIR).join(MANIFEST_FILE);
    for path in [args.out.as_path(), dist.as_path()] {
        deployments::write_manifest(path, &manifest)
            .with_context(|| format!("writing manifest copy {}", path.display()))?;
    }

    println!("Game contract: {}", summary.address);
    if let Some(tx_hash) = &summary.tx_hash {
        println!("  tx: {tx_hash}");
    }
    if let Some(block) = summary.block_number {
        println!("  block: {block}");
    }
    if let Some(hash) = &manifest.abi_hash {
        println!("  abi hash: {}...", &hash[..hash.len().min(12)]);
    }
    println!("Manifest written to {}", store.path().display());
    println!("  copies: {}, {}", args.out.display(), dist.display());
    Ok(())
}

/// Accepts `0x`-prefixed or bare hex; surrounding whitespace is ignored.
fn parse_bytecode(raw: &str) -> Result<Bytes> {
    let trimmed = raw.trim();
    let cleaned = trimmed.strip_prefix("0x").unwrap_or(trimmed);
    if cleaned.is_empty() {
        anyhow::bail!("bytecode is empty");
    }
    let bytes = hex::decode(cleaned).context("decoding bytecode hex")?;
    Ok(Bytes::from(bytes))
}

fn read_bytecode(path: &Path) -> Result<Bytes> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("reading bytecode {}", path.display()))?;
    parse_bytecode(&raw).with_context(|| format!("parsing bytecode {}", path.display()))
}

fn parse_abi(data: &[u8]) -> Result<Vec<Value>> {
    let value: Value = serde_json::from_slice(data).context("parsing ABI JSON")?;
    match value {
        Value::Array(items) => Ok(items),
        Value::Object(mut map) => match map.remove("abi") {
            Some(Value::Array(items)) => Ok(items),
            _ => Err(anyhow!("artifact has no `abi` array")),
        },
        _ => Err(anyhow!("ABI must be a JSON array or an artifact object")),
    }
}

fn read_abi(path: &Path) -> Result<Vec<Value>> {
    let data = fs::read(path).with_context(|| format!("reading ABI {}", path.display()))?;
    parse_abi(&data).with_context(|| format!("loading ABI {}", path.display()))
}

fn build_manifest(
    address: Address,
    abi: Vec<Value>,
    env: DeploymentEnv,
    chain_id: u64,
    deployer: Address,
) -> Result<ContractManifest> {
    let entry = ContractEntry {
        address: Some(address.to_string()),
        abi,
    };
    let abi_hash = entry.abi_hash()?;
    let mut manifest = ContractManifest::single(entry);
    manifest.network = Some(env.network_label().to_string());
    manifest.chain_id = Some(chain_id);
    manifest.deployer = Some(deployer.to_string());
    manifest.abi_hash = Some(abi_hash);
    manifest.stamp_now();
    Ok(manifest)
}

#[allow(non_snake_case)]
#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parse_bytecode__accepts_prefixed_and_bare_hex() {
        assert_eq!(
            parse_bytecode("0x6080\n").unwrap(),
            Bytes::from(vec![0x60, 0x80])
        );
        assert_eq!(
            parse_bytecode("  6080  ").unwrap(),
            Bytes::from(vec![0x60, 0x80])
        );
    }

    #[test]
    fn parse_bytecode__rejects_empty_and_invalid() {
        assert!(parse_bytecode("0x").is_err());
        assert!(parse_bytecode("0xzz").is_err());
    }

    #[test]
    fn parse_abi__accepts_array_or_artifact() {
        let item = json!({"type": "function", "name": "registerPlayer"});
        let array = serde_json::to_vec(&json!([item.clone()])).unwrap();
        let artifact =
            serde_json::to_vec(&json!({"contractName": "GameLogic", "abi": [item.clone()]}))
                .unwrap();

        assert_eq!(parse_abi(&array).unwrap(), vec![item.clone()]);
        assert_eq!(parse_abi(&artifact).unwrap(), vec![item]);
        assert!(parse_abi(b"{\"bytecode\":\"0x\"}").is_err());
        assert!(parse_abi(b"42").is_err());
    }

    #[test]
    fn build_manifest__fills_deployment_metadata() {
        // given
        let address = Address::repeat_byte(0xAB);
        let deployer = Address::repeat_byte(0x01);
        let abi = vec![json!({"type": "function", "name": "performAction"})];

        // when
        let manifest =
            build_manifest(address, abi, DeploymentEnv::Local, 31337, deployer).unwrap();

        // then
        assert_eq!(manifest.game_contract_address(), Some(address.to_string().as_str()));
        assert_eq!(manifest.network.as_deref(), Some("localhost"));
        assert_eq!(manifest.chain_id, Some(31337));
        assert_eq!(manifest.deployer, Some(deployer.to_string()));
        assert!(manifest.timestamp.is_some());
        assert_eq!(
            manifest.abi_hash,
            Some(manifest.game_contract().unwrap().abi_hash().unwrap())
        );
    }

    #[test]
    fn args__address_conflicts_with_bytecode() {
        let result = Args::try_parse_from([
            "game-deploy",
            "--local",
            "--abi",
            "abi.json",
            "--bytecode",
            "code.hex",
            "--address",
            "0x5FbDB2315678afecb367f032d93F642f64180aa3",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn args__requires_a_network() {
        let result = Args::try_parse_from(["game-deploy", "--abi", "abi.json", "--bytecode", "x"]);
        assert!(result.is_err());
    }

    #[test]
    fn args__record_mode_without_bytecode() {
        let args = Args::try_parse_from([
            "game-deploy",
            "--dev",
            "--abi",
            "abi.json",
            "--address",
            "0x5FbDB2315678afecb367f032d93F642f64180aa3",
        ])
        .unwrap();
        assert!(args.dev);
        assert!(args.bytecode.is_none());
        assert_eq!(args.out, PathBuf::from(DEFAULT_OUT));
    }
}
