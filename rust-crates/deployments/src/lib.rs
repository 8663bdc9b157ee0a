use anyhow::{
    Context,
    Result,
    anyhow,
};
use chrono::Utc;
use serde::{
    Deserialize,
    Serialize,
};
use serde_json::{
    Map,
    Value,
};
use sha2::{
    Digest,
    Sha256,
};
use std::{
    collections::BTreeMap,
    fmt,
    fs,
    path::{
        Path,
        PathBuf,
    },
};

pub const DEPLOYMENTS_ROOT: &str = ".deployments";
pub const MANIFEST_FILE: &str = "contractInfo.json";
/// Contract entry the game client talks to when a manifest lists several.
pub const GAME_CONTRACT: &str = "GameLogic";

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum DeploymentEnv {
    Dev,
    Test,
    Local,
}

impl DeploymentEnv {
    pub fn dir_name(self) -> &'static str {
        match self {
            DeploymentEnv::Dev => "dev",
            DeploymentEnv::Test => "test",
            DeploymentEnv::Local => "local",
        }
    }

    pub fn network_label(self) -> &'static str {
        match self {
            DeploymentEnv::Dev => "devnet",
            DeploymentEnv::Test => "testnet",
            DeploymentEnv::Local => "localhost",
        }
    }
}

impl fmt::Display for DeploymentEnv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DeploymentEnv::Dev => "Devnet",
            DeploymentEnv::Test => "Testnet",
            DeploymentEnv::Local => "Local",
        };
        write!(f, "{name}")
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ContractEntry {
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub abi: Vec<Value>,
}

impl ContractEntry {
    pub fn address(&self) -> Option<&str> {
        self.address
            .as_deref()
            .map(str::trim)
            .filter(|address| !address.is_empty())
    }

    /// An entry without ABI information is assumed to expose every method.
    pub fn supports(&self, method: &str) -> bool {
        if self.abi.is_empty() {
            return true;
        }
        self.abi.iter().any(|item| {
            item.get("type").and_then(Value::as_str) == Some("function")
                && item.get("name").and_then(Value::as_str) == Some(method)
        })
    }

    pub fn abi_hash(&self) -> Result<String> {
        let bytes =
            serde_json::to_vec(&self.abi).context("Failed to serialize contract ABI")?;
        let mut hasher = Sha256::new();
        hasher.update(bytes);
        Ok(format!("{:x}", hasher.finalize()))
    }
}

/// Deployment manifest consumed by the client and served next to the
/// front-end bundle.
///
/// Two layouts are accepted on disk: a flat one describing a single contract
/// (`address`, `abi` at the top level) and a per-contract one keyed by
/// contract name. Both normalize into [`ContractManifest::contracts`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ContractManifest {
    pub contracts: BTreeMap<String, ContractEntry>,
    pub network: Option<String>,
    pub chain_id: Option<u64>,
    pub deployer: Option<String>,
    pub timestamp: Option<String>,
    pub abi_hash: Option<String>,
}

impl ContractManifest {
    pub fn single(entry: ContractEntry) -> Self {
        let mut contracts = BTreeMap::new();
        contracts.insert(GAME_CONTRACT.to_string(), entry);
        Self {
            contracts,
            ..Self::default()
        }
    }

    pub fn parse(data: &[u8]) -> Result<Option<Self>> {
        if data.iter().all(u8::is_ascii_whitespace) {
            return Ok(None);
        }
        let value: Value = serde_json::from_slice(data)
            .context("Failed to parse deployment manifest JSON")?;
        let Value::Object(mut map) = value else {
            return Err(anyhow!("Deployment manifest must be a JSON object"));
        };

        let network = take_string(&mut map, "network");
        let chain_id = map.remove("chainId").and_then(|raw| match raw {
            Value::Number(n) => n.as_u64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        });
        let deployer = take_string(&mut map, "deployer");
        let timestamp = take_string(&mut map, "timestamp");
        let abi_hash = take_string(&mut map, "abiHash");

        let mut contracts = BTreeMap::new();
        if map.contains_key("address") || map.contains_key("abi") {
            let entry: ContractEntry = serde_json::from_value(Value::Object(map))
                .context("Invalid contract entry in flat manifest")?;
            contracts.insert(GAME_CONTRACT.to_string(), entry);
        } else {
            for (name, raw) in map {
                if !raw.is_object() {
                    continue;
                }
                let entry: ContractEntry = serde_json::from_value(raw)
                    .with_context(|| format!("Invalid contract entry '{name}'"))?;
                contracts.insert(name, entry);
            }
        }

        Ok(Some(Self {
            contracts,
            network,
            chain_id,
            deployer,
            timestamp,
            abi_hash,
        }))
    }

    pub fn game_contract(&self) -> Option<&ContractEntry> {
        self.contracts.get(GAME_CONTRACT).or_else(|| {
            if self.contracts.len() == 1 {
                self.contracts.values().next()
            } else {
                None
            }
        })
    }

    pub fn game_contract_address(&self) -> Option<&str> {
        self.game_contract().and_then(ContractEntry::address)
    }

    pub fn to_json(&self) -> Value {
        let mut map = Map::new();
        match (self.contracts.len(), self.contracts.get(GAME_CONTRACT)) {
            (1, Some(entry)) => {
                map.insert("address".into(), json_opt(entry.address.as_deref()));
                map.insert("abi".into(), Value::Array(entry.abi.clone()));
            }
            _ => {
                for (name, entry) in &self.contracts {
                    let mut inner = Map::new();
                    inner.insert("address".into(), json_opt(entry.address.as_deref()));
                    inner.insert("abi".into(), Value::Array(entry.abi.clone()));
                    map.insert(name.clone(), Value::Object(inner));
                }
            }
        }
        if let Some(network) = &self.network {
            map.insert("network".into(), Value::String(network.clone()));
        }
        if let Some(chain_id) = self.chain_id {
            map.insert("chainId".into(), Value::from(chain_id));
        }
        if let Some(deployer) = &self.deployer {
            map.insert("deployer".into(), Value::String(deployer.clone()));
        }
        if let Some(timestamp) = &self.timestamp {
            map.insert("timestamp".into(), Value::String(timestamp.clone()));
        }
        if let Some(hash) = &self.abi_hash {
            map.insert("abiHash".into(), Value::String(hash.clone()));
        }
        Value::Object(map)
    }

    pub fn stamp_now(&mut self) {
        self.timestamp = Some(Utc::now().to_rfc3339());
    }
}

fn take_string(map: &mut Map<String, Value>, key: &str) -> Option<String> {
    match map.remove(key) {
        Some(Value::String(s)) => Some(s),
        _ => None,
    }
}

fn json_opt(value: Option<&str>) -> Value {
    value.map_or(Value::Null, |v| Value::String(v.to_string()))
}

#[derive(Debug)]
pub struct ManifestStore {
    path: PathBuf,
}

impl ManifestStore {
    pub fn new(env: DeploymentEnv) -> Result<Self> {
        Self::in_root(DEPLOYMENTS_ROOT, env)
    }

    pub fn in_root(root: impl AsRef<Path>, env: DeploymentEnv) -> Result<Self> {
        let env_dir = root.as_ref().join(env.dir_name());
        if !env_dir.exists() {
            fs::create_dir_all(&env_dir).with_context(|| {
                format!("Failed to create deployment directory {}", env_dir.display())
            })?;
        }
        Ok(Self {
            path: env_dir.join(MANIFEST_FILE),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<Option<ContractManifest>> {
        read_manifest(&self.path)
    }

    pub fn save(&self, manifest: &ContractManifest) -> Result<()> {
        write_manifest(&self.path, manifest)
    }
}

pub fn ensure_structure() -> Result<()> {
    for env in [
        DeploymentEnv::Dev,
        DeploymentEnv::Test,
        DeploymentEnv::Local,
    ] {
        let _ = ManifestStore::new(env)?;
    }
    Ok(())
}

/// Missing files read as "no manifest" rather than an error.
pub fn read_manifest(path: impl AsRef<Path>) -> Result<Option<ContractManifest>> {
    let path = path.as_ref();
    if !path.exists() {
        return Ok(None);
    }
    let data = fs::read(path)
        .with_context(|| format!("Failed to read manifest {}", path.display()))?;
    ContractManifest::parse(&data)
        .with_context(|| format!("Failed to load manifest {}", path.display()))
}

pub fn write_manifest(path: impl AsRef<Path>, manifest: &ContractManifest) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let json = serde_json::to_vec_pretty(&manifest.to_json())
        .context("Failed to serialize deployment manifest")?;
    fs::write(path, json)
        .with_context(|| format!("Failed to write manifest {}", path.display()))?;
    Ok(())
}
