use alloy::signers::local::PrivateKeySigner;
use anyhow::{
    Context,
    Result,
    anyhow,
};
use eth_keystore::decrypt_key;
use rpassword::prompt_password;
use std::{
    fs,
    path::{
        Path,
        PathBuf,
    },
};

#[derive(Clone, Debug)]
pub struct KeystoreDescriptor {
    pub name: String,
    pub path: PathBuf,
}

impl KeystoreDescriptor {
    pub fn new(name: impl Into<String>, path: PathBuf) -> Self {
        Self {
            name: name.into(),
            path,
        }
    }
}

pub fn default_keystore_dir() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME environment variable not set")?;
    Ok(PathBuf::from(home).join(".foundry").join("keystores"))
}

pub fn resolve_keystore_dir(dir: Option<&str>) -> Result<PathBuf> {
    match dir {
        Some(raw) => {
            let expanded = shellexpand::tilde(raw);
            Ok(PathBuf::from(expanded.into_owned()))
        }
        None => default_keystore_dir(),
    }
}

/// Lists keystore files; accepts bare names and `.json` files.
pub fn list_keystores(dir: &Path) -> Result<Vec<KeystoreDescriptor>> {
    if !dir.exists() {
        return Ok(Vec::new());
    }
    let mut keystores = Vec::new();
    for entry in fs::read_dir(dir).context("Failed to read keystore directory")? {
        let entry = entry.context("Failed to read keystore entry")?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        match path.extension().and_then(|ext| ext.to_str()) {
            None | Some("json") => {}
            Some(_) => continue,
        }
        let name = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .ok_or_else(|| anyhow!("Invalid keystore filename {:?}", path))?
            .to_owned();
        keystores.push(KeystoreDescriptor::new(name, path));
    }
    keystores.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(keystores)
}

pub fn find_keystore(dir: &Path, name: &str) -> Result<KeystoreDescriptor> {
    list_keystores(dir)?
        .into_iter()
        .find(|k| k.name == name)
        .ok_or_else(|| anyhow!("Keystore '{name}' not found in {}", dir.to_string_lossy()))
}

pub fn unlock_keystore(descriptor: &KeystoreDescriptor) -> Result<PrivateKeySigner> {
    let prompt = format!("Enter password for keystore '{}': ", descriptor.name);
    let password = prompt_password(prompt).context("Failed to read keystore password")?;
    decrypt_with_password(descriptor, &password)
}

pub fn decrypt_with_password(
    descriptor: &KeystoreDescriptor,
    password: &str,
) -> Result<PrivateKeySigner> {
    let secret = decrypt_key(&descriptor.path, password.as_bytes())
        .map_err(|_| anyhow!("Invalid password for keystore '{}'", descriptor.name))?;
    PrivateKeySigner::from_slice(&secret).map_err(|_| {
        anyhow!(
            "Keystore '{}' contained unsupported key material",
            descriptor.name
        )
    })
}

#[allow(non_snake_case)]
#[cfg(test)]
mod tests {
    use super::*;
    use tempdir::TempDir;

    #[test]
    fn list_keystores__skips_unrelated_files_and_sorts() {
        // given
        let dir = TempDir::new("keystores").unwrap();
        fs::write(dir.path().join("zeta"), "{}").unwrap();
        fs::write(dir.path().join("alpha.json"), "{}").unwrap();
        fs::write(dir.path().join("notes.txt"), "ignore").unwrap();

        // when
        let found = list_keystores(dir.path()).unwrap();

        // then
        let names: Vec<_> = found.iter().map(|k| k.name.as_str()).collect();
        assert_eq!(names, vec!["alpha", "zeta"]);
    }

    #[test]
    fn list_keystores__missing_dir_is_empty() {
        let dir = TempDir::new("keystores").unwrap();
        let missing = dir.path().join("nope");
        assert!(list_keystores(&missing).unwrap().is_empty());
    }

    #[test]
    fn find_keystore__reports_unknown_name() {
        let dir = TempDir::new("keystores").unwrap();
        let err = find_keystore(dir.path(), "ghost").unwrap_err();
        assert!(err.to_string().contains("ghost"));
    }

    #[test]
    fn resolve_keystore_dir__expands_explicit_path() {
        let dir = resolve_keystore_dir(Some("/tmp/keys")).unwrap();
        assert_eq!(dir, PathBuf::from("/tmp/keys"));
    }
}
