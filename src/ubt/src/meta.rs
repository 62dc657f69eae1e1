//! `.meta.json` sidecars written next to every extracted asset.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::bundle::BundleError;
use crate::kind::AssetKind;

/// Sidecar record describing one extracted asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetMeta {
    #[serde(rename = "type")]
    pub kind: AssetKind,
    pub path_id: i64,
    pub name: String,
    /// Bundle file name the asset came from.
    pub source_bundle: String,
    /// Extensionless output prefix, relative to the extraction root.
    pub original_path: String,
}

/// Sidecar path for an extensionless output prefix.
pub fn meta_path(prefix: &Path) -> PathBuf {
    let mut os = prefix.as_os_str().to_os_string();
    os.push(".meta.json");
    PathBuf::from(os)
}

pub fn write_meta(prefix: &Path, meta: &AssetMeta) -> Result<(), BundleError> {
    let json = serde_json::to_string_pretty(meta)?;
    fs::write(meta_path(prefix), json)?;
    Ok(())
}

pub fn read_meta(prefix: &Path) -> Result<AssetMeta, BundleError> {
    let contents = fs::read_to_string(meta_path(prefix))?;
    Ok(serde_json::from_str(&contents)?)
}
