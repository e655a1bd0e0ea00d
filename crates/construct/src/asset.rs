//! File assets referenced by a stack
//!
//! An asset is a local source (a handler entry file, a directory) that an
//! external build step packages and uploads before deployment. The stack
//! only records where the packaged object will live and how to build it;
//! nothing is built or uploaded here.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

/// Bootstrap qualifier of the default staging bucket
pub const BOOTSTRAP_QUALIFIER: &str = "hnb659fds";

/// Cloud assembly schema version written to manifests
pub const ASSEMBLY_VERSION: &str = "36.0.0";

/// `Fn::Sub` template of the staging bucket name
pub fn staging_bucket() -> String {
    format!("cdk-{BOOTSTRAP_QUALIFIER}-assets-${{AWS::AccountId}}-${{AWS::Region}}")
}

/// How the asset source is packaged
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Packaging {
    /// Upload the file as-is
    File,
    /// Zip the (built) output directory
    ZipDirectory,
}

/// A single file asset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileAsset {
    /// Content fingerprint; also the object name in the staging bucket
    pub id: String,
    /// Source path as given by the declaring construct
    pub source_path: String,
    pub packaging: Packaging,
    /// Command the external build step runs to produce the packaged output
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub build_command: Vec<String>,
}

impl FileAsset {
    /// Object key in the staging bucket
    pub fn object_key(&self) -> String {
        match self.packaging {
            Packaging::ZipDirectory => format!("{}.zip", self.id),
            Packaging::File => self.id.clone(),
        }
    }
}

/// Compute a stable fingerprint over a sequence of byte chunks
///
/// Each chunk is length-prefixed so that `["ab", "c"]` and `["a", "bc"]`
/// produce different fingerprints.
pub fn fingerprint<I, B>(chunks: I) -> String
where
    I: IntoIterator<Item = B>,
    B: AsRef<[u8]>,
{
    let mut hasher = blake3::Hasher::new();
    for chunk in chunks {
        let bytes = chunk.as_ref();
        hasher.update(&(bytes.len() as u64).to_le_bytes());
        hasher.update(bytes);
    }
    hasher.finalize().to_hex().to_string()
}

/// Render the asset manifest for one stack
pub fn render_manifest(assets: &[FileAsset]) -> Value {
    let mut files = Map::new();
    for asset in assets {
        let mut entry = json!({
            "source": {
                "path": asset.source_path,
                "packaging": asset.packaging,
            },
            "destinations": {
                "current_account-current_region": {
                    "bucketName": staging_bucket(),
                    "objectKey": asset.object_key(),
                }
            }
        });
        if !asset.build_command.is_empty() {
            entry["build"] = json!(asset.build_command);
        }
        files.insert(asset.id.clone(), entry);
    }

    json!({
        "version": ASSEMBLY_VERSION,
        "files": Value::Object(files),
        "dockerImages": Value::Object(Map::new()),
    })
}
