//! Checkpoint screenshots written to a fixed output directory

use sha2::{Digest, Sha256};
use std::path::PathBuf;
use tracing::info;

use crate::error::E2eResult;

/// A checkpoint that has been written to disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Checkpoint {
    pub name: String,
    pub path: PathBuf,

    /// SHA-256 of the written PNG
    pub sha256: String,
}

/// Writes `<output_dir>/<name>.png`; the last capture of a name wins
#[derive(Debug, Clone)]
pub struct ArtifactWriter {
    output_dir: PathBuf,
}

impl ArtifactWriter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self { output_dir: output_dir.into() }
    }

    pub fn path_for(&self, name: &str) -> PathBuf {
        self.output_dir.join(format!("{}.png", name))
    }

    /// Write a PNG for `name`, creating the output directory if needed
    pub fn capture(&self, name: &str, png: &[u8]) -> E2eResult<Checkpoint> {
        std::fs::create_dir_all(&self.output_dir)?;

        let path = self.path_for(name);
        std::fs::write(&path, png)?;

        let sha256 = hash_bytes(png);
        info!("📷 Checkpoint '{}' saved to {} ({})", name, path.display(), &sha256[..12]);

        Ok(Checkpoint {
            name: name.to_string(),
            path,
            sha256,
        })
    }
}

fn hash_bytes(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}
