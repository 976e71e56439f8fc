//! JSON snapshots of a bucket's block metadata.
//!
//! The retention core never touches storage; the binary uses these helpers to
//! read a bucket, run a pass, and persist the mutated blocks.

use std::fs;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use retention::Bucket;

/// Read a bucket snapshot from `path`.
pub fn load_bucket(path: &Path) -> Result<Bucket> {
    let data = fs::read(path)
        .with_context(|| format!("Failed to read bucket file {}", path.display()))?;
    let bucket = serde_json::from_slice(&data)
        .with_context(|| format!("Failed to parse bucket file {}", path.display()))?;
    Ok(bucket)
}

/// Write a bucket snapshot to `path`.
///
/// The snapshot is written next to the destination first and then renamed, so
/// a reader never sees a partially written file. The temporary file is removed
/// if any step fails.
pub fn save_bucket(path: &Path, bucket: &Bucket) -> Result<()> {
    let json =
        serde_json::to_vec_pretty(bucket).context("Failed to serialize bucket snapshot")?;

    let tmp_path = path.with_extension("json.tmp");
    let written = write_and_rename(&tmp_path, path, &json);
    if written.is_err() && tmp_path.exists() {
        if let Err(e) = fs::remove_file(&tmp_path) {
            log::warn!("Failed to remove {}: {}", tmp_path.display(), e);
        }
    }
    written?;

    log::debug!("Wrote {} blocks to {}", bucket.len(), path.display());
    Ok(())
}

fn write_and_rename(tmp_path: &Path, path: &Path, json: &[u8]) -> Result<()> {
    {
        let mut file = fs::File::create(tmp_path)
            .with_context(|| format!("Failed to create {}", tmp_path.display()))?;
        file.write_all(json)
            .with_context(|| format!("Failed to write {}", tmp_path.display()))?;
        file.sync_all()
            .with_context(|| format!("Failed to sync {}", tmp_path.display()))?;
    }

    fs::rename(tmp_path, path)
        .with_context(|| format!("Failed to move bucket snapshot to {}", path.display()))
}
