// subvault_server/src/services/evidence_disk.rs

//! Local-disk blob store for payment evidence.
//!
//! ```text
//! {evidence_dir}/
//!   {object_name}               image bytes
//!   {object_name}.content-type  MIME type as uploaded
//! ```

use anyhow::Context;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use subvault::EvidenceStore;
use tokio::fs;
use tracing::debug;

const CONTENT_TYPE_SUFFIX: &str = ".content-type";

pub struct DiskEvidenceStore {
  dir: PathBuf,
  base_url: String,
}

/// An evidence file read back for staff.
#[derive(Debug)]
pub struct StoredEvidence {
  pub content_type: String,
  pub bytes: Vec<u8>,
}

/// Object names are generated as `{order_id}-{millis}`; anything else is refused so a
/// request path can never escape the evidence directory.
pub fn is_valid_object_name(name: &str) -> bool {
  !name.is_empty() && name.len() <= 64 && name.bytes().all(|b| b.is_ascii_uppercase() || b.is_ascii_digit() || b == b'-')
}

impl DiskEvidenceStore {
  /// Creates the directory if it doesn't exist.
  pub async fn new(dir: impl AsRef<Path>, app_base_url: &str) -> anyhow::Result<Self> {
    let dir = dir.as_ref().to_path_buf();
    fs::create_dir_all(&dir)
      .await
      .with_context(|| format!("creating evidence directory {}", dir.display()))?;
    Ok(Self {
      dir,
      base_url: format!("{}/api/v1/evidence", app_base_url.trim_end_matches('/')),
    })
  }

  fn paths(&self, object_name: &str) -> (PathBuf, PathBuf) {
    (
      self.dir.join(object_name),
      self.dir.join(format!("{}{}", object_name, CONTENT_TYPE_SUFFIX)),
    )
  }

  pub async fn open(&self, object_name: &str) -> anyhow::Result<Option<StoredEvidence>> {
    if !is_valid_object_name(object_name) {
      return Ok(None);
    }
    let (data_path, type_path) = self.paths(object_name);
    let bytes = match fs::read(&data_path).await {
      Ok(bytes) => bytes,
      Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
      Err(e) => return Err(e).with_context(|| format!("reading {}", data_path.display())),
    };
    let content_type = fs::read_to_string(&type_path)
      .await
      .map(|t| t.trim().to_string())
      .unwrap_or_else(|_| "application/octet-stream".to_string());
    Ok(Some(StoredEvidence { content_type, bytes }))
  }
}

#[async_trait]
impl EvidenceStore for DiskEvidenceStore {
  async fn put(&self, object_name: &str, content_type: &str, bytes: Vec<u8>) -> anyhow::Result<String> {
    anyhow::ensure!(is_valid_object_name(object_name), "invalid evidence object name");
    let (data_path, type_path) = self.paths(object_name);

    // Write to a temp file, then rename, so readers never see half an image.
    let tmp_path = self.dir.join(format!("{}.tmp", object_name));
    fs::write(&tmp_path, &bytes)
      .await
      .with_context(|| format!("writing {}", tmp_path.display()))?;
    fs::write(&type_path, content_type.as_bytes())
      .await
      .with_context(|| format!("writing {}", type_path.display()))?;
    fs::rename(&tmp_path, &data_path)
      .await
      .with_context(|| format!("renaming into {}", data_path.display()))?;

    debug!(object_name, size = bytes.len(), "Evidence stored on disk.");
    Ok(format!("{}/{}", self.base_url, object_name))
  }
}
