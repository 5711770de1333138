pub mod result_store;
pub mod zone_file;

pub use result_store::JsonResultStore;
pub use zone_file::{next_serial, render_zone, ZoneFileWriter};

use std::path::Path;
use steer_dns_domain::DomainError;

/// Write through a sibling temp file and rename over `path`.
pub(crate) async fn write_atomically(path: &Path, contents: &[u8]) -> Result<(), DomainError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| DomainError::IoError(format!("{}: {}", parent.display(), e)))?;
    }

    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = std::path::PathBuf::from(tmp);

    tokio::fs::write(&tmp, contents)
        .await
        .map_err(|e| DomainError::IoError(format!("{}: {}", tmp.display(), e)))?;
    tokio::fs::rename(&tmp, path)
        .await
        .map_err(|e| DomainError::IoError(format!("{}: {}", path.display(), e)))
}
