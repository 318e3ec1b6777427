use std::path::Path;

use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::debug;

use crate::errors::{SnapshotError, SnapshotResult};

/// Write the rendered snapshot through a buffered handle.
///
/// The handle is closed on every path out of this function. A failure part-way
/// through can leave a truncated file behind; it is not rolled back.
pub async fn write_snapshot(path: &Path, contents: &str) -> SnapshotResult<()> {
    let write_failure = |source| SnapshotError::WriteFailure {
        path: path.to_path_buf(),
        source,
    };

    let file = File::create(path).await.map_err(write_failure)?;
    let mut writer = BufWriter::new(file);
    writer
        .write_all(contents.as_bytes())
        .await
        .map_err(write_failure)?;
    writer.flush().await.map_err(write_failure)?;
    writer.into_inner().sync_all().await.map_err(write_failure)?;

    debug!(path = %path.display(), bytes = contents.len(), "snapshot written");
    Ok(())
}
