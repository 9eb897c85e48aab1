use std::io;
use std::path::{Path, PathBuf};

use crate::extract::ExtractionResult;

/// Move a processed image into the output directory under its extracted
/// label.
///
/// The output file is named `"<result>-<original name>"` and holds the
/// original (not cleaned) image bytes. Ordering is write-then-delete, so a
/// crash between the two steps duplicates the file rather than losing it.
/// Identical labels collide on name; last write wins.
pub async fn relocate(
    path: &Path,
    name: &str,
    result: &ExtractionResult,
    output_dir: &Path,
) -> io::Result<PathBuf> {
    tokio::fs::create_dir_all(output_dir).await?;

    let dest = output_dir.join(format!("{result}-{name}"));
    tokio::fs::copy(path, &dest).await?;
    tracing::info!("Saved {}", dest.display());

    match tokio::fs::remove_file(path).await {
        Ok(()) => tracing::info!("Deleted {name}"),
        // Concurrently removed source is tolerated; the copy already landed.
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            tracing::warn!("Source {name} already gone at delete time");
        }
        Err(e) => return Err(e),
    }

    Ok(dest)
}
