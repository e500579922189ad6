// ABOUTME: Upload pipeline: walks the local asset tree and stages it under a revision.
// ABOUTME: Files upload with bounded parallelism; the first failure aborts the stage.

use std::path::{Path, PathBuf};

use bytes::Bytes;
use futures::{StreamExt, TryStreamExt, stream};
use walkdir::WalkDir;

use crate::layout::KeyLayout;
use crate::store::{Bucket, PutOverrides, StoreError};
use crate::types::Revision;

#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("source directory not found: {}", .0.display())]
    SourceMissing(PathBuf),

    #[error("source directory has no files to upload: {}", .0.display())]
    NoAssets(PathBuf),

    #[error("failed to walk {}: {source}", root.display())]
    Walk {
        root: PathBuf,
        source: walkdir::Error,
    },

    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("path is not valid UTF-8: {}", .0.display())]
    NonUtf8Path(PathBuf),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// A file under the source directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalAsset {
    /// Path on disk.
    pub path: PathBuf,
    /// `/`-separated path relative to the source directory.
    pub relative: String,
}

/// Totals for a completed stage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UploadSummary {
    pub files: usize,
    pub bytes: u64,
}

/// Every regular file under `source_dir`, in file-name order.
/// Directories are not assets.
pub fn collect_assets(source_dir: &Path) -> Result<Vec<LocalAsset>, UploadError> {
    if !source_dir.is_dir() {
        return Err(UploadError::SourceMissing(source_dir.to_path_buf()));
    }

    let mut assets = Vec::new();
    for entry in WalkDir::new(source_dir).follow_links(true).sort_by_file_name() {
        let entry = entry.map_err(|source| UploadError::Walk {
            root: source_dir.to_path_buf(),
            source,
        })?;
        if !entry.file_type().is_file() {
            continue;
        }

        let Ok(relative) = entry.path().strip_prefix(source_dir) else {
            continue;
        };
        let relative = relative
            .components()
            .map(|c| c.as_os_str().to_str())
            .collect::<Option<Vec<_>>>()
            .ok_or_else(|| UploadError::NonUtf8Path(entry.path().to_path_buf()))?
            .join("/");

        assets.push(LocalAsset {
            path: entry.into_path(),
            relative,
        });
    }
    Ok(assets)
}

/// Upload every file under `source_dir` to the revision's key prefix.
///
/// An empty source directory is rejected: a revision with no objects has no
/// prefix and could never be switched to.
///
/// At most `concurrency` uploads are in flight. Each upload has its own
/// retry budget; once one gives up, the remaining uploads are dropped and the
/// error is returned. Objects already written stay in the bucket.
pub async fn stage_files(
    bucket: &Bucket,
    layout: &KeyLayout,
    revision: &Revision,
    source_dir: &Path,
    concurrency: usize,
) -> Result<UploadSummary, UploadError> {
    let assets = collect_assets(source_dir)?;
    if assets.is_empty() {
        return Err(UploadError::NoAssets(source_dir.to_path_buf()));
    }
    tracing::info!(
        "Uploading {} file(s) from {} to {}",
        assets.len(),
        source_dir.display(),
        layout.revision_prefix(revision)
    );

    let sizes: Vec<u64> = stream::iter(assets.iter())
        .map(|asset| async move {
            let body = tokio::fs::read(&asset.path)
                .await
                .map_err(|source| UploadError::Read {
                    path: asset.path.clone(),
                    source,
                })?;
            let size = body.len() as u64;
            let key = layout.revision_key(revision, &asset.relative);
            bucket
                .put(&key, Bytes::from(body), &PutOverrides::default())
                .await?;
            Ok::<_, UploadError>(size)
        })
        .buffer_unordered(concurrency.max(1))
        .try_collect()
        .await?;

    Ok(UploadSummary {
        files: sizes.len(),
        bytes: sizes.iter().sum(),
    })
}
