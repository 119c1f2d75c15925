//! Background download of document content into the local cache.

use crate::domain::model::CmisItem;
use crate::domain::ports::{FeedSource, Storage};
use crate::utils::error::Result;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Downloads `item` on the runtime and hands the cached path (or `None`) to `on_finished`.
pub fn spawn_download<S, F, C>(
    storage: Arc<S>,
    source: Arc<F>,
    item: CmisItem,
    on_finished: C,
) -> JoinHandle<()>
where
    S: Storage + 'static,
    F: FeedSource + 'static,
    C: FnOnce(Option<PathBuf>) + Send + 'static,
{
    tokio::spawn(async move {
        let outcome = match download(storage.as_ref(), source.as_ref(), &item).await {
            Ok(path) => {
                tracing::info!("Downloaded '{}' to {}", item.title, path.display());
                Some(path)
            }
            Err(e) => {
                tracing::error!("Download of '{}' failed: {}", item.title, e);
                None
            }
        };
        on_finished(outcome);
    })
}

pub async fn download<S, F>(storage: &S, source: &F, item: &CmisItem) -> Result<PathBuf>
where
    S: Storage + ?Sized,
    F: FeedSource + ?Sized,
{
    let workspace = source.workspace_key();
    let (path, mut file) = storage.create_file(workspace, &item.title).await?;

    if let Err(e) = source.fetch_content(item, &mut file).await {
        drop(file);
        if let Err(remove_err) = tokio::fs::remove_file(&path).await {
            tracing::debug!("Could not remove partial file {}: {}", path.display(), remove_err);
        }
        return Err(e);
    }

    Ok(path)
}
