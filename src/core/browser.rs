//! Browsing, searching, opening and sharing on top of a feed source and the content cache.

use crate::adapters::favorites::{FavoriteRepository, NewFavorite};
use crate::core::download;
use crate::domain::model::{CmisItem, DocumentDetails, QueryType, SharePayload};
use crate::domain::ports::{FeedSource, Storage};
use crate::utils::error::{CmisError, Result};
use crate::utils::validation;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::oneshot;

const SHARE_FALLBACK_TYPE: &str = "text/plain";

/// A document available on the local filesystem.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct OpenedDocument {
    pub path: PathBuf,
    pub mime_type: String,
    /// `false` when an up to date cached copy was reused.
    pub downloaded: bool,
}

pub struct CmisBrowser<S: Storage + 'static, F: FeedSource + 'static> {
    storage: Arc<S>,
    source: Arc<F>,
}

impl<S: Storage + 'static, F: FeedSource + 'static> CmisBrowser<S, F> {
    pub fn new(storage: S, source: F) -> Self {
        Self {
            storage: Arc::new(storage),
            source: Arc::new(source),
        }
    }

    pub fn source(&self) -> &F {
        &self.source
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Lists the given feed, or the root collection when `feed` is `None`.
    pub async fn browse(&self, feed: Option<&str>) -> Result<Vec<CmisItem>> {
        self.source.load_feed(feed).await
    }

    /// Lists a folder's children feed, with display parameters applied.
    pub async fn browse_folder(&self, down_link: &str) -> Result<Vec<CmisItem>> {
        let url = self.source.children_feed_url(down_link);
        self.source.load_feed(Some(&url)).await
    }

    pub async fn browse_children(&self, item: &CmisItem) -> Result<Vec<CmisItem>> {
        if !item.has_children() {
            return Err(CmisError::config(format!("'{}' is not a folder", item.title)));
        }
        self.browse_folder(&item.down_link).await
    }

    pub async fn search(&self, query_type: QueryType, text: &str) -> Result<Vec<CmisItem>> {
        validation::validate_not_blank("query", text)?;
        let url = self.source.search_url(query_type, text)?;
        tracing::debug!("Searching ({:?}) via {}", query_type, url);
        self.source.load_feed(Some(&url)).await
    }

    /// Finds an entry in a feed by id, then by exact title.
    pub async fn find(&self, feed: Option<&str>, key: &str) -> Result<CmisItem> {
        let mut items = self.browse(feed).await?;
        let position = items
            .iter()
            .position(|i| !i.id.is_empty() && i.id == key)
            .or_else(|| items.iter().position(|i| i.title == key));

        position
            .map(|index| items.swap_remove(index))
            .ok_or_else(|| CmisError::NotFound {
                what: "entry",
                key: key.to_string(),
            })
    }

    /// Loads a single entry from its self URL.
    pub async fn entry(&self, self_url: &str) -> Result<CmisItem> {
        self.browse(Some(self_url))
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| CmisError::NotFound {
                what: "entry",
                key: self_url.to_string(),
            })
    }

    /// The cached copy, if it is non-empty and matches the reported content length.
    pub async fn cached_copy(&self, item: &CmisItem) -> Option<PathBuf> {
        let workspace = self.source.workspace_key();
        let cached = self.storage.cached_len(workspace, &item.title).await?;
        let expected = item.content_length()?;

        (cached > 0 && cached == expected).then(|| self.storage.content_path(workspace, &item.title))
    }

    /// Runs the background download and waits for its completion callback.
    async fn download(&self, item: &CmisItem) -> Option<PathBuf> {
        let (tx, rx) = oneshot::channel();
        download::spawn_download(
            Arc::clone(&self.storage),
            Arc::clone(&self.source),
            item.clone(),
            move |path| {
                let _ = tx.send(path);
            },
        );
        rx.await.ok().flatten()
    }

    pub async fn open(&self, item: &CmisItem) -> Result<OpenedDocument> {
        if item.has_children() {
            return Err(CmisError::config(format!(
                "'{}' is a folder; browse {} instead",
                item.title, item.down_link
            )));
        }

        if let Some(path) = self.cached_copy(item).await {
            tracing::debug!("Using cached copy of '{}' at {}", item.title, path.display());
            return Ok(OpenedDocument {
                path,
                mime_type: item.mime_type.to_lowercase(),
                downloaded: false,
            });
        }

        match self.download(item).await {
            Some(path) if path.exists() => Ok(OpenedDocument {
                path,
                mime_type: item.mime_type.to_lowercase(),
                downloaded: true,
            }),
            _ => Err(CmisError::FileDoesNotExist {
                path: self
                    .storage
                    .content_path(self.source.workspace_key(), &item.title)
                    .display()
                    .to_string(),
            }),
        }
    }

    pub async fn share(&self, item: &CmisItem) -> Result<SharePayload> {
        let content = if item.mime_type.is_empty() {
            Some(
                self.storage
                    .content_path(self.source.workspace_key(), &item.title),
            )
        } else if let Some(path) = self.cached_copy(item).await {
            Some(path)
        } else {
            self.download(item).await
        };

        Ok(share_payload(item, content))
    }

    pub fn details(&self, item: &CmisItem) -> DocumentDetails {
        DocumentDetails::from(item)
    }

    pub fn add_favorite<R: FavoriteRepository + ?Sized>(
        &self,
        favorites: &R,
        server_id: i64,
        item: &CmisItem,
    ) -> Result<i64> {
        let favorite = NewFavorite::from_item(server_id, item);
        let id = favorites.insert(&favorite)?;
        tracing::info!("Favorite added: '{}' ({})", favorite.title, favorite.url);
        Ok(id)
    }
}

/// Shares the file when it exists, otherwise a link to the entry as plain text.
pub fn share_payload(item: &CmisItem, content: Option<PathBuf>) -> SharePayload {
    match content.filter(|p| p.exists()) {
        Some(path) => SharePayload {
            subject: item.title.clone(),
            text: item.content_url.clone(),
            stream: Some(path),
            mime_type: item.mime_type.clone(),
        },
        None => SharePayload {
            subject: item.title.clone(),
            text: item.self_url.clone(),
            stream: None,
            mime_type: SHARE_FALLBACK_TYPE.to_string(),
        },
    }
}
