use crate::domain::model::{CmisItem, QueryType};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::path::PathBuf;
use tokio::io::AsyncWrite;

/// Where downloaded document content lives between runs.
pub trait Storage: Send + Sync {
    fn content_path(&self, workspace: &str, name: &str) -> PathBuf;

    /// Size of the cached copy, `None` when there is none.
    fn cached_len(
        &self,
        workspace: &str,
        name: &str,
    ) -> impl std::future::Future<Output = Option<u64>> + Send;

    fn create_file(
        &self,
        workspace: &str,
        name: &str,
    ) -> impl std::future::Future<Output = Result<(PathBuf, tokio::fs::File)>> + Send;
}

/// Connection settings for one CMIS server.
pub trait ConnectionSettings: Send + Sync {
    fn url(&self) -> &str;
    fn user(&self) -> &str;
    fn password(&self) -> &str;
    /// Workspace title or repository id; empty selects the first workspace.
    fn workspace(&self) -> &str;
}

#[async_trait]
pub trait FeedSource: Send + Sync {
    /// Entries of the feed at `url`, or of the root collection when `None`.
    async fn load_feed(&self, url: Option<&str>) -> Result<Vec<CmisItem>>;

    fn search_url(&self, query_type: QueryType, text: &str) -> Result<String>;

    /// URL to request for a folder's children feed.
    fn children_feed_url(&self, down_link: &str) -> String {
        down_link.to_string()
    }

    /// Streams the item's content into `out`, returning the byte count.
    async fn fetch_content(
        &self,
        item: &CmisItem,
        out: &mut (dyn AsyncWrite + Unpin + Send),
    ) -> Result<u64>;

    /// Name used to partition the content cache.
    fn workspace_key(&self) -> &str;
}
