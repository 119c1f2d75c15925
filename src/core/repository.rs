//! HTTP access to a CMIS AtomPub endpoint.

use crate::config::toml_config::DisplayPrefs;
use crate::core::feed::{self, Workspace};
use crate::core::query;
use crate::domain::model::{CmisItem, QueryType};
use crate::domain::ports::{ConnectionSettings, FeedSource};
use crate::utils::error::{CmisError, Result};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use std::time::Duration;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use url::Url;

const USER_AGENT: &str = concat!("cmis-browser/", env!("CARGO_PKG_VERSION"));
const DEFAULT_TIMEOUT_SECS: u64 = 30;

pub fn create_client(timeout_secs: u64) -> Result<Client> {
    let client = Client::builder()
        .user_agent(USER_AGENT)
        .timeout(Duration::from_secs(timeout_secs))
        .build()?;
    Ok(client)
}

/// A connection to one workspace of a CMIS server.
pub struct CmisRepository {
    client: Client,
    user: String,
    password: String,
    workspace: Workspace,
    root_url: String,
    display: DisplayPrefs,
}

impl CmisRepository {
    /// Reads the service document and binds to the configured workspace.
    pub async fn connect(settings: &dyn ConnectionSettings, display: DisplayPrefs) -> Result<Self> {
        let client = create_client(DEFAULT_TIMEOUT_SECS)?;
        Self::connect_with_client(client, settings, display).await
    }

    pub async fn connect_with_client(
        client: Client,
        settings: &dyn ConnectionSettings,
        display: DisplayPrefs,
    ) -> Result<Self> {
        let url = settings.url();
        tracing::debug!("Loading service document from {}", url);

        let body = fetch_text(&client, settings.user(), settings.password(), url).await?;
        let service =
            feed::parse_service_document(&body).map_err(|e| CmisError::feed_load(url, e))?;

        let workspace = service
            .workspace(settings.workspace())
            .cloned()
            .ok_or_else(|| CmisError::WorkspaceNotFound {
                name: settings.workspace().to_string(),
            })?;

        let root_url = workspace.collection_url("root").to_string();
        tracing::info!(
            "Connected to workspace '{}' ({} collections, root: {})",
            workspace.title,
            workspace.collections.len(),
            if root_url.is_empty() { "<none>" } else { root_url.as_str() }
        );

        Ok(Self {
            client,
            user: settings.user().to_string(),
            password: settings.password().to_string(),
            workspace,
            root_url,
            display,
        })
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    pub fn root_url(&self) -> &str {
        &self.root_url
    }

    /// Appends the display parameters to a feed URL when they are enabled.
    pub fn with_feed_params(&self, feed_url: &str) -> String {
        let pairs = self.display.query_pairs();
        if pairs.is_empty() {
            return feed_url.to_string();
        }

        match Url::parse(feed_url) {
            Ok(mut url) => {
                {
                    let mut query = url.query_pairs_mut();
                    for (key, value) in &pairs {
                        query.append_pair(key, value);
                    }
                }
                url.to_string()
            }
            Err(e) => {
                tracing::warn!("Not adding feed parameters to '{}': {}", feed_url, e);
                feed_url.to_string()
            }
        }
    }

    pub fn children_url(&self, item: &CmisItem) -> Option<String> {
        item.has_children()
            .then(|| self.with_feed_params(&item.down_link))
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        authorize(request, &self.user, &self.password)
    }
}

fn authorize(request: RequestBuilder, user: &str, password: &str) -> RequestBuilder {
    if user.is_empty() {
        request
    } else {
        request.basic_auth(user, Some(password))
    }
}

async fn fetch_text(client: &Client, user: &str, password: &str, url: &str) -> Result<String> {
    let response = authorize(client.get(url), user, password)
        .send()
        .await
        .map_err(|e| CmisError::feed_load(url, e))?;

    tracing::debug!("GET {} -> {}", url, response.status());

    let response = response
        .error_for_status()
        .map_err(|e| CmisError::feed_load(url, e))?;

    response.text().await.map_err(|e| CmisError::feed_load(url, e))
}

#[async_trait]
impl FeedSource for CmisRepository {
    async fn load_feed(&self, url: Option<&str>) -> Result<Vec<CmisItem>> {
        let feed_url = match url {
            Some(url) => url.to_string(),
            None if self.root_url.is_empty() => {
                return Err(CmisError::feed_load(
                    self.workspace.title.clone(),
                    "workspace has no root collection",
                ))
            }
            None => self.with_feed_params(&self.root_url),
        };

        let body = fetch_text(&self.client, &self.user, &self.password, &feed_url).await?;
        let items = feed::parse_feed(&body).map_err(|e| CmisError::feed_load(&feed_url, e))?;

        tracing::debug!("Feed {} has {} entries", feed_url, items.len());
        Ok(items)
    }

    fn children_feed_url(&self, down_link: &str) -> String {
        self.with_feed_params(down_link)
    }

    fn search_url(&self, query_type: QueryType, text: &str) -> Result<String> {
        let template = self
            .workspace
            .uri_template("query")
            .ok_or_else(|| CmisError::NoQueryTemplate {
                kind: "query".to_string(),
            })?;

        Ok(query::search_url(template, query_type, text))
    }

    async fn fetch_content(
        &self,
        item: &CmisItem,
        out: &mut (dyn AsyncWrite + Unpin + Send),
    ) -> Result<u64> {
        if item.content_url.is_empty() {
            return Err(CmisError::NotFound {
                what: "content stream",
                key: item.title.clone(),
            });
        }

        let mut response = self
            .authorize(self.client.get(&item.content_url))
            .send()
            .await?
            .error_for_status()?;

        let mut written = 0u64;
        while let Some(chunk) = response.chunk().await? {
            out.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        out.flush().await?;

        tracing::debug!("Fetched {} bytes for '{}'", written, item.title);
        Ok(written)
    }

    fn workspace_key(&self) -> &str {
        if self.workspace.repository_id.is_empty() {
            &self.workspace.title
        } else {
            &self.workspace.repository_id
        }
    }
}
