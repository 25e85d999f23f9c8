use relay_core::api::{MergeRequest, Note, Release};
use relay_core::{ApiError, MergeRequestApi, ReleaseApi, SignalSource, TagInfo, TagSource};
use reqwest::{Method, RequestBuilder, Response, Url};
use secrecy::ExposeSecret;
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::config::GitlabConfig;
use crate::error::GitlabError;

const PER_PAGE: &str = "100";
const NEXT_PAGE_HEADER: &str = "x-next-page";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ProtectedBranch {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Project {
    pub id: u64,
    pub path_with_namespace: String,
}

/// REST client for one GitLab project.
pub struct GitlabClient {
    http: reqwest::Client,
    config: GitlabConfig,
}

impl GitlabClient {
    pub fn new(config: GitlabConfig) -> Result<Self, GitlabError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("relay/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|source| GitlabError::Client { source })?;
        Ok(Self { http, config })
    }

    pub fn from_signals(signals: &impl SignalSource) -> Result<Self, GitlabError> {
        Self::new(GitlabConfig::from_signals(signals)?)
    }

    pub fn config(&self) -> &GitlabConfig {
        &self.config
    }

    /// `{api}/projects/{id}/{segments...}` with every segment percent-encoded,
    /// so `group/app` becomes `group%2Fapp`.
    pub fn project_url(&self, segments: &[&str]) -> Result<Url, GitlabError> {
        let mut url = self.config.api_url.clone();
        url.path_segments_mut()
            .map_err(|()| GitlabError::InvalidBaseUrl {
                url: self.config.api_url.to_string(),
                reason: "URL cannot be a base".to_owned(),
            })?
            .pop_if_empty()
            .push("projects")
            .push(&self.config.project_id)
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.http.request(method, url).header(
            self.config.token_kind.header(),
            self.config.token.expose_secret(),
        )
    }

    async fn send(
        &self,
        operation: &'static str,
        request: RequestBuilder,
    ) -> Result<Response, GitlabError> {
        let response = request
            .send()
            .await
            .map_err(|source| GitlabError::Request { operation, source })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                tracing::debug!(operation, error = %e, "error body unreadable");
                String::new()
            }
        };
        tracing::debug!(operation, status = status.as_u16(), "gitlab request rejected");
        Err(GitlabError::Status {
            operation,
            status: status.as_u16(),
            body,
        })
    }

    async fn json<T: DeserializeOwned>(
        operation: &'static str,
        response: Response,
    ) -> Result<T, GitlabError> {
        response
            .json()
            .await
            .map_err(|source| GitlabError::Decode { operation, source })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        url: Url,
    ) -> Result<T, GitlabError> {
        let response = self.send(operation, self.request(Method::GET, url)).await?;
        Self::json(operation, response).await
    }

    /// GET every page of a list endpoint, following `X-Next-Page`.
    async fn get_all<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        mut url: Url,
    ) -> Result<Vec<T>, GitlabError> {
        url.query_pairs_mut().append_pair("per_page", PER_PAGE);
        let mut items = Vec::new();
        let mut page = String::from("1");

        loop {
            let mut page_url = url.clone();
            page_url.query_pairs_mut().append_pair("page", &page);
            let response = self
                .send(operation, self.request(Method::GET, page_url))
                .await?;
            let next = next_page(&response);
            let mut batch: Vec<T> = Self::json(operation, response).await?;
            items.append(&mut batch);

            match next {
                Some(n) => page = n,
                None => break,
            }
        }

        tracing::debug!(operation, count = items.len(), "pages collected");
        Ok(items)
    }

    async fn write(
        &self,
        operation: &'static str,
        method: Method,
        url: Url,
        body: &serde_json::Value,
    ) -> Result<(), GitlabError> {
        self.send(operation, self.request(method, url).json(body))
            .await?;
        Ok(())
    }

    pub async fn protected_branches(&self) -> Result<Vec<ProtectedBranch>, GitlabError> {
        let url = self.project_url(&["protected_branches"])?;
        self.get_all("list protected branches", url).await
    }

    /// Fetch the project itself. Used to verify credentials.
    pub async fn project(&self) -> Result<Project, GitlabError> {
        let url = self.project_url(&[])?;
        self.get_json("get project", url).await
    }
}

fn next_page(response: &Response) -> Option<String> {
    let value = response.headers().get(NEXT_PAGE_HEADER)?;
    match value.to_str() {
        Ok(v) if !v.trim().is_empty() => Some(v.trim().to_owned()),
        Ok(_) => None,
        Err(e) => {
            tracing::warn!(error = %e, "ignoring malformed pagination header");
            None
        }
    }
}

impl TagSource for GitlabClient {
    async fn list_tags(&self) -> Result<Vec<TagInfo>, ApiError> {
        let url = self.project_url(&["repository", "tags"])?;
        Ok(self.get_all("list tags", url).await?)
    }
}

impl ReleaseApi for GitlabClient {
    async fn create_tag(&self, name: &str, ref_name: &str, message: &str) -> Result<(), ApiError> {
        let url = self.project_url(&["repository", "tags"])?;
        let mut body = serde_json::json!({ "tag_name": name, "ref": ref_name });
        if !message.is_empty() {
            body["message"] = serde_json::Value::from(message);
        }
        self.write("create tag", Method::POST, url, &body).await?;
        tracing::info!(tag = name, ref_name, "tag created");
        Ok(())
    }

    async fn create_release(
        &self,
        tag_name: &str,
        ref_name: &str,
        name: &str,
        description: &str,
    ) -> Result<(), ApiError> {
        let url = self.project_url(&["releases"])?;
        let body = serde_json::json!({
            "tag_name": tag_name,
            "ref": ref_name,
            "name": name,
            "description": description,
        });
        self.write("create release", Method::POST, url, &body)
            .await?;
        tracing::info!(tag = tag_name, ref_name, name, "release created");
        Ok(())
    }

    async fn latest_release(&self) -> Result<Option<Release>, ApiError> {
        let mut url = self.project_url(&["releases"])?;
        url.query_pairs_mut()
            .append_pair("order_by", "created_at")
            .append_pair("sort", "desc")
            .append_pair("per_page", "1");
        let releases: Vec<Release> = self.get_json("latest release", url).await?;
        Ok(releases.into_iter().next())
    }
}

impl MergeRequestApi for GitlabClient {
    async fn description(&self, iid: &str) -> Result<String, ApiError> {
        let url = self.project_url(&["merge_requests", iid])?;
        let mr: MergeRequest = self.get_json("get merge request", url).await?;
        Ok(mr.description.unwrap_or_default())
    }

    async fn update_description(&self, iid: &str, description: &str) -> Result<(), ApiError> {
        let url = self.project_url(&["merge_requests", iid])?;
        let body = serde_json::json!({ "description": description });
        self.write("update merge request", Method::PUT, url, &body)
            .await?;
        tracing::info!(merge_request = iid, "description updated");
        Ok(())
    }

    async fn notes(&self, iid: &str) -> Result<Vec<Note>, ApiError> {
        let url = self.project_url(&["merge_requests", iid, "notes"])?;
        Ok(self.get_all("list merge request notes", url).await?)
    }

    async fn post_note(&self, iid: &str, body: &str) -> Result<(), ApiError> {
        let url = self.project_url(&["merge_requests", iid, "notes"])?;
        let payload = serde_json::json!({ "body": body });
        self.write("create merge request note", Method::POST, url, &payload)
            .await?;
        tracing::info!(merge_request = iid, "comment posted");
        Ok(())
    }

    async fn latest_open(&self) -> Result<Option<MergeRequest>, ApiError> {
        let mut url = self.project_url(&["merge_requests"])?;
        url.query_pairs_mut()
            .append_pair("state", "opened")
            .append_pair("order_by", "created_at")
            .append_pair("sort", "desc")
            .append_pair("per_page", "1");
        let open: Vec<MergeRequest> = self.get_json("latest open merge request", url).await?;
        Ok(open.into_iter().next())
    }
}
