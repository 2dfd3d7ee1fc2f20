//! Async ARM REST client plus its blocking `ResourceManager` facade.
//!
//! All calls go through `send`, which attaches the bearer token and traces
//! method / URL / status. List calls follow `nextLink`; mutating calls that
//! answer `202 Accepted` are polled until the operation settles.

use reqwest::header::HeaderMap;
use reqwest::{Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::json;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::time::Instant;
use url::Url;

use super::ResourceManager;
use super::credential::DefaultCredential;
use super::error::{ArmError, ArmResult};
use super::model::{
    AsyncOperationStatus, ErrorEnvelope, GenericResource, Location, Page, ResourceGroup, Tags,
    TagsPatch, TagsResource,
};

pub const RESOURCES_API_VERSION: &str = "2021-04-01";
pub const SUBSCRIPTIONS_API_VERSION: &str = "2022-12-01";
pub const DEFAULT_ENDPOINT: &str = "https://management.azure.com";

const TAGS_PATH: [&str; 4] = ["providers", "Microsoft.Resources", "tags", "default"];

#[derive(Debug, Clone)]
pub struct ClientOptions {
    pub endpoint: Url,
    pub subscription_id: String,
    pub poll_interval: Duration,
    pub operation_timeout: Duration,
}

pub struct ArmClient {
    http: reqwest::Client,
    credential: DefaultCredential,
    options: ClientOptions,
    runtime: Handle,
}

impl ArmClient {
    pub fn new(
        options: ClientOptions,
        credential: DefaultCredential,
        http: reqwest::Client,
        runtime: Handle,
    ) -> Self {
        Self {
            http,
            credential,
            options,
            runtime,
        }
    }

    /* ---- URL building ---- */

    /// `{endpoint}/subscriptions/{sub}/{segments...}?api-version={version}`
    fn subscription_url(&self, segments: &[&str], api_version: &str) -> ArmResult<Url> {
        check_segments(segments.iter().copied())?;
        let mut url = self.options.endpoint.clone();
        url.path_segments_mut()
            .map_err(|_| ArmError::Decode(format!("endpoint cannot be a base: {}", self.options.endpoint)))?
            .pop_if_empty()
            .extend(["subscriptions", self.options.subscription_id.as_str()])
            .extend(segments);
        url.query_pairs_mut().append_pair("api-version", api_version);
        Ok(url)
    }

    /// `{endpoint}{scope}/{segments...}` where `scope` is a resource id.
    fn scope_url(&self, scope: &str, segments: &[&str], api_version: &str) -> ArmResult<Url> {
        let scope_segments: Vec<&str> = scope.split('/').filter(|s| !s.is_empty()).collect();
        check_segments(scope_segments.iter().chain(segments).copied())?;
        let mut url = self.options.endpoint.clone();
        url.path_segments_mut()
            .map_err(|_| ArmError::Decode(format!("endpoint cannot be a base: {}", self.options.endpoint)))?
            .pop_if_empty()
            .extend(scope_segments)
            .extend(segments);
        url.query_pairs_mut().append_pair("api-version", api_version);
        Ok(url)
    }

    fn group_url(&self, name: &str) -> ArmResult<Url> {
        self.subscription_url(&["resourcegroups", name], RESOURCES_API_VERSION)
    }

    /* ---- Transport ---- */

    async fn send(
        &self,
        method: Method,
        url: Url,
        body: Option<&serde_json::Value>,
    ) -> ArmResult<Response> {
        let token = self.credential.token().await?;
        tracing::debug!(%method, %url, "arm request");
        let mut req = self.http.request(method.clone(), url.clone()).bearer_auth(token);
        if let Some(b) = body {
            req = req.json(b);
        }
        let resp = req.send().await?;
        tracing::debug!(%method, %url, status = resp.status().as_u16(), "arm response");
        Ok(resp)
    }

    async fn error_from(resp: Response) -> ArmError {
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        match serde_json::from_str::<ErrorEnvelope>(&body) {
            Ok(env) => ArmError::api(status.as_u16(), env.error.code, env.error.message),
            Err(_) => ArmError::api(
                status.as_u16(),
                status.canonical_reason().unwrap_or("Error"),
                body.trim(),
            ),
        }
    }

    async fn json<T: DeserializeOwned>(resp: Response) -> ArmResult<T> {
        if !resp.status().is_success() {
            return Err(Self::error_from(resp).await);
        }
        let body = resp.text().await?;
        serde_json::from_str(&body).map_err(|e| ArmError::Decode(e.to_string()))
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> ArmResult<T> {
        let resp = self.send(Method::GET, url, None).await?;
        Self::json(resp).await
    }

    /// Collect every page of a list response.
    async fn list_all<T: DeserializeOwned>(&self, first: Url) -> ArmResult<Vec<T>> {
        let mut items = Vec::new();
        let mut next = Some(first);
        while let Some(url) = next {
            let page: Page<T> = self.get_json(url).await?;
            items.extend(page.value);
            next = match page.next_link.filter(|l| !l.is_empty()) {
                Some(link) => Some(Url::parse(&link)?),
                None => None,
            };
        }
        Ok(items)
    }

    /* ---- Long-running operations ---- */

    /// Wait for a `202 Accepted` operation to settle.
    ///
    /// The last sleep is cut short at the deadline so the operation is always
    /// polled at least once before `Timeout`.
    async fn wait_for_operation(&self, headers: &HeaderMap) -> ArmResult<()> {
        let async_op = header_url(headers, "azure-asyncoperation");
        let location = header_url(headers, "location");
        let Some(target) = async_op.map(Poll::AsyncOperation).or(location.map(Poll::Location)) else {
            return Ok(());
        };

        let timeout = self.options.operation_timeout;
        let deadline = Instant::now() + timeout;
        let mut delay = retry_after(headers).unwrap_or(self.options.poll_interval);
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            tokio::time::sleep(delay.min(remaining)).await;

            match self.poll_operation(&target).await? {
                Some(next) => delay = next,
                None => return Ok(()),
            }
            if Instant::now() >= deadline {
                return Err(ArmError::Timeout(timeout));
            }
        }
    }

    /// One status check; `Some(delay)` while the operation is still running.
    async fn poll_operation(&self, target: &Poll) -> ArmResult<Option<Duration>> {
        match target {
            Poll::AsyncOperation(url) => {
                let resp = self.send(Method::GET, url.clone(), None).await?;
                let next = retry_after(resp.headers()).unwrap_or(self.options.poll_interval);
                let status: AsyncOperationStatus = Self::json(resp).await?;
                let state = status.status.clone();
                match state.as_str() {
                    "Succeeded" => Ok(None),
                    "Failed" | "Canceled" => Err(operation_failed(status)),
                    other => {
                        tracing::trace!(status = other, "operation still running");
                        Ok(Some(next))
                    }
                }
            }
            Poll::Location(url) => {
                let resp = self.send(Method::GET, url.clone(), None).await?;
                match resp.status() {
                    StatusCode::ACCEPTED => {
                        tracing::trace!("operation still running");
                        Ok(Some(
                            retry_after(resp.headers()).unwrap_or(self.options.poll_interval),
                        ))
                    }
                    s if s.is_success() => Ok(None),
                    _ => Err(Self::error_from(resp).await),
                }
            }
        }
    }

    /* ---- Operations ---- */

    pub async fn list_groups_async(&self) -> ArmResult<Vec<ResourceGroup>> {
        let url = self.subscription_url(&["resourcegroups"], RESOURCES_API_VERSION)?;
        self.list_all(url).await
    }

    pub async fn group_exists_async(&self, name: &str) -> ArmResult<bool> {
        // These would address the collection itself, which always exists.
        if !is_path_segment(name) {
            return Ok(false);
        }
        let resp = self.send(Method::HEAD, self.group_url(name)?, None).await?;
        match resp.status() {
            StatusCode::NOT_FOUND => Ok(false),
            s if s.is_success() => Ok(true),
            _ => Err(Self::error_from(resp).await),
        }
    }

    pub async fn get_group_async(&self, name: &str) -> ArmResult<ResourceGroup> {
        self.get_json(self.group_url(name)?).await
    }

    pub async fn create_group_async(&self, name: &str, location: &str) -> ArmResult<ResourceGroup> {
        let body = json!({ "location": location });
        let resp = self
            .send(Method::PUT, self.group_url(name)?, Some(&body))
            .await?;
        Self::json(resp).await
    }

    pub async fn delete_group_async(&self, name: &str) -> ArmResult<()> {
        let resp = self.send(Method::DELETE, self.group_url(name)?, None).await?;
        match resp.status() {
            StatusCode::ACCEPTED => self.wait_for_operation(resp.headers()).await,
            s if s.is_success() => Ok(()),
            _ => Err(Self::error_from(resp).await),
        }
    }

    pub async fn list_locations_async(&self) -> ArmResult<Vec<Location>> {
        let url = self.subscription_url(&["locations"], SUBSCRIPTIONS_API_VERSION)?;
        self.list_all(url).await
    }

    pub async fn get_tags_async(&self, scope: &str) -> ArmResult<Tags> {
        let url = self.scope_url(scope, &TAGS_PATH, RESOURCES_API_VERSION)?;
        let resource: TagsResource = self.get_json(url).await?;
        Ok(resource.into_tags())
    }

    pub async fn patch_tags_async(&self, scope: &str, patch: &TagsPatch) -> ArmResult<Tags> {
        let url = self.scope_url(scope, &TAGS_PATH, RESOURCES_API_VERSION)?;
        let body = serde_json::to_value(patch).map_err(|e| ArmError::Decode(e.to_string()))?;
        let resp = self.send(Method::PATCH, url, Some(&body)).await?;
        if resp.status() == StatusCode::ACCEPTED {
            self.wait_for_operation(resp.headers()).await?;
            return self.get_tags_async(scope).await;
        }
        let resource: TagsResource = Self::json(resp).await?;
        Ok(resource.into_tags())
    }

    pub async fn list_resources_async(&self, group: &str) -> ArmResult<Vec<GenericResource>> {
        let mut url = self.subscription_url(&["resourceGroups", group, "resources"], RESOURCES_API_VERSION)?;
        url.query_pairs_mut()
            .append_pair("$expand", "createdTime,changedTime");
        self.list_all(url).await
    }
}

impl ResourceManager for ArmClient {
    fn list_groups(&self) -> ArmResult<Vec<ResourceGroup>> {
        self.runtime.block_on(self.list_groups_async())
    }

    fn group_exists(&self, name: &str) -> ArmResult<bool> {
        self.runtime.block_on(self.group_exists_async(name))
    }

    fn get_group(&self, name: &str) -> ArmResult<ResourceGroup> {
        self.runtime.block_on(self.get_group_async(name))
    }

    fn create_group(&self, name: &str, location: &str) -> ArmResult<ResourceGroup> {
        self.runtime.block_on(self.create_group_async(name, location))
    }

    fn delete_group(&self, name: &str) -> ArmResult<()> {
        self.runtime.block_on(self.delete_group_async(name))
    }

    fn list_locations(&self) -> ArmResult<Vec<Location>> {
        self.runtime.block_on(self.list_locations_async())
    }

    fn get_tags(&self, scope: &str) -> ArmResult<Tags> {
        self.runtime.block_on(self.get_tags_async(scope))
    }

    fn patch_tags(&self, scope: &str, patch: &TagsPatch) -> ArmResult<Tags> {
        self.runtime.block_on(self.patch_tags_async(scope, patch))
    }

    fn list_resources(&self, group: &str) -> ArmResult<Vec<GenericResource>> {
        self.runtime.block_on(self.list_resources_async(group))
    }
}

/// Where a `202 Accepted` operation reports its progress.
enum Poll {
    AsyncOperation(Url),
    Location(Url),
}

fn operation_failed(status: AsyncOperationStatus) -> ArmError {
    let (code, message) = match status.error {
        Some(e) => (e.code, e.message),
        None => (status.status.clone(), "no error details returned".to_string()),
    };
    ArmError::OperationFailed {
        status: status.status,
        code,
        message,
    }
}

/// `url` drops `.` and `..` while extending a path, so such names never reach the service.
fn is_path_segment(s: &str) -> bool {
    !matches!(s, "" | "." | "..")
}

fn check_segments<'a>(segments: impl IntoIterator<Item = &'a str>) -> ArmResult<()> {
    match segments.into_iter().find(|s| !is_path_segment(s)) {
        Some(bad) => Err(ArmError::InvalidName(bad.to_string())),
        None => Ok(()),
    }
}

fn header_url(headers: &HeaderMap, name: &str) -> Option<Url> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| Url::parse(s).ok())
}

/// `Retry-After` in seconds; the HTTP-date form is not used by ARM.
fn retry_after(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
}
