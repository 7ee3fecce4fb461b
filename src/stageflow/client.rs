// SPDX-License-Identifier: MIT

//! HTTP clients: one for a running stageflow server, one for an assistant
//! runtime exposing `POST /runs/wait`.

use reqwest::{Client, Method, Response};
use serde::de::DeserializeOwned;
use serde_json::{json, Map, Value};
use url::Url;

use crate::adk::error::{Result, StageflowError};
use crate::stageflow::pipeline::{BasicMethod, BasicResult, TextAnalysis};

/// Parse a base URL so that relative joins append to its path
fn base_url(raw: &str) -> Result<Url> {
    let mut url = Url::parse(raw)?;
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

/// Turn a non-2xx response into `StageflowError::Api`, preferring the
/// server's `detail` field as the message
async fn check(resp: Response) -> Result<Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }

    let text = resp.text().await.unwrap_or_default();
    let message = serde_json::from_str::<Value>(&text)
        .ok()
        .and_then(|body| body.get("detail").and_then(Value::as_str).map(str::to_string))
        .unwrap_or(text);
    Err(StageflowError::api(status.as_u16(), message))
}

/// Client for the stageflow HTTP API
#[derive(Clone)]
pub struct AnalysisClient {
    client: Client,
    base_url: Url,
}

impl AnalysisClient {
    pub fn new(base: &str) -> Result<Self> {
        Ok(Self {
            client: Client::new(),
            base_url: base_url(base)?,
        })
    }

    async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<T> {
        let url = self.base_url.join(path)?;
        log::debug!("{} {}", method, url);

        let mut req = self
            .client
            .request(method, url)
            .header("Accept", "application/json");
        if let Some(b) = body {
            req = req.json(&b);
        }

        let resp = check(req.send().await?).await?;
        Ok(resp.json().await?)
    }

    pub async fn root(&self) -> Result<Value> {
        self.request(Method::GET, "", None).await
    }

    pub async fn health(&self) -> Result<Value> {
        self.request(Method::GET, "api/health", None).await
    }

    pub async fn run_basic(&self, method: BasicMethod, input: &str) -> Result<BasicResult> {
        self.request(
            Method::POST,
            &format!("basic/{}", method),
            Some(json!({ "input": input })),
        )
        .await
    }

    pub async fn analyze(&self, text: &str) -> Result<TextAnalysis> {
        self.request(
            Method::POST,
            "practical/text-analysis",
            Some(json!({ "text": text })),
        )
        .await
    }
}

/// Client for an assistant runtime's stateless runs endpoint
#[derive(Clone)]
pub struct RunsClient {
    client: Client,
    base_url: Url,
    api_key: Option<String>,
}

impl RunsClient {
    pub fn new(base: &str, api_key: Option<String>) -> Result<Self> {
        Ok(Self {
            client: Client::new(),
            base_url: base_url(base)?,
            api_key,
        })
    }

    /// Start a thread-less run on `assistant_id` and wait for its final state
    pub async fn wait(
        &self,
        assistant_id: &str,
        input: Value,
        metadata: Option<Value>,
        configurable: Option<Value>,
    ) -> Result<Value> {
        let mut payload = Map::new();
        payload.insert("thread_id".to_string(), Value::Null);
        payload.insert("assistant_id".to_string(), json!(assistant_id));
        payload.insert("input".to_string(), input);
        if let Some(metadata) = metadata {
            payload.insert("metadata".to_string(), metadata);
        }
        if let Some(configurable) = configurable {
            payload.insert("config".to_string(), json!({ "configurable": configurable }));
        }

        let url = self.base_url.join("runs/wait")?;
        log::info!("Waiting on run for assistant {} at {}", assistant_id, url);

        let mut req = self.client.post(url).json(&payload);
        if let Some(key) = &self.api_key {
            req = req.header("X-Api-Key", key);
        }

        let resp = check(req.send().await?).await?;
        Ok(resp.json().await?)
    }

    /// Content of the last entry in a run's `messages` list
    pub fn last_message_content(run: &Value) -> Option<&str> {
        run.get("messages")?
            .as_array()?
            .last()?
            .get("content")?
            .as_str()
    }
}
