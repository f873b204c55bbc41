//! `reqwest` implementation of [`FleetApi`].

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use fleetview_core::models::{GraphParams, GraphSnapshot, RobotSnapshot, TaskCount, TaskSnapshot};
use fleetview_core::{Error, FleetApi, FleetviewConfig, Result, ResultExt};

/// HTTP client for the simulation backend.
#[derive(Debug, Clone)]
pub struct FleetClient {
    base_url: Url,
    http: reqwest::Client,
}

impl FleetClient {
    /// Client for the configured server, with the configured timeout.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidConfig` if the server URL does not parse or the
    /// HTTP client cannot be built.
    pub fn new(config: &FleetviewConfig) -> Result<Self> {
        Self::with_timeout(&config.server_url, config.request_timeout())
    }

    /// # Errors
    ///
    /// Returns `Error::InvalidConfig` if `server` is not an absolute URL or
    /// the HTTP client cannot be built.
    pub fn with_timeout(server: &str, timeout: Duration) -> Result<Self> {
        let base_url = normalize_server(server)?;
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::invalid_config(format!("HTTP client: {e}")))?;
        Ok(Self { base_url, http })
    }

    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|e| Error::invalid_config(format!("endpoint '{path}': {e}")))
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.endpoint(path)?;
        debug!(%url, "GET");
        let response = self.http.get(url).send().await.map_err(transport_error)?;
        parse_json(response).await
    }

    async fn post_form<F: serde::Serialize + Sync + ?Sized>(&self, path: &str, form: &F) -> Result<()> {
        let url = self.endpoint(path)?;
        debug!(%url, "POST");
        let response = self
            .http
            .post(url)
            .form(form)
            .send()
            .await
            .map_err(transport_error)?;
        expect_success(response).await.map(|_| ())
    }

    async fn post_text(&self, path: &str) -> Result<String> {
        let url = self.endpoint(path)?;
        debug!(%url, "POST");
        let response = self.http.post(url).send().await.map_err(transport_error)?;
        expect_success(response).await
    }
}

#[async_trait]
impl FleetApi for FleetClient {
    async fn fetch_graph(&self) -> Result<GraphSnapshot> {
        self.get_json("graph").await
    }

    async fn generate_graph(&self, params: &GraphParams) -> Result<()> {
        self.post_form("gen_graph", &params.form_fields()).await
    }

    async fn fetch_robots(&self) -> Result<RobotSnapshot> {
        self.get_json("robots").await
    }

    async fn add_robot(&self, x: f64, y: f64) -> Result<()> {
        self.post_form("add_robot", &[("x", x), ("y", y)]).await
    }

    async fn remove_all_robots(&self) -> Result<()> {
        self.post_form("remove_robots", &[] as &[(&str, &str)]).await
    }

    async fn generate_tasks(&self, count: TaskCount) -> Result<()> {
        self.post_form("generate_tasks", &[("num_tasks", count.get())])
            .await
    }

    async fn fetch_tasks(&self) -> Result<TaskSnapshot> {
        self.get_json("tasks").await
    }

    async fn start_simulation(&self) -> Result<String> {
        self.post_text("start").await
    }

    async fn stop_simulation(&self) -> Option<String> {
        self.post_text("stop")
            .await
            .error_on_err("Failed to stop simulation")
    }
}

/// Parse the server address and make it usable as a join base.
fn normalize_server(server: &str) -> Result<Url> {
    let trimmed = server.trim_end_matches('/');
    Url::parse(&format!("{trimmed}/"))
        .map_err(|e| Error::invalid_config(format!("server '{server}': {e}")))
}

fn transport_error(err: reqwest::Error) -> Error {
    let status = err.status().map(|s| s.as_u16());
    if err.is_timeout() {
        return Error::transport(status, format!("request timed out: {err}"));
    }
    Error::transport(status, err.to_string())
}

/// Body text of a 2xx response; any other status is a transport error.
async fn expect_success(response: reqwest::Response) -> Result<String> {
    let status = response.status();
    let body = response.text().await.map_err(transport_error)?;
    if !status.is_success() {
        return Err(Error::transport(Some(status.as_u16()), body));
    }
    Ok(body)
}

async fn parse_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    let status = response.status().as_u16();
    let body = expect_success(response).await?;
    serde_json::from_str(&body)
        .map_err(|e| Error::transport(Some(status), format!("invalid response body: {e}")))
}
