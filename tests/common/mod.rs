#![allow(dead_code)]

use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::StatusCode;
use serde_json::{json, Value};

use order_desk_api::config::{AppConfig, StorageBackend};
use order_desk_api::database::{MemoryStore, Stores};
use order_desk_api::AppState;

pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    pub client: reqwest::Client,
}

impl TestServer {
    /// Serve a fresh in-memory instance of the API on an unused port.
    ///
    /// The server runs on the calling test's runtime, so every test gets its
    /// own isolated store.
    pub async fn start() -> Result<Self> {
        Self::start_with(|state| state).await
    }

    /// Like [`TestServer::start`], letting the caller swap collaborators
    /// (e.g. the notifier) before the router is built
    pub async fn start_with(customize: impl FnOnce(AppState) -> AppState) -> Result<Self> {
        let mut config = AppConfig::development();
        config.database.backend = StorageBackend::Memory;
        config.api.enable_request_logging = false;

        let state = customize(AppState::new(Stores::from_backend(MemoryStore::new()), &config)?);
        let app = order_desk_api::app(state, &config);

        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
            .await
            .with_context(|| format!("failed to bind port {}", port))?;

        tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        let server = Self {
            port,
            base_url: format!("http://127.0.0.1:{}", port),
            client: reqwest::Client::new(),
        };
        server.wait_ready(Duration::from_secs(5)).await?;
        Ok(server)
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            if let Ok(resp) = self.client.get(self.url("/health")).send().await {
                if resp.status() == StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(25)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn post(&self, path: &str, body: Value) -> Result<(StatusCode, Value)> {
        let res = self.client.post(self.url(path)).json(&body).send().await?;
        read(res).await
    }

    pub async fn send(
        &self,
        method: reqwest::Method,
        path: &str,
        token: &str,
        body: Option<Value>,
    ) -> Result<(StatusCode, Value)> {
        let mut req = self.client.request(method, self.url(path)).bearer_auth(token);
        if let Some(body) = body {
            req = req.json(&body);
        }
        read(req.send().await?).await
    }

    pub async fn get_auth(&self, path: &str, token: &str) -> Result<(StatusCode, Value)> {
        self.send(reqwest::Method::GET, path, token, None).await
    }

    pub async fn register(&self, name: &str, email: &str, password: &str) -> Result<(StatusCode, Value)> {
        self.post("/register", json!({ "name": name, "email": email, "password": password }))
            .await
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<(StatusCode, Value)> {
        self.post("/login", json!({ "email": email, "password": password })).await
    }

    /// Register a fresh user and return a bearer token for it
    pub async fn token_for(&self, email: &str) -> Result<String> {
        let (status, _) = self.register("Test User", email, "password123").await?;
        anyhow::ensure!(status == StatusCode::CREATED, "register failed: {}", status);

        let (status, body) = self.login(email, "password123").await?;
        anyhow::ensure!(status == StatusCode::OK, "login failed: {}", status);
        body["access_token"]
            .as_str()
            .map(str::to_string)
            .context("login response without access_token")
    }

    /// Create a customer through the public route and return its record
    pub async fn create_customer(&self, name: &str, email: &str) -> Result<Value> {
        let (status, body) = self.post("/customers", json!({ "name": name, "email": email })).await?;
        anyhow::ensure!(status == StatusCode::CREATED, "create customer failed: {} {}", status, body);
        Ok(body["data"].clone())
    }
}

/// Status plus JSON body; an empty body reads as `null`
async fn read(res: reqwest::Response) -> Result<(StatusCode, Value)> {
    let status = res.status();
    let text = res.text().await?;
    let body = if text.is_empty() {
        Value::Null
    } else {
        serde_json::from_str(&text).with_context(|| format!("non-JSON body: {}", text))?
    };
    Ok((status, body))
}
