#![allow(dead_code)]

use std::process::{Child, Command, Stdio};
use std::sync::OnceLock;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use reqwest::StatusCode;

use linkup_api::auth::{generate_jwt, Claims};

/// Secret shared between the spawned server and locally-minted test tokens.
pub const JWT_SECRET: &str = "integration-test-secret";

static SERVER: OnceLock<Option<TestServer>> = OnceLock::new();

pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    child: Child,
}

impl TestServer {
    fn spawn() -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        // Cargo builds the server binary for integration tests; spawn it directly
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_linkup-api"));
        cmd.env("LINKUP_API_PORT", port.to_string())
            .env("JWT_SECRET", JWT_SECRET)
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        // Inherit the rest of the environment so DATABASE_URL flows through
        let child = cmd.spawn().context("failed to spawn server binary")?;

        Ok(Self {
            port,
            base_url,
            child,
        })
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let client = reqwest::Client::new();
        let deadline = Instant::now() + timeout;
        loop {
            if Instant::now() > deadline {
                break;
            }
            let url = format!("{}/health", self.base_url);
            if let Ok(resp) = client.get(&url).send().await {
                if resp.status() == StatusCode::OK
                    || resp.status() == StatusCode::SERVICE_UNAVAILABLE
                {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(150)).await;
        }
        anyhow::bail!(
            "server did not become ready on {} within {:?}",
            self.base_url,
            timeout
        )
    }
}

/// Spawn (once per test binary) and wait for the server. Returns None when no
/// DATABASE_URL is configured, so tests skip instead of failing.
pub async fn ensure_server() -> Result<Option<&'static TestServer>> {
    if std::env::var("DATABASE_URL").is_err() {
        return Ok(None);
    }

    let server = SERVER
        .get_or_init(|| Some(TestServer::spawn().expect("failed to spawn server binary")))
        .as_ref()
        .expect("server slot initialized");
    server.wait_ready(Duration::from_secs(15)).await?;
    Ok(Some(server))
}

/// Mint a bearer token for an identity the way the external provider would.
pub fn token_for(user_id: &str) -> String {
    let now = chrono::Utc::now();
    let claims = Claims {
        sub: user_id.to_string(),
        org_id: None,
        email: format!("{user_id}@test.local"),
        first_name: Some("Test".to_string()),
        last_name: Some("User".to_string()),
        image_url: None,
        exp: (now + chrono::Duration::hours(1)).timestamp(),
        iat: now.timestamp(),
    };
    generate_jwt(&claims, JWT_SECRET).expect("failed to mint test token")
}

/// Unique suffix so repeated runs against a persistent database never trip
/// uniqueness constraints.
pub fn unique(tag: &str) -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock before epoch")
        .as_nanos();
    format!("{tag}_{nanos}")
}

/// Authenticated client wrapper for a single identity.
pub struct Api {
    pub client: reqwest::Client,
    pub base_url: String,
    pub token: String,
}

impl Api {
    pub fn new(server: &TestServer, user_id: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: server.base_url.clone(),
            token: token_for(user_id),
        }
    }

    pub async fn get(&self, path: &str) -> Result<reqwest::Response> {
        Ok(self
            .client
            .get(format!("{}{}", self.base_url, path))
            .bearer_auth(&self.token)
            .send()
            .await?)
    }

    pub async fn post(&self, path: &str, body: &serde_json::Value) -> Result<reqwest::Response> {
        Ok(self
            .client
            .post(format!("{}{}", self.base_url, path))
            .bearer_auth(&self.token)
            .json(body)
            .send()
            .await?)
    }

    pub async fn put(&self, path: &str, body: &serde_json::Value) -> Result<reqwest::Response> {
        Ok(self
            .client
            .put(format!("{}{}", self.base_url, path))
            .bearer_auth(&self.token)
            .json(body)
            .send()
            .await?)
    }

    pub async fn delete(&self, path: &str) -> Result<reqwest::Response> {
        Ok(self
            .client
            .delete(format!("{}{}", self.base_url, path))
            .bearer_auth(&self.token)
            .send()
            .await?)
    }
}
