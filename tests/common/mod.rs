#![allow(dead_code)]

use anyhow::{Context, Result};
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;

use todo_api::config::AppConfig;
use todo_api::database::manager::Backend;
use todo_api::database::{DatabaseManager, PgStore, Store};
use todo_api::server;
use todo_api::state::AppState;

pub const PASSWORD: &str = "password123";

pub struct TestServer {
    pub base_url: String,
    pub config: AppConfig,
    pub client: Client,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Register `username` with the shared test password and return the user object
    pub async fn register(&self, username: &str) -> Result<Value> {
        let res = self
            .client
            .post(self.url("/user"))
            .json(&json!({ "username": username, "password": PASSWORD }))
            .send()
            .await?;
        anyhow::ensure!(res.status() == StatusCode::CREATED, "register failed: {}", res.status());
        let body: Value = res.json().await?;
        Ok(body["data"].clone())
    }

    pub async fn login(&self, username: &str) -> Result<String> {
        let res = self
            .client
            .post(self.url("/user/login"))
            .json(&json!({ "username": username, "password": PASSWORD }))
            .send()
            .await?;
        anyhow::ensure!(res.status() == StatusCode::OK, "login failed: {}", res.status());
        let body: Value = res.json().await?;
        body["data"]["token"]
            .as_str()
            .map(str::to_string)
            .context("login response has no token")
    }

    /// Register then log in, returning (user, token)
    pub async fn sign_up(&self, username: &str) -> Result<(Value, String)> {
        let user = self.register(username).await?;
        let token = self.login(username).await?;
        Ok((user, token))
    }

    pub async fn create_todo(&self, token: &str, text: &str) -> Result<Value> {
        let res = self
            .client
            .post(self.url("/todo"))
            .bearer_auth(token)
            .json(&json!({ "text": text }))
            .send()
            .await?;
        anyhow::ensure!(res.status() == StatusCode::CREATED, "create todo failed: {}", res.status());
        let body: Value = res.json().await?;
        Ok(body["data"].clone())
    }
}

/// Start the app in-process on a free port with a fresh in-memory store.
///
/// The server task lives on the calling test's runtime and stops with it.
pub async fn spawn_server() -> Result<TestServer> {
    let port = portpicker::pick_unused_port().context("failed to pick free port")?;
    let listener = TcpListener::bind(("127.0.0.1", port))
        .await
        .context("failed to bind test listener")?;

    let config = AppConfig::for_tests();
    let store = DatabaseManager::connect(&config.database).await?;
    store.migrate().await?;
    let state = AppState::new(config.clone(), store)?;

    tokio::spawn(async move {
        if let Err(e) = server::serve(listener, state, std::future::pending()).await {
            eprintln!("test server stopped: {}", e);
        }
    });

    Ok(TestServer {
        base_url: format!("http://127.0.0.1:{}", port),
        config,
        client: Client::new(),
    })
}

/// A migrated PostgreSQL store when `DATABASE_URL` points at PostgreSQL.
///
/// Returns `None` otherwise so callers can skip; tests sharing the database
/// must use unique usernames from `unique_name`.
pub async fn postgres_store() -> Result<Option<PgStore>> {
    let _ = dotenvy::dotenv();

    let url = match std::env::var("DATABASE_URL") {
        Ok(url) if DatabaseManager::backend_for(&url).ok() == Some(Backend::Postgres) => url,
        _ => {
            eprintln!("DATABASE_URL is not a PostgreSQL URL; skipping");
            return Ok(None);
        }
    };

    let pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&url)
        .await
        .context("failed to connect to PostgreSQL")?;

    let store = PgStore::new(pool);
    store.migrate().await?;
    Ok(Some(store))
}

pub fn unique_name(prefix: &str) -> String {
    format!("{}-{}", prefix, &uuid::Uuid::new_v4().simple().to_string()[..12])
}
