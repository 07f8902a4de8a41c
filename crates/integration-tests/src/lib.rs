//! Integration tests for minimart.
//!
//! Each test spins up the full router on an ephemeral port against its own
//! in-memory `SQLite` database, so tests are hermetic and need no running
//! services.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p minimart-integration-tests
//! ```

use std::str::FromStr;

use reqwest::Client;
use secrecy::SecretString;
use serde_json::Value;
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

use minimart_server::config::ServerConfig;
use minimart_server::db::MIGRATOR;
use minimart_server::state::AppState;

/// A running server instance backed by a fresh in-memory database.
pub struct TestContext {
    pub client: Client,
    pub base_url: String,
    pub pool: SqlitePool,
}

impl TestContext {
    /// Migrate a fresh database and serve the app on an ephemeral port.
    ///
    /// # Panics
    ///
    /// Panics on any setup failure; these tests cannot proceed without a
    /// working server.
    pub async fn new() -> Self {
        // A single connection keeps every request on the same in-memory
        // database.
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .expect("connection options")
            .foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .expect("in-memory pool");
        MIGRATOR.run(&pool).await.expect("migrations");

        let config = ServerConfig {
            database_url: SecretString::from("sqlite::memory:"),
            host: "127.0.0.1".parse().expect("host"),
            port: 0,
        };
        let state = AppState::new(config, pool.clone());
        let app = minimart_server::app(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind ephemeral port");
        let addr = listener.local_addr().expect("local addr");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("server");
        });

        Self {
            client: Client::new(),
            base_url: format!("http://{addr}"),
            pool,
        }
    }

    /// Full URL for a path.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// POST a JSON body and return (status, parsed body).
    pub async fn post_json(&self, path: &str, body: &Value) -> (reqwest::StatusCode, Value) {
        let resp = self
            .client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .expect("request");
        let status = resp.status();
        let body = resp.json().await.unwrap_or(Value::Null);
        (status, body)
    }

    /// PUT a JSON body and return (status, parsed body).
    pub async fn put_json(&self, path: &str, body: &Value) -> (reqwest::StatusCode, Value) {
        let resp = self
            .client
            .put(self.url(path))
            .json(body)
            .send()
            .await
            .expect("request");
        let status = resp.status();
        let body = resp.json().await.unwrap_or(Value::Null);
        (status, body)
    }

    /// PATCH a JSON body and return (status, parsed body).
    pub async fn patch_json(&self, path: &str, body: &Value) -> (reqwest::StatusCode, Value) {
        let resp = self
            .client
            .patch(self.url(path))
            .json(body)
            .send()
            .await
            .expect("request");
        let status = resp.status();
        let body = resp.json().await.unwrap_or(Value::Null);
        (status, body)
    }

    /// GET and return (status, parsed body).
    pub async fn get_json(&self, path: &str) -> (reqwest::StatusCode, Value) {
        let resp = self
            .client
            .get(self.url(path))
            .send()
            .await
            .expect("request");
        let status = resp.status();
        let body = resp.json().await.unwrap_or(Value::Null);
        (status, body)
    }

    /// DELETE and return the status.
    pub async fn delete(&self, path: &str) -> reqwest::StatusCode {
        self.client
            .delete(self.url(path))
            .send()
            .await
            .expect("request")
            .status()
    }

    /// Create a user and return its id.
    pub async fn create_user(&self, login: &str) -> i64 {
        let (status, body) = self
            .post_json(
                "/users",
                &serde_json::json!({
                    "login": login,
                    "email": format!("{login}@example.com"),
                    "age": 30,
                }),
            )
            .await;
        assert_eq!(status, reqwest::StatusCode::CREATED, "body: {body}");
        body["id"].as_i64().expect("user id")
    }

    /// Create a product and return its id.
    pub async fn create_product(&self, name: &str, stock: i64) -> i64 {
        let (status, body) = self
            .post_json(
                "/products",
                &serde_json::json!({ "name": name, "stock": stock }),
            )
            .await;
        assert_eq!(status, reqwest::StatusCode::CREATED, "body: {body}");
        body["id"].as_i64().expect("product id")
    }
}
