use std::net::SocketAddr;
use std::sync::Arc;

use game_store::{dao::game_store::MemoryGameStore, routes, state::AppState};
use serde_json::{Value, json};

pub struct TestServer {
    pub addr: SocketAddr,
    pub client: reqwest::Client,
    _shutdown: tokio::task::JoinHandle<()>,
}

impl TestServer {
    /// Start a server backed by the seeded in-memory store.
    pub async fn seeded() -> Self {
        Self::with_store(MemoryGameStore::seeded()).await
    }

    /// Start a server backed by an empty in-memory store.
    pub async fn empty() -> Self {
        Self::with_store(MemoryGameStore::new()).await
    }

    async fn with_store(store: MemoryGameStore) -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = routes::app(AppState::new(Arc::new(store)));

        let handle = tokio::spawn(async move {
            axum::serve(listener, app.into_make_service()).await.unwrap();
        });

        Self {
            addr,
            client: reqwest::Client::new(),
            _shutdown: handle,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub async fn get_json(&self, path: &str) -> (u16, Value) {
        let resp = self.client.get(self.url(path)).send().await.unwrap();
        let status = resp.status().as_u16();
        (status, resp.json().await.unwrap())
    }

    pub async fn create(&self, body: &Value) -> reqwest::Response {
        self.client
            .post(self.url("/games"))
            .json(body)
            .send()
            .await
            .unwrap()
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self._shutdown.abort();
    }
}

pub fn game_body(name: &str, genre: &str, price: f64) -> Value {
    json!({
        "name": name,
        "genre": genre,
        "price": price,
        "releaseDate": "2020-01-01",
    })
}
