//! A local HTTP server that records JSON requests and answers with a canned
//! response.

use std::sync::{Arc, Mutex};

use axum::Json;
use axum::Router;
use axum::extract::State;
use axum::http::{StatusCode, Uri};
use serde_json::Value;

#[derive(Clone)]
struct Stub {
    status: StatusCode,
    response: Value,
    requests: Arc<Mutex<Vec<(String, Value)>>>,
}

pub(crate) struct StubServer {
    pub(crate) base_url: String,
    requests: Arc<Mutex<Vec<(String, Value)>>>,
}

impl StubServer {
    pub(crate) async fn start(status: StatusCode, response: Value) -> Self {
        let requests = Arc::new(Mutex::new(Vec::new()));
        let app = Router::new().fallback(capture).with_state(Stub {
            status,
            response,
            requests: requests.clone(),
        });
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        Self {
            base_url: format!("http://{addr}"),
            requests,
        }
    }

    /// Every request received so far as (path, JSON body).
    pub(crate) fn requests(&self) -> Vec<(String, Value)> {
        self.requests.lock().unwrap().clone()
    }
}

async fn capture(
    State(stub): State<Stub>,
    uri: Uri,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    stub.requests
        .lock()
        .unwrap()
        .push((uri.path().to_owned(), body));
    (stub.status, Json(stub.response))
}
