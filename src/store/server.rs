//! HTTP surface for a sample store
//!
//! Serves `POST`, `GET` and `DELETE` on a single collection path so a
//! recorder in another process can use the store through `HttpStore`.

use super::{RecordStore, Sample};
use anyhow::{Context, Result};
use http_body_util::{BodyExt, Full};
use hyper::body::{Bytes, Incoming};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;

/// Collection path served by the store
pub const STORE_PATH: &str = "/backend/models/data";

/// Configuration for the store HTTP server
#[derive(Debug, Clone)]
pub struct StoreServerConfig {
    /// Address to bind to
    pub listen_addr: SocketAddr,
    /// Collection path
    pub path: String,
}

impl Default for StoreServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([127, 0, 0, 1], 5000)),
            path: STORE_PATH.to_string(),
        }
    }
}

/// HTTP server exposing a `RecordStore`
pub struct StoreServer {
    listener: TcpListener,
    path: Arc<str>,
    store: Arc<dyn RecordStore>,
}

impl StoreServer {
    /// Bind the listening socket
    pub async fn bind(config: StoreServerConfig, store: Arc<dyn RecordStore>) -> Result<Self> {
        let listener = TcpListener::bind(config.listen_addr)
            .await
            .with_context(|| format!("Failed to bind store server on {}", config.listen_addr))?;

        Ok(Self {
            listener,
            path: config.path.into(),
            store,
        })
    }

    /// Address actually bound (useful with port 0)
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Accept connections until the task is dropped
    pub async fn serve(self) -> Result<()> {
        tracing::info!(
            "Store server listening on http://{}{}",
            self.local_addr()?,
            self.path
        );

        loop {
            let (stream, remote_addr) = match self.listener.accept().await {
                Ok(conn) => conn,
                Err(e) => {
                    tracing::error!(error = %e, "Failed to accept connection");
                    continue;
                }
            };

            let store = Arc::clone(&self.store);
            let path = Arc::clone(&self.path);

            tokio::spawn(async move {
                let io = TokioIo::new(stream);
                let service = service_fn(move |req: Request<Incoming>| {
                    let store = Arc::clone(&store);
                    let path = Arc::clone(&path);
                    async move { handle_request(req, store, path).await }
                });

                if let Err(err) = http1::Builder::new().serve_connection(io, service).await {
                    tracing::debug!(remote = %remote_addr, error = %err, "Connection error");
                }
            });
        }
    }
}

/// Route one request
async fn handle_request(
    req: Request<Incoming>,
    store: Arc<dyn RecordStore>,
    path: Arc<str>,
) -> Result<Response<Full<Bytes>>, hyper::Error> {
    let method = req.method().clone();
    let uri_path = req.uri().path().to_string();

    tracing::debug!(method = %method, path = %uri_path, "Store request");

    if uri_path == "/health" {
        return Ok(text_response(StatusCode::OK, "OK"));
    }

    if uri_path != *path {
        return Ok(text_response(StatusCode::NOT_FOUND, "Not Found"));
    }

    let response = match method {
        Method::POST => {
            let body = req.into_body().collect().await?.to_bytes();
            insert(&*store, &body).await
        }
        Method::GET => list(&*store).await,
        Method::DELETE => delete(&*store).await,
        _ => text_response(StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed"),
    };

    Ok(response)
}

async fn insert(store: &dyn RecordStore, body: &[u8]) -> Response<Full<Bytes>> {
    let sample: Sample = match serde_json::from_slice(body) {
        Ok(sample) => sample,
        Err(e) => {
            return json_response(
                StatusCode::BAD_REQUEST,
                json!({ "message": "Invalid sample", "error": e.to_string() }),
            );
        }
    };

    match store.insert(sample).await {
        Ok(stored) => json_response(
            StatusCode::CREATED,
            json!({ "message": "Data saved successfully", "data": stored }),
        ),
        Err(e) => {
            tracing::error!(error = %e, "Failed to save sample");
            json_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "message": "Error saving data", "error": e.to_string() }),
            )
        }
    }
}

async fn list(store: &dyn RecordStore) -> Response<Full<Bytes>> {
    match store.list_all().await {
        Ok(samples) => json_response(StatusCode::OK, json!(samples)),
        Err(e) => {
            tracing::error!(error = %e, "Failed to list samples");
            json_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "message": "Error retrieving data", "error": e.to_string() }),
            )
        }
    }
}

async fn delete(store: &dyn RecordStore) -> Response<Full<Bytes>> {
    match store.delete_all().await {
        Ok(count) => json_response(
            StatusCode::OK,
            json!({ "message": format!("Deleted {} document(s).", count) }),
        ),
        Err(e) => {
            tracing::error!(error = %e, "Failed to delete samples");
            json_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "message": "Error deleting documents", "error": e.to_string() }),
            )
        }
    }
}

fn json_response(status: StatusCode, body: serde_json::Value) -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(Bytes::from(body.to_string())));
    *response.status_mut() = status;
    response.headers_mut().insert(
        hyper::header::CONTENT_TYPE,
        hyper::header::HeaderValue::from_static("application/json"),
    );
    response
}

fn text_response(status: StatusCode, body: &'static str) -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(Bytes::from_static(body.as_bytes())));
    *response.status_mut() = status;
    response
}
