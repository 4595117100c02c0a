//! Integration tests for the store server and its clients

use p2p_recorder::store::{
    HttpStore, JsonlStore, RecordStore, Sample, StoreServer, StoreServerConfig, STORE_PATH,
};
use rust_decimal_macros::dec;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

async fn spawn_server(store: Arc<dyn RecordStore>) -> SocketAddr {
    let config = StoreServerConfig {
        listen_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
        path: STORE_PATH.to_string(),
    };
    let server = StoreServer::bind(config, store).await.unwrap();
    let addr = server.local_addr().unwrap();
    tokio::spawn(server.serve());
    addr
}

#[tokio::test]
async fn test_http_client_against_jsonl_backed_server() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("samples.jsonl");
    let addr = spawn_server(Arc::new(JsonlStore::new(&file))).await;

    let client = HttpStore::new(
        format!("http://{}{}", addr, STORE_PATH),
        Duration::from_secs(5),
    )
    .unwrap();

    client
        .insert(Sample::new("9:00:00 AM", dec!(130.5), dec!(128.25), "alpha"))
        .await
        .unwrap();
    client
        .insert(Sample::new("9:30:00 AM", dec!(131), dec!(128.75), "beta"))
        .await
        .unwrap();

    let listed = client.list_all().await.unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].advertiser, "alpha");
    assert_eq!(listed[1].buy, dec!(131));

    // Persisted as one JSON object per line
    let contents = tokio::fs::read_to_string(&file).await.unwrap();
    assert_eq!(contents.lines().count(), 2);

    // A fresh file-backed store sees the same samples
    let reopened = JsonlStore::new(&file);
    assert_eq!(reopened.list_all().await.unwrap(), listed);

    assert_eq!(client.delete_all().await.unwrap(), 2);
    assert!(client.list_all().await.unwrap().is_empty());
    assert_eq!(client.delete_all().await.unwrap(), 0);
}

#[tokio::test]
async fn test_wire_shape() {
    let dir = tempfile::tempdir().unwrap();
    let addr = spawn_server(Arc::new(JsonlStore::new(dir.path().join("s.jsonl")))).await;
    let url = format!("http://{}{}", addr, STORE_PATH);
    let http = reqwest::Client::new();

    let created = http
        .post(&url)
        .json(&serde_json::json!({
            "time": "3:00:00 PM",
            "buy": 130.5,
            "sell": 128.25,
            "advertiser": "alpha"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(created.status().as_u16(), 201);
    let body: serde_json::Value = created.json().await.unwrap();
    assert_eq!(body["message"], "Data saved successfully");
    assert_eq!(body["data"]["buy"], 130.5);

    let listed: serde_json::Value = http.get(&url).send().await.unwrap().json().await.unwrap();
    assert_eq!(listed[0]["time"], "3:00:00 PM");
    assert_eq!(listed[0]["sell"], 128.25);

    let deleted: serde_json::Value = http.delete(&url).send().await.unwrap().json().await.unwrap();
    assert_eq!(deleted["message"], "Deleted 1 document(s).");
}
