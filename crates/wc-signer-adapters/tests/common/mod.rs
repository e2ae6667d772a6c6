#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::thread;

use alloy::primitives::B256;
use serde_json::{json, Value};
use tiny_http::{Method, Response, Server, StatusCode};

use wc_signer_core::{AddressHandle, PendingSessionRequest, PrivateKey, UnsignedTransactionRequest};

pub const KEY_HEX: &str = "0x4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318";

#[derive(Debug, Clone)]
pub struct CapturedRequest {
    pub method: String,
    pub path: String,
    pub body: Value,
    pub api_key: Option<String>,
}

pub type Captured = Arc<Mutex<Vec<CapturedRequest>>>;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn address_a() -> AddressHandle {
    AddressHandle::new(
        "1DrDyTr9RpRsQnDnXo2YRiPzPW4ooHX5LLoqXrqfMrpQH",
        0,
        PrivateKey::from_hex(KEY_HEX).expect("key"),
    )
}

pub fn key_a() -> B256 {
    KEY_HEX.parse().expect("key hex")
}

pub fn pending(id: u64) -> PendingSessionRequest {
    pending_on(id, "topic-1")
}

pub fn pending_on(id: u64, topic: &str) -> PendingSessionRequest {
    PendingSessionRequest {
        id,
        topic: topic.to_owned(),
    }
}

pub fn request(unsigned_tx: &str) -> UnsignedTransactionRequest {
    UnsignedTransactionRequest {
        unsigned_tx: unsigned_tx.to_owned(),
        from_address: address_a(),
    }
}

/// Fake full node. Decodes `abcd` as `T1`, returns a bogus shape for `beef`,
/// answers `dead` with a proxy's HTML 502 page and rejects everything else
/// with a node-style `detail` error.
pub fn spawn_node_mock(captured: Captured) -> String {
    spawn_mock(captured, |method, path, body| {
        match (method, path) {
            (Method::Post, "/transactions/decode-unsigned-tx") => {
                match body.get("unsignedTx").and_then(Value::as_str) {
                    Some("abcd") => (
                        200,
                        json!({
                            "unsignedTx": {
                                "txId": "T1",
                                "version": 0,
                                "networkId": 0,
                                "gasAmount": 100,
                                "gasPrice": "1",
                                "inputs": [],
                                "fixedOutputs": []
                            },
                            "fromGroup": 0,
                            "toGroup": 0
                        })
                        .to_string(),
                    ),
                    Some("beef") => (200, json!({"unexpected": true}).to_string()),
                    Some("dead") => (502, "<html><body>Bad Gateway</body></html>".to_owned()),
                    _ => (400, json!({"detail": "Cannot decode unsigned tx"}).to_string()),
                }
            }
            _ => (404, json!({"detail": "not found"}).to_string()),
        }
    })
}

/// Fake WalletConnect relay bridge. Request id 500 is answered with 503.
pub fn spawn_relay_mock(captured: Captured) -> String {
    spawn_mock(captured, |method, path, _body| match method {
        Method::Post if path.starts_with("/requests/500/") => {
            (503, json!({"detail": "relay down"}).to_string())
        }
        Method::Post if path.ends_with("/response") || path.ends_with("/error") => {
            (200, json!({"ok": true}).to_string())
        }
        _ => (404, json!({"detail": "not found"}).to_string()),
    })
}

fn spawn_mock<F>(captured: Captured, route: F) -> String
where
    F: Fn(Method, &str, &Value) -> (u16, String) + Send + 'static,
{
    let server = Server::http("127.0.0.1:0").expect("start server");
    let addr = format!("http://{}", server.server_addr());

    thread::spawn(move || {
        for _ in 0..16 {
            let mut req = match server.recv() {
                Ok(r) => r,
                Err(_) => break,
            };
            let method = req.method().clone();
            let path = req.url().to_owned();
            let api_key = req
                .headers()
                .iter()
                .find(|h| h.field.equiv("X-API-KEY"))
                .map(|h| h.value.as_str().to_owned());
            let mut raw = String::new();
            let _ = req.as_reader().read_to_string(&mut raw);
            let body: Value = serde_json::from_str(&raw).unwrap_or(Value::Null);
            if let Ok(mut g) = captured.lock() {
                g.push(CapturedRequest {
                    method: method.to_string(),
                    path: path.clone(),
                    body: body.clone(),
                    api_key,
                });
            }

            let (code, payload) = route(method, &path, &body);
            let response = Response::from_string(payload).with_status_code(StatusCode(code));
            let _ = req.respond(response);
        }
    });

    addr
}
