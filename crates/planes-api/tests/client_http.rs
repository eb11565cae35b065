// Copyright 2025 Chris Custine
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Gateway integration tests against a canned-response HTTP listener.
//!
//! The listener serves one scripted response per connection; responses carry
//! `Connection: close` so every request (including each retry attempt) opens
//! a fresh connection and consumes the next script entry.

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use planes_api::{ApiError, ClientConfig, PlaneFields, PlanesClient, RetryPolicy};

/// Format a canned HTTP/1.1 response.
fn http_response(status_line: &str, body: &str) -> String {
    format!(
        "HTTP/1.1 {status_line}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    )
}

fn ok(body: &str) -> String {
    http_response("200 OK", body)
}

/// Read one full HTTP request (headers plus Content-Length body bytes).
fn read_request(stream: &mut TcpStream) -> String {
    let mut data = Vec::new();
    let mut buf = [0u8; 1024];
    loop {
        let n = stream.read(&mut buf).expect("read request");
        if n == 0 {
            break;
        }
        data.extend_from_slice(&buf[..n]);

        if let Some(header_end) = data.windows(4).position(|w| w == b"\r\n\r\n") {
            let headers = String::from_utf8_lossy(&data[..header_end]).to_lowercase();
            let content_length = headers
                .lines()
                .find_map(|l| l.strip_prefix("content-length:"))
                .and_then(|v| v.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if data.len() >= header_end + 4 + content_length {
                break;
            }
        }
    }
    String::from_utf8_lossy(&data).into_owned()
}

/// Spawn a listener that serves the scripted responses in order, one per
/// connection, and returns the raw requests it saw.
fn spawn_server(responses: Vec<String>) -> (String, JoinHandle<Vec<String>>) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind test listener");
    let base_url = format!("http://{}", listener.local_addr().unwrap());

    let handle = thread::spawn(move || {
        let mut seen = Vec::new();
        for response in responses {
            let (mut stream, _) = listener.accept().expect("accept");
            seen.push(read_request(&mut stream));
            stream.write_all(response.as_bytes()).expect("write response");
        }
        seen
    });

    (base_url, handle)
}

/// Client with a short backoff so retry tests stay fast.
fn test_client(base_url: String) -> PlanesClient {
    PlanesClient::new(ClientConfig {
        base_url,
        connect_timeout: Duration::from_secs(3),
        read_timeout: Duration::from_secs(7),
        retry: RetryPolicy {
            max_retries: 3,
            backoff_base: Duration::from_millis(10),
        },
    })
    .unwrap()
}

fn boeing_737() -> PlaneFields {
    PlaneFields {
        name: "737".to_string(),
        year: 2005,
        manufacturer: "Boeing".to_string(),
        image_ref: None,
        seats_class_a: 8,
        seats_class_b: 20,
        seats_class_c: 150,
    }
}

const CREATED_737: &str = r#"{"PlaneId": 1, "Name": "737", "Year": 2005, "MadeBy": "Boeing",
    "Picture": null, "NumOfSeats1": 8, "NumOfSeats2": 20, "NumOfSeats3": 150}"#;

const UPDATED_737: &str = r#"{"PlaneId": 1, "Name": "737", "Year": 2010, "MadeBy": "Boeing",
    "Picture": null, "NumOfSeats1": 8, "NumOfSeats2": 20, "NumOfSeats3": 150}"#;

#[tokio::test]
async fn test_create_list_update_delete_round_trip() {
    let (base_url, server) = spawn_server(vec![
        ok(CREATED_737),
        ok(&format!("[{CREATED_737}]")),
        ok(UPDATED_737),
        ok(UPDATED_737),
        ok(&format!(
            r#"{{"detail": "Plane deleted", "deleted_plane": {UPDATED_737}}}"#
        )),
        ok("[]"),
        http_response("404 Not Found", r#"{"detail": "Plane not found"}"#),
    ]);
    let client = test_client(base_url);

    // Create: server assigns the id; payload must not carry one.
    let created = client.create(&boeing_737()).await.unwrap();
    assert_eq!(created.id, Some(1));
    assert_eq!(created.fields(), boeing_737());

    let listed = client.list_all().await.unwrap();
    assert_eq!(listed, vec![created.clone()]);

    // Full-replace update, then read back.
    let mut fields = boeing_737();
    fields.year = 2010;
    let updated = client.update(1, &fields).await.unwrap();
    assert_eq!(updated.year, 2010);

    let fetched = client.get_by_id(1).await.unwrap();
    assert_eq!(fetched, updated);

    // Delete returns the prior field snapshot.
    let receipt = client.delete(1).await.unwrap();
    assert_eq!(receipt.detail, "Plane deleted");
    assert_eq!(receipt.deleted_plane.unwrap().year, 2010);

    assert!(client.list_all().await.unwrap().is_empty());
    match client.get_by_id(1).await {
        Err(ApiError::NotFound { id }) => assert_eq!(id, 1),
        other => panic!("expected NotFound, got {other:?}"),
    }

    let requests = server.join().unwrap();
    assert!(requests[0].starts_with("POST /planes HTTP/1.1"));
    assert!(!requests[0].contains("PlaneId"));
    assert!(requests[1].starts_with("GET /planes HTTP/1.1"));
    assert!(requests[2].starts_with("PUT /planes/1 HTTP/1.1"));
    assert!(!requests[2].contains("PlaneId"));
    assert!(requests[4].starts_with("DELETE /planes/1 HTTP/1.1"));
}

#[tokio::test]
async fn test_transient_errors_retried_until_success() {
    let unavailable = http_response("503 Service Unavailable", r#"{"detail": "warming up"}"#);
    let (base_url, server) = spawn_server(vec![
        unavailable.clone(),
        unavailable.clone(),
        unavailable,
        ok(&format!("[{CREATED_737}]")),
    ]);
    let client = test_client(base_url);

    // Three 503s then a 200: the retry budget covers it.
    let planes = client.list_all().await.unwrap();
    assert_eq!(planes.len(), 1);

    let requests = server.join().unwrap();
    assert_eq!(requests.len(), 4);
    assert!(requests.iter().all(|r| r.starts_with("GET /planes HTTP/1.1")));
}

#[tokio::test]
async fn test_transient_errors_exhaust_retry_budget() {
    let unavailable = http_response("503 Service Unavailable", "{}");
    let (base_url, server) = spawn_server(vec![
        unavailable.clone(),
        unavailable.clone(),
        unavailable.clone(),
        unavailable,
    ]);
    let client = test_client(base_url);

    match client.list_all().await {
        Err(ApiError::Transport { message }) => assert!(message.contains("503")),
        other => panic!("expected Transport, got {other:?}"),
    }
    assert_eq!(server.join().unwrap().len(), 4);
}

#[tokio::test]
async fn test_rejected_payload_maps_to_validation() {
    let (base_url, server) = spawn_server(vec![http_response(
        "400 Bad Request",
        r#"{"detail": "Year out of range"}"#,
    )]);
    let client = test_client(base_url);

    match client.create(&boeing_737()).await {
        Err(ApiError::Validation { message }) => assert_eq!(message, "Year out of range"),
        other => panic!("expected Validation, got {other:?}"),
    }
    server.join().unwrap();
}

#[tokio::test]
async fn test_malformed_body_maps_to_protocol() {
    let (base_url, server) = spawn_server(vec![ok("this is not json")]);
    let client = test_client(base_url);

    match client.list_all().await {
        Err(ApiError::Protocol { .. }) => {}
        other => panic!("expected Protocol, got {other:?}"),
    }
    server.join().unwrap();
}

#[tokio::test]
async fn test_health_and_db_ping() {
    let (base_url, server) = spawn_server(vec![
        ok(r#"{"status": "ok"}"#),
        ok(r#"{"db": "fail"}"#),
    ]);
    let client = test_client(base_url);

    assert!(client.health().await.unwrap());
    assert!(!client.db_ping().await.unwrap());

    let requests = server.join().unwrap();
    assert!(requests[0].starts_with("GET /health HTTP/1.1"));
    assert!(requests[1].starts_with("GET /db/ping HTTP/1.1"));
}
