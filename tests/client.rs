//! HTTP-level tests for the Outline client and a full import run.
//!
//! A `wiremock` server stands in for Outline. The client is blocking, so each
//! test drives it from `spawn_blocking` while the mock server runs on the
//! tokio runtime.

use outline_import::client::{DocumentService, OutlineClient};
use outline_import::error::RemoteError;
use outline_import::importer::Importer;
use outline_import::models::RemoteDocumentId;
use serde_json::{json, Value};
use std::fs;
use std::path::Path;
use tempfile::TempDir;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

const TOKEN: &str = "test-token";

/// Build the blocking client off the async runtime (it owns its own).
fn client(uri: &str) -> OutlineClient {
    OutlineClient::new(uri, TOKEN, None).unwrap()
}

fn created(id: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({ "ok": true, "data": { "id": id } }))
}

async fn requests_to(server: &MockServer, endpoint: &str) -> Vec<Request> {
    server
        .received_requests()
        .await
        .unwrap()
        .into_iter()
        .filter(|r| r.url.path() == endpoint)
        .collect()
}

fn json_body(req: &Request) -> Value {
    serde_json::from_slice(&req.body).unwrap()
}

fn text_body(req: &Request) -> String {
    String::from_utf8_lossy(&req.body).to_string()
}

fn multipart_field(body: &str, name: &str) -> Option<String> {
    let marker = format!("name=\"{}\"\r\n\r\n", name);
    let start = body.find(&marker)? + marker.len();
    let end = body[start..].find("\r\n")?;
    Some(body[start..start + end].to_string())
}

#[tokio::test(flavor = "multi_thread")]
async fn create_folder_sends_json_and_returns_id() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/documents.create"))
        .and(header("authorization", "Bearer test-token"))
        .respond_with(created("doc-1"))
        .expect(1)
        .mount(&server)
        .await;

    let uri = server.uri();
    let id = tokio::task::spawn_blocking(move || client(&uri).create_folder_document("guides", "col-1", None))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(id, RemoteDocumentId::new("doc-1"));

    let reqs = requests_to(&server, "/api/documents.create").await;
    let body = json_body(&reqs[0]);
    assert_eq!(
        body,
        json!({
            "collectionId": "col-1",
            "title": "guides",
            "text": "",
            "template": false,
            "publish": false,
        })
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn create_folder_with_parent_sends_parent_id() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/documents.create"))
        .and(body_partial_json(json!({ "parentDocumentId": "parent-9" })))
        .respond_with(created("child"))
        .expect(1)
        .mount(&server)
        .await;

    let uri = server.uri();
    let id = tokio::task::spawn_blocking(move || {
        client(&uri).create_folder_document("child", "col", Some(&RemoteDocumentId::new("parent-9")))
    })
    .await
    .unwrap()
    .unwrap();
    assert_eq!(id.as_str(), "child");
}

#[tokio::test(flavor = "multi_thread")]
async fn create_folder_not_ok_carries_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/documents.create"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"ok":false}"#))
        .mount(&server)
        .await;

    let uri = server.uri();
    let err = tokio::task::spawn_blocking(move || client(&uri).create_folder_document("x", "col", None))
        .await
        .unwrap()
        .unwrap_err();
    assert!(matches!(err, RemoteError::NotOk { .. }));
    assert_eq!(err.body(), Some(r#"{"ok":false}"#));
}

#[tokio::test(flavor = "multi_thread")]
async fn non_200_is_status_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/documents.create"))
        .respond_with(ResponseTemplate::new(403).set_body_string("authorization_error"))
        .mount(&server)
        .await;

    let uri = server.uri();
    let err = tokio::task::spawn_blocking(move || client(&uri).create_folder_document("x", "col", None))
        .await
        .unwrap()
        .unwrap_err();
    match err {
        RemoteError::Status { status, body, endpoint } => {
            assert_eq!(status, 403);
            assert_eq!(body, "authorization_error");
            assert!(endpoint.ends_with("/api/documents.create"));
        }
        other => panic!("unexpected error: {}", other),
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn import_sends_multipart_fields() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/documents.import"))
        .and(header("authorization", "Bearer test-token"))
        .respond_with(created("imported-1"))
        .expect(2)
        .mount(&server)
        .await;

    let tmp = TempDir::new().unwrap();
    let file = tmp.path().join("notes.md");
    fs::write(&file, "# Notes\n\nhello\n").unwrap();

    let uri = server.uri();
    let f = file.clone();
    let (top, child) = tokio::task::spawn_blocking(move || {
        let c = client(&uri);
        let top = c.import_file(&f, "col-1", None);
        let child = c.import_file(&f, "col-1", Some(&RemoteDocumentId::new("P1")));
        (top, child)
    })
    .await
    .unwrap();
    assert_eq!(top.unwrap().as_str(), "imported-1");
    assert!(child.is_ok());

    let reqs = requests_to(&server, "/api/documents.import").await;
    assert_eq!(reqs.len(), 2);

    let first = text_body(&reqs[0]);
    assert!(first.contains("name=\"file\"; filename=\"notes.md\""));
    assert!(first.contains("# Notes"));
    assert_eq!(multipart_field(&first, "collectionId").as_deref(), Some("col-1"));
    assert_eq!(multipart_field(&first, "template").as_deref(), Some("false"));
    assert_eq!(multipart_field(&first, "publish").as_deref(), Some("true"));
    assert_eq!(multipart_field(&first, "parentDocumentId"), None);

    let second = text_body(&reqs[1]);
    assert_eq!(
        multipart_field(&second, "parentDocumentId").as_deref(),
        Some("P1")
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn import_of_missing_file_makes_no_request() {
    let server = MockServer::start().await;
    let uri = server.uri();
    let err = tokio::task::spawn_blocking(move || {
        client(&uri).import_file(Path::new("/definitely/not/here.md"), "col", None)
    })
    .await
    .unwrap()
    .unwrap_err();

    assert!(matches!(err, RemoteError::File { .. }));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn import_failure_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/documents.import"))
        .respond_with(ResponseTemplate::new(500).set_body_string("internal"))
        .mount(&server)
        .await;

    let tmp = TempDir::new().unwrap();
    let file = tmp.path().join("a.md");
    fs::write(&file, "a").unwrap();

    let uri = server.uri();
    let err = tokio::task::spawn_blocking(move || client(&uri).import_file(&file, "col", None))
        .await
        .unwrap()
        .unwrap_err();
    assert!(matches!(err, RemoteError::Status { status: 500, .. }));
}

#[tokio::test(flavor = "multi_thread")]
async fn list_collections_single_page() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/collections.list"))
        .and(body_partial_json(json!({ "offset": 0, "limit": 100 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ok": true,
            "data": [
                { "id": "c1", "name": "Engineering", "description": "Runbooks" },
                { "id": "c2", "name": "Scratch", "description": null }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let uri = server.uri();
    let cols = tokio::task::spawn_blocking(move || client(&uri).list_collections())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(cols.len(), 2);
    assert_eq!(cols[0].name, "Engineering");
    assert_eq!(cols[1].description, None);
}

#[tokio::test(flavor = "multi_thread")]
async fn import_run_creates_shared_folder_once() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/documents.create"))
        .and(body_partial_json(json!({ "title": "sub" })))
        .respond_with(created("F1"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/documents.import"))
        .respond_with(created("doc"))
        .expect(3)
        .mount(&server)
        .await;

    let tmp = TempDir::new().unwrap();
    for rel in ["x.md", "sub/y.md", "sub/z.md"] {
        let p = tmp.path().join(rel);
        fs::create_dir_all(p.parent().unwrap()).unwrap();
        fs::write(p, format!("# {}\n", rel)).unwrap();
    }

    let uri = server.uri();
    let root = tmp.path().to_path_buf();
    let report = tokio::task::spawn_blocking(move || Importer::new(&client(&uri)).run(&root, "col"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(report.succeeded, 3);
    assert!(report.failures.is_empty());

    let create = requests_to(&server, "/api/documents.create").await;
    assert!(json_body(&create[0]).get("parentDocumentId").is_none());

    for req in requests_to(&server, "/api/documents.import").await {
        let body = text_body(&req);
        let parent = multipart_field(&body, "parentDocumentId");
        if body.contains("filename=\"x.md\"") {
            assert_eq!(parent, None);
        } else {
            assert_eq!(parent.as_deref(), Some("F1"));
        }
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn import_run_survives_folder_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/documents.create"))
        .and(body_partial_json(json!({ "title": "a" })))
        .respond_with(created("A"))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/documents.create"))
        .and(body_partial_json(json!({ "title": "b" })))
        .respond_with(ResponseTemplate::new(500).set_body_string("nope"))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/documents.create"))
        .and(body_partial_json(json!({ "title": "c" })))
        .respond_with(created("C"))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/documents.import"))
        .respond_with(created("doc"))
        .mount(&server)
        .await;

    let tmp = TempDir::new().unwrap();
    for rel in ["a/b/one.md", "a/b/two.md", "a/c/three.md"] {
        let p = tmp.path().join(rel);
        fs::create_dir_all(p.parent().unwrap()).unwrap();
        fs::write(p, "body").unwrap();
    }

    let uri = server.uri();
    let root = tmp.path().to_path_buf();
    let report = tokio::task::spawn_blocking(move || Importer::new(&client(&uri)).run(&root, "col"))
        .await
        .unwrap()
        .unwrap();

    assert_eq!(report.succeeded, 3);
    assert_eq!(report.failures.len(), 2);
    assert_eq!(report.failed_imports(), 0);

    let creates = requests_to(&server, "/api/documents.create").await;
    let titles: Vec<String> = creates
        .iter()
        .map(|r| json_body(r)["title"].as_str().unwrap().to_string())
        .collect();
    // "a" once; "b" retried for each file beneath it; "c" once.
    assert_eq!(titles, vec!["a", "b", "b", "c"]);

    for req in requests_to(&server, "/api/documents.import").await {
        let body = text_body(&req);
        let parent = multipart_field(&body, "parentDocumentId");
        if body.contains("filename=\"three.md\"") {
            assert_eq!(parent.as_deref(), Some("C"));
        } else {
            assert_eq!(parent, None);
        }
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn create_folder_without_id_is_not_ok() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/documents.create"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"ok":true,"data":{}}"#))
        .mount(&server)
        .await;

    let uri = server.uri();
    let err = tokio::task::spawn_blocking(move || client(&uri).create_folder_document("x", "col", None))
        .await
        .unwrap()
        .unwrap_err();
    assert!(matches!(err, RemoteError::NotOk { .. }));
    assert_eq!(err.body(), Some(r#"{"ok":true,"data":{}}"#));
}

#[tokio::test(flavor = "multi_thread")]
async fn import_run_never_sends_empty_parent() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/documents.create"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true, "data": {} })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/documents.import"))
        .respond_with(created("doc"))
        .expect(1)
        .mount(&server)
        .await;

    let tmp = TempDir::new().unwrap();
    let file = tmp.path().join("a/b/f.md");
    fs::create_dir_all(file.parent().unwrap()).unwrap();
    fs::write(&file, "body").unwrap();

    let uri = server.uri();
    let root = tmp.path().to_path_buf();
    let report = tokio::task::spawn_blocking(move || Importer::new(&client(&uri)).run(&root, "col"))
        .await
        .unwrap()
        .unwrap();

    assert_eq!(report.succeeded, 1);
    assert_eq!(report.failures.len(), 1);

    // "a" failed, so "b" was never attempted beneath an empty parent.
    let creates = requests_to(&server, "/api/documents.create").await;
    assert_eq!(creates.len(), 1);
    assert!(json_body(&creates[0]).get("parentDocumentId").is_none());

    let imports = requests_to(&server, "/api/documents.import").await;
    assert_eq!(multipart_field(&text_body(&imports[0]), "parentDocumentId"), None);
}
