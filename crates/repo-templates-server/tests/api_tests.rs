//! HTTP-level tests for the template listing endpoint

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use repo_templates::{
    FsRepositoryHost, MemoryRepositoryHost, Repository, RepositoryError, RepositoryService,
    RepositoryServiceFactory, TemplateCollector,
};
use repo_templates_server::{AppState, config::ServerConfig, create_router};
use serde_json::{Value, json};
use tower::ServiceExt;

fn app_with(host: &MemoryRepositoryHost, base_url: &str) -> axum::Router {
    let collector = TemplateCollector::new(Arc::new(host.clone()), Arc::new(host.clone()));
    let config = ServerConfig {
        base_url: base_url.to_string(),
        ..ServerConfig::default()
    };
    create_router(AppState {
        collector: Arc::new(collector),
        config,
    })
}

async fn get_json(app: axum::Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn sample_host() -> MemoryRepositoryHost {
    let host = MemoryRepositoryHost::new();
    let a = host.add_repository("space", "A");
    host.put_file(&a, "template.yml", "name: X\ndescription: Template X\n");
    host.add_repository("space", "B");
    let c = host.add_repository("space", "C");
    host.put_file(&c, "template.yaml", "name: [broken");
    let d = host.add_repository("space", "D");
    host.put_file(&d, "template.yaml", "name: Y\nlanguage: rust\n");
    host
}

#[tokio::test]
async fn test_list_templates() {
    let host = sample_host();
    let (status, body) = get_json(app_with(&host, "/api"), "/api/v2/repos/templates").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["_links"]["self"]["href"], json!("/api/v2/repos/templates"));
    assert_eq!(
        body["_embedded"]["templates"],
        json!([
            { "templateRepository": "space/A", "name": "X", "description": "Template X" },
            { "templateRepository": "space/D", "name": "Y", "language": "rust" }
        ])
    );
    assert_eq!(host.open_sessions(), 0);
}

#[tokio::test]
async fn test_list_templates_empty() {
    let host = MemoryRepositoryHost::new();
    let (status, body) = get_json(app_with(&host, "/api"), "/api/v2/repos/templates").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["_embedded"]["templates"], json!([]));
    assert_eq!(body["_links"]["self"]["href"], json!("/api/v2/repos/templates"));
}

#[tokio::test]
async fn test_list_templates_uses_configured_base_url() {
    let host = sample_host();
    let app = app_with(&host, "https://scm.example.com/scm/api/");
    let (_, body) = get_json(app, "/api/v2/repos/templates").await;

    assert_eq!(
        body["_links"]["self"]["href"],
        json!("https://scm.example.com/scm/api/v2/repos/templates")
    );
}

#[tokio::test]
async fn test_list_templates_paginated() {
    let host = sample_host();

    let (status, body) = get_json(
        app_with(&host, "/api"),
        "/api/v2/repos/templates?page=0&pageSize=1",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["page"], json!(0));
    assert_eq!(body["pageTotal"], json!(2));
    assert_eq!(body["_embedded"]["templates"].as_array().unwrap().len(), 1);
    assert_eq!(body["_embedded"]["templates"][0]["name"], json!("X"));
    assert_eq!(
        body["_links"]["self"]["href"],
        json!("/api/v2/repos/templates?page=0&pageSize=1")
    );
    assert_eq!(
        body["_links"]["next"]["href"],
        json!("/api/v2/repos/templates?page=1&pageSize=1")
    );
    assert!(body["_links"].get("prev").is_none());

    let (_, body) = get_json(
        app_with(&host, "/api"),
        "/api/v2/repos/templates?page=1&pageSize=1",
    )
    .await;
    assert_eq!(body["_embedded"]["templates"][0]["name"], json!("Y"));
    assert!(body["_links"].get("next").is_none());
    assert_eq!(
        body["_links"]["prev"]["href"],
        json!("/api/v2/repos/templates?page=0&pageSize=1")
    );
}

#[tokio::test]
async fn test_list_templates_rejects_bad_paging() {
    let host = sample_host();

    for uri in [
        "/api/v2/repos/templates?page=0&pageSize=0",
        "/api/v2/repos/templates?page=1",
        "/api/v2/repos/templates?page=abc&pageSize=2",
    ] {
        let (status, body) = get_json(app_with(&host, "/api"), uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "uri: {}", uri);
        assert_eq!(body["status"], json!(400));
        assert!(body["error"].is_string());
    }
}

#[tokio::test]
async fn test_list_templates_from_filesystem() {
    let temp_dir = tempfile::tempdir().unwrap();
    let repo = temp_dir.path().join("hitchhiker").join("puzzle42");
    std::fs::create_dir_all(&repo).unwrap();
    std::fs::write(repo.join("template.yaml"), "name: Puzzle\n").unwrap();

    let host = FsRepositoryHost::new(temp_dir.path());
    let collector = TemplateCollector::new(Arc::new(host.clone()), Arc::new(host));
    let app = create_router(AppState {
        collector: Arc::new(collector),
        config: ServerConfig::default(),
    });

    let (status, body) = get_json(app, "/api/v2/repos/templates").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["_embedded"]["templates"],
        json!([{ "templateRepository": "hitchhiker/puzzle42", "name": "Puzzle" }])
    );
}

#[tokio::test]
async fn test_health_check() {
    let host = MemoryRepositoryHost::new();
    let (status, body) = get_json(app_with(&host, "/api"), "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], json!("healthy"));
    assert_eq!(body["service"], json!("repo-templates-server"));
}

/// Factory whose sessions never answer existence checks
struct StallingHost(MemoryRepositoryHost);

struct StallingSession(Box<dyn RepositoryService>);

#[async_trait]
impl RepositoryServiceFactory for StallingHost {
    async fn create(
        &self,
        repository: &Repository,
    ) -> Result<Box<dyn RepositoryService>, RepositoryError> {
        let inner = self.0.create(repository).await?;
        Ok(Box::new(StallingSession(inner)))
    }
}

#[async_trait]
impl RepositoryService for StallingSession {
    fn repository(&self) -> &Repository {
        self.0.repository()
    }

    async fn exists(&self, _path: &str) -> Result<bool, RepositoryError> {
        std::future::pending::<Result<bool, RepositoryError>>().await
    }

    async fn read(&self, path: &str) -> Result<Vec<u8>, RepositoryError> {
        self.0.read(path).await
    }

    fn close(&mut self) -> Result<(), RepositoryError> {
        self.0.close()
    }
}

#[tokio::test(start_paused = true)]
async fn test_list_templates_timeout_is_json() {
    let host = sample_host();
    let collector = TemplateCollector::new(
        Arc::new(host.clone()),
        Arc::new(StallingHost(host.clone())),
    );
    let config = ServerConfig {
        request_timeout_seconds: 5,
        ..ServerConfig::default()
    };
    let app = create_router(AppState {
        collector: Arc::new(collector),
        config,
    });

    let (status, body) = get_json(app, "/api/v2/repos/templates").await;

    assert_eq!(status, StatusCode::REQUEST_TIMEOUT);
    assert_eq!(body["status"], json!(408));
    assert_eq!(body["error"], json!("Request timed out"));
    assert!(host.sessions_opened() > 0);
    assert_eq!(host.open_sessions(), 0);
}
