#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{HeaderMap, Method, Request, StatusCode},
    Router,
};
use message_service::config::{Credentials, StoreSettings};
use message_service::error::MessageError;
use message_service::services::{Listing, MessageStore, StoreConnector};
use message_service::startup::{build_router, AppState};
use mongodb::bson::Document;
use secrecy::Secret;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tower::util::ServiceExt;

pub const TEST_PROJECT_ID: &str = "test-project";

/// In-memory document store that counts every call made against it.
#[derive(Clone, Default)]
pub struct MemoryConnector {
    inner: Arc<MemoryState>,
}

#[derive(Default)]
struct MemoryState {
    collections: Mutex<HashMap<String, Vec<Document>>>,
    fail_connect: AtomicBool,
    fail_write: AtomicBool,
    fail_read_after: Mutex<Option<usize>>,
    connects: AtomicUsize,
    closes: AtomicUsize,
    reads: AtomicUsize,
    writes: AtomicUsize,
    projects: Mutex<Vec<String>>,
}

impl MemoryConnector {
    pub fn fail_connect(&self) {
        self.inner.fail_connect.store(true, Ordering::SeqCst);
    }

    pub fn fail_write(&self) {
        self.inner.fail_write.store(true, Ordering::SeqCst);
    }

    /// Make enumeration fail after `n` documents have been yielded.
    pub fn fail_read_after(&self, n: usize) {
        *self.inner.fail_read_after.lock().unwrap() = Some(n);
    }

    pub fn seed(&self, collection: &str, documents: Vec<Document>) {
        self.inner
            .collections
            .lock()
            .unwrap()
            .entry(collection.to_string())
            .or_default()
            .extend(documents);
    }

    pub fn documents(&self, collection: &str) -> Vec<Document> {
        self.inner
            .collections
            .lock()
            .unwrap()
            .get(collection)
            .cloned()
            .unwrap_or_default()
    }

    pub fn connects(&self) -> usize {
        self.inner.connects.load(Ordering::SeqCst)
    }

    pub fn closes(&self) -> usize {
        self.inner.closes.load(Ordering::SeqCst)
    }

    pub fn reads(&self) -> usize {
        self.inner.reads.load(Ordering::SeqCst)
    }

    pub fn writes(&self) -> usize {
        self.inner.writes.load(Ordering::SeqCst)
    }

    pub fn store_calls(&self) -> usize {
        self.connects() + self.reads() + self.writes()
    }

    pub fn projects(&self) -> Vec<String> {
        self.inner.projects.lock().unwrap().clone()
    }
}

#[async_trait]
impl StoreConnector for MemoryConnector {
    async fn connect(
        &self,
        settings: &StoreSettings,
    ) -> Result<Box<dyn MessageStore>, MessageError> {
        self.inner.connects.fetch_add(1, Ordering::SeqCst);
        self.inner
            .projects
            .lock()
            .unwrap()
            .push(settings.project_id.clone());

        if self.inner.fail_connect.load(Ordering::SeqCst) {
            return Err(MessageError::Connection(anyhow::anyhow!(
                "simulated connection failure"
            )));
        }

        Ok(Box::new(MemoryStore {
            inner: self.inner.clone(),
        }))
    }
}

struct MemoryStore {
    inner: Arc<MemoryState>,
}

#[async_trait]
impl MessageStore for MemoryStore {
    async fn list_documents(&self, collection: &str) -> Listing {
        self.inner.reads.fetch_add(1, Ordering::SeqCst);
        let documents = self
            .inner
            .collections
            .lock()
            .unwrap()
            .get(collection)
            .cloned()
            .unwrap_or_default();

        match *self.inner.fail_read_after.lock().unwrap() {
            Some(n) => Listing {
                documents: documents.into_iter().take(n).collect(),
                truncated: true,
            },
            None => Listing {
                documents,
                truncated: false,
            },
        }
    }

    async fn add_document(&self, collection: &str, document: Document) -> Result<(), MessageError> {
        self.inner.writes.fetch_add(1, Ordering::SeqCst);
        if self.inner.fail_write.load(Ordering::SeqCst) {
            return Err(MessageError::StoreWrite(anyhow::anyhow!(
                "simulated write failure"
            )));
        }
        self.inner
            .collections
            .lock()
            .unwrap()
            .entry(collection.to_string())
            .or_default()
            .push(document);
        Ok(())
    }

    async fn close(self: Box<Self>) {
        self.inner.closes.fetch_add(1, Ordering::SeqCst);
    }
}

pub fn test_settings() -> StoreSettings {
    StoreSettings::new(
        Credentials::Uri(Secret::new("mongodb://localhost:27017".to_string())),
        TEST_PROJECT_ID,
    )
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl TestResponse {
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.body).expect("Response body is not JSON")
    }
}

pub struct TestApp {
    pub router: Router,
    pub store: MemoryConnector,
}

impl TestApp {
    pub fn new() -> Self {
        let store = MemoryConnector::default();
        let state = AppState::new(test_settings(), Arc::new(store.clone()));

        TestApp {
            router: build_router(state),
            store,
        }
    }

    pub async fn request(&self, method: Method, body: impl Into<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(
                Request::builder()
                    .method(method)
                    .uri("/messages")
                    .body(body.into())
                    .unwrap(),
            )
            .await
            .expect("Failed to execute request");

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Failed to read body");

        TestResponse {
            status,
            headers,
            body: String::from_utf8(bytes.to_vec()).expect("Body is not UTF-8"),
        }
    }

    pub async fn get_messages(&self) -> TestResponse {
        self.request(Method::GET, Body::empty()).await
    }

    pub async fn post_message(&self, body: &str) -> TestResponse {
        self.request(Method::POST, body.to_string()).await
    }
}
