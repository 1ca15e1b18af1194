//! Shared helpers for polis-dash integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use axum::body::Body;
use axum::http::Request;
use polis_common::ReportIdentity;
use polis_dash::dataset::{Statement, StructuredDataset, VoteMatrix};
use polis_dash::source::{ReportSource, SourceError};
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Report with `n` statements split into two opposed voting camps
pub fn camp_dataset(n: usize) -> StructuredDataset {
    let participants: Vec<i64> = (100..110).collect();
    let mut votes = VoteMatrix::new(participants.len(), n);
    for s in 0..n {
        for p in 0..participants.len() {
            let agree = (p < 5) == (s % 2 == 0);
            votes.set(p, s, if agree { 1 } else { -1 });
        }
    }
    let statements = (0..n)
        .map(|i| Statement {
            id: i as i64,
            content: format!("Opinion {}", i),
            original_content: None,
            author_id: 1,
            agrees: 5,
            disagrees: 5,
            moderated: 1,
        })
        .collect();
    StructuredDataset::new(statements, participants, votes)
}

/// Source returning a fixed dataset, or failing for `.invalid` hosts
pub struct FakeSource {
    dataset: StructuredDataset,
    calls: AtomicUsize,
}

impl FakeSource {
    pub fn new(dataset: StructuredDataset) -> Self {
        Self {
            dataset,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ReportSource for FakeSource {
    fn source_id(&self) -> &'static str {
        "Fake"
    }

    async fn load(&self, identity: &ReportIdentity) -> Result<StructuredDataset, SourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if identity.url().contains(".invalid") {
            return Err(SourceError::Network(format!("{} unreachable", identity.url())));
        }
        Ok(self.dataset.clone())
    }
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub fn post_form(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub async fn body_text(body: Body) -> String {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Should read body");
    String::from_utf8(bytes.to_vec()).expect("Body should be UTF-8")
}

pub async fn body_json(body: Body) -> Value {
    serde_json::from_str(&body_text(body).await).expect("Should parse JSON")
}
