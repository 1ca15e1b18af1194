//! Pol.is report client
//!
//! Downloads a report's `comments.csv` and `votes.csv` exports from the
//! server that hosts the report, and optionally replaces statement text with
//! the server's translations.

use async_trait::async_trait;
use futures::StreamExt;
use polis_common::ReportIdentity;
use serde::Deserialize;
use std::collections::{BTreeSet, HashMap};
use std::time::Duration;
use url::Url;

use super::{ReportSource, SourceError};
use crate::dataset::{Statement, StructuredDataset, VoteMatrix};

const USER_AGENT: &str = concat!("polis-dash/", env!("CARGO_PKG_VERSION"));

/// Where a report lives: server origin plus report id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportLocation {
    pub origin: Url,
    pub report_id: String,
}

impl ReportLocation {
    /// Parse a report URL of the form `http(s)://host[:port]/report/<id>`
    pub fn parse(raw: &str) -> Result<Self, SourceError> {
        let invalid = |reason: &str| SourceError::InvalidReportUrl {
            url: raw.to_string(),
            reason: reason.to_string(),
        };

        let url = Url::parse(raw).map_err(|e| invalid(&e.to_string()))?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(invalid("scheme must be http or https"));
        }
        if url.host_str().is_none() {
            return Err(invalid("missing host"));
        }

        let segments: Vec<&str> = url
            .path_segments()
            .map(|s| s.filter(|seg| !seg.is_empty()).collect())
            .unwrap_or_default();
        let report_id = segments
            .windows(2)
            .find(|pair| pair[0] == "report")
            .map(|pair| pair[1].to_string())
            .ok_or_else(|| invalid("expected a /report/<id> path"))?;

        let mut origin = url.clone();
        origin.set_path("/");
        origin.set_query(None);
        origin.set_fragment(None);

        Ok(Self { origin, report_id })
    }

    fn endpoint(&self, path: &str) -> Result<Url, SourceError> {
        self.origin
            .join(path)
            .map_err(|e| SourceError::InvalidReportUrl {
                url: self.origin.to_string(),
                reason: e.to_string(),
            })
    }

    pub fn comments_url(&self) -> Result<Url, SourceError> {
        self.endpoint(&format!("/api/v3/reportExport/{}/comments.csv", self.report_id))
    }

    pub fn votes_url(&self) -> Result<Url, SourceError> {
        self.endpoint(&format!("/api/v3/reportExport/{}/votes.csv", self.report_id))
    }
}

/// Row of `comments.csv`
#[derive(Debug, Deserialize)]
struct CommentRow {
    #[serde(rename = "comment-id")]
    comment_id: i64,
    #[serde(rename = "author-id")]
    author_id: i64,
    #[serde(default)]
    agrees: u32,
    #[serde(default)]
    disagrees: u32,
    #[serde(default)]
    moderated: i8,
    #[serde(rename = "comment-body")]
    comment_body: String,
}

/// Row of `votes.csv`
#[derive(Debug, Deserialize)]
struct VoteRow {
    timestamp: i64,
    #[serde(rename = "comment-id")]
    comment_id: i64,
    #[serde(rename = "voter-id")]
    voter_id: i64,
    vote: i8,
}

#[derive(Debug, Deserialize)]
struct ReportRecord {
    conversation_id: String,
}

#[derive(Debug, Deserialize)]
struct TranslationRecord {
    txt: String,
    lang: String,
}

/// HTTP client for Pol.is report exports
pub struct PolisClient {
    http_client: reqwest::Client,
}

impl PolisClient {
    pub fn new(timeout: Duration) -> Result<Self, SourceError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()?;

        Ok(Self { http_client })
    }

    async fn get(&self, url: Url, query: &[(&str, &str)]) -> Result<reqwest::Response, SourceError> {
        tracing::debug!(url = %url, "Requesting Pol.is export");

        let response = self.http_client.get(url.clone()).query(query).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Http {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        Ok(response)
    }

    async fn fetch_bytes(&self, url: Url) -> Result<Vec<u8>, SourceError> {
        let response = self.get(url, &[]).await?;
        Ok(response.bytes().await?.to_vec())
    }

    async fn conversation_id(&self, location: &ReportLocation) -> Result<String, SourceError> {
        let url = location.endpoint("/api/v3/reports")?;
        let records: Vec<ReportRecord> = self
            .get(url, &[("report_id", location.report_id.as_str())])
            .await?
            .json()
            .await
            .map_err(|e| SourceError::Parse(e.to_string()))?;

        records
            .into_iter()
            .next()
            .map(|r| r.conversation_id)
            .ok_or_else(|| SourceError::ConversationNotFound(location.report_id.clone()))
    }

    async fn translate(
        &self,
        location: &ReportLocation,
        statements: &mut [Statement],
        language: &str,
    ) -> Result<usize, SourceError> {
        let conversation_id = self.conversation_id(location).await?;
        let url = location.endpoint("/api/v3/comments/translations")?;
        let mut translated = 0;

        for statement in statements.iter_mut() {
            let tid = statement.id.to_string();
            let records: Vec<TranslationRecord> = self
                .get(
                    url.clone(),
                    &[
                        ("conversation_id", conversation_id.as_str()),
                        ("tid", tid.as_str()),
                        ("lang", language),
                    ],
                )
                .await?
                .json()
                .await
                .map_err(|e| SourceError::Parse(e.to_string()))?;

            if let Some(record) = records.into_iter().find(|r| r.lang.eq_ignore_ascii_case(language)) {
                let original = std::mem::replace(&mut statement.content, record.txt);
                statement.original_content = Some(original);
                translated += 1;
            }
        }

        Ok(translated)
    }
}

#[async_trait]
impl ReportSource for PolisClient {
    fn source_id(&self) -> &'static str {
        "Pol.is"
    }

    async fn load(&self, identity: &ReportIdentity) -> Result<StructuredDataset, SourceError> {
        let location = ReportLocation::parse(identity.url())?;

        let comments = parse_comments(&self.fetch_bytes(location.comments_url()?).await?).await?;
        let votes = parse_votes(&self.fetch_bytes(location.votes_url()?).await?).await?;
        let mut dataset = build_dataset(comments, votes);

        if let Some(language) = identity.language() {
            let translated = self.translate(&location, &mut dataset.statements, language).await?;
            tracing::info!(
                report_id = %location.report_id,
                language = %language,
                translated,
                "Applied statement translations"
            );
        }

        tracing::info!(
            report_id = %location.report_id,
            statements = dataset.statement_count(),
            participants = dataset.participants.len(),
            votes = dataset.votes.vote_count(),
            "Loaded Pol.is report"
        );

        Ok(dataset)
    }
}

async fn parse_comments(bytes: &[u8]) -> Result<Vec<CommentRow>, SourceError> {
    let mut reader = csv_async::AsyncReaderBuilder::new().create_deserializer(bytes);
    let mut records = reader.deserialize::<CommentRow>();
    let mut rows = Vec::new();
    while let Some(row) = records.next().await {
        rows.push(row?);
    }
    Ok(rows)
}

async fn parse_votes(bytes: &[u8]) -> Result<Vec<VoteRow>, SourceError> {
    let mut reader = csv_async::AsyncReaderBuilder::new().create_deserializer(bytes);
    let mut records = reader.deserialize::<VoteRow>();
    let mut rows = Vec::new();
    while let Some(row) = records.next().await {
        rows.push(row?);
    }
    Ok(rows)
}

/// Assemble the dataset: statements ordered by comment id, participants by
/// voter id, and the latest vote per (voter, comment) pair.
fn build_dataset(mut comments: Vec<CommentRow>, mut votes: Vec<VoteRow>) -> StructuredDataset {
    comments.sort_by_key(|c| c.comment_id);
    comments.dedup_by_key(|c| c.comment_id);

    let statements: Vec<Statement> = comments
        .into_iter()
        .map(|c| Statement {
            id: c.comment_id,
            content: c.comment_body,
            original_content: None,
            author_id: c.author_id,
            agrees: c.agrees,
            disagrees: c.disagrees,
            moderated: c.moderated,
        })
        .collect();

    let columns: HashMap<i64, usize> = statements
        .iter()
        .enumerate()
        .map(|(col, s)| (s.id, col))
        .collect();

    let participants: Vec<i64> = votes
        .iter()
        .map(|v| v.voter_id)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    let rows: HashMap<i64, usize> = participants
        .iter()
        .enumerate()
        .map(|(row, id)| (*id, row))
        .collect();

    // Stable sort keeps file order for equal timestamps; later writes win
    votes.sort_by_key(|v| v.timestamp);
    let mut matrix = VoteMatrix::new(participants.len(), statements.len());
    let mut skipped = 0usize;
    for vote in &votes {
        match (rows.get(&vote.voter_id), columns.get(&vote.comment_id)) {
            (Some(&row), Some(&col)) => matrix.set(row, col, vote.vote),
            _ => skipped += 1,
        }
    }
    if skipped > 0 {
        tracing::debug!(skipped, "Ignored votes on unknown statements");
    }

    StructuredDataset::new(statements, participants, matrix)
}
