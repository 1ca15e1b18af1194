//! Test fixtures shared by unit tests

use async_trait::async_trait;
use polis_common::ReportIdentity;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::dataset::{Statement, StructuredDataset, VoteMatrix};
use crate::source::{ReportSource, SourceError};

/// Dataset with two opposed opinion camps of six participants each
///
/// Even statements are agreed by camp A and rejected by camp B; odd
/// statements the reverse. Every third statement is moderated out.
pub fn sample_dataset(statements: usize) -> StructuredDataset {
    let participants: Vec<i64> = (0..12).collect();
    let mut votes = VoteMatrix::new(participants.len(), statements);

    for col in 0..statements {
        for row in 0..participants.len() {
            let camp_a = row < 6;
            let even = col % 2 == 0;
            votes.set(row, col, if camp_a == even { 1 } else { -1 });
        }
    }

    let statements = (0..statements)
        .map(|i| Statement {
            id: i as i64,
            content: format!("Statement number {}", i),
            original_content: None,
            author_id: (i % 3) as i64,
            agrees: 6,
            disagrees: 6,
            moderated: if i % 3 == 2 { -1 } else { 1 },
        })
        .collect();

    StructuredDataset::new(statements, participants, votes)
}

enum Behaviour {
    Succeed,
    Fail,
    FailFirst,
}

/// Report source that counts invocations
pub struct CountingSource {
    dataset: StructuredDataset,
    behaviour: Behaviour,
    calls: AtomicUsize,
    languages: Mutex<Vec<Option<String>>>,
}

impl CountingSource {
    pub fn new(dataset: StructuredDataset) -> Self {
        Self::with_behaviour(dataset, Behaviour::Succeed)
    }

    pub fn failing() -> Self {
        Self::with_behaviour(StructuredDataset::default(), Behaviour::Fail)
    }

    pub fn fail_first(dataset: StructuredDataset) -> Self {
        Self::with_behaviour(dataset, Behaviour::FailFirst)
    }

    fn with_behaviour(dataset: StructuredDataset, behaviour: Behaviour) -> Self {
        Self {
            dataset,
            behaviour,
            calls: AtomicUsize::new(0),
            languages: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn languages_seen(&self) -> Vec<Option<String>> {
        self.languages.lock().unwrap().clone()
    }
}

#[async_trait]
impl ReportSource for CountingSource {
    fn source_id(&self) -> &'static str {
        "Counting"
    }

    async fn load(&self, identity: &ReportIdentity) -> Result<StructuredDataset, SourceError> {
        let previous = self.calls.fetch_add(1, Ordering::SeqCst);
        self.languages
            .lock()
            .unwrap()
            .push(identity.language().map(str::to_string));

        let fail = match self.behaviour {
            Behaviour::Succeed => false,
            Behaviour::Fail => true,
            Behaviour::FailFirst => previous == 0,
        };
        if fail {
            return Err(SourceError::Network(format!("{} is unreachable", identity.url())));
        }
        Ok(self.dataset.clone())
    }
}
