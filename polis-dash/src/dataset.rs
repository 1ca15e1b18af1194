//! In-memory report data
//!
//! A [`StructuredDataset`] is one loaded report: statements on one axis,
//! participants on the other, and a dense vote matrix between them. The
//! recipe consumes it and produces an [`AnalysedDataset`] carrying the
//! derived per-statement fields.

use serde::Serialize;
use std::fmt;

/// One statement (comment) from a report
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Statement {
    /// Pol.is comment id (`tid`)
    pub id: i64,
    /// Displayed text (translated when a language was requested)
    pub content: String,
    /// Source text when `content` was replaced by a translation
    pub original_content: Option<String>,
    pub author_id: i64,
    pub agrees: u32,
    pub disagrees: u32,
    /// Raw moderation flag: -1 rejected, 0 unmoderated, 1 accepted
    pub moderated: i8,
}

/// Dense participants x statements vote matrix
///
/// +1 agree, -1 disagree, 0 pass, `None` when the participant never saw
/// the statement.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct VoteMatrix {
    rows: usize,
    cols: usize,
    cells: Vec<Option<i8>>,
}

impl VoteMatrix {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            cells: vec![None; rows * cols],
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn get(&self, row: usize, col: usize) -> Option<i8> {
        if row < self.rows && col < self.cols {
            self.cells[row * self.cols + col]
        } else {
            None
        }
    }

    /// Set a cell; out-of-range coordinates are ignored
    pub fn set(&mut self, row: usize, col: usize, vote: i8) {
        if row < self.rows && col < self.cols {
            self.cells[row * self.cols + col] = Some(vote.signum());
        }
    }

    /// Votes cast on one statement, as (participant row, vote)
    pub fn column(&self, col: usize) -> impl Iterator<Item = (usize, i8)> + '_ {
        (0..self.rows).filter_map(move |row| self.get(row, col).map(|v| (row, v)))
    }

    pub fn vote_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }
}

/// A loaded report
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StructuredDataset {
    pub statements: Vec<Statement>,
    /// Voter ids, one per vote matrix row
    pub participants: Vec<i64>,
    pub votes: VoteMatrix,
}

impl StructuredDataset {
    pub fn new(statements: Vec<Statement>, participants: Vec<i64>, votes: VoteMatrix) -> Self {
        Self {
            statements,
            participants,
            votes,
        }
    }

    /// (participants, statements)
    pub fn shape(&self) -> (usize, usize) {
        (self.participants.len(), self.statements.len())
    }

    /// Length of the statement axis
    pub fn statement_count(&self) -> usize {
        self.statements.len()
    }
}

/// Moderation status of a statement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ModerationState {
    Accepted,
    Unmoderated,
    Rejected,
}

impl ModerationState {
    pub fn from_raw(moderated: i8) -> Self {
        match moderated.signum() {
            1 => ModerationState::Accepted,
            -1 => ModerationState::Rejected,
            _ => ModerationState::Unmoderated,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ModerationState::Accepted => "accepted",
            ModerationState::Unmoderated => "unmoderated",
            ModerationState::Rejected => "rejected",
        }
    }
}

impl fmt::Display for ModerationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw per-statement group ids, one layer per zoom level, finest first
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct LabelLayers(pub Vec<Vec<usize>>);

impl LabelLayers {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Finest layer first
    pub fn layers(&self) -> &[Vec<usize>] {
        &self.0
    }

    /// Group id of `statement` in the coarsest layer
    pub fn top_group(&self, statement: usize) -> Option<usize> {
        self.0.last().and_then(|layer| layer.get(statement).copied())
    }
}

/// Summary of one coarsest-level group
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopLabel {
    pub group_id: usize,
    pub size: usize,
    /// Statement closest to the group centroid
    pub exemplar: String,
}

/// A report after the analysis recipe has run
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysedDataset {
    pub dataset: StructuredDataset,
    /// 2D coordinates per statement
    pub embedding: Vec<[f64; 2]>,
    pub label_layers: LabelLayers,
    pub top_labels: Vec<TopLabel>,
    pub moderation: Vec<ModerationState>,
}

impl AnalysedDataset {
    pub fn statement_count(&self) -> usize {
        self.dataset.statement_count()
    }

    /// Combined coloring field: "Group{top} / {moderation}"
    pub fn color_category(&self, statement: usize) -> String {
        let group = self
            .label_layers
            .top_group(statement)
            .map(|g| format!("Group{}", g))
            .unwrap_or_else(|| "Unlabelled".to_string());
        let moderation = self
            .moderation
            .get(statement)
            .copied()
            .unwrap_or(ModerationState::Unmoderated);
        format!("{} / {}", group, moderation)
    }
}
