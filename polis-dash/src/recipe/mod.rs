//! Statement analysis recipe
//!
//! A [`Recipe`] takes ownership of a loaded [`StructuredDataset`] and returns
//! an [`AnalysedDataset`] with embedding coordinates, a multi-level label
//! hierarchy, a top-level label summary and per-statement moderation state.

use polis_common::config::RecipeConfig;
use thiserror::Error;

use crate::dataset::{AnalysedDataset, LabelLayers, ModerationState, StructuredDataset, TopLabel};

mod clustering;
mod projection;

pub use clustering::divisive_hierarchy;
pub use projection::project_statements;

/// Recipe errors
#[derive(Debug, Error)]
pub enum RecipeError {
    #[error("Dataset has no statements")]
    EmptyDataset,

    #[error("Vote matrix is {votes_rows}x{votes_cols} but dataset has {participants} participants and {statements} statements")]
    ShapeMismatch {
        votes_rows: usize,
        votes_cols: usize,
        participants: usize,
        statements: usize,
    },

    #[error("Invalid recipe configuration: {0}")]
    InvalidConfig(String),
}

/// Derives analysis fields for a dataset
pub trait Recipe: Send + Sync {
    /// Recipe identifier for logging
    fn name(&self) -> &'static str;

    fn apply(&self, dataset: StructuredDataset) -> Result<AnalysedDataset, RecipeError>;
}

/// Built-in statements recipe: vote projection plus divisive grouping
#[derive(Debug, Clone)]
pub struct StatementsRecipe {
    config: RecipeConfig,
}

impl StatementsRecipe {
    pub fn new(config: RecipeConfig) -> Self {
        Self { config }
    }
}

impl Default for StatementsRecipe {
    fn default() -> Self {
        Self::new(RecipeConfig::default())
    }
}

impl Recipe for StatementsRecipe {
    fn name(&self) -> &'static str {
        "polis2-statements"
    }

    fn apply(&self, dataset: StructuredDataset) -> Result<AnalysedDataset, RecipeError> {
        if self.config.layers == 0 {
            return Err(RecipeError::InvalidConfig("layers must be at least 1".to_string()));
        }
        if dataset.statement_count() == 0 {
            return Err(RecipeError::EmptyDataset);
        }
        let (participants, statements) = dataset.shape();
        if dataset.votes.rows() != participants || dataset.votes.cols() != statements {
            return Err(RecipeError::ShapeMismatch {
                votes_rows: dataset.votes.rows(),
                votes_cols: dataset.votes.cols(),
                participants,
                statements,
            });
        }

        let moderation: Vec<ModerationState> = dataset
            .statements
            .iter()
            .map(|s| ModerationState::from_raw(s.moderated))
            .collect();

        let embedding = project_statements(&dataset.votes, self.config.max_iterations);

        let mut layers = divisive_hierarchy(
            &embedding,
            self.config.layers,
            self.config.min_cluster_size,
            self.config.max_iterations,
        );
        // Stored finest first
        layers.reverse();
        let label_layers = LabelLayers(layers);

        let top_labels = summarize_top_level(&dataset, &embedding, &label_layers);

        tracing::info!(
            recipe = self.name(),
            statements,
            layers = label_layers.len(),
            top_groups = top_labels.len(),
            "Recipe applied"
        );

        Ok(AnalysedDataset {
            dataset,
            embedding,
            label_layers,
            top_labels,
            moderation,
        })
    }
}

/// One entry per coarsest group, exemplar = statement nearest the centroid
fn summarize_top_level(
    dataset: &StructuredDataset,
    embedding: &[[f64; 2]],
    layers: &LabelLayers,
) -> Vec<TopLabel> {
    let Some(top) = layers.layers().last() else {
        return Vec::new();
    };
    let group_count = top.iter().max().map_or(0, |m| m + 1);

    (0..group_count)
        .filter_map(|group_id| {
            let members: Vec<usize> = (0..top.len()).filter(|&i| top[i] == group_id).collect();
            if members.is_empty() {
                return None;
            }
            let center = clustering::centroid(embedding, &members);
            let exemplar = members
                .iter()
                .copied()
                .min_by(|&a, &b| {
                    let da = (embedding[a][0] - center[0]).powi(2) + (embedding[a][1] - center[1]).powi(2);
                    let db = (embedding[b][0] - center[0]).powi(2) + (embedding[b][1] - center[1]).powi(2);
                    da.total_cmp(&db)
                })
                .map(|i| dataset.statements[i].content.clone())
                .unwrap_or_default();

            Some(TopLabel {
                group_id,
                size: members.len(),
                exemplar,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::VoteMatrix;
    use crate::testing::sample_dataset;

    #[test]
    fn test_recipe_populates_all_fields() {
        let analysed = StatementsRecipe::default().apply(sample_dataset(12)).unwrap();

        assert_eq!(analysed.statement_count(), 12);
        assert_eq!(analysed.embedding.len(), 12);
        assert_eq!(analysed.moderation.len(), 12);
        assert_eq!(analysed.label_layers.len(), 3);
        for layer in analysed.label_layers.layers() {
            assert_eq!(layer.len(), 12);
        }
        assert_eq!(analysed.moderation[2], ModerationState::Rejected);
        assert_eq!(analysed.moderation[0], ModerationState::Accepted);
    }

    #[test]
    fn test_opinion_camps_become_top_groups() {
        let analysed = StatementsRecipe::default().apply(sample_dataset(12)).unwrap();
        let top = analysed.label_layers.layers().last().unwrap();

        // Even and odd statements are voted in opposite ways
        for i in 0..12 {
            assert_eq!(top[i], i % 2, "statement {}", i);
        }
        assert_eq!(analysed.top_labels.len(), 2);
        assert_eq!(analysed.top_labels[0].size, 6);
        assert_eq!(analysed.top_labels[1].size, 6);
        assert!(analysed.top_labels[0].exemplar.starts_with("Statement number"));
    }

    #[test]
    fn test_empty_dataset_rejected() {
        let err = StatementsRecipe::default()
            .apply(StructuredDataset::default())
            .unwrap_err();
        assert!(matches!(err, RecipeError::EmptyDataset));
    }

    #[test]
    fn test_shape_mismatch_rejected() {
        let mut dataset = sample_dataset(4);
        dataset.votes = VoteMatrix::new(2, 2);
        assert!(matches!(
            StatementsRecipe::default().apply(dataset),
            Err(RecipeError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn test_zero_layers_rejected() {
        let recipe = StatementsRecipe::new(RecipeConfig {
            layers: 0,
            ..RecipeConfig::default()
        });
        assert!(matches!(
            recipe.apply(sample_dataset(3)),
            Err(RecipeError::InvalidConfig(_))
        ));
    }
}
