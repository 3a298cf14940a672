use serde::{Deserialize, Serialize};

use super::{ArtifactError, Classifier, ClassifyError};
use crate::models::FeatureTable;

/// A single node of a fitted decision tree.
///
/// Split nodes send a row left when `row[feature] <= threshold`. Leaf nodes
/// carry per-class weights (counts or probabilities, normalised on use).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TreeNode {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        value: Vec<f64>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTree {
    pub nodes: Vec<TreeNode>,
}

impl DecisionTree {
    /// Class probability vector for one row. Assumes the tree passed `validate`.
    fn predict_proba(&self, row: &[f64]) -> Vec<f64> {
        let mut idx = 0;
        loop {
            match &self.nodes[idx] {
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    idx = if row[*feature] <= *threshold { *left } else { *right };
                }
                TreeNode::Leaf { value } => {
                    let total: f64 = value.iter().sum();
                    if total > 0.0 {
                        return value.iter().map(|v| v / total).collect();
                    }
                    return vec![0.0; value.len()];
                }
            }
        }
    }

    fn validate(&self, tree: usize, n_features: usize, n_classes: usize) -> Result<(), String> {
        if self.nodes.is_empty() {
            return Err(format!("tree {tree} has no nodes"));
        }

        for (idx, node) in self.nodes.iter().enumerate() {
            match node {
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    if *feature >= n_features {
                        return Err(format!(
                            "tree {tree} node {idx} splits on feature {feature} of {n_features}"
                        ));
                    }
                    if threshold.is_nan() {
                        return Err(format!("tree {tree} node {idx} has a NaN threshold"));
                    }
                    // Children always follow their parent, which rules out cycles.
                    for child in [left, right] {
                        if *child <= idx || *child >= self.nodes.len() {
                            return Err(format!(
                                "tree {tree} node {idx} points at invalid child {child}"
                            ));
                        }
                    }
                }
                TreeNode::Leaf { value } => {
                    if value.len() != n_classes {
                        return Err(format!(
                            "tree {tree} leaf {idx} has {} weights for {n_classes} classes",
                            value.len()
                        ));
                    }
                    if value.iter().any(|v| !v.is_finite() || *v < 0.0) {
                        return Err(format!("tree {tree} leaf {idx} has an invalid weight"));
                    }
                }
            }
        }
        Ok(())
    }
}

/// Bagged ensemble of decision trees voting by mean class probability.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForest {
    #[serde(alias = "n_features_in_")]
    pub n_features: usize,
    #[serde(alias = "classes_")]
    pub classes: Vec<i64>,
    pub trees: Vec<DecisionTree>,
}

impl RandomForest {
    pub fn new(
        n_features: usize,
        classes: Vec<i64>,
        trees: Vec<DecisionTree>,
    ) -> Result<Self, ArtifactError> {
        let forest = Self {
            n_features,
            classes,
            trees,
        };
        forest.validate()?;
        Ok(forest)
    }

    pub(crate) fn validate(&self) -> Result<(), ArtifactError> {
        let invalid = |reason: String| ArtifactError::Invalid {
            kind: "model",
            reason,
        };

        if self.n_features == 0 {
            return Err(invalid("n_features must be positive".into()));
        }
        if self.classes.is_empty() {
            return Err(invalid("no classes".into()));
        }
        if self.trees.is_empty() {
            return Err(invalid("no trees".into()));
        }
        for (i, tree) in self.trees.iter().enumerate() {
            tree.validate(i, self.n_features, self.classes.len())
                .map_err(invalid)?;
        }
        Ok(())
    }

    fn predict_row(&self, row: &[f64]) -> i64 {
        let mut mean = vec![0.0; self.classes.len()];
        for tree in &self.trees {
            for (acc, p) in mean.iter_mut().zip(tree.predict_proba(row)) {
                *acc += p;
            }
        }

        // First class wins ties.
        let mut best = 0;
        for (i, p) in mean.iter().enumerate().skip(1) {
            if *p > mean[best] {
                best = i;
            }
        }
        self.classes[best]
    }
}

impl Classifier for RandomForest {
    fn n_features(&self) -> usize {
        self.n_features
    }

    fn predict(&self, table: &FeatureTable) -> Result<Vec<i64>, ClassifyError> {
        if table.column_count() != self.n_features {
            return Err(ClassifyError::ShapeMismatch {
                expected: self.n_features,
                actual: table.column_count(),
            });
        }
        Ok(table.rows().iter().map(|row| self.predict_row(row)).collect())
    }
}
