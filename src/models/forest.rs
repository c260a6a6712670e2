//! Tree-ensemble classifier evaluation

use crate::error::{Result, ServiceError};
use serde::{Deserialize, Serialize};

/// Marker for leaf slots in the flattened node arrays
const LEAF: i64 = -1;

/// One fitted decision tree, carried as the flattened node arrays the
/// training exporter emits: index `i` is a node, `children_left[i] == -1`
/// marks a leaf, and `value[i]` holds the training-sample class weights.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTree {
    pub children_left: Vec<i64>,
    pub children_right: Vec<i64>,
    pub feature: Vec<i64>,
    pub threshold: Vec<f64>,
    pub value: Vec<[f64; 2]>,
}

impl DecisionTree {
    pub fn node_count(&self) -> usize {
        self.children_left.len()
    }

    /// Check the node arrays describe a traversable tree over `n_features`
    pub fn validate(&self, n_features: usize) -> Result<()> {
        let nodes = self.node_count();
        if nodes == 0 {
            return Err(ServiceError::artifact("tree has no nodes"));
        }
        if self.children_right.len() != nodes
            || self.feature.len() != nodes
            || self.threshold.len() != nodes
            || self.value.len() != nodes
        {
            return Err(ServiceError::artifact(
                "tree node arrays have inconsistent lengths",
            ));
        }

        for i in 0..nodes {
            let left = self.children_left[i];
            let right = self.children_right[i];
            if (left == LEAF) != (right == LEAF) {
                return Err(ServiceError::artifact(format!(
                    "node {} mixes leaf and split children",
                    i
                )));
            }
            if left == LEAF {
                continue;
            }
            // Child indices must point forward to stay acyclic
            if left <= i as i64 || left >= nodes as i64 || right <= i as i64 || right >= nodes as i64
            {
                return Err(ServiceError::artifact(format!(
                    "node {} has out-of-range children ({}, {})",
                    i, left, right
                )));
            }
            let feature = self.feature[i];
            if feature < 0 || feature >= n_features as i64 {
                return Err(ServiceError::artifact(format!(
                    "node {} splits on unknown feature {}",
                    i, feature
                )));
            }
        }
        Ok(())
    }

    /// Traverse to a leaf and return its normalized class distribution
    fn leaf_distribution(&self, row: &[f64]) -> Result<[f64; 2]> {
        let mut node = 0usize;
        loop {
            let left = self.children_left[node];
            if left == LEAF {
                let [class0, class1] = self.value[node];
                let total = class0 + class1;
                if total <= 0.0 {
                    return Err(ServiceError::inference(format!(
                        "leaf {} carries no class weights",
                        node
                    )));
                }
                return Ok([class0 / total, class1 / total]);
            }

            let feature = self.feature[node] as usize;
            node = if row[feature] <= self.threshold[node] {
                left as usize
            } else {
                self.children_right[node] as usize
            };
        }
    }
}

/// The frozen ensemble classifier loaded at startup
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForestModel {
    pub n_features: usize,
    pub trees: Vec<DecisionTree>,
}

impl ForestModel {
    /// Check the whole artifact is internally consistent
    pub fn validate(&self) -> Result<()> {
        if self.n_features == 0 {
            return Err(ServiceError::artifact("model declares zero features"));
        }
        if self.trees.is_empty() {
            return Err(ServiceError::artifact("model contains no trees"));
        }
        for (index, tree) in self.trees.iter().enumerate() {
            tree.validate(self.n_features).map_err(|e| {
                ServiceError::artifact(format!("tree {}: {}", index, e))
            })?;
        }
        Ok(())
    }

    /// Class probability pair `(P(class 0), P(class 1))` for one scaled row:
    /// the mean of the per-tree leaf distributions, matching the fitted
    /// estimator's averaging.
    pub fn predict_proba(&self, row: &[f64]) -> Result<[f64; 2]> {
        if row.len() != self.n_features {
            return Err(ServiceError::inference(format!(
                "input row has {} features, model was fitted on {}",
                row.len(),
                self.n_features
            )));
        }

        let mut sums = [0.0, 0.0];
        for tree in &self.trees {
            let distribution = tree.leaf_distribution(row)?;
            sums[0] += distribution[0];
            sums[1] += distribution[1];
        }

        let count = self.trees.len() as f64;
        Ok([sums[0] / count, sums[1] / count])
    }

    /// Hard class label: argmax of the averaged distribution, ties to class 0
    /// like the original estimator.
    pub fn predict(&self, row: &[f64]) -> Result<usize> {
        let probabilities = self.predict_proba(row)?;
        Ok(if probabilities[1] > probabilities[0] { 1 } else { 0 })
    }

    pub fn tree_count(&self) -> usize {
        self.trees.len()
    }
}
