use serde::{Deserialize, Serialize};

use crate::entities::vitals::FEATURE_COUNT;

/// A fitted classifier over the standardized feature vector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "model", rename_all = "snake_case")]
pub enum Classifier {
    LogisticRegression(LogisticRegression),
    RandomForest(RandomForest),
}

/// Binary logistic regression: P(classes[1]) = sigmoid(w.x + b)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticRegression {
    pub classes: Vec<u8>,
    pub coefficients: Vec<f64>,
    pub intercept: f64,
}

/// Averaged ensemble of decision trees
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForest {
    pub classes: Vec<u8>,
    pub trees: Vec<DecisionTree>,
}

/// A tree stored as a flat node array with the root at index 0
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    pub nodes: Vec<TreeNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TreeNode {
    /// Go to `left` when x[feature] <= threshold, otherwise to `right`
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    /// Class distribution (counts or fractions) reached at this leaf
    Leaf { value: Vec<f64> },
}

impl Classifier {
    /// Class labels in probability order
    pub fn classes(&self) -> &[u8] {
        match self {
            Classifier::LogisticRegression(model) => &model.classes,
            Classifier::RandomForest(model) => &model.classes,
        }
    }

    /// Probability of each class, aligned with [`Classifier::classes`]
    pub fn predict_proba(&self, x: &[f64; FEATURE_COUNT]) -> Vec<f64> {
        match self {
            Classifier::LogisticRegression(model) => model.predict_proba(x),
            Classifier::RandomForest(model) => model.predict_proba(x),
        }
    }

    /// Probability of the given class label, zero when the model does not know it
    pub fn probability_of(&self, class: u8, x: &[f64; FEATURE_COUNT]) -> f64 {
        self.classes()
            .iter()
            .position(|c| *c == class)
            .and_then(|i| self.predict_proba(x).get(i).copied())
            .unwrap_or(0.0)
    }

    /// Most probable class; the earlier class wins a tie
    pub fn predict(&self, x: &[f64; FEATURE_COUNT]) -> u8 {
        let proba = self.predict_proba(x);
        let mut best = 0;
        for (i, p) in proba.iter().enumerate() {
            if *p > proba[best] {
                best = i;
            }
        }
        self.classes().get(best).copied().unwrap_or_default()
    }

    /// Structural checks that make inference total
    pub(crate) fn validate(&self) -> Result<(), String> {
        let classes = self.classes();
        if classes.is_empty() {
            return Err("no classes".to_string());
        }
        for (i, class) in classes.iter().enumerate() {
            if classes[..i].contains(class) {
                return Err(format!("duplicate class {}", class));
            }
        }

        match self {
            Classifier::LogisticRegression(model) => model.validate(),
            Classifier::RandomForest(model) => model.validate(),
        }
    }
}

impl LogisticRegression {
    fn predict_proba(&self, x: &[f64; FEATURE_COUNT]) -> Vec<f64> {
        let z: f64 = self.intercept
            + self.coefficients
                .iter()
                .zip(x.iter())
                .map(|(w, v)| w * v)
                .sum::<f64>();
        let p = sigmoid(z);
        vec![1.0 - p, p]
    }

    fn validate(&self) -> Result<(), String> {
        if self.classes.len() != 2 {
            return Err(format!(
                "logistic regression is binary, got {} classes",
                self.classes.len()
            ));
        }
        if self.coefficients.len() != FEATURE_COUNT {
            return Err(format!(
                "expected {} coefficients, got {}",
                FEATURE_COUNT,
                self.coefficients.len()
            ));
        }
        if !self.intercept.is_finite() || self.coefficients.iter().any(|w| !w.is_finite()) {
            return Err("coefficients and intercept must be finite".to_string());
        }
        Ok(())
    }
}

impl RandomForest {
    fn predict_proba(&self, x: &[f64; FEATURE_COUNT]) -> Vec<f64> {
        let mut total = vec![0.0; self.classes.len()];
        if self.trees.is_empty() {
            return total;
        }

        for tree in &self.trees {
            if let Some(value) = tree.leaf(x) {
                let weight: f64 = value.iter().sum();
                if weight > 0.0 {
                    for (acc, v) in total.iter_mut().zip(value) {
                        *acc += v / weight;
                    }
                }
            }
        }

        let n = self.trees.len() as f64;
        total.iter_mut().for_each(|p| *p /= n);
        total
    }

    fn validate(&self) -> Result<(), String> {
        if self.trees.is_empty() {
            return Err("forest has no trees".to_string());
        }
        for (i, tree) in self.trees.iter().enumerate() {
            tree.validate(self.classes.len())
                .map_err(|e| format!("tree {}: {}", i, e))?;
        }
        Ok(())
    }
}

impl DecisionTree {
    /// Leaf distribution reached by `x`
    pub fn leaf(&self, x: &[f64; FEATURE_COUNT]) -> Option<&[f64]> {
        let mut idx = 0;
        loop {
            match self.nodes.get(idx)? {
                TreeNode::Split { feature, threshold, left, right } => {
                    let value = *x.get(*feature)?;
                    idx = if value <= *threshold { *left } else { *right };
                }
                TreeNode::Leaf { value } => return Some(value),
            }
        }
    }

    /// Children must point forward, which also rules out cycles
    fn validate(&self, n_classes: usize) -> Result<(), String> {
        if self.nodes.is_empty() {
            return Err("empty tree".to_string());
        }

        let len = self.nodes.len();
        for (i, node) in self.nodes.iter().enumerate() {
            match node {
                TreeNode::Split { feature, threshold, left, right } => {
                    if *feature >= FEATURE_COUNT {
                        return Err(format!("node {} splits on unknown feature {}", i, feature));
                    }
                    if threshold.is_nan() {
                        return Err(format!("node {} has a NaN threshold", i));
                    }
                    for child in [*left, *right] {
                        if child <= i || child >= len {
                            return Err(format!("node {} has invalid child {}", i, child));
                        }
                    }
                }
                TreeNode::Leaf { value } => {
                    if value.len() != n_classes {
                        return Err(format!(
                            "leaf {} has {} values for {} classes",
                            i,
                            value.len(),
                            n_classes
                        ));
                    }
                    if value.iter().any(|v| !v.is_finite() || *v < 0.0) {
                        return Err(format!("leaf {} has a negative or non-finite value", i));
                    }
                    if value.iter().sum::<f64>() <= 0.0 {
                        return Err(format!("leaf {} is empty", i));
                    }
                }
            }
        }
        Ok(())
    }
}

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}
