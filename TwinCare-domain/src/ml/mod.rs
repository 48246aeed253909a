//! Model artifacts and inference
//!
//! The scaler and the three classifiers are plain JSON documents produced by
//! the offline training job. They are loaded once into an [`ArtifactBundle`]
//! and shared read-only.

pub mod artifacts;
pub mod classifier;
pub mod scaler;

pub use artifacts::{ArtifactBundle, ArtifactError, ArtifactRole};
pub use classifier::{Classifier, DecisionTree, LogisticRegression, RandomForest, TreeNode};
pub use scaler::StandardScaler;
