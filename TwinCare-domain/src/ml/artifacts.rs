use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, info};

use super::classifier::Classifier;
use super::scaler::StandardScaler;
use crate::entities::monitoring::STRESS_CLASSES;

pub const SCALER_FILE: &str = "scaler.json";
pub const HEART_MODEL_FILE: &str = "heart_model.json";
pub const RESPIRATORY_MODEL_FILE: &str = "respiratory_model.json";
pub const STRESS_MODEL_FILE: &str = "stress_model.json";

/// Which artifact an error refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactRole {
    Scaler,
    HeartModel,
    RespiratoryModel,
    StressModel,
}

impl ArtifactRole {
    /// File name inside the model directory
    pub fn file_name(&self) -> &'static str {
        match self {
            ArtifactRole::Scaler => SCALER_FILE,
            ArtifactRole::HeartModel => HEART_MODEL_FILE,
            ArtifactRole::RespiratoryModel => RESPIRATORY_MODEL_FILE,
            ArtifactRole::StressModel => STRESS_MODEL_FILE,
        }
    }
}

impl fmt::Display for ArtifactRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ArtifactRole::Scaler => "scaler",
            ArtifactRole::HeartModel => "heart model",
            ArtifactRole::RespiratoryModel => "respiratory model",
            ArtifactRole::StressModel => "stress model",
        };
        f.write_str(name)
    }
}

/// Errors raised while loading model artifacts; all of them are fatal at startup
#[derive(Debug, Error)]
pub enum ArtifactError {
    /// The file could not be read
    #[error("Failed to read {role} from {path}: {source}")]
    Io {
        role: ArtifactRole,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file is not a valid artifact document
    #[error("Failed to parse {role} from {path}: {source}")]
    Parse {
        role: ArtifactRole,
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The document parsed but cannot be used for inference
    #[error("Invalid {role}: {reason}")]
    Invalid { role: ArtifactRole, reason: String },
}

/// The scaler and the three classifiers, loaded once and shared read-only
#[derive(Debug, Clone, PartialEq)]
pub struct ArtifactBundle {
    scaler: StandardScaler,
    heart: Classifier,
    respiratory: Classifier,
    stress: Classifier,
}

impl ArtifactBundle {
    /// Load and validate all four artifacts from `dir`
    pub fn load(dir: impl AsRef<Path>) -> Result<Self, ArtifactError> {
        let dir = dir.as_ref();
        info!("Loading model artifacts from {}", dir.display());

        let bundle = Self::from_parts(
            read_json(dir, ArtifactRole::Scaler)?,
            read_json(dir, ArtifactRole::HeartModel)?,
            read_json(dir, ArtifactRole::RespiratoryModel)?,
            read_json(dir, ArtifactRole::StressModel)?,
        )?;

        info!("Model artifacts loaded from {}", dir.display());
        Ok(bundle)
    }

    /// Assemble a bundle from already parsed artifacts, validating each of them
    pub fn from_parts(
        scaler: StandardScaler,
        heart: Classifier,
        respiratory: Classifier,
        stress: Classifier,
    ) -> Result<Self, ArtifactError> {
        scaler.validate().map_err(|reason| ArtifactError::Invalid {
            role: ArtifactRole::Scaler,
            reason,
        })?;

        validate_binary(&heart, ArtifactRole::HeartModel)?;
        validate_binary(&respiratory, ArtifactRole::RespiratoryModel)?;

        let invalid = |reason: String| ArtifactError::Invalid {
            role: ArtifactRole::StressModel,
            reason,
        };
        stress.validate().map_err(invalid)?;
        if let Some(class) = stress.classes().iter().find(|c| !STRESS_CLASSES.contains(*c)) {
            return Err(invalid(format!("unknown stress class {}", class)));
        }

        Ok(Self { scaler, heart, respiratory, stress })
    }

    pub fn scaler(&self) -> &StandardScaler {
        &self.scaler
    }

    pub fn heart(&self) -> &Classifier {
        &self.heart
    }

    pub fn respiratory(&self) -> &Classifier {
        &self.respiratory
    }

    pub fn stress(&self) -> &Classifier {
        &self.stress
    }
}

fn validate_binary(model: &Classifier, role: ArtifactRole) -> Result<(), ArtifactError> {
    model.validate().map_err(|reason| ArtifactError::Invalid { role, reason })?;
    if model.classes() != [0, 1] {
        return Err(ArtifactError::Invalid {
            role,
            reason: format!("expected classes [0, 1], got {:?}", model.classes()),
        });
    }
    Ok(())
}

fn read_json<T: DeserializeOwned>(dir: &Path, role: ArtifactRole) -> Result<T, ArtifactError> {
    let path = dir.join(role.file_name());
    debug!("Reading {} from {}", role, path.display());

    let raw = fs::read_to_string(&path).map_err(|source| ArtifactError::Io {
        role,
        path: path.clone(),
        source,
    })?;

    serde_json::from_str(&raw).map_err(|source| ArtifactError::Parse { role, path, source })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::classifier::{DecisionTree, LogisticRegression, RandomForest, TreeNode};
    use crate::testing::fixture_artifacts;

    fn shipped_dir() -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("..").join("ml")
    }

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("twin_care_{}_{}", name, uuid::Uuid::new_v4()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn write_bundle(dir: &Path, bundle: &ArtifactBundle) {
        let files: [(&str, String); 4] = [
            (SCALER_FILE, serde_json::to_string(bundle.scaler()).unwrap()),
            (HEART_MODEL_FILE, serde_json::to_string(bundle.heart()).unwrap()),
            (RESPIRATORY_MODEL_FILE, serde_json::to_string(bundle.respiratory()).unwrap()),
            (STRESS_MODEL_FILE, serde_json::to_string(bundle.stress()).unwrap()),
        ];
        for (name, body) in files {
            fs::write(dir.join(name), body).unwrap();
        }
    }

    #[test]
    fn test_shipped_artifacts_load() {
        let bundle = ArtifactBundle::load(shipped_dir()).unwrap();
        assert_eq!(bundle.heart().classes(), &[0, 1]);
        assert_eq!(bundle.stress().classes(), &[0, 1, 2]);
    }

    #[test]
    fn test_load_round_trips_written_bundle() {
        let dir = scratch_dir("round_trip");
        let bundle = fixture_artifacts();
        write_bundle(&dir, &bundle);

        assert_eq!(ArtifactBundle::load(&dir).unwrap(), bundle);
        fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = scratch_dir("missing");
        write_bundle(&dir, &fixture_artifacts());
        fs::remove_file(dir.join(STRESS_MODEL_FILE)).unwrap();

        let err = ArtifactBundle::load(&dir).unwrap_err();
        assert!(matches!(err, ArtifactError::Io { role: ArtifactRole::StressModel, .. }));
        fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn test_corrupt_file_is_parse_error() {
        let dir = scratch_dir("corrupt");
        write_bundle(&dir, &fixture_artifacts());
        fs::write(dir.join(HEART_MODEL_FILE), "{ not json").unwrap();

        let err = ArtifactBundle::load(&dir).unwrap_err();
        assert!(matches!(err, ArtifactError::Parse { role: ArtifactRole::HeartModel, .. }));
        fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn test_role_specific_class_checks() {
        let fixture = fixture_artifacts();

        let three_class_heart = Classifier::RandomForest(RandomForest {
            classes: vec![0, 1, 2],
            trees: vec![DecisionTree { nodes: vec![TreeNode::Leaf { value: vec![1.0, 1.0, 1.0] }] }],
        });
        let err = ArtifactBundle::from_parts(
            fixture.scaler().clone(),
            three_class_heart,
            fixture.respiratory().clone(),
            fixture.stress().clone(),
        ).unwrap_err();
        assert!(matches!(err, ArtifactError::Invalid { role: ArtifactRole::HeartModel, .. }));

        let odd_stress = Classifier::LogisticRegression(LogisticRegression {
            classes: vec![0, 5],
            coefficients: vec![0.0; 4],
            intercept: 0.0,
        });
        let err = ArtifactBundle::from_parts(
            fixture.scaler().clone(),
            fixture.heart().clone(),
            fixture.respiratory().clone(),
            odd_stress,
        ).unwrap_err();
        assert!(err.to_string().contains("unknown stress class 5"));
    }
}
