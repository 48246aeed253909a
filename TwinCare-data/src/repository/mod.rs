// Repository module structure
pub mod errors;
mod in_memory;
mod patient;
mod storage;
mod vitals;

// Re-export commonly used types
pub use errors::RepositoryError;
pub use patient::{PatientRepository, PatientRepositoryTrait};
pub use vitals::{VitalsRepository, VitalsRepositoryTrait};

// Re-export mocks for both testing and when mock feature is enabled
#[cfg(any(test, feature = "mock"))]
pub use patient::mocks::MockPatientRepository;
#[cfg(any(test, feature = "mock"))]
pub use vitals::mocks::MockVitalsRepository;
