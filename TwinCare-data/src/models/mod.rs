// Storage models, one module per collection
pub mod ehr;
pub mod patient;
pub mod vitals;
