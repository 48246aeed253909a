// Public entities for the TwinCare API
// Wire representations of the domain types, with OpenAPI schemas

// Error response shared by all handlers
pub mod common;

// Patients and their EHR records
pub mod patient;

// Vitals, scores and monitoring sessions
pub mod vitals;
