// TwinCare Domain
// This crate contains the monitoring pipeline and the business logic around it

// Runtime configuration read from the environment
pub mod config;

// Domain entities
pub mod entities;

// Model artifacts and inference
pub mod ml;

// Services that implement business logic
pub mod services;

// Health checks and system status
pub mod health;

// Re-export the database module from the data layer for convenience
pub use twin_care_data::database;

// Testing utilities - only available with mock feature
#[cfg(any(test, feature = "mock"))]
pub mod testing;
