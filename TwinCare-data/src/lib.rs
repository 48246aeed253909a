// TwinCare Data
// This crate handles persistence for patients, EHR records and vitals

// Database connection management
pub mod database;

// Repository implementations for data access
pub mod repository;

// Data storage models
pub mod models;
