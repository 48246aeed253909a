// TwinCare-api lib.rs
//
// HTTP surface of the TwinCare monitoring service: routes, handlers,
// public entities and the OpenAPI document.

pub mod api;
pub mod entities;
pub mod openapi;
