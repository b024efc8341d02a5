//! HTTP API over the inventory movement ledger: source adapters, the query
//! service, and request/response mapping.

pub mod app;
pub mod config;
pub mod service;
pub mod source;
