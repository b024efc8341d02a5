//! Foundation building blocks for the movement ledger.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns).

pub mod error;
pub mod id;
pub mod quantity;

pub use error::{DomainError, DomainResult};
pub use id::{LocationCode, MoveId, StockId};
pub use quantity::Quantity;
