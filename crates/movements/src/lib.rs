//! Movement records (canonical shape) and the lookup tables that enrich them.
//!
//! This crate owns the single place where heterogeneous source records are
//! mapped into [`MoveEvent`]; everything downstream only sees the canonical form.

pub mod event;
pub mod lookup;
pub mod normalize;

pub use event::{InlineText, MoveEvent, TransactionType};
pub use lookup::{Item, Location, LookupRow, Lookups, Placeholders, ResolvedLocation, Unit, decode_rows};
pub use normalize::{Field, Normalized, RawMoveRecord, normalize, normalize_all, normalize_detailed};
