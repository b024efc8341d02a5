//! Exact signed quantities.

use rust_decimal::Decimal;

/// Signed stock quantity (positive = increase, negative = decrease).
///
/// Decimal rather than float so cumulative sums are exact for fractional units.
pub type Quantity = Decimal;
