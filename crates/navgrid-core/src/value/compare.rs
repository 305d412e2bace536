use crate::value::Value;
use rust_decimal::{Decimal, prelude::ToPrimitive};
use std::cmp::Ordering;

/// Total canonical comparator used for sorting rows.
///
/// Ordering rules:
/// 1. Canonical variant rank (`Null` first)
/// 2. Numeric variants compare by value across `Int`, `Float`, `Decimal`
/// 3. Text compares case-insensitively, raw text breaking ties
/// 4. Same-variant comparison for everything else
#[must_use]
pub fn canonical_cmp(left: &Value, right: &Value) -> Ordering {
    let rank = left.canonical_rank().cmp(&right.canonical_rank());
    if rank != Ordering::Equal {
        return rank;
    }

    match (left, right) {
        (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
        (Value::Text(a), Value::Text(b)) => Value::fold_ci(a)
            .cmp(&Value::fold_ci(b))
            .then_with(|| a.cmp(b)),
        (Value::Date(a), Value::Date(b)) => a.cmp(b),
        (a, b) if a.is_numeric() && b.is_numeric() => cmp_numeric(a, b).unwrap_or(Ordering::Equal),
        _ => Ordering::Equal,
    }
}

/// Compare two numeric values, widening as needed.
/// Returns `None` when either side is not numeric.
pub(crate) fn cmp_numeric(left: &Value, right: &Value) -> Option<Ordering> {
    match (left, right) {
        (Value::Int(a), Value::Int(b)) => Some(a.cmp(b)),
        (Value::Decimal(a), Value::Decimal(b)) => Some(a.cmp(b)),
        (Value::Int(a), Value::Decimal(b)) => Some(Decimal::from(*a).cmp(b)),
        (Value::Decimal(a), Value::Int(b)) => Some(a.cmp(&Decimal::from(*b))),
        (a, b) => Some(as_f64(a)?.total_cmp(&as_f64(b)?)),
    }
}

#[expect(clippy::cast_precision_loss)]
fn as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Int(i) => Some(*i as f64),
        Value::Float(f) => Some(*f),
        Value::Decimal(d) => d.to_f64(),
        _ => None,
    }
}
