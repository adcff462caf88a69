//! Single-condition evaluation.
//!
//! Operands are converted according to the tested field's type, then
//! compared. Conversion failures never escape: a condition whose data does
//! not convert evaluates to `false` (fail-closed).

use std::cmp::Ordering;

use formrule_core::{ConversionError, FieldType, Operator, Value};

/// Evaluate `current <op> compare` for a field of type `field_type`.
///
/// `None` and `Value::Null` both mean "no value recorded". With an absent
/// operand only `==` (both absent) and `!=` (exactly one absent) can hold.
pub fn evaluate_condition(
    field_type: FieldType,
    current: Option<&Value>,
    op: &Operator,
    compare: Option<&Value>,
) -> bool {
    let current = current.filter(|v| !v.is_null());
    let compare = compare.filter(|v| !v.is_null());

    let (left, right) = match (current, compare) {
        (Some(left), Some(right)) => (left, right),
        (left, right) => {
            return match op {
                Operator::Eq => left.is_none() && right.is_none(),
                Operator::Ne => left.is_some() != right.is_some(),
                _ => false,
            };
        }
    };

    match compare_typed(field_type, left, op, right) {
        Ok(result) => result,
        Err(e) => {
            tracing::trace!(error = %e, op = %op, "condition operand did not convert");
            false
        }
    }
}

fn compare_typed(
    field_type: FieldType,
    left: &Value,
    op: &Operator,
    right: &Value,
) -> Result<bool, ConversionError> {
    match field_type {
        FieldType::Number => {
            let l = left.to_decimal()?;
            let r = right.to_decimal()?;
            Ok(compare_ordering(l.cmp(&r), op))
        }
        FieldType::Date => {
            let l = left.to_datetime()?;
            let r = right.to_datetime()?;
            Ok(compare_ordering(l.cmp(&r), op))
        }
        FieldType::Checkbox => {
            let l = left.to_bool()?;
            let r = right.to_bool()?;
            Ok(match op {
                Operator::Eq => l == r,
                Operator::Ne => l != r,
                _ => false,
            })
        }
        FieldType::Text | FieldType::DropDown | FieldType::CascadingDropDown => {
            Ok(compare_text(&left.to_text(), op, &right.to_text()))
        }
    }
}

/// Relational operators over an already computed ordering.
fn compare_ordering(ordering: Ordering, op: &Operator) -> bool {
    match op {
        Operator::Eq => ordering == Ordering::Equal,
        Operator::Ne => ordering != Ordering::Equal,
        Operator::Gt => ordering == Ordering::Greater,
        Operator::Lt => ordering == Ordering::Less,
        Operator::Ge => ordering != Ordering::Less,
        Operator::Le => ordering != Ordering::Greater,
        _ => false,
    }
}

/// Case-insensitive string operators.
fn compare_text(left: &str, op: &Operator, right: &str) -> bool {
    let left = left.to_lowercase();
    let right = right.to_lowercase();
    match op {
        Operator::Eq => left == right,
        Operator::Ne => left != right,
        Operator::Contains => left.contains(&right),
        Operator::StartsWith => left.starts_with(&right),
        Operator::EndsWith => left.ends_with(&right),
        _ => false,
    }
}
