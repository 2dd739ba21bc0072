//! Binary and unary operator dispatch.
//!
//! Direct pattern matching over the fixed value set. Operands go
//! through the usual numeric promotion first: `byte`, `short`, and
//! `char` widen to `int` on their own, and a mixed pair widens to the
//! wider of the two. `+` on a string concatenates. Integer arithmetic
//! is checked and overflow is an error rather than a silent wrap.

use exl_parse::{BinaryOp, UnaryOp};

use crate::errors::{
    binary_type_mismatch, division_by_zero, integer_overflow, not_orderable, unary_type_mismatch,
    EvalResult,
};
use crate::matcher;
use crate::value::Value;

/// Both operands after binary numeric promotion.
enum Promoted {
    Int(i32, i32),
    Long(i64, i64),
    Float(f32, f32),
    Double(f64, f64),
}

/// The `int`-or-narrower reading of a value.
fn as_i32(value: &Value) -> Option<i32> {
    match value {
        Value::Byte(v) => Some(i32::from(*v)),
        Value::Short(v) => Some(i32::from(*v)),
        Value::Int(v) => Some(*v),
        #[allow(clippy::cast_possible_wrap)]
        Value::Char(c) => Some(u32::from(*c) as i32),
        _ => None,
    }
}

fn rank(value: &Value) -> Option<u8> {
    match value {
        Value::Byte(_) | Value::Short(_) | Value::Int(_) | Value::Char(_) => Some(0),
        Value::Long(_) => Some(1),
        Value::Float(_) => Some(2),
        Value::Double(_) => Some(3),
        _ => None,
    }
}

#[allow(clippy::cast_precision_loss)]
fn promote_pair(lhs: &Value, rhs: &Value) -> Option<Promoted> {
    let wider = rank(lhs)?.max(rank(rhs)?);
    Some(match wider {
        0 => Promoted::Int(as_i32(lhs)?, as_i32(rhs)?),
        1 => Promoted::Long(lhs.as_integral()?, rhs.as_integral()?),
        2 => Promoted::Float(lhs.as_numeric()? as f32, rhs.as_numeric()? as f32),
        _ => Promoted::Double(lhs.as_numeric()?, rhs.as_numeric()?),
    })
}

/// Evaluate one eager binary operator. The lazy logical operators are
/// handled by the interpreter before operands reach this point.
pub(crate) fn binary(op: BinaryOp, lhs: &Value, rhs: &Value) -> EvalResult {
    match op {
        BinaryOp::Add
        | BinaryOp::Subtract
        | BinaryOp::Multiply
        | BinaryOp::Divide
        | BinaryOp::Remainder => arithmetic(op, lhs, rhs),
        BinaryOp::ShiftLeft | BinaryOp::ShiftRight | BinaryOp::ShiftRightUnsigned => {
            shift(op, lhs, rhs)
        }
        BinaryOp::BitwiseAnd | BinaryOp::BitwiseOr | BinaryOp::BitwiseXor => bitwise(op, lhs, rhs),
        BinaryOp::Equal => Ok(Value::Bool(lhs == rhs)),
        BinaryOp::NotEqual => Ok(Value::Bool(lhs != rhs)),
        BinaryOp::Less | BinaryOp::LessEqual | BinaryOp::Greater | BinaryOp::GreaterEqual => {
            compare(op, lhs, rhs)
        }
        BinaryOp::Glob | BinaryOp::Regex => matched(op, lhs, rhs),
        // Lazy operators never reach eager dispatch; treat a slip as a
        // plain mismatch.
        BinaryOp::LogicalAnd | BinaryOp::LogicalOr => {
            Err(binary_type_mismatch(op.symbol(), lhs, rhs))
        }
    }
}

fn arithmetic(op: BinaryOp, lhs: &Value, rhs: &Value) -> EvalResult {
    // String concatenation wins over numeric addition.
    if op == BinaryOp::Add {
        if let Value::Str(s) = lhs {
            return Ok(Value::Str(format!("{s}{rhs}")));
        }
        if let Value::Str(s) = rhs {
            return Ok(Value::Str(format!("{lhs}{s}")));
        }
    }
    let Some(promoted) = promote_pair(lhs, rhs) else {
        return Err(binary_type_mismatch(op.symbol(), lhs, rhs));
    };
    match promoted {
        Promoted::Int(a, b) => int_arithmetic(op, a, b),
        Promoted::Long(a, b) => long_arithmetic(op, a, b),
        Promoted::Float(a, b) => Ok(Value::Float(float_arithmetic(op, a, b))),
        Promoted::Double(a, b) => Ok(Value::Double(double_arithmetic(op, a, b))),
    }
}

fn int_arithmetic(op: BinaryOp, a: i32, b: i32) -> EvalResult {
    let result = match op {
        BinaryOp::Add => a.checked_add(b),
        BinaryOp::Subtract => a.checked_sub(b),
        BinaryOp::Multiply => a.checked_mul(b),
        BinaryOp::Divide if b == 0 => return Err(division_by_zero()),
        BinaryOp::Divide => a.checked_div(b),
        BinaryOp::Remainder if b == 0 => return Err(division_by_zero()),
        _ => a.checked_rem(b),
    };
    result
        .map(Value::Int)
        .ok_or_else(|| integer_overflow(op.symbol()))
}

fn long_arithmetic(op: BinaryOp, a: i64, b: i64) -> EvalResult {
    let result = match op {
        BinaryOp::Add => a.checked_add(b),
        BinaryOp::Subtract => a.checked_sub(b),
        BinaryOp::Multiply => a.checked_mul(b),
        BinaryOp::Divide if b == 0 => return Err(division_by_zero()),
        BinaryOp::Divide => a.checked_div(b),
        BinaryOp::Remainder if b == 0 => return Err(division_by_zero()),
        _ => a.checked_rem(b),
    };
    result
        .map(Value::Long)
        .ok_or_else(|| integer_overflow(op.symbol()))
}

fn float_arithmetic(op: BinaryOp, a: f32, b: f32) -> f32 {
    match op {
        BinaryOp::Add => a + b,
        BinaryOp::Subtract => a - b,
        BinaryOp::Multiply => a * b,
        BinaryOp::Divide => a / b,
        _ => a % b,
    }
}

fn double_arithmetic(op: BinaryOp, a: f64, b: f64) -> f64 {
    match op {
        BinaryOp::Add => a + b,
        BinaryOp::Subtract => a - b,
        BinaryOp::Multiply => a * b,
        BinaryOp::Divide => a / b,
        _ => a % b,
    }
}

/// Shift distances are masked to the operand width, as in the source
/// language, so shifting never overflows.
fn shift(op: BinaryOp, lhs: &Value, rhs: &Value) -> EvalResult {
    let Some(distance) = rhs.as_integral() else {
        return Err(binary_type_mismatch(op.symbol(), lhs, rhs));
    };
    if let Some(v) = as_i32(lhs) {
        #[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
        let s = (distance & 0x1F) as u32;
        return Ok(Value::Int(match op {
            BinaryOp::ShiftLeft => v.wrapping_shl(s),
            BinaryOp::ShiftRight => v.wrapping_shr(s),
            #[allow(clippy::cast_sign_loss, clippy::cast_possible_wrap)]
            _ => ((v as u32).wrapping_shr(s)) as i32,
        }));
    }
    if let Value::Long(v) = lhs {
        #[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
        let s = (distance & 0x3F) as u32;
        return Ok(Value::Long(match op {
            BinaryOp::ShiftLeft => v.wrapping_shl(s),
            BinaryOp::ShiftRight => v.wrapping_shr(s),
            #[allow(clippy::cast_sign_loss, clippy::cast_possible_wrap)]
            _ => ((*v as u64).wrapping_shr(s)) as i64,
        }));
    }
    Err(binary_type_mismatch(op.symbol(), lhs, rhs))
}

fn bitwise(op: BinaryOp, lhs: &Value, rhs: &Value) -> EvalResult {
    if let (Value::Bool(a), Value::Bool(b)) = (lhs, rhs) {
        return Ok(Value::Bool(match op {
            BinaryOp::BitwiseAnd => a & b,
            BinaryOp::BitwiseOr => a | b,
            _ => a ^ b,
        }));
    }
    match promote_pair(lhs, rhs) {
        Some(Promoted::Int(a, b)) => Ok(Value::Int(match op {
            BinaryOp::BitwiseAnd => a & b,
            BinaryOp::BitwiseOr => a | b,
            _ => a ^ b,
        })),
        Some(Promoted::Long(a, b)) => Ok(Value::Long(match op {
            BinaryOp::BitwiseAnd => a & b,
            BinaryOp::BitwiseOr => a | b,
            _ => a ^ b,
        })),
        _ => Err(binary_type_mismatch(op.symbol(), lhs, rhs)),
    }
}

fn compare(op: BinaryOp, lhs: &Value, rhs: &Value) -> EvalResult {
    let ordering = if let (Value::Str(a), Value::Str(b)) = (lhs, rhs) {
        a.cmp(b)
    } else {
        match promote_pair(lhs, rhs) {
            Some(Promoted::Int(a, b)) => a.cmp(&b),
            Some(Promoted::Long(a, b)) => a.cmp(&b),
            Some(Promoted::Float(a, b)) => match a.partial_cmp(&b) {
                Some(o) => o,
                None => return Ok(Value::Bool(false)),
            },
            Some(Promoted::Double(a, b)) => match a.partial_cmp(&b) {
                Some(o) => o,
                None => return Ok(Value::Bool(false)),
            },
            None => return Err(not_orderable(lhs, rhs)),
        }
    };
    Ok(Value::Bool(match op {
        BinaryOp::Less => ordering.is_lt(),
        BinaryOp::LessEqual => ordering.is_le(),
        BinaryOp::Greater => ordering.is_gt(),
        _ => ordering.is_ge(),
    }))
}

/// The match operators. A null subject never matches; the pattern must
/// be a string.
fn matched(op: BinaryOp, lhs: &Value, rhs: &Value) -> EvalResult {
    if matches!(lhs, Value::Null) {
        return Ok(Value::Null);
    }
    let Value::Str(pattern) = rhs else {
        return Err(binary_type_mismatch(op.symbol(), lhs, rhs));
    };
    let subject = lhs.to_string();
    match op {
        BinaryOp::Glob => matcher::glob_match(&subject, pattern),
        _ => matcher::regex_match(&subject, pattern),
    }
}

/// Evaluate a unary operator.
pub(crate) fn unary(op: UnaryOp, operand: &Value) -> EvalResult {
    match op {
        UnaryOp::Not => Ok(Value::Bool(!operand.is_truthy())),
        UnaryOp::Negate => match operand {
            Value::Long(v) => v
                .checked_neg()
                .map(Value::Long)
                .ok_or_else(|| integer_overflow("-")),
            Value::Float(v) => Ok(Value::Float(-v)),
            Value::Double(v) => Ok(Value::Double(-v)),
            other => match as_i32(other) {
                Some(v) => v
                    .checked_neg()
                    .map(Value::Int)
                    .ok_or_else(|| integer_overflow("-")),
                None => Err(unary_type_mismatch("-", operand)),
            },
        },
        UnaryOp::BitwiseNot => match operand {
            Value::Long(v) => Ok(Value::Long(!v)),
            other => match as_i32(other) {
                Some(v) => Ok(Value::Int(!v)),
                None => Err(unary_type_mismatch("~", operand)),
            },
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn promotion_picks_the_wider_operand() {
        assert_eq!(
            binary(BinaryOp::Add, &Value::Int(1), &Value::Long(2)),
            Ok(Value::Long(3))
        );
        assert_eq!(
            binary(BinaryOp::Add, &Value::Byte(1), &Value::Short(2)),
            Ok(Value::Int(3))
        );
        assert_eq!(
            binary(BinaryOp::Multiply, &Value::Int(2), &Value::Double(1.5)),
            Ok(Value::Double(3.0))
        );
        assert_eq!(
            binary(BinaryOp::Add, &Value::Char('a'), &Value::Int(1)),
            Ok(Value::Int(98))
        );
    }

    #[test]
    fn string_concatenation() {
        assert_eq!(
            binary(BinaryOp::Add, &Value::Int(1), &Value::Str("a".into())),
            Ok(Value::Str("1a".into()))
        );
        assert_eq!(
            binary(BinaryOp::Add, &Value::Str("v=".into()), &Value::Null),
            Ok(Value::Str("v=null".into()))
        );
    }

    #[test]
    fn integer_division_by_zero_is_an_error() {
        assert!(binary(BinaryOp::Divide, &Value::Int(1), &Value::Int(0)).is_err());
        assert!(binary(BinaryOp::Remainder, &Value::Long(1), &Value::Long(0)).is_err());
        // Floating point division by zero is infinity, not an error.
        assert_eq!(
            binary(BinaryOp::Divide, &Value::Double(1.0), &Value::Double(0.0)),
            Ok(Value::Double(f64::INFINITY))
        );
    }

    #[test]
    fn overflow_is_an_error() {
        assert!(binary(BinaryOp::Add, &Value::Int(i32::MAX), &Value::Int(1)).is_err());
        assert!(unary(UnaryOp::Negate, &Value::Int(i32::MIN)).is_err());
    }

    #[test]
    fn shifts_mask_the_distance() {
        assert_eq!(
            binary(BinaryOp::ShiftLeft, &Value::Int(1), &Value::Int(3)),
            Ok(Value::Int(8))
        );
        assert_eq!(
            binary(BinaryOp::ShiftRightUnsigned, &Value::Int(-1), &Value::Int(28)),
            Ok(Value::Int(0xF))
        );
        assert_eq!(
            binary(BinaryOp::ShiftRight, &Value::Int(-8), &Value::Int(1)),
            Ok(Value::Int(-4))
        );
        assert_eq!(
            binary(BinaryOp::ShiftLeft, &Value::Int(1), &Value::Int(33)),
            Ok(Value::Int(2))
        );
    }

    #[test]
    fn comparisons() {
        assert_eq!(
            binary(BinaryOp::Less, &Value::Int(1), &Value::Long(2)),
            Ok(Value::Bool(true))
        );
        assert_eq!(
            binary(
                BinaryOp::Less,
                &Value::Str("abc".into()),
                &Value::Str("abd".into())
            ),
            Ok(Value::Bool(true))
        );
        assert!(binary(BinaryOp::Less, &Value::Bool(true), &Value::Int(1)).is_err());
    }

    #[test]
    fn equality_is_never_an_error() {
        assert_eq!(
            binary(BinaryOp::Equal, &Value::Int(7), &Value::Null),
            Ok(Value::Bool(false))
        );
        assert_eq!(
            binary(BinaryOp::Equal, &Value::Null, &Value::Null),
            Ok(Value::Bool(true))
        );
        assert_eq!(
            binary(BinaryOp::NotEqual, &Value::Int(1), &Value::Str("1".into())),
            Ok(Value::Bool(true))
        );
    }

    #[test]
    fn bitwise_on_booleans_is_eager_logic() {
        assert_eq!(
            binary(BinaryOp::BitwiseAnd, &Value::Bool(true), &Value::Bool(false)),
            Ok(Value::Bool(false))
        );
        assert_eq!(
            binary(BinaryOp::BitwiseXor, &Value::Int(6), &Value::Int(3)),
            Ok(Value::Int(5))
        );
    }
}
