//! Literal decoding.
//!
//! Replicates Java's literal syntax: integer literals in decimal, hex
//! (`0x`) and octal (leading `0`) with an optional `l`/`L` suffix;
//! floating-point literals with optional `f`/`F`/`d`/`D` suffixes;
//! character and string escapes including `\uXXXX` and octal escapes.
//! All messages are produced with Rust's locale-independent formatting,
//! so decode behavior is deterministic across environments.

use thiserror::Error;

/// A decoded literal value, still untyped with respect to any runtime.
#[derive(Clone, Debug, PartialEq)]
pub enum Literal {
    Null,
    Bool(bool),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Char(char),
    Str(String),
}

/// Failure while decoding a literal token.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum LiteralError {
    #[error("invalid integer literal {text:?}: {reason}")]
    Integer { text: String, reason: String },
    #[error("invalid floating-point literal {text:?}")]
    Float { text: String },
    #[error("invalid escape sequence in {text:?}")]
    Escape { text: String },
    #[error("invalid character literal {text:?}")]
    Char { text: String },
}

fn integer_error(text: &str, reason: &str) -> LiteralError {
    LiteralError::Integer {
        text: text.to_owned(),
        reason: reason.to_owned(),
    }
}

/// Decode an integer literal, optionally sign-prefixed (the grammar folds
/// a unary minus into the literal so `-2147483648` is in range).
///
/// Hex and octal literals use the unsigned value range and wrap into the
/// signed type, as in the source language (`0xFFFFFFFF` is `-1`).
pub fn decode_integer(text: &str) -> Result<Literal, LiteralError> {
    let (negative, body) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text),
    };
    let (body, long) = match body.strip_suffix(['l', 'L']) {
        Some(rest) => (rest, true),
        None => (body, false),
    };
    if body.is_empty() {
        return Err(integer_error(text, "no digits"));
    }

    let (digits, radix) = if let Some(hex) = body.strip_prefix("0x").or_else(|| body.strip_prefix("0X")) {
        (hex, 16)
    } else if body.len() > 1 && body.starts_with('0') {
        (&body[1..], 8)
    } else {
        (body, 10)
    };

    let magnitude =
        u64::from_str_radix(digits, radix).map_err(|e| integer_error(text, &e.to_string()))?;

    if long {
        let bits = decode_signed(magnitude, negative, radix == 10, i64::MAX as u64, u64::MAX)
            .ok_or_else(|| integer_error(text, "out of range for long"))?;
        #[allow(clippy::cast_possible_wrap)]
        let value = bits as i64;
        Ok(Literal::Long(value))
    } else {
        let bits = decode_signed(magnitude, negative, radix == 10, i32::MAX as u64, u64::from(u32::MAX))
            .ok_or_else(|| integer_error(text, "out of range for int"))?;
        #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
        let value = bits as u32 as i32;
        Ok(Literal::Int(value))
    }
}

/// Range-check a magnitude and apply the sign, returning the bit pattern
/// as `u64`. Decimal literals use the signed range; hex/octal literals use
/// the full unsigned range.
fn decode_signed(
    magnitude: u64,
    negative: bool,
    decimal: bool,
    signed_max: u64,
    unsigned_max: u64,
) -> Option<u64> {
    let limit = if decimal {
        if negative {
            signed_max + 1
        } else {
            signed_max
        }
    } else {
        unsigned_max
    };
    if magnitude > limit {
        return None;
    }
    Some(if negative {
        magnitude.wrapping_neg()
    } else {
        magnitude
    })
}

/// Decode a floating-point literal, optionally sign-prefixed. An `f`/`F`
/// suffix selects single precision; `d`/`D` or no suffix, double.
pub fn decode_float(text: &str) -> Result<Literal, LiteralError> {
    let error = || LiteralError::Float {
        text: text.to_owned(),
    };
    if let Some(body) = text.strip_suffix(['f', 'F']) {
        let value: f32 = body.parse().map_err(|_| error())?;
        return Ok(Literal::Float(value));
    }
    let body = text.strip_suffix(['d', 'D']).unwrap_or(text);
    let value: f64 = body.parse().map_err(|_| error())?;
    Ok(Literal::Double(value))
}

/// Resolve escape sequences in a string or character literal body
/// (without the surrounding quotes).
pub fn unescape(body: &str) -> Result<String, LiteralError> {
    let error = || LiteralError::Escape {
        text: body.to_owned(),
    };
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let escape = chars.next().ok_or_else(error)?;
        match escape {
            'b' => out.push('\u{8}'),
            't' => out.push('\t'),
            'n' => out.push('\n'),
            'f' => out.push('\u{c}'),
            'r' => out.push('\r'),
            '"' => out.push('"'),
            '\'' => out.push('\''),
            '\\' => out.push('\\'),
            'u' => {
                let hex: String = chars.by_ref().take(4).collect();
                if hex.len() != 4 {
                    return Err(error());
                }
                let code = u32::from_str_radix(&hex, 16).map_err(|_| error())?;
                out.push(char::from_u32(code).ok_or_else(error)?);
            }
            '0'..='7' => {
                // Octal escape: up to three digits, already holding one.
                let mut value = escape as u32 - '0' as u32;
                let mut rest = chars.clone();
                let mut taken = 0;
                while taken < 2 {
                    match rest.next() {
                        Some(d @ '0'..='7') if value * 8 + (d as u32 - '0' as u32) <= 0o377 => {
                            value = value * 8 + (d as u32 - '0' as u32);
                            chars.next();
                            taken += 1;
                        }
                        _ => break,
                    }
                }
                out.push(char::from_u32(value).ok_or_else(error)?);
            }
            _ => return Err(error()),
        }
    }
    Ok(out)
}

/// Decode a character literal body (without quotes) to a single char.
pub fn decode_char(body: &str) -> Result<char, LiteralError> {
    let resolved = unescape(body)?;
    let mut chars = resolved.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(c),
        _ => Err(LiteralError::Char {
            text: body.to_owned(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn decimal_hex_and_octal_integers() {
        assert_eq!(decode_integer("42"), Ok(Literal::Int(42)));
        assert_eq!(decode_integer("0x1F"), Ok(Literal::Int(31)));
        assert_eq!(decode_integer("017"), Ok(Literal::Int(15)));
        assert_eq!(decode_integer("0"), Ok(Literal::Int(0)));
        assert_eq!(decode_integer("42L"), Ok(Literal::Long(42)));
        assert_eq!(decode_integer("0xFFFFFFFF"), Ok(Literal::Int(-1)));
    }

    #[test]
    fn int_range_boundaries() {
        assert_eq!(decode_integer("2147483647"), Ok(Literal::Int(i32::MAX)));
        assert_eq!(decode_integer("-2147483648"), Ok(Literal::Int(i32::MIN)));
        assert!(decode_integer("2147483648").is_err());
        assert_eq!(
            decode_integer("9223372036854775807L"),
            Ok(Literal::Long(i64::MAX))
        );
    }

    #[test]
    fn float_suffixes() {
        assert_eq!(decode_float("1.5"), Ok(Literal::Double(1.5)));
        assert_eq!(decode_float("1.5f"), Ok(Literal::Float(1.5)));
        assert_eq!(decode_float("2d"), Ok(Literal::Double(2.0)));
        assert_eq!(decode_float("1e3"), Ok(Literal::Double(1000.0)));
        assert!(decode_float("abc").is_err());
    }

    #[test]
    fn escapes() {
        assert_eq!(unescape(r"a\nb"), Ok("a\nb".into()));
        assert_eq!(unescape(r"A"), Ok("A".into()));
        assert_eq!(unescape(r"\101"), Ok("A".into()));
        assert_eq!(unescape(r"\477"), Ok("\u{27}7".into()));
        assert!(unescape(r"\q").is_err());
        assert_eq!(decode_char(r"\t"), Ok('\t'));
        assert!(decode_char("ab").is_err());
    }
}
