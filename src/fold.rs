//! Constant folding: check a literal token against its declared scalar type.
//!
//! Integer tokens are accumulated as a sign plus a 128-bit magnitude with
//! checked arithmetic, then compared against the exact bounds of the
//! declared width. Nothing is ever truncated.

use ordered_float::OrderedFloat;

use crate::error::Error;
use crate::ir::{ConstantValue, Literal, ScalarType, Value};

pub fn fold(ty: ScalarType, literal: &Literal) -> Result<ConstantValue, Error> {
    let mismatch = || Error::TypeMismatch {
        ty,
        literal: literal.kind(),
    };

    let value = match (ty, literal) {
        (ScalarType::Bool, Literal::Bool(b)) => Value::Bool(*b),
        (ty, Literal::Int(token)) if ty.is_integer() => fold_int(ty, token)?,
        (ty, Literal::Int(token)) if ty.is_float() => {
            let (negative, magnitude) = parse_int(ty, token)?;
            let value = magnitude as f64;
            fold_float(ty, if negative { -value } else { value }, token)?
        }
        (ty, Literal::Float(value)) if ty.is_float() => fold_float(ty, *value, &value.to_string())?,
        (ScalarType::String, Literal::String(s)) => Value::String(s.clone()),
        (ScalarType::Bytes, Literal::Bytes(b)) => Value::Bytes(b.clone()),
        _ => return Err(mismatch()),
    };
    Ok(ConstantValue::new(ty, value))
}

/// Split an integer token into sign and magnitude. A magnitude past
/// `u128::MAX` cannot fit any supported type and is reported as a range
/// error against `ty`.
fn parse_int(ty: ScalarType, token: &str) -> Result<(bool, u128), Error> {
    let invalid = || Error::InvalidLiteral {
        token: token.to_owned(),
    };
    let (negative, digits) = match token.as_bytes().first() {
        Some(b'-') => (true, &token[1..]),
        Some(b'+') => (false, &token[1..]),
        _ => (false, token),
    };
    if digits.is_empty() {
        return Err(invalid());
    }

    let mut magnitude: u128 = 0;
    for c in digits.chars() {
        let digit = c.to_digit(10).ok_or_else(invalid)?;
        magnitude = magnitude
            .checked_mul(10)
            .and_then(|m| m.checked_add(u128::from(digit)))
            .ok_or_else(|| Error::Range {
                ty,
                literal: token.to_owned(),
            })?;
    }
    Ok((negative, magnitude))
}

fn fold_int(ty: ScalarType, token: &str) -> Result<Value, Error> {
    let out_of_range = || Error::Range {
        ty,
        literal: token.to_owned(),
    };
    let (negative, magnitude) = parse_int(ty, token)?;
    let bits = ty.bit_width().ok_or_else(out_of_range)?;

    if ty.is_signed() {
        // [-2^(bits-1), 2^(bits-1) - 1]
        let limit = 1u128 << (bits - 1);
        let value = if negative {
            if magnitude > limit {
                return Err(out_of_range());
            }
            0i128.checked_sub_unsigned(magnitude).ok_or_else(out_of_range)?
        } else {
            if magnitude >= limit {
                return Err(out_of_range());
            }
            i128::try_from(magnitude).map_err(|_| out_of_range())?
        };
        Ok(Value::Signed(value))
    } else {
        // [0, 2^bits - 1]; `-0` is still zero
        let max = if bits == 128 {
            u128::MAX
        } else {
            (1u128 << bits) - 1
        };
        if (negative && magnitude != 0) || magnitude > max {
            return Err(out_of_range());
        }
        Ok(Value::Unsigned(magnitude))
    }
}

fn fold_float(ty: ScalarType, value: f64, token: &str) -> Result<Value, Error> {
    let fits = value.is_finite() && (ty == ScalarType::F64 || value.abs() <= f64::from(f32::MAX));
    if !fits {
        return Err(Error::Range {
            ty,
            literal: token.to_owned(),
        });
    }
    Ok(Value::Float(OrderedFloat(value)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LiteralKind;

    fn int(token: &str) -> Literal {
        Literal::Int(token.to_owned())
    }

    const TWO_POW_128: &str = "340282366920938463463374607431768211456";
    const TWO_POW_128_MINUS_1: &str = "340282366920938463463374607431768211455";

    #[test]
    fn u128_accepts_its_maximum() {
        let folded = fold(ScalarType::U128, &int(TWO_POW_128_MINUS_1)).unwrap();
        assert_eq!(folded.value(), &Value::Unsigned(u128::MAX));
        assert_eq!(folded.ty(), ScalarType::U128);
    }

    #[test]
    fn u128_rejects_two_pow_128() {
        let err = fold(ScalarType::U128, &int(TWO_POW_128)).unwrap_err();
        assert!(matches!(err, Error::Range { ty: ScalarType::U128, .. }));
    }

    #[test]
    fn i128_bounds_are_exact() {
        let min = fold(ScalarType::I128, &int("-170141183460469231731687303715884105728")).unwrap();
        assert_eq!(min.value(), &Value::Signed(i128::MIN));
        let max = fold(ScalarType::I128, &int("170141183460469231731687303715884105727")).unwrap();
        assert_eq!(max.value(), &Value::Signed(i128::MAX));

        for token in [
            "170141183460469231731687303715884105728",
            "-170141183460469231731687303715884105729",
        ] {
            assert!(matches!(fold(ScalarType::I128, &int(token)), Err(Error::Range { .. })));
        }
    }

    #[test]
    fn narrow_widths_are_checked() {
        assert_eq!(fold(ScalarType::U8, &int("255")).unwrap().value(), &Value::Unsigned(255));
        assert!(matches!(fold(ScalarType::U8, &int("256")), Err(Error::Range { .. })));
        assert!(matches!(fold(ScalarType::U8, &int("-1")), Err(Error::Range { .. })));
        assert_eq!(fold(ScalarType::U8, &int("-0")).unwrap().value(), &Value::Unsigned(0));
        assert_eq!(fold(ScalarType::I8, &int("-128")).unwrap().value(), &Value::Signed(-128));
        assert!(matches!(fold(ScalarType::I8, &int("128")), Err(Error::Range { .. })));
        assert_eq!(
            fold(ScalarType::I64, &int("-9223372036854775808")).unwrap().value(),
            &Value::Signed(i128::from(i64::MIN))
        );
    }

    #[test]
    fn mismatched_literals_are_rejected() {
        let err = fold(ScalarType::U8, &Literal::String("abc".to_owned())).unwrap_err();
        assert_eq!(
            err,
            Error::TypeMismatch {
                ty: ScalarType::U8,
                literal: LiteralKind::String
            }
        );
        assert!(matches!(
            fold(ScalarType::I32, &Literal::Float(1.5)),
            Err(Error::TypeMismatch { .. })
        ));
        assert!(matches!(
            fold(ScalarType::String, &Literal::Bool(true)),
            Err(Error::TypeMismatch { .. })
        ));
        assert!(matches!(fold(ScalarType::Bool, &int("1")), Err(Error::TypeMismatch { .. })));
    }

    #[test]
    fn malformed_integers_are_rejected() {
        for token in ["", "-", "12a", "0x10", "1_000"] {
            assert!(
                matches!(fold(ScalarType::U32, &int(token)), Err(Error::InvalidLiteral { .. })),
                "{token:?}"
            );
        }
    }

    #[test]
    fn floats_fold() {
        let f = fold(ScalarType::F32, &Literal::Float(1.0)).unwrap();
        assert_eq!(f.value(), &Value::Float(OrderedFloat(1.0)));
        let from_int = fold(ScalarType::F64, &int("-2")).unwrap();
        assert_eq!(from_int.value(), &Value::Float(OrderedFloat(-2.0)));
        assert!(matches!(fold(ScalarType::F32, &Literal::Float(1e39)), Err(Error::Range { .. })));
        assert!(fold(ScalarType::F64, &Literal::Float(1e39)).is_ok());
    }

    #[test]
    fn strings_and_bytes_fold() {
        let s = fold(ScalarType::String, &Literal::String("abc".to_owned())).unwrap();
        assert_eq!(s.value(), &Value::String("abc".to_owned()));
        let b = fold(ScalarType::Bytes, &Literal::Bytes(vec![1, 2, 3])).unwrap();
        assert_eq!(b.value(), &Value::Bytes(vec![1, 2, 3]));
    }
}
