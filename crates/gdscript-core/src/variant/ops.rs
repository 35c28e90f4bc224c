//! Operator evaluation on [`Variant`] values.

use std::cmp::Ordering;

use super::{Transform2D, Variant, Vector2i, Vector3i};
use crate::error::EvalError;
use crate::operator::{BinaryOp, UnaryOp};

type Result<T> = std::result::Result<T, EvalError>;

fn invalid_operands(op: BinaryOp, left: &Variant, right: &Variant) -> EvalError {
    EvalError::InvalidOperands {
        op: op.as_str().to_string(),
        left: left.get_type().name().to_string(),
        right: right.get_type().name().to_string(),
    }
}

/// Evaluate a binary operator.
///
/// # Examples
///
/// ```
/// use gdscript_core::{evaluate, BinaryOp, Variant};
///
/// let sum = evaluate(BinaryOp::Add, &Variant::Int(2), &Variant::Float(0.5)).unwrap();
/// assert_eq!(sum, Variant::Float(2.5));
/// ```
pub fn evaluate(op: BinaryOp, left: &Variant, right: &Variant) -> Result<Variant> {
    match op {
        BinaryOp::And => Ok(Variant::Bool(left.booleanize() && right.booleanize())),
        BinaryOp::Or => Ok(Variant::Bool(left.booleanize() || right.booleanize())),
        BinaryOp::Equal => equality(op, left, right).map(Variant::Bool),
        BinaryOp::NotEqual => equality(op, left, right).map(|eq| Variant::Bool(!eq)),
        BinaryOp::Less | BinaryOp::LessEqual | BinaryOp::Greater | BinaryOp::GreaterEqual => {
            let ordering = compare(op, left, right)?;
            let result = match op {
                BinaryOp::Less => ordering == Some(Ordering::Less),
                BinaryOp::LessEqual => matches!(ordering, Some(Ordering::Less | Ordering::Equal)),
                BinaryOp::Greater => ordering == Some(Ordering::Greater),
                _ => matches!(ordering, Some(Ordering::Greater | Ordering::Equal)),
            };
            Ok(Variant::Bool(result))
        }
        BinaryOp::In => contains(op, right, left).map(Variant::Bool),
        _ => arithmetic(op, left, right),
    }
}

/// Evaluate a unary operator.
pub fn evaluate_unary(op: UnaryOp, value: &Variant) -> Result<Variant> {
    let invalid = || EvalError::InvalidUnaryOperand {
        op: op.as_str().to_string(),
        operand: value.get_type().name().to_string(),
    };
    match op {
        UnaryOp::Not => Ok(Variant::Bool(!value.booleanize())),
        UnaryOp::BitNot => match value {
            Variant::Int(i) => Ok(Variant::Int(!i)),
            _ => Err(invalid()),
        },
        UnaryOp::Positive => match value {
            Variant::Int(_)
            | Variant::Float(_)
            | Variant::Vector2(_)
            | Variant::Vector2i(_)
            | Variant::Vector3(_)
            | Variant::Vector3i(_)
            | Variant::Color(_) => Ok(value.clone()),
            _ => Err(invalid()),
        },
        UnaryOp::Negate => match value {
            Variant::Int(i) => Ok(Variant::Int(i.wrapping_neg())),
            Variant::Float(f) => Ok(Variant::Float(-f)),
            Variant::Vector2(v) => Ok(Variant::Vector2(-*v)),
            Variant::Vector2i(v) => Ok(Variant::Vector2i(Vector2i::new(-v.x, -v.y))),
            Variant::Vector3(v) => Ok(Variant::Vector3(-*v)),
            Variant::Vector3i(v) => Ok(Variant::Vector3i(Vector3i::new(-v.x, -v.y, -v.z))),
            Variant::Color(c) => Ok(Variant::Color(c.map(|ch| 1.0 - ch))),
            _ => Err(invalid()),
        },
    }
}

fn equality(op: BinaryOp, left: &Variant, right: &Variant) -> Result<bool> {
    match (left, right) {
        (Variant::Nil, _) | (_, Variant::Nil) => Ok(left == right),
        (Variant::Int(_) | Variant::Float(_), Variant::Int(_) | Variant::Float(_)) => {
            Ok(left.equals(right))
        }
        (
            Variant::String(_) | Variant::StringName(_),
            Variant::String(_) | Variant::StringName(_),
        ) => Ok(left.equals(right)),
        _ if left.get_type() == right.get_type() => Ok(left == right),
        _ => Err(invalid_operands(op, left, right)),
    }
}

fn compare(op: BinaryOp, left: &Variant, right: &Variant) -> Result<Option<Ordering>> {
    let ordering = match (left, right) {
        (Variant::Int(a), Variant::Int(b)) => Some(a.cmp(b)),
        (Variant::Int(_) | Variant::Float(_), Variant::Int(_) | Variant::Float(_)) => {
            let (a, b) = (left.as_float(), right.as_float());
            a.zip(b).and_then(|(a, b)| a.partial_cmp(&b))
        }
        (Variant::Bool(a), Variant::Bool(b)) => Some(a.cmp(b)),
        (
            Variant::String(a) | Variant::StringName(a),
            Variant::String(b) | Variant::StringName(b),
        ) => Some(a.cmp(b)),
        (Variant::Vector2(a), Variant::Vector2(b)) => lexicographic(&[a.x, a.y], &[b.x, b.y]),
        (Variant::Vector2i(a), Variant::Vector2i(b)) => Some((a.x, a.y).cmp(&(b.x, b.y))),
        (Variant::Vector3(a), Variant::Vector3(b)) => {
            lexicographic(&[a.x, a.y, a.z], &[b.x, b.y, b.z])
        }
        (Variant::Vector3i(a), Variant::Vector3i(b)) => {
            Some((a.x, a.y, a.z).cmp(&(b.x, b.y, b.z)))
        }
        _ => return Err(invalid_operands(op, left, right)),
    };
    Ok(ordering)
}

fn lexicographic(a: &[f64], b: &[f64]) -> Option<Ordering> {
    for (x, y) in a.iter().zip(b) {
        match x.partial_cmp(y)? {
            Ordering::Equal => continue,
            other => return Some(other),
        }
    }
    Some(Ordering::Equal)
}

fn contains(op: BinaryOp, container: &Variant, item: &Variant) -> Result<bool> {
    match container {
        Variant::Array(items) => Ok(items.iter().any(|v| v.equals(item))),
        Variant::Dictionary(dict) => Ok(dict.contains_key(item)),
        Variant::String(haystack) | Variant::StringName(haystack) => match item.as_str() {
            Some(needle) => Ok(haystack.contains(needle)),
            None => Err(invalid_operands(op, item, container)),
        },
        _ => match container.array_elements() {
            Some(items) => Ok(items.iter().any(|v| v.equals(item))),
            None => Err(invalid_operands(op, item, container)),
        },
    }
}

fn int_op(op: BinaryOp, a: i64, b: i64) -> Result<Variant> {
    let value = match op {
        BinaryOp::Add => a.wrapping_add(b),
        BinaryOp::Subtract => a.wrapping_sub(b),
        BinaryOp::Multiply => a.wrapping_mul(b),
        BinaryOp::Divide => {
            if b == 0 {
                return Err(EvalError::DivisionByZero);
            }
            a.wrapping_div(b)
        }
        BinaryOp::Modulo => {
            if b == 0 {
                return Err(EvalError::ModuloByZero);
            }
            a.wrapping_rem(b)
        }
        BinaryOp::Power => match u32::try_from(b) {
            Ok(exp) => a.wrapping_pow(exp),
            Err(_) => return Ok(Variant::Float((a as f64).powf(b as f64))),
        },
        BinaryOp::ShiftLeft | BinaryOp::ShiftRight => {
            let Ok(shift) = u32::try_from(b) else {
                return Err(EvalError::InvalidArgument {
                    message: format!("Invalid shift amount: {}.", b),
                });
            };
            if op == BinaryOp::ShiftLeft {
                a.checked_shl(shift).unwrap_or(0)
            } else {
                a.checked_shr(shift).unwrap_or(if a < 0 { -1 } else { 0 })
            }
        }
        BinaryOp::BitAnd => a & b,
        BinaryOp::BitOr => a | b,
        BinaryOp::BitXor => a ^ b,
        _ => {
            return Err(invalid_operands(op, &Variant::Int(a), &Variant::Int(b)));
        }
    };
    Ok(Variant::Int(value))
}

fn float_op(op: BinaryOp, left: &Variant, right: &Variant, a: f64, b: f64) -> Result<Variant> {
    let value = match op {
        BinaryOp::Add => a + b,
        BinaryOp::Subtract => a - b,
        BinaryOp::Multiply => a * b,
        BinaryOp::Divide => a / b,
        BinaryOp::Power => a.powf(b),
        _ => return Err(invalid_operands(op, left, right)),
    };
    Ok(Variant::Float(value))
}

fn int_component(op: BinaryOp, x: i32, y: i32) -> Option<Result<i32>> {
    Some(match op {
        BinaryOp::Add => Ok(x.wrapping_add(y)),
        BinaryOp::Subtract => Ok(x.wrapping_sub(y)),
        BinaryOp::Multiply => Ok(x.wrapping_mul(y)),
        BinaryOp::Divide if y == 0 => Err(EvalError::DivisionByZero),
        BinaryOp::Divide => Ok(x.wrapping_div(y)),
        BinaryOp::Modulo if y == 0 => Err(EvalError::ModuloByZero),
        BinaryOp::Modulo => Ok(x.wrapping_rem(y)),
        _ => return None,
    })
}

fn vec2i_op(op: BinaryOp, a: Vector2i, b: Vector2i) -> Result<Vector2i> {
    let invalid = || invalid_operands(op, &Variant::Vector2i(a), &Variant::Vector2i(b));
    let x = int_component(op, a.x, b.x).ok_or_else(invalid)??;
    let y = int_component(op, a.y, b.y).ok_or_else(invalid)??;
    Ok(Vector2i::new(x, y))
}

fn vec3i_op(op: BinaryOp, a: Vector3i, b: Vector3i) -> Result<Vector3i> {
    let invalid = || invalid_operands(op, &Variant::Vector3i(a), &Variant::Vector3i(b));
    let x = int_component(op, a.x, b.x).ok_or_else(invalid)??;
    let y = int_component(op, a.y, b.y).ok_or_else(invalid)??;
    let z = int_component(op, a.z, b.z).ok_or_else(invalid)??;
    Ok(Vector3i::new(x, y, z))
}

fn arithmetic(op: BinaryOp, left: &Variant, right: &Variant) -> Result<Variant> {
    use BinaryOp::{Add, Divide, Modulo, Multiply, Subtract};
    let invalid = || invalid_operands(op, left, right);

    match (left, right) {
        (Variant::Int(a), Variant::Int(b)) => int_op(op, *a, *b),
        (Variant::Int(_) | Variant::Float(_), Variant::Int(_) | Variant::Float(_)) => {
            let (Some(a), Some(b)) = (left.as_float(), right.as_float()) else {
                return Err(invalid());
            };
            float_op(op, left, right, a, b)
        }

        // Strings.
        (
            Variant::String(a) | Variant::StringName(a),
            Variant::String(b) | Variant::StringName(b),
        ) if op == Add => Ok(Variant::String(format!("{}{}", a, b))),
        (Variant::String(format), _) if op == Modulo => format_string(format, right),

        // Float vectors.
        (Variant::Vector2(a), Variant::Vector2(b)) => match op {
            Add => Ok(Variant::Vector2(*a + *b)),
            Subtract => Ok(Variant::Vector2(*a - *b)),
            Multiply => Ok(Variant::Vector2(*a * *b)),
            Divide => Ok(Variant::Vector2(*a / *b)),
            _ => Err(invalid()),
        },
        (Variant::Vector3(a), Variant::Vector3(b)) => match op {
            Add => Ok(Variant::Vector3(*a + *b)),
            Subtract => Ok(Variant::Vector3(*a - *b)),
            Multiply => Ok(Variant::Vector3(*a * *b)),
            Divide => Ok(Variant::Vector3(*a / *b)),
            _ => Err(invalid()),
        },
        (Variant::Vector2(v), Variant::Int(_) | Variant::Float(_)) => {
            let s = right.as_float().ok_or_else(invalid)?;
            match op {
                Multiply => Ok(Variant::Vector2(*v * s)),
                Divide => Ok(Variant::Vector2(*v / s)),
                _ => Err(invalid()),
            }
        }
        (Variant::Vector3(v), Variant::Int(_) | Variant::Float(_)) => {
            let s = right.as_float().ok_or_else(invalid)?;
            match op {
                Multiply => Ok(Variant::Vector3(*v * s)),
                Divide => Ok(Variant::Vector3(*v / s)),
                _ => Err(invalid()),
            }
        }
        (Variant::Int(_) | Variant::Float(_), Variant::Vector2(v)) if op == Multiply => {
            let s = left.as_float().ok_or_else(invalid)?;
            Ok(Variant::Vector2(*v * s))
        }
        (Variant::Int(_) | Variant::Float(_), Variant::Vector3(v)) if op == Multiply => {
            let s = left.as_float().ok_or_else(invalid)?;
            Ok(Variant::Vector3(*v * s))
        }

        // Integer vectors.
        (Variant::Vector2i(a), Variant::Vector2i(b)) => vec2i_op(op, *a, *b).map(Variant::Vector2i),
        (Variant::Vector3i(a), Variant::Vector3i(b)) => vec3i_op(op, *a, *b).map(Variant::Vector3i),
        (Variant::Vector2i(v), Variant::Int(s)) => {
            let s = i32::try_from(*s).map_err(|_| invalid())?;
            match op {
                Multiply | Divide | Modulo => {
                    vec2i_op(op, *v, Vector2i::new(s, s)).map(Variant::Vector2i)
                }
                _ => Err(invalid()),
            }
        }
        (Variant::Vector3i(v), Variant::Int(s)) => {
            let s = i32::try_from(*s).map_err(|_| invalid())?;
            match op {
                Multiply | Divide | Modulo => {
                    vec3i_op(op, *v, Vector3i::new(s, s, s)).map(Variant::Vector3i)
                }
                _ => Err(invalid()),
            }
        }
        (Variant::Vector2i(v), Variant::Float(s)) => match op {
            Multiply => Ok(Variant::Vector2(v.to_float() * *s)),
            Divide => Ok(Variant::Vector2(v.to_float() / *s)),
            _ => Err(invalid()),
        },
        (Variant::Vector3i(v), Variant::Float(s)) => match op {
            Multiply => Ok(Variant::Vector3(v.to_float() * *s)),
            Divide => Ok(Variant::Vector3(v.to_float() / *s)),
            _ => Err(invalid()),
        },
        (Variant::Int(s), Variant::Vector2i(v)) if op == Multiply => {
            let s = i32::try_from(*s).map_err(|_| invalid())?;
            vec2i_op(op, *v, Vector2i::new(s, s)).map(Variant::Vector2i)
        }
        (Variant::Int(s), Variant::Vector3i(v)) if op == Multiply => {
            let s = i32::try_from(*s).map_err(|_| invalid())?;
            vec3i_op(op, *v, Vector3i::new(s, s, s)).map(Variant::Vector3i)
        }

        // Colors.
        (Variant::Color(a), Variant::Color(b)) => match op {
            Add => Ok(Variant::Color(a.zip(*b, |x, y| x + y))),
            Subtract => Ok(Variant::Color(a.zip(*b, |x, y| x - y))),
            Multiply => Ok(Variant::Color(a.zip(*b, |x, y| x * y))),
            Divide => Ok(Variant::Color(a.zip(*b, |x, y| x / y))),
            _ => Err(invalid()),
        },
        (Variant::Color(c), Variant::Int(_) | Variant::Float(_)) => {
            let s = right.as_float().ok_or_else(invalid)?;
            match op {
                Multiply => Ok(Variant::Color(c.map(|x| x * s))),
                Divide => Ok(Variant::Color(c.map(|x| x / s))),
                _ => Err(invalid()),
            }
        }
        (Variant::Int(_) | Variant::Float(_), Variant::Color(c)) if op == Multiply => {
            let s = left.as_float().ok_or_else(invalid)?;
            Ok(Variant::Color(c.map(|x| x * s)))
        }

        // Transforms.
        (Variant::Transform2D(a), Variant::Transform2D(b)) if op == Multiply => {
            Ok(Variant::Transform2D(Transform2D::compose(*a, *b)))
        }
        (Variant::Transform2D(t), Variant::Vector2(v)) if op == Multiply => {
            Ok(Variant::Vector2(t.xform(*v)))
        }

        // Containers.
        (Variant::Array(a), Variant::Array(b)) if op == Add => {
            Ok(Variant::Array(a.iter().chain(b).cloned().collect()))
        }
        (Variant::Dictionary(_), Variant::Dictionary(_)) => Err(invalid()),
        (a, b) if op == Add && a.get_type() == b.get_type() && a.get_type().is_packed_array() => {
            concat_packed(a, b).ok_or_else(invalid)
        }

        _ => Err(invalid()),
    }
}

fn concat_packed(a: &Variant, b: &Variant) -> Option<Variant> {
    fn cat<T: Clone>(a: &[T], b: &[T]) -> Vec<T> {
        a.iter().chain(b).cloned().collect()
    }
    Some(match (a, b) {
        (Variant::PackedByteArray(a), Variant::PackedByteArray(b)) => {
            Variant::PackedByteArray(cat(a, b))
        }
        (Variant::PackedInt32Array(a), Variant::PackedInt32Array(b)) => {
            Variant::PackedInt32Array(cat(a, b))
        }
        (Variant::PackedInt64Array(a), Variant::PackedInt64Array(b)) => {
            Variant::PackedInt64Array(cat(a, b))
        }
        (Variant::PackedFloat32Array(a), Variant::PackedFloat32Array(b)) => {
            Variant::PackedFloat32Array(cat(a, b))
        }
        (Variant::PackedFloat64Array(a), Variant::PackedFloat64Array(b)) => {
            Variant::PackedFloat64Array(cat(a, b))
        }
        (Variant::PackedStringArray(a), Variant::PackedStringArray(b)) => {
            Variant::PackedStringArray(cat(a, b))
        }
        (Variant::PackedVector2Array(a), Variant::PackedVector2Array(b)) => {
            Variant::PackedVector2Array(cat(a, b))
        }
        (Variant::PackedVector3Array(a), Variant::PackedVector3Array(b)) => {
            Variant::PackedVector3Array(cat(a, b))
        }
        (Variant::PackedColorArray(a), Variant::PackedColorArray(b)) => {
            Variant::PackedColorArray(cat(a, b))
        }
        _ => return None,
    })
}

/// `format % args` with `%s`, `%d`, `%f` / `%.Nf` and `%%` placeholders.
fn format_string(format: &str, args: &Variant) -> Result<Variant> {
    let args: Vec<Variant> = match args {
        Variant::Array(items) => items.clone(),
        other => vec![other.clone()],
    };
    let mut out = String::with_capacity(format.len());
    let mut next = args.iter();
    let mut chars = format.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }
        let mut precision: Option<usize> = None;
        if chars.peek() == Some(&'.') {
            chars.next();
            let mut digits = String::new();
            while let Some(d) = chars.peek().copied().filter(char::is_ascii_digit) {
                digits.push(d);
                chars.next();
            }
            precision = digits.parse().ok();
        }
        let Some(spec) = chars.next() else {
            return Err(EvalError::InvalidArgument {
                message: "incomplete format".into(),
            });
        };
        if spec == '%' {
            out.push('%');
            continue;
        }
        let Some(arg) = next.next() else {
            return Err(EvalError::InvalidArgument {
                message: "not enough arguments for format string".into(),
            });
        };
        match spec {
            's' => out.push_str(&arg.to_string()),
            'd' => match arg.as_float() {
                Some(n) => out.push_str(&(n as i64).to_string()),
                None => {
                    return Err(EvalError::InvalidArgument {
                        message: "a number is required".into(),
                    });
                }
            },
            'f' => match arg.as_float() {
                Some(n) => out.push_str(&format!("{:.*}", precision.unwrap_or(6), n)),
                None => {
                    return Err(EvalError::InvalidArgument {
                        message: "a number is required".into(),
                    });
                }
            },
            other => {
                return Err(EvalError::InvalidArgument {
                    message: format!("unsupported format character '{}'", other),
                });
            }
        }
    }
    if next.next().is_some() {
        return Err(EvalError::InvalidArgument {
            message: "not all arguments converted during string formatting".into(),
        });
    }
    Ok(Variant::String(out))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::variant::Vector2;

    #[test]
    fn integer_arithmetic() {
        assert_eq!(
            evaluate(BinaryOp::Divide, &Variant::Int(7), &Variant::Int(2)),
            Ok(Variant::Int(3))
        );
        assert_eq!(
            evaluate(BinaryOp::Power, &Variant::Int(2), &Variant::Int(10)),
            Ok(Variant::Int(1024))
        );
        assert_eq!(
            evaluate(BinaryOp::ShiftLeft, &Variant::Int(1), &Variant::Int(4)),
            Ok(Variant::Int(16))
        );
    }

    #[test]
    fn division_by_zero_fails() {
        assert_eq!(
            evaluate(BinaryOp::Divide, &Variant::Int(1), &Variant::Int(0)),
            Err(EvalError::DivisionByZero)
        );
        assert_eq!(
            evaluate(BinaryOp::Modulo, &Variant::Int(1), &Variant::Int(0)),
            Err(EvalError::ModuloByZero)
        );
        // Float division follows IEEE.
        assert_eq!(
            evaluate(BinaryOp::Divide, &Variant::Float(1.0), &Variant::Int(0)),
            Ok(Variant::Float(f64::INFINITY))
        );
    }

    #[test]
    fn mixed_numeric_promotes_to_float() {
        assert_eq!(
            evaluate(BinaryOp::Multiply, &Variant::Int(3), &Variant::Float(0.5)),
            Ok(Variant::Float(1.5))
        );
    }

    #[test]
    fn float_modulo_is_invalid() {
        assert!(matches!(
            evaluate(BinaryOp::Modulo, &Variant::Float(3.0), &Variant::Float(2.0)),
            Err(EvalError::InvalidOperands { .. })
        ));
    }

    #[test]
    fn string_operations() {
        assert_eq!(
            evaluate(BinaryOp::Add, &Variant::from("ab"), &Variant::from("cd")),
            Ok(Variant::from("abcd"))
        );
        assert_eq!(
            evaluate(
                BinaryOp::Modulo,
                &Variant::from("%s has %d hp (%.1f%%)"),
                &Variant::Array(vec![Variant::from("bob"), Variant::Int(10), Variant::Float(50.0)])
            ),
            Ok(Variant::from("bob has 10 hp (50.0%)"))
        );
        assert_eq!(
            evaluate(BinaryOp::In, &Variant::from("b"), &Variant::from("abc")),
            Ok(Variant::Bool(true))
        );
    }

    #[test]
    fn incompatible_operands_name_types() {
        let err = evaluate(BinaryOp::Add, &Variant::Int(1), &Variant::from("a")).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid operands \"int\" and \"String\" for \"+\" operator."
        );
    }

    #[test]
    fn vector_operations() {
        let v = Variant::Vector2(Vector2::new(1.0, 2.0));
        assert_eq!(
            evaluate(BinaryOp::Multiply, &v, &Variant::Int(2)),
            Ok(Variant::Vector2(Vector2::new(2.0, 4.0)))
        );
        let vi = Variant::Vector2i(Vector2i::new(4, 6));
        assert_eq!(
            evaluate(BinaryOp::Divide, &vi, &Variant::Int(2)),
            Ok(Variant::Vector2i(Vector2i::new(2, 3)))
        );
        assert_eq!(
            evaluate(BinaryOp::Divide, &vi, &Variant::Int(0)),
            Err(EvalError::DivisionByZero)
        );
        assert_eq!(
            evaluate(BinaryOp::Multiply, &vi, &Variant::Float(0.5)),
            Ok(Variant::Vector2(Vector2::new(2.0, 3.0)))
        );
    }

    #[test]
    fn comparisons_and_logic() {
        assert_eq!(
            evaluate(BinaryOp::Less, &Variant::Int(1), &Variant::Float(1.5)),
            Ok(Variant::Bool(true))
        );
        assert_eq!(
            evaluate(BinaryOp::Equal, &Variant::Nil, &Variant::Int(0)),
            Ok(Variant::Bool(false))
        );
        assert_eq!(
            evaluate(BinaryOp::And, &Variant::Int(1), &Variant::from("")),
            Ok(Variant::Bool(false))
        );
        assert!(evaluate(BinaryOp::Equal, &Variant::Int(1), &Variant::from("1")).is_err());
    }

    #[test]
    fn array_concat_and_membership() {
        let a = Variant::Array(vec![Variant::Int(1)]);
        let b = Variant::Array(vec![Variant::Int(2)]);
        assert_eq!(
            evaluate(BinaryOp::Add, &a, &b),
            Ok(Variant::Array(vec![Variant::Int(1), Variant::Int(2)]))
        );
        assert_eq!(
            evaluate(BinaryOp::In, &Variant::Float(2.0), &b),
            Ok(Variant::Bool(true))
        );
    }

    #[test]
    fn unary_operators() {
        assert_eq!(evaluate_unary(UnaryOp::Negate, &Variant::Int(5)), Ok(Variant::Int(-5)));
        assert_eq!(evaluate_unary(UnaryOp::BitNot, &Variant::Int(0)), Ok(Variant::Int(-1)));
        assert_eq!(evaluate_unary(UnaryOp::Not, &Variant::Nil), Ok(Variant::Bool(true)));
        assert!(evaluate_unary(UnaryOp::Negate, &Variant::from("a")).is_err());
    }
}
