//! Global utility functions (`abs`, `str`, `range`, `print`, ...).

use std::f64::consts::PI;

use gdscript_core::{EvalError, Variant, VariantType};

use crate::{HostType, MethodInfo, UtilityInfo};

use VariantType as T;

fn pure(info: MethodInfo) -> UtilityInfo {
    UtilityInfo { info, pure: true }
}

fn impure(info: MethodInfo) -> UtilityInfo {
    UtilityInfo { info, pure: false }
}

fn float_fn(name: &str, params: &[&str]) -> MethodInfo {
    params
        .iter()
        .fold(MethodInfo::new(name, T::Float), |m, p| m.param(*p, T::Float))
}

fn int_fn(name: &str, params: &[&str]) -> MethodInfo {
    params
        .iter()
        .fold(MethodInfo::new(name, T::Int), |m, p| m.param(*p, T::Int))
}

fn variant_fn(name: &str, params: &[&str]) -> MethodInfo {
    params.iter().fold(MethodInfo::new(name, HostType::Variant), |m, p| {
        m.param(*p, HostType::Variant)
    })
}

/// Signature of a global utility function.
pub fn utility_function(name: &str) -> Option<UtilityInfo> {
    let utility = match name {
        "abs" | "sign" | "floor" | "ceil" | "round" => pure(variant_fn(name, &["x"])),
        "absf" | "signf" | "floorf" | "ceilf" | "roundf" | "sqrt" | "sin" | "cos" | "tan"
        | "exp" | "log" | "deg_to_rad" | "rad_to_deg" => pure(float_fn(name, &["x"])),
        "absi" | "signi" => pure(int_fn(name, &["x"])),
        "floori" | "ceili" | "roundi" => pure(MethodInfo::new(name, T::Int).param("x", T::Float)),
        "pow" => pure(float_fn(name, &["base", "exp"])),
        "atan2" => pure(float_fn(name, &["y", "x"])),
        "fmod" | "fposmod" => pure(float_fn(name, &["x", "y"])),
        "posmod" => pure(int_fn(name, &["x", "y"])),
        "min" | "max" => pure(variant_fn(name, &["a", "b"]).vararg()),
        "minf" | "maxf" => pure(float_fn(name, &["a", "b"])),
        "mini" | "maxi" => pure(int_fn(name, &["a", "b"])),
        "clamp" => pure(variant_fn(name, &["value", "min", "max"])),
        "clampf" => pure(float_fn(name, &["value", "min", "max"])),
        "clampi" => pure(int_fn(name, &["value", "min", "max"])),
        "wrapi" => pure(int_fn(name, &["value", "min", "max"])),
        "wrapf" => pure(float_fn(name, &["value", "min", "max"])),
        "lerp" => pure(variant_fn(name, &["from", "to", "weight"])),
        "lerpf" => pure(float_fn(name, &["from", "to", "weight"])),
        "snapped" => pure(variant_fn(name, &["x", "step"])),
        "is_nan" | "is_inf" => pure(MethodInfo::new(name, T::Bool).param("x", T::Float)),
        "is_equal_approx" => pure(
            MethodInfo::new(name, T::Bool)
                .param("a", T::Float)
                .param("b", T::Float),
        ),
        "str" => pure(MethodInfo::new(name, T::String).vararg()),
        "len" => pure(MethodInfo::new(name, T::Int).param("var", HostType::Variant)),
        "range" => pure(MethodInfo::new(name, T::Array).param("end", T::Int).vararg()),
        "char" => pure(MethodInfo::new(name, T::String).param("char", T::Int)),
        "typeof" => pure(MethodInfo::new(name, T::Int).param("variable", HostType::Variant)),
        "type_string" => pure(MethodInfo::new(name, T::String).param("type", T::Int)),
        "print" | "prints" | "printt" | "printerr" | "print_rich" | "push_error"
        | "push_warning" => impure(MethodInfo::void(name).vararg()),
        "randi" => impure(MethodInfo::new(name, T::Int)),
        "randf" => impure(MethodInfo::new(name, T::Float)),
        "randi_range" => impure(int_fn(name, &["from", "to"])),
        "randf_range" => impure(float_fn(name, &["from", "to"])),
        "randomize" => impure(MethodInfo::void(name)),
        "is_instance_valid" => {
            impure(MethodInfo::new(name, T::Bool).param("instance", HostType::Variant))
        }
        "instance_from_id" => impure(MethodInfo::new(name, HostType::object("Object")).param("id", T::Int)),
        "load" => impure(MethodInfo::new(name, HostType::object("Resource")).param("path", T::String)),
        _ => return None,
    };
    Some(utility)
}

fn invalid(name: &str, message: impl std::fmt::Display) -> EvalError {
    EvalError::InvalidArgument {
        message: format!("{name}(): {message}"),
    }
}

fn arg<'a>(name: &str, args: &'a [Variant], index: usize) -> Result<&'a Variant, EvalError> {
    args.get(index)
        .ok_or_else(|| invalid(name, format!("missing argument {}", index + 1)))
}

fn float_arg(name: &str, args: &[Variant], index: usize) -> Result<f64, EvalError> {
    let value = arg(name, args, index)?;
    value
        .as_float()
        .ok_or_else(|| invalid(name, format!("expected a number, got {}", value.get_type())))
}

fn int_arg(name: &str, args: &[Variant], index: usize) -> Result<i64, EvalError> {
    match arg(name, args, index)? {
        Variant::Int(i) => Ok(*i),
        Variant::Float(f) => Ok(*f as i64),
        Variant::Bool(b) => Ok(*b as i64),
        other => Err(invalid(name, format!("expected int, got {}", other.get_type()))),
    }
}

/// Apply a numeric function keeping ints as ints.
fn numeric(
    name: &str,
    value: &Variant,
    on_int: impl Fn(i64) -> i64,
    on_float: impl Fn(f64) -> f64,
) -> Result<Variant, EvalError> {
    match value {
        Variant::Int(i) => Ok(Variant::Int(on_int(*i))),
        Variant::Float(f) => Ok(Variant::Float(on_float(*f))),
        other => Err(invalid(name, format!("unsupported type {}", other.get_type()))),
    }
}

fn compare_numbers(a: &Variant, b: &Variant) -> Option<std::cmp::Ordering> {
    match (a, b) {
        (Variant::Int(a), Variant::Int(b)) => Some(a.cmp(b)),
        _ => a.as_float()?.partial_cmp(&b.as_float()?),
    }
}

fn extreme(name: &str, args: &[Variant], keep: std::cmp::Ordering) -> Result<Variant, EvalError> {
    let mut best = arg(name, args, 0)?.clone();
    for value in &args[1..] {
        let order = compare_numbers(value, &best)
            .ok_or_else(|| invalid(name, "arguments must be numbers"))?;
        if order == keep {
            best = value.clone();
        }
    }
    if args.iter().all(|v| matches!(v, Variant::Int(_))) {
        Ok(best)
    } else {
        best.as_float()
            .map(Variant::Float)
            .ok_or_else(|| invalid(name, "arguments must be numbers"))
    }
}

fn wrap_int(value: i64, min: i64, max: i64) -> i64 {
    let range = max.wrapping_sub(min);
    if range == 0 {
        return min;
    }
    min.wrapping_add(value.wrapping_sub(min).rem_euclid(range))
}

/// Longest array `range` builds at compile time.
pub const MAX_FOLDED_RANGE: usize = 1 << 16;

fn range(args: &[Variant]) -> Result<Variant, EvalError> {
    let (start, end, step) = match args.len() {
        1 => (0, int_arg("range", args, 0)?, 1),
        2 => (int_arg("range", args, 0)?, int_arg("range", args, 1)?, 1),
        3 => (
            int_arg("range", args, 0)?,
            int_arg("range", args, 1)?,
            int_arg("range", args, 2)?,
        ),
        n => return Err(invalid("range", format!("expected 1 to 3 arguments, got {n}"))),
    };
    if step == 0 {
        return Err(invalid("range", "step cannot be zero"));
    }
    let span = (end as i128 - start as i128).unsigned_abs();
    let len = if (end > start) == (step > 0) && end != start {
        span.div_ceil(step.unsigned_abs() as u128)
    } else {
        0
    };
    if len > MAX_FOLDED_RANGE as u128 {
        return Err(EvalError::TooLarge {
            name: "range".to_string(),
            len,
            limit: MAX_FOLDED_RANGE,
        });
    }

    let mut items = Vec::with_capacity(len as usize);
    let mut next = Some(start);
    while let Some(i) = next.filter(|&i| (step > 0 && i < end) || (step < 0 && i > end)) {
        items.push(Variant::Int(i));
        next = i.checked_add(step);
    }
    Ok(Variant::Array(items))
}

/// Evaluate a pure utility function.
///
/// Impure functions such as `print` or `randi` are never evaluated and
/// report [`EvalError::UnknownFunction`].
///
/// # Examples
///
/// ```
/// use gdscript_core::Variant;
/// use gdscript_registry::call_utility;
///
/// assert_eq!(call_utility("absi", &[Variant::Int(-3)]), Ok(Variant::Int(3)));
/// assert_eq!(
///     call_utility("str", &[Variant::from("hp: "), Variant::Int(10)]),
///     Ok(Variant::from("hp: 10"))
/// );
/// ```
pub fn call_utility(name: &str, args: &[Variant]) -> Result<Variant, EvalError> {
    let unknown = || EvalError::UnknownFunction {
        name: name.to_string(),
    };
    match utility_function(name) {
        Some(utility) if utility.pure => {}
        _ => return Err(unknown()),
    }

    let float = |f: f64| Ok(Variant::Float(f));
    match name {
        "abs" => numeric(name, arg(name, args, 0)?, i64::abs, f64::abs),
        "sign" => numeric(name, arg(name, args, 0)?, i64::signum, |f| {
            if f == 0.0 { 0.0 } else { f.signum() }
        }),
        "floor" => numeric(name, arg(name, args, 0)?, |i| i, f64::floor),
        "ceil" => numeric(name, arg(name, args, 0)?, |i| i, f64::ceil),
        "round" => numeric(name, arg(name, args, 0)?, |i| i, f64::round),
        "absf" => float(float_arg(name, args, 0)?.abs()),
        "signf" => {
            let x = float_arg(name, args, 0)?;
            float(if x == 0.0 { 0.0 } else { x.signum() })
        }
        "floorf" => float(float_arg(name, args, 0)?.floor()),
        "ceilf" => float(float_arg(name, args, 0)?.ceil()),
        "roundf" => float(float_arg(name, args, 0)?.round()),
        "sqrt" => float(float_arg(name, args, 0)?.sqrt()),
        "sin" => float(float_arg(name, args, 0)?.sin()),
        "cos" => float(float_arg(name, args, 0)?.cos()),
        "tan" => float(float_arg(name, args, 0)?.tan()),
        "exp" => float(float_arg(name, args, 0)?.exp()),
        "log" => float(float_arg(name, args, 0)?.ln()),
        "deg_to_rad" => float(float_arg(name, args, 0)? * PI / 180.0),
        "rad_to_deg" => float(float_arg(name, args, 0)? * 180.0 / PI),
        "absi" => Ok(Variant::Int(int_arg(name, args, 0)?.abs())),
        "signi" => Ok(Variant::Int(int_arg(name, args, 0)?.signum())),
        "floori" => Ok(Variant::Int(float_arg(name, args, 0)?.floor() as i64)),
        "ceili" => Ok(Variant::Int(float_arg(name, args, 0)?.ceil() as i64)),
        "roundi" => Ok(Variant::Int(float_arg(name, args, 0)?.round() as i64)),
        "pow" => float(float_arg(name, args, 0)?.powf(float_arg(name, args, 1)?)),
        "atan2" => float(float_arg(name, args, 0)?.atan2(float_arg(name, args, 1)?)),
        "fmod" => float(float_arg(name, args, 0)? % float_arg(name, args, 1)?),
        "fposmod" => float(float_arg(name, args, 0)?.rem_euclid(float_arg(name, args, 1)?)),
        "posmod" => {
            let divisor = int_arg(name, args, 1)?;
            if divisor == 0 {
                return Err(EvalError::ModuloByZero);
            }
            Ok(Variant::Int(int_arg(name, args, 0)?.rem_euclid(divisor)))
        }
        "min" => extreme(name, args, std::cmp::Ordering::Less),
        "max" => extreme(name, args, std::cmp::Ordering::Greater),
        "minf" => float(float_arg(name, args, 0)?.min(float_arg(name, args, 1)?)),
        "maxf" => float(float_arg(name, args, 0)?.max(float_arg(name, args, 1)?)),
        "mini" => Ok(Variant::Int(int_arg(name, args, 0)?.min(int_arg(name, args, 1)?))),
        "maxi" => Ok(Variant::Int(int_arg(name, args, 0)?.max(int_arg(name, args, 1)?))),
        "clamp" => {
            let (value, min, max) = (arg(name, args, 0)?, arg(name, args, 1)?, arg(name, args, 2)?);
            let capped = extreme(name, &[value.clone(), max.clone()], std::cmp::Ordering::Less)?;
            extreme(name, &[capped, min.clone()], std::cmp::Ordering::Greater)
        }
        "clampf" => float(
            float_arg(name, args, 0)?
                .max(float_arg(name, args, 1)?)
                .min(float_arg(name, args, 2)?),
        ),
        "clampi" => Ok(Variant::Int(
            int_arg(name, args, 0)?
                .max(int_arg(name, args, 1)?)
                .min(int_arg(name, args, 2)?),
        )),
        "wrapi" => Ok(Variant::Int(wrap_int(
            int_arg(name, args, 0)?,
            int_arg(name, args, 1)?,
            int_arg(name, args, 2)?,
        ))),
        "wrapf" => {
            let (value, min, max) = (
                float_arg(name, args, 0)?,
                float_arg(name, args, 1)?,
                float_arg(name, args, 2)?,
            );
            let range = max - min;
            float(if range == 0.0 { min } else { min + (value - min).rem_euclid(range) })
        }
        "lerp" | "lerpf" => {
            let (from, to, weight) = (
                float_arg(name, args, 0)?,
                float_arg(name, args, 1)?,
                float_arg(name, args, 2)?,
            );
            float(from + (to - from) * weight)
        }
        "snapped" => {
            let step = arg(name, args, 1)?;
            match (arg(name, args, 0)?, step) {
                (Variant::Int(x), Variant::Int(s)) if *s != 0 => {
                    Ok(Variant::Int(((*x as f64 / *s as f64).round() as i64) * s))
                }
                _ => {
                    let (x, s) = (float_arg(name, args, 0)?, float_arg(name, args, 1)?);
                    float(if s == 0.0 { x } else { (x / s).round() * s })
                }
            }
        }
        "is_nan" => Ok(Variant::Bool(float_arg(name, args, 0)?.is_nan())),
        "is_inf" => Ok(Variant::Bool(float_arg(name, args, 0)?.is_infinite())),
        "is_equal_approx" => {
            let (a, b) = (float_arg(name, args, 0)?, float_arg(name, args, 1)?);
            let tolerance = (a.abs() * 1e-5).max(1e-5);
            Ok(Variant::Bool(a == b || (a - b).abs() < tolerance))
        }
        "str" => Ok(Variant::String(args.iter().map(ToString::to_string).collect())),
        "len" => {
            let value = arg(name, args, 0)?;
            value
                .len()
                .map(|n| Variant::Int(n as i64))
                .ok_or_else(|| invalid(name, format!("{} has no length", value.get_type())))
        }
        "range" => range(args),
        "char" => {
            let code = int_arg(name, args, 0)?;
            u32::try_from(code)
                .ok()
                .and_then(char::from_u32)
                .map(|c| Variant::String(c.to_string()))
                .ok_or_else(|| invalid(name, format!("invalid code point {code}")))
        }
        "typeof" => Ok(Variant::Int(arg(name, args, 0)?.get_type() as u8 as i64)),
        "type_string" => {
            let code = int_arg(name, args, 0)?;
            u8::try_from(code)
                .ok()
                .and_then(VariantType::from_u8)
                .map(|ty| Variant::String(ty.name().to_string()))
                .ok_or_else(|| invalid(name, format!("invalid type {code}")))
        }
        _ => Err(unknown()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signatures() {
        let abs = utility_function("abs").unwrap();
        assert!(abs.pure);
        assert_eq!(abs.info.params.len(), 1);
        let print = utility_function("print").unwrap();
        assert!(!print.pure);
        assert!(print.info.is_vararg());
        assert!(utility_function("not_a_function").is_none());
    }

    #[test]
    fn range_stops_at_the_integer_limit() {
        assert_eq!(
            call_utility("range", &[Variant::Int(i64::MAX - 1), Variant::Int(i64::MAX), Variant::Int(2)]),
            Ok(Variant::Array(vec![Variant::Int(i64::MAX - 1)]))
        );
        assert_eq!(
            call_utility("range", &[Variant::Int(i64::MIN + 1), Variant::Int(i64::MIN), Variant::Int(-3)]),
            Ok(Variant::Array(vec![Variant::Int(i64::MIN + 1)]))
        );
        assert_eq!(
            call_utility("range", &[Variant::Int(5), Variant::Int(0), Variant::Int(2)]),
            Ok(Variant::Array(vec![]))
        );
        assert_eq!(
            call_utility("range", &[Variant::Int(0), Variant::Int(7), Variant::Int(3)]),
            Ok(Variant::Array(vec![Variant::Int(0), Variant::Int(3), Variant::Int(6)]))
        );
    }

    #[test]
    fn huge_ranges_are_not_folded() {
        let len = MAX_FOLDED_RANGE as i64;
        assert!(matches!(
            call_utility("range", &[Variant::Int(len)]),
            Ok(Variant::Array(items)) if items.len() == MAX_FOLDED_RANGE
        ));
        assert!(matches!(
            call_utility("range", &[Variant::Int(400_000_000)]),
            Err(EvalError::TooLarge { len: 400_000_000, .. })
        ));
        assert!(matches!(
            call_utility("range", &[Variant::Int(i64::MIN), Variant::Int(i64::MAX)]),
            Err(EvalError::TooLarge { .. })
        ));
    }

    #[test]
    fn numeric_functions_keep_ints() {
        assert_eq!(call_utility("abs", &[Variant::Int(-4)]), Ok(Variant::Int(4)));
        assert_eq!(call_utility("abs", &[Variant::Float(-4.5)]), Ok(Variant::Float(4.5)));
        assert_eq!(
            call_utility("max", &[Variant::Int(1), Variant::Int(7), Variant::Int(3)]),
            Ok(Variant::Int(7))
        );
        assert_eq!(
            call_utility("min", &[Variant::Int(1), Variant::Float(0.5)]),
            Ok(Variant::Float(0.5))
        );
        assert_eq!(
            call_utility("clamp", &[Variant::Int(15), Variant::Int(0), Variant::Int(10)]),
            Ok(Variant::Int(10))
        );
        assert_eq!(
            call_utility("clamp", &[Variant::Int(-5), Variant::Int(0), Variant::Int(10)]),
            Ok(Variant::Int(0))
        );
    }

    #[test]
    fn range_variants() {
        assert_eq!(
            call_utility("range", &[Variant::Int(3)]),
            Ok(Variant::Array(vec![Variant::Int(0), Variant::Int(1), Variant::Int(2)]))
        );
        assert_eq!(
            call_utility("range", &[Variant::Int(5), Variant::Int(0), Variant::Int(-2)]),
            Ok(Variant::Array(vec![Variant::Int(5), Variant::Int(3), Variant::Int(1)]))
        );
        assert!(call_utility("range", &[Variant::Int(0), Variant::Int(5), Variant::Int(0)]).is_err());
    }

    #[test]
    fn impure_functions_are_not_evaluated() {
        assert_eq!(
            call_utility("randi", &[]),
            Err(EvalError::UnknownFunction { name: "randi".into() })
        );
    }

    #[test]
    fn misc() {
        assert_eq!(call_utility("len", &[Variant::from("abc")]), Ok(Variant::Int(3)));
        assert_eq!(call_utility("typeof", &[Variant::Int(1)]), Ok(Variant::Int(2)));
        assert_eq!(call_utility("char", &[Variant::Int(65)]), Ok(Variant::from("A")));
        assert_eq!(call_utility("posmod", &[Variant::Int(-3), Variant::Int(5)]), Ok(Variant::Int(2)));
        assert_eq!(call_utility("wrapi", &[Variant::Int(12), Variant::Int(0), Variant::Int(10)]), Ok(Variant::Int(2)));
    }
}
