//! Named and indexed access into builtin values.

use super::{Variant, VariantType};
use crate::error::EvalError;

/// Properties readable by name on a builtin type.
pub fn builtin_property_names(ty: VariantType) -> &'static [&'static str] {
    match ty {
        VariantType::Vector2 | VariantType::Vector2i => &["x", "y"],
        VariantType::Vector3 | VariantType::Vector3i => &["x", "y", "z"],
        VariantType::Rect2 => &["position", "size", "end"],
        VariantType::Transform2D => &["x", "y", "origin"],
        VariantType::Color => &["r", "g", "b", "a", "h", "s", "v", "r8", "g8", "b8", "a8"],
        _ => &[],
    }
}

/// Read a named property of a builtin value.
///
/// # Examples
///
/// ```
/// use gdscript_core::{get_named, Variant, Vector2};
///
/// let v = Variant::Vector2(Vector2::new(3.0, 4.0));
/// assert_eq!(get_named(&v, "y"), Some(Variant::Float(4.0)));
/// assert_eq!(get_named(&v, "w"), None);
/// ```
pub fn get_named(value: &Variant, name: &str) -> Option<Variant> {
    let float = |f: f64| Some(Variant::Float(f));
    let int = |i: i32| Some(Variant::Int(i as i64));
    match (value, name) {
        (Variant::Vector2(v), "x") => float(v.x),
        (Variant::Vector2(v), "y") => float(v.y),
        (Variant::Vector2i(v), "x") => int(v.x),
        (Variant::Vector2i(v), "y") => int(v.y),
        (Variant::Vector3(v), "x") => float(v.x),
        (Variant::Vector3(v), "y") => float(v.y),
        (Variant::Vector3(v), "z") => float(v.z),
        (Variant::Vector3i(v), "x") => int(v.x),
        (Variant::Vector3i(v), "y") => int(v.y),
        (Variant::Vector3i(v), "z") => int(v.z),
        (Variant::Rect2(r), "position") => Some(Variant::Vector2(r.position)),
        (Variant::Rect2(r), "size") => Some(Variant::Vector2(r.size)),
        (Variant::Rect2(r), "end") => Some(Variant::Vector2(r.end())),
        (Variant::Transform2D(t), "x") => Some(Variant::Vector2(t.x)),
        (Variant::Transform2D(t), "y") => Some(Variant::Vector2(t.y)),
        (Variant::Transform2D(t), "origin") => Some(Variant::Vector2(t.origin)),
        (Variant::Color(c), "r") => float(c.r),
        (Variant::Color(c), "g") => float(c.g),
        (Variant::Color(c), "b") => float(c.b),
        (Variant::Color(c), "a") => float(c.a),
        (Variant::Color(c), "h") => float(c.h()),
        (Variant::Color(c), "s") => float(c.s()),
        (Variant::Color(c), "v") => float(c.v()),
        (Variant::Color(c), "r8") => int((c.r * 255.0).round() as i32),
        (Variant::Color(c), "g8") => int((c.g * 255.0).round() as i32),
        (Variant::Color(c), "b8") => int((c.b * 255.0).round() as i32),
        (Variant::Color(c), "a8") => int((c.a * 255.0).round() as i32),
        _ => None,
    }
}

fn resolve_position(index: &Variant, size: usize) -> Result<usize, EvalError> {
    let raw = match index {
        Variant::Int(i) => *i,
        Variant::Float(f) => *f as i64,
        Variant::Bool(b) => *b as i64,
        _ => {
            return Err(EvalError::InvalidIndex {
                base: "Array".into(),
                index: index.get_type().name().into(),
            });
        }
    };
    let position = if raw < 0 { raw + size as i64 } else { raw };
    if position < 0 || position as usize >= size {
        return Err(EvalError::IndexOutOfBounds { index: raw, size });
    }
    Ok(position as usize)
}

/// Read `value[index]`.
pub fn get_indexed(value: &Variant, index: &Variant) -> Result<Variant, EvalError> {
    let invalid = || EvalError::InvalidIndex {
        base: value.get_type().name().to_string(),
        index: index.to_string(),
    };

    if let (Some(name), false) = (index.as_str(), matches!(value, Variant::Dictionary(_))) {
        return get_named(value, name).ok_or_else(invalid);
    }

    match value {
        Variant::Dictionary(dict) => dict.get(index).cloned().ok_or_else(invalid),
        Variant::String(s) | Variant::StringName(s) => {
            let chars: Vec<char> = s.chars().collect();
            let at = resolve_position(index, chars.len())?;
            Ok(Variant::String(chars[at].to_string()))
        }
        Variant::Vector2(_) | Variant::Vector2i(_) | Variant::Vector3(_) | Variant::Vector3i(_) => {
            let names = builtin_property_names(value.get_type());
            let at = resolve_position(index, names.len())?;
            get_named(value, names[at]).ok_or_else(invalid)
        }
        Variant::Color(_) => {
            let at = resolve_position(index, 4)?;
            get_named(value, ["r", "g", "b", "a"][at]).ok_or_else(invalid)
        }
        Variant::Transform2D(_) => {
            let at = resolve_position(index, 3)?;
            get_named(value, ["x", "y", "origin"][at]).ok_or_else(invalid)
        }
        _ => {
            let items = value.array_elements().ok_or_else(invalid)?;
            let at = resolve_position(index, items.len())?;
            Ok(items[at].clone())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::variant::{Color, Dictionary, Vector3i};

    #[test]
    fn array_indexing_wraps_negative() {
        let arr = Variant::Array(vec![Variant::Int(1), Variant::Int(2), Variant::Int(3)]);
        assert_eq!(get_indexed(&arr, &Variant::Int(-1)), Ok(Variant::Int(3)));
        assert_eq!(
            get_indexed(&arr, &Variant::Int(3)),
            Err(EvalError::IndexOutOfBounds { index: 3, size: 3 })
        );
    }

    #[test]
    fn vector_index_and_name() {
        let v = Variant::Vector3i(Vector3i::new(4, 5, 6));
        assert_eq!(get_indexed(&v, &Variant::Int(2)), Ok(Variant::Int(6)));
        assert_eq!(get_indexed(&v, &Variant::from("y")), Ok(Variant::Int(5)));
    }

    #[test]
    fn dictionary_lookup_by_string_key() {
        let mut d = Dictionary::new();
        d.insert(Variant::from("hp"), Variant::Int(10));
        let d = Variant::Dictionary(d);
        assert_eq!(get_indexed(&d, &Variant::from("hp")), Ok(Variant::Int(10)));
        assert!(get_indexed(&d, &Variant::from("mp")).is_err());
    }

    #[test]
    fn color_components() {
        let c = Variant::Color(Color::new(1.0, 0.5, 0.0, 1.0));
        assert_eq!(get_named(&c, "g8"), Some(Variant::Int(128)));
        assert_eq!(get_indexed(&c, &Variant::Int(0)), Ok(Variant::Float(1.0)));
    }

    #[test]
    fn string_indexing() {
        let s = Variant::from("héllo");
        assert_eq!(get_indexed(&s, &Variant::Int(1)), Ok(Variant::from("é")));
    }
}
