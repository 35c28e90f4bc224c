//! Construction, default values and conversions between builtin types.

use super::{Color, Rect2, Transform2D, Variant, VariantType, Vector2, Vector2i, Vector3, Vector3i};
use crate::error::EvalError;

type Result<T> = std::result::Result<T, EvalError>;

/// One registered constructor of a builtin type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConstructorSignature {
    /// Parameter names and types, in order.
    pub params: &'static [(&'static str, VariantType)],
}

impl ConstructorSignature {
    pub fn arity(&self) -> usize {
        self.params.len()
    }
}

const fn sig(params: &'static [(&'static str, VariantType)]) -> ConstructorSignature {
    ConstructorSignature { params }
}

use VariantType as T;

static NONE: &[ConstructorSignature] = &[];
static BOOL: &[ConstructorSignature] = &[
    sig(&[]),
    sig(&[("from", T::Bool)]),
    sig(&[("from", T::Int)]),
    sig(&[("from", T::Float)]),
];
static INT: &[ConstructorSignature] = &[
    sig(&[]),
    sig(&[("from", T::Int)]),
    sig(&[("from", T::Float)]),
    sig(&[("from", T::Bool)]),
    sig(&[("from", T::String)]),
];
static FLOAT: &[ConstructorSignature] = &[
    sig(&[]),
    sig(&[("from", T::Float)]),
    sig(&[("from", T::Int)]),
    sig(&[("from", T::Bool)]),
    sig(&[("from", T::String)]),
];
static STRING: &[ConstructorSignature] = &[
    sig(&[]),
    sig(&[("from", T::String)]),
    sig(&[("from", T::StringName)]),
    sig(&[("from", T::NodePath)]),
];
static VECTOR2: &[ConstructorSignature] = &[
    sig(&[]),
    sig(&[("from", T::Vector2)]),
    sig(&[("from", T::Vector2i)]),
    sig(&[("x", T::Float), ("y", T::Float)]),
];
static VECTOR2I: &[ConstructorSignature] = &[
    sig(&[]),
    sig(&[("from", T::Vector2i)]),
    sig(&[("from", T::Vector2)]),
    sig(&[("x", T::Int), ("y", T::Int)]),
];
static RECT2: &[ConstructorSignature] = &[
    sig(&[]),
    sig(&[("from", T::Rect2)]),
    sig(&[("position", T::Vector2), ("size", T::Vector2)]),
    sig(&[
        ("x", T::Float),
        ("y", T::Float),
        ("width", T::Float),
        ("height", T::Float),
    ]),
];
static VECTOR3: &[ConstructorSignature] = &[
    sig(&[]),
    sig(&[("from", T::Vector3)]),
    sig(&[("from", T::Vector3i)]),
    sig(&[("x", T::Float), ("y", T::Float), ("z", T::Float)]),
];
static VECTOR3I: &[ConstructorSignature] = &[
    sig(&[]),
    sig(&[("from", T::Vector3i)]),
    sig(&[("from", T::Vector3)]),
    sig(&[("x", T::Int), ("y", T::Int), ("z", T::Int)]),
];
static TRANSFORM2D: &[ConstructorSignature] = &[
    sig(&[]),
    sig(&[("from", T::Transform2D)]),
    sig(&[("rotation", T::Float), ("position", T::Vector2)]),
    sig(&[
        ("x_axis", T::Vector2),
        ("y_axis", T::Vector2),
        ("origin", T::Vector2),
    ]),
];
static COLOR: &[ConstructorSignature] = &[
    sig(&[]),
    sig(&[("from", T::Color)]),
    sig(&[("from", T::Color), ("alpha", T::Float)]),
    sig(&[("r", T::Float), ("g", T::Float), ("b", T::Float)]),
    sig(&[("r", T::Float), ("g", T::Float), ("b", T::Float), ("a", T::Float)]),
    sig(&[("code", T::String)]),
];
static STRING_NAME: &[ConstructorSignature] = &[
    sig(&[]),
    sig(&[("from", T::StringName)]),
    sig(&[("from", T::String)]),
];
static NODE_PATH: &[ConstructorSignature] = &[
    sig(&[]),
    sig(&[("from", T::NodePath)]),
    sig(&[("from", T::String)]),
];
static RID: &[ConstructorSignature] = &[sig(&[]), sig(&[("from", T::Rid)])];
static CALLABLE: &[ConstructorSignature] = &[sig(&[]), sig(&[("from", T::Callable)])];
static SIGNAL: &[ConstructorSignature] = &[sig(&[]), sig(&[("from", T::Signal)])];
static DICTIONARY: &[ConstructorSignature] = &[sig(&[]), sig(&[("from", T::Dictionary)])];
static ARRAY: &[ConstructorSignature] = &[
    sig(&[]),
    sig(&[("from", T::Array)]),
    sig(&[("from", T::PackedByteArray)]),
    sig(&[("from", T::PackedInt32Array)]),
    sig(&[("from", T::PackedInt64Array)]),
    sig(&[("from", T::PackedFloat32Array)]),
    sig(&[("from", T::PackedFloat64Array)]),
    sig(&[("from", T::PackedStringArray)]),
    sig(&[("from", T::PackedVector2Array)]),
    sig(&[("from", T::PackedVector3Array)]),
    sig(&[("from", T::PackedColorArray)]),
];

macro_rules! packed_ctors {
    ($name:ident, $ty:expr) => {
        static $name: &[ConstructorSignature] =
            &[sig(&[]), sig(&[("from", $ty)]), sig(&[("from", T::Array)])];
    };
}

packed_ctors!(PACKED_BYTE, T::PackedByteArray);
packed_ctors!(PACKED_INT32, T::PackedInt32Array);
packed_ctors!(PACKED_INT64, T::PackedInt64Array);
packed_ctors!(PACKED_FLOAT32, T::PackedFloat32Array);
packed_ctors!(PACKED_FLOAT64, T::PackedFloat64Array);
packed_ctors!(PACKED_STRING, T::PackedStringArray);
packed_ctors!(PACKED_VECTOR2, T::PackedVector2Array);
packed_ctors!(PACKED_VECTOR3, T::PackedVector3Array);
packed_ctors!(PACKED_COLOR, T::PackedColorArray);

/// Registered constructors of a builtin type.
///
/// `Nil` and `Object` have none: they are not constructible by name.
pub fn constructor_signatures(ty: VariantType) -> &'static [ConstructorSignature] {
    match ty {
        T::Nil | T::Object => NONE,
        T::Bool => BOOL,
        T::Int => INT,
        T::Float => FLOAT,
        T::String => STRING,
        T::Vector2 => VECTOR2,
        T::Vector2i => VECTOR2I,
        T::Rect2 => RECT2,
        T::Vector3 => VECTOR3,
        T::Vector3i => VECTOR3I,
        T::Transform2D => TRANSFORM2D,
        T::Color => COLOR,
        T::StringName => STRING_NAME,
        T::NodePath => NODE_PATH,
        T::Rid => RID,
        T::Callable => CALLABLE,
        T::Signal => SIGNAL,
        T::Dictionary => DICTIONARY,
        T::Array => ARRAY,
        T::PackedByteArray => PACKED_BYTE,
        T::PackedInt32Array => PACKED_INT32,
        T::PackedInt64Array => PACKED_INT64,
        T::PackedFloat32Array => PACKED_FLOAT32,
        T::PackedFloat64Array => PACKED_FLOAT64,
        T::PackedStringArray => PACKED_STRING,
        T::PackedVector2Array => PACKED_VECTOR2,
        T::PackedVector3Array => PACKED_VECTOR3,
        T::PackedColorArray => PACKED_COLOR,
    }
}

/// Zero value of a builtin type, as held by a typed but uninitialized slot.
pub fn default_for(ty: VariantType) -> Variant {
    match ty {
        T::Nil | T::Object => Variant::Nil,
        T::Bool => Variant::Bool(false),
        T::Int => Variant::Int(0),
        T::Float => Variant::Float(0.0),
        T::String => Variant::String(String::new()),
        T::Vector2 => Variant::Vector2(Vector2::ZERO),
        T::Vector2i => Variant::Vector2i(Vector2i::default()),
        T::Rect2 => Variant::Rect2(Rect2::default()),
        T::Vector3 => Variant::Vector3(Vector3::ZERO),
        T::Vector3i => Variant::Vector3i(Vector3i::default()),
        T::Transform2D => Variant::Transform2D(Transform2D::IDENTITY),
        T::Color => Variant::Color(Color::default()),
        T::StringName => Variant::StringName(String::new()),
        T::NodePath => Variant::NodePath(String::new()),
        T::Rid => Variant::Rid(0),
        T::Callable => Variant::Callable(String::new()),
        T::Signal => Variant::Signal(String::new()),
        T::Dictionary => Variant::Dictionary(Default::default()),
        T::Array => Variant::Array(Vec::new()),
        T::PackedByteArray => Variant::PackedByteArray(Vec::new()),
        T::PackedInt32Array => Variant::PackedInt32Array(Vec::new()),
        T::PackedInt64Array => Variant::PackedInt64Array(Vec::new()),
        T::PackedFloat32Array => Variant::PackedFloat32Array(Vec::new()),
        T::PackedFloat64Array => Variant::PackedFloat64Array(Vec::new()),
        T::PackedStringArray => Variant::PackedStringArray(Vec::new()),
        T::PackedVector2Array => Variant::PackedVector2Array(Vec::new()),
        T::PackedVector3Array => Variant::PackedVector3Array(Vec::new()),
        T::PackedColorArray => Variant::PackedColorArray(Vec::new()),
    }
}

/// A representative non-zero value of a builtin type.
///
/// Used to discover operator result types by evaluation: numbers are never
/// zero, strings are a single `%s` so formatting accepts one argument, and
/// arrays hold one element.
pub fn placeholder_for(ty: VariantType) -> Variant {
    match ty {
        T::Nil => Variant::Nil,
        T::Bool => Variant::Bool(true),
        T::Int => Variant::Int(1),
        T::Float => Variant::Float(1.0),
        T::String => Variant::String("%s".into()),
        T::Vector2 => Variant::Vector2(Vector2::ONE),
        T::Vector2i => Variant::Vector2i(Vector2i::new(1, 1)),
        T::Rect2 => Variant::Rect2(Rect2::new(Vector2::ONE, Vector2::ONE)),
        T::Vector3 => Variant::Vector3(Vector3::ONE),
        T::Vector3i => Variant::Vector3i(Vector3i::new(1, 1, 1)),
        T::Transform2D => Variant::Transform2D(Transform2D::IDENTITY),
        T::Color => Variant::Color(Color::new(1.0, 1.0, 1.0, 1.0)),
        T::StringName => Variant::StringName("%s".into()),
        T::NodePath => Variant::NodePath(".".into()),
        T::Rid => Variant::Rid(1),
        T::Object => Variant::Object(super::ObjectRef::new("Object")),
        T::Callable => Variant::Callable("call".into()),
        T::Signal => Variant::Signal("signal".into()),
        T::Dictionary => Variant::Dictionary(Default::default()),
        T::Array => Variant::Array(vec![Variant::Nil]),
        T::PackedByteArray => Variant::PackedByteArray(vec![1]),
        T::PackedInt32Array => Variant::PackedInt32Array(vec![1]),
        T::PackedInt64Array => Variant::PackedInt64Array(vec![1]),
        T::PackedFloat32Array => Variant::PackedFloat32Array(vec![1.0]),
        T::PackedFloat64Array => Variant::PackedFloat64Array(vec![1.0]),
        T::PackedStringArray => Variant::PackedStringArray(vec!["%s".into()]),
        T::PackedVector2Array => Variant::PackedVector2Array(vec![Vector2::ONE]),
        T::PackedVector3Array => Variant::PackedVector3Array(vec![Vector3::ONE]),
        T::PackedColorArray => Variant::PackedColorArray(vec![Color::new(1.0, 1.0, 1.0, 1.0)]),
    }
}

/// Whether a value of `from` is implicitly convertible to `to`.
///
/// This is the relation the type checker accepts for assignments and
/// arguments when implicit conversion is allowed. It is not symmetric in
/// general and never includes the identity.
pub fn can_convert_strict(from: VariantType, to: VariantType) -> bool {
    if from == to {
        return false;
    }
    match to {
        T::Bool => matches!(from, T::Int | T::Float),
        T::Int => matches!(from, T::Bool | T::Float),
        T::Float => matches!(from, T::Int | T::Bool),
        T::String => matches!(from, T::StringName | T::NodePath),
        T::StringName => matches!(from, T::String),
        T::NodePath => matches!(from, T::String | T::StringName),
        T::Vector2 => from == T::Vector2i,
        T::Vector2i => from == T::Vector2,
        T::Vector3 => from == T::Vector3i,
        T::Vector3i => from == T::Vector3,
        T::Color => matches!(from, T::String | T::Int),
        T::Array => from.is_packed_array(),
        _ if to.is_packed_array() => from == T::Array,
        _ => false,
    }
}

/// Whether an explicit conversion (`as`) from `from` to `to` can succeed.
pub fn can_convert(from: VariantType, to: VariantType) -> bool {
    if from == to || can_convert_strict(from, to) {
        return true;
    }
    match to {
        T::String => !matches!(from, T::Nil | T::Object),
        T::Int | T::Float => from == T::String,
        _ => false,
    }
}

/// Convert a value to another builtin type.
pub fn convert(value: &Variant, to: VariantType) -> Result<Variant> {
    if value.get_type() == to {
        return Ok(value.clone());
    }
    match (value, to) {
        (Variant::Nil, _) => Ok(default_for(to)),
        (_, T::String) => Ok(Variant::String(value.to_string())),
        _ => construct(to, std::slice::from_ref(value)),
    }
}

fn number(value: &Variant) -> Option<f64> {
    match value {
        Variant::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        other => other.as_float(),
    }
}

fn parse_int(s: &str) -> i64 {
    let trimmed = s.trim();
    trimmed
        .parse::<i64>()
        .or_else(|_| trimmed.parse::<f64>().map(|f| f as i64))
        .unwrap_or(0)
}

fn parse_html_color(code: &str) -> Option<Color> {
    let named = match code.to_ascii_lowercase().as_str() {
        "white" => Some(Color::rgb(1.0, 1.0, 1.0)),
        "black" => Some(Color::rgb(0.0, 0.0, 0.0)),
        "red" => Some(Color::rgb(1.0, 0.0, 0.0)),
        "green" => Some(Color::rgb(0.0, 1.0, 0.0)),
        "blue" => Some(Color::rgb(0.0, 0.0, 1.0)),
        "transparent" => Some(Color::new(1.0, 1.0, 1.0, 0.0)),
        _ => None,
    };
    if named.is_some() {
        return named;
    }
    let hex = code.strip_prefix('#').unwrap_or(code);
    let channel = |s: &str| u8::from_str_radix(s, 16).ok().map(|v| v as f64 / 255.0);
    match hex.len() {
        3 | 4 => {
            let digits: Vec<f64> = hex
                .chars()
                .map(|c| {
                    let doubled = format!("{c}{c}");
                    channel(&doubled)
                })
                .collect::<Option<_>>()?;
            let a = digits.get(3).copied().unwrap_or(1.0);
            Some(Color::new(digits[0], digits[1], digits[2], a))
        }
        6 | 8 => {
            let r = channel(hex.get(0..2)?)?;
            let g = channel(hex.get(2..4)?)?;
            let b = channel(hex.get(4..6)?)?;
            let a = match hex.get(6..8) {
                Some(a) => channel(a)?,
                None => 1.0,
            };
            Some(Color::new(r, g, b, a))
        }
        _ => None,
    }
}

fn from_array<E>(items: &[Variant], f: impl Fn(&Variant) -> Option<E>) -> Option<Vec<E>> {
    items.iter().map(f).collect()
}

/// Construct a builtin value from arguments.
///
/// Accepts the shapes listed by [`constructor_signatures`], with numeric
/// arguments converted as the strict relation allows.
pub fn construct(ty: VariantType, args: &[Variant]) -> Result<Variant> {
    let invalid = || EvalError::InvalidConstructor {
        type_name: ty.name().to_string(),
    };
    if ty == T::Nil || ty == T::Object {
        return Err(invalid());
    }
    if args.is_empty() {
        return Ok(default_for(ty));
    }
    if let [single] = args {
        if single.get_type() == ty {
            return Ok(single.clone());
        }
    }

    let value = match (ty, args) {
        (T::Bool, [v]) => Variant::Bool(number(v).ok_or_else(invalid)? != 0.0),
        (T::Int, [Variant::String(s)]) => Variant::Int(parse_int(s)),
        (T::Int, [v]) => Variant::Int(number(v).ok_or_else(invalid)? as i64),
        (T::Float, [Variant::String(s)]) => Variant::Float(s.trim().parse().unwrap_or(0.0)),
        (T::Float, [v]) => Variant::Float(number(v).ok_or_else(invalid)?),
        (T::String, [Variant::StringName(s) | Variant::NodePath(s)]) => Variant::String(s.clone()),
        (T::StringName, [Variant::String(s)]) => Variant::StringName(s.clone()),
        (T::NodePath, [Variant::String(s) | Variant::StringName(s)]) => {
            Variant::NodePath(s.clone())
        }

        (T::Vector2, [Variant::Vector2i(v)]) => Variant::Vector2(v.to_float()),
        (T::Vector2i, [Variant::Vector2(v)]) => Variant::Vector2i(Vector2i::from_float(*v)),
        (T::Vector3, [Variant::Vector3i(v)]) => Variant::Vector3(v.to_float()),
        (T::Vector3i, [Variant::Vector3(v)]) => Variant::Vector3i(Vector3i::from_float(*v)),
        (T::Vector2, [x, y]) => Variant::Vector2(Vector2::new(
            number(x).ok_or_else(invalid)?,
            number(y).ok_or_else(invalid)?,
        )),
        (T::Vector2i, [x, y]) => Variant::Vector2i(Vector2i::new(
            number(x).ok_or_else(invalid)? as i32,
            number(y).ok_or_else(invalid)? as i32,
        )),
        (T::Vector3, [x, y, z]) => Variant::Vector3(Vector3::new(
            number(x).ok_or_else(invalid)?,
            number(y).ok_or_else(invalid)?,
            number(z).ok_or_else(invalid)?,
        )),
        (T::Vector3i, [x, y, z]) => Variant::Vector3i(Vector3i::new(
            number(x).ok_or_else(invalid)? as i32,
            number(y).ok_or_else(invalid)? as i32,
            number(z).ok_or_else(invalid)? as i32,
        )),

        (T::Rect2, [Variant::Vector2(position), Variant::Vector2(size)]) => {
            Variant::Rect2(Rect2::new(*position, *size))
        }
        (T::Rect2, [x, y, w, h]) => Variant::Rect2(Rect2::new(
            Vector2::new(number(x).ok_or_else(invalid)?, number(y).ok_or_else(invalid)?),
            Vector2::new(number(w).ok_or_else(invalid)?, number(h).ok_or_else(invalid)?),
        )),
        (T::Transform2D, [rotation, Variant::Vector2(position)]) => Variant::Transform2D(
            Transform2D::from_rotation(number(rotation).ok_or_else(invalid)?, *position),
        ),
        (
            T::Transform2D,
            [Variant::Vector2(x), Variant::Vector2(y), Variant::Vector2(origin)],
        ) => Variant::Transform2D(Transform2D {
            x: *x,
            y: *y,
            origin: *origin,
        }),

        (T::Color, [Variant::String(code)]) => {
            Variant::Color(parse_html_color(code).ok_or_else(|| EvalError::InvalidArgument {
                message: format!("Invalid color code: \"{}\".", code),
            })?)
        }
        (T::Color, [Variant::Int(hex)]) => {
            let rgba = *hex as u32;
            let channel = |shift: u32| ((rgba >> shift) & 0xff) as f64 / 255.0;
            Variant::Color(Color::new(channel(24), channel(16), channel(8), channel(0)))
        }
        (T::Color, [Variant::Color(c), alpha]) => Variant::Color(Color {
            a: number(alpha).ok_or_else(invalid)?,
            ..*c
        }),
        (T::Color, [r, g, b]) => Variant::Color(Color::rgb(
            number(r).ok_or_else(invalid)?,
            number(g).ok_or_else(invalid)?,
            number(b).ok_or_else(invalid)?,
        )),
        (T::Color, [r, g, b, a]) => Variant::Color(Color::new(
            number(r).ok_or_else(invalid)?,
            number(g).ok_or_else(invalid)?,
            number(b).ok_or_else(invalid)?,
            number(a).ok_or_else(invalid)?,
        )),

        (T::Array, [packed]) => Variant::Array(packed.array_elements().ok_or_else(invalid)?),
        (_, [Variant::Array(items)]) if ty.is_packed_array() => {
            packed_from_array(ty, items).ok_or_else(invalid)?
        }
        _ => return Err(invalid()),
    };
    Ok(value)
}

fn packed_from_array(ty: VariantType, items: &[Variant]) -> Option<Variant> {
    Some(match ty {
        T::PackedByteArray => {
            Variant::PackedByteArray(from_array(items, |v| v.as_int().map(|i| i as u8))?)
        }
        T::PackedInt32Array => {
            Variant::PackedInt32Array(from_array(items, |v| v.as_int().map(|i| i as i32))?)
        }
        T::PackedInt64Array => Variant::PackedInt64Array(from_array(items, Variant::as_int)?),
        T::PackedFloat32Array => {
            Variant::PackedFloat32Array(from_array(items, |v| v.as_float().map(|f| f as f32))?)
        }
        T::PackedFloat64Array => Variant::PackedFloat64Array(from_array(items, Variant::as_float)?),
        T::PackedStringArray => Variant::PackedStringArray(from_array(items, |v| match v {
            Variant::String(s) | Variant::StringName(s) => Some(s.clone()),
            _ => None,
        })?),
        T::PackedVector2Array => Variant::PackedVector2Array(from_array(items, |v| match v {
            Variant::Vector2(v) => Some(*v),
            _ => None,
        })?),
        T::PackedVector3Array => Variant::PackedVector3Array(from_array(items, |v| match v {
            Variant::Vector3(v) => Some(*v),
            _ => None,
        })?),
        T::PackedColorArray => Variant::PackedColorArray(from_array(items, |v| match v {
            Variant::Color(c) => Some(*c),
            _ => None,
        })?),
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_constructible_type_has_a_default_constructor() {
        for ty in VariantType::ALL {
            let sigs = constructor_signatures(ty);
            if matches!(ty, T::Nil | T::Object) {
                assert!(sigs.is_empty());
                continue;
            }
            assert!(sigs.iter().any(|s| s.arity() == 0), "{ty}");
            assert_eq!(construct(ty, &[]).unwrap().get_type(), ty);
        }
    }

    #[test]
    fn placeholders_have_their_type() {
        for ty in VariantType::ALL {
            assert_eq!(placeholder_for(ty).get_type(), ty, "{ty}");
        }
    }

    #[test]
    fn construct_vectors() {
        assert_eq!(
            construct(T::Vector2, &[Variant::Int(1), Variant::Float(2.5)]),
            Ok(Variant::Vector2(Vector2::new(1.0, 2.5)))
        );
        assert_eq!(
            construct(T::Vector2i, &[Variant::Vector2(Vector2::new(1.9, -1.9))]),
            Ok(Variant::Vector2i(Vector2i::new(1, -1)))
        );
        assert!(construct(T::Vector2, &[Variant::from("x"), Variant::Int(1)]).is_err());
    }

    #[test]
    fn construct_color_from_code() {
        assert_eq!(
            construct(T::Color, &[Variant::from("#ff0000")]),
            Ok(Variant::Color(Color::rgb(1.0, 0.0, 0.0)))
        );
        assert!(construct(T::Color, &[Variant::from("#zz")]).is_err());
    }

    #[test]
    fn packed_round_trip_through_array() {
        let arr = Variant::Array(vec![Variant::Int(1), Variant::Int(2)]);
        let packed = construct(T::PackedInt32Array, std::slice::from_ref(&arr)).unwrap();
        assert_eq!(packed, Variant::PackedInt32Array(vec![1, 2]));
        assert_eq!(construct(T::Array, &[packed]), Ok(arr));
    }

    #[test]
    fn strict_conversion_relation() {
        assert!(can_convert_strict(T::Int, T::Float));
        assert!(can_convert_strict(T::Float, T::Int));
        assert!(can_convert_strict(T::Vector2i, T::Vector2));
        assert!(!can_convert_strict(T::Int, T::Int));
        assert!(!can_convert_strict(T::String, T::Int));
        assert!(can_convert(T::Int, T::String));
    }

    #[test]
    fn convert_values() {
        assert_eq!(convert(&Variant::Float(2.7), T::Int), Ok(Variant::Int(2)));
        assert_eq!(convert(&Variant::Int(5), T::String), Ok(Variant::from("5")));
        assert_eq!(convert(&Variant::Nil, T::Int), Ok(Variant::Int(0)));
        assert_eq!(convert(&Variant::from(" 42 "), T::Int), Ok(Variant::Int(42)));
    }
}
