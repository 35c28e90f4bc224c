//! Methods and constants of builtin value types.

use gdscript_core::{Color, Transform2D, Variant, VariantType, Vector2, Vector2i, Vector3, Vector3i};

use crate::{HostType, MethodFlags, MethodInfo};

use VariantType as T;

fn method(name: &str, ret: impl Into<HostType>) -> MethodInfo {
    MethodInfo::new(name, ret).flags(MethodFlags::CONST)
}

fn mutator(name: &str) -> MethodInfo {
    MethodInfo::void(name)
}

/// Look up a method callable on a value of a builtin type.
pub fn builtin_method(ty: VariantType, name: &str) -> Option<MethodInfo> {
    if ty.is_packed_array() {
        return packed_array_method(ty, name);
    }
    let m = match (ty, name) {
        (T::String | T::StringName, _) => return string_method(name),
        (T::Vector2 | T::Vector3, _) => return vector_method(ty, name),
        (T::Vector2i | T::Vector3i, "abs") => method(name, ty),
        (T::Vector2i | T::Vector3i, "length") => method(name, T::Float),
        (T::Vector2i | T::Vector3i, "sign") => method(name, ty),
        (T::Rect2, "has_point") => method(name, T::Bool).param("point", T::Vector2),
        (T::Rect2, "intersects") => method(name, T::Bool).param("b", T::Rect2),
        (T::Rect2, "get_center") => method(name, T::Vector2),
        (T::Rect2, "get_area") => method(name, T::Float),
        (T::Rect2, "grow") => method(name, T::Rect2).param("amount", T::Float),
        (T::Transform2D, "get_origin") => method(name, T::Vector2),
        (T::Transform2D, "get_rotation") => method(name, T::Float),
        (T::Transform2D, "inverse") => method(name, T::Transform2D),
        (T::Transform2D, "rotated") => method(name, T::Transform2D).param("angle", T::Float),
        (T::Color, "lerp") => method(name, T::Color)
            .param("to", T::Color)
            .param("weight", T::Float),
        (T::Color, "inverted") => method(name, T::Color),
        (T::Color, "to_html") => method(name, T::String)
            .param("with_alpha", T::Bool)
            .defaults(1),
        (T::Color, "lightened" | "darkened") => method(name, T::Color).param("amount", T::Float),
        (T::NodePath, "is_empty") => method(name, T::Bool),
        (T::NodePath, "get_name_count") => method(name, T::Int),
        (T::NodePath, "get_name") => method(name, T::StringName).param("idx", T::Int),
        (T::Callable, "call") => method(name, HostType::Variant).vararg(),
        (T::Callable, "callv") => method(name, HostType::Variant).param("arguments", T::Array),
        (T::Callable, "bind") => method(name, T::Callable).vararg(),
        (T::Callable, "is_valid") => method(name, T::Bool),
        (T::Signal, "emit") => method(name, HostType::Void).vararg(),
        (T::Signal, "connect") => method(name, T::Int)
            .param("callable", T::Callable)
            .param("flags", T::Int)
            .defaults(1),
        (T::Signal, "disconnect") => mutator(name).param("callable", T::Callable),
        (T::Signal, "is_connected") => method(name, T::Bool).param("callable", T::Callable),
        (T::Array, _) => return array_method(name),
        (T::Dictionary, _) => return dictionary_method(name),
        _ => return None,
    };
    Some(m)
}

fn string_method(name: &str) -> Option<MethodInfo> {
    let m = match name {
        "length" => method(name, T::Int),
        "is_empty" => method(name, T::Bool),
        "to_upper" | "to_lower" | "strip_edges" | "capitalize" => method(name, T::String),
        "to_int" => method(name, T::Int),
        "to_float" => method(name, T::Float),
        "substr" => method(name, T::String)
            .param("from", T::Int)
            .param("len", T::Int)
            .defaults(1),
        "begins_with" | "ends_with" | "contains" => method(name, T::Bool).param("text", T::String),
        "find" => method(name, T::Int)
            .param("what", T::String)
            .param("from", T::Int)
            .defaults(1),
        "replace" => method(name, T::String)
            .param("what", T::String)
            .param("forwhat", T::String),
        "split" => method(name, T::PackedStringArray)
            .param("delimiter", T::String)
            .param("allow_empty", T::Bool)
            .param("maxsplit", T::Int)
            .defaults(3),
        "format" => method(name, T::String)
            .param("values", HostType::Variant)
            .param("placeholder", T::String)
            .defaults(1),
        "repeat" => method(name, T::String).param("count", T::Int),
        _ => return None,
    };
    Some(m)
}

fn vector_method(ty: VariantType, name: &str) -> Option<MethodInfo> {
    let m = match name {
        "length" | "length_squared" => method(name, T::Float),
        "normalized" | "abs" | "floor" | "ceil" | "round" | "sign" => method(name, ty),
        "dot" => method(name, T::Float).param("with", ty),
        "distance_to" => method(name, T::Float).param("to", ty),
        "direction_to" => method(name, ty).param("to", ty),
        "lerp" => method(name, ty).param("to", ty).param("weight", T::Float),
        "is_zero_approx" | "is_normalized" => method(name, T::Bool),
        "angle" if ty == T::Vector2 => method(name, T::Float),
        "angle_to" => method(name, T::Float).param("to", ty),
        "rotated" if ty == T::Vector2 => method(name, ty).param("angle", T::Float),
        "cross" if ty == T::Vector2 => method(name, T::Float).param("with", ty),
        "cross" => method(name, ty).param("with", ty),
        _ => return None,
    };
    Some(m)
}

fn array_method(name: &str) -> Option<MethodInfo> {
    let m = match name {
        "size" => method(name, T::Int),
        "is_empty" => method(name, T::Bool),
        "append" | "push_back" | "push_front" | "erase" => {
            mutator(name).param("value", HostType::Variant)
        }
        "append_array" => mutator(name).param("array", T::Array),
        "pop_back" | "pop_front" | "front" | "back" | "pick_random" => {
            MethodInfo::new(name, HostType::Variant)
        }
        "has" => method(name, T::Bool).param("value", HostType::Variant),
        "find" => method(name, T::Int)
            .param("what", HostType::Variant)
            .param("from", T::Int)
            .defaults(1),
        "insert" => MethodInfo::new(name, T::Int)
            .param("position", T::Int)
            .param("value", HostType::Variant),
        "remove_at" => mutator(name).param("position", T::Int),
        "resize" => MethodInfo::new(name, T::Int).param("size", T::Int),
        "clear" | "sort" | "reverse" | "shuffle" => mutator(name),
        "duplicate" => method(name, T::Array).param("deep", T::Bool).defaults(1),
        "slice" => method(name, T::Array)
            .param("begin", T::Int)
            .param("end", T::Int)
            .defaults(1),
        "filter" | "map" => method(name, T::Array).param("method", T::Callable),
        "any" | "all" => method(name, T::Bool).param("method", T::Callable),
        "max" | "min" => method(name, HostType::Variant),
        _ => return None,
    };
    Some(m)
}

fn dictionary_method(name: &str) -> Option<MethodInfo> {
    let m = match name {
        "size" => method(name, T::Int),
        "is_empty" => method(name, T::Bool),
        "has" => method(name, T::Bool).param("key", HostType::Variant),
        "has_all" => method(name, T::Bool).param("keys", T::Array),
        "keys" | "values" => method(name, T::Array),
        "get" => method(name, HostType::Variant)
            .param("key", HostType::Variant)
            .param("default", HostType::Variant)
            .defaults(1),
        "erase" => MethodInfo::new(name, T::Bool).param("key", HostType::Variant),
        "merge" => mutator(name)
            .param("dictionary", T::Dictionary)
            .param("overwrite", T::Bool)
            .defaults(1),
        "clear" => mutator(name),
        "duplicate" => method(name, T::Dictionary).param("deep", T::Bool).defaults(1),
        _ => return None,
    };
    Some(m)
}

fn packed_array_method(ty: VariantType, name: &str) -> Option<MethodInfo> {
    let element = ty.packed_element().unwrap_or(T::Nil);
    let m = match name {
        "size" => method(name, T::Int),
        "is_empty" => method(name, T::Bool),
        "append" | "push_back" => MethodInfo::new(name, T::Bool).param("value", element),
        "append_array" => mutator(name).param("array", ty),
        "has" => method(name, T::Bool).param("value", element),
        "find" => method(name, T::Int)
            .param("value", element)
            .param("from", T::Int)
            .defaults(1),
        "remove_at" => mutator(name).param("index", T::Int),
        "resize" => MethodInfo::new(name, T::Int).param("new_size", T::Int),
        "clear" | "sort" | "reverse" => mutator(name),
        "duplicate" => method(name, ty),
        "slice" => method(name, ty)
            .param("begin", T::Int)
            .param("end", T::Int)
            .defaults(1),
        _ => return None,
    };
    Some(m)
}

/// Look up a constant declared on a builtin type, such as `Vector2.ZERO`.
pub fn builtin_constant(ty: VariantType, name: &str) -> Option<Variant> {
    let value = match (ty, name) {
        (T::Vector2, _) => Variant::Vector2(match name {
            "ZERO" => Vector2::ZERO,
            "ONE" => Vector2::ONE,
            "UP" => Vector2::new(0.0, -1.0),
            "DOWN" => Vector2::new(0.0, 1.0),
            "LEFT" => Vector2::new(-1.0, 0.0),
            "RIGHT" => Vector2::new(1.0, 0.0),
            "INF" => Vector2::new(f64::INFINITY, f64::INFINITY),
            _ => return None,
        }),
        (T::Vector2i, _) => Variant::Vector2i(match name {
            "ZERO" => Vector2i::new(0, 0),
            "ONE" => Vector2i::new(1, 1),
            "UP" => Vector2i::new(0, -1),
            "DOWN" => Vector2i::new(0, 1),
            "LEFT" => Vector2i::new(-1, 0),
            "RIGHT" => Vector2i::new(1, 0),
            _ => return None,
        }),
        (T::Vector3, _) => Variant::Vector3(match name {
            "ZERO" => Vector3::new(0.0, 0.0, 0.0),
            "ONE" => Vector3::new(1.0, 1.0, 1.0),
            "UP" => Vector3::new(0.0, 1.0, 0.0),
            "DOWN" => Vector3::new(0.0, -1.0, 0.0),
            "LEFT" => Vector3::new(-1.0, 0.0, 0.0),
            "RIGHT" => Vector3::new(1.0, 0.0, 0.0),
            "FORWARD" => Vector3::new(0.0, 0.0, -1.0),
            "BACK" => Vector3::new(0.0, 0.0, 1.0),
            _ => return None,
        }),
        (T::Vector3i, _) => Variant::Vector3i(match name {
            "ZERO" => Vector3i::new(0, 0, 0),
            "ONE" => Vector3i::new(1, 1, 1),
            "UP" => Vector3i::new(0, 1, 0),
            "DOWN" => Vector3i::new(0, -1, 0),
            _ => return None,
        }),
        (T::Transform2D, "IDENTITY") => Variant::Transform2D(Transform2D::IDENTITY),
        (T::Transform2D, "FLIP_X") => Variant::Transform2D(Transform2D {
            x: Vector2::new(-1.0, 0.0),
            ..Transform2D::IDENTITY
        }),
        (T::Transform2D, "FLIP_Y") => Variant::Transform2D(Transform2D {
            y: Vector2::new(0.0, -1.0),
            ..Transform2D::IDENTITY
        }),
        (T::Color, _) => Variant::Color(match name {
            "WHITE" => Color::rgb(1.0, 1.0, 1.0),
            "BLACK" => Color::rgb(0.0, 0.0, 0.0),
            "RED" => Color::rgb(1.0, 0.0, 0.0),
            "GREEN" => Color::rgb(0.0, 1.0, 0.0),
            "BLUE" => Color::rgb(0.0, 0.0, 1.0),
            "YELLOW" => Color::rgb(1.0, 1.0, 0.0),
            "TRANSPARENT" => Color::new(1.0, 1.0, 1.0, 0.0),
            _ => return None,
        }),
        _ => return None,
    };
    Some(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_methods() {
        let m = builtin_method(T::String, "substr").unwrap();
        assert_eq!(m.required_count(), 1);
        assert_eq!(m.return_type, HostType::Builtin(T::String));
        assert!(builtin_method(T::StringName, "length").is_some());
        assert!(builtin_method(T::String, "nope").is_none());
    }

    #[test]
    fn vector_methods_follow_receiver_type() {
        let m = builtin_method(T::Vector3, "cross").unwrap();
        assert_eq!(m.return_type, HostType::Builtin(T::Vector3));
        let m = builtin_method(T::Vector2, "cross").unwrap();
        assert_eq!(m.return_type, HostType::Builtin(T::Float));
        assert!(builtin_method(T::Vector3, "angle").is_none());
    }

    #[test]
    fn packed_methods_use_element_type() {
        let m = builtin_method(T::PackedInt32Array, "append").unwrap();
        assert_eq!(m.params[0].ty, HostType::Builtin(T::Int));
    }

    #[test]
    fn callable_call_is_vararg() {
        assert!(builtin_method(T::Callable, "call").unwrap().is_vararg());
        assert!(!builtin_method(T::Callable, "callv").unwrap().is_vararg());
    }

    #[test]
    fn constants() {
        assert_eq!(
            builtin_constant(T::Vector2, "ZERO"),
            Some(Variant::Vector2(Vector2::ZERO))
        );
        assert_eq!(
            builtin_constant(T::Color, "RED"),
            Some(Variant::Color(Color::rgb(1.0, 0.0, 0.0)))
        );
        assert_eq!(builtin_constant(T::Int, "ZERO"), None);
    }
}
