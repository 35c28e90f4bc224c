//! Engine core classes, global enums and global constants.

use gdscript_core::{Variant, VariantType as T};

use crate::{
    HostRegistry, HostType, MethodFlags, MethodInfo, NativeClass, PropertyInfo, RegistrationError,
};

fn object(class: &str) -> HostType {
    HostType::object(class)
}

fn object_class() -> NativeClass {
    NativeClass::new("Object", None)
        .with_method(MethodInfo::new("get_class", T::String).flags(MethodFlags::CONST))
        .with_method(MethodInfo::new("is_class", T::Bool).param("class", T::String))
        .with_method(MethodInfo::new("has_method", T::Bool).param("method", T::StringName))
        .with_method(MethodInfo::new("has_signal", T::Bool).param("signal", T::StringName))
        .with_method(MethodInfo::new("get", HostType::Variant).param("property", T::StringName))
        .with_method(
            MethodInfo::void("set")
                .param("property", T::StringName)
                .param("value", HostType::Variant),
        )
        .with_method(
            MethodInfo::new("call", HostType::Variant)
                .param("method", T::StringName)
                .vararg(),
        )
        .with_method(
            MethodInfo::new("emit_signal", HostType::enum_of("", "Error"))
                .param("signal", T::StringName)
                .vararg(),
        )
        .with_method(
            MethodInfo::new("connect", HostType::enum_of("", "Error"))
                .param("signal", T::StringName)
                .param("callable", T::Callable)
                .param("flags", T::Int)
                .defaults(1),
        )
        .with_method(
            MethodInfo::void("disconnect")
                .param("signal", T::StringName)
                .param("callable", T::Callable),
        )
        .with_method(MethodInfo::new("get_instance_id", T::Int))
        .with_method(MethodInfo::void("notification").param("what", T::Int))
        .with_method(MethodInfo::void("free"))
        .with_signal(MethodInfo::signal("script_changed"))
        .with_constant("NOTIFICATION_POSTINITIALIZE", 0)
        .with_constant("NOTIFICATION_PREDELETE", 1)
}

fn ref_counted() -> NativeClass {
    NativeClass::new("RefCounted", Some("Object"))
        .with_method(MethodInfo::new("reference", T::Bool))
        .with_method(MethodInfo::new("unreference", T::Bool))
        .with_method(MethodInfo::new("get_reference_count", T::Int))
}

fn resource_classes() -> Vec<NativeClass> {
    vec![
        NativeClass::new("Resource", Some("RefCounted"))
            .with_property(PropertyInfo::new("resource_path", T::String))
            .with_property(PropertyInfo::new("resource_name", T::String))
            .with_method(
                MethodInfo::new("duplicate", object("Resource"))
                    .param("subresources", T::Bool)
                    .defaults(1),
            )
            .with_signal(MethodInfo::signal("changed")),
        NativeClass::new("Script", Some("Resource"))
            .with_method(MethodInfo::new("can_instantiate", T::Bool))
            .with_method(MethodInfo::new("get_base_script", object("Script"))),
        NativeClass::new("GDScript", Some("Script"))
            .with_method(MethodInfo::new("new", HostType::Variant).vararg()),
        NativeClass::new("Texture2D", Some("Resource"))
            .with_method(MethodInfo::new("get_width", T::Int))
            .with_method(MethodInfo::new("get_height", T::Int))
            .with_method(MethodInfo::new("get_size", T::Vector2)),
        NativeClass::new("PackedScene", Some("Resource"))
            .with_method(
                MethodInfo::new("instantiate", object("Node"))
                    .param("edit_state", HostType::enum_of("PackedScene", "GenEditState"))
                    .defaults(1),
            )
            .with_method(MethodInfo::new("can_instantiate", T::Bool))
            .with_enum(
                "GenEditState",
                &[
                    ("GEN_EDIT_STATE_DISABLED", 0),
                    ("GEN_EDIT_STATE_INSTANCE", 1),
                    ("GEN_EDIT_STATE_MAIN", 2),
                ],
            ),
    ]
}

fn node() -> NativeClass {
    NativeClass::new("Node", Some("Object"))
        .with_property(PropertyInfo::new("name", T::StringName))
        .with_property(PropertyInfo::new("owner", object("Node")))
        .with_property(PropertyInfo::new(
            "process_mode",
            HostType::enum_of("Node", "ProcessMode"),
        ))
        .with_property(PropertyInfo::new("scene_file_path", T::String))
        .with_method(MethodInfo::new("get_node", object("Node")).param("path", T::NodePath))
        .with_method(
            MethodInfo::new("get_node_or_null", object("Node")).param("path", T::NodePath),
        )
        .with_method(MethodInfo::new("has_node", T::Bool).param("path", T::NodePath))
        .with_method(
            MethodInfo::void("add_child")
                .param("node", object("Node"))
                .param("force_readable_name", T::Bool)
                .param("internal", HostType::enum_of("Node", "InternalMode"))
                .defaults(2),
        )
        .with_method(MethodInfo::void("remove_child").param("node", object("Node")))
        .with_method(MethodInfo::new("get_parent", object("Node")))
        .with_method(MethodInfo::new("get_children", T::Array))
        .with_method(MethodInfo::new("get_child", object("Node")).param("idx", T::Int))
        .with_method(MethodInfo::new("get_child_count", T::Int))
        .with_method(
            MethodInfo::new("find_child", object("Node"))
                .param("pattern", T::String)
                .param("recursive", T::Bool)
                .param("owned", T::Bool)
                .defaults(2),
        )
        .with_method(MethodInfo::new("get_tree", object("SceneTree")))
        .with_method(MethodInfo::new("is_inside_tree", T::Bool))
        .with_method(MethodInfo::new("is_in_group", T::Bool).param("group", T::StringName))
        .with_method(
            MethodInfo::void("add_to_group")
                .param("group", T::StringName)
                .param("persistent", T::Bool)
                .defaults(1),
        )
        .with_method(MethodInfo::void("set_process").param("enable", T::Bool))
        .with_method(MethodInfo::void("set_physics_process").param("enable", T::Bool))
        .with_method(MethodInfo::void("queue_free"))
        .with_signal(MethodInfo::signal("ready"))
        .with_signal(MethodInfo::signal("tree_entered"))
        .with_signal(MethodInfo::signal("tree_exiting"))
        .with_signal(MethodInfo::signal("child_entered_tree").param("node", object("Node")))
        .with_enum(
            "ProcessMode",
            &[
                ("PROCESS_MODE_INHERIT", 0),
                ("PROCESS_MODE_PAUSABLE", 1),
                ("PROCESS_MODE_WHEN_PAUSED", 2),
                ("PROCESS_MODE_ALWAYS", 3),
                ("PROCESS_MODE_DISABLED", 4),
            ],
        )
        .with_enum(
            "InternalMode",
            &[
                ("INTERNAL_MODE_DISABLED", 0),
                ("INTERNAL_MODE_FRONT", 1),
                ("INTERNAL_MODE_BACK", 2),
            ],
        )
        .with_constant("NOTIFICATION_ENTER_TREE", 10)
        .with_constant("NOTIFICATION_EXIT_TREE", 11)
        .with_constant("NOTIFICATION_READY", 13)
        .with_constant("NOTIFICATION_PROCESS", 17)
}

fn canvas_classes() -> Vec<NativeClass> {
    vec![
        NativeClass::new("CanvasItem", Some("Node"))
            .with_property(PropertyInfo::new("visible", T::Bool))
            .with_property(PropertyInfo::new("modulate", T::Color))
            .with_property(PropertyInfo::new("z_index", T::Int))
            .with_method(MethodInfo::void("show"))
            .with_method(MethodInfo::void("hide"))
            .with_method(MethodInfo::void("queue_redraw"))
            .with_method(MethodInfo::new("get_global_mouse_position", T::Vector2))
            .with_signal(MethodInfo::signal("visibility_changed"))
            .with_signal(MethodInfo::signal("draw")),
        NativeClass::new("Node2D", Some("CanvasItem"))
            .with_property(PropertyInfo::new("position", T::Vector2))
            .with_property(PropertyInfo::new("rotation", T::Float))
            .with_property(PropertyInfo::new("scale", T::Vector2))
            .with_property(PropertyInfo::new("global_position", T::Vector2))
            .with_property(PropertyInfo::new("transform", T::Transform2D))
            .with_method(MethodInfo::void("translate").param("offset", T::Vector2))
            .with_method(MethodInfo::void("rotate").param("radians", T::Float))
            .with_method(MethodInfo::void("look_at").param("point", T::Vector2)),
        NativeClass::new("Sprite2D", Some("Node2D"))
            .with_property(PropertyInfo::new("texture", object("Texture2D")))
            .with_property(PropertyInfo::new("centered", T::Bool))
            .with_property(PropertyInfo::new("offset", T::Vector2))
            .with_property(PropertyInfo::new("frame", T::Int))
            .with_signal(MethodInfo::signal("texture_changed")),
        NativeClass::new("Control", Some("CanvasItem"))
            .with_property(PropertyInfo::new("position", T::Vector2))
            .with_property(PropertyInfo::new("size", T::Vector2))
            .with_property(PropertyInfo::new(
                "focus_mode",
                HostType::enum_of("Control", "FocusMode"),
            ))
            .with_method(MethodInfo::void("grab_focus"))
            .with_method(MethodInfo::new("has_focus", T::Bool))
            .with_signal(MethodInfo::signal("resized"))
            .with_enum(
                "FocusMode",
                &[("FOCUS_NONE", 0), ("FOCUS_CLICK", 1), ("FOCUS_ALL", 2)],
            ),
        NativeClass::new("Label", Some("Control")).with_property(PropertyInfo::new("text", T::String)),
        NativeClass::new("BaseButton", Some("Control"))
            .with_property(PropertyInfo::new("disabled", T::Bool))
            .with_property(PropertyInfo::new("button_pressed", T::Bool))
            .with_signal(MethodInfo::signal("pressed"))
            .with_signal(MethodInfo::signal("toggled").param("toggled_on", T::Bool)),
        NativeClass::new("Button", Some("BaseButton"))
            .with_property(PropertyInfo::new("text", T::String)),
    ]
}

fn tree_classes() -> Vec<NativeClass> {
    vec![
        NativeClass::new("Timer", Some("Node"))
            .with_property(PropertyInfo::new("wait_time", T::Float))
            .with_property(PropertyInfo::new("one_shot", T::Bool))
            .with_property(PropertyInfo::new("autostart", T::Bool))
            .with_method(MethodInfo::void("start").param("time_sec", T::Float).defaults(1))
            .with_method(MethodInfo::void("stop"))
            .with_method(MethodInfo::new("is_stopped", T::Bool))
            .with_signal(MethodInfo::signal("timeout")),
        NativeClass::new("MainLoop", Some("Object")),
        NativeClass::new("SceneTree", Some("MainLoop"))
            .with_property(PropertyInfo::new("paused", T::Bool))
            .with_property(PropertyInfo::new("current_scene", object("Node")))
            .with_method(MethodInfo::new("get_root", object("Node")))
            .with_method(
                MethodInfo::new("create_timer", object("SceneTreeTimer"))
                    .param("time_sec", T::Float)
                    .param("process_always", T::Bool)
                    .defaults(1),
            )
            .with_method(
                MethodInfo::new("get_first_node_in_group", object("Node"))
                    .param("group", T::StringName),
            )
            .with_method(
                MethodInfo::new("change_scene_to_file", HostType::enum_of("", "Error"))
                    .param("path", T::String),
            )
            .with_method(MethodInfo::void("quit").param("exit_code", T::Int).defaults(1))
            .with_signal(MethodInfo::signal("process_frame")),
        NativeClass::new("SceneTreeTimer", Some("RefCounted"))
            .with_property(PropertyInfo::new("time_left", T::Float))
            .with_signal(MethodInfo::signal("timeout")),
    ]
}

/// Every core class, parents before children.
pub(crate) fn classes() -> Vec<NativeClass> {
    let mut classes = vec![object_class(), ref_counted()];
    classes.extend(resource_classes());
    classes.push(node());
    classes.extend(canvas_classes());
    classes.extend(tree_classes());
    classes
}

pub(crate) fn register(registry: &mut HostRegistry) -> Result<(), RegistrationError> {
    for class in classes() {
        registry.register_class(class)?;
    }

    registry.register_global_enum(
        "Error",
        &[
            ("OK", 0),
            ("FAILED", 1),
            ("ERR_UNAVAILABLE", 2),
            ("ERR_UNCONFIGURED", 3),
            ("ERR_FILE_NOT_FOUND", 7),
            ("ERR_INVALID_PARAMETER", 31),
            ("ERR_BUSY", 44),
        ],
    )?;
    registry.register_global_enum(
        "Side",
        &[("SIDE_LEFT", 0), ("SIDE_TOP", 1), ("SIDE_RIGHT", 2), ("SIDE_BOTTOM", 3)],
    )?;
    registry.register_global_enum(
        "MouseButton",
        &[
            ("MOUSE_BUTTON_NONE", 0),
            ("MOUSE_BUTTON_LEFT", 1),
            ("MOUSE_BUTTON_RIGHT", 2),
            ("MOUSE_BUTTON_MIDDLE", 3),
        ],
    )?;
    registry.register_global_enum(
        "Key",
        &[
            ("KEY_NONE", 0),
            ("KEY_SPACE", 32),
            ("KEY_A", 65),
            ("KEY_D", 68),
            ("KEY_S", 83),
            ("KEY_W", 87),
            ("KEY_ESCAPE", 4194305),
            ("KEY_ENTER", 4194309),
        ],
    )?;
    registry.register_global_constant("TYPE_NIL", Variant::Int(T::Nil as u8 as i64))?;
    registry.register_global_constant("TYPE_BOOL", Variant::Int(T::Bool as u8 as i64))?;
    registry.register_global_constant("TYPE_INT", Variant::Int(T::Int as u8 as i64))?;
    registry.register_global_constant("TYPE_FLOAT", Variant::Int(T::Float as u8 as i64))?;
    registry.register_global_constant("TYPE_STRING", Variant::Int(T::String as u8 as i64))?;
    registry.register_global_constant("TYPE_OBJECT", Variant::Int(T::Object as u8 as i64))?;
    registry.register_global_constant("TYPE_ARRAY", Variant::Int(T::Array as u8 as i64))?;
    registry.register_global_constant(
        "TYPE_DICTIONARY",
        Variant::Int(T::Dictionary as u8 as i64),
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::HostTypeOracle;

    #[test]
    fn parents_precede_children() {
        let mut registry = HostRegistry::new();
        assert_eq!(register(&mut registry), Ok(()));
    }

    #[test]
    fn scene_instantiation_returns_node() {
        let registry = HostRegistry::with_core_classes();
        let m = registry.get_method_info("PackedScene", "instantiate").unwrap();
        assert_eq!(m.return_type, HostType::object("Node"));
        assert_eq!(m.required_count(), 0);
    }

    #[test]
    fn global_enum_values_are_constants() {
        let registry = HostRegistry::with_core_classes();
        assert_eq!(registry.global_constant("MOUSE_BUTTON_LEFT"), Some(Variant::Int(1)));
        assert_eq!(registry.global_constant("TYPE_INT"), Some(Variant::Int(2)));
    }
}
