//! End-to-end tests: trees in, diagnostics and bytecode out.

use std::fs;

use gdscript::core::ObjectRef;
use gdscript::prelude::*;
use tempfile::TempDir;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

fn compile_with(loader: &dyn ScriptLoader, tree: ParseTree) -> CompilationResult {
    init_tracing();
    let oracle = HostRegistry::with_core_classes();
    Compiler::new(&oracle, loader).compile(tree)
}

fn compile(tree: ParseTree) -> CompilationResult {
    compile_with(&MemoryLoader::new(), tree)
}

fn first_error(result: &CompilationResult) -> &str {
    result
        .diagnostics
        .errors()
        .first()
        .map(|d| d.message.as_str())
        .unwrap_or_default()
}

fn extends_path(path: &str, base: &str) -> ParseTree {
    let mut b = TreeBuilder::new(path);
    b.set_extends_path(ClassId::HEAD, base);
    b.finish()
}

// ============================================================================
// Analysis failures
// ============================================================================

#[test]
fn unresolved_super_class_stops_compilation() {
    let result = compile(extends_path("res://main.gd", "res://missing.file"));

    assert_eq!(
        first_error(&result),
        "Could not resolve super class path \"res://missing.file\"."
    );
    assert!(result.script.is_none());
    assert_eq!(result.function_count(), 0);
    assert!(!result.is_success());
}

#[test]
fn soft_local_narrowed_into_typed_local_warns() {
    let mut b = TreeBuilder::new("res://soft.gd");
    let one = b.int(1);
    let var_x = b.var_stmt("x", None, Some(one));
    let x = b.ident("x");
    let half = b.float(1.5);
    let assign = b.assign(x, half);
    let assign = b.expr_stmt(assign);
    let int = b.type_ref(&["int"]);
    let x = b.ident("x");
    let var_y = b.var_stmt("y", Some(int), Some(x));
    b.function(ClassId::HEAD, "f", vec![], None, vec![var_x, assign, var_y]);

    let result = compile(b.finish());

    assert!(!result.diagnostics.has_errors(), "{}", result.diagnostics);
    assert!(result.diagnostics.has_warning(WarningCode::NarrowingConversion));
    assert!(result.is_success());
}

#[test]
fn typed_function_without_return_is_rejected() {
    let mut b = TreeBuilder::new("res://ret.gd");
    let pass = b.pass();
    let int = b.type_ref(&["int"]);
    b.function(ClassId::HEAD, "f", vec![], Some(int), vec![pass]);

    let result = compile(b.finish());

    assert_eq!(first_error(&result), "Not all code paths return a value.");
    assert!(result.script.is_none());
}

#[test]
fn enum_elements_referencing_each_other() {
    let mut b = TreeBuilder::new("res://enum.gd");
    let to_b = b.ident("B");
    let to_a = b.ident("A");
    b.named_enum(ClassId::HEAD, "E", &[("A", Some(to_b)), ("B", Some(to_a))]);

    let result = compile(b.finish());

    assert_eq!(
        first_error(&result),
        "Cannot use another enum element before it was declared."
    );
}

#[test]
fn call_missing_required_arguments() {
    let mut b = TreeBuilder::new("res://args.gd");
    let mut params = vec![
        b.param("a", None, None),
        b.param("b", None, None),
        b.param("c", None, None),
    ];
    let zero = b.int(0);
    params.push(b.param("d", None, Some(zero)));
    b.function(ClassId::HEAD, "f", params, None, vec![]);
    let one = b.int(1);
    let two = b.int(2);
    let call = b.call("f", vec![one, two]);
    let stmt = b.expr_stmt(call);
    b.function(ClassId::HEAD, "g", vec![], None, vec![stmt]);

    let result = compile(b.finish());

    assert_eq!(
        first_error(&result),
        "Too few arguments for \"f()\" call. Expected at least 3 but received 2."
    );
}

#[test]
fn inheritance_cycle_across_three_files() {
    let mut loader = MemoryLoader::new();
    loader.add_script(extends_path("res://b.gd", "res://c.gd"));
    loader.add_script(extends_path("res://c.gd", "res://a.gd"));

    let result = compile_with(&loader, extends_path("res://a.gd", "res://b.gd"));

    assert!(
        result
            .diagnostics
            .errors()
            .iter()
            .any(|d| d.message == "Cyclic inheritance."),
        "{}",
        result.diagnostics
    );
    assert!(result.script.is_none());
}

#[test]
fn diagnostics_carry_positions() {
    let mut b = TreeBuilder::new("res://pos.gd");
    b.at(7, 5);
    let missing = b.ident("missing");
    let stmt = b.expr_stmt(missing);
    b.function(ClassId::HEAD, "f", vec![], None, vec![stmt]);

    let result = compile(b.finish());

    let error = &result.diagnostics.errors()[0];
    assert_eq!(error.path, "res://pos.gd");
    assert_eq!(error.line, 7);
    assert_eq!(error.column, 5);
    assert_eq!(
        result.diagnostics.first_error(),
        Some(("Identifier \"missing\" not declared in the current scope.", 7, 5))
    );
}

// ============================================================================
// Determinism
// ============================================================================

#[test]
fn compiling_the_same_tree_twice_agrees() {
    let build = || {
        let mut b = TreeBuilder::new("res://twice.gd");
        let int = b.type_ref(&["int"]);
        let text = b.string("ten");
        b.variable(ClassId::HEAD, "v", Some(int), Some(text));
        let half = b.float(0.5);
        let int = b.type_ref(&["int"]);
        let var_n = b.var_stmt("n", Some(int), Some(half));
        b.function(ClassId::HEAD, "f", vec![], None, vec![var_n]);
        b.finish()
    };

    let first = compile(build());
    let second = compile(build());

    assert!(first.diagnostics.has_errors());
    assert_eq!(first.diagnostics.to_string(), second.diagnostics.to_string());
    assert_eq!(first.diagnostics.warning_count(), second.diagnostics.warning_count());
}

#[test]
fn compiler_is_reusable() {
    init_tracing();
    let oracle = HostRegistry::with_core_classes();
    let loader = MemoryLoader::new();
    let compiler = Compiler::new(&oracle, &loader);

    let bad = compiler.compile(extends_path("res://bad.gd", "res://nowhere.gd"));
    let mut b = TreeBuilder::new("res://good.gd");
    let one = b.int(1);
    let ret = b.return_stmt(Some(one));
    b.function(ClassId::HEAD, "one", vec![], None, vec![ret]);
    let good = compiler.compile(b.finish());

    assert!(!bad.is_success());
    assert!(good.is_success(), "{}", good.diagnostics);
}

// ============================================================================
// Bytecode
// ============================================================================

#[test]
fn counter_script_compiles_to_bytecode() {
    let mut b = TreeBuilder::new("res://counter.gd");
    b.set_extends_names(ClassId::HEAD, &["Node"]);
    let int = b.type_ref(&["int"]);
    let zero = b.int(0);
    b.variable(ClassId::HEAD, "count", Some(int), Some(zero));

    let amount = b.param("amount", None, None);
    let count = b.ident("count");
    let amount_ref = b.ident("amount");
    let add = b.compound_assign(BinaryOp::Add, count, amount_ref);
    let add = b.expr_stmt(add);
    let count = b.ident("count");
    let ret = b.return_stmt(Some(count));
    let int = b.type_ref(&["int"]);
    b.function(ClassId::HEAD, "bump", vec![amount], Some(int), vec![add, ret]);

    let result = compile(b.finish());

    assert!(result.is_success(), "{}", result.diagnostics);
    let script = result.script.as_ref().unwrap();
    assert_eq!(script.path, "res://counter.gd");
    assert_eq!(script.main.fields, vec!["count".to_string()]);

    let bump = script.main.function("bump").unwrap();
    assert_eq!(bump.required_count(), 1);
    assert_eq!(bump.entry_for(1), Some(0));
    assert_eq!(bump.entry_for(0), None);
    assert!(bump.code.iter().any(|i| i.opcode() == OpCode::Binary));
    assert_eq!(bump.code.last().map(Instruction::opcode), Some(OpCode::End));
    assert!(!bump.encode().is_empty());
}

#[test]
fn class_constants_are_folded() {
    let mut b = TreeBuilder::new("res://consts.gd");
    let two = b.int(2);
    let three = b.int(3);
    let product = b.binary(BinaryOp::Multiply, two, three);
    b.constant(ClassId::HEAD, "SIX", None, product);

    let result = compile(b.finish());

    assert!(result.is_success(), "{}", result.diagnostics);
    let main = &result.script.as_ref().unwrap().main;
    let index = main.constant_index("SIX").unwrap();
    assert_eq!(main.constants[index as usize].1, Variant::Int(6));
}

// ============================================================================
// Project directories
// ============================================================================

#[test]
fn preload_reads_resources_from_the_project_directory() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("icon.png"), b"\x89PNG").unwrap();
    let loader = ProjectLoader::new(dir.path());

    let mut b = TreeBuilder::new("res://hud.gd");
    let icon = b.preload("icon.png");
    b.constant(ClassId::HEAD, "ICON", None, icon);
    let result = compile_with(&loader, b.finish());

    assert!(result.is_success(), "{}", result.diagnostics);
    let tree = result.main_tree().unwrap();
    assert!(tree[icon].is_constant);
    assert_eq!(
        tree[icon].reduced_value,
        Variant::Object(ObjectRef::resource("Texture2D", "res://icon.png"))
    );
}

#[test]
fn missing_preload_is_reported() {
    let dir = TempDir::new().unwrap();
    let loader = ProjectLoader::new(dir.path());

    let mut b = TreeBuilder::new("res://hud.gd");
    let icon = b.preload("res://gone.png");
    b.constant(ClassId::HEAD, "ICON", None, icon);
    let result = compile_with(&loader, b.finish());

    assert_eq!(
        first_error(&result),
        "Could not preload resource file \"res://gone.png\"."
    );
}

#[test]
fn super_class_is_parsed_from_disk() {
    let dir = TempDir::new().unwrap();
    fs::create_dir(dir.path().join("actors")).unwrap();
    fs::write(dir.path().join("actors/base.gd"), "extends Node\n").unwrap();
    let loader = ProjectLoader::new(dir.path()).with_parser(|path, source| {
        let mut b = TreeBuilder::new(path);
        if let Some(base) = source.trim().strip_prefix("extends ") {
            b.set_extends_names(ClassId::HEAD, &[base]);
        }
        let ret = b.return_stmt(None);
        b.function(ClassId::HEAD, "ready_up", vec![], None, vec![ret]);
        Ok(b.finish())
    });

    let mut b = TreeBuilder::new("res://actors/player.gd");
    b.set_extends_path(ClassId::HEAD, "base.gd");
    let call = b.call("ready_up", vec![]);
    let stmt = b.expr_stmt(call);
    b.function(ClassId::HEAD, "go", vec![], None, vec![stmt]);
    let result = compile_with(&loader, b.finish());

    assert!(result.is_success(), "{}", result.diagnostics);
    assert_eq!(result.trees.len(), 2);
    assert_eq!(result.trees[1].path, "res://actors/base.gd");
}
