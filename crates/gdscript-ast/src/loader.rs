//! Loading dependency scripts and resources.
//!
//! The analyzer pulls in other files for `extends "path"`, `preload(...)`,
//! global classes and autoloads. It never touches the file system itself;
//! every request goes through a [`ScriptLoader`].
//!
//! ## Usage
//!
//! ```
//! use gdscript_ast::{MemoryLoader, ScriptLoader, TreeBuilder};
//!
//! let mut loader = MemoryLoader::new();
//! loader.add_script(TreeBuilder::new("res://base.gd").finish());
//! loader.add_resource("res://icon.png", "Texture2D");
//!
//! assert!(loader.load_script("res://base.gd").is_ok());
//! assert_eq!(loader.load_resource("res://icon.png").unwrap().class, "Texture2D");
//! assert_eq!(loader.load_resource("res://base.gd").unwrap().class, "GDScript");
//! ```

use std::path::{Path, PathBuf};

use rustc_hash::FxHashMap;
use thiserror::Error;
use tracing::debug;

use crate::tree::ParseTree;

/// Prefix of project-relative paths.
pub const RES_PREFIX: &str = "res://";

/// A loaded non-script resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceInfo {
    pub path: String,
    /// Native class of the loaded object.
    pub class: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    #[error("File not found: \"{0}\".")]
    NotFound(String),

    #[error("Parse error in \"{path}\": {message}")]
    Parse { path: String, message: String },

    #[error("Cannot read \"{path}\": {message}")]
    Io { path: String, message: String },
}

/// Source of dependency scripts and resources.
///
/// Paths are canonical `res://` paths. Implementations must return the same
/// answer for the same path during one compilation.
pub trait ScriptLoader {
    /// Parse the script at `path`. The returned tree is already bound.
    fn load_script(&self, path: &str) -> Result<ParseTree, LoadError>;

    /// Load a resource for `preload`.
    fn load_resource(&self, path: &str) -> Result<ResourceInfo, LoadError>;
}

/// Native class of a resource, guessed from its extension.
pub fn resource_class_for(path: &str) -> &'static str {
    let extension = path.rsplit_once('.').map(|(_, ext)| ext).unwrap_or_default();
    match extension {
        "gd" => "GDScript",
        "tscn" | "scn" => "PackedScene",
        "png" | "svg" | "jpg" | "jpeg" | "webp" => "Texture2D",
        _ => "Resource",
    }
}

// ============================================================================
// In-memory loader
// ============================================================================

/// Loader over scripts and resources registered up front.
#[derive(Debug, Default)]
pub struct MemoryLoader {
    scripts: FxHashMap<String, ParseTree>,
    resources: FxHashMap<String, String>,
}

impl MemoryLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a script under its tree path.
    pub fn add_script(&mut self, tree: ParseTree) {
        self.scripts.insert(tree.path.clone(), tree);
    }

    pub fn add_resource(&mut self, path: impl Into<String>, class: impl Into<String>) {
        self.resources.insert(path.into(), class.into());
    }
}

impl ScriptLoader for MemoryLoader {
    fn load_script(&self, path: &str) -> Result<ParseTree, LoadError> {
        self.scripts
            .get(path)
            .cloned()
            .ok_or_else(|| LoadError::NotFound(path.to_string()))
    }

    fn load_resource(&self, path: &str) -> Result<ResourceInfo, LoadError> {
        let class = if self.scripts.contains_key(path) {
            "GDScript".to_string()
        } else {
            self.resources
                .get(path)
                .cloned()
                .ok_or_else(|| LoadError::NotFound(path.to_string()))?
        };
        Ok(ResourceInfo {
            path: path.to_string(),
            class,
        })
    }
}

// ============================================================================
// Project loader
// ============================================================================

/// Turns script source into a tree: `(path, source) -> tree`.
pub type ParseFn = dyn Fn(&str, &str) -> Result<ParseTree, String>;

/// Loader backed by a project directory on disk.
///
/// `res://` maps to the project root. Script text is handed to the parse hook
/// installed with [`with_parser`](Self::with_parser).
pub struct ProjectLoader {
    root: PathBuf,
    parser: Option<Box<ParseFn>>,
}

impl ProjectLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            parser: None,
        }
    }

    pub fn with_parser(
        mut self,
        parser: impl Fn(&str, &str) -> Result<ParseTree, String> + 'static,
    ) -> Self {
        self.parser = Some(Box::new(parser));
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// File system location of a `res://` path.
    pub fn file_path(&self, path: &str) -> PathBuf {
        let relative = path.strip_prefix(RES_PREFIX).unwrap_or(path);
        self.root.join(relative)
    }
}

impl std::fmt::Debug for ProjectLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProjectLoader")
            .field("root", &self.root)
            .field("has_parser", &self.parser.is_some())
            .finish()
    }
}

impl ScriptLoader for ProjectLoader {
    fn load_script(&self, path: &str) -> Result<ParseTree, LoadError> {
        let file = self.file_path(path);
        debug!(path, file = %file.display(), "loading script");
        let source = std::fs::read_to_string(&file).map_err(|err| match err.kind() {
            std::io::ErrorKind::NotFound => LoadError::NotFound(path.to_string()),
            _ => LoadError::Io {
                path: path.to_string(),
                message: err.to_string(),
            },
        })?;
        let parser = self.parser.as_ref().ok_or_else(|| LoadError::Parse {
            path: path.to_string(),
            message: "no parser installed".to_string(),
        })?;
        let mut tree = parser(path, &source).map_err(|message| LoadError::Parse {
            path: path.to_string(),
            message,
        })?;
        tree.path = path.to_string();
        Ok(tree)
    }

    fn load_resource(&self, path: &str) -> Result<ResourceInfo, LoadError> {
        let file = self.file_path(path);
        if !file.is_file() {
            debug!(path, "resource not found");
            return Err(LoadError::NotFound(path.to_string()));
        }
        Ok(ResourceInfo {
            path: path.to_string(),
            class: resource_class_for(path).to_string(),
        })
    }
}

// ============================================================================
// Paths
// ============================================================================

/// Resolve `path` against the script at `relative_to` and normalize it.
///
/// # Examples
///
/// ```
/// use gdscript_ast::canonicalize_path;
///
/// assert_eq!(canonicalize_path("base.gd", "res://actors/player.gd"), "res://actors/base.gd");
/// assert_eq!(canonicalize_path("../ui/hud.gd", "res://actors/player.gd"), "res://ui/hud.gd");
/// assert_eq!(canonicalize_path("res://a/./b/../c.gd", "res://x.gd"), "res://a/c.gd");
/// ```
pub fn canonicalize_path(path: &str, relative_to: &str) -> String {
    let joined = match path.strip_prefix(RES_PREFIX) {
        Some(rest) => rest.to_string(),
        None => {
            let base = relative_to.strip_prefix(RES_PREFIX).unwrap_or(relative_to);
            match base.rsplit_once('/') {
                Some((dir, _)) => format!("{dir}/{path}"),
                None => path.to_string(),
            }
        }
    };

    let mut parts: Vec<&str> = Vec::new();
    for segment in joined.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                parts.pop();
            }
            other => parts.push(other),
        }
    }
    format!("{RES_PREFIX}{}", parts.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TreeBuilder;

    #[test]
    fn memory_loader_missing_script() {
        let loader = MemoryLoader::new();
        assert!(matches!(
            loader.load_script("res://missing.file"),
            Err(LoadError::NotFound(path)) if path == "res://missing.file"
        ));
    }

    #[test]
    fn resource_classes_by_extension() {
        assert_eq!(resource_class_for("res://level.tscn"), "PackedScene");
        assert_eq!(resource_class_for("res://icon.svg"), "Texture2D");
        assert_eq!(resource_class_for("res://a.gd"), "GDScript");
        assert_eq!(resource_class_for("res://theme.tres"), "Resource");
        assert_eq!(resource_class_for("res://noext"), "Resource");
    }

    #[test]
    fn canonical_paths() {
        assert_eq!(canonicalize_path("a.gd", "res://main.gd"), "res://a.gd");
        assert_eq!(canonicalize_path("../../a.gd", "res://x/main.gd"), "res://a.gd");
        assert_eq!(canonicalize_path("res://dir//a.gd", "res://main.gd"), "res://dir/a.gd");
    }

    #[test]
    fn project_loader_reads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("actors")).unwrap();
        std::fs::write(dir.path().join("actors/enemy.gd"), "extends Node\n").unwrap();
        std::fs::write(dir.path().join("icon.png"), [0u8; 4]).unwrap();

        let loader = ProjectLoader::new(dir.path()).with_parser(|path, source| {
            let mut b = TreeBuilder::new(path);
            let base = source.trim().strip_prefix("extends ").ok_or("expected extends")?;
            b.set_extends_names(gdscript_core::ClassId::HEAD, &[base]);
            Ok(b.finish())
        });

        let tree = loader.load_script("res://actors/enemy.gd").unwrap();
        assert_eq!(tree.path, "res://actors/enemy.gd");
        assert_eq!(tree.head().extends.as_ref().unwrap().segments, vec!["Node".to_string()]);

        let icon = loader.load_resource("res://icon.png").unwrap();
        assert_eq!(icon.class, "Texture2D");
        assert!(matches!(
            loader.load_resource("res://nope.png"),
            Err(LoadError::NotFound(_))
        ));
    }

    #[test]
    fn project_loader_reports_parse_errors() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("bad.gd"), "???").unwrap();
        let loader = ProjectLoader::new(dir.path()).with_parser(|_, _| Err("unexpected token".into()));
        match loader.load_script("res://bad.gd") {
            Err(LoadError::Parse { message, .. }) => assert_eq!(message, "unexpected token"),
            other => panic!("unexpected result {other:?}"),
        }

        let no_parser = ProjectLoader::new(dir.path());
        assert!(matches!(no_parser.load_script("res://bad.gd"), Err(LoadError::Parse { .. })));
    }
}
