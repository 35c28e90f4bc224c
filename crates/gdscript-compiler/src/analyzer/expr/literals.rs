//! Literal-like expressions: `self`, array and dictionary literals,
//! `preload` and `$Path`.

use gdscript_ast::{ExprId, ResourceInfo, canonicalize_path};
use gdscript_core::{
    ClassId, CompilationError, DataType, Dictionary, ObjectRef, Span, Variant, VariantType,
};

use super::Reduction;
use crate::analyzer::Analyzer;

impl Analyzer<'_, '_> {
    pub(super) fn reduce_self(&mut self, span: Span) -> Result<Reduction, CompilationError> {
        if self.ctx.is_static {
            return Err(CompilationError::StaticContext {
                name: "self".to_string(),
                span,
            });
        }
        Ok(Reduction::typed(self.current_class_type()))
    }

    /// Constant when every element is constant.
    pub(super) fn reduce_array(&mut self, items: &[ExprId]) -> Reduction {
        let mut values = Some(Vec::with_capacity(items.len()));
        for &item in items {
            if let Err(err) = self.reduce_value(item) {
                self.error(&err);
            }
            match (self.value_of(item), values.as_mut()) {
                (Some(value), Some(values)) => values.push(value),
                _ => values = None,
            }
        }
        let datatype = DataType::builtin(VariantType::Array);
        match values {
            Some(values) => Reduction::constant_typed(datatype, Variant::Array(values)),
            None => Reduction::typed(datatype),
        }
    }

    pub(super) fn reduce_dictionary(&mut self, entries: &[(ExprId, ExprId)]) -> Reduction {
        let mut dict = Some(Dictionary::new());
        for &(key, value) in entries {
            for expr in [key, value] {
                if let Err(err) = self.reduce_value(expr) {
                    self.error(&err);
                }
            }
            match (self.value_of(key), self.value_of(value), dict.as_mut()) {
                (Some(k), Some(v), Some(dict)) => dict.insert(k, v),
                _ => dict = None,
            }
        }
        let datatype = DataType::builtin(VariantType::Dictionary);
        match dict {
            Some(dict) => Reduction::constant_typed(datatype, Variant::Dictionary(dict)),
            None => Reduction::typed(datatype),
        }
    }

    /// `preload("path")`: scripts resolve to their class, other resources
    /// to the native class the loader reports.
    pub(super) fn reduce_preload(
        &mut self,
        path: &str,
        span: Span,
    ) -> Result<Reduction, CompilationError> {
        let canonical = canonicalize_path(path, &self.tree().path);
        let failed = || CompilationError::PreloadFailed {
            path: path.to_string(),
            span,
        };

        if canonical.ends_with(".gd") {
            let unit = if canonical == self.tree().path {
                self.unit()
            } else {
                self.resolve_dependency(&canonical).ok_or_else(failed)?
            };
            let datatype = self.class_type(unit, ClassId::HEAD).into_meta();
            let value = Variant::Object(ObjectRef::resource("GDScript", canonical));
            return Ok(Reduction::constant_typed(datatype, value));
        }

        let ResourceInfo { path, class } = match self.session.loader.load_resource(&canonical) {
            Ok(info) => info,
            Err(err) => {
                tracing::debug!(path = %canonical, error = %err, "preload failed");
                return Err(failed());
            }
        };
        let value = Variant::Object(ObjectRef::resource(class.clone(), path));
        Ok(Reduction::constant_typed(DataType::native(class), value))
    }

    /// `$Path` is `get_node(path)` on `self`.
    pub(super) fn reduce_get_node(&mut self, span: Span) -> Result<Reduction, CompilationError> {
        if self.ctx.is_static {
            return Err(CompilationError::StaticContext {
                name: "$".to_string(),
                span,
            });
        }
        if !self.inherits_native(&self.current_class_type(), "Node") {
            return Err(CompilationError::GetNodeOutsideNode { span });
        }
        Ok(Reduction::typed(DataType::native("Node")))
    }
}
