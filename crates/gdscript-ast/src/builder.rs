//! Programmatic construction of parse trees.

use gdscript_core::{BinaryOp, ClassId, Span, UnaryOp, Variant};

use crate::class::{
    ClassNode, ConstantMember, EnumMember, EnumValueDef, EnumValueMember, ExtendsClause,
    FunctionNode, Member, Parameter, PropertyAccessor, SignalMember, VariableMember,
};
use crate::expr::{ExprKind, ExprNode, IdentifierSource, SubscriptIndex};
use crate::pattern::{PatternKind, PatternNode};
use crate::stmt::{MatchBranch, StmtKind, StmtNode, Suite};
use crate::tree::{ParseTree, TypeRef};
use crate::{ExprId, FunctionId, PatternId, StmtId, SuiteId, TypeRefId};

/// Assembles a [`ParseTree`] node by node.
///
/// Every node takes the position set by the last [`at`](Self::at) call.
/// [`finish`](Self::finish) runs the identifier binder.
pub struct TreeBuilder {
    tree: ParseTree,
    span: Span,
    enum_groups: u32,
}

impl TreeBuilder {
    /// Start a tree whose head class has no `extends` clause.
    pub fn new(path: impl Into<String>) -> Self {
        let path = path.into();
        let head = ClassNode {
            fqcn: path.clone(),
            span: Span::point(1, 1),
            ..ClassNode::default()
        };
        Self {
            tree: ParseTree {
                path,
                classes: vec![head],
                ..ParseTree::default()
            },
            span: Span::point(1, 1),
            enum_groups: 0,
        }
    }

    /// Move the cursor used for the position of new nodes.
    pub fn at(&mut self, line: u32, col: u32) -> &mut Self {
        self.span = Span::point(line, col);
        self
    }

    pub fn tree(&self) -> &ParseTree {
        &self.tree
    }

    pub fn tree_mut(&mut self) -> &mut ParseTree {
        &mut self.tree
    }

    /// Bind identifiers and return the tree.
    pub fn finish(mut self) -> ParseTree {
        crate::binder::bind(&mut self.tree);
        self.tree
    }

    // ==========================================================================
    // Classes and members
    // ==========================================================================

    pub fn set_class_name(&mut self, class: ClassId, name: &str) {
        self.tree[class].class_name = Some(name.to_string());
    }

    /// `extends "path"`.
    pub fn set_extends_path(&mut self, class: ClassId, path: &str) {
        self.set_extends(class, Some(path), &[]);
    }

    /// `extends A.B`.
    pub fn set_extends_names(&mut self, class: ClassId, names: &[&str]) {
        self.set_extends(class, None, names);
    }

    /// `extends "path".A.B`.
    pub fn set_extends(&mut self, class: ClassId, path: Option<&str>, names: &[&str]) {
        self.tree[class].extends = Some(ExtendsClause {
            path: path.map(str::to_string),
            segments: names.iter().map(|s| s.to_string()).collect(),
            span: self.span,
        });
    }

    /// Declare a nested class.
    pub fn class(&mut self, outer: ClassId, name: &str) -> ClassId {
        let id = ClassId(self.tree.classes.len() as u32);
        let fqcn = format!("{}::{name}", self.tree[outer].fqcn);
        self.tree.classes.push(ClassNode {
            identifier: Some(name.to_string()),
            fqcn,
            outer: Some(outer),
            span: self.span,
            ..ClassNode::default()
        });
        self.push_member(outer, name, Member::Class(id));
        id
    }

    fn push_member(&mut self, class: ClassId, name: &str, member: Member) -> usize {
        let node = &mut self.tree[class];
        let index = node.members.len();
        node.members.push(member);
        node.member_index.insert(name.to_string(), index);
        index
    }

    fn last_member(&mut self, class: ClassId) -> &mut Member {
        let node = &mut self.tree[class];
        let last = node.members.len() - 1;
        &mut node.members[last]
    }

    /// `var name: type_ref = initializer`
    pub fn variable(
        &mut self,
        class: ClassId,
        name: &str,
        type_ref: Option<TypeRefId>,
        initializer: Option<ExprId>,
    ) -> &mut VariableMember {
        let member = VariableMember {
            name: name.to_string(),
            span: self.span,
            type_ref,
            initializer,
            ..VariableMember::default()
        };
        self.push_member(class, name, Member::Variable(member));
        match self.last_member(class) {
            Member::Variable(v) => v,
            _ => unreachable!("member was just pushed as a variable"),
        }
    }

    /// `const name: type_ref = initializer`
    pub fn constant(
        &mut self,
        class: ClassId,
        name: &str,
        type_ref: Option<TypeRefId>,
        initializer: ExprId,
    ) -> &mut ConstantMember {
        let member = ConstantMember {
            name: name.to_string(),
            span: self.span,
            type_ref,
            initializer: Some(initializer),
            ..ConstantMember::default()
        };
        self.push_member(class, name, Member::Constant(member));
        match self.last_member(class) {
            Member::Constant(c) => c,
            _ => unreachable!("member was just pushed as a constant"),
        }
    }

    pub fn signal(&mut self, class: ClassId, name: &str, params: Vec<Parameter>) {
        let member = SignalMember {
            name: name.to_string(),
            span: self.span,
            params,
            ..SignalMember::default()
        };
        self.push_member(class, name, Member::Signal(member));
    }

    /// `enum Name { A, B = expr }`
    pub fn named_enum(&mut self, class: ClassId, name: &str, values: &[(&str, Option<ExprId>)]) {
        let member = EnumMember {
            name: name.to_string(),
            span: self.span,
            values: values
                .iter()
                .map(|(value, expr)| EnumValueDef {
                    name: value.to_string(),
                    span: self.span,
                    expr: *expr,
                    value: None,
                })
                .collect(),
            ..EnumMember::default()
        };
        self.push_member(class, name, Member::Enum(member));
    }

    /// `enum { A, B = expr }`; values become class constants.
    pub fn unnamed_enum(&mut self, class: ClassId, values: &[(&str, Option<ExprId>)]) {
        let group = self.enum_groups;
        self.enum_groups += 1;
        let mut previous: Option<String> = None;
        for (value, expr) in values {
            let member = EnumValueMember {
                name: value.to_string(),
                span: self.span,
                expr: *expr,
                group,
                previous: previous.replace(value.to_string()),
                ..EnumValueMember::default()
            };
            self.push_member(class, value, Member::EnumValue(member));
        }
    }

    /// A parameter for [`function`](Self::function) or [`signal`](Self::signal).
    pub fn param(
        &self,
        name: &str,
        type_ref: Option<TypeRefId>,
        default: Option<ExprId>,
    ) -> Parameter {
        Parameter {
            name: name.to_string(),
            span: self.span,
            type_ref,
            default,
            ..Parameter::default()
        }
    }

    fn add_function(
        &mut self,
        class: ClassId,
        name: &str,
        params: Vec<Parameter>,
        return_type: Option<TypeRefId>,
        body: Vec<StmtId>,
    ) -> FunctionId {
        let body = self.suite(body);
        let id = FunctionId(self.tree.functions.len() as u32);
        self.tree.functions.push(FunctionNode {
            name: name.to_string(),
            span: self.span,
            class,
            params,
            return_type,
            body,
            ..FunctionNode::default()
        });
        id
    }

    /// `func name(params) -> return_type: body`
    pub fn function(
        &mut self,
        class: ClassId,
        name: &str,
        params: Vec<Parameter>,
        return_type: Option<TypeRefId>,
        body: Vec<StmtId>,
    ) -> FunctionId {
        let id = self.add_function(class, name, params, return_type, body);
        self.push_member(class, name, Member::Function(id));
        id
    }

    /// `static func ...`
    pub fn static_function(
        &mut self,
        class: ClassId,
        name: &str,
        params: Vec<Parameter>,
        return_type: Option<TypeRefId>,
        body: Vec<StmtId>,
    ) -> FunctionId {
        let id = self.function(class, name, params, return_type, body);
        self.tree[id].is_static = true;
        id
    }

    /// Attach an inline `get:` body to the member variable `name`.
    pub fn inline_getter(&mut self, class: ClassId, name: &str, body: Vec<StmtId>) -> FunctionId {
        let id = self.add_function(class, &format!("@{name}_getter"), Vec::new(), None, body);
        self.tree[id].accessor_of = Some(name.to_string());
        self.update_accessor(class, name, |_, getter| *getter = Some(id));
        id
    }

    /// Attach an inline `set(param):` body to the member variable `name`.
    pub fn inline_setter(
        &mut self,
        class: ClassId,
        name: &str,
        param: &str,
        body: Vec<StmtId>,
    ) -> FunctionId {
        let param = self.param(param, None, None);
        let id = self.add_function(class, &format!("@{name}_setter"), vec![param], None, body);
        self.tree[id].accessor_of = Some(name.to_string());
        self.update_accessor(class, name, |setter, _| *setter = Some(id));
        id
    }

    fn update_accessor(
        &mut self,
        class: ClassId,
        name: &str,
        f: impl FnOnce(&mut Option<FunctionId>, &mut Option<FunctionId>),
    ) {
        let Some(&index) = self.tree[class].member_index.get(name) else {
            return;
        };
        if let Member::Variable(v) = &mut self.tree[class].members[index] {
            if !matches!(v.accessor, PropertyAccessor::Inline { .. }) {
                v.accessor = PropertyAccessor::Inline {
                    setter: None,
                    getter: None,
                };
            }
            if let PropertyAccessor::Inline { setter, getter } = &mut v.accessor {
                f(setter, getter);
            }
        }
    }

    // ==========================================================================
    // Types
    // ==========================================================================

    /// A type annotation such as `&["Outer", "Inner"]`.
    pub fn type_ref(&mut self, segments: &[&str]) -> TypeRefId {
        let id = TypeRefId(self.tree.type_refs.len() as u32);
        self.tree.type_refs.push(TypeRef {
            segments: segments.iter().map(|s| s.to_string()).collect(),
            span: self.span,
            ..TypeRef::default()
        });
        id
    }

    // ==========================================================================
    // Expressions
    // ==========================================================================

    pub fn expr(&mut self, kind: ExprKind) -> ExprId {
        let id = ExprId(self.tree.exprs.len() as u32);
        self.tree.exprs.push(ExprNode::new(kind, self.span));
        id
    }

    pub fn literal(&mut self, value: Variant) -> ExprId {
        self.expr(ExprKind::Literal(value))
    }

    pub fn int(&mut self, value: i64) -> ExprId {
        self.literal(Variant::Int(value))
    }

    pub fn float(&mut self, value: f64) -> ExprId {
        self.literal(Variant::Float(value))
    }

    pub fn string(&mut self, value: &str) -> ExprId {
        self.literal(Variant::from(value))
    }

    pub fn bool(&mut self, value: bool) -> ExprId {
        self.literal(Variant::Bool(value))
    }

    pub fn null(&mut self) -> ExprId {
        self.literal(Variant::Nil)
    }

    pub fn ident(&mut self, name: &str) -> ExprId {
        self.expr(ExprKind::Identifier {
            name: name.to_string(),
            source: IdentifierSource::Undefined,
        })
    }

    pub fn self_ref(&mut self) -> ExprId {
        self.expr(ExprKind::SelfRef)
    }

    pub fn array(&mut self, items: Vec<ExprId>) -> ExprId {
        self.expr(ExprKind::Array(items))
    }

    pub fn dictionary(&mut self, entries: Vec<(ExprId, ExprId)>) -> ExprId {
        self.expr(ExprKind::Dictionary(entries))
    }

    pub fn binary(&mut self, op: BinaryOp, left: ExprId, right: ExprId) -> ExprId {
        self.expr(ExprKind::Binary { op, left, right })
    }

    pub fn unary(&mut self, op: UnaryOp, operand: ExprId) -> ExprId {
        self.expr(ExprKind::Unary { op, operand })
    }

    pub fn ternary(&mut self, condition: ExprId, true_expr: ExprId, false_expr: ExprId) -> ExprId {
        self.expr(ExprKind::Ternary {
            condition,
            true_expr,
            false_expr,
        })
    }

    pub fn assign(&mut self, assignee: ExprId, value: ExprId) -> ExprId {
        self.expr(ExprKind::Assignment {
            op: None,
            assignee,
            value,
        })
    }

    /// `assignee op= value`
    pub fn compound_assign(&mut self, op: BinaryOp, assignee: ExprId, value: ExprId) -> ExprId {
        self.expr(ExprKind::Assignment {
            op: Some(op),
            assignee,
            value,
        })
    }

    /// `name(args)`
    pub fn call(&mut self, name: &str, args: Vec<ExprId>) -> ExprId {
        self.expr(ExprKind::Call {
            base: None,
            name: name.to_string(),
            args,
            is_super: false,
        })
    }

    /// `base.name(args)`
    pub fn method_call(&mut self, base: ExprId, name: &str, args: Vec<ExprId>) -> ExprId {
        self.expr(ExprKind::Call {
            base: Some(base),
            name: name.to_string(),
            args,
            is_super: false,
        })
    }

    /// `super.name(args)`
    pub fn super_call(&mut self, name: &str, args: Vec<ExprId>) -> ExprId {
        self.expr(ExprKind::Call {
            base: None,
            name: name.to_string(),
            args,
            is_super: true,
        })
    }

    /// `base.name`
    pub fn attribute(&mut self, base: ExprId, name: &str) -> ExprId {
        self.expr(ExprKind::Subscript {
            base,
            index: SubscriptIndex::Attribute(name.to_string()),
        })
    }

    /// `base[index]`
    pub fn index(&mut self, base: ExprId, index: ExprId) -> ExprId {
        self.expr(ExprKind::Subscript {
            base,
            index: SubscriptIndex::Index(index),
        })
    }

    pub fn await_expr(&mut self, operand: ExprId) -> ExprId {
        self.expr(ExprKind::Await(operand))
    }

    pub fn preload(&mut self, path: &str) -> ExprId {
        self.expr(ExprKind::Preload {
            path: path.to_string(),
        })
    }

    /// `$path`
    pub fn get_node(&mut self, path: &str) -> ExprId {
        self.expr(ExprKind::GetNode {
            path: path.to_string(),
        })
    }

    /// `operand as target`
    pub fn cast(&mut self, operand: ExprId, target: TypeRefId) -> ExprId {
        self.expr(ExprKind::Cast { operand, target })
    }

    /// `operand is target`
    pub fn type_test(&mut self, operand: ExprId, target: TypeRefId) -> ExprId {
        self.expr(ExprKind::TypeTest { operand, target })
    }

    // ==========================================================================
    // Statements
    // ==========================================================================

    pub fn suite(&mut self, stmts: Vec<StmtId>) -> SuiteId {
        let id = SuiteId(self.tree.suites.len() as u32);
        self.tree.suites.push(Suite {
            stmts,
            span: self.span,
            ..Suite::default()
        });
        id
    }

    pub fn stmt(&mut self, kind: StmtKind) -> StmtId {
        let id = StmtId(self.tree.stmts.len() as u32);
        self.tree.stmts.push(StmtNode::new(kind, self.span));
        id
    }

    pub fn expr_stmt(&mut self, expr: ExprId) -> StmtId {
        self.stmt(StmtKind::Expression(expr))
    }

    /// Local `var name: type_ref = initializer`.
    pub fn var_stmt(
        &mut self,
        name: &str,
        type_ref: Option<TypeRefId>,
        initializer: Option<ExprId>,
    ) -> StmtId {
        self.stmt(StmtKind::Variable {
            name: name.to_string(),
            type_ref,
            initializer,
            infer: false,
            datatype: Default::default(),
        })
    }

    /// Local `var name := initializer`.
    pub fn infer_var_stmt(&mut self, name: &str, initializer: ExprId) -> StmtId {
        self.stmt(StmtKind::Variable {
            name: name.to_string(),
            type_ref: None,
            initializer: Some(initializer),
            infer: true,
            datatype: Default::default(),
        })
    }

    pub fn const_stmt(
        &mut self,
        name: &str,
        type_ref: Option<TypeRefId>,
        initializer: ExprId,
    ) -> StmtId {
        self.stmt(StmtKind::Constant {
            name: name.to_string(),
            type_ref,
            initializer,
            datatype: Default::default(),
        })
    }

    pub fn if_stmt(
        &mut self,
        condition: ExprId,
        then_body: Vec<StmtId>,
        else_body: Option<Vec<StmtId>>,
    ) -> StmtId {
        let true_suite = self.suite(then_body);
        let false_suite = else_body.map(|body| self.suite(body));
        self.stmt(StmtKind::If {
            condition,
            true_suite,
            false_suite,
        })
    }

    pub fn while_stmt(&mut self, condition: ExprId, body: Vec<StmtId>) -> StmtId {
        let body = self.suite(body);
        self.stmt(StmtKind::While { condition, body })
    }

    pub fn for_stmt(&mut self, variable: &str, iterable: ExprId, body: Vec<StmtId>) -> StmtId {
        let body = self.suite(body);
        self.stmt(StmtKind::For {
            variable: variable.to_string(),
            type_ref: None,
            iterable,
            body,
            iterator_type: Default::default(),
        })
    }

    pub fn branch(
        &mut self,
        patterns: Vec<PatternId>,
        guard: Option<ExprId>,
        body: Vec<StmtId>,
    ) -> MatchBranch {
        let body = self.suite(body);
        MatchBranch {
            patterns,
            guard,
            body,
            span: self.span,
        }
    }

    pub fn match_stmt(&mut self, subject: ExprId, branches: Vec<MatchBranch>) -> StmtId {
        self.stmt(StmtKind::Match { subject, branches })
    }

    pub fn return_stmt(&mut self, value: Option<ExprId>) -> StmtId {
        self.stmt(StmtKind::Return(value))
    }

    pub fn pass(&mut self) -> StmtId {
        self.stmt(StmtKind::Pass)
    }

    pub fn break_stmt(&mut self) -> StmtId {
        self.stmt(StmtKind::Break)
    }

    pub fn continue_stmt(&mut self) -> StmtId {
        self.stmt(StmtKind::Continue)
    }

    pub fn assert_stmt(&mut self, condition: ExprId, message: Option<ExprId>) -> StmtId {
        self.stmt(StmtKind::Assert { condition, message })
    }

    pub fn breakpoint(&mut self) -> StmtId {
        self.stmt(StmtKind::Breakpoint)
    }

    // ==========================================================================
    // Patterns
    // ==========================================================================

    pub fn pattern(&mut self, kind: PatternKind) -> PatternId {
        let id = PatternId(self.tree.patterns.len() as u32);
        self.tree.patterns.push(PatternNode::new(kind, self.span));
        id
    }

    pub fn literal_pattern(&mut self, value: Variant) -> PatternId {
        let expr = self.literal(value);
        self.pattern(PatternKind::Literal(expr))
    }

    pub fn expr_pattern(&mut self, expr: ExprId) -> PatternId {
        self.pattern(PatternKind::Expression(expr))
    }

    pub fn bind_pattern(&mut self, name: &str) -> PatternId {
        self.pattern(PatternKind::Bind(name.to_string()))
    }

    pub fn wildcard_pattern(&mut self) -> PatternId {
        self.pattern(PatternKind::Wildcard)
    }

    pub fn array_pattern(&mut self, elements: Vec<PatternId>, rest: bool) -> PatternId {
        self.pattern(PatternKind::Array { elements, rest })
    }

    pub fn dictionary_pattern(
        &mut self,
        entries: Vec<(ExprId, Option<PatternId>)>,
        rest: bool,
    ) -> PatternId {
        self.pattern(PatternKind::Dictionary { entries, rest })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn members_are_indexed_by_name() {
        let mut b = TreeBuilder::new("res://a.gd");
        let one = b.int(1);
        b.variable(ClassId::HEAD, "x", None, Some(one)).is_static = true;
        b.constant(ClassId::HEAD, "C", None, one);
        let tree = b.finish();
        let (index, member) = tree.head().member("C").unwrap();
        assert_eq!(index, 1);
        assert!(matches!(member, Member::Constant(_)));
        assert!(matches!(tree.head().member("x"), Some((0, Member::Variable(v))) if v.is_static));
    }

    #[test]
    fn nested_classes_link_to_outer() {
        let mut b = TreeBuilder::new("res://a.gd");
        let inner = b.class(ClassId::HEAD, "Inner");
        let deeper = b.class(inner, "Deeper");
        let tree = b.finish();
        assert_eq!(tree.lexical_chain(deeper), vec![deeper, inner, ClassId::HEAD]);
        assert_eq!(tree[inner].identifier.as_deref(), Some("Inner"));
    }

    #[test]
    fn unnamed_enum_values_chain_previous() {
        let mut b = TreeBuilder::new("res://a.gd");
        b.unnamed_enum(ClassId::HEAD, &[("A", None), ("B", None)]);
        b.unnamed_enum(ClassId::HEAD, &[("C", None)]);
        let tree = b.finish();
        match tree.head().member("B") {
            Some((_, Member::EnumValue(v))) => {
                assert_eq!(v.previous.as_deref(), Some("A"));
                assert_eq!(v.group, 0);
            }
            other => panic!("unexpected member {other:?}"),
        }
        match tree.head().member("C") {
            Some((_, Member::EnumValue(v))) => {
                assert_eq!(v.previous, None);
                assert_eq!(v.group, 1);
            }
            other => panic!("unexpected member {other:?}"),
        }
    }

    #[test]
    fn inline_accessors_are_synthetic_functions() {
        let mut b = TreeBuilder::new("res://a.gd");
        b.variable(ClassId::HEAD, "hp", None, None);
        let value = b.ident("value");
        let ret = b.return_stmt(Some(value));
        let getter = b.inline_getter(ClassId::HEAD, "hp", vec![ret]);
        let pass = b.pass();
        let setter = b.inline_setter(ClassId::HEAD, "hp", "value", vec![pass]);
        let tree = b.finish();
        assert_eq!(tree[getter].name, "@hp_getter");
        assert_eq!(tree[setter].accessor_of.as_deref(), Some("hp"));
        match tree.head().member("hp") {
            Some((_, Member::Variable(v))) => assert_eq!(
                v.accessor,
                PropertyAccessor::Inline {
                    setter: Some(setter),
                    getter: Some(getter)
                }
            ),
            other => panic!("unexpected member {other:?}"),
        }
        // accessor functions are not class members
        assert!(tree.head().member("@hp_getter").is_none());
    }

    #[test]
    fn cursor_positions_nodes() {
        let mut b = TreeBuilder::new("res://a.gd");
        b.at(7, 3);
        let e = b.int(5);
        let tree = b.finish();
        assert_eq!(tree[e].span, Span::point(7, 3));
    }
}
